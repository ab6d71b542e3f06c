//! Request completion logging.
//!
//! Wraps a handler so every request that returns normally produces exactly
//! one info record, `"request completed"`, with these fields in order:
//!
//! | Key | Value |
//! |---|---|
//! | `status` | status code of the returned response |
//! | `took` | elapsed time, short form (`5ms`) |
//! | `measure#<name>.latency` | elapsed time in nanoseconds |
//! | `remote` | peer address, `ip:port` |
//! | `request` | request target: path and query, or `host:port` for `CONNECT` |
//! | `method` | request method |
//! | `request-id` | correlation id, only when one was assigned |
//!
//! A request whose handler panics is not logged; the panic reaches the
//! caller untouched. Put a recovery layer outside this one if those requests
//! need a record too.
//!
//! ```rust,no_run
//! use http::Method;
//! use tsu_reqlog::middleware::{access_log, request_id};
//! use tsu_reqlog::{Request, Router, TracingLogger};
//!
//! # async fn list_widgets(_: Request) -> &'static str { "[]" }
//! let app = Router::new()
//!     .on(Method::GET, "/widgets", list_widgets)
//!     .layer(access_log::typed("widgets", TracingLogger))
//!     .layer(request_id::layer());
//! ```

use std::sync::Arc;

use tokio::time::Instant;

use crate::field::Field;
use crate::handler::{self, BoxedHandler};
use crate::request::Request;
use crate::sink::{FieldLogger, LogSink, MapLogger, PairLogger, SinkBinding};

/// The fixed message of every completion record.
pub const MESSAGE: &str = "request completed";

/// Access-log middleware bound to a component name and a sink.
#[derive(Clone, Debug)]
pub struct AccessLog {
    name: String,
    binding: SinkBinding,
}

impl AccessLog {
    /// `name` namespaces the latency key: `measure#<name>.latency`.
    pub fn new(name: impl Into<String>, binding: SinkBinding) -> Self {
        Self { name: name.into(), binding }
    }

    pub fn name(&self) -> &str { &self.name }

    /// The key of the nanosecond latency field.
    pub fn latency_key(&self) -> String {
        format!("measure#{}.latency", self.name)
    }

    /// Turns the configuration into a handler-wrapping function.
    ///
    /// The sink is resolved here, once. With no sink bound the returned
    /// function hands `next` back unchanged.
    pub fn layer(self) -> impl Fn(BoxedHandler) -> BoxedHandler + Clone + Send + Sync + 'static {
        let latency_key = self.latency_key();
        let state = self.binding.into_sink().map(|sink| Arc::new(Emitter { sink, latency_key }));

        move |next: BoxedHandler| match &state {
            Some(emitter) => wrap(Arc::clone(emitter), next),
            None => next,
        }
    }
}

/// Access log writing to a strict typed-field logger.
pub fn typed(
    name: impl Into<String>,
    logger: impl FieldLogger,
) -> impl Fn(BoxedHandler) -> BoxedHandler + Clone + Send + Sync + 'static {
    AccessLog::new(name, SinkBinding::typed(logger)).layer()
}

/// Access log writing to a loose key/value logger.
pub fn sugared(
    name: impl Into<String>,
    logger: impl PairLogger,
) -> impl Fn(BoxedHandler) -> BoxedHandler + Clone + Send + Sync + 'static {
    AccessLog::new(name, SinkBinding::sugared(logger)).layer()
}

/// Access log writing to a field-map logger.
pub fn mapped(
    name: impl Into<String>,
    logger: impl MapLogger,
) -> impl Fn(BoxedHandler) -> BoxedHandler + Clone + Send + Sync + 'static {
    AccessLog::new(name, SinkBinding::mapped(logger)).layer()
}

/// Access log with no sink: requests pass through, nothing is emitted.
pub fn disabled(
    name: impl Into<String>,
) -> impl Fn(BoxedHandler) -> BoxedHandler + Clone + Send + Sync + 'static {
    AccessLog::new(name, SinkBinding::None).layer()
}

// ── Per-request path ──────────────────────────────────────────────────────────

struct Emitter {
    sink: Arc<dyn LogSink>,
    latency_key: String,
}

/// What the record needs from the request, taken before the request is
/// moved into the downstream handler.
struct Seen {
    remote: String,
    request: String,
    method: String,
    request_id: Option<String>,
}

impl Seen {
    fn of(req: &Request) -> Self {
        Self {
            remote: req.remote_addr().to_owned(),
            request: req.request_uri().to_owned(),
            method: req.method().as_str().to_owned(),
            request_id: req.meta().id().map(str::to_owned),
        }
    }
}

fn wrap(emitter: Arc<Emitter>, next: BoxedHandler) -> BoxedHandler {
    handler::from_fn(move |req: Request| {
        let emitter = Arc::clone(&emitter);
        let next = Arc::clone(&next);
        async move {
            let start = Instant::now();
            let seen = Seen::of(&req);

            let response = next.call(req).await;

            let took = start.elapsed();
            let fields = emitter.fields(seen, response.status_code().as_u16(), took);
            emitter.sink.info(MESSAGE, &fields);
            response
        }
    })
}

impl Emitter {
    fn fields(&self, seen: Seen, status: u16, took: std::time::Duration) -> Vec<Field> {
        let nanos = i64::try_from(took.as_nanos()).unwrap_or(i64::MAX);

        let mut fields = Vec::with_capacity(7);
        fields.push(Field::int("status", i64::from(status)));
        fields.push(Field::duration("took", took));
        fields.push(Field::int(self.latency_key.clone(), nanos));
        fields.push(Field::string("remote", seen.remote));
        fields.push(Field::string("request", seen.request));
        fields.push(Field::string("method", seen.method));
        if let Some(id) = seen.request_id {
            fields.push(Field::string("request-id", id));
        }
        fields
    }
}
