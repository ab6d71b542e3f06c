//! # tsu-reqlog
//!
//! Request completion logging for a minimal hyper service pipeline.
//!
//! Every request that returns normally from its handler produces exactly one
//! info record, `"request completed"`, carrying the status, the latency (as
//! a short duration and as a `measure#<name>.latency` nanosecond count), the
//! remote address, the raw request target, the method and, when one was
//! assigned, the request id.
//!
//! The record goes to whichever logger shape you already have:
//!
//! - [`FieldLogger`] — strict typed fields ([`TracingLogger`] is one)
//! - [`PairLogger`] — loose key/value pairs
//! - [`MapLogger`] — a key → value map
//!
//! Nothing is stored, sampled, filtered or shipped here; that is the
//! logger's job.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use http::Method;
//! use tsu_reqlog::middleware::{access_log, request_id};
//! use tsu_reqlog::{Request, Response, Router, Server, TracingLogger};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), tsu_reqlog::Error> {
//!     let app = Router::new()
//!         .on(Method::GET, "/widgets/{id}", get_widget)
//!         .layer(access_log::typed("widgets", TracingLogger))
//!         .layer(request_id::layer());
//!
//!     Server::bind("0.0.0.0:3000")?.serve(app).await
//! }
//!
//! async fn get_widget(req: Request) -> Response {
//!     let id = req.param("id").unwrap_or("unknown");
//!     Response::json(format!(r#"{{"id":"{id}"}}"#))
//! }
//! ```

mod error;
mod field;
mod handler;
mod request;
mod response;
mod router;
mod server;
mod sink;

pub mod middleware;

pub use error::Error;
pub use field::{Field, Logfmt, Took, Value};
pub use handler::{BoxFuture, BoxedHandler, ErasedHandler, Handler, from_fn};
pub use request::{Request, RequestBuilder, RequestMeta};
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
pub use sink::{FieldLogger, LogSink, MapLogger, PairLogger, SinkBinding, TracingLogger};
