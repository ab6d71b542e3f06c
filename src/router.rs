//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. Middleware is applied
//! with [`Router::layer`], which wraps every route registered so far, the
//! not-found fallback and the bad-request handler, so unmatched and
//! unreadable requests pass through the same chain.

use std::collections::HashMap;
use std::sync::Arc;

use http::{Method, StatusCode};
use matchit::Router as MatchitRouter;

use crate::handler::{self, BoxedHandler, Handler};
use crate::request::Request;

/// The application router.
///
/// Trees map paths to slots in `handlers`; layering rewrites the slots and
/// leaves the trees alone. Build it once at startup and pass it to
/// [`Server::serve`](crate::Server::serve).
pub struct Router {
    routes: HashMap<Method, MatchitRouter<usize>>,
    handlers: Vec<BoxedHandler>,
    fallback: BoxedHandler,
    rejected: BoxedHandler,
}

impl Router {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
            handlers: Vec::new(),
            fallback: handler::from_fn(|_req: Request| async { StatusCode::NOT_FOUND }),
            rejected: handler::from_fn(|_req: Request| async { StatusCode::BAD_REQUEST }),
        }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax — `req.param("name")` retrieves them:
    ///
    /// ```rust,no_run
    /// # use http::Method;
    /// # use tsu_reqlog::{Request, Response, Router};
    /// # async fn get_widget(_: Request) -> Response { Response::text("") }
    /// # async fn create_widget(_: Request) -> Response { Response::text("") }
    /// Router::new()
    ///     .on(Method::GET,  "/widgets/{id}", get_widget)
    ///     .on(Method::POST, "/widgets",      create_widget);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or conflicts with an existing one.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        let slot = self.handlers.len();
        self.routes
            .entry(method)
            .or_default()
            .insert(path, slot)
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self.handlers.push(handler.into_boxed_handler());
        self
    }

    /// Replace the handler used when no route matches (default: `404`).
    pub fn fallback(mut self, handler: impl Handler) -> Self {
        self.fallback = handler.into_boxed_handler();
        self
    }

    /// Wrap every route registered so far, the fallback and the bad-request
    /// handler with `layer`.
    ///
    /// Layers added later run first:
    /// `.layer(access_log).layer(request_id)` assigns the id, then logs.
    pub fn layer<L>(mut self, layer: L) -> Self
    where
        L: Fn(BoxedHandler) -> BoxedHandler,
    {
        for slot in &mut self.handlers {
            *slot = layer(Arc::clone(slot));
        }
        self.fallback = layer(Arc::clone(&self.fallback));
        self.rejected = layer(Arc::clone(&self.rejected));
        self
    }

    /// Handler for requests the server could not read in full (`400`).
    pub(crate) fn rejection(&self) -> BoxedHandler {
        Arc::clone(&self.rejected)
    }

    /// Finds the handler for a request, falling back when nothing matches.
    pub(crate) fn lookup(&self, method: &Method, path: &str) -> (BoxedHandler, HashMap<String, String>) {
        let matched = self.routes.get(method).and_then(|tree| tree.at(path).ok());
        match matched {
            Some(m) => {
                let params = m.params.iter()
                    .map(|(k, v)| (k.to_owned(), v.to_owned()))
                    .collect();
                (Arc::clone(&self.handlers[*m.value]), params)
            }
            None => (Arc::clone(&self.fallback), HashMap::new()),
        }
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use http::Uri;

    use super::*;
    use crate::field::Field;
    use crate::middleware::{access_log, request_id};
    use crate::response::Response;
    use crate::sink::FieldLogger;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<Vec<Field>>>);

    impl FieldLogger for Recorder {
        fn info(&self, _message: &str, fields: &[Field]) {
            self.0.lock().unwrap().push(fields.to_vec());
        }
    }

    async fn get_widget(req: Request) -> Response {
        Response::text(req.param("id").unwrap_or_default().to_owned())
    }

    async fn dispatch(router: &Router, method: Method, uri: &'static str) -> Response {
        let uri = Uri::from_static(uri);
        let (handler, params) = router.lookup(&method, uri.path());
        let mut req = Request::builder().method(method).uri(uri).build();
        req.set_params(params);
        handler.call(req).await
    }

    #[tokio::test]
    async fn routes_with_params() {
        let router = Router::new().on(Method::GET, "/widgets/{id}", get_widget);

        let res = dispatch(&router, Method::GET, "/widgets/42").await;
        assert_eq!(res.body(), b"42");

        let res = dispatch(&router, Method::POST, "/widgets/42").await;
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn layer_wraps_routes_and_fallback() {
        let logger = Arc::new(Recorder::default());
        let router = Router::new()
            .on(Method::GET, "/widgets/{id}", get_widget)
            .layer(access_log::typed("svc", Arc::clone(&logger)))
            .layer(request_id::layer());

        dispatch(&router, Method::GET, "/widgets/7").await;
        dispatch(&router, Method::GET, "/nope?q=1").await;

        let records = logger.0.lock().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0][0], Field::int("status", 200));
        assert_eq!(records[1][0], Field::int("status", 404));
        assert_eq!(records[1][4], Field::string("request", "/nope?q=1"));
        // request_id runs first, so both records carry an id.
        assert!(records.iter().all(|r| r.len() == 7 && r[6].key() == "request-id"));
    }

    #[tokio::test]
    async fn rejection_passes_through_layers() {
        let logger = Arc::new(Recorder::default());
        let router = Router::new()
            .on(Method::POST, "/widgets", get_widget)
            .layer(access_log::typed("svc", Arc::clone(&logger)));

        let req = Request::builder()
            .method(Method::POST)
            .uri(Uri::from_static("/widgets"))
            .build();
        let res = router.rejection().call(req).await;
        assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);

        let records = logger.0.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0][0], Field::int("status", 400));
        assert_eq!(records[0][5], Field::string("method", "POST"));
    }

    #[test]
    #[should_panic(expected = "invalid route")]
    fn conflicting_route_panics() {
        let _ = Router::new()
            .on(Method::GET, "/widgets/{id}", get_widget)
            .on(Method::GET, "/widgets/{name}", get_widget);
    }
}
