//! Access-logged widget service.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/widgets/42?verbose=1
//!   curl -X POST http://localhost:3000/widgets -H 'x-request-id: abc-123' -d '{}'
//!   curl http://localhost:3000/missing
//!
//! Each request prints one line like:
//!   INFO tsu_reqlog::access: request completed status=201 took=84µs remote=127.0.0.1:53122 request=/widgets method=POST request_id=abc-123 extra=measure#widgets.latency=84211

use http::{Method, StatusCode};
use tracing_subscriber::EnvFilter;
use tsu_reqlog::middleware::{access_log, request_id};
use tsu_reqlog::{Request, Response, Router, Server, TracingLogger};

#[tokio::main]
async fn main() -> Result<(), tsu_reqlog::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let app = Router::new()
        .on(Method::GET,    "/widgets/{id}", get_widget)
        .on(Method::POST,   "/widgets",      create_widget)
        .on(Method::DELETE, "/widgets/{id}", delete_widget)
        .layer(access_log::typed("widgets", TracingLogger))
        .layer(request_id::layer());

    Server::bind("0.0.0.0:3000")?.serve(app).await
}

async fn get_widget(req: Request) -> Response {
    let id = req.param("id").unwrap_or("unknown");
    Response::json(format!(r#"{{"id":"{id}","name":"sprocket"}}"#))
}

async fn create_widget(req: Request) -> Response {
    if req.body().is_empty() {
        return Response::status(StatusCode::BAD_REQUEST);
    }
    Response::builder()
        .status(StatusCode::CREATED)
        .header("location", "/widgets/99")
        .json(r#"{"id":"99","name":"new_widget"}"#)
}

async fn delete_widget(_req: Request) -> StatusCode {
    StatusCode::NO_CONTENT
}
