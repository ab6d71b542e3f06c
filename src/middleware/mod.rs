//! Middleware layer.
//!
//! A middleware is any `Fn(BoxedHandler) -> BoxedHandler`: it receives the
//! next handler in the chain and returns a handler that runs around it.
//! Apply one with [`Router::layer`](crate::Router::layer).
//!
//! - [`access_log`] — one structured record per completed request
//! - [`request_id`] — assigns the correlation id the access log reports

pub mod access_log;
pub mod request_id;
