//! Correlation-id assignment.
//!
//! Fills [`RequestMeta::id`](crate::RequestMeta::id) for every request so
//! layers further in, the access log among them, can read it. An inbound
//! `X-Request-Id` header wins; otherwise the id is `<prefix>-<seq>`, where
//! the prefix is random per process and `seq` counts up from 1.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use rand::Rng;
use rand::distributions::Alphanumeric;

use crate::handler::{self, BoxedHandler};
use crate::request::Request;

/// Header consulted for an upstream-assigned id.
pub const HEADER: &str = "x-request-id";

/// Length of the random per-process prefix.
const PREFIX_LEN: usize = 10;

static PREFIX: OnceLock<String> = OnceLock::new();
static SEQ: AtomicU64 = AtomicU64::new(0);

/// Returns the request-id middleware.
pub fn layer() -> impl Fn(BoxedHandler) -> BoxedHandler + Clone + Send + Sync + 'static {
    |next: BoxedHandler| {
        handler::from_fn(move |mut req: Request| {
            let next = Arc::clone(&next);
            async move {
                let id = match req.header(HEADER) {
                    Some(v) if !v.is_empty() => v.to_owned(),
                    _ => next_id(),
                };
                req.meta_mut().set_id(id);
                next.call(req).await
            }
        })
    }
}

/// Generates the next process-local id.
pub fn next_id() -> String {
    let prefix = PREFIX.get_or_init(|| {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(PREFIX_LEN)
            .map(char::from)
            .collect()
    });
    let seq = SEQ.fetch_add(1, Ordering::Relaxed) + 1;
    format!("{prefix}-{seq:06}")
}

#[cfg(test)]
mod tests {
    use http::HeaderMap;

    use super::*;
    use crate::response::Response;

    fn echo_id() -> BoxedHandler {
        handler::from_fn(|req: Request| async move {
            Response::text(req.meta().id().unwrap_or("<none>").to_owned())
        })
    }

    #[tokio::test]
    async fn uses_inbound_header() {
        let app = layer()(echo_id());
        let mut headers = HeaderMap::new();
        headers.insert(HEADER, "upstream-7".parse().unwrap());

        let res = app.call(Request::builder().headers(headers).build()).await;
        assert_eq!(res.body(), b"upstream-7");
    }

    #[tokio::test]
    async fn generates_when_missing_or_empty() {
        let app = layer()(echo_id());
        let mut headers = HeaderMap::new();
        headers.insert(HEADER, "".parse().unwrap());

        let a = app.call(Request::builder().build()).await;
        let b = app.call(Request::builder().headers(headers).build()).await;

        let a = std::str::from_utf8(a.body()).unwrap().to_owned();
        let b = std::str::from_utf8(b.body()).unwrap().to_owned();
        assert_ne!(a, b);
        for id in [&a, &b] {
            let (prefix, seq) = id.split_once('-').unwrap();
            assert_eq!(prefix.len(), PREFIX_LEN);
            assert!(prefix.chars().all(|c| c.is_ascii_alphanumeric()));
            assert!(seq.len() >= 6 && seq.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn ids_share_prefix_and_increase() {
        let first = next_id();
        let second = next_id();
        let (p1, s1) = first.split_once('-').unwrap();
        let (p2, s2) = second.split_once('-').unwrap();
        assert_eq!(p1, p2);
        assert!(s2.parse::<u64>().unwrap() > s1.parse::<u64>().unwrap());
    }
}
