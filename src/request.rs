//! Incoming HTTP request type.

use std::collections::HashMap;

use bytes::Bytes;
use http::{HeaderMap, Method, Uri};

/// Per-request metadata populated by upstream middleware.
///
/// Carries the correlation id explicitly instead of through an untyped
/// extension slot, so readers never deal with a missing or mistyped value.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RequestMeta {
    id: Option<String>,
}

impl RequestMeta {
    /// The correlation id, if one was assigned. Never `Some("")`.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Assigns the correlation id. An empty string clears it.
    pub fn set_id(&mut self, id: impl Into<String>) {
        let id = id.into();
        self.id = (!id.is_empty()).then_some(id);
    }
}

/// An incoming HTTP request.
pub struct Request {
    pub(crate) method: Method,
    pub(crate) uri: Uri,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Bytes,
    pub(crate) params: HashMap<String, String>,
    pub(crate) remote_addr: String,
    pub(crate) meta: RequestMeta,
}

impl Request {
    pub fn builder() -> RequestBuilder {
        RequestBuilder {
            method: Method::GET,
            uri: Uri::from_static("/"),
            headers: HeaderMap::new(),
            body: Bytes::new(),
            remote_addr: String::new(),
            meta: RequestMeta::default(),
        }
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn uri(&self) -> &Uri { &self.uri }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// The peer address as `ip:port`, exactly as the server accepted it.
    pub fn remote_addr(&self) -> &str { &self.remote_addr }

    pub fn meta(&self) -> &RequestMeta { &self.meta }
    pub fn meta_mut(&mut self) -> &mut RequestMeta { &mut self.meta }

    /// The request target as received: path plus query string, or
    /// `host:port` for an authority-form target (`CONNECT`).
    pub fn request_uri(&self) -> &str {
        if let Some(pq) = self.uri.path_and_query() {
            return pq.as_str();
        }
        match self.uri.authority() {
            Some(authority) => authority.as_str(),
            None => self.uri.path(),
        }
    }

    /// Case-insensitive header lookup. Non-UTF-8 values read as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub(crate) fn set_params(&mut self, params: HashMap<String, String>) {
        self.params = params;
    }
}

/// Builder for [`Request`], used by the server and by tests that drive a
/// handler chain without a socket.
pub struct RequestBuilder {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    remote_addr: String,
    meta: RequestMeta,
}

impl RequestBuilder {
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn uri(mut self, uri: Uri) -> Self {
        self.uri = uri;
        self
    }

    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn remote_addr(mut self, addr: impl Into<String>) -> Self {
        self.remote_addr = addr.into();
        self
    }

    pub fn request_id(mut self, id: impl Into<String>) -> Self {
        self.meta.set_id(id);
        self
    }

    pub fn build(self) -> Request {
        Request {
            method: self.method,
            uri: self.uri,
            headers: self.headers,
            body: self.body,
            params: HashMap::new(),
            remote_addr: self.remote_addr,
            meta: self.meta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_uri_keeps_query() {
        let req = Request::builder()
            .uri(Uri::from_static("/widgets?x=1"))
            .build();
        assert_eq!(req.request_uri(), "/widgets?x=1");
    }

    #[test]
    fn request_uri_of_absolute_form_is_origin_form() {
        let req = Request::builder()
            .uri(Uri::from_static("http://example.com/a/b?c=d"))
            .build();
        assert_eq!(req.request_uri(), "/a/b?c=d");
    }

    #[test]
    fn request_uri_of_authority_form_is_host_port() {
        let req = Request::builder()
            .method(Method::CONNECT)
            .uri(Uri::from_static("example.com:443"))
            .build();
        assert_eq!(req.request_uri(), "example.com:443");
    }

    #[test]
    fn empty_id_means_absent() {
        let mut meta = RequestMeta::default();
        meta.set_id("");
        assert_eq!(meta.id(), None);

        meta.set_id("abc-123");
        assert_eq!(meta.id(), Some("abc-123"));

        meta.set_id(String::new());
        assert_eq!(meta.id(), None);
    }

    #[test]
    fn header_lookup_ignores_case() {
        let mut headers = HeaderMap::new();
        headers.insert("x-request-id", "r-1".parse().unwrap());
        let req = Request::builder().headers(headers).build();
        assert_eq!(req.header("X-Request-Id"), Some("r-1"));
        assert_eq!(req.header("x-missing"), None);
    }
}
