//! Probe responses.
//!
//! A probe answers with a status code and a short plain-text body. That is
//! all a kubelet or load balancer reads.

use bytes::Bytes;
use http::StatusCode;
use http::header::{CONTENT_TYPE, HeaderValue};
use http_body_util::Full;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// An outgoing probe response.
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    body: Bytes,
}

impl Response {
    /// `200 OK`, `text/plain; charset=utf-8`.
    pub fn text(body: impl Into<String>) -> Self {
        Self::with_status(StatusCode::OK, body)
    }

    /// Any status with a plain-text body.
    pub fn with_status(status: StatusCode, body: impl Into<String>) -> Self {
        Self { status, body: Bytes::from(body.into()) }
    }

    /// Response with no body.
    pub fn status(status: StatusCode) -> Self {
        Self { status, body: Bytes::new() }
    }

    pub fn status_code(&self) -> StatusCode { self.status }
    pub fn body(&self) -> &[u8] { &self.body }

    pub(crate) fn into_inner(self) -> http::Response<Full<Bytes>> {
        let empty = self.body.is_empty();
        let mut res = http::Response::new(Full::new(self.body));
        *res.status_mut() = self.status;
        if !empty {
            res.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN));
        }
        res
    }
}
