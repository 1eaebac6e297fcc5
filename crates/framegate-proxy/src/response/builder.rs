use bytes::Bytes;
use http_body_util::Full;
use hyper::http::{HeaderName, HeaderValue};
use hyper::{HeaderMap, Response, StatusCode};
use std::str::FromStr;

/// Builder for locally generated responses (pages, JSON, upstream relays).
///
/// Headers that fail to parse are skipped rather than failing the response.
pub struct ResponseBuilder {
    status: StatusCode,
    body: Bytes,
    headers: HeaderMap,
}

impl ResponseBuilder {
    pub fn new(status_code: StatusCode) -> Self {
        ResponseBuilder {
            status: status_code,
            body: Bytes::new(),
            headers: Default::default(),
        }
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (HeaderName::from_str(name), HeaderValue::from_str(value)) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Append every entry of `headers`, keeping repeated names.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        let mut last_name: Option<HeaderName> = None;
        for (name, value) in headers {
            // HeaderMap::into_iter yields the name only on the first value of a run.
            if let Some(name) = name {
                last_name = Some(name);
            }
            if let Some(ref name) = last_name {
                self.headers.append(name.clone(), value);
            }
        }
        self
    }

    pub fn build_full(self) -> Response<Full<Bytes>> {
        let mut response = Response::new(Full::new(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use hyper::header::{CONTENT_TYPE, SET_COOKIE};

    #[test]
    fn test_builder_with_status() {
        let response = ResponseBuilder::new(StatusCode::BAD_GATEWAY).build_full();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_builder_with_headers() {
        let response = ResponseBuilder::new(StatusCode::OK)
            .header("X-Custom-Header", "test-value")
            .header("Content-Type", "text/html; charset=utf-8")
            .build_full();

        assert_eq!(
            response.headers().get("X-Custom-Header"),
            Some(&HeaderValue::from_static("test-value"))
        );
        assert_eq!(
            response.headers().get(CONTENT_TYPE),
            Some(&HeaderValue::from_static("text/html; charset=utf-8"))
        );
    }

    #[test]
    fn test_invalid_header_is_skipped() {
        let response = ResponseBuilder::new(StatusCode::OK)
            .header("bad header", "x")
            .header("x-ok", "bad\nvalue")
            .build_full();
        assert!(response.headers().is_empty());
    }

    #[test]
    fn test_headers_keep_multiplicity() {
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("a=1"));
        headers.append(SET_COOKIE, HeaderValue::from_static("b=2"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));

        let response = ResponseBuilder::new(StatusCode::OK).headers(headers).build_full();
        assert_eq!(response.headers().get_all(SET_COOKIE).iter().count(), 2);
        assert_eq!(response.headers().get(CONTENT_TYPE).unwrap(), "text/plain");
    }

    #[tokio::test]
    async fn test_body() {
        let response = ResponseBuilder::new(StatusCode::OK).body("hello").build_full();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"hello");
    }
}
