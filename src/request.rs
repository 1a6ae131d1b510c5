use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde::Serialize;
use url::Url;

use crate::{MarketError, Result};

/// A fully built request with its body captured as immutable bytes.
///
/// The captured bytes outlive any single send attempt: every attempt builds
/// a fresh `reqwest` body over the same buffer, so retries send
/// byte-identical content and no attempt can consume another's stream.
#[derive(Clone, Debug)]
pub struct ApiRequest {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<Bytes>,
}

impl ApiRequest {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn url_mut(&mut self) -> &mut Url {
        &mut self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Captured body bytes, when the request carries a body.
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Sets or replaces a header. Later writers win, so decorators applied
    /// after construction can override defaults such as `Content-Type`.
    pub fn insert_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    /// Applies a caller-supplied decorator. Decorators run after the body
    /// and default headers are in place.
    pub fn decorate<F>(&mut self, decorator: F)
    where
        F: FnOnce(&mut Self),
    {
        decorator(self);
    }

    /// Sets the `Authorization` header from a bearer token.
    ///
    /// A missing `Bearer ` prefix is added automatically.
    pub fn bearer_auth(&mut self, token: &str) -> Result<()> {
        let value = HeaderValue::from_str(&normalize_bearer_authorization(token))
            .map_err(|err| MarketError::Request(format!("invalid bearer token: {err}")))?;
        self.headers.insert(AUTHORIZATION, value);
        Ok(())
    }

    /// Materializes a fresh `reqwest` request for one attempt.
    ///
    /// Method, URL and headers are copied; the body is a new view over the
    /// captured bytes.
    pub(crate) fn to_reqwest(
        &self,
        http: &reqwest::Client,
        timeout: Duration,
    ) -> reqwest::RequestBuilder {
        let mut builder = http
            .request(self.method.clone(), self.url.clone())
            .timeout(timeout)
            .headers(self.headers.clone());
        if let Some(body) = &self.body {
            builder = builder.body(body.clone());
        }
        builder
    }
}

/// Builds a request against `base` with an optional JSON body.
///
/// The base URL path must end in `/`; otherwise relative paths would resolve
/// against the parent segment and silently hit the wrong endpoint. A body is
/// serialized once (serde_json does not HTML-escape, so `&`, `<` and `>`
/// survive verbatim in text fields) and `Content-Type: application/json` is
/// set.
pub fn build_request<B: Serialize>(
    base: &Url,
    method: Method,
    path: &str,
    body: Option<&B>,
) -> Result<ApiRequest> {
    let url = resolve(base, path)?;
    let mut headers = HeaderMap::new();
    let body = match body {
        Some(value) => {
            let bytes = serde_json::to_vec(value).map_err(|err| {
                MarketError::Request(format!("could not serialize request body: {err}"))
            })?;
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            Some(Bytes::from(bytes))
        }
        None => None,
    };
    Ok(ApiRequest {
        method,
        url,
        headers,
        body,
    })
}

/// Builds a POST request with a form-encoded body.
///
/// Same base-URL contract as [`build_request`]; the method is fixed to POST
/// and `Content-Type: application/x-www-form-urlencoded` is set.
pub fn build_form_request(base: &Url, path: &str, fields: &[(&str, &str)]) -> Result<ApiRequest> {
    let url = resolve(base, path)?;
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (name, value) in fields {
        serializer.append_pair(name, value);
    }
    let encoded = serializer.finish();

    let mut headers = HeaderMap::new();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/x-www-form-urlencoded"),
    );
    Ok(ApiRequest {
        method: Method::POST,
        url,
        headers,
        body: Some(Bytes::from(encoded)),
    })
}

fn resolve(base: &Url, path: &str) -> Result<Url> {
    if !base.path().ends_with('/') {
        return Err(MarketError::Request(format!(
            "base URL path must end with '/': {base}"
        )));
    }
    base.join(path)
        .map_err(|err| MarketError::Request(format!("invalid request path '{path}': {err}")))
}

fn normalize_bearer_authorization(token: &str) -> String {
    let trimmed = token.trim();
    let prefix = trimmed.get(..7);
    if prefix.is_some_and(|value| value.eq_ignore_ascii_case("bearer ")) {
        trimmed.to_owned()
    } else {
        format!("Bearer {trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
    use reqwest::Method;
    use serde::Serialize;
    use url::Url;

    use crate::MarketError;

    use super::{build_form_request, build_request, normalize_bearer_authorization};

    fn base() -> Url {
        Url::parse("https://api.example.com/v1/").expect("valid base")
    }

    #[derive(Serialize)]
    struct Draft {
        name: String,
    }

    #[test]
    fn base_url_without_trailing_slash_is_rejected() {
        let base = Url::parse("https://api.example.com/v1").expect("valid url");
        let err = build_request::<()>(&base, Method::GET, "quotes/AAPL", None)
            .expect_err("must reject");
        assert!(matches!(err, MarketError::Request(_)));
        assert!(err.to_string().contains("must end with '/'"));
    }

    #[test]
    fn relative_path_is_resolved_against_base() {
        let request = build_request::<()>(&base(), Method::GET, "quotes/AAPL", None)
            .expect("must build");
        assert_eq!(
            request.url().as_str(),
            "https://api.example.com/v1/quotes/AAPL"
        );
        assert!(request.body().is_none());
    }

    #[test]
    fn json_body_sets_content_type_and_captures_bytes() {
        let draft = Draft {
            name: "tech".to_owned(),
        };
        let request = build_request(&base(), Method::POST, "watchlists", Some(&draft))
            .expect("must build");
        assert_eq!(
            request.headers().get(CONTENT_TYPE),
            Some(&HeaderValue::from_static("application/json"))
        );
        assert_eq!(
            request.body().expect("body captured").as_ref(),
            br#"{"name":"tech"}"#
        );
    }

    #[test]
    fn body_text_is_not_html_escaped() {
        let draft = Draft {
            name: "a&b <c> d".to_owned(),
        };
        let request = build_request(&base(), Method::POST, "watchlists", Some(&draft))
            .expect("must build");
        let body = request.body().expect("body captured");
        let text = std::str::from_utf8(body).expect("utf-8 body");
        assert!(text.contains("a&b <c> d"));
    }

    #[test]
    fn decorator_runs_after_defaults_and_can_override() {
        let draft = Draft {
            name: "tech".to_owned(),
        };
        let mut request = build_request(&base(), Method::POST, "watchlists", Some(&draft))
            .expect("must build");
        request.decorate(|request| {
            request.insert_header(
                CONTENT_TYPE,
                HeaderValue::from_static("application/vnd.example+json"),
            );
        });
        assert_eq!(
            request.headers().get(CONTENT_TYPE),
            Some(&HeaderValue::from_static("application/vnd.example+json"))
        );
    }

    #[test]
    fn form_variant_is_post_and_urlencoded() {
        let request = build_form_request(
            &base(),
            "orders/preview",
            &[("symbol", "BRK.B"), ("note", "a&b")],
        )
        .expect("must build");
        assert_eq!(request.method(), &Method::POST);
        assert_eq!(
            request.headers().get(CONTENT_TYPE),
            Some(&HeaderValue::from_static(
                "application/x-www-form-urlencoded"
            ))
        );
        assert_eq!(
            request.body().expect("body captured").as_ref(),
            b"symbol=BRK.B&note=a%26b"
        );
    }

    #[test]
    fn bearer_auth_adds_missing_prefix() {
        let mut request =
            build_request::<()>(&base(), Method::GET, "markets", None).expect("must build");
        request.bearer_auth("abc123").expect("must apply");
        assert_eq!(
            request.headers().get(AUTHORIZATION),
            Some(&HeaderValue::from_static("Bearer abc123"))
        );
    }

    #[test]
    fn normalize_bearer_keeps_existing_prefix() {
        assert_eq!(
            normalize_bearer_authorization("bEaReR abc123"),
            "bEaReR abc123".to_owned()
        );
    }
}
