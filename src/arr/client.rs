use super::transport::{HttpRequest, HttpResponse, Method, ReqwestTransport, Transport};
use arrlink_common::{Dialect, Error, Result};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Query parameters for a single call. The API key is added separately.
pub type Query<'a> = &'a [(&'a str, String)];

/// Request layer bound to one server and its negotiated [`Dialect`].
///
/// The dialect is probed once in [`VersionedClient::with_transport`] and
/// never changes afterwards; every path is derived from it. Cloning is
/// cheap and clones share the transport.
#[derive(Clone)]
pub struct VersionedClient {
    inner: Arc<Inner>,
}

struct Inner {
    transport: Arc<dyn Transport>,
    base_url: String,
    api_key: String,
    dialect: Dialect,
    version: String,
}

impl VersionedClient {
    /// Connect with the default `reqwest` transport.
    pub async fn connect(url: &str, api_key: &str, v1: bool) -> Result<Self> {
        Self::with_transport(Arc::new(ReqwestTransport::default()), url, api_key, v1).await
    }

    /// Probe the server's status endpoint and freeze the dialect it speaks.
    ///
    /// The newest layout is tried first; a 404 there falls back to the
    /// legacy `/api` prefix. A status payload without a version string is a
    /// connection failure.
    pub async fn with_transport(
        transport: Arc<dyn Transport>,
        url: &str,
        api_key: &str,
        v1: bool,
    ) -> Result<Self> {
        let base_url = url.trim_end_matches('/').to_string();
        let candidates = Dialect::probe_order(v1);

        let mut status = Value::Null;
        for (i, candidate) in candidates.iter().enumerate() {
            let probe = Self::from_parts(
                transport.clone(),
                &base_url,
                api_key,
                *candidate,
                String::new(),
            );
            match probe.get("system/status", &[]).await {
                Ok(payload) => {
                    status = payload;
                    break;
                }
                Err(Error::NotFound(_)) if i + 1 < candidates.len() => {
                    tracing::debug!(
                        url = %base_url,
                        dialect = %candidate,
                        "status endpoint not found, retrying with older layout"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        let version = status
            .get("version")
            .and_then(Value::as_str)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                Error::connection(format!("Failed to connect to {}: no version reported", base_url))
            })?
            .to_string();

        let dialect = Dialect::classify(&version, v1).ok_or_else(|| {
            Error::connection(format!(
                "Failed to connect to {}: unrecognized version '{}'",
                base_url, version
            ))
        })?;

        tracing::info!(url = %base_url, version = %version, dialect = %dialect, "connected");

        Ok(Self::from_parts(transport, &base_url, api_key, dialect, version))
    }

    pub(crate) fn from_parts(
        transport: Arc<dyn Transport>,
        base_url: &str,
        api_key: &str,
        dialect: Dialect,
        version: String,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport,
                base_url: base_url.trim_end_matches('/').to_string(),
                api_key: api_key.to_string(),
                dialect,
                version,
            }),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.inner.dialect
    }

    /// Version string the server reported while connecting.
    pub fn version(&self) -> &str {
        &self.inner.version
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Absolute URL of a resource path under the dialect's prefix.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}{}/{}",
            self.inner.base_url,
            self.inner.dialect.prefix(),
            path.trim_start_matches('/')
        )
    }

    pub async fn get(&self, path: &str, query: Query<'_>) -> Result<Value> {
        self.request(Method::Get, path, query, None).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        self.request(Method::Post, path, &[], Some(body.clone())).await
    }

    pub async fn put(&self, path: &str, body: &Value, query: Query<'_>) -> Result<Value> {
        self.request(Method::Put, path, query, Some(body.clone())).await
    }

    pub async fn delete(&self, path: &str, body: Option<&Value>, query: Query<'_>) -> Result<Value> {
        self.request(Method::Delete, path, query, body.cloned()).await
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        query: Query<'_>,
        body: Option<Value>,
    ) -> Result<Value> {
        let url = self.endpoint(path);

        let mut params = Vec::with_capacity(query.len() + 1);
        params.push(("apikey".to_string(), self.inner.api_key.clone()));
        params.extend(query.iter().map(|(k, v)| (k.to_string(), v.clone())));

        tracing::debug!(method = ?method, url = %url, "request");
        if let Some(body) = &body {
            tracing::trace!(body = %body, "request body");
        }

        let response = self
            .inner
            .transport
            .send(HttpRequest {
                method,
                url: url.clone(),
                query: params,
                body,
            })
            .await?;

        tracing::debug!(status = response.status, url = %url, "response");
        classify_response(&url, response)
    }
}

impl fmt::Debug for VersionedClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionedClient")
            .field("base_url", &self.inner.base_url)
            .field("dialect", &self.inner.dialect)
            .field("version", &self.inner.version)
            .finish_non_exhaustive()
    }
}

/// Map a raw response onto the error taxonomy.
///
/// Success statuses with an empty body yield `Value::Null`. A non-empty
/// success body that is not JSON means something other than an *arr server
/// answered, so it counts as a connection failure.
pub(crate) fn classify_response(url: &str, response: HttpResponse) -> Result<Value> {
    let text = response.body.trim();
    let parsed: Option<Value> = if text.is_empty() {
        None
    } else {
        serde_json::from_str(text).ok()
    };
    let summary = format!("({} [{}]) {}", response.status, response.reason, url);

    match response.status {
        401 => Err(Error::Unauthorized(format!("{} Invalid API Key", summary))),
        404 => Err(Error::not_found(format!("{} Item Not Found", summary))),
        status if status >= 400 => Err(Error::Server {
            status,
            message: server_message(parsed.as_ref(), text),
        }),
        _ => match parsed {
            Some(value) => Ok(value),
            None if text.is_empty() => Ok(Value::Null),
            None => Err(Error::connection(format!(
                "{} returned a body that is not JSON",
                summary
            ))),
        },
    }
}

fn server_message(parsed: Option<&Value>, text: &str) -> String {
    match parsed {
        Some(Value::Array(items)) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("errorMessage").and_then(Value::as_str))
                .collect();
            if messages.is_empty() {
                text.to_string()
            } else {
                messages.join("; ")
            }
        }
        Some(Value::Object(map)) => map
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| text.to_string()),
        _ => text.to_string(),
    }
}

/// Interpret a list response. `null` (no content) is an empty list.
pub(crate) fn into_items(value: Value) -> Result<Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Null => Ok(Vec::new()),
        other => Err(Error::connection(format!(
            "expected a JSON array, got {}",
            kind_of(&other)
        ))),
    }
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            reason: String::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_success_with_json() {
        let value = classify_response("u", response(200, r#"{"id": 1}"#)).unwrap();
        assert_eq!(value, json!({"id": 1}));
    }

    #[test]
    fn test_success_without_content() {
        assert_eq!(classify_response("u", response(200, "")).unwrap(), Value::Null);
        assert_eq!(classify_response("u", response(202, "  ")).unwrap(), Value::Null);
    }

    #[test]
    fn test_success_with_html_is_connection_failure() {
        let err = classify_response("u", response(200, "<html>login</html>")).unwrap_err();
        assert!(matches!(err, Error::ConnectionFailure(_)));
    }

    #[test]
    fn test_status_kinds() {
        assert!(matches!(
            classify_response("u", response(401, "")).unwrap_err(),
            Error::Unauthorized(_)
        ));
        assert!(classify_response("u", response(404, "<html/>"))
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_server_message_array() {
        let body = r#"[{"propertyName":"Path","errorMessage":"Path is invalid"},{"errorMessage":"Folder missing"}]"#;
        match classify_response("u", response(400, body)).unwrap_err() {
            Error::Server { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Path is invalid; Folder missing");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_server_message_object_and_text() {
        match classify_response("u", response(500, r#"{"message":"boom"}"#)).unwrap_err() {
            Error::Server { message, .. } => assert_eq!(message, "boom"),
            other => panic!("unexpected error: {other:?}"),
        }
        match classify_response("u", response(503, "unavailable")).unwrap_err() {
            Error::Server { message, .. } => assert_eq!(message, "unavailable"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_into_items() {
        assert_eq!(into_items(json!([1, 2])).unwrap().len(), 2);
        assert!(into_items(Value::Null).unwrap().is_empty());
        assert!(into_items(json!({"a": 1})).is_err());
    }
}
