use async_trait::async_trait;
use hagal_core::proxy::{HttpMethod, ProxyRequest, ProxyResponse};
use serde_json::Value;
use std::time::Duration;
use tracing::trace;

use crate::{
    config::DatasourceConfig,
    errors::Result,
    transport::{BackendErrorBody, Transport, TransportError},
};

/// [`Transport`] over HTTP, posting JSON bodies to `{api_url}{endpoint}`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: String,
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { base_url, http })
    }

    pub fn from_config(config: &DatasourceConfig) -> Result<Self> {
        Self::new(config.api_url.clone(), config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ProxyRequest) -> std::result::Result<ProxyResponse, TransportError> {
        let url = self.url(&request.endpoint);
        trace!(method = %request.method, url = %url, "sending request");

        let builder = match request.method {
            HttpMethod::Post => match &request.data {
                Some(data) => self.http.post(&url).json(data),
                None => self.http.post(&url).json(&serde_json::json!({})),
            },
            HttpMethod::Get => self.http.get(&url),
        };

        let resp = builder.send().await.map_err(map_reqwest_error)?;
        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(map_reqwest_error)?;

        if !(200..300).contains(&status) {
            return Err(decode_error_body(status, &body));
        }

        // a body that is not JSON is left to the caller's shape checks
        let data = serde_json::from_str::<Value>(&body).unwrap_or(Value::Null);
        Ok(ProxyResponse { status, data })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_builder() {
        return TransportError::Unavailable(err.to_string());
    }
    TransportError::Http {
        status: err.status().map(|s| s.as_u16()),
        message: err.to_string(),
    }
}

/// Maps a non-success response to a [`TransportError`], preferring the
/// backend's structured `{"error": {...}}` body.
pub(crate) fn decode_error_body(status: u16, body: &str) -> TransportError {
    if let Ok(parsed) = serde_json::from_str::<BackendErrorBody>(body) {
        let error = parsed.error;
        if error.message.is_some() || !error.missing.is_empty() {
            return TransportError::Backend {
                status: Some(status),
                error,
            };
        }
    }

    let message = match body.trim() {
        "" => reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or_default()
            .to_string(),
        text => text.to_string(),
    };

    TransportError::Http {
        status: Some(status),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    /// Answers one request on a local port with `status` and `body`.
    /// Returns the base url and a handle yielding the raw request text.
    async fn serve_once(
        status: &'static str,
        content_type: &'static str,
        body: &'static str,
    ) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: {}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                content_type,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            request
        });

        (format!("http://{}/api/v1", addr), handle)
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf).into_owned();
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= header_end + 4 + content_length {
                    return text;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn filter_request() -> ProxyRequest {
        ProxyRequest::post("/timeseries/filter", None)
    }

    #[test]
    fn test_decode_structured_body() {
        let err = decode_error_body(
            400,
            r#"{"error":{"code":400,"message":"Unrecognized granularity"}}"#,
        );
        assert_eq!(err.to_string(), "[400 ERROR] Unrecognized granularity");
    }

    #[test]
    fn test_decode_plain_body() {
        let err = decode_error_body(503, "upstream is down\n");
        assert_eq!(err.to_string(), "[503 ERROR] upstream is down");
    }

    #[test]
    fn test_decode_empty_body_uses_reason() {
        let err = decode_error_body(404, "");
        assert_eq!(err.to_string(), "[404 ERROR] Not Found");
    }

    #[test]
    fn test_url_join() {
        let transport =
            HttpTransport::new("https://api.hagal.com/api/v1/", Duration::from_secs(1)).unwrap();
        assert_eq!(transport.base_url(), "https://api.hagal.com/api/v1");
        assert_eq!(
            transport.url("/datapoints/list"),
            "https://api.hagal.com/api/v1/datapoints/list"
        );
    }

    #[tokio::test]
    async fn test_malformed_base_url_is_unavailable() {
        let transport = HttpTransport::new("not a url", Duration::from_secs(1)).unwrap();
        let result = transport
            .send(&ProxyRequest::post("/timeseries/filter", None))
            .await;
        assert!(matches!(result, Err(TransportError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_send_structured_error_response() {
        let (url, server) = serve_once(
            "400 Bad Request",
            "application/json",
            r#"{"error":{"code":400,"message":"Unrecognized granularity"}}"#,
        )
        .await;
        let transport = HttpTransport::new(url, Duration::from_secs(5)).unwrap();

        let err = transport.send(&filter_request()).await.unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.to_string(), "[400 ERROR] Unrecognized granularity");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/v1/timeseries/filter HTTP/1.1"));
        assert!(request.ends_with("{}"));
    }

    #[tokio::test]
    async fn test_send_empty_error_response_uses_reason() {
        let (url, _server) = serve_once("502 Bad Gateway", "text/plain", "").await;
        let transport = HttpTransport::new(url, Duration::from_secs(5)).unwrap();

        let err = transport.send(&filter_request()).await.unwrap_err();
        assert_eq!(err.to_string(), "[502 ERROR] Bad Gateway");
    }

    #[tokio::test]
    async fn test_send_decodes_json_body() {
        let (url, _server) = serve_once(
            "200 OK",
            "application/json",
            r#"{"items":[{"id":"pv-power","name":"PV"}]}"#,
        )
        .await;
        let transport = HttpTransport::new(url, Duration::from_secs(5)).unwrap();

        let response = transport.send(&filter_request()).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.data, json!({"items": [{"id": "pv-power", "name": "PV"}]}));
    }

    #[tokio::test]
    async fn test_send_non_json_body_is_null() {
        let (url, _server) = serve_once("200 OK", "text/html", "<html>maintenance</html>").await;
        let transport = HttpTransport::new(url, Duration::from_secs(5)).unwrap();

        let response = transport.send(&filter_request()).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.data, Value::Null);
    }
}
