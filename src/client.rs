use crate::errors::{ClientError, ClientResult};
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::{future::Future, time::Duration};
use tracing::{debug, warn};

/// A parsed JSON body together with the transport status it arrived with.
#[derive(Debug, Clone)]
pub struct JsonReply {
    pub status: StatusCode,
    pub body: Value,
}

/// Raw body of a file endpoint.
#[derive(Debug, Clone)]
pub struct RawReply {
    pub status: StatusCode,
    pub bytes: Vec<u8>,
}

impl RawReply {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

#[derive(Debug, Clone)]
pub struct RequestClient {
    http: Client,
    base_url: String,
    timeout: Duration,
}

impl RequestClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ClientResult<JsonReply> {
        self.request_with_timeout(method, path, body, self.timeout).await
    }

    /// Sends one request and parses the body as JSON, whatever the HTTP status.
    pub async fn request_with_timeout<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        timeout: Duration,
    ) -> ClientResult<JsonReply> {
        let url = self.url(path);
        debug!("{method} {url}");

        let mut builder = self.http.request(method, &url);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let (status, bytes) = with_timeout(timeout, async move {
            let response = builder.send().await.map_err(network_error)?;
            let status = response.status();
            let bytes = response.bytes().await.map_err(network_error)?;
            Ok((status, bytes))
        })
        .await?;

        let body = serde_json::from_slice(&bytes).map_err(|err| {
            warn!("unparsable body from {url} ({status}): {err}");
            ClientError::InvalidResponse(err.to_string())
        })?;

        Ok(JsonReply { status, body })
    }

    /// GET a file endpoint, returning the raw body.
    pub async fn download(&self, path: &str, query: &[(&str, &str)]) -> ClientResult<RawReply> {
        let url = self.url(path);
        debug!("GET {url} (download)");

        let builder = self.http.get(&url).query(query);
        with_timeout(self.timeout, async move {
            let response = builder.send().await.map_err(network_error)?;
            let status = response.status();
            let bytes = response.bytes().await.map_err(network_error)?;
            Ok(RawReply {
                status,
                bytes: bytes.to_vec(),
            })
        })
        .await
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// Races `operation` against a timer. Whichever finishes first decides the
/// outcome; a losing operation is dropped, which cancels it.
pub async fn with_timeout<T, F>(timeout: Duration, operation: F) -> ClientResult<T>
where
    F: Future<Output = ClientResult<T>>,
{
    match tokio::time::timeout(timeout, operation).await {
        Ok(result) => result,
        Err(_) => {
            warn!("request cancelled after {}ms", timeout.as_millis());
            Err(ClientError::Timeout(timeout))
        }
    }
}

fn network_error(err: reqwest::Error) -> ClientError {
    ClientError::Network(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn timer_wins_over_slow_operation() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&finished);

        let result: ClientResult<()> = with_timeout(Duration::from_millis(20), async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            flag.store(true, Ordering::SeqCst);
            Ok(())
        })
        .await;

        assert!(matches!(result, Err(ClientError::Timeout(_))));
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(!finished.load(Ordering::SeqCst), "cancelled operation kept running");
    }

    #[tokio::test]
    async fn fast_operation_keeps_its_own_outcome() {
        let ok = with_timeout(Duration::from_secs(1), async { Ok(7) }).await;
        assert_eq!(ok.unwrap(), 7);

        let err: ClientResult<()> = with_timeout(Duration::from_secs(1), async {
            Err(ClientError::Network("refused".into()))
        })
        .await;
        assert!(matches!(err, Err(ClientError::Network(message)) if message == "refused"));
    }

    #[tokio::test]
    async fn unreachable_host_is_a_network_error() {
        let client = RequestClient::new("http://127.0.0.1:1", Duration::from_secs(5));
        let err = client
            .request::<()>(Method::GET, "/api/categorias", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Network(_)), "got {err:?}");
    }

    #[test]
    fn url_joins_without_double_slash() {
        let client = RequestClient::new("http://host/", Duration::from_secs(1));
        assert_eq!(client.url("/api/login"), "http://host/api/login");
        assert_eq!(client.url("api/login"), "http://host/api/login");
    }
}
