use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use tracing::debug;

use super::error::ApiError;
use super::error::Result;

/// Trait for fetching a path from the lighting server
///
/// This trait allows for mocking the server for testing purposes
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `<base>/<path>` and return the raw response body
    ///
    /// Non-2xx statuses are reported as `ApiError::Status`.
    async fn get(&self, path: &str) -> Result<Vec<u8>>;
}

/// Real transport implementation using reqwest
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,

    /// Base address without a trailing slash
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &Url, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(ApiError::Client)?;

        Ok(Self {
            client,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str) -> Result<Vec<u8>> {
        let url = self.url_for(path);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| ApiError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| ApiError::Request { url, source })?;

        Ok(body.to_vec())
    }
}

/// Canned reply served by `MockTransport`
#[cfg(test)]
#[derive(Debug, Clone)]
pub enum MockReply {
    Json(serde_json::Value),
    Raw(&'static str),
    Status(u16),
}

/// Mock transport for testing
///
/// Replies are queued per path and served in order; the last reply for a path
/// is repeated once the queue runs dry. Paths without replies answer 404.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockTransport {
    replies: std::sync::Mutex<std::collections::HashMap<String, Vec<MockReply>>>,
    /// Paths whose requests wait for a permit before answering
    gates: std::sync::Mutex<std::collections::HashMap<String, std::sync::Arc<tokio::sync::Semaphore>>>,
    /// Every requested path, in order
    requests: std::sync::Mutex<Vec<String>>,
    /// `start <path>` / `end <path>` markers around each request
    events: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, path: &str, reply: MockReply) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push(reply);
        self
    }

    pub fn reply_json(&self, path: &str, body: serde_json::Value) -> &Self {
        self.reply(path, MockReply::Json(body))
    }

    /// Hold requests for `path` until permits are added to the returned semaphore
    pub fn gate(&self, path: &str) -> std::sync::Arc<tokio::sync::Semaphore> {
        self.gates
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_insert_with(|| std::sync::Arc::new(tokio::sync::Semaphore::new(0)))
            .clone()
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, path: &str) -> Result<Vec<u8>> {
        self.requests.lock().unwrap().push(path.to_string());
        self.events.lock().unwrap().push(format!("start {}", path));

        let gate = self.gates.lock().unwrap().get(path).cloned();
        if let Some(gate) = gate {
            gate.acquire().await.unwrap().forget();
        }

        let reply = {
            let mut replies = self.replies.lock().unwrap();
            match replies.get_mut(path) {
                Some(queue) if queue.len() > 1 => Some(queue.remove(0)),
                Some(queue) => queue.first().cloned(),
                None => None,
            }
        };

        self.events.lock().unwrap().push(format!("end {}", path));

        match reply {
            Some(MockReply::Json(body)) => Ok(serde_json::to_vec(&body).unwrap()),
            Some(MockReply::Raw(body)) => Ok(body.as_bytes().to_vec()),
            Some(MockReply::Status(status)) => Err(ApiError::Status {
                url: format!("mock://{}", path),
                status,
            }),
            None => Err(ApiError::Status {
                url: format!("mock://{}", path),
                status: 404,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for_joins_with_single_slash() {
        let base = Url::parse("http://localhost:5000").unwrap();
        let transport = HttpTransport::new(&base, None).unwrap();
        assert_eq!(transport.url_for("get_all"), "http://localhost:5000/get_all");
        assert_eq!(
            transport.url_for("/10.0.0.5/new"),
            "http://localhost:5000/10.0.0.5/new"
        );
    }

    #[test]
    fn test_url_for_keeps_base_path() {
        let base = Url::parse("http://lights.lan/api/").unwrap();
        let transport = HttpTransport::new(&base, Some(Duration::from_secs(3))).unwrap();
        assert_eq!(transport.url_for("10.0.0.5/on"), "http://lights.lan/api/10.0.0.5/on");
    }

    #[tokio::test]
    async fn test_mock_serves_queued_replies_in_order() {
        let transport = MockTransport::new();
        transport
            .reply("a", MockReply::Raw("1"))
            .reply("a", MockReply::Raw("2"));

        assert_eq!(transport.get("a").await.unwrap(), b"1");
        assert_eq!(transport.get("a").await.unwrap(), b"2");
        assert_eq!(transport.get("a").await.unwrap(), b"2");
        assert!(matches!(
            transport.get("b").await,
            Err(ApiError::Status { status: 404, .. })
        ));
        assert_eq!(transport.requests(), vec!["a", "a", "a", "b"]);
    }
}
