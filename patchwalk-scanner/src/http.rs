use crate::error::{Result, ScanError};
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = "Patchwalk/0.1 (https://github.com/trapdoorsec/patchwalk)";

/// Shared reqwest client with a per-request timeout and bounded retries for
/// transient failures.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    retries: u32,
    backoff: Duration,
}

impl HttpClient {
    pub fn new() -> Result<Self> {
        Self::with_timeout(30)
    }

    pub fn with_timeout(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.div_ceil(2)))
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self {
            client,
            retries: 2,
            backoff: Duration::from_millis(500),
        })
    }

    /// `backoff` doubles after every failed attempt.
    pub fn with_retries(mut self, retries: u32, backoff: Duration) -> Self {
        self.retries = retries;
        self.backoff = backoff;
        self
    }

    /// GET `url`, treating non-2xx statuses as errors.
    pub async fn get(&self, url: &str) -> Result<Response> {
        let mut attempt = 0;
        loop {
            debug!("GET {} (attempt {})", url, attempt + 1);
            let outcome = self
                .client
                .get(url)
                .send()
                .await
                .and_then(|response| response.error_for_status())
                .map_err(ScanError::from);

            match outcome {
                Ok(response) => return Ok(response),
                Err(e) if attempt < self.retries && e.is_retryable() => {
                    let delay = self.backoff * 2u32.saturating_pow(attempt);
                    warn!("Transient failure for {}: {} (retrying in {:?})", url, e, delay);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    #[tokio::test]
    async fn test_retries_server_errors() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .expect(2)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = HttpClient::new().unwrap().with_retries(2, Duration::ZERO);
        let body = client
            .get(&format!("{}/flaky", mock_server.uri()))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();

        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn test_gives_up_after_retries() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/down"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&mock_server)
            .await;

        let client = HttpClient::new().unwrap().with_retries(2, Duration::ZERO);
        let result = client.get(&format!("{}/down", mock_server.uri())).await;

        assert!(result.is_err_and(|e| e.is_retryable()));
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = HttpClient::new().unwrap().with_retries(5, Duration::ZERO);
        let result = client.get(&format!("{}/missing", mock_server.uri())).await;

        assert!(matches!(result, Err(ScanError::HttpError(_))));
    }
}
