//! Push notifications over ntfy.sh

use super::{NotificationTransport, NotifyError, SendFuture};

const DEFAULT_BASE_URL: &str = "https://ntfy.sh";

/// Pushes messages to an ntfy topic over plain HTTP POST
pub struct NtfyTransport {
    client: reqwest::Client,
    base_url: String,
    topic: String,
}

impl NtfyTransport {
    pub fn new(topic: &str) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, topic)
    }

    /// Points the transport at a different server, used by tests and
    /// self-hosted instances
    pub fn with_base_url(base_url: &str, topic: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            topic: topic.to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/{}", self.base_url, self.topic)
    }
}

impl NotificationTransport for NtfyTransport {
    fn name(&self) -> &'static str {
        "ntfy"
    }

    fn send<'a>(&'a self, title: &'a str, body: &'a str) -> SendFuture<'a> {
        Box::pin(async move {
            // Header values must be ASCII; the body carries the full text
            let ascii_title: String = title.chars().filter(char::is_ascii).collect();

            let response = self
                .client
                .post(self.endpoint())
                .header("Title", ascii_title)
                .header("Priority", "high")
                .header("Tags", "moneybag")
                .body(body.to_string())
                .send()
                .await?;
            response.error_for_status()?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_endpoint_includes_topic() {
        let transport = NtfyTransport::new("piste-watch-xyz");
        assert_eq!(transport.endpoint(), "https://ntfy.sh/piste-watch-xyz");

        let transport = NtfyTransport::with_base_url("http://localhost:8080/", "t");
        assert_eq!(transport.endpoint(), "http://localhost:8080/t");
    }

    #[tokio::test]
    async fn test_send_posts_title_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/alerts"))
            .and(header("Title", "Price drop at 1 shop(s)"))
            .and(header("Priority", "high"))
            .and(body_string_contains("2 120,00 PLN"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let transport = NtfyTransport::with_base_url(&server.uri(), "alerts");
        transport
            .send("Price drop at 1 shop(s)", "Shop A: 2 499,00 PLN -> 2 120,00 PLN")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_server_error_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let transport = NtfyTransport::with_base_url(&server.uri(), "alerts");
        assert!(transport.send("t", "b").await.is_err());
    }
}
