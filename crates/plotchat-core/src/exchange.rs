use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::chart::{ChartKind, ChartPayload};
use crate::message::Message;

pub const DEMO_REPLY: &str = "Here is your plot:";

const NETWORK_ERROR_TEXT: &str = "Network error. Please check your connection.";
const SERVER_ERROR_TEXT: &str = "Server error. Please try again later.";
const GENERIC_ERROR_TEXT: &str = "Sorry, I encountered an error. Please try again.";

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: String,
    #[serde(rename = "plotData", default)]
    plot_data: Option<ChartPayload>,
}

/// Failure of a single exchange with the chat backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExchangeError {
    /// No response arrived: connection failure or timeout
    #[error("network error: {0}")]
    Network(String),
    /// The backend answered with a non-success status
    #[error("server returned status {status}")]
    Server { status: u16, body: String },
    /// The response body was not the expected JSON
    #[error("malformed response: {0}")]
    Parse(String),
    /// The reply task ended without producing a result
    #[error("exchange aborted: {0}")]
    Internal(String),
}

impl ExchangeError {
    /// Text shown to the user in place of a reply
    pub fn user_message(&self) -> &'static str {
        match self {
            ExchangeError::Network(_) => NETWORK_ERROR_TEXT,
            ExchangeError::Server { status, .. } if *status >= 500 => SERVER_ERROR_TEXT,
            ExchangeError::Server { .. } => GENERIC_ERROR_TEXT,
            ExchangeError::Parse(_) => GENERIC_ERROR_TEXT,
            ExchangeError::Internal(_) => GENERIC_ERROR_TEXT,
        }
    }
}

/// A reply reduced to what the conversation needs
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedReply {
    pub text: String,
    pub chart: Option<ChartPayload>,
}

impl NormalizedReply {
    pub fn into_message(self) -> Message {
        match self.chart {
            Some(chart) => Message::bot_with_chart(self.text, chart),
            None => Message::bot(self.text),
        }
    }
}

impl From<ChatResponse> for NormalizedReply {
    fn from(response: ChatResponse) -> Self {
        Self {
            text: response.message,
            chart: response.plot_data,
        }
    }
}

/// HTTP client for the `/api/chat` endpoint
#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    endpoint: String,
}

impl ChatClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST one message and parse the reply. Issues exactly one request, no retries.
    pub async fn send(&self, text: &str) -> Result<NormalizedReply, ExchangeError> {
        debug!(endpoint = %self.endpoint, chars = text.chars().count(), "sending chat message");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&ChatRequest { message: text })
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "chat request failed before a response arrived");
                ExchangeError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), %body, "chat backend returned an error status");
            return Err(ExchangeError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ExchangeError::Network(e.to_string()))?;

        let parsed: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            warn!(error = %e, "chat backend returned a malformed body");
            ExchangeError::Parse(e.to_string())
        })?;

        debug!(has_chart = parsed.plot_data.is_some(), "chat reply received");
        Ok(parsed.into())
    }
}

/// True when the text asks for the sample chart
pub fn is_plot_request(text: &str) -> bool {
    text.to_lowercase().contains("plot")
}

/// Front door for a submission: answers "plot" requests locally, forwards the rest
#[derive(Clone)]
pub struct Exchange {
    client: ChatClient,
    demo_plots: bool,
}

impl Exchange {
    pub fn new(client: ChatClient, demo_plots: bool) -> Self {
        Self { client, demo_plots }
    }

    pub fn client(&self) -> &ChatClient {
        &self.client
    }

    pub async fn resolve(&self, text: &str) -> Result<NormalizedReply, ExchangeError> {
        if self.demo_plots && is_plot_request(text) {
            let kind = ChartKind::from_prompt(text);
            info!(kind = kind.as_str(), "answering plot request with demo data");
            return Ok(NormalizedReply {
                text: DEMO_REPLY.to_string(),
                chart: Some(ChartPayload::demo(kind)),
            });
        }

        self.client.send(text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{any, body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ChatClient {
        ChatClient::new(&format!("{}/api/chat", server.uri()), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_send_posts_message_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({ "message": "hello there" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "hi" })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = client_for(&server).send("hello there").await.unwrap();

        assert_eq!(reply.text, "hi");
        assert!(reply.chart.is_none());
    }

    #[tokio::test]
    async fn test_send_parses_plot_data() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "sales",
                "plotData": {
                    "type": "bar",
                    "data": [
                        { "x": 0, "y": 5, "name": "Q1", "value": 12 },
                        { "x": 1, "y": 7, "name": "Q2", "value": 30 }
                    ]
                }
            })))
            .mount(&server)
            .await;

        let reply = client_for(&server).send("quarterly sales").await.unwrap();
        let chart = reply.chart.unwrap();

        assert_eq!(chart.kind, ChartKind::Bar);
        assert_eq!(chart.points.len(), 2);
        assert_eq!(chart.points[1].name, "Q2");
        assert_eq!(chart.points[1].value, 30.0);
    }

    #[tokio::test]
    async fn test_null_plot_data_is_absent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "message": "ok", "plotData": null })),
            )
            .mount(&server)
            .await;

        let reply = client_for(&server).send("hi").await.unwrap();
        assert!(reply.chart.is_none());
    }

    #[tokio::test]
    async fn test_server_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server).send("hi").await.unwrap_err();

        assert_eq!(
            err,
            ExchangeError::Server {
                status: 503,
                body: "unavailable".to_string()
            }
        );
        assert_eq!(err.user_message(), "Server error. Please try again later.");
    }

    #[tokio::test]
    async fn test_client_error_status_is_generic() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client_for(&server).send("hi").await.unwrap_err();

        assert!(matches!(err, ExchangeError::Server { status: 404, .. }));
        assert_eq!(err.user_message(), GENERIC_ERROR_TEXT);
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).send("hi").await.unwrap_err();
        assert!(matches!(err, ExchangeError::Parse(_)));
        assert_eq!(err.user_message(), GENERIC_ERROR_TEXT);
    }

    #[tokio::test]
    async fn test_missing_message_field_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "reply": "hi" })))
            .mount(&server)
            .await;

        let err = client_for(&server).send("hi").await.unwrap_err();
        assert!(matches!(err, ExchangeError::Parse(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        // Port 1 is reserved and nothing listens on it
        let client = ChatClient::new("http://127.0.0.1:1/api/chat", Duration::from_secs(2)).unwrap();

        let err = client.send("hi").await.unwrap_err();
        assert!(matches!(err, ExchangeError::Network(_)));
        assert_eq!(err.user_message(), "Network error. Please check your connection.");
    }

    #[tokio::test]
    async fn test_timeout_is_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "message": "late" }))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let client =
            ChatClient::new(&format!("{}/api/chat", server.uri()), Duration::from_millis(200))
                .unwrap();

        let err = client.send("hi").await.unwrap_err();
        assert!(matches!(err, ExchangeError::Network(_)));
    }

    #[tokio::test]
    async fn test_plot_request_skips_network() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "x" })))
            .expect(0)
            .mount(&server)
            .await;

        let exchange = Exchange::new(client_for(&server), true);
        let reply = exchange.resolve("show me a bar PLOT").await.unwrap();

        assert_eq!(reply.text, DEMO_REPLY);
        let chart = reply.chart.unwrap();
        assert_eq!(chart.kind, ChartKind::Bar);
        assert_eq!(chart.points.len(), 10);
    }

    #[tokio::test]
    async fn test_plot_request_forwarded_when_demo_disabled() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(json!({ "message": "plot revenue" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "from backend" })))
            .expect(1)
            .mount(&server)
            .await;

        let exchange = Exchange::new(client_for(&server), false);
        let reply = exchange.resolve("plot revenue").await.unwrap();

        assert_eq!(reply.text, "from backend");
    }

    #[test]
    fn test_is_plot_request() {
        assert!(is_plot_request("Plot it"));
        assert!(is_plot_request("scatterplot please"));
        assert!(!is_plot_request("tell me a story"));
    }

    #[test]
    fn test_reply_into_message() {
        let message = NormalizedReply {
            text: "hi".to_string(),
            chart: None,
        }
        .into_message();

        assert_eq!(message.text(), "hi");
        assert!(message.chart().is_none());
    }
}
