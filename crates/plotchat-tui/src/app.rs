use plotchat_core::{ChatClient, ChatSession, Config, Exchange, ExchangeError, NormalizedReply};
use ratatui::layout::Rect;
use tokio::task::JoinHandle;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub type ReplyTask = JoinHandle<Result<NormalizedReply, ExchangeError>>;

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,

    // Conversation
    pub session: ChatSession,
    pub cursor: usize, // cursor position in the draft, in chars
    pub reply_task: Option<ReplyTask>,

    // Chat view
    pub scroll_back: usize, // lines hidden below the viewport, 0 = follow newest
    pub max_scroll: usize,  // set on each draw from the laid-out conversation
    pub chat_area: Option<Rect>,

    // Animation state
    pub animation_frame: u8, // 0-2 for the typing dots

    exchange: Exchange,
}

impl App {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = ChatClient::new(&config.endpoint, config.timeout())?;
        info!(endpoint = %config.endpoint, demo_plots = config.demo_plots, "chat client ready");
        Ok(Self::with_exchange(Exchange::new(client, config.demo_plots)))
    }

    pub fn with_exchange(exchange: Exchange) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Editing,

            session: ChatSession::default(),
            cursor: 0,
            reply_task: None,

            scroll_back: 0,
            max_scroll: 0,
            chat_area: None,

            animation_frame: 0,

            exchange,
        }
    }

    pub fn endpoint(&self) -> &str {
        self.exchange.client().endpoint()
    }

    pub fn is_waiting(&self) -> bool {
        self.session.is_pending()
    }

    /// Send the draft. Blank drafts and submissions while waiting are ignored.
    pub fn submit(&mut self) {
        let Some(text) = self.session.begin_submit() else {
            return;
        };

        self.cursor = 0;
        self.scroll_back = 0;

        let exchange = self.exchange.clone();
        self.reply_task = Some(tokio::spawn(async move { exchange.resolve(&text).await }));
    }

    /// Settle the exchange if the reply task has finished
    pub async fn poll_reply(&mut self) {
        if self.reply_task.as_ref().is_some_and(|t| t.is_finished()) {
            self.finish_reply().await;
        }
    }

    /// Wait for the reply task and settle the exchange
    pub async fn finish_reply(&mut self) {
        let Some(task) = self.reply_task.take() else {
            return;
        };

        let result = match task.await {
            Ok(result) => result,
            Err(e) => Err(ExchangeError::Internal(e.to_string())),
        };
        debug!(ok = result.is_ok(), "reply settled");

        self.session.settle(result);
        self.scroll_back = 0;
    }

    pub fn tick_animation(&mut self) {
        if self.is_waiting() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll_back = self.scroll_back.saturating_add(lines).min(self.max_scroll);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_back = self.scroll_back.saturating_sub(lines);
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll_back = self.max_scroll;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_back = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plotchat_core::{ChartKind, Sender};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{any, body_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn app_for(server: &MockServer) -> App {
        let config = Config {
            endpoint: format!("{}/api/chat", server.uri()),
            timeout_secs: 5,
            demo_plots: true,
        };
        App::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_exchange_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(json!({ "message": "hello" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "hi!" })))
            .expect(1)
            .mount(&server)
            .await;

        let mut app = app_for(&server);
        app.session.set_draft(" hello ");
        app.submit();

        assert!(app.is_waiting());
        assert!(app.reply_task.is_some());

        app.finish_reply().await;

        assert!(!app.is_waiting());
        let messages = app.session.messages();
        // greeting, user, bot
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].text(), "hello");
        assert_eq!(messages[2].sender(), Sender::Bot);
        assert_eq!(messages[2].text(), "hi!");
    }

    #[tokio::test]
    async fn test_bar_plot_scenario() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut app = app_for(&server);
        app.session.set_draft("show me a bar plot");
        app.submit();
        app.finish_reply().await;

        let reply = app.session.messages().last().unwrap();
        assert_eq!(reply.text(), "Here is your plot:");
        let chart = reply.chart().unwrap();
        assert_eq!(chart.kind, ChartKind::Bar);
        assert_eq!(chart.points.len(), 10);
    }

    #[tokio::test]
    async fn test_server_unavailable_scenario() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let mut app = app_for(&server);
        app.session.set_draft("anyone there?");
        app.submit();
        app.finish_reply().await;

        assert!(!app.is_waiting());
        assert_eq!(
            app.session.messages().last().unwrap().text(),
            "Server error. Please try again later."
        );
    }

    #[tokio::test]
    async fn test_offline_scenario() {
        let config = Config {
            endpoint: "http://127.0.0.1:1/api/chat".to_string(),
            timeout_secs: 2,
            demo_plots: true,
        };
        let mut app = App::new(&config).unwrap();
        app.session.set_draft("hello?");
        app.submit();
        app.finish_reply().await;

        assert!(!app.is_waiting());
        assert_eq!(
            app.session.messages().last().unwrap().text(),
            "Network error. Please check your connection."
        );
    }

    #[tokio::test]
    async fn test_second_submit_while_waiting_is_ignored() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "message": "done" }))
                    .set_delay(Duration::from_millis(200)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut app = app_for(&server);
        app.session.set_draft("first");
        app.submit();
        app.session.set_draft("second");
        app.submit();

        assert_eq!(app.session.draft(), "second");
        app.finish_reply().await;
        // greeting, first, done
        assert_eq!(app.session.messages().len(), 3);
    }

    #[tokio::test]
    async fn test_poll_reply_waits_for_completion() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "ok" })))
            .mount(&server)
            .await;

        let mut app = app_for(&server);
        app.session.set_draft("ping");
        app.submit();

        for _ in 0..100 {
            app.poll_reply().await;
            if !app.is_waiting() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        assert!(!app.is_waiting());
        assert!(app.reply_task.is_none());
        assert_eq!(app.session.messages().last().unwrap().text(), "ok");
    }

    #[tokio::test]
    async fn test_scroll_bounds() {
        let server = MockServer::start().await;
        let mut app = app_for(&server);

        app.scroll_up(5);
        // Everything fits until a draw says otherwise
        assert_eq!(app.scroll_back, 0);

        app.max_scroll = 12;
        app.scroll_up(5);
        assert_eq!(app.scroll_back, 5);
        app.scroll_up(50);
        assert_eq!(app.scroll_back, 12);
        app.scroll_down(1);
        assert_eq!(app.scroll_back, 11);
        app.scroll_to_top();
        assert_eq!(app.scroll_back, 12);
        app.scroll_to_bottom();
        assert_eq!(app.scroll_back, 0);

        app.scroll_to_top();
        app.session.set_draft("plot");
        app.submit();
        // Sending jumps back to the newest message
        assert_eq!(app.scroll_back, 0);
        app.finish_reply().await;
    }
}
