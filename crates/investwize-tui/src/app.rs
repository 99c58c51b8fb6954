use investwize_core::{
    ChatRole, CompletionClient, CompletionService, Config, Conversation, Credential, Resolution,
    ResponseResolver, QUICK_QUESTIONS,
};
use ratatui::layout::Rect;
use std::sync::Arc;
use tokio::task::{JoinError, JoinHandle};

pub const FAILURE_NOTICE: &str = "Failed to get response. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Landing,
    Chat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub screen: Screen,
    pub input_mode: InputMode,

    // Chat state
    pub conversation: Conversation,
    pub input: String,
    pub cursor: usize, // cursor position in input, in chars
    pub chat_scroll: u16,
    pub chat_height: u16, // inner height of the chat area, set during render
    pub chat_lines: u16,  // wrapped line count of the chat, set during render
    pub follow_chat: bool, // keep the latest message in view
    pub reply_task: Option<JoinHandle<Resolution>>,
    pub notice: Option<String>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // API key input state
    pub show_api_key_input: bool,
    pub api_key_input: String,
    pub api_key_input_cursor: usize,

    // Chat area for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,

    pub resolver: ResponseResolver,
    pub credential: Credential,
}

impl App {
    pub fn new() -> Self {
        let config = Config::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "could not read config file, using defaults");
            Config::new()
        });

        let client = CompletionClient::from_config(&config);
        tracing::info!(
            model = %client.model_id(),
            endpoint = %client.endpoint(),
            credential = client.credential().source().unwrap_or("missing"),
            "completion client configured"
        );

        let credential = client.credential().clone();
        Self::with_resolver(ResponseResolver::new(Arc::new(client)), credential)
    }

    pub fn with_resolver(resolver: ResponseResolver, credential: Credential) -> Self {
        Self {
            should_quit: false,
            screen: Screen::Landing,
            input_mode: InputMode::Normal,

            conversation: Conversation::new(),
            input: String::new(),
            cursor: 0,
            chat_scroll: 0,
            chat_height: 0,
            chat_lines: 0,
            follow_chat: true,
            reply_task: None,
            notice: None,

            animation_frame: 0,

            show_api_key_input: false,
            api_key_input: String::new(),
            api_key_input_cursor: 0,

            chat_area: None,

            resolver,
            credential,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.conversation.is_pending()
    }

    /// Whether a credential is available, shown as online/offline in the header
    pub fn is_online(&self) -> bool {
        self.credential.read().is_some()
    }

    pub fn open_chat(&mut self) {
        self.screen = Screen::Chat;
        self.input_mode = InputMode::Editing;
        self.scroll_to_bottom();
    }

    pub fn go_home(&mut self) {
        self.screen = Screen::Landing;
        self.input_mode = InputMode::Normal;
    }

    /// Send the current input to the resolver in the background.
    ///
    /// Returns false when nothing was sent (blank input or a reply in flight).
    pub fn submit(&mut self) -> bool {
        let Some(message) = self.conversation.submit(&self.input) else {
            return false;
        };

        self.input.clear();
        self.cursor = 0;
        self.notice = None;
        self.animation_frame = 0;

        tracing::debug!(id = %message.id, chars = message.content.chars().count(), "message submitted");

        let resolver = self.resolver.clone();
        self.reply_task = Some(tokio::spawn(async move {
            resolver.resolve_detailed(&message.content).await
        }));

        self.scroll_to_bottom();
        true
    }

    /// Collect the reply if the background task has finished
    pub async fn poll_reply(&mut self) {
        let finished = self
            .reply_task
            .as_ref()
            .is_some_and(|task| task.is_finished());

        if finished {
            if let Some(task) = self.reply_task.take() {
                let outcome = task.await;
                self.finish_reply(outcome);
            }
        }
    }

    /// Apply a finished reply task. The pending flag is cleared either way.
    pub fn finish_reply(&mut self, outcome: Result<Resolution, JoinError>) {
        match outcome {
            Ok(resolution) => {
                if let Resolution::Fallback { topic, .. } = &resolution {
                    tracing::debug!(topic = topic.as_str(), "showing fallback reply");
                }
                self.conversation.complete(resolution.into_text());
            }
            Err(e) => {
                tracing::error!(error = %e, "reply task did not complete");
                self.conversation.fail();
                self.notice = Some(FAILURE_NOTICE.to_string());
            }
        }
        self.scroll_to_bottom();
    }

    /// Fill the input with a starter question. Only offered on a fresh chat.
    pub fn use_quick_question(&mut self, index: usize) -> bool {
        if !self.conversation.is_fresh() || self.is_pending() {
            return false;
        }
        let Some(question) = QUICK_QUESTIONS.get(index) else {
            return false;
        };

        self.input = question.to_string();
        self.cursor = self.input.chars().count();
        self.input_mode = InputMode::Editing;
        true
    }

    /// Store an API key for this and future sessions
    pub fn save_api_key(&mut self) {
        let key = self.api_key_input.trim().to_string();
        if !key.is_empty() {
            if let Err(e) = Config::save_api_key(&key) {
                tracing::warn!(error = %e, "could not save API key to config file");
            }
            self.credential.set_stored(Some(key));
            tracing::info!("API key updated");
        }
        self.close_api_key_input();
    }

    pub fn close_api_key_input(&mut self) {
        self.show_api_key_input = false;
        self.api_key_input.clear();
        self.api_key_input_cursor = 0;
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.is_pending() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_down(&mut self, lines: u16) {
        let max = self.max_chat_scroll();
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(max);
        self.follow_chat = self.chat_scroll >= max;
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
        self.follow_chat = self.chat_scroll >= self.max_chat_scroll();
    }

    pub fn scroll_half_page_down(&mut self) {
        self.scroll_down(self.visible_chat_height() / 2);
    }

    pub fn scroll_half_page_up(&mut self) {
        self.scroll_up(self.visible_chat_height() / 2);
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll_up(u16::MAX);
    }

    /// Scroll so the latest message (or the thinking indicator) is visible,
    /// and keep it there as the chat grows
    pub fn scroll_to_bottom(&mut self) {
        self.follow_chat = true;
        self.chat_scroll = self.max_chat_scroll();
    }

    /// Record the chat's wrapped line count from the last render
    pub fn set_chat_lines(&mut self, lines: u16) {
        self.chat_lines = lines;
        let max = self.max_chat_scroll();
        self.chat_scroll = if self.follow_chat {
            max
        } else {
            self.chat_scroll.min(max)
        };
    }

    fn max_chat_scroll(&self) -> u16 {
        self.chat_lines.saturating_sub(self.visible_chat_height())
    }

    fn visible_chat_height(&self) -> u16 {
        if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        }
    }

    pub fn role_label(role: ChatRole) -> &'static str {
        match role {
            ChatRole::User => "You",
            ChatRole::Assistant => "Coach",
        }
    }
}
