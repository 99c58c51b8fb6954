pub mod ai;
pub mod config;
pub mod fallback;
pub mod prompt;
pub mod resolver;
pub mod state;

// Re-export main types for convenience
pub use ai::{CompletionClient, CompletionError, CompletionService, FailureKind};
pub use config::{Config, Credential};
pub use fallback::{fallback_response, Topic};
pub use resolver::{Resolution, ResponseResolver};
pub use state::{ChatMessage, ChatRole, Conversation, QUICK_QUESTIONS};
