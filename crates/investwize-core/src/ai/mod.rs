pub mod completion;
pub mod error;

pub use completion::CompletionClient;
pub use error::{CompletionError, FailureKind};

use async_trait::async_trait;

/// A service that turns a prompt into completion text
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;

    fn model_id(&self) -> &str;
}
