pub mod ai;
pub mod completion;
pub mod config;
pub mod conversation;
pub mod input;
pub mod state;

// Re-export main types for convenience
pub use ai::GeminiClient;
pub use completion::{CompletionError, CompletionService};
pub use config::Config;
pub use conversation::{Conversation, SubmitOutcome};
pub use input::InputBuffer;
pub use state::{Message, Role};
