pub mod codec;
pub mod content;
mod store;

pub use store::{ConversationStore, ExecutionMode, SessionStatus};
