pub mod cli;
pub mod config;
pub mod conversation;
pub mod error;
pub mod logging;
pub mod models;
pub mod session;
pub mod ui;

pub use conversation::{ConversationStore, ExecutionMode, SessionStatus};
pub use error::{Result, StoreError};
pub use models::{Message, Role};
pub use session::{FilesystemSession, MemorySession, SessionBackend};
