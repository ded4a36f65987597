mod filesystem;
mod memory;
mod storage;

pub use filesystem::{FilesystemSession, SESSION_EXPIRY_MINUTES};
pub use memory::MemorySession;
pub use storage::SessionBackend;
