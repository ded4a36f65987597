mod output;

pub use output::{display_history, display_status};
