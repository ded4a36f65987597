use crate::models::Role;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(name = "convo")]
#[command(about = "Size-bounded compressed conversation sessions", long_about = None)]
pub struct Args {
    #[arg(short = 'n', long = "new", help = "Start a new session")]
    pub new_session: bool,

    #[arg(long = "clear", help = "Clear the conversation of the current session")]
    pub clear: bool,

    #[arg(long = "clear-all", help = "Delete every stored session")]
    pub clear_all: bool,

    #[arg(long = "status", help = "Show payload size and health of the session")]
    pub status: bool,

    #[arg(long = "history", help = "Print the conversation history")]
    pub history: bool,

    #[arg(
        short = 'r',
        long = "role",
        default_value = "user",
        help = "Role of the appended message (user, assistant)"
    )]
    pub role: Role,

    #[arg(long = "ceiling", help = "Override the payload ceiling in bytes")]
    pub ceiling: Option<usize>,

    #[arg(long = "session-dir", help = "Directory holding session files")]
    pub session_dir: Option<PathBuf>,

    #[arg(
        long = "background",
        help = "Swallow storage failures instead of reporting them"
    )]
    pub background: bool,

    #[arg(short = 'v', long = "verbose", help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(help = "Message to append")]
    pub message: Vec<String>,
}

