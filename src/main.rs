use clap::Parser;
use colored::*;
use std::process;

use convostore::cli::Args;
use convostore::config::Config;
use convostore::conversation::content::validate_input;
use convostore::models::Role;
use convostore::ui::{display_history, display_status};
use convostore::{logging, ConversationStore, ExecutionMode, FilesystemSession};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match Config::from_env_and_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red(), e);
            process::exit(1);
        }
    };

    logging::init(config.verbose);

    let session_dir = match config.session_dir.clone() {
        Some(dir) => dir,
        None => FilesystemSession::default_dir()?,
    };

    // Handle --clear-all option
    if args.clear_all {
        match FilesystemSession::clear_all(&session_dir) {
            Ok(removed) => {
                println!("{}", format!("Removed {} stored session(s).", removed).green());
                return Ok(());
            }
            Err(e) => {
                eprintln!("{}", format!("Error clearing sessions: {}", e).red());
                process::exit(1);
            }
        }
    }

    let session = if args.new_session {
        FilesystemSession::create(&session_dir)
    } else {
        FilesystemSession::resume_or_create(&session_dir)
    };

    let mode = if args.background {
        ExecutionMode::Background
    } else {
        ExecutionMode::Interactive
    };
    let ceiling = config.store.ceiling_bytes;
    let mut store = match ConversationStore::new(session, config.store, mode) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("{} {}", "Error:".red(), e);
            process::exit(1);
        }
    };

    if args.clear {
        if let Err(e) = store.clear() {
            eprintln!("{}", format!("Error clearing conversation: {}", e).red());
            process::exit(1);
        }
        println!("{}", "Conversation cleared.".green());
        return Ok(());
    }

    let appended = !args.message.is_empty();
    if appended {
        let message = args.message.join(" ");
        if args.role == Role::User {
            if let Err(e) = validate_input(&message) {
                eprintln!("{} {}", "Error:".red(), e);
                process::exit(1);
            }
        }
        if let Err(e) = store.append(args.role, &message) {
            eprintln!("{} {}", "Error:".red(), e);
            process::exit(1);
        }
    }

    if args.status {
        let status = store.status();
        display_status(store.backend().session_id(), &status, ceiling);
    }

    if args.history || appended || !args.status {
        if args.status {
            println!();
        }
        display_history(&store.read());
    }

    Ok(())
}
