use crate::conversation::SessionStatus;
use crate::models::{Message, Role};
use colored::*;

/// Print the conversation, one block per message
pub fn display_history(messages: &[Message]) {
    if messages.is_empty() {
        println!("{}", "(no conversation yet)".dimmed());
        return;
    }

    for (index, message) in messages.iter().enumerate() {
        let label = match message.role {
            Role::User => "user".cyan().bold(),
            Role::Assistant => "assistant".green().bold(),
        };
        println!("{} {}", format!("[{}]", index + 1).dimmed(), label);
        println!("{}", message.content.trim_end());
        println!();
    }
}

pub fn display_status(session_id: &str, status: &SessionStatus, ceiling: usize) {
    let health = if status.healthy {
        "healthy".green()
    } else {
        "over ceiling".red()
    };
    println!("{} {}", "Session:".bold(), session_id);
    println!(
        "{} {} / {} bytes ({})",
        "Payload:".bold(),
        status.payload_bytes,
        ceiling,
        health
    );
    println!("{} {}", "Messages:".bold(), status.messages);
    if status.legacy_present {
        println!("{}", "Legacy uncompressed history present".yellow());
    }
}
