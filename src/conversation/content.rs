//! Content reduction applied to messages before they are measured and stored.

use crate::error::{Result, StoreError};
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::OnceLock;

pub const IMAGE_DATA_PLACEHOLDER: &str = "[image data removed]";
pub const AUDIO_DATA_PLACEHOLDER: &str = "[audio data removed]";

/// Appended when content exceeds the absolute character cap
pub const CONTENT_TRUNCATED_MARKER: &str =
    "...\n\n*[Response continued but truncated to manage session size]*";

/// Appended when metadata stripping cuts a message
pub const CONTENT_TRIMMED_MARKER: &str = "...[content trimmed]";

/// Appended when a lone message is cut down to fit the payload ceiling
pub const SIZE_TRUNCATED_MARKER: &str = "...[content truncated]";

pub const AUDIO_SUMMARY_NOTE: &str = "*[Audio content summarized for session efficiency]*";
pub const AUDIO_METADATA_NOTE: &str = "*[Audio metadata removed]*";

pub const MAX_INPUT_CHARS: usize = 4000;

const AUDIO_LINE_CHARS: usize = 200;
const IMAGE_SUMMARY_CHARS: usize = 500;

const AUDIO_SUMMARY_KEYS: [&str; 4] = [
    "**file**:",
    "**request**:",
    "**transcription**:",
    "**ai analysis**:",
];

fn inline_binary_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"data:(image|audio)/[A-Za-z0-9.+\-]+;base64,[A-Za-z0-9+/=]*").unwrap()
    })
}

/// First `n` characters of `s`.
pub fn char_prefix(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Replace inlined `data:<image|audio>/...;base64,` payloads with a placeholder.
pub fn strip_inline_binary(content: &str) -> Cow<'_, str> {
    inline_binary_re().replace_all(content, |caps: &Captures| {
        if &caps[1] == "audio" {
            AUDIO_DATA_PLACEHOLDER
        } else {
            IMAGE_DATA_PLACEHOLDER
        }
    })
}

fn is_audio_report(lower: &str) -> bool {
    lower.contains("🎤 **audio")
}

fn is_image_report(lower: &str) -> bool {
    lower.contains("🖼️ **image") || lower.contains("🖼 **image") || lower.contains("analyzed the image")
}

/// Condense an audio or image analysis report. `None` for ordinary content.
pub fn summarize_multimodal(content: &str) -> Option<String> {
    let lower = content.to_lowercase();

    if is_audio_report(&lower) {
        let summary: Vec<String> = content
            .lines()
            .filter(|line| {
                let line = line.to_lowercase();
                AUDIO_SUMMARY_KEYS.iter().any(|key| line.contains(key))
            })
            .map(|line| {
                if line.chars().count() > AUDIO_LINE_CHARS {
                    format!("{}...[truncated]", char_prefix(line, AUDIO_LINE_CHARS))
                } else {
                    line.to_string()
                }
            })
            .collect();

        if summary.is_empty() {
            return None;
        }
        return Some(format!("{}\n\n{}", summary.join("\n"), AUDIO_SUMMARY_NOTE));
    }

    if is_image_report(&lower) {
        if content.chars().count() > IMAGE_SUMMARY_CHARS {
            return Some(format!(
                "{}...[truncated for session efficiency]",
                char_prefix(content, IMAGE_SUMMARY_CHARS)
            ));
        }
        return Some(content.to_string());
    }

    None
}

/// Cap `content` strictly below `max_chars` characters, marking the cut.
pub fn truncate_content(content: &str, max_chars: usize) -> String {
    if content.chars().count() <= max_chars {
        return content.to_string();
    }
    let keep = max_chars.saturating_sub(CONTENT_TRUNCATED_MARKER.chars().count() + 1);
    format!("{}{}", char_prefix(content, keep), CONTENT_TRUNCATED_MARKER)
}

/// Everything a message goes through before it enters the history.
pub fn preprocess(content: &str, max_chars: usize) -> String {
    let stripped = strip_inline_binary(content);
    match summarize_multimodal(&stripped) {
        Some(summary) => truncate_content(&summary, max_chars),
        None => truncate_content(&stripped, max_chars),
    }
}

fn is_audio_content(content: &str) -> bool {
    content.contains("🎤 **Audio Processing Complete**") || content.contains(AUDIO_SUMMARY_NOTE)
}

/// Drop multimodal metadata, keeping the lines that carry meaning, then cap
/// the result at `max_chars` characters.
pub fn strip_metadata(content: &str, max_chars: usize) -> String {
    let mut content = if is_audio_content(content) {
        let mut essential: Vec<&str> = Vec::new();
        for line in content.lines() {
            if line.contains("**AI Analysis**:") || line.contains("**Transcription**:") {
                essential.push(line);
            } else if line.starts_with("**") && essential.len() < 3 {
                essential.push(line);
            }
        }
        format!("{}\n{}", essential.join("\n"), AUDIO_METADATA_NOTE)
    } else {
        content.to_string()
    };

    content = inline_binary_re()
        .replace_all(&content, |caps: &Captures| {
            if &caps[1] == "audio" {
                "[audio]"
            } else {
                "[image]"
            }
        })
        .into_owned();

    let content = content
        .replace(IMAGE_DATA_PLACEHOLDER, "[image]")
        .replace(AUDIO_DATA_PLACEHOLDER, "[audio]");

    if content.chars().count() > max_chars {
        format!("{}{}", char_prefix(&content, max_chars), CONTENT_TRIMMED_MARKER)
    } else {
        content
    }
}

/// Reject empty input and input over [`MAX_INPUT_CHARS`].
pub fn validate_input(message: &str) -> Result<()> {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        return Err(StoreError::InvalidInput("message is empty".into()));
    }
    let len = trimmed.chars().count();
    if len > MAX_INPUT_CHARS {
        return Err(StoreError::InvalidInput(format!(
            "message is {} characters, limit is {}",
            len, MAX_INPUT_CHARS
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_inline_binary() {
        let content = format!("look: data:image/png;base64,{} done", "QUJD".repeat(1000));
        let stripped = strip_inline_binary(&content);
        assert_eq!(stripped, format!("look: {} done", IMAGE_DATA_PLACEHOLDER));

        let audio = "data:audio/wav;base64,AAAA";
        assert_eq!(strip_inline_binary(audio), AUDIO_DATA_PLACEHOLDER);
    }

    #[test]
    fn test_strip_inline_binary_leaves_plain_text() {
        let content = "no binary here";
        assert!(matches!(strip_inline_binary(content), Cow::Borrowed(_)));
    }

    #[test]
    fn test_truncate_content_below_cap() {
        assert_eq!(truncate_content("short", 10), "short");

        let long = "é".repeat(500);
        let truncated = truncate_content(&long, 200);
        assert!(truncated.chars().count() < 200);
        assert!(truncated.ends_with(CONTENT_TRUNCATED_MARKER));
    }

    #[test]
    fn test_summarize_audio_report() {
        let report = format!(
            "🎤 **Audio Processing Complete**\n**File**: clip.wav\n**Duration**: 3s\n**Transcription**: {}\n**AI Analysis**: calm speaker",
            "word ".repeat(100)
        );
        let summary = summarize_multimodal(&report).unwrap();
        assert!(summary.contains("**File**: clip.wav"));
        assert!(!summary.contains("**Duration**"));
        assert!(summary.contains("...[truncated]"));
        assert!(summary.ends_with(AUDIO_SUMMARY_NOTE));
    }

    #[test]
    fn test_summarize_image_report() {
        let report = format!("🖼️ **Image Analysis**\n{}", "detail ".repeat(200));
        let summary = summarize_multimodal(&report).unwrap();
        assert!(summary.ends_with("...[truncated for session efficiency]"));
        assert!(summary.chars().count() < 600);

        assert!(summarize_multimodal("plain answer").is_none());
    }

    #[test]
    fn test_strip_metadata_audio() {
        let report = "🎤 **Audio Processing Complete**\n**File**: a.wav\n**Size**: 2MB\n**Format**: wav\n**Bitrate**: 128k\n**Transcription**: hello\n**AI Analysis**: greeting";
        let stripped = strip_metadata(report, 300);
        assert!(stripped.contains("**Transcription**: hello"));
        assert!(stripped.contains("**AI Analysis**: greeting"));
        assert!(!stripped.contains("**Bitrate**"));
        assert!(stripped.ends_with(AUDIO_METADATA_NOTE));
    }

    #[test]
    fn test_strip_metadata_collapses_placeholders() {
        let content = format!("see {}", IMAGE_DATA_PLACEHOLDER);
        assert_eq!(strip_metadata(&content, 300), "see [image]");
    }

    #[test]
    fn test_strip_metadata_reduces_summarized_audio() {
        let report = format!(
            "🎤 **Audio Processing Complete**\n**File**: clip.wav\n**Request**: {}\n**Transcription**: {}\n**AI Analysis**: {}",
            "why ".repeat(60),
            "word ".repeat(60),
            "calm ".repeat(60)
        );
        let summary = preprocess(&report, 8000);
        assert!(summary.ends_with(AUDIO_SUMMARY_NOTE));

        let stripped = strip_metadata(&summary, 300);
        assert_ne!(stripped, summary);
        assert!(!stripped.contains(AUDIO_SUMMARY_NOTE));
        assert!(stripped.starts_with("**File**: clip.wav"));
        assert!(stripped.ends_with(CONTENT_TRIMMED_MARKER));
        assert_eq!(
            stripped.chars().count(),
            300 + CONTENT_TRIMMED_MARKER.chars().count()
        );
    }

    #[test]
    fn test_strip_metadata_caps_plain_content() {
        let long = "é".repeat(5000);
        let stripped = strip_metadata(&long, 300);
        assert!(stripped.ends_with(CONTENT_TRIMMED_MARKER));
        assert_eq!(stripped.chars().count(), 300 + CONTENT_TRIMMED_MARKER.chars().count());

        assert_eq!(strip_metadata("short", 300), "short");
    }

    #[test]
    fn test_validate_input() {
        assert!(validate_input("hello").is_ok());
        assert!(validate_input("   ").is_err());
        assert!(validate_input(&"x".repeat(MAX_INPUT_CHARS + 1)).is_err());
        assert!(validate_input(&format!("  {}  ", "x".repeat(MAX_INPUT_CHARS))).is_ok());
    }
}
