use super::codec;
use super::content::{self, SIZE_TRUNCATED_MARKER};
use crate::config::StoreConfig;
use crate::error::Result;
use crate::models::{Message, Role};
use crate::session::SessionBackend;
use serde::Serialize;
use tracing::{debug, error, info, warn};

/// Whether a storage failure must reach the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Serving a real user request: write failures are returned
    #[default]
    Interactive,
    /// Background jobs and tooling: write failures are logged and ignored
    Background,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionStatus {
    pub payload_bytes: usize,
    pub messages: usize,
    pub legacy_present: bool,
    pub healthy: bool,
}

/// Conversation history of one session, kept under a byte ceiling.
///
/// The history is stored as a single compressed payload in the session. On
/// every append the store evicts the oldest turns first, then strips
/// multimodal metadata from the newest message, and as a last resort
/// truncates it.
pub struct ConversationStore<B: SessionBackend> {
    backend: B,
    config: StoreConfig,
    mode: ExecutionMode,
}

impl<B: SessionBackend> ConversationStore<B> {
    /// Fails with `StoreError::Config` when `config` does not validate.
    pub fn new(backend: B, config: StoreConfig, mode: ExecutionMode) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            backend,
            config,
            mode,
        })
    }

    pub fn with_defaults(backend: B) -> Self {
        Self {
            backend,
            config: StoreConfig::default(),
            mode: ExecutionMode::Interactive,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Full history, oldest first. Never fails: unreadable state reads as an
    /// empty conversation. A legacy plain-JSON history is migrated on the way.
    pub fn read(&mut self) -> Vec<Message> {
        match self.backend.get(&self.config.compressed_key) {
            Ok(Some(payload)) if !payload.is_empty() => {
                return match codec::decode(&payload, self.config.max_decoded_bytes) {
                    Ok(messages) => messages,
                    Err(e) => {
                        warn!(error = %e, "discarding unreadable conversation payload");
                        Vec::new()
                    }
                };
            }
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "session read failed, treating conversation as empty");
                return Vec::new();
            }
        }

        self.migrate_legacy()
    }

    /// The last `n` messages, for building model context.
    pub fn recent(&mut self, n: usize) -> Vec<Message> {
        let history = self.read();
        let skip = history.len().saturating_sub(n);
        history.into_iter().skip(skip).collect()
    }

    pub fn append(&mut self, role: Role, content: &str) -> Result<()> {
        let result = self.try_append(role, content);
        self.apply_mode("append", result)
    }

    /// Remove the conversation in every persisted form.
    pub fn clear(&mut self) -> Result<()> {
        let result = self.remove_payloads();
        self.apply_mode("clear", result)
    }

    pub fn status(&self) -> SessionStatus {
        let payload = self
            .backend
            .get(&self.config.compressed_key)
            .ok()
            .flatten()
            .unwrap_or_default();
        let legacy = self.backend.get(&self.config.legacy_key).ok().flatten();

        let messages = if !payload.is_empty() {
            codec::decode(&payload, self.config.max_decoded_bytes)
                .map(|m| m.len())
                .unwrap_or(0)
        } else {
            legacy
                .as_deref()
                .and_then(|raw| codec::parse_legacy(raw).ok())
                .map(|m| m.len())
                .unwrap_or(0)
        };

        SessionStatus {
            payload_bytes: payload.len(),
            messages,
            legacy_present: legacy.is_some(),
            healthy: payload.len() < self.config.ceiling_bytes,
        }
    }

    fn try_append(&mut self, role: Role, content: &str) -> Result<()> {
        let existing = self.read();
        let message = Message::new(
            role,
            content::preprocess(content, self.config.max_content_chars),
        );
        let history = self.fit_to_budget(existing, message)?;
        self.write_payload(&history)
    }

    fn migrate_legacy(&mut self) -> Vec<Message> {
        let raw = match self.backend.get(&self.config.legacy_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(error = %e, "legacy conversation read failed");
                return Vec::new();
            }
        };

        let messages = match codec::parse_legacy(&raw) {
            Ok(messages) => messages,
            Err(e) => {
                warn!(error = %e, "discarding unreadable legacy conversation");
                return Vec::new();
            }
        };
        if messages.is_empty() {
            return messages;
        }

        let migrated = self.fit_legacy(&messages).and_then(|h| self.write_payload(&h));
        match migrated {
            Ok(()) => info!(messages = messages.len(), "migrated legacy conversation"),
            Err(e) => warn!(error = %e, "legacy conversation migration failed"),
        }
        messages
    }

    fn fit_legacy(&self, messages: &[Message]) -> Result<Vec<Message>> {
        let mut processed: Vec<Message> = messages
            .iter()
            .map(|m| {
                Message::new(
                    m.role,
                    content::preprocess(&m.content, self.config.max_content_chars),
                )
            })
            .collect();
        match processed.pop() {
            Some(newest) => self.fit_to_budget(processed, newest),
            None => Ok(processed),
        }
    }

    /// Degradation ladder: evict oldest, strip metadata, truncate newest.
    ///
    /// Eviction measures against the full ceiling, so a lone message that
    /// fits under it is kept as is. `overhead_reserve` only applies once the
    /// newest message has to be stripped or truncated.
    fn fit_to_budget(&self, existing: Vec<Message>, newest: Message) -> Result<Vec<Message>> {
        let ceiling = self.config.ceiling_bytes;
        let mut history = existing;
        history.push(newest);

        let mut size = codec::encoded_len(&history)?;
        if size <= ceiling {
            return Ok(history);
        }

        // Linear scan; the newest message is never evicted here
        while size > ceiling && history.len() > 1 {
            let evicted = history.remove(0);
            debug!(role = %evicted.role, chars = evicted.content.len(), "evicting oldest message");
            size = codec::encoded_len(&history)?;
        }
        if size <= ceiling {
            return Ok(history);
        }

        let budget = ceiling.saturating_sub(self.config.overhead_reserve);
        let mut newest = history.remove(0);
        let stripped =
            content::strip_metadata(&newest.content, self.config.stripped_content_chars);
        if stripped != newest.content {
            newest.content = stripped;
            if codec::encoded_len(std::slice::from_ref(&newest))? <= budget {
                debug!("multimodal metadata stripped to fit ceiling");
                return Ok(vec![newest]);
            }
        }

        self.truncate_to_fit(newest, budget)
    }

    /// Longest prefix of the message that fits `budget` with the marker
    /// appended. An empty history if not even the marker fits.
    fn truncate_to_fit(&self, message: Message, budget: usize) -> Result<Vec<Message>> {
        let boundaries: Vec<usize> = message
            .content
            .char_indices()
            .map(|(idx, _)| idx)
            .chain(std::iter::once(message.content.len()))
            .collect();
        let candidate = |chars: usize| {
            vec![Message::new(
                message.role,
                format!(
                    "{}{}",
                    &message.content[..boundaries[chars]],
                    SIZE_TRUNCATED_MARKER
                ),
            )]
        };
        let fits = |chars: usize| -> Result<bool> {
            Ok(codec::encoded_len(&candidate(chars))? <= budget)
        };

        if !fits(0)? {
            warn!(budget, "ceiling too small for any message, storing empty history");
            return Ok(Vec::new());
        }

        let (mut lo, mut hi) = (0, boundaries.len() - 1);
        while lo < hi {
            let mid = lo + (hi - lo + 1) / 2;
            if fits(mid)? {
                lo = mid;
            } else {
                hi = mid - 1;
            }
        }

        info!(
            kept_chars = lo,
            original_chars = boundaries.len() - 1,
            "truncated message to fit session ceiling"
        );
        Ok(candidate(lo))
    }

    fn write_payload(&mut self, history: &[Message]) -> Result<()> {
        if history.is_empty() {
            return self.remove_payloads();
        }
        let payload = codec::encode(history)?;
        self.backend.set(&self.config.compressed_key, payload)?;
        self.backend.remove(&self.config.legacy_key)?;
        Ok(())
    }

    fn remove_payloads(&mut self) -> Result<()> {
        self.backend.remove(&self.config.compressed_key)?;
        self.backend.remove(&self.config.legacy_key)?;
        Ok(())
    }

    fn apply_mode(&self, operation: &str, result: Result<()>) -> Result<()> {
        match (result, self.mode) {
            (Ok(()), _) => Ok(()),
            (Err(e), ExecutionMode::Interactive) => {
                error!(operation, error = %e, "session storage failed during interactive request");
                Err(e)
            }
            (Err(e), ExecutionMode::Background) => {
                debug!(operation, error = %e, "ignoring session storage failure");
                Ok(())
            }
        }
    }
}
