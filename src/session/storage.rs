use crate::error::Result;

/// Key/value view of a per-user session (a signed cookie, a server-side
/// session row, a file). Values are opaque strings.
pub trait SessionBackend: Send {
    /// Fetch a value, `None` if the key is absent
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a value, replacing any previous one
    fn set(&mut self, key: &str, value: String) -> Result<()>;

    /// Remove a key; removing an absent key is not an error
    fn remove(&mut self, key: &str) -> Result<()>;

    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }
}
