use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// On-disk shape of a filesystem-backed session.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SessionFile {
    pub session_id: String,
    pub last_updated: chrono::DateTime<chrono::Local>,
    #[serde(default)]
    pub values: BTreeMap<String, String>,
}
