pub fn default_ceiling_bytes() -> usize {
    3500 // Stays well under the 4093-byte cookie limit once signed
}

pub fn default_overhead_reserve() -> usize {
    100
}

pub fn default_max_content_chars() -> usize {
    8000
}

pub fn default_stripped_content_chars() -> usize {
    300
}

pub fn default_max_decoded_bytes() -> usize {
    1_048_576 // 1MB
}

pub fn default_compressed_key() -> String {
    "conversation_compressed".to_string()
}

pub fn default_legacy_key() -> String {
    "conversation".to_string()
}
