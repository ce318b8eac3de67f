use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Store-assigned identifier for users and todos.
///
/// Callers only ever build one through [`RecordId::new`] (for inserts) or
/// [`RecordId::parse`] (for ids arriving from the outside), so the rest of
/// the code never depends on the underlying encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns `None` when `raw` is not a well-formed id.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        Uuid::parse_str(raw).ok().map(Self)
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_display_output() {
        let id = RecordId::new();
        assert_eq!(RecordId::parse(&id.to_string()), Some(id));
    }

    #[test]
    fn parse_rejects_malformed() {
        assert_eq!(RecordId::parse(""), None);
        assert_eq!(RecordId::parse("   "), None);
        assert_eq!(RecordId::parse("42"), None);
        assert_eq!(RecordId::parse("not-an-id"), None);
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = RecordId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
    }
}
