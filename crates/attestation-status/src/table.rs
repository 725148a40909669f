//! Status-list parsing and the in-memory lookup table
//!
//! The status list is a JSON document of the form
//!
//! ```text
//! { "entries": { "<hex-serial>": { "status": "<string>", "reason": "<string>" }, ... } }
//! ```
//!
//! [`StatusTable::parse`] turns it into a map keyed by lowercase hex serial.
//! Entries that do not carry both string fields are kept as malformed markers
//! so that only a lookup of that exact key reports the problem.

use super::error::StatusError;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::hash_map::{Entry, HashMap};
use std::fmt;
use tracing::warn;

/// Disposition of one certificate in the status list
///
/// Both fields are opaque strings in the authority's vocabulary
/// (`REVOKED`, `SUSPENDED`, `KEY_COMPROMISE`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevocationRecord {
    status: String,
    reason: String,
}

impl RevocationRecord {
    pub fn new(status: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            reason: reason.into(),
        }
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Display for RevocationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "status is {}, reason is {}", self.status, self.reason)
    }
}

/// Wire/disk representation of the status list
#[derive(Debug, Deserialize)]
struct RawStatusDocument {
    entries: HashMap<String, serde_json::Value>,
}

/// One parsed table slot
#[derive(Debug, Clone, PartialEq, Eq)]
enum TableEntry {
    Record(RevocationRecord),
    /// Entry present but unusable, with the parse failure
    Malformed(String),
}

/// Precedence of a raw key among keys that normalize alike: usable records
/// first, then a key already in normalized form, then the smaller raw key
fn precedence<'a>(
    raw_key: &'a str,
    entry: &TableEntry,
    key: &str,
) -> (bool, bool, Reverse<&'a str>) {
    (
        matches!(entry, TableEntry::Record(_)),
        raw_key == key,
        Reverse(raw_key),
    )
}

/// Where a settled table came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableSource {
    /// Fetched from the remote endpoint
    Remote,
    /// Parsed from the bundled or configured snapshot
    LocalSnapshot,
    /// Both sources failed, no entries
    Empty,
}

impl fmt::Display for TableSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TableSource::Remote => "remote",
            TableSource::LocalSnapshot => "local",
            TableSource::Empty => "empty",
        };
        f.write_str(name)
    }
}

/// Immutable map from lowercase hex serial to revocation record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusTable {
    entries: HashMap<String, TableEntry>,
}

impl StatusTable {
    /// Table with no entries; every lookup reports "no record"
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a status document
    ///
    /// Fails with [`StatusError::ParseError`] when the bytes are not JSON or
    /// the top-level `entries` object is missing. Individual bad entries do
    /// not fail the parse.
    ///
    /// Raw keys that differ only in case or surrounding whitespace share one
    /// slot. The kept entry does not depend on document order: a usable
    /// record beats a malformed one, then an already-lowercase key beats
    /// the others.
    pub fn parse(bytes: &[u8]) -> Result<Self, StatusError> {
        let document: RawStatusDocument = serde_json::from_slice(bytes)?;

        let mut slots: HashMap<String, (String, TableEntry)> =
            HashMap::with_capacity(document.entries.len());
        for (raw_key, value) in document.entries {
            let entry = match serde_json::from_value::<RevocationRecord>(value) {
                Ok(record) => TableEntry::Record(record),
                Err(e) => TableEntry::Malformed(e.to_string()),
            };

            match slots.entry(raw_key.trim().to_ascii_lowercase()) {
                Entry::Vacant(slot) => {
                    slot.insert((raw_key, entry));
                }
                Entry::Occupied(mut slot) => {
                    let (kept_key, kept) = slot.get();
                    let replace = precedence(&raw_key, &entry, slot.key())
                        > precedence(kept_key, kept, slot.key());
                    let dropped = if replace {
                        slot.insert((raw_key, entry)).0
                    } else {
                        raw_key
                    };
                    warn!(key = %slot.key(), dropped = %dropped, "Duplicate status list key dropped");
                }
            }
        }

        let entries = slots
            .into_iter()
            .map(|(key, (_, entry))| (key, entry))
            .collect();
        Ok(Self { entries })
    }

    /// Look up a normalized hex key
    ///
    /// `Ok(None)` means the list has no entry for this serial, which is not
    /// the same as "revoked".
    pub fn get(&self, key: &str) -> Result<Option<&RevocationRecord>, StatusError> {
        match self.entries.get(key) {
            None => Ok(None),
            Some(TableEntry::Record(record)) => Ok(Some(record)),
            Some(TableEntry::Malformed(reason)) => Err(StatusError::EntryMalformed {
                serial: key.to_string(),
                reason: reason.clone(),
            }),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries, malformed ones included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_entry() {
        let table = StatusTable::parse(
            br#"{"entries":{"ff":{"status":"REVOKED","reason":"KEY_COMPROMISE"}}}"#,
        )
        .unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(
            table.get("ff").unwrap(),
            Some(&RevocationRecord::new("REVOKED", "KEY_COMPROMISE"))
        );
        assert_eq!(table.get("fe").unwrap(), None);
    }

    #[test]
    fn test_keys_are_lowercased() {
        let table = StatusTable::parse(
            br#"{"entries":{"1A2B":{"status":"SUSPENDED","reason":"SOFTWARE_UPDATE_PENDING"}}}"#,
        )
        .unwrap();

        assert!(table.contains_key("1a2b"));
        assert!(!table.contains_key("1A2B"));
        assert_eq!(
            table.get("1a2b").unwrap().map(RevocationRecord::status),
            Some("SUSPENDED")
        );
    }

    #[test]
    fn test_malformed_entry_only_fails_its_own_key() {
        let table = StatusTable::parse(
            br#"{"entries":{
                "aa":{"status":"REVOKED"},
                "bb":{"status":"REVOKED","reason":"UNSPECIFIED"},
                "cc":"REVOKED"
            }}"#,
        )
        .unwrap();

        assert_eq!(table.len(), 3);
        assert!(matches!(
            table.get("aa"),
            Err(StatusError::EntryMalformed { ref serial, .. }) if serial == "aa"
        ));
        assert!(matches!(table.get("cc"), Err(StatusError::EntryMalformed { .. })));
        assert_eq!(
            table.get("bb").unwrap(),
            Some(&RevocationRecord::new("REVOKED", "UNSPECIFIED"))
        );
    }

    #[test]
    fn test_case_collision_keeps_lowercase_record() {
        let document = br#"{"entries":{
            "ff":{"status":"REVOKED","reason":"KEY_COMPROMISE"},
            "FF":{"status":"REVOKED"}
        }}"#;

        for _ in 0..50 {
            let table = StatusTable::parse(document).unwrap();
            assert_eq!(table.len(), 1);
            assert_eq!(
                table.get("ff").unwrap(),
                Some(&RevocationRecord::new("REVOKED", "KEY_COMPROMISE"))
            );
        }
    }

    #[test]
    fn test_case_collision_prefers_lowercase_key() {
        let document = br#"{"entries":{
            "Ab":{"status":"SUSPENDED","reason":"UNSPECIFIED"},
            "ab":{"status":"REVOKED","reason":"KEY_COMPROMISE"},
            "AB":{"status":"SUSPENDED","reason":"SUPERSEDED"}
        }}"#;

        for _ in 0..50 {
            let table = StatusTable::parse(document).unwrap();
            assert_eq!(
                table.get("ab").unwrap().map(RevocationRecord::status),
                Some("REVOKED")
            );
        }
    }

    #[test]
    fn test_case_collision_record_beats_malformed_lowercase() {
        let document = br#"{"entries":{
            "c0":"REVOKED",
            "C0":{"status":"REVOKED","reason":"CA_COMPROMISE"}
        }}"#;

        for _ in 0..50 {
            let table = StatusTable::parse(document).unwrap();
            assert_eq!(
                table.get("c0").unwrap(),
                Some(&RevocationRecord::new("REVOKED", "CA_COMPROMISE"))
            );
        }
    }

    #[test]
    fn test_case_collision_between_uppercase_variants_is_stable() {
        let document = br#"{"entries":{
            "dE":{"status":"REVOKED","reason":"FIRST"},
            "De":{"status":"REVOKED","reason":"SECOND"}
        }}"#;

        // "De" sorts before "dE"
        for _ in 0..50 {
            let table = StatusTable::parse(document).unwrap();
            assert_eq!(
                table.get("de").unwrap().map(RevocationRecord::reason),
                Some("SECOND")
            );
        }
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let table = StatusTable::parse(
            br#"{"entries":{"01":{"status":"REVOKED","reason":"CA_COMPROMISE","comment":"x","expires":"2030-01-01"}}}"#,
        )
        .unwrap();
        assert_eq!(
            table.get("01").unwrap(),
            Some(&RevocationRecord::new("REVOKED", "CA_COMPROMISE"))
        );
    }

    #[test]
    fn test_missing_entries_is_parse_error() {
        let result = StatusTable::parse(br#"{"items":{}}"#);
        assert!(matches!(result, Err(StatusError::ParseError(_))));
    }

    #[test]
    fn test_truncated_document_is_parse_error() {
        let result = StatusTable::parse(br#"{"entries":{"ff":{"status":"REV"#);
        assert!(matches!(result, Err(StatusError::ParseError(_))));

        assert!(StatusTable::parse(b"").is_err());
        assert!(StatusTable::parse(b"<html>502 Bad Gateway</html>").is_err());
    }

    #[test]
    fn test_empty_entries() {
        let table = StatusTable::parse(br#"{"entries":{}}"#).unwrap();
        assert!(table.is_empty());
        assert_eq!(table, StatusTable::empty());
    }

    #[test]
    fn test_record_display() {
        let record = RevocationRecord::new("REVOKED", "KEY_COMPROMISE");
        assert_eq!(record.to_string(), "status is REVOKED, reason is KEY_COMPROMISE");
    }

    #[test]
    fn test_table_source_serialization() {
        let json = serde_json::to_string(&TableSource::LocalSnapshot).unwrap();
        assert_eq!(json, "\"local_snapshot\"");
        assert_eq!(TableSource::Remote.to_string(), "remote");
    }
}
