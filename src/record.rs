use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// An ordered list of record identifiers, as returned by a search. Order is meaningful and
/// duplicates are kept.
pub type IdentifierList = Vec<String>;

/// A single fetched entry.
///
/// The serde names are the keys of the JSON object stored in the cache, so that values written
/// by earlier versions of the tooling remain readable.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug, Default)]
pub struct Record {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Sequence")]
    pub sequence: String,
}

impl Record {
    /// Serializes the record into the value stored under `self.id`.
    pub fn to_cache_value(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Inverse of `to_cache_value`, reading the raw bytes held by the cache. Every one of the
    /// four keys must be present and the value must be valid UTF-8.
    pub fn from_cache_value(value: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(value)
    }

    /// Appends this record's report block, including the trailing blank line, to `out`.
    pub fn write_block(&self, out: &mut impl Write) -> std::fmt::Result {
        write!(
            out,
            "ID: {}\nName: {}\nDescription: {}\nSequence: {}\n\n",
            self.id, self.name, self.description, self.sequence
        )
    }
}
