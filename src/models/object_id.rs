use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Length of a store identifier in hex characters.
pub const OBJECT_ID_LEN: usize = 24;

static OBJECT_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^[0-9a-fA-F]{{{OBJECT_ID_LEN}}}$")).expect("object id pattern is valid")
});

/// Returns true if `value` has the shape of a store identifier.
///
/// Purely syntactic, the store is never consulted.
pub fn is_valid_object_id(value: &str) -> bool {
    OBJECT_ID_RE.is_match(value)
}

/// Store-assigned document identifier, kept as its hex string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    /// Fresh identifier for a new document.
    pub fn generate() -> Self {
        ObjectId(bson::oid::ObjectId::new().to_hex())
    }

    pub fn parse(value: &str) -> Option<Self> {
        is_valid_object_id(value).then(|| ObjectId(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
