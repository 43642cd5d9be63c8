use serde::{Deserialize, Serialize};

/// Name of the HTML meta entry carrying the sealed password manifest.
pub const MANIFEST_META_NAME: &str = "exercises-passwords";

/// One element of the serialized password manifest.
///
/// A manifest is a JSON array of records: an optional leading
/// `{"master password": "..."}` followed by
/// `{"passwords": [["label", "password"], ...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ManifestRecord {
    #[serde(rename = "master password")]
    MasterPassword(String),
    #[serde(rename = "passwords")]
    Passwords(Vec<(String, String)>),
}
