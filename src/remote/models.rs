//! SharePoint REST response shapes
//!
//! Requests ask for `odata=nometadata`, so payloads are plain objects and
//! collections arrive wrapped in `{"value": [...]}`.

use chrono::DateTime;
use serde::{Deserialize, Deserializer};

/// A file as returned by `GetFileByServerRelativeUrl`, `Files/add`,
/// `FinishUpload` and folder `Files` listings
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FileProps {
    pub name: String,
    pub server_relative_url: String,
    /// Int64 is serialized as a JSON string by the service
    #[serde(default, deserialize_with = "deserialize_opt_u64")]
    pub length: Option<u64>,
    #[serde(default)]
    pub time_last_modified: Option<String>,
    #[serde(default)]
    pub exists: Option<bool>,
}

/// A folder as returned by `GetFolderByServerRelativeUrl`, `Folders/add`
/// and folder `Folders` listings
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FolderProps {
    pub name: String,
    pub server_relative_url: String,
    #[serde(default, deserialize_with = "deserialize_opt_u64")]
    pub item_count: Option<u64>,
    #[serde(default)]
    pub time_last_modified: Option<String>,
    #[serde(default)]
    pub exists: Option<bool>,
}

impl FileProps {
    pub fn exists(&self) -> bool {
        self.exists != Some(false)
    }
}

impl FolderProps {
    pub fn exists(&self) -> bool {
        self.exists != Some(false)
    }
}

/// Collection wrapper; `next_link` is set when the service paged the result
#[derive(Debug, Deserialize)]
pub struct Collection<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    #[serde(rename = "odata.nextLink", alias = "@odata.nextLink", default)]
    pub next_link: Option<String>,
}

/// Scalar result of `StartUpload`/`ContinueUpload`: the new byte offset
#[derive(Debug, Deserialize)]
pub struct UploadOffset {
    #[serde(deserialize_with = "deserialize_u64")]
    pub value: u64,
}

/// Result of `POST /_api/contextinfo`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContextInfo {
    pub form_digest_value: String,
}

/// Seconds since the epoch for a `TimeLastModified` value.
pub fn parse_timestamp(value: &str) -> Option<i64> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.timestamp())
}

fn deserialize_u64<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    deserialize_opt_u64(d)?.ok_or_else(|| serde::de::Error::custom("expected an integer"))
}

/// Numbers may arrive as JSON numbers or as numeric strings.
fn deserialize_opt_u64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    let v = serde_json::Value::deserialize(d)?;
    match v {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Number(n) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("not an unsigned integer: {}", n))),
        serde_json::Value::String(s) => s
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("not a numeric string: {}", s))),
        other => Err(serde::de::Error::custom(format!(
            "expected integer, got {}",
            other
        ))),
    }
}
