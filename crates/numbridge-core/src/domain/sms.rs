//! SMS messages received on a rented number

use serde::{de::IgnoredAny, Deserialize, Deserializer, Serialize};

use super::number::Pagination;

/// A single inbound SMS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsMessage {
    #[serde(default)]
    pub from_number: Option<String>,
    #[serde(default)]
    pub message_body: String,
    /// Code extracted by the vendor, when it recognised one
    #[serde(default)]
    pub verification_code: Option<String>,
    #[serde(default)]
    pub received_at: Option<String>,
}

/// One page of the SMS endpoint, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsPage {
    #[serde(default)]
    pub messages: Vec<SmsMessage>,
    /// Absent when the vendor omits it or sends one without a `total`
    #[serde(default, deserialize_with = "optional_pagination")]
    pub pagination: Option<Pagination>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MaybePagination {
    Valid(Pagination),
    Other(IgnoredAny),
}

fn optional_pagination<'de, D>(deserializer: D) -> Result<Option<Pagination>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match MaybePagination::deserialize(deserializer)? {
        MaybePagination::Valid(p) => Some(p),
        MaybePagination::Other(_) => None,
    })
}

impl SmsPage {
    /// Total reported by the vendor, falling back to the page length.
    pub fn total(&self) -> u64 {
        self.pagination
            .map(|p| p.total)
            .unwrap_or(self.messages.len() as u64)
    }

    /// The `count` most recent messages.
    pub fn most_recent(&self, count: usize) -> &[SmsMessage] {
        &self.messages[..count.min(self.messages.len())]
    }
}
