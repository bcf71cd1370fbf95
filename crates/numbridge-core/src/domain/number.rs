//! Phone number entities returned by the vendor listing endpoint

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};

/// A rented phone number as reported by the vendor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneNumber {
    /// Vendor-side identifier, used for the SMS endpoint
    ///
    /// The vendor sends either a string or an integer.
    #[serde(default, deserialize_with = "string_or_number")]
    pub piv_num_id: String,
    /// E.164 phone number, e.g. `+447426917510`
    #[serde(default)]
    pub phone_number: String,
    /// Free-form label assigned at purchase time
    #[serde(default)]
    pub custom_name: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    /// Rental status (`active`, `expired`, ...)
    #[serde(default)]
    pub status: Option<String>,
    /// ISO-8601 expiry timestamp
    #[serde(default)]
    pub expires_at: Option<String>,
}

impl PhoneNumber {
    /// Returns true when the vendor reports the rental as active.
    pub fn is_active(&self) -> bool {
        self.status.as_deref() == Some("active")
    }

    /// Parses `expires_at`, returning `None` when absent or malformed.
    pub fn expires(&self) -> Option<DateTime<FixedOffset>> {
        self.expires_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
    }

    /// Matches a free-text query against the phone number or custom name.
    ///
    /// Phone comparison ignores spaces, dashes and parentheses; the custom
    /// name comparison is a case-insensitive substring match.
    pub fn matches_query(&self, query: &str) -> bool {
        let query_lower = query.trim().to_lowercase();
        if query_lower.is_empty() {
            return false;
        }

        let query_digits = strip_phone_punctuation(&query_lower);
        let phone = strip_phone_punctuation(&self.phone_number);
        if !query_digits.is_empty() && phone.contains(&query_digits) {
            return true;
        }

        self.custom_name
            .as_deref()
            .map(|name| name.to_lowercase().contains(&query_lower))
            .unwrap_or(false)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Signed(i64),
    Unsigned(u64),
    Float(f64),
    Flag(bool),
}

/// Reads a string, number or null into a `String`; null becomes empty.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Scalar>::deserialize(deserializer)? {
        None => String::new(),
        Some(Scalar::Text(s)) => s,
        Some(Scalar::Signed(n)) => n.to_string(),
        Some(Scalar::Unsigned(n)) => n.to_string(),
        Some(Scalar::Float(n)) => n.to_string(),
        Some(Scalar::Flag(b)) => b.to_string(),
    })
}

fn strip_phone_punctuation(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect()
}

/// Pagination block attached to list responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub total: u64,
    #[serde(default)]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

/// The complete set of numbers on the account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberList {
    pub numbers: Vec<PhoneNumber>,
    pub pagination: Pagination,
}

impl NumberList {
    /// Returns the first number matching `query`, if any.
    pub fn find(&self, query: &str) -> Option<&PhoneNumber> {
        self.numbers.iter().find(|n| n.matches_query(query))
    }
}
