//! Purchase orders and receipts

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use super::number::PhoneNumber;
use crate::config::PurchaseConfig;

/// Format of the timestamp-derived `custom_name`, millisecond precision.
pub const CUSTOM_NAME_FORMAT: &str = "%m/%d/%Y_%H:%M:%S%.3f";

/// Body of a single `POST /numbers/purchase/` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub country_code: String,
    pub duration_months: u32,
    pub auto_renew: bool,
    pub custom_name: String,
}

impl PurchaseOrder {
    /// Builds an order from the configured defaults, naming it after `now`.
    pub fn stamped<Tz: TimeZone>(config: &PurchaseConfig, now: &DateTime<Tz>) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        Self {
            country_code: config.country_code.clone(),
            duration_months: config.duration_months,
            auto_renew: config.auto_renew,
            custom_name: now.format(CUSTOM_NAME_FORMAT).to_string(),
        }
    }
}

/// What the vendor returns for a successful purchase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PurchaseReceipt {
    #[serde(default)]
    pub numbers: Vec<PhoneNumber>,
    /// Credits charged
    #[serde(default)]
    pub cost: f64,
}
