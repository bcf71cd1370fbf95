//! Number provider port (driven/secondary port)
//!
//! This module defines the interface for the phone-number vendor. The
//! production adapter lives in `numbridge-vendor` and wraps the
//! rate-governed HTTP client; tests substitute in-memory fakes.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because errors at port boundaries are adapter-specific
//!   and don't need domain-level classification. Adapters put the vendor's
//!   `error`/`detail` text in the error message so it can be shown as-is.
//! - Uses `#[async_trait]` for async trait methods.

use crate::domain::{NumberList, PurchaseOrder, PurchaseReceipt, SmsPage};

/// Port trait for the phone-number vendor
///
/// Implementations are expected to respect the vendor's rate limits
/// internally; callers may invoke these methods concurrently.
#[async_trait::async_trait]
pub trait NumberProvider: Send + Sync {
    /// Returns every number on the account, across all pages
    async fn list_numbers(&self) -> anyhow::Result<NumberList>;

    /// Purchases one number
    ///
    /// # Arguments
    /// * `order` - Country, rental period and the unique `custom_name`
    async fn purchase(&self, order: &PurchaseOrder) -> anyhow::Result<PurchaseReceipt>;

    /// Fetches one page of SMS received by a number
    ///
    /// # Arguments
    /// * `number_id` - Vendor identifier (`piv_num_id`)
    /// * `limit` / `offset` - Page window
    async fn get_sms(&self, number_id: &str, limit: u32, offset: u32) -> anyhow::Result<SmsPage>;
}
