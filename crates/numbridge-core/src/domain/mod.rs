//! Domain entities and business logic
//!
//! This module contains the core domain types for Numbridge:
//! - Rented phone numbers and the aggregated listing
//! - SMS messages received on a number
//! - Purchase orders and receipts
//! - Domain-specific error types

pub mod errors;
pub mod number;
pub mod purchase;
pub mod sms;

// Re-export commonly used types
pub use errors::DomainError;
pub use number::{NumberList, Pagination, PhoneNumber};
pub use purchase::{PurchaseOrder, PurchaseReceipt, CUSTOM_NAME_FORMAT};
pub use sms::{SmsMessage, SmsPage};
