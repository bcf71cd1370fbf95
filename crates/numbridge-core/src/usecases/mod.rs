//! Use cases (interactors) for Numbridge
//!
//! This module contains the application use cases that orchestrate
//! domain entities and port interfaces. Use cases are thin coordinators
//! that delegate business rules to domain methods and I/O to ports.
//!
//! ## Use Cases
//!
//! - [`PurchaseBatchUseCase`] - Sequential purchase of several numbers
//! - [`FindNumberUseCase`] - Lookup by phone number or custom name
//! - [`ReadSmsUseCase`] - Latest SMS (verification codes) for a number

pub mod find_number;
pub mod purchase_batch;
pub mod read_sms;

pub use find_number::FindNumberUseCase;
pub use purchase_batch::{BatchProgress, BatchReport, PurchaseBatchUseCase};
pub use read_sms::{ReadSmsUseCase, SmsReport, MAX_SMS_COUNT};
