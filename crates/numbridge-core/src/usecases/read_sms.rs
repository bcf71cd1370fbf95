//! SMS retrieval use case
//!
//! Looks up a number by phone or name and returns its most recent messages,
//! typically to read a verification code.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use super::find_number::FindNumberUseCase;
use crate::{
    domain::{DomainError, PhoneNumber, SmsMessage},
    ports::NumberProvider,
};

/// Largest number of messages a caller may ask for.
pub const MAX_SMS_COUNT: usize = 10;

/// Page size requested from the SMS endpoint.
const SMS_PAGE_LIMIT: u32 = 100;

/// Messages for one number.
#[derive(Debug, Clone, Serialize)]
pub struct SmsReport {
    pub number: PhoneNumber,
    /// Newest first, at most the requested count
    pub messages: Vec<SmsMessage>,
    /// Total reported by the vendor
    pub total: u64,
}

/// Use case for reading the latest SMS of a number
pub struct ReadSmsUseCase {
    provider: Arc<dyn NumberProvider>,
    finder: FindNumberUseCase,
}

impl ReadSmsUseCase {
    pub fn new(provider: Arc<dyn NumberProvider>) -> Self {
        Self {
            finder: FindNumberUseCase::new(Arc::clone(&provider)),
            provider,
        }
    }

    /// Returns the `count` most recent messages of the number matching `query`
    ///
    /// # Errors
    ///
    /// - [`DomainError::InvalidSmsCount`] unless `1 <= count <= MAX_SMS_COUNT`
    /// - [`DomainError::NumberNotFound`] when no number matches
    /// - vendor failures from the listing or SMS endpoint
    pub async fn execute(&self, query: &str, count: usize) -> Result<SmsReport> {
        if count == 0 || count > MAX_SMS_COUNT {
            return Err(DomainError::InvalidSmsCount {
                count,
                max: MAX_SMS_COUNT,
            }
            .into());
        }

        let number = self
            .finder
            .execute(query)
            .await?
            .ok_or_else(|| DomainError::NumberNotFound(query.trim().to_string()))?;

        let page = self
            .provider
            .get_sms(&number.piv_num_id, SMS_PAGE_LIMIT, 0)
            .await
            .with_context(|| format!("Failed to fetch SMS for {}", number.phone_number))?;

        info!(
            number = %number.phone_number,
            received = page.messages.len(),
            total = page.total(),
            "Fetched SMS"
        );

        Ok(SmsReport {
            messages: page.most_recent(count).to_vec(),
            total: page.total(),
            number,
        })
    }
}
