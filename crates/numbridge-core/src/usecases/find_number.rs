//! Number lookup use case
//!
//! Resolves a user-supplied phone number or custom name to a rented number
//! by scanning the full listing.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use crate::{
    domain::{DomainError, PhoneNumber},
    ports::NumberProvider,
};

/// Use case for finding a number by phone number or `custom_name`
pub struct FindNumberUseCase {
    provider: Arc<dyn NumberProvider>,
}

impl FindNumberUseCase {
    pub fn new(provider: Arc<dyn NumberProvider>) -> Self {
        Self { provider }
    }

    /// Returns the first number matching `query`, or `None`
    ///
    /// # Errors
    ///
    /// Fails on a blank query or when the listing cannot be fetched; the
    /// vendor's reason is kept in the error chain.
    pub async fn execute(&self, query: &str) -> Result<Option<PhoneNumber>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(DomainError::EmptyQuery.into());
        }

        let list = self
            .provider
            .list_numbers()
            .await
            .context("Failed to list numbers")?;

        let found = list.find(query).cloned();
        debug!(
            query,
            scanned = list.numbers.len(),
            found = found.is_some(),
            "Number lookup finished"
        );
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NumberList, Pagination, PurchaseOrder, PurchaseReceipt, SmsPage};

    struct ListingProvider {
        result: std::result::Result<Vec<PhoneNumber>, String>,
    }

    #[async_trait::async_trait]
    impl NumberProvider for ListingProvider {
        async fn list_numbers(&self) -> anyhow::Result<NumberList> {
            match &self.result {
                Ok(numbers) => Ok(NumberList {
                    pagination: Pagination {
                        total: numbers.len() as u64,
                        limit: 100,
                        offset: 0,
                    },
                    numbers: numbers.clone(),
                }),
                Err(reason) => Err(anyhow::anyhow!(reason.clone())),
            }
        }

        async fn purchase(&self, _: &PurchaseOrder) -> anyhow::Result<PurchaseReceipt> {
            anyhow::bail!("not used")
        }

        async fn get_sms(&self, _: &str, _: u32, _: u32) -> anyhow::Result<SmsPage> {
            anyhow::bail!("not used")
        }
    }

    fn number(id: &str, phone: &str, name: &str) -> PhoneNumber {
        PhoneNumber {
            piv_num_id: id.to_string(),
            phone_number: phone.to_string(),
            custom_name: Some(name.to_string()),
            country_code: Some("GB".to_string()),
            status: Some("active".to_string()),
            expires_at: None,
        }
    }

    fn finder(result: std::result::Result<Vec<PhoneNumber>, String>) -> FindNumberUseCase {
        FindNumberUseCase::new(Arc::new(ListingProvider { result }))
    }

    #[tokio::test]
    async fn test_finds_by_phone_and_by_name() {
        let uc = finder(Ok(vec![
            number("a", "+447426917510", "number3"),
            number("b", "+447000000001", "backup"),
        ]));

        let by_phone = uc.execute("+44 7426 917510").await.unwrap().unwrap();
        assert_eq!(by_phone.piv_num_id, "a");

        let by_name = uc.execute("BACKUP").await.unwrap().unwrap();
        assert_eq!(by_name.piv_num_id, "b");

        assert!(uc.execute("nothing-like-this").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_blank_query_is_rejected() {
        let uc = finder(Ok(vec![]));
        let err = uc.execute("   ").await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<DomainError>(),
            Some(&DomainError::EmptyQuery)
        );
    }

    #[tokio::test]
    async fn test_listing_failure_keeps_reason() {
        let uc = finder(Err("rate_limited: too many 429 responses".to_string()));
        let err = uc.execute("number3").await.unwrap_err();
        let chain = format!("{err:#}");
        assert!(chain.contains("Failed to list numbers"));
        assert!(chain.contains("rate_limited"));
    }
}
