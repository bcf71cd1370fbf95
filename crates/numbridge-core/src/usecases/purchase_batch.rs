//! Batch purchase use case
//!
//! Buys numbers one at a time with a fixed delay between calls, matching the
//! vendor's one-request-per-six-seconds budget. Individual failures are
//! collected instead of aborting the batch.

use std::sync::Arc;

use chrono::Local;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    config::PurchaseConfig,
    domain::{DomainError, PhoneNumber, PurchaseOrder},
    ports::NumberProvider,
};

/// Snapshot passed to the progress callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    pub requested: u32,
    pub purchased: usize,
    pub failed: usize,
}

/// Outcome of a batch purchase.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub requested: u32,
    pub purchased: Vec<PhoneNumber>,
    pub total_cost: f64,
    /// One entry per failed item, `"Number <i>: <reason>"`
    pub errors: Vec<String>,
    /// Set when the batch stopped early on cancellation
    pub cancelled: bool,
}

impl BatchReport {
    /// True when nothing was bought.
    pub fn is_total_failure(&self) -> bool {
        self.purchased.is_empty()
    }

    /// At most `limit` error lines plus how many were left out.
    pub fn error_summary(&self, limit: usize) -> (&[String], usize) {
        let shown = limit.min(self.errors.len());
        (&self.errors[..shown], self.errors.len() - shown)
    }
}

/// Use case for buying several numbers in sequence
pub struct PurchaseBatchUseCase {
    provider: Arc<dyn NumberProvider>,
    config: PurchaseConfig,
}

impl PurchaseBatchUseCase {
    /// Creates a new PurchaseBatchUseCase
    ///
    /// # Arguments
    ///
    /// * `provider` - Vendor port used for each purchase
    /// * `config` - Country, rental period and inter-purchase delay
    pub fn new(provider: Arc<dyn NumberProvider>, config: PurchaseConfig) -> Self {
        Self { provider, config }
    }

    /// Purchases `quantity` numbers
    ///
    /// Each purchase gets a fresh timestamp-derived `custom_name`. The
    /// configured delay is applied between purchases but not after the last
    /// one. `on_progress` fires whenever the purchased or failed count
    /// changes. Cancellation is observed between purchases; a purchase that
    /// is already in flight is allowed to finish so its receipt is not lost.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidQuantity`] when `quantity` is zero.
    pub async fn execute<F>(
        &self,
        quantity: u32,
        cancel: &CancellationToken,
        mut on_progress: F,
    ) -> Result<BatchReport, DomainError>
    where
        F: FnMut(BatchProgress),
    {
        if quantity == 0 {
            return Err(DomainError::InvalidQuantity(quantity));
        }

        let mut report = BatchReport {
            requested: quantity,
            ..BatchReport::default()
        };
        let delay = self.config.request_delay();

        info!(
            quantity,
            country = %self.config.country_code,
            delay_secs = delay.as_secs(),
            "Starting batch purchase"
        );

        for i in 0..quantity {
            if cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }

            let order = PurchaseOrder::stamped(&self.config, &Local::now());
            debug!(item = i + 1, custom_name = %order.custom_name, "Purchasing number");

            match self.provider.purchase(&order).await {
                Ok(receipt) => {
                    report.total_cost += receipt.cost;
                    report.purchased.extend(receipt.numbers);
                }
                Err(e) => {
                    warn!(item = i + 1, error = %e, "Purchase failed");
                    report.errors.push(format!("Number {}: {}", i + 1, e));
                }
            }

            on_progress(BatchProgress {
                requested: quantity,
                purchased: report.purchased.len(),
                failed: report.errors.len(),
            });

            if i + 1 < quantity {
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = cancel.cancelled() => {
                        report.cancelled = true;
                        break;
                    }
                }
            }
        }

        info!(
            purchased = report.purchased.len(),
            failed = report.errors.len(),
            cancelled = report.cancelled,
            total_cost = report.total_cost,
            "Batch purchase finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;
    use crate::domain::{NumberList, PurchaseReceipt, SmsPage};

    /// Fails the purchases whose 1-based index is in `fail_on`.
    struct ScriptedProvider {
        fail_on: Vec<usize>,
        orders: Mutex<Vec<PurchaseOrder>>,
    }

    impl ScriptedProvider {
        fn new(fail_on: Vec<usize>) -> Arc<Self> {
            Arc::new(Self {
                fail_on,
                orders: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait::async_trait]
    impl NumberProvider for ScriptedProvider {
        async fn list_numbers(&self) -> anyhow::Result<NumberList> {
            anyhow::bail!("not used")
        }

        async fn purchase(&self, order: &PurchaseOrder) -> anyhow::Result<PurchaseReceipt> {
            let n = {
                let mut orders = self.orders.lock().unwrap();
                orders.push(order.clone());
                orders.len()
            };
            if self.fail_on.contains(&n) {
                anyhow::bail!("insufficient_balance");
            }
            Ok(PurchaseReceipt {
                numbers: vec![PhoneNumber {
                    piv_num_id: format!("id-{n}"),
                    phone_number: format!("+4400000000{n}"),
                    custom_name: Some(order.custom_name.clone()),
                    country_code: Some(order.country_code.clone()),
                    status: Some("active".to_string()),
                    expires_at: None,
                }],
                cost: 1.5,
            })
        }

        async fn get_sms(&self, _: &str, _: u32, _: u32) -> anyhow::Result<SmsPage> {
            anyhow::bail!("not used")
        }
    }

    #[tokio::test]
    async fn test_zero_quantity_rejected() {
        let provider = ScriptedProvider::new(vec![]);
        let uc = PurchaseBatchUseCase::new(provider.clone(), PurchaseConfig::default());
        let err = uc
            .execute(0, &CancellationToken::new(), |_| {})
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::InvalidQuantity(0));
        assert!(provider.orders.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_accumulates_numbers_and_errors() {
        let provider = ScriptedProvider::new(vec![2]);
        let uc = PurchaseBatchUseCase::new(provider.clone(), PurchaseConfig::default());

        let mut progress = Vec::new();
        let report = uc
            .execute(3, &CancellationToken::new(), |p| progress.push(p))
            .await
            .unwrap();

        assert_eq!(report.requested, 3);
        assert_eq!(report.purchased.len(), 2);
        assert_eq!(report.total_cost, 3.0);
        assert_eq!(report.errors, vec!["Number 2: insufficient_balance"]);
        assert!(!report.cancelled);
        assert!(!report.is_total_failure());
        assert_eq!(progress.len(), 3);
        assert_eq!(
            progress.last().copied(),
            Some(BatchProgress {
                requested: 3,
                purchased: 2,
                failed: 1
            })
        );

        let orders = provider.orders.lock().unwrap();
        assert!(orders.iter().all(|o| o.country_code == "GB"));
        assert!(orders.iter().all(|o| !o.custom_name.is_empty()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_between_purchases_but_not_after_last() {
        let provider = ScriptedProvider::new(vec![]);
        let uc = PurchaseBatchUseCase::new(provider, PurchaseConfig::default());

        let start = tokio::time::Instant::now();
        uc.execute(3, &CancellationToken::new(), |_| {})
            .await
            .unwrap();

        assert_eq!(start.elapsed(), Duration::from_secs(12));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_stops_between_purchases() {
        let provider = ScriptedProvider::new(vec![]);
        let uc = PurchaseBatchUseCase::new(provider.clone(), PurchaseConfig::default());
        let cancel = CancellationToken::new();

        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(8)).await;
            canceller.cancel();
        });

        let report = uc.execute(5, &cancel, |_| {}).await.unwrap();

        // Purchases at t=0 and t=6; cancelled while waiting for t=12.
        assert!(report.cancelled);
        assert_eq!(report.purchased.len(), 2);
        assert_eq!(provider.orders.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_error_summary_truncates() {
        let report = BatchReport {
            requested: 8,
            errors: (1..=8).map(|i| format!("Number {i}: boom")).collect(),
            ..BatchReport::default()
        };
        let (shown, omitted) = report.error_summary(5);
        assert_eq!(shown.len(), 5);
        assert_eq!(omitted, 3);
        assert!(report.is_total_failure());

        let (shown, omitted) = report.error_summary(10);
        assert_eq!(shown.len(), 8);
        assert_eq!(omitted, 0);
    }
}
