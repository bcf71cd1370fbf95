//! VendorNumberProvider - NumberProvider implementation for the vendor API
//!
//! Thin adapter from the [`VendorClient`] to the [`NumberProvider`] port.
//! Vendor errors are wrapped into `anyhow::Error` with the underlying
//! [`ApiError`](crate::ApiError) kept downcastable.

use anyhow::Result;
use async_trait::async_trait;
use numbridge_core::{
    domain::{NumberList, PurchaseOrder, PurchaseReceipt, SmsPage},
    ports::NumberProvider,
};
use tracing::debug;

use crate::client::VendorClient;

/// [`NumberProvider`] backed by the vendor HTTP API
#[derive(Debug, Clone)]
pub struct VendorNumberProvider {
    client: VendorClient,
}

impl VendorNumberProvider {
    pub fn new(client: VendorClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &VendorClient {
        &self.client
    }
}

#[async_trait]
impl NumberProvider for VendorNumberProvider {
    async fn list_numbers(&self) -> Result<NumberList> {
        Ok(self.client.list_all_numbers().await?)
    }

    async fn purchase(&self, order: &PurchaseOrder) -> Result<PurchaseReceipt> {
        debug!(custom_name = %order.custom_name, "Submitting purchase");
        Ok(self.client.purchase_number(order).await?)
    }

    async fn get_sms(&self, number_id: &str, limit: u32, offset: u32) -> Result<SmsPage> {
        Ok(self.client.get_sms(number_id, limit, offset).await?)
    }
}
