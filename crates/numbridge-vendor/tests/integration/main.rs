//! Integration tests for numbridge-vendor
//!
//! Uses wiremock to simulate the vendor API and verifies end-to-end
//! behavior of the VendorClient: authentication header, listing
//! pagination, purchase, SMS retrieval and error mapping.

mod common;

mod test_errors;
mod test_listing;
mod test_purchase;
mod test_sms;
