//! Port definitions (hexagonal architecture interfaces)
//!
//! Ports are interfaces that the domain core depends on, but whose
//! implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`NumberProvider`] - Phone-number vendor operations (listing, purchase, SMS)

pub mod number_provider;

pub use number_provider::NumberProvider;
