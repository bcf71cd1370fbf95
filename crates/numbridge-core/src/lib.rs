//! Numbridge Core - Domain logic and business rules
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain entities** - `PhoneNumber`, `SmsMessage`, `PurchaseOrder`, `PurchaseReceipt`
//! - **Use cases** - `PurchaseBatchUseCase`, `FindNumberUseCase`, `ReadSmsUseCase`
//! - **Port definitions** - `NumberProvider`, implemented by the vendor adapter
//! - **Configuration** - YAML-backed settings shared by every crate
//!
//! # Architecture
//!
//! The domain module contains pure business logic with no I/O.
//! Ports define trait interfaces that adapter crates implement.
//! Use cases orchestrate domain entities through port interfaces.

pub mod config;
pub mod domain;
pub mod ports;
pub mod usecases;
