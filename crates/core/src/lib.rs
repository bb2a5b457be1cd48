//! Core business logic for Somon.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `ledger` - Account balances, history and the operations that move money
//! - `currency` - Exchange rate resolution and conversion rounding
//! - `auth` - Password credentials, sessions and registration

pub mod auth;
pub mod currency;
pub mod ledger;
