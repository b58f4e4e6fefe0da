//! Shared-household expense splitting.
//!
//! Members and expenses live in two record stores; the [`ledger::Ledger`]
//! rebuilds every member's balances from the full expense set after each
//! change, splitting each expense evenly across all members.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod ledger;
pub mod models;
pub mod names;
