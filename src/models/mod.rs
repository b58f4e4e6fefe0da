//! Domain models for the household ledger.
//!
//! - [`Member`]: a participant whose `owed`/`credited` balances are derived from
//!   the full expense set.
//! - [`Expense`]: a payment fronted by one member and split evenly among all.
//! - [`ExpenseInput`]: unvalidated client input, turned into a [`NewExpense`]
//!   by [`ExpenseInput::validate`].
//!
//! Balances are kept at full `f64` precision. Round only for display, through
//! [`format_amount`].

mod expense;
mod member;

pub use expense::*;
pub use member::*;

/// Format a balance or amount with two decimal places.
pub fn format_amount(value: f64) -> String {
    format!("{:.2}", value)
}
