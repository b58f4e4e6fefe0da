//! The ledger engine.
//!
//! [`Ledger`] orchestrates every mutation against the member and expense
//! stores and rebuilds all balances from scratch afterwards with
//! [`recompute_balances`]. Balances are never adjusted incrementally.
//!
//! All operations run under one writer lock, so a read-modify-write of a
//! store plus the recomputation that follows is never interleaved with
//! another request. If recomputation fails after an expense was written, the
//! expense collection is restored to its previous state before the error is
//! returned. Adding a member is undone the same way.

mod query;
mod recompute;

use std::sync::{Arc, Mutex, MutexGuard};

use uuid::Uuid;

use crate::db::{ExpenseStore, MemberStore};
use crate::error::{LedgerError, LedgerResult};
use crate::models::*;
use crate::names::NameGenerator;

pub use query::{expenses_with_payer_names, UNKNOWN_PAYER};
pub use recompute::recompute_balances;

#[derive(Clone)]
pub struct Ledger {
    members: Arc<dyn MemberStore>,
    expenses: Arc<dyn ExpenseStore>,
    names: Arc<dyn NameGenerator>,
    writer: Arc<Mutex<()>>,
}

impl Ledger {
    pub fn new(
        members: Arc<dyn MemberStore>,
        expenses: Arc<dyn ExpenseStore>,
        names: Arc<dyn NameGenerator>,
    ) -> Self {
        Self {
            members,
            expenses,
            names,
            writer: Arc::new(Mutex::new(())),
        }
    }

    /// Build a ledger over a single value that stores both collections.
    pub fn with_store<S>(store: S, names: Arc<dyn NameGenerator>) -> Self
    where
        S: MemberStore + ExpenseStore + 'static,
    {
        let store = Arc::new(store);
        Self::new(store.clone(), store, names)
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.writer.lock().expect("ledger lock poisoned")
    }

    // ============================================================
    // Members
    // ============================================================

    /// Add a member named by the configured generator.
    ///
    /// Balances are recomputed afterwards since the split now covers one more
    /// person. If that fails the member collection is put back as it was.
    pub async fn add_member(&self) -> LedgerResult<Member> {
        let name = self.names.generate_display_name().await?;

        let _guard = self.lock();
        let snapshot = self.members.list_members()?;
        let member = self.members.add_member(&name)?;

        if let Err(err) = self.recompute_locked() {
            tracing::warn!(
                "Recomputation failed, removing new member {}: {}",
                member.id,
                err
            );
            self.members.replace_all_members(&snapshot)?;
            return Err(err);
        }

        tracing::info!("Added member {} ({})", member.name, member.id);
        Ok(member)
    }

    pub fn list_members(&self) -> LedgerResult<Vec<Member>> {
        let _guard = self.lock();
        Ok(self.members.list_members()?)
    }

    // ============================================================
    // Expenses
    // ============================================================

    pub fn add_expense(&self, input: ExpenseInput) -> LedgerResult<Expense> {
        let input = validated(input)?;

        let expense = self.commit_expenses(|store| {
            self.ensure_member(input.member)?;
            Ok(store.add_expense(input)?)
        })?;

        tracing::info!("Added expense {} of {}", expense.id, expense.amount);
        Ok(expense)
    }

    /// All expenses in insertion order, each with its payer's display name.
    pub fn list_expenses(&self) -> LedgerResult<Vec<ExpenseWithPayer>> {
        let _guard = self.lock();
        let expenses = self.expenses.list_expenses()?;
        let members = self.members.list_members()?;
        Ok(expenses_with_payer_names(expenses, &members))
    }

    pub fn get_expense(&self, id: Uuid) -> LedgerResult<Expense> {
        let _guard = self.lock();
        self.expenses
            .get_expense(id)?
            .ok_or_else(|| expense_not_found(id))
    }

    pub fn get_expense_with_payer(&self, id: Uuid) -> LedgerResult<ExpenseWithPayer> {
        let _guard = self.lock();
        let expense = self
            .expenses
            .get_expense(id)?
            .ok_or_else(|| expense_not_found(id))?;
        let payer_name = self
            .members
            .get_member(expense.member)?
            .map(|m| m.name)
            .unwrap_or_else(|| UNKNOWN_PAYER.to_string());

        Ok(ExpenseWithPayer {
            expense,
            payer_name,
        })
    }

    /// Replace every field of an existing expense.
    pub fn update_expense(&self, id: Uuid, input: ExpenseInput) -> LedgerResult<Expense> {
        let input = validated(input)?;

        let expense = self.commit_expenses(|store| {
            self.ensure_member(input.member)?;
            store
                .update_expense(id, input)?
                .ok_or_else(|| expense_not_found(id))
        })?;

        tracing::info!("Updated expense {}", expense.id);
        Ok(expense)
    }

    /// Remove an expense and return the removed record.
    pub fn delete_expense(&self, id: Uuid) -> LedgerResult<Expense> {
        let expense = self.commit_expenses(|store| {
            store.delete_expense(id)?.ok_or_else(|| expense_not_found(id))
        })?;

        tracing::info!("Deleted expense {}", expense.id);
        Ok(expense)
    }

    // ============================================================
    // Recomputation
    // ============================================================

    /// Rebuild and persist every member's balances.
    pub fn recompute(&self) -> LedgerResult<Vec<Member>> {
        let _guard = self.lock();
        self.recompute_locked()
    }

    fn recompute_locked(&self) -> LedgerResult<Vec<Member>> {
        let members = self.members.list_members()?;
        let expenses = self.expenses.list_expenses()?;

        let balances = recompute_balances(&members, &expenses)?;
        self.members.replace_all_members(&balances)?;

        tracing::debug!(
            "Recomputed balances for {} members across {} expenses",
            balances.len(),
            expenses.len()
        );
        Ok(balances)
    }

    /// Run an expense mutation followed by a recomputation.
    ///
    /// A failed recomputation puts the expense collection back as it was.
    fn commit_expenses<T>(
        &self,
        mutate: impl FnOnce(&dyn ExpenseStore) -> LedgerResult<T>,
    ) -> LedgerResult<T> {
        let _guard = self.lock();
        let snapshot = self.expenses.list_expenses()?;

        let value = mutate(self.expenses.as_ref())?;

        if let Err(err) = self.recompute_locked() {
            tracing::warn!(
                "Recomputation failed, restoring {} expenses: {}",
                snapshot.len(),
                err
            );
            self.expenses.replace_all_expenses(&snapshot)?;
            return Err(err);
        }

        Ok(value)
    }

    fn ensure_member(&self, id: Uuid) -> LedgerResult<Member> {
        self.members
            .get_member(id)?
            .ok_or_else(|| LedgerError::validation(format!("member {id} does not exist")))
    }
}

fn validated(input: ExpenseInput) -> LedgerResult<NewExpense> {
    input.validate().inspect_err(|e| {
        tracing::warn!("Rejected expense input: {}", e);
    })
}

fn expense_not_found(id: Uuid) -> LedgerError {
    LedgerError::not_found(format!("expense {id}"))
}
