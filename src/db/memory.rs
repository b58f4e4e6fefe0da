use std::sync::{Arc, Mutex};

use anyhow::Result;
use uuid::Uuid;

use super::{ExpenseStore, MemberStore};
use crate::models::*;

/// Both stores kept in process memory. Clones share the same collections.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    members: Arc<Mutex<Vec<Member>>>,
    expenses: Arc<Mutex<Vec<Expense>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MemberStore for MemoryStore {
    fn list_members(&self) -> Result<Vec<Member>> {
        Ok(self.members.lock().expect("member store lock poisoned").clone())
    }

    fn add_member(&self, name: &str) -> Result<Member> {
        let member = Member::new(name);
        self.members
            .lock()
            .expect("member store lock poisoned")
            .push(member.clone());
        Ok(member)
    }

    fn get_member(&self, id: Uuid) -> Result<Option<Member>> {
        let members = self.members.lock().expect("member store lock poisoned");
        Ok(members.iter().find(|m| m.id == id).cloned())
    }

    fn replace_all_members(&self, members: &[Member]) -> Result<()> {
        *self.members.lock().expect("member store lock poisoned") = members.to_vec();
        Ok(())
    }
}

impl ExpenseStore for MemoryStore {
    fn list_expenses(&self) -> Result<Vec<Expense>> {
        Ok(self.expenses.lock().expect("expense store lock poisoned").clone())
    }

    fn add_expense(&self, input: NewExpense) -> Result<Expense> {
        let expense = input.into_expense(Uuid::new_v4());
        self.expenses
            .lock()
            .expect("expense store lock poisoned")
            .push(expense.clone());
        Ok(expense)
    }

    fn get_expense(&self, id: Uuid) -> Result<Option<Expense>> {
        let expenses = self.expenses.lock().expect("expense store lock poisoned");
        Ok(expenses.iter().find(|e| e.id == id).cloned())
    }

    fn update_expense(&self, id: Uuid, input: NewExpense) -> Result<Option<Expense>> {
        let mut expenses = self.expenses.lock().expect("expense store lock poisoned");
        let Some(slot) = expenses.iter_mut().find(|e| e.id == id) else {
            return Ok(None);
        };
        *slot = input.into_expense(id);
        Ok(Some(slot.clone()))
    }

    fn delete_expense(&self, id: Uuid) -> Result<Option<Expense>> {
        let mut expenses = self.expenses.lock().expect("expense store lock poisoned");
        Ok(expenses
            .iter()
            .position(|e| e.id == id)
            .map(|index| expenses.remove(index)))
    }

    fn replace_all_expenses(&self, expenses: &[Expense]) -> Result<()> {
        *self.expenses.lock().expect("expense store lock poisoned") = expenses.to_vec();
        Ok(())
    }
}
