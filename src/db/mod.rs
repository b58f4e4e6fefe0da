//! Record stores for members and expenses.
//!
//! The ledger talks to storage only through [`MemberStore`] and
//! [`ExpenseStore`]. [`Database`] implements both on top of SQLite;
//! [`MemoryStore`] implements both in memory.

mod memory;
mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::models::*;

pub use memory::MemoryStore;

/// Owns member records.
pub trait MemberStore: Send + Sync {
    /// All members in insertion order.
    fn list_members(&self) -> Result<Vec<Member>>;

    /// Append a member with a fresh id and zeroed balances.
    fn add_member(&self, name: &str) -> Result<Member>;

    fn get_member(&self, id: Uuid) -> Result<Option<Member>>;

    /// Overwrite the whole member collection, keeping the given order.
    fn replace_all_members(&self, members: &[Member]) -> Result<()>;
}

/// Owns expense records.
pub trait ExpenseStore: Send + Sync {
    /// All expenses in insertion order.
    fn list_expenses(&self) -> Result<Vec<Expense>>;

    fn add_expense(&self, input: NewExpense) -> Result<Expense>;

    fn get_expense(&self, id: Uuid) -> Result<Option<Expense>>;

    /// Replace every field of an expense, keeping its id and position.
    fn update_expense(&self, id: Uuid, input: NewExpense) -> Result<Option<Expense>>;

    /// Remove an expense and return it.
    fn delete_expense(&self, id: Uuid) -> Result<Option<Expense>>;

    /// Overwrite the whole expense collection, keeping the given order.
    fn replace_all_expenses(&self, expenses: &[Expense]) -> Result<()>;
}

pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> Result<Self> {
        Self::open(default_path()?)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let mut conn = self.conn.lock().expect("database lock poisoned");
        let applied = schema::run_migrations(&mut conn)?;
        if applied > 0 {
            tracing::info!("Applied {} migrations", applied);
        }
        Ok(())
    }
}

/// Location of the database when none is configured.
pub fn default_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "roommate-ledger")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    Ok(dirs.data_dir().join("ledger.db"))
}

impl MemberStore for Database {
    fn list_members(&self) -> Result<Vec<Member>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt =
            conn.prepare("SELECT id, name, owed, credited FROM members ORDER BY rowid")?;

        let members = stmt
            .query_map([], member_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(members)
    }

    fn add_member(&self, name: &str) -> Result<Member> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let member = Member::new(name);

        conn.execute(
            "INSERT INTO members (id, name, owed, credited) VALUES (?, ?, ?, ?)",
            (
                member.id.to_string(),
                &member.name,
                member.owed,
                member.credited,
            ),
        )?;

        Ok(member)
    }

    fn get_member(&self, id: Uuid) -> Result<Option<Member>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let member = conn
            .query_row(
                "SELECT id, name, owed, credited FROM members WHERE id = ?",
                [id.to_string()],
                member_from_row,
            )
            .optional()?;
        Ok(member)
    }

    fn replace_all_members(&self, members: &[Member]) -> Result<()> {
        let mut conn = self.conn.lock().expect("database lock poisoned");
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM members", [])?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO members (id, name, owed, credited) VALUES (?, ?, ?, ?)",
            )?;
            for member in members {
                insert.execute((
                    member.id.to_string(),
                    &member.name,
                    member.owed,
                    member.credited,
                ))?;
            }
        }

        tx.commit()?;
        Ok(())
    }
}

impl ExpenseStore for Database {
    fn list_expenses(&self) -> Result<Vec<Expense>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, member_id, description, amount FROM expenses ORDER BY rowid",
        )?;

        let expenses = stmt
            .query_map([], expense_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(expenses)
    }

    fn add_expense(&self, input: NewExpense) -> Result<Expense> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let expense = input.into_expense(Uuid::new_v4());

        conn.execute(
            "INSERT INTO expenses (id, member_id, description, amount) VALUES (?, ?, ?, ?)",
            (
                expense.id.to_string(),
                expense.member.to_string(),
                &expense.description,
                expense.amount,
            ),
        )?;

        Ok(expense)
    }

    fn get_expense(&self, id: Uuid) -> Result<Option<Expense>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        query_expense(&conn, id)
    }

    fn update_expense(&self, id: Uuid, input: NewExpense) -> Result<Option<Expense>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let expense = input.into_expense(id);

        let rows = conn.execute(
            "UPDATE expenses SET member_id = ?, description = ?, amount = ? WHERE id = ?",
            (
                expense.member.to_string(),
                &expense.description,
                expense.amount,
                id.to_string(),
            ),
        )?;

        Ok((rows > 0).then_some(expense))
    }

    fn delete_expense(&self, id: Uuid) -> Result<Option<Expense>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let Some(existing) = query_expense(&conn, id)? else {
            return Ok(None);
        };

        conn.execute("DELETE FROM expenses WHERE id = ?", [id.to_string()])?;
        Ok(Some(existing))
    }

    fn replace_all_expenses(&self, expenses: &[Expense]) -> Result<()> {
        let mut conn = self.conn.lock().expect("database lock poisoned");
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM expenses", [])?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO expenses (id, member_id, description, amount) VALUES (?, ?, ?, ?)",
            )?;
            for expense in expenses {
                insert.execute((
                    expense.id.to_string(),
                    expense.member.to_string(),
                    &expense.description,
                    expense.amount,
                ))?;
            }
        }

        tx.commit()?;
        Ok(())
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

fn query_expense(conn: &Connection, id: Uuid) -> Result<Option<Expense>> {
    let expense = conn
        .query_row(
            "SELECT id, member_id, description, amount FROM expenses WHERE id = ?",
            [id.to_string()],
            expense_from_row,
        )
        .optional()?;
    Ok(expense)
}

fn member_from_row(row: &Row<'_>) -> rusqlite::Result<Member> {
    Ok(Member {
        id: parse_uuid(row, 0)?,
        name: row.get(1)?,
        owed: row.get(2)?,
        credited: row.get(3)?,
    })
}

fn expense_from_row(row: &Row<'_>) -> rusqlite::Result<Expense> {
    Ok(Expense {
        id: parse_uuid(row, 0)?,
        member: parse_uuid(row, 1)?,
        description: row.get(2)?,
        amount: row.get(3)?,
    })
}

fn parse_uuid(row: &Row<'_>, column: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(column)?;
    Uuid::parse_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
    })
}
