use std::collections::HashMap;

use uuid::Uuid;

use crate::models::{Expense, ExpenseWithPayer, Member};

/// Label used when an expense's payer is no longer a member.
pub const UNKNOWN_PAYER: &str = "Unknown";

/// Attach each expense's payer name, keeping expense order.
pub fn expenses_with_payer_names(
    expenses: Vec<Expense>,
    members: &[Member],
) -> Vec<ExpenseWithPayer> {
    let names: HashMap<Uuid, &str> = members.iter().map(|m| (m.id, m.name.as_str())).collect();

    expenses
        .into_iter()
        .map(|expense| with_payer_name(expense, &names))
        .collect()
}

fn with_payer_name(expense: Expense, names: &HashMap<Uuid, &str>) -> ExpenseWithPayer {
    let payer_name = names
        .get(&expense.member)
        .copied()
        .unwrap_or(UNKNOWN_PAYER)
        .to_string();
    ExpenseWithPayer {
        expense,
        payer_name,
    }
}
