use crate::error::LedgerError;
use crate::models::{Expense, Member};

/// Derive every member's balances from scratch.
///
/// Each expense is split evenly over all members: the payer is credited the
/// part everyone else covers (`amount - share`) and every other member owes
/// `share`. A payer that is no longer a member gets no credit, while the
/// present members still take their share of debt.
///
/// Expenses are applied in the order given, so repeated runs over the same
/// input produce bit-identical balances.
pub fn recompute_balances(
    members: &[Member],
    expenses: &[Expense],
) -> Result<Vec<Member>, LedgerError> {
    let mut members: Vec<Member> = members.iter().map(Member::with_zero_balance).collect();

    if members.is_empty() {
        return Err(LedgerError::NoMembers);
    }

    let count = members.len() as f64;
    for expense in expenses {
        let share = expense.amount / count;
        for member in members.iter_mut() {
            if member.id == expense.member {
                member.credited += expense.amount - share;
            } else {
                member.owed += share;
            }
        }
    }

    Ok(members)
}
