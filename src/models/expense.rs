use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::LedgerError;

/// A single payment made by one member and split evenly across everyone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    /// The paying member.
    pub member: Uuid,
    pub description: String,
    pub amount: f64,
}

/// Validated expense fields, ready to be written to a store.
///
/// Only [`ExpenseInput::validate`] produces these, so a store never sees an
/// empty description or a non-positive amount.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub member: Uuid,
    pub description: String,
    pub amount: f64,
}

impl NewExpense {
    pub fn into_expense(self, id: Uuid) -> Expense {
        Expense {
            id,
            member: self.member,
            description: self.description,
            amount: self.amount,
        }
    }
}

/// An amount given to [`ExpenseInput::new`]: a number or a numeric string.
#[derive(Debug, Clone, PartialEq)]
pub enum AmountInput {
    Number(f64),
    Text(String),
}

impl From<f64> for AmountInput {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for AmountInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<AmountInput> for Value {
    fn from(amount: AmountInput) -> Self {
        match amount {
            AmountInput::Number(n) => Value::from(n),
            AmountInput::Text(text) => Value::String(text),
        }
    }
}

/// Raw input for creating or replacing an expense.
///
/// Fields are kept as untyped JSON so that a missing or wrong-typed field is
/// reported by [`ExpenseInput::validate`] as a validation error rather than
/// by the deserializer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpenseInput {
    #[serde(default)]
    pub member: Option<Value>,
    #[serde(default)]
    pub description: Option<Value>,
    #[serde(default)]
    pub amount: Option<Value>,
}

impl ExpenseInput {
    pub fn new(member: Uuid, description: impl Into<String>, amount: impl Into<AmountInput>) -> Self {
        let amount: AmountInput = amount.into();
        Self {
            member: Some(Value::String(member.to_string())),
            description: Some(Value::String(description.into())),
            amount: Some(amount.into()),
        }
    }

    /// Check field types and shapes. Whether the member exists is checked by
    /// the ledger.
    pub fn validate(self) -> Result<NewExpense, LedgerError> {
        let member = required_text(self.member, "member id")?;
        let member = Uuid::parse_str(&member)
            .map_err(|_| LedgerError::validation(format!("invalid member id: {member}")))?;

        let description = required_text(self.description, "description")?;

        let amount = match self.amount {
            Some(Value::Number(n)) => n
                .as_f64()
                .ok_or_else(|| LedgerError::validation("amount is not a number"))?,
            Some(Value::String(text)) => text
                .trim()
                .parse::<f64>()
                .map_err(|_| LedgerError::validation(format!("amount is not a number: {text}")))?,
            Some(_) => return Err(LedgerError::validation("amount must be a number")),
            None => return Err(LedgerError::validation("amount is required")),
        };
        if !amount.is_finite() || amount <= 0.0 {
            return Err(LedgerError::validation("amount must be a positive number"));
        }

        Ok(NewExpense {
            member,
            description,
            amount,
        })
    }
}

/// A trimmed, non-empty string field.
fn required_text(value: Option<Value>, field: &str) -> Result<String, LedgerError> {
    match value {
        Some(Value::String(text)) if !text.trim().is_empty() => Ok(text.trim().to_string()),
        Some(Value::String(_)) | None => Err(LedgerError::validation(format!("{field} is required"))),
        Some(_) => Err(LedgerError::validation(format!("{field} must be a string"))),
    }
}

/// An expense joined with its payer's display name, used for listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseWithPayer {
    #[serde(flatten)]
    pub expense: Expense,
    pub payer_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    fn input(member: Option<&str>, description: Option<&str>, amount: Option<AmountInput>) -> ExpenseInput {
        ExpenseInput {
            member: member.map(Value::from),
            description: description.map(Value::from),
            amount: amount.map(Value::from),
        }
    }

    #[test]
    fn accepts_numeric_string_amounts_and_trims_description() {
        let member = Uuid::new_v4();
        let valid = ExpenseInput::new(member, "  groceries ", " 12.50 ")
            .validate()
            .unwrap();

        assert_eq!(valid.member, member);
        assert_eq!(valid.description, "groceries");
        assert_eq!(valid.amount, 12.5);
    }

    #[test]
    fn rejects_missing_or_malformed_member() {
        let missing = input(None, Some("rent"), Some(10.0.into())).validate();
        assert!(matches!(missing, Err(LedgerError::Validation(_))));

        let malformed = input(Some("not-a-uuid"), Some("rent"), Some(10.0.into())).validate();
        assert!(matches!(malformed, Err(LedgerError::Validation(_))));
    }

    #[test]
    fn rejects_blank_description() {
        let member = Uuid::new_v4().to_string();
        let result = input(Some(&member), Some("   "), Some(10.0.into())).validate();
        assert!(matches!(result, Err(LedgerError::Validation(_))));
    }

    #[test]
    fn rejects_non_positive_or_non_numeric_amounts() {
        let member = Uuid::new_v4();
        for amount in [AmountInput::Number(0.0), AmountInput::Number(-3.0), "abc".into(), "".into()] {
            let result = ExpenseInput::new(member, "rent", amount).validate();
            assert!(matches!(result, Err(LedgerError::Validation(_))));
        }

        let result = input(Some(&member.to_string()), Some("rent"), None).validate();
        assert!(matches!(result, Err(LedgerError::Validation(_))));
    }

    #[test]
    fn rejects_non_finite_amounts() {
        let result = ExpenseInput::new(Uuid::new_v4(), "rent", "inf").validate();
        assert!(matches!(result, Err(LedgerError::Validation(_))));
    }

    #[test]
    fn amount_keeps_the_json_it_was_given() {
        let body: ExpenseInput =
            serde_json::from_str(r#"{"member":"x","description":"d","amount":"4.5"}"#).unwrap();
        assert_eq!(body.amount, Some(json!("4.5")));

        let body: ExpenseInput =
            serde_json::from_str(r#"{"member":"x","description":"d","amount":4.5}"#).unwrap();
        assert_eq!(body.amount, Some(json!(4.5)));
    }

    #[test]
    fn rejects_wrong_typed_fields() {
        let member = Uuid::new_v4().to_string();
        let bodies = [
            json!({ "member": 5, "description": "rent", "amount": 10 }),
            json!({ "member": member, "description": 7, "amount": 10 }),
            json!({ "member": member, "description": "rent", "amount": true }),
            json!({ "member": member, "description": "rent", "amount": [10] }),
        ];

        for body in bodies {
            let input: ExpenseInput = serde_json::from_value(body).unwrap();
            assert!(matches!(input.validate(), Err(LedgerError::Validation(_))));
        }
    }

    #[test]
    fn null_fields_count_as_missing() {
        let input: ExpenseInput =
            serde_json::from_value(json!({ "member": null, "description": "rent", "amount": 1 })).unwrap();
        let err = input.validate().unwrap_err();
        assert_eq!(err.to_string(), "validation failed: member id is required");
    }
}
