use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A household participant.
///
/// `owed` and `credited` are derived values: the ledger rebuilds them from the
/// full expense set after every mutation and never patches them in place.
/// Both stay non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: Uuid,
    /// Display name supplied by the name generator.
    pub name: String,
    /// Amount this member still has to pay into the pool.
    pub owed: f64,
    /// Amount the pool owes back to this member for expenses they fronted.
    pub credited: f64,
}

impl Member {
    /// A freshly added member with zeroed balances.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            owed: 0.0,
            credited: 0.0,
        }
    }

    /// Same member with both balances cleared.
    pub fn with_zero_balance(&self) -> Self {
        Self {
            owed: 0.0,
            credited: 0.0,
            ..self.clone()
        }
    }
}
