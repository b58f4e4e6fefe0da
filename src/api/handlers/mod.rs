use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::error::LedgerError;
use crate::ledger::Ledger;
use crate::models::*;

type ApiResult<T> = Result<T, (StatusCode, String)>;

// ============================================================
// Error Handling
// ============================================================

/// Map a ledger error to a response.
///
/// Input and lookup errors are shown to the client as-is. Storage and
/// name-service failures are logged in full and returned with a generic body.
fn ledger_error(e: LedgerError) -> (StatusCode, String) {
    match e {
        LedgerError::Validation(_) => {
            tracing::warn!("Validation error: {}", e);
            (StatusCode::BAD_REQUEST, e.to_string())
        }
        LedgerError::NotFound(_) => (StatusCode::NOT_FOUND, e.to_string()),
        LedgerError::NoMembers => {
            tracing::warn!("Rejected mutation: {}", e);
            (StatusCode::CONFLICT, e.to_string())
        }
        LedgerError::NameSource(_) => {
            tracing::error!("Name service error: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                "Could not generate a member name".to_string(),
            )
        }
        LedgerError::Storage(_) => {
            tracing::error!("Internal error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
    }
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Members
// ============================================================

pub async fn list_members(State(ledger): State<Ledger>) -> ApiResult<Json<Vec<Member>>> {
    ledger.list_members().map(Json).map_err(ledger_error)
}

pub async fn add_member(State(ledger): State<Ledger>) -> ApiResult<(StatusCode, Json<Member>)> {
    ledger
        .add_member()
        .await
        .map(|m| (StatusCode::CREATED, Json(m)))
        .map_err(ledger_error)
}

// ============================================================
// Expenses
// ============================================================

pub async fn list_expenses(
    State(ledger): State<Ledger>,
) -> ApiResult<Json<Vec<ExpenseWithPayer>>> {
    ledger.list_expenses().map(Json).map_err(ledger_error)
}

pub async fn add_expense(
    State(ledger): State<Ledger>,
    Json(input): Json<ExpenseInput>,
) -> ApiResult<(StatusCode, Json<Expense>)> {
    ledger
        .add_expense(input)
        .map(|e| (StatusCode::CREATED, Json(e)))
        .map_err(ledger_error)
}

pub async fn get_expense(
    State(ledger): State<Ledger>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ExpenseWithPayer>> {
    ledger
        .get_expense_with_payer(id)
        .map(Json)
        .map_err(ledger_error)
}

pub async fn update_expense(
    State(ledger): State<Ledger>,
    Path(id): Path<Uuid>,
    Json(input): Json<ExpenseInput>,
) -> ApiResult<Json<Expense>> {
    ledger
        .update_expense(id, input)
        .map(Json)
        .map_err(ledger_error)
}

pub async fn delete_expense(
    State(ledger): State<Ledger>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Expense>> {
    ledger.delete_expense(id).map(Json).map_err(ledger_error)
}

// ============================================================
// Balances
// ============================================================

pub async fn recompute(State(ledger): State<Ledger>) -> ApiResult<Json<Vec<Member>>> {
    ledger.recompute().map(Json).map_err(ledger_error)
}
