//! Defines the endpoint for rolling back an expense.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    expense::{ExpenseId, rollback_expense},
    funding_source::FundingSourceKind,
    html::format_currency,
};

/// The state needed to roll back an expense.
#[derive(Debug, Clone)]
pub struct DeleteExpenseState {
    /// The database connection for managing expenses.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for rolling back an expense, responds with an alert.
///
/// The amount is returned to the account or credit card that paid for it.
pub async fn delete_expense_endpoint(
    State(state): State<DeleteExpenseState>,
    Path(expense_id): Path<ExpenseId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match rollback_expense(expense_id, &connection) {
        // The status code has to be 200 OK or HTMX will not delete the table row.
        Ok(expense) => {
            tracing::info!(
                "Rolled back expense {expense_id} of {} paid with {}",
                expense.amount,
                expense.source
            );

            let returned_to = match expense.source.kind() {
                FundingSourceKind::DebitAccount => "account",
                FundingSourceKind::CreditLine => "credit card",
            };

            Alert::Success {
                message: "Expense deleted".to_owned(),
                details: format!(
                    "{} was returned to the {returned_to}.",
                    format_currency(expense.amount)
                ),
            }
            .into_response()
        }
        Err(error) => {
            tracing::error!("Could not roll back expense {expense_id}: {error}");
            error.into_alert_response()
        }
    }
}
