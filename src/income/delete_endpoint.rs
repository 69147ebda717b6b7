//! Defines the endpoint for rolling back an income.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    html::format_currency,
    income::{IncomeId, rollback_income},
};

/// The state needed to roll back an income.
#[derive(Debug, Clone)]
pub struct DeleteIncomeState {
    /// The database connection for managing incomes.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteIncomeState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for rolling back an income, responds with an alert.
pub async fn delete_income_endpoint(
    State(state): State<DeleteIncomeState>,
    Path(income_id): Path<IncomeId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match rollback_income(income_id, &connection) {
        // The status code has to be 200 OK or HTMX will not delete the table row.
        Ok(income) => {
            tracing::info!(
                "Rolled back income {income_id} of {} from account {}",
                income.amount,
                income.account_id
            );

            Alert::Success {
                message: "Income deleted".to_owned(),
                details: format!(
                    "{} was taken back out of the account.",
                    format_currency(income.amount)
                ),
            }
            .into_response()
        }
        Err(error) => {
            tracing::error!("Could not roll back income {income_id}: {error}");
            error.into_alert_response()
        }
    }
}
