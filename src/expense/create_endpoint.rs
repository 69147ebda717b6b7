//! Defines the endpoint for recording an expense.
use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error, endpoints,
    expense::{NewExpense, record_expense},
    funding_source::FundingSourceId,
};

/// The state needed to record an expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseState {
    /// The database connection for managing expenses.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for recording an expense.
#[derive(Debug, Deserialize)]
pub struct ExpenseForm {
    /// The amount spent in dollars.
    pub amount: f64,
    /// What the money was spent on.
    #[serde(default)]
    pub description: String,
    /// The key of the chosen funding source, e.g. "account-1".
    pub source: String,
}

impl TryFrom<ExpenseForm> for NewExpense {
    type Error = Error;

    fn try_from(form: ExpenseForm) -> Result<Self, Self::Error> {
        let source: FundingSourceId = form.source.trim().parse()?;

        Ok(Self {
            amount: form.amount,
            description: form.description.trim().to_owned(),
            source,
        })
    }
}

/// A route handler for recording an expense, redirects to the expenses view on success.
pub async fn create_expense_endpoint(
    State(state): State<CreateExpenseState>,
    Form(form): Form<ExpenseForm>,
) -> Response {
    let new_expense = match NewExpense::try_from(form) {
        Ok(new_expense) => new_expense,
        Err(error) => {
            tracing::error!("Invalid expense form: {error}");
            return error.into_alert_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match record_expense(&new_expense, &connection) {
        Ok(expense) => {
            tracing::info!(
                "Recorded expense {} of {} paid with {}",
                expense.id,
                expense.amount,
                expense.source
            );

            (
                HxRedirect(endpoints::EXPENSES_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("Could not record expense: {error}");
            error.into_alert_response()
        }
    }
}
