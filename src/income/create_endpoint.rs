//! Defines the endpoint for recording an income.
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
    funding_source::FundingSourceId,
    income::{NewIncome, record_income},
};

/// The state needed to record an income.
#[derive(Debug, Clone)]
pub struct CreateIncomeState {
    /// The database connection for managing incomes.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateIncomeState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for recording an income.
#[derive(Debug, Deserialize)]
pub struct IncomeForm {
    /// The amount received in dollars.
    pub amount: f64,
    /// Where the money came from.
    #[serde(default)]
    pub description: String,
    /// The key of the account to deposit into, e.g. "account-1".
    pub account: String,
}

impl TryFrom<IncomeForm> for NewIncome {
    type Error = Error;

    fn try_from(form: IncomeForm) -> Result<Self, Self::Error> {
        let key = form.account.trim();

        let FundingSourceId::Account(account_id) = key.parse()? else {
            return Err(Error::InvalidFundingSourceKey(key.to_owned()));
        };

        Ok(Self {
            amount: form.amount,
            description: form.description.trim().to_owned(),
            account_id,
        })
    }
}

/// A route handler for recording an income, redirects to the incomes view on success.
pub async fn create_income_endpoint(
    State(state): State<CreateIncomeState>,
    Form(form): Form<IncomeForm>,
) -> Response {
    let new_income = match NewIncome::try_from(form) {
        Ok(new_income) => new_income,
        Err(error) => {
            tracing::error!("Invalid income form: {error}");
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

    match record_income(&new_income, &connection) {
        Ok(income) => {
            tracing::info!(
                "Recorded income {} of {} into account {}",
                income.id,
                income.amount,
                income.account_id
            );

            (
                HxRedirect(endpoints::INCOMES_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("Could not record income: {error}");
            error.into_alert_response()
        }
    }
}
