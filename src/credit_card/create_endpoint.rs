//! Defines the endpoint for adding a credit card.
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
    AppState, Error,
    credit_card::{NewCreditCard, create_credit_card},
    endpoints,
};

/// The state needed to add a credit card.
#[derive(Debug, Clone)]
pub struct CreateCreditCardState {
    /// The database connection for managing credit cards.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateCreditCardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for creating or editing a credit card.
#[derive(Debug, Deserialize)]
pub struct CreditCardForm {
    pub name: String,
    pub credit_limit: f64,
    pub current_balance: f64,
    pub billing_day: u8,
    pub payment_day: u8,
}

impl From<CreditCardForm> for NewCreditCard {
    fn from(form: CreditCardForm) -> Self {
        Self {
            name: form.name.trim().to_owned(),
            credit_limit: form.credit_limit,
            current_balance: form.current_balance,
            billing_day: form.billing_day,
            payment_day: form.payment_day,
        }
    }
}

/// A route handler for adding a credit card, redirects to the credit cards view on success.
pub async fn create_credit_card_endpoint(
    State(state): State<CreateCreditCardState>,
    Form(form): Form<CreditCardForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_credit_card(&form.into(), &connection) {
        Ok(credit_card) => {
            tracing::info!("Created credit card {} ({})", credit_card.name, credit_card.id);

            (
                HxRedirect(endpoints::CREDIT_CARDS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("Could not create credit card: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
pub(crate) fn new_test_form(name: &str) -> CreditCardForm {
    CreditCardForm {
        name: name.to_owned(),
        credit_limit: 1500.0,
        current_balance: 300.0,
        billing_day: 28,
        payment_day: 14,
    }
}
