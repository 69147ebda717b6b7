//! Defines the endpoint for updating a credit card.
use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    credit_card::{CreditCardDetails, CreditCardId, update_credit_card},
    endpoints,
};

/// The state needed to edit a credit card.
#[derive(Debug, Clone)]
pub struct EditCreditCardState {
    /// The database connection for managing credit cards.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditCreditCardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for editing a credit card.
#[derive(Debug, Deserialize)]
pub struct EditCreditCardForm {
    pub name: String,
    pub credit_limit: f64,
    pub billing_day: u8,
    pub payment_day: u8,
}

impl From<EditCreditCardForm> for CreditCardDetails {
    fn from(form: EditCreditCardForm) -> Self {
        Self {
            name: form.name.trim().to_owned(),
            credit_limit: form.credit_limit,
            billing_day: form.billing_day,
            payment_day: form.payment_day,
        }
    }
}

/// A route handler for updating a credit card, redirects to the credit cards view on success.
pub async fn edit_credit_card_endpoint(
    State(state): State<EditCreditCardState>,
    Path(credit_card_id): Path<CreditCardId>,
    Form(form): Form<EditCreditCardForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_credit_card(credit_card_id, &form.into(), &connection) {
        Ok(()) => (
            HxRedirect(endpoints::CREDIT_CARDS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not update credit card {credit_card_id}: {error}");
            error.into_alert_response()
        }
    }
}
