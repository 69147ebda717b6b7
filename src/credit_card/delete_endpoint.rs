//! Defines the endpoint for deleting a credit card.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    credit_card::{CreditCardId, delete_credit_card},
};

/// The state needed to delete a credit card.
#[derive(Debug, Clone)]
pub struct DeleteCreditCardState {
    /// The database connection for managing credit cards.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteCreditCardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting a credit card, responds with an alert.
pub async fn delete_credit_card_endpoint(
    State(state): State<DeleteCreditCardState>,
    Path(credit_card_id): Path<CreditCardId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_credit_card(credit_card_id, &connection) {
        // The status code has to be 200 OK or HTMX will not delete the table row.
        Ok(()) => Alert::SuccessSimple {
            message: "Credit card deleted successfully".to_owned(),
        }
        .into_response(),
        Err(error) => {
            tracing::error!("Could not delete credit card {credit_card_id}: {error}");
            error.into_alert_response()
        }
    }
}
