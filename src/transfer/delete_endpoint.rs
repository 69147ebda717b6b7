//! Defines the endpoint for rolling back a transfer or a credit card payment.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    funding_source::FundingSourceId,
    html::format_currency,
    transfer::{TransferId, rollback_transfer},
};

/// The state needed to roll back a transfer.
#[derive(Debug, Clone)]
pub struct DeleteTransferState {
    /// The database connection for managing transfers.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransferState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for rolling back a transfer, responds with an alert.
pub async fn delete_transfer_endpoint(
    State(state): State<DeleteTransferState>,
    Path(transfer_id): Path<TransferId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match rollback_transfer(transfer_id, &connection) {
        // The status code has to be 200 OK or HTMX will not delete the table row.
        Ok(transfer) => {
            tracing::info!(
                "Rolled back transfer {transfer_id} of {} from account {} to {}",
                transfer.amount,
                transfer.from,
                transfer.to
            );

            let details = match transfer.to {
                FundingSourceId::Account(_) => format!(
                    "{} was moved back to the account it came from.",
                    format_currency(transfer.amount)
                ),
                FundingSourceId::CreditCard(_) => format!(
                    "{} was added back onto the credit card.",
                    format_currency(transfer.amount)
                ),
            };

            Alert::Success {
                message: "Transfer deleted".to_owned(),
                details,
            }
            .into_response()
        }
        Err(error) => {
            tracing::error!("Could not roll back transfer {transfer_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
    };
    use rusqlite::Connection;

    use crate::{
        account::{NewAccount, create_account, get_account},
        db::initialize,
        funding_source::FundingSourceId,
        test_utils::{assert_valid_html, parse_html_fragment},
        transfer::{NewTransfer, delete_transfer_endpoint, get_transfers, record_transfer},
    };

    use super::DeleteTransferState;

    fn get_test_state() -> DeleteTransferState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        for (name, balance) in [("Everyday", 40.0), ("Savings", 1.0)] {
            create_account(
                &NewAccount {
                    name: name.to_owned(),
                    balance,
                },
                &connection,
            )
            .unwrap();
        }
        record_transfer(
            &NewTransfer {
                amount: 15.0,
                description: String::new(),
                from: 1,
                to: FundingSourceId::Account(2),
            },
            &connection,
        )
        .unwrap();

        DeleteTransferState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn rolls_back_transfer() {
        let state = get_test_state();

        let response = delete_transfer_endpoint(State(state.clone()), Path(1)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_account(1, &connection).unwrap().balance, 40.0);
        assert_eq!(get_account(2, &connection).unwrap().balance, 1.0);
        assert_eq!(get_transfers(&connection), Ok(vec![]));
    }

    #[tokio::test]
    async fn spent_transfer_returns_bad_request() {
        let state = get_test_state();
        state
            .db_connection
            .lock()
            .unwrap()
            .execute("UPDATE account SET balance = 14 WHERE id = 2", ())
            .unwrap();

        let response = delete_transfer_endpoint(State(state.clone()), Path(1)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            get_transfers(&state.db_connection.lock().unwrap())
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn missing_transfer_returns_not_found() {
        let response = delete_transfer_endpoint(State(get_test_state()), Path(42)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
