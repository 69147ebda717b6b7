//! Defines the endpoint for recording a transfer or a credit card payment.
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
    transfer::{NewTransfer, record_transfer},
};

/// The state needed to record a transfer.
#[derive(Debug, Clone)]
pub struct CreateTransferState {
    /// The database connection for managing transfers.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransferState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for recording a transfer or a credit card payment.
#[derive(Debug, Deserialize)]
pub struct TransferForm {
    /// The amount to move in dollars.
    pub amount: f64,
    #[serde(default)]
    pub description: String,
    /// The key of the account the money comes from, e.g. "account-1".
    pub from: String,
    /// The key of the account or credit card the money goes to.
    pub to: String,
}

impl TryFrom<TransferForm> for NewTransfer {
    type Error = Error;

    fn try_from(form: TransferForm) -> Result<Self, Self::Error> {
        let from_key = form.from.trim();

        let FundingSourceId::Account(from) = from_key.parse()? else {
            return Err(Error::InvalidFundingSourceKey(from_key.to_owned()));
        };

        Ok(Self {
            amount: form.amount,
            description: form.description.trim().to_owned(),
            from,
            to: form.to.trim().parse()?,
        })
    }
}

/// A route handler for recording a transfer, redirects to the transfers view on success.
pub async fn create_transfer_endpoint(
    State(state): State<CreateTransferState>,
    Form(form): Form<TransferForm>,
) -> Response {
    let new_transfer = match NewTransfer::try_from(form) {
        Ok(new_transfer) => new_transfer,
        Err(error) => {
            tracing::error!("Invalid transfer form: {error}");
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

    match record_transfer(&new_transfer, &connection) {
        Ok(transfer) => {
            tracing::info!(
                "Recorded transfer {} of {} from account {} to {}",
                transfer.id,
                transfer.amount,
                transfer.from,
                transfer.to
            );

            (
                HxRedirect(endpoints::TRANSFERS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("Could not record transfer: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Form, extract::State, http::StatusCode};
    use rusqlite::Connection;

    use crate::{
        Error,
        account::{NewAccount, create_account, get_account},
        credit_card::{NewCreditCard, create_credit_card, get_credit_card},
        db::initialize,
        endpoints,
        funding_source::FundingSourceId,
        test_utils::{assert_hx_redirect, assert_valid_html, parse_html_fragment},
        transfer::{NewTransfer, create_transfer_endpoint, get_transfers},
    };

    use super::{CreateTransferState, TransferForm};

    fn get_test_state() -> CreateTransferState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        for (name, balance) in [("Everyday", 50.0), ("Savings", 5.0)] {
            create_account(
                &NewAccount {
                    name: name.to_owned(),
                    balance,
                },
                &connection,
            )
            .unwrap();
        }
        create_credit_card(
            &NewCreditCard {
                name: "Visa".to_owned(),
                credit_limit: 500.0,
                current_balance: 80.0,
                billing_day: 1,
                payment_day: 20,
            },
            &connection,
        )
        .unwrap();

        CreateTransferState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    fn form(amount: f64, from: &str, to: &str) -> TransferForm {
        TransferForm {
            amount,
            description: " Top up ".to_owned(),
            from: from.to_owned(),
            to: to.to_owned(),
        }
    }

    #[test]
    fn parses_keys() {
        let got = NewTransfer::try_from(form(1.5, "account-1", "credit_card-2"));

        assert_eq!(
            got,
            Ok(NewTransfer {
                amount: 1.5,
                description: "Top up".to_owned(),
                from: 1,
                to: FundingSourceId::CreditCard(2),
            })
        );
    }

    #[test]
    fn rejects_credit_card_as_origin() {
        let got = NewTransfer::try_from(form(1.0, "credit_card-1", "account-1"));

        assert_eq!(
            got,
            Err(Error::InvalidFundingSourceKey("credit_card-1".to_owned()))
        );
    }

    #[tokio::test]
    async fn records_transfer_between_accounts() {
        let state = get_test_state();

        let response = create_transfer_endpoint(
            State(state.clone()),
            Form(form(20.0, "account-1", "account-2")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::TRANSFERS_VIEW);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_account(1, &connection).unwrap().balance, 30.0);
        assert_eq!(get_account(2, &connection).unwrap().balance, 25.0);
        let transfers = get_transfers(&connection).unwrap();
        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0].transfer.description, "Top up");
    }

    #[tokio::test]
    async fn records_card_payment() {
        let state = get_test_state();

        let response = create_transfer_endpoint(
            State(state.clone()),
            Form(form(50.0, "account-1", "credit_card-1")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_account(1, &connection).unwrap().balance, 0.0);
        assert_eq!(get_credit_card(1, &connection).unwrap().current_balance, 30.0);
    }

    #[tokio::test]
    async fn same_account_returns_bad_request() {
        let state = get_test_state();

        let response = create_transfer_endpoint(
            State(state.clone()),
            Form(form(1.0, "account-1", "account-1")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        assert_eq!(get_transfers(&state.db_connection.lock().unwrap()), Ok(vec![]));
    }

    #[tokio::test]
    async fn overpayment_returns_bad_request() {
        let state = get_test_state();
        state
            .db_connection
            .lock()
            .unwrap()
            .execute("UPDATE account SET balance = 1000 WHERE id = 1", ())
            .unwrap();

        let response = create_transfer_endpoint(
            State(state.clone()),
            Form(form(80.01, "account-1", "credit_card-1")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            get_credit_card(1, &state.db_connection.lock().unwrap())
                .unwrap()
                .current_balance,
            80.0
        );
    }

    #[tokio::test]
    async fn insufficient_funds_returns_bad_request() {
        let response = create_transfer_endpoint(
            State(get_test_state()),
            Form(form(5.01, "account-2", "account-1")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
