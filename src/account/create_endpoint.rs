//! Defines the endpoint for creating a new account.
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
    account::{NewAccount, create_account},
    endpoints,
};

/// The state needed to create an account.
#[derive(Debug, Clone)]
pub struct CreateAccountState {
    /// The database connection for managing accounts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateAccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for creating or editing an account.
#[derive(Debug, Deserialize)]
pub struct AccountForm {
    /// The account name.
    pub name: String,
    /// The balance in dollars.
    pub balance: f64,
}

impl From<AccountForm> for NewAccount {
    fn from(form: AccountForm) -> Self {
        Self {
            name: form.name.trim().to_owned(),
            balance: form.balance,
        }
    }
}

/// A route handler for creating a new account, redirects to accounts view on success.
pub async fn create_account_endpoint(
    State(state): State<CreateAccountState>,
    Form(form): Form<AccountForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_account(&form.into(), &connection) {
        Ok(account) => {
            tracing::info!("Created account {} ({})", account.name, account.id);

            (
                HxRedirect(endpoints::ACCOUNTS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("Could not create account: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Form, extract::State, http::StatusCode, response::IntoResponse};
    use rusqlite::Connection;

    use crate::{
        account::{
            Account, NewAccount, create_account,
            create_endpoint::{AccountForm, CreateAccountState},
            create_account_endpoint, get_account,
        },
        db::initialize,
        endpoints,
        test_utils::{assert_hx_redirect, assert_valid_html, parse_html_fragment},
    };

    fn get_test_state() -> CreateAccountState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        CreateAccountState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn can_create_account() {
        let state = get_test_state();
        let form = AccountForm {
            name: " Everyday ".to_owned(),
            balance: 123.45,
        };

        let response = create_account_endpoint(State(state.clone()), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::ACCOUNTS_VIEW);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(
            get_account(1, &connection),
            Ok(Account {
                id: 1,
                name: "Everyday".to_owned(),
                balance: 123.45,
                last_used_at: None,
                usage_count: 0,
            })
        );
    }

    #[tokio::test]
    async fn negative_balance_returns_alert() {
        let state = get_test_state();
        let form = AccountForm {
            name: "Everyday".to_owned(),
            balance: -1.0,
        };

        let response = create_account_endpoint(State(state), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
    }

    #[tokio::test]
    async fn duplicate_name_returns_alert() {
        let state = get_test_state();
        create_account(
            &NewAccount {
                name: "Everyday".to_owned(),
                balance: 1.0,
            },
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();
        let form = AccountForm {
            name: "Everyday".to_owned(),
            balance: 2.0,
        };

        let response = create_account_endpoint(State(state), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
