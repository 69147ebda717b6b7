//! Defines the endpoint for updating an account.
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
    account::{AccountId, update_account},
    endpoints,
};

/// The state needed to edit an account.
#[derive(Debug, Clone)]
pub struct EditAccountState {
    /// The database connection for managing accounts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditAccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for renaming an account.
#[derive(Debug, Deserialize)]
pub struct EditAccountForm {
    /// The new account name.
    pub name: String,
}

/// A route handler for renaming an account, redirects to accounts view on success.
///
/// The balance is not editable here, it only moves through expenses, incomes
/// and transfers.
pub async fn edit_account_endpoint(
    State(state): State<EditAccountState>,
    Path(account_id): Path<AccountId>,
    Form(form): Form<EditAccountForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_account(account_id, form.name.trim(), &connection) {
        Ok(()) => (
            HxRedirect(endpoints::ACCOUNTS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not update account {account_id}: {error}");
            error.into_alert_response()
        }
    }
}
