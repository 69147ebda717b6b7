//! Xpenbox is a web app for tracking bank accounts, credit cards and the money moving between them.
//!
//! This library provides a REST API that directly serves HTML pages.
//!
//! When recording an expense, the app suggests which account or credit card
//! should pay for it. See [rank] for how the candidate funding sources are ordered.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod account;
mod alert;
mod app_state;
mod credit_card;
mod database_id;
mod db;
mod endpoints;
mod error;
mod expense;
mod funding_source;
mod html;
mod income;
mod internal_server_error;
mod logging;
mod navigation;
mod not_found;
mod routing;
mod timezone;
mod transfer;

#[cfg(test)]
mod test_utils;

pub use account::{Account, AccountId, NewAccount, create_account};
pub use app_state::AppState;
pub use credit_card::{CreditCard, CreditCardId, NewCreditCard, create_credit_card};
pub use db::initialize as initialize_db;
pub use error::Error;
pub use expense::{
    Expense, ExpenseId, NewExpense, record_expense, record_expense_at, rollback_expense,
};
pub use funding_source::{
    FundingSource, FundingSourceId, FundingSourceKind, FundingSourceSelector, Timestamp,
    combine_sources, load_funding_sources, normalize_threshold, rank,
};
pub use income::{Income, IncomeId, NewIncome, record_income, record_income_at, rollback_income};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use transfer::{
    NewTransfer, Transfer, TransferId, record_transfer, record_transfer_at, rollback_transfer,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
