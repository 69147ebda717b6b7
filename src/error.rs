//! Defines the app level error type and conversions to rendered HTML pages and alerts.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    alert::Alert,
    funding_source::{FundingSourceId, MAX_NAME_LENGTH, MIN_NAME_LENGTH},
    internal_server_error::InternalServerError,
    not_found::NotFoundError,
};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// An empty string was used to name an account, credit card or funding source.
    #[error("name cannot be empty")]
    EmptyName,

    /// An account or credit card name was too short or too long, holds the length in characters.
    #[error(
        "name must be between {min} and {max} characters long, got {0}",
        min = MIN_NAME_LENGTH,
        max = MAX_NAME_LENGTH
    )]
    InvalidNameLength(usize),

    /// A monetary amount was NaN, infinite or otherwise outside the allowed range.
    ///
    /// Expense amounts must be greater than zero.
    #[error("{0} is not a valid amount")]
    InvalidAmount(f64),

    /// An account was created or edited with a balance below zero.
    #[error("the account balance {0} cannot be negative")]
    NegativeBalance(f64),

    /// A credit card was created or edited with a limit below one.
    #[error("the credit limit {0} must be at least 1")]
    InvalidCreditLimit(f64),

    /// A billing or payment day was not a valid day of the month (1-31).
    #[error("{0} is not a valid day of the month")]
    InvalidDayOfMonth(u8),

    /// The string could not be parsed as a [FundingSourceId].
    #[error("\"{0}\" is not a valid funding source")]
    InvalidFundingSourceKey(String),

    /// The funding source does not exist, or cannot cover the requested amount.
    #[error("could not find the funding source {0}")]
    FundingSourceNotFound(FundingSourceId),

    /// The account balance does not cover the amount taken from it.
    #[error("insufficient funds in the account")]
    InsufficientFunds,

    /// Charging the expense would take the credit card over its limit.
    #[error("the expense would exceed the credit limit")]
    CreditLimitExceeded,

    /// A transfer named the same account as the origin and the destination.
    #[error("cannot transfer money from an account to itself")]
    SameAccountTransfer,

    /// A credit card payment was larger than what is owed on the card.
    #[error("the payment of {0} is more than is owed on the credit card")]
    PaymentExceedsBalance(f64),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// The specified account name already exists in the database.
    #[error("the account \"{0}\" already exists in the database")]
    DuplicateAccountName(String),

    /// The specified credit card name already exists in the database.
    #[error("the credit card \"{0}\" already exists in the database")]
    DuplicateCreditCardName(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Tried to update an account that does not exist
    #[error("tried to update an account that is not in the database")]
    UpdateMissingAccount,

    /// Tried to delete an account that does not exist
    #[error("tried to delete an account that is not in the database")]
    DeleteMissingAccount,

    /// Tried to update a credit card that does not exist
    #[error("tried to update a credit card that is not in the database")]
    UpdateMissingCreditCard,

    /// Tried to delete a credit card that does not exist
    #[error("tried to delete a credit card that is not in the database")]
    DeleteMissingCreditCard,

    /// Tried to roll back an expense that does not exist
    #[error("tried to delete an expense that is not in the database")]
    DeleteMissingExpense,

    /// Tried to roll back an income that does not exist
    #[error("tried to delete an income that is not in the database")]
    DeleteMissingIncome,

    /// Tried to roll back a transfer or credit card payment that does not exist
    #[error("tried to delete a transfer that is not in the database")]
    DeleteMissingTransfer,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => NotFoundError.into_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an alert fragment for HTMX requests.
    ///
    /// Validation errors get a 400 status, missing rows get a 404 and
    /// everything else is a 500.
    pub(crate) fn into_alert_response(self) -> Response {
        let (status_code, message, details) = match &self {
            Error::EmptyName
            | Error::InvalidNameLength(_)
            | Error::InvalidAmount(_)
            | Error::NegativeBalance(_)
            | Error::InvalidCreditLimit(_)
            | Error::InvalidDayOfMonth(_)
            | Error::InvalidFundingSourceKey(_)
            | Error::SameAccountTransfer
            | Error::PaymentExceedsBalance(_) => (
                StatusCode::BAD_REQUEST,
                "Invalid input".to_owned(),
                format!("{}. Check the form and try again.", capitalize(&self.to_string())),
            ),
            Error::FundingSourceNotFound(_) => (
                StatusCode::BAD_REQUEST,
                "Invalid payment source".to_owned(),
                "The selected account or credit card could not be found. \
                Try refreshing the page and selecting another one."
                    .to_owned(),
            ),
            Error::InsufficientFunds => (
                StatusCode::BAD_REQUEST,
                "Insufficient funds".to_owned(),
                "The account does not have enough money to cover this amount.".to_owned(),
            ),
            Error::CreditLimitExceeded => (
                StatusCode::BAD_REQUEST,
                "Credit limit exceeded".to_owned(),
                "The selected credit card does not have enough available credit to cover \
                this expense."
                    .to_owned(),
            ),
            Error::DuplicateAccountName(name) => (
                StatusCode::BAD_REQUEST,
                "Duplicate Account Name".to_owned(),
                format!(
                    "The account {name} already exists in the database. \
                    Choose a different account name, or edit or delete the existing account."
                ),
            ),
            Error::DuplicateCreditCardName(name) => (
                StatusCode::BAD_REQUEST,
                "Duplicate Credit Card Name".to_owned(),
                format!(
                    "The credit card {name} already exists in the database. \
                    Choose a different name, or edit or delete the existing credit card."
                ),
            ),
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Invalid Timezone Settings".to_owned(),
                format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            ),
            Error::UpdateMissingAccount => (
                StatusCode::NOT_FOUND,
                "Could not update account".to_owned(),
                "The account could not be found.".to_owned(),
            ),
            Error::DeleteMissingAccount => (
                StatusCode::NOT_FOUND,
                "Could not delete account".to_owned(),
                "The account could not be found. \
                Try refreshing the page to see if the account has already been deleted."
                    .to_owned(),
            ),
            Error::UpdateMissingCreditCard => (
                StatusCode::NOT_FOUND,
                "Could not update credit card".to_owned(),
                "The credit card could not be found.".to_owned(),
            ),
            Error::DeleteMissingCreditCard => (
                StatusCode::NOT_FOUND,
                "Could not delete credit card".to_owned(),
                "The credit card could not be found. \
                Try refreshing the page to see if the credit card has already been deleted."
                    .to_owned(),
            ),
            Error::DeleteMissingExpense => (
                StatusCode::NOT_FOUND,
                "Could not delete expense".to_owned(),
                "The expense could not be found. \
                Try refreshing the page to see if the expense has already been deleted."
                    .to_owned(),
            ),
            Error::DeleteMissingIncome => (
                StatusCode::NOT_FOUND,
                "Could not delete income".to_owned(),
                "The income could not be found. \
                Try refreshing the page to see if the income has already been deleted."
                    .to_owned(),
            ),
            Error::DeleteMissingTransfer => (
                StatusCode::NOT_FOUND,
                "Could not delete transfer".to_owned(),
                "The transfer could not be found. \
                Try refreshing the page to see if the transfer has already been deleted."
                    .to_owned(),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong".to_owned(),
                "An unexpected error occurred, check the server logs for more details.".to_owned(),
            ),
        };

        (status_code, Alert::Error { message, details }.into_html()).into_response()
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();

    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
