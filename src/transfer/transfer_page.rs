//! Defines the route handler for the page for moving money out of an account.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    account::{Account, AccountId, get_account},
    endpoints::{self, format_endpoint},
    funding_source::{
        FundingSourceId, FundingSourceSelector, PickerPurpose, build_selector, candidate_sources,
        funding_source_picker_view, load_funding_sources,
    },
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        dollar_input_styles, format_currency, loading_spinner,
    },
    internal_server_error::InternalServerError,
    navigation::NavBar,
    not_found::NotFoundError,
};

/// The state needed for the transfer page.
#[derive(Debug, Clone)]
pub struct NewTransferPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for NewTransferPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

fn load_page_data(
    account_id: AccountId,
    connection: &Connection,
) -> Result<(Account, FundingSourceSelector), Error> {
    let account = get_account(account_id, connection)?;
    let sources = load_funding_sources(connection)?;

    let destinations = candidate_sources(sources, PickerPurpose::Transfer, Some(account_id));
    let selector = build_selector(
        destinations,
        PickerPurpose::Transfer.threshold(f64::NAN),
        None,
    );

    Ok((account, selector))
}

/// Renders the page for moving money from an account into another account.
pub async fn get_new_transfer_page(
    State(state): State<NewTransferPageState>,
    Path(account_id): Path<AccountId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return InternalServerError::default().into_response();
        }
    };

    match load_page_data(account_id, &connection) {
        Ok((account, selector)) => new_transfer_view(&account, &selector).into_response(),
        Err(Error::NotFound) => NotFoundError.into_response(),
        Err(error) => {
            tracing::error!("Failed to load transfer page for account {account_id}: {error}");
            InternalServerError::default().into_response()
        }
    }
}

fn new_transfer_view(account: &Account, selector: &FundingSourceSelector) -> Markup {
    let page_url = format_endpoint(endpoints::NEW_TRANSFER_VIEW, account.id);
    let nav_bar = NavBar::new(&page_url).into_html();
    let spinner = loading_spinner();
    let from_key = FundingSourceId::Account(account.id).to_string();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-post=(endpoints::TRANSFERS_API)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "Transfer from " (account.name) }

                p id="balance" class="text-sm text-gray-500 dark:text-gray-400"
                {
                    "Balance: " (format_currency(account.balance))
                }

                input type="hidden" name="from" value=(from_key);

                div
                {
                    label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                    div class="input-wrapper w-full"
                    {
                        input
                            name="amount"
                            id="amount"
                            type="number"
                            step="0.01"
                            min="0.01"
                            max=(account.balance)
                            placeholder="0.00"
                            required
                            autofocus
                            class=(FORM_TEXT_INPUT_STYLE);
                    }
                }

                div
                {
                    label for="description" class=(FORM_LABEL_STYLE) { "Description" }

                    input
                        name="description"
                        id="description"
                        type="text"
                        placeholder="Description"
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                (funding_source_picker_view(selector, PickerPurpose::Transfer))

                button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                {
                    span id="indicator" class="inline htmx-indicator" { (spinner) }
                    " Transfer"
                }
            }
        }
    };

    base("Transfer", &[dollar_input_styles()], &content)
}
