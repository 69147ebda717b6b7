//! Displays accounts, their balances and how often they are used.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::UtcOffset;

use crate::{
    AppState, Error,
    account::{Account, get_all_accounts},
    endpoints::{self, format_endpoint},
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, edit_delete_action_links, format_currency, last_used_view,
    },
    navigation::NavBar,
    timezone::local_offset,
};

/// The state needed for the [get_accounts_page](crate::account::get_accounts_page) route handler.
#[derive(Debug, Clone)]
pub struct AccountsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for AccountsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The account data to display in the view
#[derive(Debug, PartialEq)]
struct AccountTableRow {
    account: Account,
    edit_url: String,
    delete_url: String,
    transfer_url: String,
}

impl From<Account> for AccountTableRow {
    fn from(account: Account) -> Self {
        Self {
            edit_url: format_endpoint(endpoints::EDIT_ACCOUNT_VIEW, account.id),
            delete_url: format_endpoint(endpoints::ACCOUNT, account.id),
            transfer_url: format_endpoint(endpoints::NEW_TRANSFER_VIEW, account.id),
            account,
        }
    }
}

fn delete_confirm_message(name: &str) -> String {
    format!(
        "Are you sure you want to delete the account '{name}'? \
        The expenses, incomes and transfers recorded against it will also be deleted. \
        This cannot be undone."
    )
}

fn accounts_view(accounts: &[AccountTableRow], local_offset: UtcOffset) -> Markup {
    let create_account_page_url = endpoints::NEW_ACCOUNT_VIEW;
    let nav_bar = NavBar::new(endpoints::ACCOUNTS_VIEW).into_html();

    let table_row = |row: &AccountTableRow| {
        let action_links = edit_delete_action_links(
            &row.edit_url,
            &row.delete_url,
            &delete_confirm_message(&row.account.name),
            "closest tr",
            "delete",
        );

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                th
                    scope="row"
                    class="px-6 py-4 font-medium text-gray-900 whitespace-nowrap dark:text-white"
                {
                    (row.account.name)
                }

                td class="px-6 py-4 text-right"
                {
                    (format_currency(row.account.balance))
                }

                td class=(TABLE_CELL_STYLE)
                {
                    (last_used_view(row.account.last_used_at, local_offset))
                }

                td class="px-6 py-4 text-right"
                {
                    (row.account.usage_count)
                }

                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex gap-4"
                    {
                        a href=(row.transfer_url) class=(LINK_STYLE) { "Transfer" }
                        (action_links)
                    }
                }
            }
        )
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Accounts" }

                    a href=(create_account_page_url) class=(LINK_STYLE)
                    {
                        "Add Account"
                    }
                }

                (accounts_cards_view(accounts, create_account_page_url, local_offset))

                section class="hidden lg:block w-full overflow-x-auto lg:overflow-visible dark:bg-gray-800 lg:max-w-5xl lg:w-full lg:mx-auto"
                {
                    table class="w-full text-sm text-left rtl:text-right
                        text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                                th scope="col" class="px-6 py-3 text-right" { "Balance" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Last Used" }
                                th scope="col" class="px-6 py-3 text-right" { "Expenses" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for account in accounts {
                                (table_row(account))
                            }

                            @if accounts.is_empty() {
                                tr
                                {
                                    td
                                        colspan="5"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No accounts found. Create an account "
                                        a href=(create_account_page_url) class=(LINK_STYLE)
                                        {
                                            "here"
                                        }
                                        "."
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Accounts", &[], &content)
}

fn accounts_cards_view(
    accounts: &[AccountTableRow],
    create_account_page_url: &str,
    local_offset: UtcOffset,
) -> Markup {
    html!(
        ul class="lg:hidden space-y-4"
        {
            @for row in accounts {
                li class="rounded border border-gray-200 bg-white px-4 py-3 shadow-sm dark:border-gray-700 dark:bg-gray-800"
                    data-account-card="true"
                {
                    div class="flex items-start justify-between gap-3"
                    {
                        div class="text-sm font-semibold text-gray-900 dark:text-white"
                        { (row.account.name) }
                        div class="text-sm tabular-nums text-right text-gray-900 dark:text-white"
                        { (format_currency(row.account.balance)) }
                    }

                    div class="mt-1 text-xs text-gray-500 dark:text-gray-400"
                    {
                        "Last used: " (last_used_view(row.account.last_used_at, local_offset))
                        " · " (row.account.usage_count) " expenses"
                    }

                    div class="mt-2 flex items-center gap-4 text-sm"
                    {
                        a href=(row.transfer_url) class=(LINK_STYLE) { "Transfer" }
                        (edit_delete_action_links(
                            &row.edit_url,
                            &row.delete_url,
                            &delete_confirm_message(&row.account.name),
                            "closest [data-account-card='true']",
                            "outerHTML",
                        ))
                    }
                }
            }

            @if accounts.is_empty() {
                li class="rounded border border-dashed border-gray-300 bg-white px-4 py-6 text-center text-sm text-gray-500 dark:border-gray-700 dark:bg-gray-800 dark:text-gray-400"
                {
                    "No accounts found. Create an account "
                    a href=(create_account_page_url) class=(LINK_STYLE)
                    {
                        "here"
                    }
                    "."
                }
            }
        }
    )
}

/// Renders the accounts page showing all accounts.
pub async fn get_accounts_page(State(state): State<AccountsPageState>) -> Result<Response, Error> {
    let local_offset = local_offset(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let accounts: Vec<AccountTableRow> = get_all_accounts(&connection)
        .inspect_err(|error| tracing::error!("could not get all accounts: {error}"))?
        .into_iter()
        .map(AccountTableRow::from)
        .collect();

    Ok(accounts_view(&accounts, local_offset).into_response())
}
