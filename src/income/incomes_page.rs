//! Displays recorded incomes, newest first.

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
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, date_time_view, format_currency,
    },
    income::{IncomeWithAccount, get_incomes},
    navigation::NavBar,
    timezone::local_offset,
};

/// The state needed for the [get_incomes_page](crate::income::get_incomes_page) route handler.
#[derive(Debug, Clone)]
pub struct IncomesPageState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for IncomesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

const DELETE_CONFIRM_MESSAGE: &str = "Are you sure you want to delete this income? \
    The amount will be taken back out of the account it was deposited into.";

fn incomes_view(incomes: &[IncomeWithAccount], local_offset: UtcOffset) -> Markup {
    let new_income_url = endpoints::NEW_INCOME_VIEW;
    let nav_bar = NavBar::new(endpoints::INCOMES_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Incomes" }

                    a href=(new_income_url) class=(LINK_STYLE) { "Record Income" }
                }

                section class="w-full overflow-x-auto dark:bg-gray-800 lg:max-w-5xl lg:w-full lg:mx-auto"
                {
                    table class="w-full text-sm text-left rtl:text-right
                        text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Account" }
                                th scope="col" class="px-6 py-3 text-right" { "Amount" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for listed in incomes {
                                tr class=(TABLE_ROW_STYLE)
                                {
                                    td class=(TABLE_CELL_STYLE)
                                    {
                                        (date_time_view(listed.income.received_at.to_offset(local_offset)))
                                    }
                                    td class=(TABLE_CELL_STYLE) { (listed.income.description) }
                                    td class=(TABLE_CELL_STYLE) { (listed.account_name) }
                                    td class="px-6 py-4 text-right" { (format_currency(listed.income.amount)) }
                                    td class=(TABLE_CELL_STYLE)
                                    {
                                        button
                                            hx-delete=(format_endpoint(endpoints::INCOME, listed.income.id))
                                            hx-confirm=(DELETE_CONFIRM_MESSAGE)
                                            hx-target="closest tr"
                                            hx-target-error="#alert-container"
                                            hx-swap="delete"
                                            class=(BUTTON_DELETE_STYLE)
                                        {
                                            "Delete"
                                        }
                                    }
                                }
                            }

                            @if incomes.is_empty() {
                                tr
                                {
                                    td
                                        colspan="5"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No incomes yet. Record one "
                                        a href=(new_income_url) class=(LINK_STYLE) { "here" }
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

    base("Incomes", &[], &content)
}

/// Renders the page listing all incomes with their local date and time.
pub async fn get_incomes_page(State(state): State<IncomesPageState>) -> Result<Response, Error> {
    let local_offset = local_offset(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let incomes = get_incomes(&connection)
        .inspect_err(|error| tracing::error!("could not get incomes: {error}"))?;

    Ok(incomes_view(&incomes, local_offset).into_response())
}
