//! Displays recorded expenses, newest first.

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
    expense::{ExpenseWithSource, get_expenses},
    funding_source::FundingSourceKind,
    html::{
        BUTTON_DELETE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, date_time_view, format_currency,
    },
    navigation::NavBar,
    timezone::local_offset,
};

/// The state needed for the [get_expenses_page](crate::expense::get_expenses_page) route handler.
#[derive(Debug, Clone)]
pub struct ExpensesPageState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for ExpensesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

const DELETE_CONFIRM_MESSAGE: &str = "Are you sure you want to delete this expense? \
    The amount will be returned to the account or credit card that paid for it.";

fn source_kind_label(listed: &ExpenseWithSource) -> &'static str {
    match listed.expense.source.kind() {
        FundingSourceKind::DebitAccount => "Account",
        FundingSourceKind::CreditLine => "Credit card",
    }
}

fn delete_button(listed: &ExpenseWithSource, hx_target: &str, hx_swap: &str) -> Markup {
    let delete_url = format_endpoint(endpoints::EXPENSE, listed.expense.id);

    html!(
        button
            hx-delete=(delete_url)
            hx-confirm=(DELETE_CONFIRM_MESSAGE)
            hx-target=(hx_target)
            hx-target-error="#alert-container"
            hx-swap=(hx_swap)
            class=(BUTTON_DELETE_STYLE)
        {
            "Delete"
        }
    )
}

fn expenses_view(expenses: &[ExpenseWithSource], local_offset: UtcOffset) -> Markup {
    let new_expense_url = endpoints::NEW_EXPENSE_VIEW;
    let nav_bar = NavBar::new(endpoints::EXPENSES_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Expenses" }

                    a href=(new_expense_url) class=(LINK_STYLE) { "Record Expense" }
                }

                ul class="lg:hidden space-y-4"
                {
                    @for listed in expenses {
                        li class="rounded border border-gray-200 bg-white px-4 py-3 shadow-sm dark:border-gray-700 dark:bg-gray-800"
                            data-expense-card="true"
                        {
                            div class="flex items-start justify-between gap-3"
                            {
                                div class="text-sm font-semibold text-gray-900 dark:text-white"
                                { (listed.expense.description) }
                                div class="text-sm tabular-nums text-right text-gray-900 dark:text-white"
                                { (format_currency(listed.expense.amount)) }
                            }

                            div class="mt-1 text-xs text-gray-500 dark:text-gray-400"
                            {
                                (date_time_view(listed.expense.recorded_at.to_offset(local_offset)))
                                " · " (listed.source_name)
                            }

                            div class="mt-2 text-sm"
                            {
                                (delete_button(listed, "closest [data-expense-card='true']", "outerHTML"))
                            }
                        }
                    }

                    @if expenses.is_empty() {
                        li class="rounded border border-dashed border-gray-300 bg-white px-4 py-6 text-center text-sm text-gray-500 dark:border-gray-700 dark:bg-gray-800 dark:text-gray-400"
                        {
                            "No expenses yet. Record one "
                            a href=(new_expense_url) class=(LINK_STYLE) { "here" }
                            "."
                        }
                    }
                }

                section class="hidden lg:block w-full overflow-x-auto lg:overflow-visible dark:bg-gray-800 lg:max-w-5xl lg:w-full lg:mx-auto"
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
                                th scope="col" class=(TABLE_CELL_STYLE) { "Paid With" }
                                th scope="col" class="px-6 py-3 text-right" { "Amount" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for listed in expenses {
                                tr class=(TABLE_ROW_STYLE)
                                {
                                    td class=(TABLE_CELL_STYLE)
                                    {
                                        (date_time_view(listed.expense.recorded_at.to_offset(local_offset)))
                                    }
                                    td class=(TABLE_CELL_STYLE) { (listed.expense.description) }
                                    td class=(TABLE_CELL_STYLE)
                                    {
                                        (listed.source_name)
                                        span class="block text-xs opacity-75" { (source_kind_label(listed)) }
                                    }
                                    td class="px-6 py-4 text-right" { (format_currency(listed.expense.amount)) }
                                    td class=(TABLE_CELL_STYLE)
                                    {
                                        (delete_button(listed, "closest tr", "delete"))
                                    }
                                }
                            }

                            @if expenses.is_empty() {
                                tr
                                {
                                    td
                                        colspan="5"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No expenses yet. Record one "
                                        a href=(new_expense_url) class=(LINK_STYLE) { "here" }
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

    base("Expenses", &[], &content)
}

/// Renders the page listing all expenses with their local date and time.
pub async fn get_expenses_page(State(state): State<ExpensesPageState>) -> Result<Response, Error> {
    let local_offset = local_offset(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let expenses = get_expenses(&connection)
        .inspect_err(|error| tracing::error!("could not get expenses: {error}"))?;

    Ok(expenses_view(&expenses, local_offset).into_response())
}
