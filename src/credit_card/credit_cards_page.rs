//! Displays credit cards with their available credit and billing cycle.

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
    credit_card::{CreditCard, get_all_credit_cards},
    endpoints::{self, format_endpoint},
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, edit_delete_action_links, format_currency, last_used_view,
    },
    navigation::NavBar,
    timezone::local_offset,
};

/// The state needed for the [get_credit_cards_page](crate::credit_card::get_credit_cards_page) route handler.
#[derive(Debug, Clone)]
pub struct CreditCardsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreditCardsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

#[derive(Debug, PartialEq)]
struct CreditCardTableRow {
    credit_card: CreditCard,
    edit_url: String,
    delete_url: String,
    payment_url: String,
}

impl From<CreditCard> for CreditCardTableRow {
    fn from(credit_card: CreditCard) -> Self {
        Self {
            edit_url: format_endpoint(endpoints::EDIT_CREDIT_CARD_VIEW, credit_card.id),
            delete_url: format_endpoint(endpoints::CREDIT_CARD, credit_card.id),
            payment_url: format_endpoint(endpoints::CARD_PAYMENT_VIEW, credit_card.id),
            credit_card,
        }
    }
}

fn delete_confirm_message(name: &str) -> String {
    format!(
        "Are you sure you want to delete the credit card '{name}'? \
        The expenses charged to it and the payments made to it will also be deleted. \
        This cannot be undone."
    )
}

fn billing_cycle_text(credit_card: &CreditCard) -> String {
    format!(
        "Bills on day {}, due on day {}",
        credit_card.billing_day, credit_card.payment_day
    )
}

fn credit_cards_view(credit_cards: &[CreditCardTableRow], local_offset: UtcOffset) -> Markup {
    let create_page_url = endpoints::NEW_CREDIT_CARD_VIEW;
    let nav_bar = NavBar::new(endpoints::CREDIT_CARDS_VIEW).into_html();

    let table_row = |row: &CreditCardTableRow| {
        let card = &row.credit_card;

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                th
                    scope="row"
                    class="px-6 py-4 font-medium text-gray-900 whitespace-nowrap dark:text-white"
                {
                    (card.name)
                }

                td class="px-6 py-4 text-right" { (format_currency(card.available_credit())) }
                td class="px-6 py-4 text-right" { (format_currency(card.current_balance)) }
                td class="px-6 py-4 text-right" { (format_currency(card.credit_limit)) }
                td class=(TABLE_CELL_STYLE) { (billing_cycle_text(card)) }
                td class=(TABLE_CELL_STYLE) { (last_used_view(card.last_used_at, local_offset)) }
                td class="px-6 py-4 text-right" { (card.usage_count) }

                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex gap-4"
                    {
                        a href=(row.payment_url) class=(LINK_STYLE) { "Pay" }
                        (edit_delete_action_links(
                            &row.edit_url,
                            &row.delete_url,
                            &delete_confirm_message(&card.name),
                            "closest tr",
                            "delete",
                        ))
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
                    h1 class="text-xl font-bold" { "Credit Cards" }

                    a href=(create_page_url) class=(LINK_STYLE) { "Add Credit Card" }
                }

                (credit_cards_cards_view(credit_cards, create_page_url, local_offset))

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
                                th scope="col" class="px-6 py-3 text-right" { "Available" }
                                th scope="col" class="px-6 py-3 text-right" { "Owing" }
                                th scope="col" class="px-6 py-3 text-right" { "Limit" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Billing Cycle" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Last Used" }
                                th scope="col" class="px-6 py-3 text-right" { "Expenses" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for credit_card in credit_cards {
                                (table_row(credit_card))
                            }

                            @if credit_cards.is_empty() {
                                tr
                                {
                                    td
                                        colspan="8"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No credit cards found. Add a credit card "
                                        a href=(create_page_url) class=(LINK_STYLE) { "here" }
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

    base("Credit Cards", &[], &content)
}

fn credit_cards_cards_view(
    credit_cards: &[CreditCardTableRow],
    create_page_url: &str,
    local_offset: UtcOffset,
) -> Markup {
    html!(
        ul class="lg:hidden space-y-4"
        {
            @for row in credit_cards {
                li class="rounded border border-gray-200 bg-white px-4 py-3 shadow-sm dark:border-gray-700 dark:bg-gray-800"
                    data-credit-card="true"
                {
                    div class="flex items-start justify-between gap-3"
                    {
                        div class="text-sm font-semibold text-gray-900 dark:text-white"
                        { (row.credit_card.name) }
                        div class="text-sm tabular-nums text-right text-gray-900 dark:text-white"
                        {
                            (format_currency(row.credit_card.available_credit()))
                            " of " (format_currency(row.credit_card.credit_limit))
                        }
                    }

                    div class="mt-1 text-xs text-gray-500 dark:text-gray-400"
                    {
                        (billing_cycle_text(&row.credit_card))
                    }

                    div class="mt-1 text-xs text-gray-500 dark:text-gray-400"
                    {
                        "Last used: " (last_used_view(row.credit_card.last_used_at, local_offset))
                        " · " (row.credit_card.usage_count) " expenses"
                    }

                    div class="mt-2 flex items-center gap-4 text-sm"
                    {
                        a href=(row.payment_url) class=(LINK_STYLE) { "Pay" }
                        (edit_delete_action_links(
                            &row.edit_url,
                            &row.delete_url,
                            &delete_confirm_message(&row.credit_card.name),
                            "closest [data-credit-card='true']",
                            "outerHTML",
                        ))
                    }
                }
            }

            @if credit_cards.is_empty() {
                li class="rounded border border-dashed border-gray-300 bg-white px-4 py-6 text-center text-sm text-gray-500 dark:border-gray-700 dark:bg-gray-800 dark:text-gray-400"
                {
                    "No credit cards found. Add a credit card "
                    a href=(create_page_url) class=(LINK_STYLE) { "here" }
                    "."
                }
            }
        }
    )
}

/// Renders the credit cards page showing all credit cards.
pub async fn get_credit_cards_page(
    State(state): State<CreditCardsPageState>,
) -> Result<Response, Error> {
    let local_offset = local_offset(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let credit_cards: Vec<CreditCardTableRow> = get_all_credit_cards(&connection)
        .inspect_err(|error| tracing::error!("could not get all credit cards: {error}"))?
        .into_iter()
        .map(CreditCardTableRow::from)
        .collect();

    Ok(credit_cards_view(&credit_cards, local_offset).into_response())
}
