//! Displays transfers and credit card payments, newest first.

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
    funding_source::FundingSourceId,
    html::{
        BUTTON_DELETE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, date_time_view, format_currency,
    },
    navigation::NavBar,
    timezone::local_offset,
    transfer::{TransferWithNames, get_transfers},
};

/// The state needed for the [get_transfers_page](crate::transfer::get_transfers_page) route handler.
#[derive(Debug, Clone)]
pub struct TransfersPageState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for TransfersPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

const DELETE_CONFIRM_MESSAGE: &str = "Are you sure you want to delete this transfer? \
    The money will be moved back to the account it came from.";

fn transfer_kind(to: FundingSourceId) -> &'static str {
    match to {
        FundingSourceId::Account(_) => "Transfer",
        FundingSourceId::CreditCard(_) => "Card payment",
    }
}

fn transfers_view(transfers: &[TransferWithNames], local_offset: UtcOffset) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSFERS_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Transfers" }
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
                                th scope="col" class=(TABLE_CELL_STYLE) { "Kind" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "From" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "To" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                                th scope="col" class="px-6 py-3 text-right" { "Amount" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for listed in transfers {
                                @let transfer = &listed.transfer;

                                tr class=(TABLE_ROW_STYLE)
                                {
                                    td class=(TABLE_CELL_STYLE)
                                    {
                                        (date_time_view(transfer.recorded_at.to_offset(local_offset)))
                                    }
                                    td class=(TABLE_CELL_STYLE) { (transfer_kind(transfer.to)) }
                                    td class=(TABLE_CELL_STYLE) { (listed.from_name) }
                                    td class=(TABLE_CELL_STYLE) { (listed.to_name) }
                                    td class=(TABLE_CELL_STYLE) { (transfer.description) }
                                    td class="px-6 py-4 text-right" { (format_currency(transfer.amount)) }
                                    td class=(TABLE_CELL_STYLE)
                                    {
                                        button
                                            hx-delete=(format_endpoint(endpoints::TRANSFER, transfer.id))
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

                            @if transfers.is_empty() {
                                tr
                                {
                                    td
                                        colspan="7"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No transfers yet. Move money from one of your "
                                        a href=(endpoints::ACCOUNTS_VIEW) class=(LINK_STYLE) { "accounts" }
                                        " or pay off one of your "
                                        a href=(endpoints::CREDIT_CARDS_VIEW) class=(LINK_STYLE) { "credit cards" }
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

    base("Transfers", &[], &content)
}

/// Renders the page listing all transfers and credit card payments.
pub async fn get_transfers_page(
    State(state): State<TransfersPageState>,
) -> Result<Response, Error> {
    let local_offset = local_offset(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transfers = get_transfers(&connection)
        .inspect_err(|error| tracing::error!("could not get transfers: {error}"))?;

    Ok(transfers_view(&transfers, local_offset).into_response())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use rusqlite::Connection;
    use scraper::Selector;
    use time::macros::datetime;

    use crate::{
        account::{NewAccount, create_account},
        credit_card::{NewCreditCard, create_credit_card},
        db::initialize,
        endpoints::{self, format_endpoint},
        funding_source::FundingSourceId,
        test_utils::{assert_status_ok, assert_valid_html, parse_html_document},
        transfer::{NewTransfer, get_transfers_page, record_transfer_at},
    };

    use super::TransfersPageState;

    fn get_test_state() -> TransfersPageState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        TransfersPageState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    #[tokio::test]
    async fn lists_transfers_and_payments() {
        let state = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            for (name, balance) in [("Everyday", 500.0), ("Savings", 0.0)] {
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
                    credit_limit: 1000.0,
                    current_balance: 200.0,
                    billing_day: 1,
                    payment_day: 20,
                },
                &connection,
            )
            .unwrap();
            for (to, recorded_at) in [
                (FundingSourceId::Account(2), datetime!(2025-03-01 09:00 UTC)),
                (FundingSourceId::CreditCard(1), datetime!(2025-03-02 09:00 UTC)),
            ] {
                record_transfer_at(
                    &NewTransfer {
                        amount: 100.0,
                        description: "Monthly".to_owned(),
                        from: 1,
                        to,
                    },
                    recorded_at,
                    &connection,
                )
                .unwrap();
            }
        }

        let response = get_transfers_page(State(state)).await.unwrap();

        assert_status_ok(&response);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let rows: Vec<Vec<String>> = html
            .select(&Selector::parse("table tbody tr").unwrap())
            .map(|row| {
                row.select(&Selector::parse("td").unwrap())
                    .take(4)
                    .map(|cell| cell.text().collect::<String>().trim().to_owned())
                    .collect()
            })
            .collect();
        assert_eq!(
            rows,
            vec![
                vec!["2025-03-02 09:00", "Card payment", "Everyday", "Visa"],
                vec!["2025-03-01 09:00", "Transfer", "Everyday", "Savings"],
            ]
        );
        let button = html
            .select(&Selector::parse("table button").unwrap())
            .next()
            .expect("could not find delete button");
        let want_url = format_endpoint(endpoints::TRANSFER, 2);
        assert_eq!(button.attr("hx-delete"), Some(want_url.as_str()));
    }

    #[tokio::test]
    async fn links_to_accounts_and_credit_cards_when_empty() {
        let response = get_transfers_page(State(get_test_state())).await.unwrap();

        let html = parse_html_document(response).await;
        let links: Vec<&str> = html
            .select(&Selector::parse("td[colspan='7'] a").unwrap())
            .filter_map(|link| link.attr("href"))
            .collect();
        assert_eq!(
            links,
            vec![endpoints::ACCOUNTS_VIEW, endpoints::CREDIT_CARDS_VIEW]
        );
    }
}
