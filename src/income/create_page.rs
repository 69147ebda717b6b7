//! Defines the route handler for the page for recording an income.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    funding_source::{
        FUNDING_SOURCE_PICKER_ID, FundingSourceSelector, PickerPurpose, build_selector,
        candidate_sources, funding_source_picker_view, load_funding_sources,
    },
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE,
        base, dollar_input_styles, loading_spinner,
    },
    navigation::NavBar,
};

/// The state needed for the new income page.
#[derive(Debug, Clone)]
pub struct NewIncomePageState {
    /// The database connection for loading accounts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for NewIncomePageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the page for recording an income.
pub async fn get_new_income_page(
    State(state): State<NewIncomePageState>,
) -> Result<Response, Error> {
    let sources = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        load_funding_sources(&connection).inspect_err(|error| {
            tracing::error!("Failed to load accounts for new income page: {error}")
        })?
    };

    let accounts = candidate_sources(sources, PickerPurpose::Income, None);
    let has_accounts = !accounts.is_empty();
    let selector = build_selector(accounts, PickerPurpose::Income.threshold(f64::NAN), None);

    Ok(new_income_view(&selector, has_accounts).into_response())
}

fn new_income_view(selector: &FundingSourceSelector, has_accounts: bool) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_INCOME_VIEW).into_html();
    let spinner = loading_spinner();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-post=(endpoints::INCOMES_API)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "New Income" }

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
                        placeholder="Salary"
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                @if has_accounts {
                    (funding_source_picker_view(selector, PickerPurpose::Income))
                } @else {
                    p id=(FUNDING_SOURCE_PICKER_ID) class="text-sm text-gray-500 dark:text-gray-400"
                    {
                        "Add an "
                        a href=(endpoints::NEW_ACCOUNT_VIEW) class=(LINK_STYLE) { "account" }
                        " to deposit incomes into."
                    }
                }

                button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                {
                    span id="indicator" class="inline htmx-indicator" { (spinner) }
                    " Record Income"
                }
            }
        }
    };

    base("New Income", &[dollar_input_styles()], &content)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use rusqlite::Connection;
    use scraper::Selector;

    use crate::{
        account::{NewAccount, create_account},
        credit_card::{create_credit_card, new_test_credit_card},
        db::initialize,
        endpoints,
        income::get_new_income_page,
        test_utils::{
            assert_content_type, assert_form_input, assert_form_submit_button_with_text,
            assert_hx_endpoint, assert_status_ok, assert_valid_html, checked_radio_value,
            must_get_form, parse_html_document, radio_values,
        },
    };

    use super::NewIncomePageState;

    fn get_test_state() -> NewIncomePageState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        NewIncomePageState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn offers_accounts_but_not_credit_cards() {
        let state = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            for (name, balance) in [("Everyday", 20.0), ("Savings", 900.0)] {
                create_account(
                    &NewAccount {
                        name: name.to_owned(),
                        balance,
                    },
                    &connection,
                )
                .unwrap();
            }
            create_credit_card(&new_test_credit_card("Visa", 1000.0), &connection).unwrap();
        }

        let response = get_new_income_page(State(state)).await.unwrap();

        assert_status_ok(&response);
        assert_content_type(&response, "text/html; charset=utf-8");
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::INCOMES_API, "hx-post");
        assert_form_input(&form, "amount", "number");
        assert_form_submit_button_with_text(&form, "Record Income");
        assert_eq!(radio_values(&html), vec!["account-1", "account-2"]);
        assert_eq!(checked_radio_value(&html), Some("account-1".to_owned()));
    }

    #[tokio::test]
    async fn links_to_new_account_page_without_accounts() {
        let response = get_new_income_page(State(get_test_state())).await.unwrap();

        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert!(radio_values(&html).is_empty());
        let links: Vec<&str> = html
            .select(&Selector::parse("form p a").unwrap())
            .filter_map(|link| link.attr("href"))
            .collect();
        assert_eq!(links, vec![endpoints::NEW_ACCOUNT_VIEW]);
    }
}
