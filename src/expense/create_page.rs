//! Defines the route handler for the page for recording an expense.

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
        funding_source_picker_view, load_funding_sources,
    },
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE,
        base, dollar_input_styles, loading_spinner,
    },
    navigation::NavBar,
};

/// The state needed for the new expense page.
#[derive(Debug, Clone)]
pub struct NewExpensePageState {
    /// The database connection for loading accounts and credit cards.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for NewExpensePageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the page for recording an expense.
pub async fn get_new_expense_page(
    State(state): State<NewExpensePageState>,
) -> Result<Response, Error> {
    let sources = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        load_funding_sources(&connection).inspect_err(|error| {
            tracing::error!("Failed to load funding sources for new expense page: {error}")
        })?
    };

    let has_sources = !sources.is_empty();
    let selector = build_selector(sources, f64::NAN, None);

    Ok(new_expense_view(&selector, has_sources).into_response())
}

fn new_expense_view(selector: &FundingSourceSelector, has_sources: bool) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_EXPENSE_VIEW).into_html();
    let spinner = loading_spinner();
    let picker_target = format!("#{FUNDING_SOURCE_PICKER_ID}");

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-post=(endpoints::EXPENSES_API)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "New Expense" }

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
                            hx-get=(endpoints::FUNDING_SOURCE_PICKER)
                            hx-trigger="input changed delay:300ms"
                            hx-target=(picker_target)
                            hx-swap="outerHTML"
                            hx-include="[name='source']:checked"
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

                @if has_sources {
                    (funding_source_picker_view(selector, PickerPurpose::Expense))
                } @else {
                    p id=(FUNDING_SOURCE_PICKER_ID) class="text-sm text-gray-500 dark:text-gray-400"
                    {
                        "Add an "
                        a href=(endpoints::NEW_ACCOUNT_VIEW) class=(LINK_STYLE) { "account" }
                        " or a "
                        a href=(endpoints::NEW_CREDIT_CARD_VIEW) class=(LINK_STYLE) { "credit card" }
                        " to pay for expenses with."
                    }
                }

                button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                {
                    span id="indicator" class="inline htmx-indicator" { (spinner) }
                    " Record Expense"
                }
            }
        }
    };

    base("New Expense", &[dollar_input_styles()], &content)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use rusqlite::Connection;
    use scraper::Selector;

    use crate::{
        account::{NewAccount, create_account},
        db::initialize,
        endpoints,
        expense::get_new_expense_page,
        funding_source::FUNDING_SOURCE_PICKER_ID,
        test_utils::{
            assert_content_type, assert_form_input, assert_form_submit_button_with_text,
            assert_hx_endpoint, assert_status_ok, assert_valid_html, checked_radio_value,
            must_get_form, parse_html_document, radio_values,
        },
    };

    use super::NewExpensePageState;

    fn get_test_state() -> NewExpensePageState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        NewExpensePageState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn renders_form_with_picker() {
        let state = get_test_state();
        for (name, balance) in [("Everyday", 20.0), ("Savings", 900.0)] {
            create_account(
                &NewAccount {
                    name: name.to_owned(),
                    balance,
                },
                &state.db_connection.lock().unwrap(),
            )
            .unwrap();
        }

        let response = get_new_expense_page(State(state)).await.unwrap();

        assert_status_ok(&response);
        assert_content_type(&response, "text/html; charset=utf-8");
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::EXPENSES_API, "hx-post");
        assert_form_input(&form, "amount", "number");
        assert_form_submit_button_with_text(&form, "Record Expense");
        assert_eq!(radio_values(&html), vec!["account-1", "account-2"]);
        assert_eq!(checked_radio_value(&html), Some("account-1".to_owned()));
    }

    #[tokio::test]
    async fn amount_input_refreshes_picker() {
        let response = get_new_expense_page(State(get_test_state())).await.unwrap();

        let html = parse_html_document(response).await;
        let amount_input = html
            .select(&Selector::parse("input[name='amount']").unwrap())
            .next()
            .expect("could not find amount input");
        let target = format!("#{FUNDING_SOURCE_PICKER_ID}");
        assert_eq!(
            amount_input.attr("hx-get"),
            Some(endpoints::FUNDING_SOURCE_PICKER)
        );
        assert_eq!(amount_input.attr("hx-target"), Some(target.as_str()));
        assert_eq!(amount_input.attr("hx-swap"), Some("outerHTML"));
    }

    #[tokio::test]
    async fn links_to_create_pages_without_sources() {
        let response = get_new_expense_page(State(get_test_state())).await.unwrap();

        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert!(radio_values(&html).is_empty());
        let links: Vec<&str> = html
            .select(&Selector::parse("form p a").unwrap())
            .filter_map(|link| link.attr("href"))
            .collect();
        assert_eq!(
            links,
            vec![endpoints::NEW_ACCOUNT_VIEW, endpoints::NEW_CREDIT_CARD_VIEW]
        );
    }
}
