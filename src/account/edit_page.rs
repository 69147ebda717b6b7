//! Defines the route handler for the page for editing an account.

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
    funding_source::{MAX_NAME_LENGTH, MIN_NAME_LENGTH},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        format_currency,
    },
    internal_server_error::InternalServerError,
    navigation::NavBar,
    not_found::NotFoundError,
};

/// The state needed for the edit account page.
#[derive(Debug, Clone)]
pub struct EditAccountPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditAccountPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the page for editing an account.
pub async fn get_edit_account_page(
    State(state): State<EditAccountPageState>,
    Path(account_id): Path<AccountId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return InternalServerError::default().into_response();
        }
    };

    match get_account(account_id, &connection) {
        Ok(account) => edit_account_view(&account).into_response(),
        Err(Error::NotFound) => NotFoundError.into_response(),
        Err(error) => {
            tracing::error!("Failed to retrieve account {account_id}: {error}");
            InternalServerError::default().into_response()
        }
    }
}

fn edit_account_view(account: &Account) -> Markup {
    let edit_page_url = format_endpoint(endpoints::EDIT_ACCOUNT_VIEW, account.id);
    let update_url = format_endpoint(endpoints::ACCOUNT, account.id);
    let nav_bar = NavBar::new(&edit_page_url).into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-put=(update_url)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "Edit Account" }

                div
                {
                    label for="name" class=(FORM_LABEL_STYLE) { "Name" }

                    input
                        id="name"
                        type="text"
                        name="name"
                        value=(account.name)
                        minlength=(MIN_NAME_LENGTH)
                        maxlength=(MAX_NAME_LENGTH)
                        required
                        autofocus
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                p id="balance" class="text-sm text-gray-500 dark:text-gray-400"
                {
                    "Balance: " (format_currency(account.balance))
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Update Account" }
            }
        }
    };

    base("Edit Account", &[], &content)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use scraper::Selector;

    use crate::{
        account::{NewAccount, create_account, get_edit_account_page},
        db::initialize,
        endpoints::{self, format_endpoint},
        test_utils::{
            assert_form_input_with_value, assert_form_submit_button_with_text, assert_hx_endpoint,
            assert_valid_html, must_get_form, parse_html_document,
        },
    };

    use super::EditAccountPageState;

    fn get_test_state() -> EditAccountPageState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        EditAccountPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn renders_form_with_account_values() {
        let state = get_test_state();
        let account = create_account(
            &NewAccount {
                name: "Everyday".to_owned(),
                balance: 12.5,
            },
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        let response = get_edit_account_page(State(state), Path(account.id)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(
            &form,
            &format_endpoint(endpoints::ACCOUNT, account.id),
            "hx-put",
        );
        assert_form_input_with_value(&form, "name", "text", "Everyday");
        assert_form_submit_button_with_text(&form, "Update Account");
        assert!(
            form.select(&Selector::parse("input[name=balance]").unwrap())
                .next()
                .is_none(),
            "the balance should not be editable"
        );
        let balance = html
            .select(&Selector::parse("#balance").unwrap())
            .next()
            .expect("want the current balance shown");
        assert_eq!(balance.text().collect::<String>().trim(), "Balance: $12.50");
    }

    #[tokio::test]
    async fn missing_account_renders_404() {
        let response = get_edit_account_page(State(get_test_state()), Path(42)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
