//! Defines the route handler for the page for editing a credit card.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    credit_card::{CreditCard, CreditCardId, create_page::credit_card_form_fields, get_credit_card},
    endpoints::{self, format_endpoint},
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, dollar_input_styles},
    internal_server_error::InternalServerError,
    navigation::NavBar,
    not_found::NotFoundError,
};

/// The state needed for the edit credit card page.
#[derive(Debug, Clone)]
pub struct EditCreditCardPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditCreditCardPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the page for editing a credit card.
pub async fn get_edit_credit_card_page(
    State(state): State<EditCreditCardPageState>,
    Path(credit_card_id): Path<CreditCardId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return InternalServerError::default().into_response();
        }
    };

    match get_credit_card(credit_card_id, &connection) {
        Ok(credit_card) => edit_credit_card_view(&credit_card).into_response(),
        Err(Error::NotFound) => NotFoundError.into_response(),
        Err(error) => {
            tracing::error!("Failed to retrieve credit card {credit_card_id}: {error}");
            InternalServerError::default().into_response()
        }
    }
}

fn edit_credit_card_view(credit_card: &CreditCard) -> Markup {
    let edit_page_url = format_endpoint(endpoints::EDIT_CREDIT_CARD_VIEW, credit_card.id);
    let update_url = format_endpoint(endpoints::CREDIT_CARD, credit_card.id);
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
                h2 class="text-xl font-bold" { "Edit Credit Card" }

                (credit_card_form_fields(Some(credit_card)))

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Update Credit Card" }
            }
        }
    };

    base("Edit Credit Card", &[dollar_input_styles()], &content)
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
        credit_card::{NewCreditCard, create_credit_card, get_edit_credit_card_page},
        db::initialize,
        endpoints::{self, format_endpoint},
        test_utils::{
            assert_form_input_with_value, assert_form_submit_button_with_text, assert_hx_endpoint,
            assert_valid_html, must_get_form, parse_html_document,
        },
    };

    use super::EditCreditCardPageState;

    fn get_test_state() -> EditCreditCardPageState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        EditCreditCardPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn renders_form_with_credit_card_values() {
        let state = get_test_state();
        let credit_card = create_credit_card(
            &NewCreditCard {
                name: "Visa".to_owned(),
                credit_limit: 2500.0,
                current_balance: 99.5,
                billing_day: 3,
                payment_day: 24,
            },
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        let response = get_edit_credit_card_page(State(state), Path(credit_card.id)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(
            &form,
            &format_endpoint(endpoints::CREDIT_CARD, credit_card.id),
            "hx-put",
        );
        assert_form_input_with_value(&form, "name", "text", "Visa");
        assert_form_input_with_value(&form, "credit_limit", "number", "2500");
        assert_form_input_with_value(&form, "billing_day", "number", "3");
        assert_form_input_with_value(&form, "payment_day", "number", "24");
        assert_form_submit_button_with_text(&form, "Update Credit Card");
        assert!(
            form.select(&Selector::parse("input[name=current_balance]").unwrap())
                .next()
                .is_none(),
            "the amount owing should not be editable"
        );
        let owing = form
            .select(&Selector::parse("#current_balance").unwrap())
            .next()
            .expect("want the amount owing shown");
        assert_eq!(owing.text().collect::<String>().trim(), "Amount owing: $99.50");
    }

    #[tokio::test]
    async fn missing_credit_card_renders_404() {
        let response = get_edit_credit_card_page(State(get_test_state()), Path(42)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
