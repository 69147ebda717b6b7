//! Defines the route handler for the page for paying off a credit card.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    credit_card::{CreditCard, CreditCardId, get_credit_card},
    endpoints::{self, format_endpoint},
    funding_source::{
        FUNDING_SOURCE_PICKER_ID, FundingSourceId, FundingSourceSelector, PickerPurpose,
        build_selector, candidate_sources, funding_source_picker_view, load_funding_sources,
    },
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        dollar_input_styles, format_currency, loading_spinner,
    },
    internal_server_error::InternalServerError,
    navigation::NavBar,
    not_found::NotFoundError,
};

/// The state needed for the credit card payment page.
#[derive(Debug, Clone)]
pub struct CardPaymentPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CardPaymentPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The card and the accounts that can pay off everything owed on it.
fn load_page_data(
    credit_card_id: CreditCardId,
    connection: &Connection,
) -> Result<(CreditCard, FundingSourceSelector), Error> {
    let credit_card = get_credit_card(credit_card_id, connection)?;
    let sources = load_funding_sources(connection)?;

    let accounts = candidate_sources(sources, PickerPurpose::CardPayment, None);
    let selector = build_selector(
        accounts,
        PickerPurpose::CardPayment.threshold(credit_card.current_balance),
        None,
    );

    Ok((credit_card, selector))
}

/// Renders the page for paying off a credit card from an account.
pub async fn get_card_payment_page(
    State(state): State<CardPaymentPageState>,
    Path(credit_card_id): Path<CreditCardId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return InternalServerError::default().into_response();
        }
    };

    match load_page_data(credit_card_id, &connection) {
        Ok((credit_card, selector)) => card_payment_view(&credit_card, &selector).into_response(),
        Err(Error::NotFound) => NotFoundError.into_response(),
        Err(error) => {
            tracing::error!("Failed to load payment page for credit card {credit_card_id}: {error}");
            InternalServerError::default().into_response()
        }
    }
}

fn card_payment_view(credit_card: &CreditCard, selector: &FundingSourceSelector) -> Markup {
    let page_url = format_endpoint(endpoints::CARD_PAYMENT_VIEW, credit_card.id);
    let nav_bar = NavBar::new(&page_url).into_html();
    let spinner = loading_spinner();
    let picker_target = format!("#{FUNDING_SOURCE_PICKER_ID}");
    let to_key = FundingSourceId::CreditCard(credit_card.id).to_string();
    let owed = credit_card.current_balance;

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-post=(endpoints::TRANSFERS_API)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "Pay " (credit_card.name) }

                p id="amount-owing" class="text-sm text-gray-500 dark:text-gray-400"
                {
                    "Amount owing: " (format_currency(owed))
                }

                input type="hidden" name="to" value=(to_key);

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
                            max=(owed)
                            value=[(owed > 0.0).then_some(owed)]
                            placeholder="0.00"
                            required
                            autofocus
                            hx-get=(endpoints::FUNDING_SOURCE_PICKER)
                            hx-trigger="input changed delay:300ms"
                            hx-target=(picker_target)
                            hx-swap="outerHTML"
                            hx-vals=r#"{"purpose": "card_payment"}"#
                            hx-include="[name='from']:checked"
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

                (funding_source_picker_view(selector, PickerPurpose::CardPayment))

                button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                {
                    span id="indicator" class="inline htmx-indicator" { (spinner) }
                    " Make Payment"
                }
            }
        }
    };

    base("Pay Credit Card", &[dollar_input_styles()], &content)
}
