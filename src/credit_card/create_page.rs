//! Defines the route handler for the page for adding a credit card.

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

use crate::{
    credit_card::CreditCard,
    endpoints,
    funding_source::{MAX_NAME_LENGTH, MIN_NAME_LENGTH},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        dollar_input_styles, format_currency,
    },
    navigation::NavBar,
};

/// Renders the page for adding a credit card.
pub async fn get_create_credit_card_page() -> Response {
    create_credit_card_view().into_response()
}

fn create_credit_card_view() -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_CREDIT_CARD_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-post=(endpoints::CREDIT_CARDS_API)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "New Credit Card" }

                (credit_card_form_fields(None))

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add Credit Card" }
            }
        }
    };

    base("Add Credit Card", &[dollar_input_styles()], &content)
}

/// The inputs shared by the create and edit credit card forms, filled in
/// from `credit_card` when given.
///
/// The amount owing can only be entered when adding a card. An existing card
/// shows it as text instead.
pub(super) fn credit_card_form_fields(credit_card: Option<&CreditCard>) -> Markup {
    let name = credit_card.map(|card| card.name.as_str());
    let credit_limit = credit_card.map(|card| card.credit_limit);
    let billing_day = credit_card.map(|card| card.billing_day);
    let payment_day = credit_card.map(|card| card.payment_day);

    html! {
        div
        {
            label for="name" class=(FORM_LABEL_STYLE) { "Name" }

            input
                id="name"
                type="text"
                name="name"
                placeholder="Visa"
                value=[name]
                minlength=(MIN_NAME_LENGTH)
                maxlength=(MAX_NAME_LENGTH)
                required
                autofocus
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="credit_limit" class=(FORM_LABEL_STYLE) { "Credit Limit" }

            div class="input-wrapper w-full"
            {
                input
                    id="credit_limit"
                    type="number"
                    name="credit_limit"
                    step="0.01"
                    min="1"
                    placeholder="1000.00"
                    value=[credit_limit]
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }

        @match credit_card {
            Some(credit_card) => {
                p id="current_balance" class="text-sm text-gray-500 dark:text-gray-400"
                {
                    "Amount owing: " (format_currency(credit_card.current_balance))
                }
            }
            None => {
                div
                {
                    label for="current_balance" class=(FORM_LABEL_STYLE) { "Amount Owing" }

                    div class="input-wrapper w-full"
                    {
                        input
                            id="current_balance"
                            type="number"
                            name="current_balance"
                            step="0.01"
                            placeholder="0.00"
                            required
                            class=(FORM_TEXT_INPUT_STYLE);
                    }
                }
            }
        }

        div class="grid grid-cols-2 gap-4"
        {
            div
            {
                label for="billing_day" class=(FORM_LABEL_STYLE) { "Billing Day" }

                input
                    id="billing_day"
                    type="number"
                    name="billing_day"
                    min="1"
                    max="31"
                    step="1"
                    placeholder="1"
                    value=[billing_day]
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="payment_day" class=(FORM_LABEL_STYLE) { "Payment Day" }

                input
                    id="payment_day"
                    type="number"
                    name="payment_day"
                    min="1"
                    max="31"
                    step="1"
                    placeholder="20"
                    value=[payment_day]
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }
    }
}
