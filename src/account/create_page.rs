//! Defines the route handler for the page for creating an account.

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

use crate::{
    endpoints,
    funding_source::{MAX_NAME_LENGTH, MIN_NAME_LENGTH},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        dollar_input_styles,
    },
    navigation::NavBar,
};

/// Renders the page for creating an account.
pub async fn get_create_account_page() -> Response {
    create_account_view().into_response()
}

fn create_account_view() -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_ACCOUNT_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-post=(endpoints::ACCOUNTS_API)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "New Account" }

                div
                {
                    label for="name" class=(FORM_LABEL_STYLE) { "Name" }

                    input
                        id="name"
                        type="text"
                        name="name"
                        placeholder="Everyday"
                        minlength=(MIN_NAME_LENGTH)
                        maxlength=(MAX_NAME_LENGTH)
                        required
                        autofocus
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="balance" class=(FORM_LABEL_STYLE) { "Balance" }

                    div class="input-wrapper w-full"
                    {
                        input
                            id="balance"
                            type="number"
                            name="balance"
                            step="0.01"
                            min="0"
                            placeholder="0.00"
                            required
                            class=(FORM_TEXT_INPUT_STYLE);
                    }
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create Account" }
            }
        }
    };

    base("Create Account", &[dollar_input_styles()], &content)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::{
        account::get_create_account_page,
        endpoints,
        test_utils::{
            assert_content_type, assert_form_input, assert_form_submit_button_with_text,
            assert_hx_endpoint, assert_valid_html, must_get_form, parse_html_document,
        },
    };

    #[tokio::test]
    async fn render_page() {
        let response = get_create_account_page().await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_content_type(&response, "text/html; charset=utf-8");

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::ACCOUNTS_API, "hx-post");
        assert_form_input(&form, "name", "text");
        assert_form_input(&form, "balance", "number");
        assert_form_submit_button_with_text(&form, "Create Account");
    }
}
