//! Alert system for displaying success and error messages to users.
//!
//! Alerts are rendered as HTML fragments that HTMX swaps into the
//! `#alert-container` element of the base page.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

/// An alert message with optional details.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// A success message with extra details.
    Success { message: String, details: String },
    /// A success message without details.
    SuccessSimple { message: String },
    /// An error message with extra details.
    Error { message: String, details: String },
}

impl Alert {
    pub fn into_html(self) -> Markup {
        let (container_style, message, details) = match self {
            Alert::Success { message, details } => (SUCCESS_STYLE, message, details),
            Alert::SuccessSimple { message } => (SUCCESS_STYLE, message, String::new()),
            Alert::Error { message, details } => (ERROR_STYLE, message, details),
        };

        html!(
            div
                role="alert"
                class=(container_style)
            {
                div class="flex items-start justify-between gap-4"
                {
                    div
                    {
                        p class="font-semibold" { (message) }

                        @if !details.is_empty() {
                            p class="mt-1 text-sm" { (details) }
                        }
                    }

                    button
                        type="button"
                        aria-label="Dismiss"
                        class="text-lg leading-none"
                        onclick="this.closest('[role=alert]').remove()"
                    {
                        "×"
                    }
                }
            }
        )
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        (StatusCode::OK, self.into_html()).into_response()
    }
}

const SUCCESS_STYLE: &str = "p-4 rounded border text-green-800 bg-green-50 border-green-300 \
    dark:bg-gray-800 dark:text-green-400 dark:border-green-800";

const ERROR_STYLE: &str = "p-4 rounded border text-red-800 bg-red-50 border-red-300 \
    dark:bg-gray-800 dark:text-red-400 dark:border-red-800";
