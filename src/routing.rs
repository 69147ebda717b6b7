//! Application router configuration.

use axum::{
    Router,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{delete, get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    account::{
        create_account_endpoint, delete_account_endpoint, edit_account_endpoint,
        get_accounts_page, get_create_account_page, get_edit_account_page,
    },
    credit_card::{
        create_credit_card_endpoint, delete_credit_card_endpoint, edit_credit_card_endpoint,
        get_create_credit_card_page, get_credit_cards_page, get_edit_credit_card_page,
    },
    endpoints,
    expense::{
        create_expense_endpoint, delete_expense_endpoint, get_expenses_page, get_new_expense_page,
    },
    funding_source::{get_funding_source_picker, get_ranked_funding_sources},
    income::{
        create_income_endpoint, delete_income_endpoint, get_incomes_page, get_new_income_page,
    },
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    transfer::{
        create_transfer_endpoint, delete_transfer_endpoint, get_card_payment_page,
        get_new_transfer_page, get_transfers_page,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let view_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::ACCOUNTS_VIEW, get(get_accounts_page))
        .route(endpoints::NEW_ACCOUNT_VIEW, get(get_create_account_page))
        .route(endpoints::EDIT_ACCOUNT_VIEW, get(get_edit_account_page))
        .route(endpoints::CREDIT_CARDS_VIEW, get(get_credit_cards_page))
        .route(
            endpoints::NEW_CREDIT_CARD_VIEW,
            get(get_create_credit_card_page),
        )
        .route(
            endpoints::EDIT_CREDIT_CARD_VIEW,
            get(get_edit_credit_card_page),
        )
        .route(endpoints::EXPENSES_VIEW, get(get_expenses_page))
        .route(endpoints::NEW_EXPENSE_VIEW, get(get_new_expense_page))
        .route(endpoints::INCOMES_VIEW, get(get_incomes_page))
        .route(endpoints::NEW_INCOME_VIEW, get(get_new_income_page))
        .route(endpoints::TRANSFERS_VIEW, get(get_transfers_page))
        .route(endpoints::NEW_TRANSFER_VIEW, get(get_new_transfer_page))
        .route(endpoints::CARD_PAYMENT_VIEW, get(get_card_payment_page))
        .route(
            endpoints::FUNDING_SOURCE_PICKER,
            get(get_funding_source_picker),
        )
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let api_routes = Router::new()
        .route(endpoints::COFFEE, get(get_coffee))
        .route(endpoints::ACCOUNTS_API, post(create_account_endpoint))
        .route(
            endpoints::ACCOUNT,
            put(edit_account_endpoint).delete(delete_account_endpoint),
        )
        .route(endpoints::CREDIT_CARDS_API, post(create_credit_card_endpoint))
        .route(
            endpoints::CREDIT_CARD,
            put(edit_credit_card_endpoint).delete(delete_credit_card_endpoint),
        )
        .route(endpoints::EXPENSES_API, post(create_expense_endpoint))
        .route(endpoints::EXPENSE, delete(delete_expense_endpoint))
        .route(endpoints::INCOMES_API, post(create_income_endpoint))
        .route(endpoints::INCOME, delete(delete_income_endpoint))
        .route(endpoints::TRANSFERS_API, post(create_transfer_endpoint))
        .route(endpoints::TRANSFER, delete(delete_transfer_endpoint))
        .route(
            endpoints::FUNDING_SOURCES_API,
            get(get_ranked_funding_sources),
        );

    view_routes
        .merge(api_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// Attempt to get a cup of coffee from the server.
async fn get_coffee() -> Response {
    (StatusCode::IM_A_TEAPOT, Html("I'm a teapot")).into_response()
}

/// The root path '/' redirects to the page for recording an expense.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::NEW_EXPENSE_VIEW)
}
