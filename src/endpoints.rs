//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/accounts/{account_id}', use [format_endpoint].

/// The root route which redirects to the new expense page.
pub const ROOT: &str = "/";
/// The page for listing bank accounts.
pub const ACCOUNTS_VIEW: &str = "/accounts";
/// The page for creating a new bank account.
pub const NEW_ACCOUNT_VIEW: &str = "/accounts/new";
/// The page for editing an existing bank account.
pub const EDIT_ACCOUNT_VIEW: &str = "/accounts/{account_id}/edit";
/// The page for listing credit cards.
pub const CREDIT_CARDS_VIEW: &str = "/credit_cards";
/// The page for creating a new credit card.
pub const NEW_CREDIT_CARD_VIEW: &str = "/credit_cards/new";
/// The page for editing an existing credit card.
pub const EDIT_CREDIT_CARD_VIEW: &str = "/credit_cards/{credit_card_id}/edit";
/// The page for listing expenses.
pub const EXPENSES_VIEW: &str = "/expenses";
/// The page for recording a new expense.
pub const NEW_EXPENSE_VIEW: &str = "/expenses/new";
/// The page for listing incomes.
pub const INCOMES_VIEW: &str = "/incomes";
/// The page for recording a new income.
pub const NEW_INCOME_VIEW: &str = "/incomes/new";
/// The page for listing transfers and credit card payments.
pub const TRANSFERS_VIEW: &str = "/transfers";
/// The page for moving money out of an account into another account.
pub const NEW_TRANSFER_VIEW: &str = "/accounts/{account_id}/transfer";
/// The page for paying off a credit card from an account.
pub const CARD_PAYMENT_VIEW: &str = "/credit_cards/{credit_card_id}/payment";
/// The HTML fragment for choosing which account or credit card pays for an expense.
pub const FUNDING_SOURCE_PICKER: &str = "/funding_sources/picker";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route to request a cup of coffee (experimental).
pub const COFFEE: &str = "/api/coffee";
/// The route to create a bank account.
pub const ACCOUNTS_API: &str = "/api/accounts";
/// The route to update or delete a bank account.
pub const ACCOUNT: &str = "/api/accounts/{account_id}";
/// The route to create a credit card.
pub const CREDIT_CARDS_API: &str = "/api/credit_cards";
/// The route to update or delete a credit card.
pub const CREDIT_CARD: &str = "/api/credit_cards/{credit_card_id}";
/// The route to record an expense.
pub const EXPENSES_API: &str = "/api/expenses";
/// The route to roll back an expense.
pub const EXPENSE: &str = "/api/expenses/{expense_id}";
/// The route to record an income.
pub const INCOMES_API: &str = "/api/incomes";
/// The route to roll back an income.
pub const INCOME: &str = "/api/incomes/{income_id}";
/// The route to record a transfer or a credit card payment.
pub const TRANSFERS_API: &str = "/api/transfers";
/// The route to roll back a transfer or a credit card payment.
pub const TRANSFER: &str = "/api/transfers/{transfer_id}";
/// The route for getting the ranked funding sources as JSON.
pub const FUNDING_SOURCES_API: &str = "/api/funding_sources";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/users/{user_id}', '{user_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::ROOT);
        assert_endpoint_is_valid_uri(endpoints::ACCOUNTS_VIEW);
        assert_endpoint_is_valid_uri(endpoints::NEW_ACCOUNT_VIEW);
        assert_endpoint_is_valid_uri(endpoints::EDIT_ACCOUNT_VIEW);
        assert_endpoint_is_valid_uri(endpoints::CREDIT_CARDS_VIEW);
        assert_endpoint_is_valid_uri(endpoints::NEW_CREDIT_CARD_VIEW);
        assert_endpoint_is_valid_uri(endpoints::EDIT_CREDIT_CARD_VIEW);
        assert_endpoint_is_valid_uri(endpoints::EXPENSES_VIEW);
        assert_endpoint_is_valid_uri(endpoints::NEW_EXPENSE_VIEW);
        assert_endpoint_is_valid_uri(endpoints::INCOMES_VIEW);
        assert_endpoint_is_valid_uri(endpoints::NEW_INCOME_VIEW);
        assert_endpoint_is_valid_uri(endpoints::TRANSFERS_VIEW);
        assert_endpoint_is_valid_uri(endpoints::NEW_TRANSFER_VIEW);
        assert_endpoint_is_valid_uri(endpoints::CARD_PAYMENT_VIEW);
        assert_endpoint_is_valid_uri(endpoints::FUNDING_SOURCE_PICKER);
        assert_endpoint_is_valid_uri(endpoints::INTERNAL_ERROR_VIEW);
        assert_endpoint_is_valid_uri(endpoints::STATIC);

        assert_endpoint_is_valid_uri(endpoints::COFFEE);
        assert_endpoint_is_valid_uri(endpoints::ACCOUNTS_API);
        assert_endpoint_is_valid_uri(endpoints::ACCOUNT);
        assert_endpoint_is_valid_uri(endpoints::CREDIT_CARDS_API);
        assert_endpoint_is_valid_uri(endpoints::CREDIT_CARD);
        assert_endpoint_is_valid_uri(endpoints::EXPENSES_API);
        assert_endpoint_is_valid_uri(endpoints::EXPENSE);
        assert_endpoint_is_valid_uri(endpoints::INCOMES_API);
        assert_endpoint_is_valid_uri(endpoints::INCOME);
        assert_endpoint_is_valid_uri(endpoints::TRANSFERS_API);
        assert_endpoint_is_valid_uri(endpoints::TRANSFER);
        assert_endpoint_is_valid_uri(endpoints::FUNDING_SOURCES_API);
    }

    #[test]
    fn produces_valid_uri() {
        let formatted_path = format_endpoint("/hello/{world_id}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());

        // Parameter with single word should also work.
        let formatted_path = format_endpoint("/hello/{world}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        let formatted_path = format_endpoint("/hello/world", 1);

        assert_eq!(formatted_path, "/hello/world");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn parameter_in_middle() {
        let formatted_path = format_endpoint("/hello/{world}/bye", 1);

        assert_eq!(formatted_path, "/hello/1/bye");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }
}
