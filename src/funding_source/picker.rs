//! Route handlers that rank the funding sources for the amount a user is entering.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    account::{AccountId, get_all_accounts},
    credit_card::get_all_credit_cards,
    funding_source::{
        FundingSource, FundingSourceId, FundingSourceKind, FundingSourceSelector, Timestamp,
        combine_sources, rank,
    },
    html::{
        FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE, FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE,
        format_currency,
    },
};

/// The id of the element that holds the funding source picker.
pub const FUNDING_SOURCE_PICKER_ID: &str = "funding-source-picker";

/// Load every account and credit card as funding sources.
///
/// Accounts come first, then credit cards, each ordered by name.
///
/// # Errors
/// Returns an error if there is an SQL error or a stored name is no longer valid.
pub fn load_funding_sources(connection: &Connection) -> Result<Vec<FundingSource>, Error> {
    let accounts = get_all_accounts(connection)?;
    let credit_cards = get_all_credit_cards(connection)?;

    combine_sources(&accounts, &credit_cards)
}

/// What the money chosen in the picker is for.
///
/// Each purpose decides which sources are offered and the threshold they
/// are ranked against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickerPurpose {
    /// Paying for an expense with an account or credit card.
    #[default]
    Expense,
    /// Depositing an income into an account.
    Income,
    /// Moving money into another account.
    Transfer,
    /// Paying off a credit card from an account.
    CardPayment,
}

impl PickerPurpose {
    /// The threshold the sources are ranked against for `amount`.
    ///
    /// Receiving money needs no balance, so incomes rank against zero and
    /// transfers against minus one, which [rank] treats as zero.
    pub fn threshold(self, amount: f64) -> f64 {
        match self {
            PickerPurpose::Expense | PickerPurpose::CardPayment => amount,
            PickerPurpose::Income => 0.0,
            PickerPurpose::Transfer => -1.0,
        }
    }

    /// Whether sources of `kind` can be offered.
    pub fn accepts(self, kind: FundingSourceKind) -> bool {
        match self {
            PickerPurpose::Expense => true,
            _ => kind == FundingSourceKind::DebitAccount,
        }
    }

    /// The name of the radio inputs, which is also the form field the choice is sent as.
    pub fn input_name(self) -> &'static str {
        match self {
            PickerPurpose::Expense => "source",
            PickerPurpose::Income => "account",
            PickerPurpose::Transfer => "to",
            PickerPurpose::CardPayment => "from",
        }
    }

    fn legend(self) -> &'static str {
        match self {
            PickerPurpose::Expense => "Pay with",
            PickerPurpose::Income => "Deposit into",
            PickerPurpose::Transfer => "Transfer to",
            PickerPurpose::CardPayment => "Pay from",
        }
    }

    fn empty_message(self) -> &'static str {
        match self {
            PickerPurpose::Expense => "No account or credit card has enough money for this amount.",
            PickerPurpose::Income => "No account can receive this income.",
            PickerPurpose::Transfer => "No other account can receive this transfer.",
            PickerPurpose::CardPayment => "No account has enough money for this payment.",
        }
    }
}

/// Keep the sources that `purpose` accepts, leaving out the `excluded` account.
pub fn candidate_sources(
    sources: Vec<FundingSource>,
    purpose: PickerPurpose,
    excluded: Option<AccountId>,
) -> Vec<FundingSource> {
    sources
        .into_iter()
        .filter(|source| purpose.accepts(source.kind()))
        .filter(|source| excluded.is_none_or(|id| source.id != FundingSourceId::Account(id)))
        .collect()
}

/// The state needed to rank funding sources.
#[derive(Debug, Clone)]
pub struct FundingSourcePickerState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for FundingSourcePickerState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The query string for the funding source endpoints.
///
/// The values are kept as text so that a half typed amount such as "1." or
/// an empty input does not reject the request.
#[derive(Debug, Default, Deserialize)]
pub struct PickerQuery {
    /// The amount the sources must cover.
    pub amount: Option<String>,
    /// The key of the previously selected source, e.g. "account-1".
    ///
    /// The forms name their radio buttons after the purpose, see
    /// [PickerPurpose::input_name].
    #[serde(alias = "source", alias = "account", alias = "to", alias = "from")]
    pub selected: Option<String>,
    /// What the chosen source is for, an expense when missing.
    #[serde(default)]
    pub purpose: PickerPurpose,
    /// An account that must not be offered, e.g. the account a transfer comes from.
    pub exclude: Option<AccountId>,
}

impl PickerQuery {
    /// The amount as a number, or NaN if it is missing or not a number.
    fn amount(&self) -> f64 {
        self.amount
            .as_deref()
            .and_then(|amount| amount.trim().parse().ok())
            .unwrap_or(f64::NAN)
    }

    fn selected(&self) -> Option<FundingSourceId> {
        let key = self.selected.as_deref()?.trim();

        if key.is_empty() {
            return None;
        }

        key.parse()
            .inspect_err(|error| tracing::debug!("ignoring selected funding source: {error}"))
            .ok()
    }

    fn threshold(&self) -> f64 {
        self.purpose.threshold(self.amount())
    }
}

/// A ranked funding source as sent to API clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FundingSourceJson<'a> {
    id: FundingSourceId,
    kind: FundingSourceKind,
    display_name: &'a str,
    available_balance: f64,
    last_used_at: Option<Timestamp>,
    usage_count: u32,
}

impl<'a> From<&'a FundingSource> for FundingSourceJson<'a> {
    fn from(source: &'a FundingSource) -> Self {
        Self {
            id: source.id,
            kind: source.kind(),
            display_name: &source.name,
            available_balance: source.available_balance,
            last_used_at: source.last_used_at,
            usage_count: source.usage_count,
        }
    }
}

/// Get the funding sources that can cover `amount` as JSON, in ranked order.
pub async fn get_ranked_funding_sources(
    State(state): State<FundingSourcePickerState>,
    Query(query): Query<PickerQuery>,
) -> Result<Response, Error> {
    let sources = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        load_funding_sources(&connection)
            .inspect_err(|error| tracing::error!("could not load funding sources: {error}"))?
    };

    let candidates = candidate_sources(sources, query.purpose, query.exclude);
    let ranked = rank(&candidates, query.threshold());
    let body: Vec<FundingSourceJson> = ranked.iter().map(FundingSourceJson::from).collect();

    Ok(Json(body).into_response())
}

/// Render the funding source picker for the amount being entered.
///
/// The previously selected source stays selected while it can still cover
/// the amount.
pub async fn get_funding_source_picker(
    State(state): State<FundingSourcePickerState>,
    Query(query): Query<PickerQuery>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let sources = match load_funding_sources(&connection) {
        Ok(sources) => sources,
        Err(error) => {
            tracing::error!("could not load funding sources: {error}");
            return error.into_alert_response();
        }
    };

    let candidates = candidate_sources(sources, query.purpose, query.exclude);
    let selector = build_selector(candidates, query.threshold(), query.selected());

    funding_source_picker_view(&selector, query.purpose).into_response()
}

/// Create a selector for `amount` that starts from the user's previous choice.
pub fn build_selector(
    sources: Vec<FundingSource>,
    amount: f64,
    previous: Option<FundingSourceId>,
) -> FundingSourceSelector {
    let mut selector = FundingSourceSelector::new(sources, 0.0);

    if let Some(id) = previous {
        // The previous choice may have been deleted or emptied in the meantime.
        if let Err(error) = selector.select(id) {
            tracing::debug!("could not keep previous funding source: {error}");
        }
    }

    selector.set_amount(amount);

    selector
}

/// The radio buttons for choosing the account or credit card the money comes from or goes to.
pub fn funding_source_picker_view(
    selector: &FundingSourceSelector,
    purpose: PickerPurpose,
) -> Markup {
    let selected_id = selector.selected().map(|source| source.id);
    let mut options: Vec<&FundingSource> = selector.ranked().iter().collect();

    // A selection whose balance equals the amount is not ranked, but can still pay.
    if let Some(selected) = selector.selected() {
        if !options.iter().any(|source| source.id == selected.id) {
            options.push(selected);
        }
    }

    html!(
        div id=(FUNDING_SOURCE_PICKER_ID)
        {
            fieldset
            {
                legend class=(FORM_LABEL_STYLE) { (purpose.legend()) }

                @if options.is_empty() {
                    p class="text-sm text-gray-500 dark:text-gray-400"
                    {
                        (purpose.empty_message())
                    }
                } @else {
                    div class=(FORM_RADIO_GROUP_STYLE)
                    {
                        @for source in options {
                            @let key = source.id.to_string();
                            @let kind = match source.kind() {
                                FundingSourceKind::DebitAccount => "Account",
                                FundingSourceKind::CreditLine => "Credit card",
                            };

                            div class="flex items-center gap-3"
                            {
                                input
                                    type="radio"
                                    id=(key)
                                    name=(purpose.input_name())
                                    value=(key)
                                    checked[selected_id == Some(source.id)]
                                    required
                                    class=(FORM_RADIO_INPUT_STYLE);

                                label for=(key) class=(FORM_RADIO_LABEL_STYLE)
                                {
                                    span class="flex justify-between gap-4"
                                    {
                                        span { (source.name) }
                                        span class="tabular-nums" { (format_currency(source.available_balance)) }
                                    }
                                    span class="block text-xs font-normal opacity-75" { (kind) }
                                }
                            }
                        }
                    }
                }
            }
        }
    )
}
