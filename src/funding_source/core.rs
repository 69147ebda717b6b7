//! The common shape that accounts and credit cards take when choosing how to pay for an expense.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{
    Error,
    account::{Account, AccountId},
    credit_card::{CreditCard, CreditCardId},
};

/// Milliseconds since the Unix epoch.
pub type Timestamp = i64;

/// The fewest characters an account or credit card name may have.
pub const MIN_NAME_LENGTH: usize = 3;
/// The most characters an account or credit card name may have.
pub const MAX_NAME_LENGTH: usize = 150;

/// Check the name given to an account or credit card.
///
/// Leading and trailing whitespace is not counted.
///
/// # Errors
/// Returns [Error::EmptyName] for a blank name and [Error::InvalidNameLength]
/// if the name is not between [MIN_NAME_LENGTH] and [MAX_NAME_LENGTH] characters.
pub fn validate_name(name: &str) -> Result<(), Error> {
    let name = name.trim();

    if name.is_empty() {
        return Err(Error::EmptyName);
    }

    let length = name.chars().count();

    if !(MIN_NAME_LENGTH..=MAX_NAME_LENGTH).contains(&length) {
        return Err(Error::InvalidNameLength(length));
    }

    Ok(())
}

/// Whether a funding source spends money the user has or money they borrow.
///
/// The declaration order is the order used when ranking sources that have
/// not been used recently or often: debit accounts come first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FundingSourceKind {
    /// A bank account.
    DebitAccount,
    /// The unused credit of a credit card.
    CreditLine,
}

/// Identifies a funding source by the table it lives in and its row id.
///
/// The string form, e.g. `account-1` or `credit_card-2`, is used in HTML forms
/// and query strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FundingSourceId {
    /// A row in the account table.
    Account(AccountId),
    /// A row in the credit card table.
    CreditCard(CreditCardId),
}

const ACCOUNT_PREFIX: &str = "account-";
const CREDIT_CARD_PREFIX: &str = "credit_card-";

impl FundingSourceId {
    /// The kind of source this id refers to.
    pub fn kind(&self) -> FundingSourceKind {
        match self {
            FundingSourceId::Account(_) => FundingSourceKind::DebitAccount,
            FundingSourceId::CreditCard(_) => FundingSourceKind::CreditLine,
        }
    }
}

impl Display for FundingSourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FundingSourceId::Account(id) => write!(f, "{ACCOUNT_PREFIX}{id}"),
            FundingSourceId::CreditCard(id) => write!(f, "{CREDIT_CARD_PREFIX}{id}"),
        }
    }
}

impl FromStr for FundingSourceId {
    type Err = Error;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let parse_id = |id: &str| {
            id.parse::<i64>()
                .map_err(|_| Error::InvalidFundingSourceKey(key.to_owned()))
        };

        if let Some(id) = key.strip_prefix(ACCOUNT_PREFIX) {
            parse_id(id).map(FundingSourceId::Account)
        } else if let Some(id) = key.strip_prefix(CREDIT_CARD_PREFIX) {
            parse_id(id).map(FundingSourceId::CreditCard)
        } else {
            Err(Error::InvalidFundingSourceKey(key.to_owned()))
        }
    }
}

impl Serialize for FundingSourceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FundingSourceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;

        key.parse().map_err(serde::de::Error::custom)
    }
}

/// An account or credit card, reduced to the fields needed to decide which
/// one should pay for an expense.
#[derive(Debug, Clone, PartialEq)]
pub struct FundingSource {
    /// Which account or credit card this is.
    pub id: FundingSourceId,
    /// The name shown to the user.
    pub name: String,
    /// How much money the source can pay with.
    ///
    /// For a credit card this is the credit limit minus the current balance.
    pub available_balance: f64,
    /// When the source last paid for an expense, if ever.
    pub last_used_at: Option<Timestamp>,
    /// How many expenses the source has paid for.
    pub usage_count: u32,
}

impl FundingSource {
    /// Create a funding source.
    ///
    /// # Errors
    /// Returns [Error::EmptyName] if `name` is empty or only whitespace, and
    /// [Error::InvalidAmount] if `available_balance` is NaN or infinite.
    pub fn new(
        id: FundingSourceId,
        name: &str,
        available_balance: f64,
        last_used_at: Option<Timestamp>,
        usage_count: u32,
    ) -> Result<Self, Error> {
        if name.trim().is_empty() {
            return Err(Error::EmptyName);
        }

        if !available_balance.is_finite() {
            return Err(Error::InvalidAmount(available_balance));
        }

        Ok(Self {
            id,
            name: name.to_owned(),
            available_balance,
            last_used_at,
            usage_count,
        })
    }

    /// Whether this is a debit account or a credit line.
    pub fn kind(&self) -> FundingSourceKind {
        self.id.kind()
    }
}

impl TryFrom<&Account> for FundingSource {
    type Error = Error;

    fn try_from(account: &Account) -> Result<Self, Self::Error> {
        Self::new(
            FundingSourceId::Account(account.id),
            &account.name,
            account.balance,
            account.last_used_at,
            account.usage_count,
        )
    }
}

impl TryFrom<&CreditCard> for FundingSource {
    type Error = Error;

    fn try_from(credit_card: &CreditCard) -> Result<Self, Self::Error> {
        Self::new(
            FundingSourceId::CreditCard(credit_card.id),
            &credit_card.name,
            credit_card.available_credit(),
            credit_card.last_used_at,
            credit_card.usage_count,
        )
    }
}

/// Normalize accounts and credit cards into one list of funding sources.
///
/// Accounts come first, then credit cards, each in the order given.
///
/// # Errors
/// Returns the error from [FundingSource::new] for the first account or card
/// that is not a valid funding source, e.g. one whose balance is NaN.
pub fn combine_sources(
    accounts: &[Account],
    credit_cards: &[CreditCard],
) -> Result<Vec<FundingSource>, Error> {
    accounts
        .iter()
        .map(FundingSource::try_from)
        .chain(credit_cards.iter().map(FundingSource::try_from))
        .collect()
}
