//! Credit cards and their storage.

use rusqlite::{Connection, Row, params};

use crate::{
    Error,
    database_id::DatabaseId,
    funding_source::{Timestamp, validate_name},
};

/// The database row id of a credit card.
pub type CreditCardId = DatabaseId;

/// A credit card that expenses can be charged to.
#[derive(Debug, Clone, PartialEq)]
pub struct CreditCard {
    /// The id for the credit card.
    pub id: CreditCardId,
    /// The name of the card, unique among credit cards.
    pub name: String,
    /// The most that can be owed on the card.
    pub credit_limit: f64,
    /// How much is currently owed on the card.
    pub current_balance: f64,
    /// The day of the month the statement is issued.
    pub billing_day: u8,
    /// The day of the month the statement must be paid by.
    pub payment_day: u8,
    /// When the card last paid for an expense, in milliseconds since the Unix epoch.
    pub last_used_at: Option<Timestamp>,
    /// How many expenses the card has paid for.
    pub usage_count: u32,
}

impl CreditCard {
    /// The credit that can still be spent, the limit minus the current balance.
    pub fn available_credit(&self) -> f64 {
        self.credit_limit - self.current_balance
    }
}

/// The fields needed to add a credit card.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCreditCard {
    /// The name of the card, 3 to 150 characters.
    pub name: String,
    /// The most that can be owed on the card, at least 1.
    pub credit_limit: f64,
    /// How much is owed on the card when it is added.
    pub current_balance: f64,
    /// The day of the month the statement is issued, 1 to 31.
    pub billing_day: u8,
    /// The day of the month the statement must be paid by, 1 to 31.
    pub payment_day: u8,
}

impl NewCreditCard {
    fn validate(&self) -> Result<(), Error> {
        validate_card_details(
            &self.name,
            self.credit_limit,
            self.billing_day,
            self.payment_day,
        )?;

        if !self.current_balance.is_finite() {
            return Err(Error::InvalidAmount(self.current_balance));
        }

        Ok(())
    }
}

/// The fields of a credit card that can be edited after it is added.
///
/// The amount owing is not one of them, it only moves through expenses and payments.
#[derive(Debug, Clone, PartialEq)]
pub struct CreditCardDetails {
    /// The name of the card, 3 to 150 characters.
    pub name: String,
    /// The most that can be owed on the card, at least 1.
    pub credit_limit: f64,
    /// The day of the month the statement is issued, 1 to 31.
    pub billing_day: u8,
    /// The day of the month the statement must be paid by, 1 to 31.
    pub payment_day: u8,
}

impl CreditCardDetails {
    fn validate(&self) -> Result<(), Error> {
        validate_card_details(
            &self.name,
            self.credit_limit,
            self.billing_day,
            self.payment_day,
        )
    }
}

fn validate_card_details(
    name: &str,
    credit_limit: f64,
    billing_day: u8,
    payment_day: u8,
) -> Result<(), Error> {
    validate_name(name)?;

    if !credit_limit.is_finite() || credit_limit < 1.0 {
        return Err(Error::InvalidCreditLimit(credit_limit));
    }

    for day in [billing_day, payment_day] {
        if !(1..=31).contains(&day) {
            return Err(Error::InvalidDayOfMonth(day));
        }
    }

    Ok(())
}

pub fn create_credit_card_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS credit_card (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            credit_limit REAL NOT NULL,
            current_balance REAL NOT NULL,
            billing_day INTEGER NOT NULL,
            payment_day INTEGER NOT NULL,
            last_used_at INTEGER,
            usage_count INTEGER NOT NULL DEFAULT 0
        )",
        (),
    )?;

    Ok(())
}

fn map_row_to_credit_card(row: &Row) -> Result<CreditCard, rusqlite::Error> {
    Ok(CreditCard {
        id: row.get(0)?,
        name: row.get(1)?,
        credit_limit: row.get(2)?,
        current_balance: row.get(3)?,
        billing_day: row.get(4)?,
        payment_day: row.get(5)?,
        last_used_at: row.get(6)?,
        usage_count: row.get(7)?,
    })
}

const SELECT_CREDIT_CARD: &str = "SELECT id, name, credit_limit, current_balance, billing_day, \
    payment_day, last_used_at, usage_count FROM credit_card";

fn map_unique_name_error(error: rusqlite::Error, name: &str) -> Error {
    match error {
        // Code 2067 occurs when a UNIQUE constraint failed.
        rusqlite::Error::SqliteFailure(error, Some(_)) if error.extended_code == 2067 => {
            Error::DuplicateCreditCardName(name.to_owned())
        }
        error => error.into(),
    }
}

/// Create a credit card that has never been used.
///
/// # Errors
/// Returns an error if the name is blank or not 3 to 150 characters long, the
/// limit is less than 1, a day is not a valid day of the month, another card
/// has the same name or there is an SQL error.
pub fn create_credit_card(
    credit_card: &NewCreditCard,
    connection: &Connection,
) -> Result<CreditCard, Error> {
    credit_card.validate()?;

    connection
        .execute(
            "INSERT INTO credit_card (name, credit_limit, current_balance, billing_day, payment_day)
            VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                credit_card.name,
                credit_card.credit_limit,
                credit_card.current_balance,
                credit_card.billing_day,
                credit_card.payment_day
            ],
        )
        .map_err(|error| map_unique_name_error(error, &credit_card.name))?;

    Ok(CreditCard {
        id: connection.last_insert_rowid(),
        name: credit_card.name.clone(),
        credit_limit: credit_card.credit_limit,
        current_balance: credit_card.current_balance,
        billing_day: credit_card.billing_day,
        payment_day: credit_card.payment_day,
        last_used_at: None,
        usage_count: 0,
    })
}

/// Retrieve a credit card by its `id`.
///
/// # Errors
/// Returns [Error::NotFound] if `id` does not refer to a credit card.
pub fn get_credit_card(id: CreditCardId, connection: &Connection) -> Result<CreditCard, Error> {
    let credit_card = connection
        .prepare(&format!("{SELECT_CREDIT_CARD} WHERE id = :id"))?
        .query_one(&[(":id", &id)], map_row_to_credit_card)?;

    Ok(credit_card)
}

/// Retrieve all credit cards ordered by name.
pub fn get_all_credit_cards(connection: &Connection) -> Result<Vec<CreditCard>, Error> {
    connection
        .prepare(&format!("{SELECT_CREDIT_CARD} ORDER BY name ASC"))?
        .query_map([], map_row_to_credit_card)?
        .map(|credit_card| credit_card.map_err(Error::from))
        .collect()
}

/// Change the name, limit and statement days of a credit card.
///
/// The amount owing and the usage history of the card are left as is.
///
/// # Errors
/// Returns [Error::UpdateMissingCreditCard] if the card does not exist, and
/// the same validation errors as [create_credit_card].
pub fn update_credit_card(
    id: CreditCardId,
    details: &CreditCardDetails,
    connection: &Connection,
) -> Result<(), Error> {
    details.validate()?;

    let rows_affected = connection
        .execute(
            "UPDATE credit_card
            SET name = ?1, credit_limit = ?2, billing_day = ?3, payment_day = ?4
            WHERE id = ?5",
            params![
                details.name,
                details.credit_limit,
                details.billing_day,
                details.payment_day,
                id
            ],
        )
        .map_err(|error| map_unique_name_error(error, &details.name))?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingCreditCard);
    }

    Ok(())
}

/// Delete a credit card along with its expenses and payments.
///
/// # Errors
/// Returns [Error::DeleteMissingCreditCard] if the card does not exist.
pub fn delete_credit_card(id: CreditCardId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM credit_card WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingCreditCard);
    }

    Ok(())
}

#[cfg(test)]
pub(crate) fn new_test_credit_card(name: &str, credit_limit: f64) -> NewCreditCard {
    NewCreditCard {
        name: name.to_owned(),
        credit_limit,
        current_balance: 0.0,
        billing_day: 1,
        payment_day: 20,
    }
}
