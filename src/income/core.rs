//! Incomes and the deposits they make into accounts.

use rusqlite::{Connection, OptionalExtension, Row, params};
use time::OffsetDateTime;

use crate::{
    Error, account::AccountId, database_id::DatabaseId, funding_source::FundingSourceId,
};

/// The database row id of an income.
pub type IncomeId = DatabaseId;

/// Money received into an account.
#[derive(Debug, Clone, PartialEq)]
pub struct Income {
    /// The id for the income.
    pub id: IncomeId,
    /// The amount received, always greater than zero.
    pub amount: f64,
    /// Where the money came from, e.g. "Salary".
    pub description: String,
    /// The account the money was deposited into.
    pub account_id: AccountId,
    /// When the income was received, in UTC.
    pub received_at: OffsetDateTime,
}

/// The data needed to record an income.
#[derive(Debug, Clone, PartialEq)]
pub struct NewIncome {
    /// The amount received, must be finite and greater than zero.
    pub amount: f64,
    /// Where the money came from.
    pub description: String,
    /// The account to deposit the money into.
    pub account_id: AccountId,
}

/// An income together with the name of the account it was deposited into.
#[derive(Debug, Clone, PartialEq)]
pub struct IncomeWithAccount {
    pub income: Income,
    pub account_name: String,
}

pub fn create_income_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS income (
            id INTEGER PRIMARY KEY,
            amount REAL NOT NULL,
            description TEXT NOT NULL,
            account_id INTEGER NOT NULL REFERENCES account(id) ON DELETE CASCADE,
            received_at TEXT NOT NULL
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_income_received_at ON income(received_at)",
        (),
    )?;

    Ok(())
}

fn map_row_to_income(row: &Row) -> Result<Income, rusqlite::Error> {
    Ok(Income {
        id: row.get(0)?,
        amount: row.get(1)?,
        description: row.get(2)?,
        account_id: row.get(3)?,
        received_at: row.get(4)?,
    })
}

/// Record an income deposited into `new_income.account_id` at the current time.
///
/// See [record_income_at] for the changes made and the errors returned.
pub fn record_income(new_income: &NewIncome, connection: &Connection) -> Result<Income, Error> {
    record_income_at(new_income, OffsetDateTime::now_utc(), connection)
}

/// Record an income deposited into `new_income.account_id` at `received_at`.
///
/// The amount is added to the account balance. Receiving money does not
/// count as using the account, so its usage history is left as is.
///
/// # Errors
/// - [Error::InvalidAmount] if the amount is not a finite number greater than zero.
/// - [Error::FundingSourceNotFound] if the account does not exist.
///
/// Nothing is changed when an error is returned.
pub fn record_income_at(
    new_income: &NewIncome,
    received_at: OffsetDateTime,
    connection: &Connection,
) -> Result<Income, Error> {
    let amount = new_income.amount;

    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidAmount(amount));
    }

    let received_at = received_at.to_offset(time::UtcOffset::UTC);
    let transaction = connection.unchecked_transaction()?;

    let rows_affected = transaction.execute(
        "UPDATE account SET balance = balance + ?1 WHERE id = ?2",
        params![amount, new_income.account_id],
    )?;

    if rows_affected == 0 {
        return Err(Error::FundingSourceNotFound(FundingSourceId::Account(
            new_income.account_id,
        )));
    }

    transaction.execute(
        "INSERT INTO income (amount, description, account_id, received_at)
        VALUES (?1, ?2, ?3, ?4)",
        params![
            amount,
            new_income.description,
            new_income.account_id,
            received_at
        ],
    )?;
    let id = transaction.last_insert_rowid();

    transaction.commit()?;

    Ok(Income {
        id,
        amount,
        description: new_income.description.clone(),
        account_id: new_income.account_id,
        received_at,
    })
}

fn get_income(id: IncomeId, connection: &Connection) -> Result<Option<Income>, Error> {
    let income = connection
        .prepare(
            "SELECT id, amount, description, account_id, received_at FROM income WHERE id = :id",
        )?
        .query_one(&[(":id", &id)], map_row_to_income)
        .optional()?;

    Ok(income)
}

/// Retrieve all incomes, newest first, with the name of the account each went into.
pub fn get_incomes(connection: &Connection) -> Result<Vec<IncomeWithAccount>, Error> {
    connection
        .prepare(
            "SELECT income.id, income.amount, income.description, income.account_id,
                income.received_at, account.name
            FROM income
            INNER JOIN account ON account.id = income.account_id
            ORDER BY income.received_at DESC, income.id DESC",
        )?
        .query_map([], |row| {
            Ok(IncomeWithAccount {
                income: map_row_to_income(row)?,
                account_name: row.get(5)?,
            })
        })?
        .map(|income| income.map_err(Error::from))
        .collect()
}

/// Undo an income by taking the amount back out of the account.
///
/// # Errors
/// - [Error::DeleteMissingIncome] if the income does not exist.
/// - [Error::InsufficientFunds] if the money has already been spent, i.e.
///   the account balance is now less than the amount.
///
/// Nothing is changed when an error is returned.
pub fn rollback_income(id: IncomeId, connection: &Connection) -> Result<Income, Error> {
    let transaction = connection.unchecked_transaction()?;

    let income = get_income(id, &transaction)?.ok_or(Error::DeleteMissingIncome)?;

    let balance: f64 = transaction.query_row(
        "SELECT balance FROM account WHERE id = ?1",
        [income.account_id],
        |row| row.get(0),
    )?;

    if balance < income.amount {
        return Err(Error::InsufficientFunds);
    }

    transaction.execute(
        "UPDATE account SET balance = balance - ?1 WHERE id = ?2",
        params![income.amount, income.account_id],
    )?;
    transaction.execute("DELETE FROM income WHERE id = ?1", [id])?;
    transaction.commit()?;

    Ok(income)
}
