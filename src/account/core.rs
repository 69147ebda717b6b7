//! Bank accounts and their storage.

use rusqlite::{Connection, Row, params};

use crate::{
    Error,
    database_id::DatabaseId,
    funding_source::{Timestamp, validate_name},
};

/// The database row id of an account.
pub type AccountId = DatabaseId;

/// A bank account that expenses can be paid from.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// The id for the account.
    pub id: AccountId,
    /// The name of the account, unique among accounts.
    pub name: String,
    /// The money in the account.
    pub balance: f64,
    /// When the account last paid for an expense, in milliseconds since the Unix epoch.
    pub last_used_at: Option<Timestamp>,
    /// How many expenses the account has paid for.
    pub usage_count: u32,
}

/// The fields needed to open an account.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    /// The name of the account, 3 to 150 characters.
    pub name: String,
    /// The opening balance, must not be negative.
    pub balance: f64,
}

impl NewAccount {
    fn validate(&self) -> Result<(), Error> {
        validate_name(&self.name)?;

        if !self.balance.is_finite() {
            return Err(Error::InvalidAmount(self.balance));
        }

        if self.balance < 0.0 {
            return Err(Error::NegativeBalance(self.balance));
        }

        Ok(())
    }
}

pub fn create_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS account (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            balance REAL NOT NULL,
            last_used_at INTEGER,
            usage_count INTEGER NOT NULL DEFAULT 0
        )",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_account(row: &Row) -> Result<Account, rusqlite::Error> {
    Ok(Account {
        id: row.get(0)?,
        name: row.get(1)?,
        balance: row.get(2)?,
        last_used_at: row.get(3)?,
        usage_count: row.get(4)?,
    })
}

fn map_unique_name_error(error: rusqlite::Error, name: &str) -> Error {
    match error {
        // Code 2067 occurs when a UNIQUE constraint failed.
        rusqlite::Error::SqliteFailure(error, Some(_)) if error.extended_code == 2067 => {
            Error::DuplicateAccountName(name.to_owned())
        }
        error => error.into(),
    }
}

/// Create an account that has never been used.
///
/// # Errors
/// Returns an error if the name is blank or not 3 to 150 characters long, the
/// balance is negative or not a number, another account has the same name or
/// there is an SQL error.
pub fn create_account(account: &NewAccount, connection: &Connection) -> Result<Account, Error> {
    account.validate()?;

    connection
        .execute(
            "INSERT INTO account (name, balance) VALUES (?1, ?2)",
            params![account.name, account.balance],
        )
        .map_err(|error| map_unique_name_error(error, &account.name))?;

    Ok(Account {
        id: connection.last_insert_rowid(),
        name: account.name.clone(),
        balance: account.balance,
        last_used_at: None,
        usage_count: 0,
    })
}

/// Retrieve an account from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid account,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_account(id: AccountId, connection: &Connection) -> Result<Account, Error> {
    let account = connection
        .prepare(
            "SELECT id, name, balance, last_used_at, usage_count FROM account WHERE id = :id",
        )?
        .query_one(&[(":id", &id)], map_row_to_account)?;

    Ok(account)
}

/// Retrieve all accounts ordered by name.
pub fn get_all_accounts(connection: &Connection) -> Result<Vec<Account>, Error> {
    connection
        .prepare(
            "SELECT id, name, balance, last_used_at, usage_count FROM account ORDER BY name ASC",
        )?
        .query_map([], map_row_to_account)?
        .map(|account_result| account_result.map_err(Error::from))
        .collect()
}

/// Rename an account.
///
/// The balance only changes through expenses, incomes and transfers, so it
/// and the usage history are left as is.
///
/// # Errors
/// Returns [Error::UpdateMissingAccount] if the account does not exist,
/// [Error::DuplicateAccountName] if another account has `name`, and the same
/// name errors as [create_account].
pub fn update_account(id: AccountId, name: &str, connection: &Connection) -> Result<(), Error> {
    validate_name(name)?;

    let rows_affected = connection
        .execute(
            "UPDATE account SET name = ?1 WHERE id = ?2",
            params![name, id],
        )
        .map_err(|error| map_unique_name_error(error, name))?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingAccount);
    }

    Ok(())
}

/// Delete an account along with its expenses, incomes and transfers.
///
/// # Errors
/// Returns [Error::DeleteMissingAccount] if the account does not exist.
pub fn delete_account(id: AccountId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM account WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingAccount);
    }

    Ok(())
}
