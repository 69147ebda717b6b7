//! Creates the tables for the app's domain models.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error, account::create_account_table, credit_card::create_credit_card_table,
    expense::create_expense_table, income::create_income_table,
    transfer::create_transfer_table,
};

/// Create the tables for accounts, credit cards, expenses, incomes and
/// transfers if they do not exist yet.
///
/// Foreign key enforcement is switched on for `connection`, so deleting an
/// account or credit card also deletes the expenses, incomes and transfers
/// that refer to it.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    // Has no effect inside a transaction, so it must run first.
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_account_table(&transaction)?;
    create_credit_card_table(&transaction)?;
    create_expense_table(&transaction)?;
    create_income_table(&transaction)?;
    create_transfer_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
