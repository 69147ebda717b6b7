//! Expenses and the changes they make to the account or credit card that paid for them.

use rusqlite::{Connection, OptionalExtension, Row, params, types::Type};
use time::OffsetDateTime;

use crate::{
    Error, database_id::DatabaseId, funding_source::FundingSourceId, timezone::to_timestamp,
};

/// The database row id of an expense.
pub type ExpenseId = DatabaseId;

/// Money spent from an account or charged to a credit card.
#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    /// The id for the expense.
    pub id: ExpenseId,
    /// The amount spent, always greater than zero.
    pub amount: f64,
    /// What the money was spent on.
    pub description: String,
    /// The account or credit card that paid for the expense.
    pub source: FundingSourceId,
    /// When the expense was recorded, in UTC.
    pub recorded_at: OffsetDateTime,
}

/// The data needed to record an expense.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    /// The amount spent, must be finite and greater than zero.
    pub amount: f64,
    /// What the money was spent on.
    pub description: String,
    /// The account or credit card that pays for the expense.
    pub source: FundingSourceId,
}

/// An expense together with the name of the account or credit card that paid for it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseWithSource {
    pub expense: Expense,
    pub source_name: String,
}

pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS expense (
            id INTEGER PRIMARY KEY,
            amount REAL NOT NULL,
            description TEXT NOT NULL,
            account_id INTEGER REFERENCES account(id) ON DELETE CASCADE,
            credit_card_id INTEGER REFERENCES credit_card(id) ON DELETE CASCADE,
            recorded_at TEXT NOT NULL,
            CHECK ((account_id IS NULL) <> (credit_card_id IS NULL))
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_expense_recorded_at ON expense(recorded_at)",
        (),
    )?;

    Ok(())
}

const SELECT_EXPENSE: &str =
    "SELECT id, amount, description, account_id, credit_card_id, recorded_at FROM expense";

fn map_row_to_expense(row: &Row) -> Result<Expense, rusqlite::Error> {
    let account_id: Option<i64> = row.get(3)?;
    let credit_card_id: Option<i64> = row.get(4)?;

    let source = match (account_id, credit_card_id) {
        (Some(id), _) => FundingSourceId::Account(id),
        (None, Some(id)) => FundingSourceId::CreditCard(id),
        (None, None) => {
            return Err(rusqlite::Error::InvalidColumnType(
                3,
                "account_id".to_owned(),
                Type::Null,
            ));
        }
    };

    Ok(Expense {
        id: row.get(0)?,
        amount: row.get(1)?,
        description: row.get(2)?,
        source,
        recorded_at: row.get(5)?,
    })
}

/// Record an expense paid for by `new_expense.source` at the current time.
///
/// See [record_expense_at] for the changes made and the errors returned.
pub fn record_expense(new_expense: &NewExpense, connection: &Connection) -> Result<Expense, Error> {
    record_expense_at(new_expense, OffsetDateTime::now_utc(), connection)
}

/// Record an expense paid for by `new_expense.source` at `recorded_at`.
///
/// An account has the amount taken from its balance and a credit card has the
/// amount added to what is owed. The source is marked as last used at
/// `recorded_at` and its usage count goes up by one. All changes are made in
/// one SQL transaction.
///
/// # Errors
/// - [Error::InvalidAmount] if the amount is not a finite number greater than zero.
/// - [Error::FundingSourceNotFound] if the source does not exist.
/// - [Error::InsufficientFunds] if the account balance is less than the amount.
/// - [Error::CreditLimitExceeded] if the charge would take the card over its limit.
///
/// Nothing is changed when an error is returned.
pub fn record_expense_at(
    new_expense: &NewExpense,
    recorded_at: OffsetDateTime,
    connection: &Connection,
) -> Result<Expense, Error> {
    let amount = new_expense.amount;

    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidAmount(amount));
    }

    let recorded_at = recorded_at.to_offset(time::UtcOffset::UTC);
    let last_used_at = to_timestamp(recorded_at);
    let transaction = connection.unchecked_transaction()?;

    let (account_id, credit_card_id) = match new_expense.source {
        FundingSourceId::Account(id) => {
            let balance: f64 = transaction
                .query_row("SELECT balance FROM account WHERE id = ?1", [id], |row| {
                    row.get(0)
                })
                .optional()?
                .ok_or(Error::FundingSourceNotFound(new_expense.source))?;

            if balance < amount {
                return Err(Error::InsufficientFunds);
            }

            transaction.execute(
                "UPDATE account
                SET balance = balance - ?1, last_used_at = ?2, usage_count = usage_count + 1
                WHERE id = ?3",
                params![amount, last_used_at, id],
            )?;

            (Some(id), None)
        }
        FundingSourceId::CreditCard(id) => {
            let (credit_limit, current_balance): (f64, f64) = transaction
                .query_row(
                    "SELECT credit_limit, current_balance FROM credit_card WHERE id = ?1",
                    [id],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?
                .ok_or(Error::FundingSourceNotFound(new_expense.source))?;

            if current_balance + amount > credit_limit {
                return Err(Error::CreditLimitExceeded);
            }

            transaction.execute(
                "UPDATE credit_card
                SET current_balance = current_balance + ?1, last_used_at = ?2,
                    usage_count = usage_count + 1
                WHERE id = ?3",
                params![amount, last_used_at, id],
            )?;

            (None, Some(id))
        }
    };

    transaction.execute(
        "INSERT INTO expense (amount, description, account_id, credit_card_id, recorded_at)
        VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            amount,
            new_expense.description,
            account_id,
            credit_card_id,
            recorded_at
        ],
    )?;
    let id = transaction.last_insert_rowid();

    transaction.commit()?;

    Ok(Expense {
        id,
        amount,
        description: new_expense.description.clone(),
        source: new_expense.source,
        recorded_at,
    })
}

/// Retrieve an expense by its `id`.
///
/// # Errors
/// Returns [Error::NotFound] if `id` does not refer to an expense.
pub fn get_expense(id: ExpenseId, connection: &Connection) -> Result<Expense, Error> {
    let expense = connection
        .prepare(&format!("{SELECT_EXPENSE} WHERE id = :id"))?
        .query_one(&[(":id", &id)], map_row_to_expense)?;

    Ok(expense)
}

/// Retrieve all expenses, newest first, with the name of the source that paid for each.
pub fn get_expenses(connection: &Connection) -> Result<Vec<ExpenseWithSource>, Error> {
    connection
        .prepare(
            "SELECT expense.id, expense.amount, expense.description, expense.account_id,
                expense.credit_card_id, expense.recorded_at,
                COALESCE(account.name, credit_card.name)
            FROM expense
            LEFT JOIN account ON account.id = expense.account_id
            LEFT JOIN credit_card ON credit_card.id = expense.credit_card_id
            ORDER BY expense.recorded_at DESC, expense.id DESC",
        )?
        .query_map([], |row| {
            Ok(ExpenseWithSource {
                expense: map_row_to_expense(row)?,
                source_name: row.get(6)?,
            })
        })?
        .map(|expense| expense.map_err(Error::from))
        .collect()
}

/// Undo an expense.
///
/// The amount is given back to the account, or taken off what is owed on the
/// credit card, and the source's usage count goes down by one without going
/// below zero. When the source was last used is left as is. All changes are
/// made in one SQL transaction.
///
/// # Errors
/// Returns [Error::DeleteMissingExpense] if the expense does not exist.
pub fn rollback_expense(id: ExpenseId, connection: &Connection) -> Result<Expense, Error> {
    let transaction = connection.unchecked_transaction()?;

    let expense = get_expense(id, &transaction).map_err(|error| match error {
        Error::NotFound => Error::DeleteMissingExpense,
        error => error,
    })?;

    match expense.source {
        FundingSourceId::Account(account_id) => transaction.execute(
            "UPDATE account
            SET balance = balance + ?1, usage_count = MAX(usage_count - 1, 0)
            WHERE id = ?2",
            params![expense.amount, account_id],
        )?,
        FundingSourceId::CreditCard(credit_card_id) => transaction.execute(
            "UPDATE credit_card
            SET current_balance = current_balance - ?1, usage_count = MAX(usage_count - 1, 0)
            WHERE id = ?2",
            params![expense.amount, credit_card_id],
        )?,
    };

    transaction.execute("DELETE FROM expense WHERE id = ?1", [id])?;
    transaction.commit()?;

    Ok(expense)
}

#[cfg(test)]
mod record_expense_tests {
    use rusqlite::Connection;
    use time::macros::datetime;

    use crate::{
        Error,
        account::{NewAccount, create_account, get_account},
        credit_card::{NewCreditCard, create_credit_card, get_credit_card},
        db::initialize,
        funding_source::FundingSourceId,
    };

    use super::{Expense, NewExpense, get_expense, record_expense, record_expense_at};

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        create_account(
            &NewAccount {
                name: "Everyday".to_owned(),
                balance: 100.0,
            },
            &connection,
        )
        .unwrap();
        create_credit_card(
            &NewCreditCard {
                name: "Visa".to_owned(),
                credit_limit: 500.0,
                current_balance: 450.0,
                billing_day: 1,
                payment_day: 20,
            },
            &connection,
        )
        .unwrap();
        connection
    }

    fn new_expense(amount: f64, source: FundingSourceId) -> NewExpense {
        NewExpense {
            amount,
            description: "Groceries".to_owned(),
            source,
        }
    }

    #[test]
    fn debits_account_and_marks_it_used() {
        let connection = get_test_connection();
        let recorded_at = datetime!(2023-11-14 22:13:20 UTC);

        let got = record_expense_at(
            &new_expense(40.0, FundingSourceId::Account(1)),
            recorded_at,
            &connection,
        )
        .unwrap();

        assert_eq!(
            got,
            Expense {
                id: 1,
                amount: 40.0,
                description: "Groceries".to_owned(),
                source: FundingSourceId::Account(1),
                recorded_at,
            }
        );
        assert_eq!(get_expense(1, &connection), Ok(got));
        let account = get_account(1, &connection).unwrap();
        assert_eq!(account.balance, 60.0);
        assert_eq!(account.last_used_at, Some(1_700_000_000_000));
        assert_eq!(account.usage_count, 1);
    }

    #[test]
    fn charges_credit_card_and_marks_it_used() {
        let connection = get_test_connection();

        record_expense_at(
            &new_expense(50.0, FundingSourceId::CreditCard(1)),
            datetime!(2023-11-14 22:13:20 UTC),
            &connection,
        )
        .unwrap();

        let credit_card = get_credit_card(1, &connection).unwrap();
        assert_eq!(credit_card.current_balance, 500.0);
        assert_eq!(credit_card.available_credit(), 0.0);
        assert_eq!(credit_card.last_used_at, Some(1_700_000_000_000));
        assert_eq!(credit_card.usage_count, 1);
    }

    #[test]
    fn stores_recorded_at_in_utc() {
        let connection = get_test_connection();

        let got = record_expense_at(
            &new_expense(1.0, FundingSourceId::Account(1)),
            datetime!(2023-11-15 11:13:20 +13),
            &connection,
        )
        .unwrap();

        assert_eq!(got.recorded_at, datetime!(2023-11-14 22:13:20 UTC));
        assert_eq!(get_expense(got.id, &connection).unwrap().recorded_at, got.recorded_at);
    }

    #[test]
    fn account_can_spend_entire_balance() {
        let connection = get_test_connection();

        let got = record_expense(&new_expense(100.0, FundingSourceId::Account(1)), &connection);

        assert!(got.is_ok());
        assert_eq!(get_account(1, &connection).unwrap().balance, 0.0);
    }

    #[test]
    fn rejects_invalid_amounts() {
        let connection = get_test_connection();

        for amount in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let got = record_expense(&new_expense(amount, FundingSourceId::Account(1)), &connection);

            assert!(
                matches!(got, Err(Error::InvalidAmount(_))),
                "want amount {amount} to be rejected, got {got:?}"
            );
        }
    }

    #[test]
    fn rejects_insufficient_funds_without_changes() {
        let connection = get_test_connection();

        let got = record_expense(&new_expense(100.01, FundingSourceId::Account(1)), &connection);

        assert_eq!(got, Err(Error::InsufficientFunds));
        let account = get_account(1, &connection).unwrap();
        assert_eq!(account.balance, 100.0);
        assert_eq!(account.usage_count, 0);
        assert_eq!(account.last_used_at, None);
        assert_eq!(get_expense(1, &connection), Err(Error::NotFound));
    }

    #[test]
    fn rejects_charge_over_credit_limit_without_changes() {
        let connection = get_test_connection();

        let got = record_expense(
            &new_expense(50.5, FundingSourceId::CreditCard(1)),
            &connection,
        );

        assert_eq!(got, Err(Error::CreditLimitExceeded));
        let credit_card = get_credit_card(1, &connection).unwrap();
        assert_eq!(credit_card.current_balance, 450.0);
        assert_eq!(credit_card.usage_count, 0);
    }

    #[test]
    fn rejects_unknown_source() {
        let connection = get_test_connection();

        for source in [FundingSourceId::Account(9), FundingSourceId::CreditCard(9)] {
            let got = record_expense(&new_expense(1.0, source), &connection);

            assert_eq!(got, Err(Error::FundingSourceNotFound(source)));
        }
    }
}


#[cfg(test)]
mod get_expenses_tests {
    use rusqlite::Connection;
    use time::macros::datetime;

    use crate::{
        account::{NewAccount, create_account},
        credit_card::{NewCreditCard, create_credit_card},
        db::initialize,
        funding_source::FundingSourceId,
    };

    use super::{NewExpense, get_expenses, record_expense_at};

    #[test]
    fn lists_newest_first_with_source_names() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        create_account(
            &NewAccount {
                name: "Everyday".to_owned(),
                balance: 100.0,
            },
            &connection,
        )
        .unwrap();
        create_credit_card(
            &NewCreditCard {
                name: "Visa".to_owned(),
                credit_limit: 1000.0,
                current_balance: 0.0,
                billing_day: 1,
                payment_day: 20,
            },
            &connection,
        )
        .unwrap();
        let older = record_expense_at(
            &NewExpense {
                amount: 12.0,
                description: "Lunch".to_owned(),
                source: FundingSourceId::Account(1),
            },
            datetime!(2025-03-01 12:00 UTC),
            &connection,
        )
        .unwrap();
        let newer = record_expense_at(
            &NewExpense {
                amount: 80.0,
                description: "Shoes".to_owned(),
                source: FundingSourceId::CreditCard(1),
            },
            datetime!(2025-03-02 09:30 UTC),
            &connection,
        )
        .unwrap();

        let got = get_expenses(&connection).unwrap();

        assert_eq!(got.len(), 2);
        assert_eq!(got[0].expense, newer);
        assert_eq!(got[0].source_name, "Visa");
        assert_eq!(got[1].expense, older);
        assert_eq!(got[1].source_name, "Everyday");
    }

    #[test]
    fn empty_database_has_no_expenses() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        assert_eq!(get_expenses(&connection), Ok(vec![]));
    }
}
