//! Transfers between accounts and payments from an account to a credit card.

use rusqlite::{Connection, OptionalExtension, Row, params, types::Type};
use time::OffsetDateTime;

use crate::{
    Error, account::AccountId, database_id::DatabaseId, funding_source::FundingSourceId,
    timezone::to_timestamp,
};

/// The database row id of a transfer.
pub type TransferId = DatabaseId;

/// Money moved out of an account, into another account or onto a credit card.
///
/// A transfer to a credit card is a payment that lowers what is owed on it.
#[derive(Debug, Clone, PartialEq)]
pub struct Transfer {
    /// The id for the transfer.
    pub id: TransferId,
    /// The amount moved, always greater than zero.
    pub amount: f64,
    /// Why the money was moved.
    pub description: String,
    /// The account the money was taken from.
    pub from: AccountId,
    /// The account or credit card the money went to.
    pub to: FundingSourceId,
    /// When the transfer was recorded, in UTC.
    pub recorded_at: OffsetDateTime,
}

/// The data needed to record a transfer or a credit card payment.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransfer {
    /// The amount to move, must be finite and greater than zero.
    pub amount: f64,
    /// Why the money is moved.
    pub description: String,
    /// The account to take the money from.
    pub from: AccountId,
    /// The account or credit card to move the money to.
    pub to: FundingSourceId,
}

/// A transfer together with the names of both ends.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferWithNames {
    pub transfer: Transfer,
    pub from_name: String,
    pub to_name: String,
}

pub fn create_transfer_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS transfer (
            id INTEGER PRIMARY KEY,
            amount REAL NOT NULL,
            description TEXT NOT NULL,
            from_account_id INTEGER NOT NULL REFERENCES account(id) ON DELETE CASCADE,
            to_account_id INTEGER REFERENCES account(id) ON DELETE CASCADE,
            to_credit_card_id INTEGER REFERENCES credit_card(id) ON DELETE CASCADE,
            recorded_at TEXT NOT NULL,
            CHECK ((to_account_id IS NULL) <> (to_credit_card_id IS NULL))
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transfer_recorded_at ON transfer(recorded_at)",
        (),
    )?;

    Ok(())
}

fn map_row_to_transfer(row: &Row) -> Result<Transfer, rusqlite::Error> {
    let to_account_id: Option<i64> = row.get(4)?;
    let to_credit_card_id: Option<i64> = row.get(5)?;

    let to = match (to_account_id, to_credit_card_id) {
        (Some(id), _) => FundingSourceId::Account(id),
        (None, Some(id)) => FundingSourceId::CreditCard(id),
        (None, None) => {
            return Err(rusqlite::Error::InvalidColumnType(
                4,
                "to_account_id".to_owned(),
                Type::Null,
            ));
        }
    };

    Ok(Transfer {
        id: row.get(0)?,
        amount: row.get(1)?,
        description: row.get(2)?,
        from: row.get(3)?,
        to,
        recorded_at: row.get(6)?,
    })
}

/// Record a transfer at the current time.
///
/// See [record_transfer_at] for the changes made and the errors returned.
pub fn record_transfer(
    new_transfer: &NewTransfer,
    connection: &Connection,
) -> Result<Transfer, Error> {
    record_transfer_at(new_transfer, OffsetDateTime::now_utc(), connection)
}

/// Record a transfer at `recorded_at`.
///
/// The amount is taken from the `from` account. When `to` is an account the
/// amount is added to its balance and neither account counts as used. When
/// `to` is a credit card the payment lowers what is owed on it, and the
/// paying account is marked as last used at `recorded_at` with its usage
/// count going up by one. All changes are made in one SQL transaction.
///
/// # Errors
/// - [Error::InvalidAmount] if the amount is not a finite number greater than zero.
/// - [Error::SameAccountTransfer] if `from` and `to` are the same account.
/// - [Error::FundingSourceNotFound] if either end does not exist.
/// - [Error::InsufficientFunds] if the `from` balance is less than the amount.
/// - [Error::PaymentExceedsBalance] if a payment is more than is owed on the card.
///
/// Nothing is changed when an error is returned.
pub fn record_transfer_at(
    new_transfer: &NewTransfer,
    recorded_at: OffsetDateTime,
    connection: &Connection,
) -> Result<Transfer, Error> {
    let amount = new_transfer.amount;

    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidAmount(amount));
    }

    if new_transfer.to == FundingSourceId::Account(new_transfer.from) {
        return Err(Error::SameAccountTransfer);
    }

    let recorded_at = recorded_at.to_offset(time::UtcOffset::UTC);
    let transaction = connection.unchecked_transaction()?;

    let from_balance: f64 = transaction
        .query_row(
            "SELECT balance FROM account WHERE id = ?1",
            [new_transfer.from],
            |row| row.get(0),
        )
        .optional()?
        .ok_or(Error::FundingSourceNotFound(FundingSourceId::Account(
            new_transfer.from,
        )))?;

    if from_balance < amount {
        return Err(Error::InsufficientFunds);
    }

    let (to_account_id, to_credit_card_id) = match new_transfer.to {
        FundingSourceId::Account(id) => {
            let rows_affected = transaction.execute(
                "UPDATE account SET balance = balance + ?1 WHERE id = ?2",
                params![amount, id],
            )?;

            if rows_affected == 0 {
                return Err(Error::FundingSourceNotFound(new_transfer.to));
            }

            transaction.execute(
                "UPDATE account SET balance = balance - ?1 WHERE id = ?2",
                params![amount, new_transfer.from],
            )?;

            (Some(id), None)
        }
        FundingSourceId::CreditCard(id) => {
            let owed: f64 = transaction
                .query_row(
                    "SELECT current_balance FROM credit_card WHERE id = ?1",
                    [id],
                    |row| row.get(0),
                )
                .optional()?
                .ok_or(Error::FundingSourceNotFound(new_transfer.to))?;

            if amount > owed {
                return Err(Error::PaymentExceedsBalance(amount));
            }

            transaction.execute(
                "UPDATE credit_card SET current_balance = current_balance - ?1 WHERE id = ?2",
                params![amount, id],
            )?;
            transaction.execute(
                "UPDATE account
                SET balance = balance - ?1, last_used_at = ?2, usage_count = usage_count + 1
                WHERE id = ?3",
                params![amount, to_timestamp(recorded_at), new_transfer.from],
            )?;

            (None, Some(id))
        }
    };

    transaction.execute(
        "INSERT INTO transfer
            (amount, description, from_account_id, to_account_id, to_credit_card_id, recorded_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            amount,
            new_transfer.description,
            new_transfer.from,
            to_account_id,
            to_credit_card_id,
            recorded_at
        ],
    )?;
    let id = transaction.last_insert_rowid();

    transaction.commit()?;

    Ok(Transfer {
        id,
        amount,
        description: new_transfer.description.clone(),
        from: new_transfer.from,
        to: new_transfer.to,
        recorded_at,
    })
}

const SELECT_TRANSFER: &str = "SELECT id, amount, description, from_account_id, to_account_id, \
    to_credit_card_id, recorded_at FROM transfer";

fn get_transfer(id: TransferId, connection: &Connection) -> Result<Option<Transfer>, Error> {
    let transfer = connection
        .prepare(&format!("{SELECT_TRANSFER} WHERE id = :id"))?
        .query_one(&[(":id", &id)], map_row_to_transfer)
        .optional()?;

    Ok(transfer)
}

/// Retrieve all transfers and credit card payments, newest first, with the names of both ends.
pub fn get_transfers(connection: &Connection) -> Result<Vec<TransferWithNames>, Error> {
    connection
        .prepare(
            "SELECT transfer.id, transfer.amount, transfer.description, transfer.from_account_id,
                transfer.to_account_id, transfer.to_credit_card_id, transfer.recorded_at,
                from_account.name, COALESCE(to_account.name, to_credit_card.name)
            FROM transfer
            INNER JOIN account AS from_account ON from_account.id = transfer.from_account_id
            LEFT JOIN account AS to_account ON to_account.id = transfer.to_account_id
            LEFT JOIN credit_card AS to_credit_card
                ON to_credit_card.id = transfer.to_credit_card_id
            ORDER BY transfer.recorded_at DESC, transfer.id DESC",
        )?
        .query_map([], |row| {
            Ok(TransferWithNames {
                transfer: map_row_to_transfer(row)?,
                from_name: row.get(7)?,
                to_name: row.get(8)?,
            })
        })?
        .map(|transfer| transfer.map_err(Error::from))
        .collect()
}

/// Undo a transfer or credit card payment.
///
/// Money moved to an account is taken back out of it and returned to the
/// `from` account. A payment is added back onto what is owed on the card and
/// returned to the paying account, whose usage count goes down by one
/// without going below zero. All changes are made in one SQL transaction.
///
/// # Errors
/// - [Error::DeleteMissingTransfer] if the transfer does not exist.
/// - [Error::InsufficientFunds] if the receiving account no longer has the amount.
///
/// Nothing is changed when an error is returned.
pub fn rollback_transfer(id: TransferId, connection: &Connection) -> Result<Transfer, Error> {
    let transaction = connection.unchecked_transaction()?;

    let transfer = get_transfer(id, &transaction)?.ok_or(Error::DeleteMissingTransfer)?;

    match transfer.to {
        FundingSourceId::Account(to_id) => {
            let to_balance: f64 = transaction.query_row(
                "SELECT balance FROM account WHERE id = ?1",
                [to_id],
                |row| row.get(0),
            )?;

            if to_balance < transfer.amount {
                return Err(Error::InsufficientFunds);
            }

            transaction.execute(
                "UPDATE account SET balance = balance - ?1 WHERE id = ?2",
                params![transfer.amount, to_id],
            )?;
            transaction.execute(
                "UPDATE account SET balance = balance + ?1 WHERE id = ?2",
                params![transfer.amount, transfer.from],
            )?;
        }
        FundingSourceId::CreditCard(credit_card_id) => {
            transaction.execute(
                "UPDATE credit_card SET current_balance = current_balance + ?1 WHERE id = ?2",
                params![transfer.amount, credit_card_id],
            )?;
            transaction.execute(
                "UPDATE account
                SET balance = balance + ?1, usage_count = MAX(usage_count - 1, 0)
                WHERE id = ?2",
                params![transfer.amount, transfer.from],
            )?;
        }
    }

    transaction.execute("DELETE FROM transfer WHERE id = ?1", [id])?;
    transaction.commit()?;

    Ok(transfer)
}


#[cfg(test)]
mod record_transfer_tests {
    use time::macros::datetime;

    use crate::{
        Error,
        account::get_account,
        credit_card::get_credit_card,
        funding_source::FundingSourceId,
    };

    use super::{
        NewTransfer, Transfer, get_transfers, record_transfer, record_transfer_at,
        test_data::get_test_connection,
    };

    fn transfer(amount: f64, from: i64, to: FundingSourceId) -> NewTransfer {
        NewTransfer {
            amount,
            description: "Savings plan".to_owned(),
            from,
            to,
        }
    }

    #[test]
    fn moves_money_between_accounts_without_marking_them_used() {
        let connection = get_test_connection();
        let recorded_at = datetime!(2023-11-14 22:13:20 UTC);

        let got = record_transfer_at(
            &transfer(40.0, 1, FundingSourceId::Account(2)),
            recorded_at,
            &connection,
        )
        .unwrap();

        assert_eq!(
            got,
            Transfer {
                id: 1,
                amount: 40.0,
                description: "Savings plan".to_owned(),
                from: 1,
                to: FundingSourceId::Account(2),
                recorded_at,
            }
        );
        let from = get_account(1, &connection).unwrap();
        let to = get_account(2, &connection).unwrap();
        assert_eq!((from.balance, to.balance), (60.0, 40.0));
        assert_eq!((from.usage_count, to.usage_count), (0, 0));
        assert_eq!((from.last_used_at, to.last_used_at), (None, None));
    }

    #[test]
    fn payment_lowers_amount_owed_and_marks_account_used() {
        let connection = get_test_connection();

        record_transfer_at(
            &transfer(75.0, 1, FundingSourceId::CreditCard(1)),
            datetime!(2023-11-14 22:13:20 UTC),
            &connection,
        )
        .unwrap();

        let account = get_account(1, &connection).unwrap();
        assert_eq!(account.balance, 25.0);
        assert_eq!(account.usage_count, 1);
        assert_eq!(account.last_used_at, Some(1_700_000_000_000));
        let credit_card = get_credit_card(1, &connection).unwrap();
        assert_eq!(credit_card.current_balance, 225.0);
        assert_eq!(credit_card.usage_count, 0);
    }

    #[test]
    fn account_can_move_its_entire_balance() {
        let connection = get_test_connection();

        let got = record_transfer(&transfer(100.0, 1, FundingSourceId::Account(2)), &connection);

        assert!(got.is_ok());
        assert_eq!(get_account(1, &connection).unwrap().balance, 0.0);
    }

    #[test]
    fn rejects_invalid_amounts() {
        let connection = get_test_connection();

        for amount in [0.0, -3.0, f64::NAN, f64::INFINITY] {
            let got = record_transfer(&transfer(amount, 1, FundingSourceId::Account(2)), &connection);

            assert!(
                matches!(got, Err(Error::InvalidAmount(_))),
                "want amount {amount} to be rejected, got {got:?}"
            );
        }
    }

    #[test]
    fn rejects_transfer_to_same_account() {
        let connection = get_test_connection();

        let got = record_transfer(&transfer(1.0, 1, FundingSourceId::Account(1)), &connection);

        assert_eq!(got, Err(Error::SameAccountTransfer));
    }

    #[test]
    fn rejects_insufficient_funds_without_changes() {
        let connection = get_test_connection();

        for to in [FundingSourceId::Account(2), FundingSourceId::CreditCard(1)] {
            let got = record_transfer(&transfer(100.01, 1, to), &connection);

            assert_eq!(got, Err(Error::InsufficientFunds), "unexpected result for {to}");
        }

        let account = get_account(1, &connection).unwrap();
        assert_eq!(account.balance, 100.0);
        assert_eq!(account.usage_count, 0);
        assert_eq!(get_account(2, &connection).unwrap().balance, 0.0);
        assert_eq!(get_credit_card(1, &connection).unwrap().current_balance, 300.0);
        assert_eq!(get_transfers(&connection), Ok(vec![]));
    }

    #[test]
    fn rejects_payment_larger_than_amount_owed() {
        let connection = get_test_connection();
        connection
            .execute("UPDATE account SET balance = 500 WHERE id = 1", ())
            .unwrap();

        let got = record_transfer(
            &transfer(300.01, 1, FundingSourceId::CreditCard(1)),
            &connection,
        );

        assert_eq!(got, Err(Error::PaymentExceedsBalance(300.01)));
        assert_eq!(get_account(1, &connection).unwrap().balance, 500.0);
        assert_eq!(get_credit_card(1, &connection).unwrap().current_balance, 300.0);
    }

    #[test]
    fn rejects_unknown_ends() {
        let connection = get_test_connection();
        let cases = [
            (9, FundingSourceId::Account(2), FundingSourceId::Account(9)),
            (1, FundingSourceId::Account(9), FundingSourceId::Account(9)),
            (1, FundingSourceId::CreditCard(9), FundingSourceId::CreditCard(9)),
        ];

        for (from, to, missing) in cases {
            let got = record_transfer(&transfer(1.0, from, to), &connection);

            assert_eq!(got, Err(Error::FundingSourceNotFound(missing)));
        }
        assert_eq!(get_account(1, &connection).unwrap().balance, 100.0);
    }
}
