use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use xpenbox::{
    FundingSourceId, NewAccount, NewCreditCard, NewExpense, NewIncome, NewTransfer,
    create_account, create_credit_card, initialize_db, record_expense_at, record_income_at,
    record_transfer_at,
};

/// A utility for creating a test database for the xpenbox web server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating accounts...");
    let mut sources = Vec::new();
    for (name, balance) in [("Everyday", 1250.0), ("Savings", 8400.0), ("Cash", 60.0)] {
        let account = create_account(
            &NewAccount {
                name: name.to_owned(),
                balance,
            },
            &conn,
        )?;
        sources.push(FundingSourceId::Account(account.id));
    }

    println!("Creating credit cards...");
    for (name, credit_limit, current_balance, billing_day, payment_day) in [
        ("Visa", 5000.0, 320.0, 12, 2),
        ("Mastercard", 2000.0, 1975.0, 25, 15),
    ] {
        let credit_card = create_credit_card(
            &NewCreditCard {
                name: name.to_owned(),
                credit_limit,
                current_balance,
                billing_day,
                payment_day,
            },
            &conn,
        )?;
        sources.push(FundingSourceId::CreditCard(credit_card.id));
    }

    println!("Recording expenses...");
    let now = OffsetDateTime::now_utc();
    let expenses = [
        (42.5, "Groceries", 0, 9),
        (4.8, "Coffee", 2, 8),
        (120.0, "Power bill", 0, 6),
        (89.99, "Headphones", 3, 5),
        (15.0, "Lunch", 3, 3),
        (6.5, "Coffee", 2, 1),
    ];
    for (amount, description, source_index, days_ago) in expenses {
        record_expense_at(
            &NewExpense {
                amount,
                description: description.to_owned(),
                source: sources[source_index],
            },
            now - Duration::days(days_ago),
            &conn,
        )?;
    }

    println!("Recording incomes...");
    for (amount, description, days_ago) in [(3200.0, "Salary", 14), (45.0, "Refund", 4)] {
        record_income_at(
            &NewIncome {
                amount,
                description: description.to_owned(),
                account_id: 1,
            },
            now - Duration::days(days_ago),
            &conn,
        )?;
    }

    println!("Recording transfers...");
    let transfers = [
        (500.0, "Savings plan", FundingSourceId::Account(2), 13),
        (320.0, "Visa statement", sources[3], 2),
    ];
    for (amount, description, to, days_ago) in transfers {
        record_transfer_at(
            &NewTransfer {
                amount,
                description: description.to_owned(),
                from: 1,
                to,
            },
            now - Duration::days(days_ago),
            &conn,
        )?;
    }

    println!("Success!");

    Ok(())
}
