//! Expenses: recording them against a funding source, listing them and rolling them back.

mod core;
mod create_endpoint;
mod create_page;
mod delete_endpoint;
mod expenses_page;

pub use core::{
    Expense, ExpenseId, ExpenseWithSource, NewExpense, create_expense_table, get_expenses,
    record_expense, record_expense_at, rollback_expense,
};
pub use create_endpoint::create_expense_endpoint;
pub use create_page::get_new_expense_page;
pub use delete_endpoint::delete_expense_endpoint;
pub use expenses_page::get_expenses_page;
