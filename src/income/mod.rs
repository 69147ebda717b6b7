//! Incomes: depositing money into accounts, listing it and rolling it back.

mod core;
mod create_endpoint;
mod create_page;
mod delete_endpoint;
mod incomes_page;

pub use core::{
    Income, IncomeId, IncomeWithAccount, NewIncome, create_income_table, get_incomes,
    record_income, record_income_at, rollback_income,
};
pub use create_endpoint::create_income_endpoint;
pub use create_page::get_new_income_page;
pub use delete_endpoint::delete_income_endpoint;
pub use incomes_page::get_incomes_page;
