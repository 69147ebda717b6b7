//! Bank accounts: storage, pages and endpoints.

mod accounts_page;
mod core;
mod create_endpoint;
mod create_page;
mod delete_endpoint;
mod edit_endpoint;
mod edit_page;

pub use accounts_page::get_accounts_page;
pub use core::{
    Account, AccountId, NewAccount, create_account, create_account_table, delete_account,
    get_account, get_all_accounts, update_account,
};
pub use create_endpoint::create_account_endpoint;
pub use create_page::get_create_account_page;
pub use delete_endpoint::delete_account_endpoint;
pub use edit_endpoint::edit_account_endpoint;
pub use edit_page::get_edit_account_page;
