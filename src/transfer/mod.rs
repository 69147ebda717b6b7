//! Transfers: moving money between accounts and paying off credit cards from an account.

mod core;
mod create_endpoint;
mod delete_endpoint;
mod payment_page;
mod transfer_page;
mod transfers_page;

pub use core::{
    NewTransfer, Transfer, TransferId, TransferWithNames, create_transfer_table, get_transfers,
    record_transfer, record_transfer_at, rollback_transfer,
};
pub use create_endpoint::create_transfer_endpoint;
pub use delete_endpoint::delete_transfer_endpoint;
pub use payment_page::get_card_payment_page;
pub use transfer_page::get_new_transfer_page;
pub use transfers_page::get_transfers_page;
