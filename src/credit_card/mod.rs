//! Credit cards: storage, pages and endpoints.

mod core;
mod create_endpoint;
mod create_page;
mod credit_cards_page;
mod delete_endpoint;
mod edit_endpoint;
mod edit_page;

pub use core::{
    CreditCard, CreditCardDetails, CreditCardId, NewCreditCard, create_credit_card, create_credit_card_table,
    delete_credit_card, get_all_credit_cards, get_credit_card, update_credit_card,
};
#[cfg(test)]
pub(crate) use core::new_test_credit_card;
pub use create_endpoint::create_credit_card_endpoint;
pub use create_page::get_create_credit_card_page;
pub use credit_cards_page::get_credit_cards_page;
pub use delete_endpoint::delete_credit_card_endpoint;
pub use edit_endpoint::edit_credit_card_endpoint;
pub use edit_page::get_edit_credit_card_page;
