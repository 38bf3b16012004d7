pub mod blocks;
pub mod cart;
pub mod checkout;
pub mod search;
