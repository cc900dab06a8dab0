pub mod accounts;
pub mod categories;
pub mod credit_cards;
pub mod interchange;
pub mod reports;
pub mod settings;
pub mod tags;
pub mod transactions;
