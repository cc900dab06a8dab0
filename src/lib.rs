pub mod cli;
pub mod database;
pub mod http_err;
pub mod ledger;
pub mod server;
