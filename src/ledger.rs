pub mod commands;
pub mod domain;
pub mod http;
pub mod models;
pub mod queries;
pub mod services;
