pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod query;
pub mod router;
pub mod routes;
pub mod server;
pub mod state;

#[cfg(test)]
pub mod testing;
