pub mod migrate;
pub mod password;
pub mod routes;
pub mod serve;
