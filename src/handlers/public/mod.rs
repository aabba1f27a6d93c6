pub mod auth;
pub mod ingredients;
pub mod recipes;
pub mod system;
