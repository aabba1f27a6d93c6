pub mod ingredient;
pub mod recipe;
pub mod user;

pub use ingredient::Ingredient;
pub use recipe::Recipe;
pub use user::AdminUser;
