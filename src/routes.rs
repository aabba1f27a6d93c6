use crate::handlers::{elevated, protected, public};
use crate::middleware::{require_auth, signed};
use crate::router::{Endpoint, RouteError, Router, Scope};
use crate::state::AppState;

/// Target of email verification links.
pub const VERIFY_EMAIL_ROUTE: &str = "verification.verify";

pub fn api() -> Scope<AppState> {
    Scope::root()
        .get("/", public::system::root)
        .get("/health", public::system::health)
        .scope(auth_routes())
        .scope(recipe_routes())
        .scope(ingredient_routes())
        .scope(admin_routes())
}

fn auth_routes() -> Scope<AppState> {
    Scope::new("/auth")
        // Token acquisition
        .post("/login", public::auth::login)
        .post("/refresh", public::auth::refresh)
        .route(
            Endpoint::get("/email/verify/{int:id}/{hash}", public::auth::verify_email)
                .with(signed())
                .named(VERIFY_EMAIL_ROUTE),
        )
        // Session management for authenticated users
        .scope(
            Scope::root()
                .with(require_auth(true, false))
                .get("/me", protected::auth::me)
                .post("/logout", protected::auth::logout)
                .post("/email/verification", protected::auth::verification_link),
        )
}

fn recipe_routes() -> Scope<AppState> {
    Scope::new("/recipes")
        .with(require_auth(false, false))
        .route(Endpoint::get("/", public::recipes::index).named("recipes.index"))
        .route(Endpoint::get("/{int:id}", public::recipes::show).named("recipes.show"))
        .get("/search/{term}", public::recipes::search)
}

fn ingredient_routes() -> Scope<AppState> {
    Scope::new("/ingredients")
        .route(Endpoint::get("/", public::ingredients::index).named("ingredients.index"))
        .route(Endpoint::get("/{int:id}", public::ingredients::show).named("ingredients.show"))
        .get("/search/{term}", public::ingredients::search)
}

fn admin_routes() -> Scope<AppState> {
    Scope::new("/admin")
        .with(require_auth(true, true))
        .get("/users", elevated::users::index)
        .get("/config", elevated::config::show)
        .put("/config", elevated::config::update)
}

pub fn build() -> Result<Router<AppState>, RouteError> {
    Router::build(api())
}
