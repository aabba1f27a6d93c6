use crate::query::{FilterColumn, Organizable, Resource};

/// Users as listed to administrators. `password_hash` is never projected.
pub struct AdminUser;

impl Organizable for AdminUser {
    const RESOURCE: Resource = Resource::new(
        "users",
        &["id", "name", "email", "is_admin", "email_verified_at", "created_at", "updated_at"],
    )
    .with_sortable(&["name", "email", "created_at"])
    .with_filterable(&[FilterColumn::boolean("is_admin")])
    .with_searchable(&["name", "email"]);
}
