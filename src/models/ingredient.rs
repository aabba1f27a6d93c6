use crate::query::{FilterColumn, Organizable, Resource};

pub struct Ingredient;

impl Organizable for Ingredient {
    const RESOURCE: Resource =
        Resource::new("ingredients", &["id", "name", "category", "created_at", "updated_at"])
            .with_sortable(&["name", "created_at"])
            .with_filterable(&[FilterColumn::text("category")])
            .with_searchable(&["name"]);
}
