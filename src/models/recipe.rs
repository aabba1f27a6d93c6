use crate::query::{FilterColumn, Organizable, Resource};

pub struct Recipe;

impl Recipe {
    pub const OWNER_COLUMN: &'static str = "user_id";
    pub const VISIBILITY_COLUMN: &'static str = "is_public";
}

impl Organizable for Recipe {
    const RESOURCE: Resource = Resource::new(
        "recipes",
        &[
            "id",
            "user_id",
            "title",
            "description",
            "difficulty",
            "prep_minutes",
            "servings",
            "is_public",
            "created_at",
            "updated_at",
        ],
    )
    .with_sortable(&["title", "prep_minutes", "servings", "created_at", "updated_at"])
    .with_filterable(&[
        FilterColumn::int("user_id"),
        FilterColumn::text("difficulty"),
        FilterColumn::boolean("is_public"),
        FilterColumn::int("servings"),
    ])
    .with_searchable(&["title", "description"]);
}
