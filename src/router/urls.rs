use std::collections::{BTreeMap, HashMap};

use super::error::RouteError;
use super::pattern::Pattern;

/// Named route patterns, for generating URLs back into the route table.
#[derive(Debug, Clone, Default)]
pub struct RouteUrls {
    named: HashMap<String, Pattern>,
}

impl RouteUrls {
    pub(crate) fn insert(&mut self, name: &str, pattern: Pattern) -> Result<(), RouteError> {
        if self.named.contains_key(name) {
            return Err(RouteError::DuplicateName(name.to_string()));
        }
        self.named.insert(name.to_string(), pattern);
        Ok(())
    }

    /// Relative URL for a named route. Parameters naming a placeholder fill it; the rest
    /// become the query string, sorted by key.
    pub fn url_for(&self, name: &str, params: &BTreeMap<String, String>) -> Result<String, RouteError> {
        let pattern = self
            .named
            .get(name)
            .ok_or_else(|| RouteError::UnknownName(name.to_string()))?;
        let path = pattern.build(name, params)?;

        let placeholders: Vec<&str> = pattern.placeholders().collect();
        let extra: Vec<(&String, &String)> = params
            .iter()
            .filter(|(key, _)| !placeholders.contains(&key.as_str()))
            .collect();
        if extra.is_empty() {
            return Ok(path);
        }

        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(extra)
            .finish();
        Ok(format!("{}?{}", path, query))
    }
}
