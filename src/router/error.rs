use thiserror::Error;

/// Problems building the route table or generating URLs from it. Never produced while
/// matching a request: a path that fits no route is simply a 404.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("Invalid route pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Duplicate route name '{0}'")]
    DuplicateName(String),

    #[error("No route named '{0}'")]
    UnknownName(String),

    #[error("Route '{route}' requires parameter '{param}'")]
    MissingParameter { route: String, param: String },

    #[error("Parameter '{param}' of route '{route}' must be an integer, got '{value}'")]
    InvalidParameter {
        route: String,
        param: String,
        value: String,
    },
}

impl RouteError {
    pub(crate) fn invalid_pattern(pattern: &str, reason: impl Into<String>) -> Self {
        RouteError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }
}
