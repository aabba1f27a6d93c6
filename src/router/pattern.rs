use std::collections::BTreeMap;

use super::error::RouteError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    /// `{name}`: one percent-decoded segment
    Str(String),
    /// `{int:name}`: one segment that must parse as an `i64`
    Int(String),
}

/// A compiled route path such as `/recipes/{int:id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    raw: String,
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Str(String),
    Int(i64),
}

/// Typed values captured from the request path, in pattern order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    values: Vec<(String, ParamValue)>,
}

impl PathParams {
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(ParamValue::Str(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        match self.get(name) {
            Some(ParamValue::Int(i)) => Some(*i),
            _ => None,
        }
    }
}

impl Pattern {
    pub fn parse(raw: &str) -> Result<Self, RouteError> {
        let normalized = normalize(raw);
        let mut segments = Vec::new();
        let mut names: Vec<&str> = Vec::new();

        for part in split_path(&normalized) {
            let segment = if let Some(inner) = part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
                let (kind, name) = match inner.split_once(':') {
                    Some((kind, name)) => (Some(kind), name),
                    None => (None, inner),
                };
                if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                    return Err(RouteError::invalid_pattern(raw, format!("bad placeholder name '{}'", name)));
                }
                if names.contains(&name) {
                    return Err(RouteError::invalid_pattern(raw, format!("placeholder '{}' repeated", name)));
                }
                names.push(name);
                match kind {
                    None => Segment::Str(name.to_string()),
                    Some("int") => Segment::Int(name.to_string()),
                    Some(other) => {
                        return Err(RouteError::invalid_pattern(raw, format!("unknown placeholder type '{}'", other)))
                    }
                }
            } else if part.is_empty() {
                return Err(RouteError::invalid_pattern(raw, "empty segment"));
            } else if part.contains('{') || part.contains('}') {
                return Err(RouteError::invalid_pattern(raw, format!("malformed segment '{}'", part)));
            } else {
                Segment::Literal(part.to_string())
            };
            segments.push(segment);
        }

        Ok(Self { raw: normalized, segments })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Str(name) | Segment::Int(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Typed parameters when `path` fits this pattern. A segment that fails its cast is a
    /// non-match, never an error.
    pub fn matches(&self, path: &str) -> Option<PathParams> {
        let parts = split_path(path);
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = PathParams::default();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(literal) => {
                    if literal != part {
                        return None;
                    }
                }
                Segment::Str(name) => {
                    if part.is_empty() {
                        return None;
                    }
                    let decoded = urlencoding::decode(part).ok()?;
                    params.values.push((name.clone(), ParamValue::Str(decoded.into_owned())));
                }
                Segment::Int(name) => {
                    let value = parse_int(part)?;
                    params.values.push((name.clone(), ParamValue::Int(value)));
                }
            }
        }
        Some(params)
    }

    /// Fill the placeholders from `params`; entries naming no placeholder are ignored.
    pub fn build(&self, route: &str, params: &BTreeMap<String, String>) -> Result<String, RouteError> {
        let mut path = String::new();
        for segment in &self.segments {
            path.push('/');
            match segment {
                Segment::Literal(literal) => path.push_str(literal),
                Segment::Str(name) | Segment::Int(name) => {
                    let value = params.get(name).ok_or_else(|| RouteError::MissingParameter {
                        route: route.to_string(),
                        param: name.clone(),
                    })?;
                    if matches!(segment, Segment::Int(_)) && parse_int(value).is_none() {
                        return Err(RouteError::InvalidParameter {
                            route: route.to_string(),
                            param: name.clone(),
                            value: value.clone(),
                        });
                    }
                    path.push_str(&urlencoding::encode(value));
                }
            }
        }
        if path.is_empty() {
            path.push('/');
        }
        Ok(path)
    }
}

/// `-?[0-9]+` within `i64` range.
pub fn parse_int(s: &str) -> Option<i64> {
    let digits = s.strip_prefix('-').unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<i64>().ok()
}

/// Leading slash added, trailing slashes dropped; the root stays `/`.
pub fn normalize(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

fn split_path(path: &str) -> Vec<&str> {
    let trimmed = path.trim_end_matches('/');
    let trimmed = trimmed.strip_prefix('/').unwrap_or(trimmed);
    if trimmed.is_empty() {
        vec![]
    } else {
        trimmed.split('/').collect()
    }
}
