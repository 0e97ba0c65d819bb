//! Cache Key Construction
//!
//! Keys must be deterministic: the same logical query always yields the same
//! string, whatever order its parameters were assembled in. Object fields are
//! sorted at every depth. Array elements are sorted too, so array-valued
//! filters such as tag lists are treated as sets (duplicates are kept).
//!
//! Callers own the key namespace. Two different queries that serialise to
//! the same key will silently share an entry.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{CacheError, Result};

// == Namespaces ==
/// Prefix shared by every paginated posts-list key
pub const POSTS_PREFIX: &str = "posts:";
/// Prefix of single-post keys
pub const POST_PREFIX: &str = "post:";
/// Prefix of user-profile keys
pub const USER_PROFILE_PREFIX: &str = "user:";
/// Category list key
pub const CATEGORIES: &str = "categories";
/// Popular tags key
pub const POPULAR_TAGS: &str = "popular-tags";

/// Key of one page of the posts list under a filter set.
///
/// ```
/// use serde_json::json;
/// let a = response_cache::keys::posts_key(2, &json!({"search": "go", "sort": "new"})).unwrap();
/// let b = response_cache::keys::posts_key(2, &json!({"sort": "new", "search": "go"})).unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a, r#"posts:2:{"search":"go","sort":"new"}"#);
/// ```
pub fn posts_key<F>(page: u32, filters: &F) -> Result<String>
where
    F: Serialize + ?Sized,
{
    Ok(format!("{POSTS_PREFIX}{page}:{}", canonical_json(filters)?))
}

pub fn post_key(id: u64) -> String {
    format!("{POST_PREFIX}{id}")
}

pub fn user_profile_key(id: u64) -> String {
    format!("{USER_PROFILE_PREFIX}{id}")
}

/// Builds `base?k1=v1&k2=v2` with parameters sorted by name.
///
/// `params` must serialise to an object (or `null`, meaning no parameters).
/// String values are written raw; everything else as canonical JSON. With no
/// parameters the key is `base` alone.
pub fn query_key<P>(base: &str, params: &P) -> Result<String>
where
    P: Serialize + ?Sized,
{
    let fields = match serde_json::to_value(params)? {
        Value::Object(fields) => fields,
        Value::Null => Map::new(),
        other => {
            return Err(CacheError::InvalidKey(format!(
                "query parameters must be an object, got {other}"
            )))
        }
    };

    if fields.is_empty() {
        return Ok(base.to_string());
    }

    let mut pairs: Vec<(String, Value)> = fields.into_iter().collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    let query = pairs
        .into_iter()
        .map(|(name, value)| match canonicalize(value) {
            Value::String(text) => format!("{name}={text}"),
            value => format!("{name}={value}"),
        })
        .collect::<Vec<_>>()
        .join("&");

    Ok(format!("{base}?{query}"))
}

/// Serialises `value` to JSON in canonical form.
pub fn canonical_json<V>(value: &V) -> Result<String>
where
    V: Serialize + ?Sized,
{
    Ok(canonicalize(serde_json::to_value(value)?).to_string())
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(fields) => {
            let mut pairs: Vec<(String, Value)> = fields
                .into_iter()
                .map(|(name, value)| (name, canonicalize(value)))
                .collect();
            // Sorted explicitly in case serde_json's preserve_order is on
            pairs.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(pairs.into_iter().collect())
        }
        Value::Array(items) => {
            let mut items: Vec<(String, Value)> = items
                .into_iter()
                .map(canonicalize)
                .map(|item| (item.to_string(), item))
                .collect();
            items.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Array(items.into_iter().map(|(_, item)| item).collect())
        }
        scalar => scalar,
    }
}
