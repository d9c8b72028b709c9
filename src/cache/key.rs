//! Deterministic cache key derivation

use std::collections::HashMap;

/// Parameter set attached to a cached resource
pub type Params = HashMap<String, String>;

/// Derives the cache key for a resource and its parameters
///
/// Parameters are sorted by name and joined as `name=value` pairs separated by
/// `&`, appended to the resource after an underscore. Any character outside
/// `[A-Za-z0-9_-]` is replaced with `_` so the key is safe to use as a file
/// name. Insertion order of `params` never affects the result.
pub fn cache_key<I, K, V>(resource: &str, params: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut pairs: Vec<(K, V)> = params.into_iter().collect();
    pairs.sort_by(|a, b| {
        a.0.as_ref()
            .cmp(b.0.as_ref())
            .then_with(|| a.1.as_ref().cmp(b.1.as_ref()))
    });

    let query = pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k.as_ref(), v.as_ref()))
        .collect::<Vec<_>>()
        .join("&");

    let raw = if query.is_empty() {
        resource.to_string()
    } else {
        format!("{}_{}", resource, query)
    };

    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
