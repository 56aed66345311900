//! Field-by-field merging of configuration tiers.
//!
//! Objects merge recursively; scalars and arrays from the later tier win.

use serde_json::Value;

/// Deep merge two values, with `overlay` taking precedence over `base`.
///
/// A `null` overlay means "not specified" and keeps the base value.
///
/// # Example
/// ```
/// use serde_json::json;
/// use devboard::config::deep_merge;
///
/// let base = json!({"server": {"port": 3000, "host": "127.0.0.1"}});
/// let overlay = json!({"server": {"port": 8080}});
/// let merged = deep_merge(base, overlay);
/// assert_eq!(merged, json!({"server": {"port": 8080, "host": "127.0.0.1"}}));
/// ```
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut merged), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                let next = match merged.remove(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value,
                };
                merged.insert(key, next);
            }
            Value::Object(merged)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}

/// Fold `deep_merge` over tiers ordered lowest to highest priority.
pub fn deep_merge_all(values: impl IntoIterator<Item = Value>) -> Value {
    values.into_iter().fold(Value::Null, deep_merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_sections_merge() {
        let base = json!({
            "server": {"host": "127.0.0.1", "port": 3000},
            "retention": {"days": 30, "enabled": true}
        });
        let overlay = json!({"retention": {"days": 7}});
        assert_eq!(
            deep_merge(base, overlay),
            json!({
                "server": {"host": "127.0.0.1", "port": 3000},
                "retention": {"days": 7, "enabled": true}
            })
        );
    }

    #[test]
    fn test_null_keeps_base() {
        let merged = deep_merge(json!({"retention": {"cron_secret": "s"}}), json!({"retention": null}));
        assert_eq!(merged, json!({"retention": {"cron_secret": "s"}}));
    }

    #[test]
    fn test_scalar_replaces_object() {
        assert_eq!(deep_merge(json!({"a": {"b": 1}}), json!({"a": 5})), json!({"a": 5}));
    }

    #[test]
    fn test_merge_all_later_tier_wins() {
        let merged = deep_merge_all(vec![
            json!({"server": {"port": 3000}}),
            json!({"server": {"port": 4000}}),
            json!({"server": {"port": 5000, "host": "0.0.0.0"}}),
        ]);
        assert_eq!(merged, json!({"server": {"port": 5000, "host": "0.0.0.0"}}));
    }

    #[test]
    fn test_merge_all_empty_is_null() {
        assert_eq!(deep_merge_all(Vec::<Value>::new()), Value::Null);
    }
}
