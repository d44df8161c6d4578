//! Paths from an observed root down to a nested element

use serde_json::Value;

/// One navigation step inside a composite value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PathStep {
    /// Map entry by key
    Key(String),
    /// Sequence element by position
    Index(usize),
}

/// Follows `path` from `node`, read-only.
///
/// Returns `None` if any step fails to resolve: a missing key, an
/// out-of-range index, or a step applied to a non-composite.
pub(crate) fn resolve<'a>(mut node: &'a Value, path: &[PathStep]) -> Option<&'a Value> {
    for step in path {
        node = match step {
            PathStep::Key(key) => node.as_object()?.get(key)?,
            PathStep::Index(index) => node.as_array()?.get(*index)?,
        };
    }
    Some(node)
}

/// Follows `path` from `node`, mutably.
pub(crate) fn resolve_mut<'a>(mut node: &'a mut Value, path: &[PathStep]) -> Option<&'a mut Value> {
    for step in path {
        node = match step {
            PathStep::Key(key) => node.as_object_mut()?.get_mut(key)?,
            PathStep::Index(index) => node.as_array_mut()?.get_mut(*index)?,
        };
    }
    Some(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_path_is_root() {
        let value = json!({"a": 1});
        assert_eq!(resolve(&value, &[]), Some(&value));
    }

    #[test]
    fn test_resolve_mixed_path() {
        let value = json!({"a": [10, {"b": true}]});
        let path = vec![
            PathStep::Key("a".to_string()),
            PathStep::Index(1),
            PathStep::Key("b".to_string()),
        ];
        assert_eq!(resolve(&value, &path), Some(&json!(true)));
    }

    #[test]
    fn test_resolve_missing_key_is_none() {
        let value = json!({"a": 1});
        assert_eq!(resolve(&value, &[PathStep::Key("b".to_string())]), None);
    }

    #[test]
    fn test_resolve_index_out_of_range_is_none() {
        let value = json!([1, 2]);
        assert_eq!(resolve(&value, &[PathStep::Index(5)]), None);
    }

    #[test]
    fn test_resolve_step_into_scalar_is_none() {
        let value = json!({"a": 1});
        let path = vec![PathStep::Key("a".to_string()), PathStep::Index(0)];
        assert_eq!(resolve(&value, &path), None);
    }

    #[test]
    fn test_resolve_mut_reaches_same_node() {
        let mut value = json!({"a": [1, 2]});
        let path = vec![PathStep::Key("a".to_string()), PathStep::Index(0)];
        *resolve_mut(&mut value, &path).unwrap() = json!(9);
        assert_eq!(value, json!({"a": [9, 2]}));
    }
}
