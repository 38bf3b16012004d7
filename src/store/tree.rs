//! Path operations over a JSON tree, shared by every store adapter.
//!
//! Mirrors the realtime-database model: `null` never sits in the tree,
//! objects left empty by a removal are pruned, and writing through a leaf
//! replaces it with an object.

use serde_json::{Map, Value};

pub fn get<'a>(root: &'a Value, segments: &[String]) -> Option<&'a Value> {
    let mut node = root;
    for segment in segments {
        node = node.as_object()?.get(segment)?;
    }
    if node.is_null() { None } else { Some(node) }
}

/// Write `value` at `segments`. Writing `null` removes the node.
pub fn set(root: &mut Value, segments: &[String], value: Value) {
    if value.is_null() {
        remove(root, segments);
        return;
    }
    let Some((last, parents)) = segments.split_last() else {
        *root = value;
        return;
    };
    let mut node = root;
    for segment in parents {
        let Some(map) = coerce_object(node) else {
            return;
        };
        node = map
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    if let Some(map) = coerce_object(node) {
        map.insert(last.clone(), strip_nulls(value));
    }
}

/// Apply a multi-location patch below `segments`. Keys may be relative
/// paths (`"a/b"`).
pub fn update(root: &mut Value, segments: &[String], patch: Map<String, Value>) {
    for (key, value) in patch {
        let mut target = segments.to_vec();
        target.extend(
            key.split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        );
        set(root, &target, value);
    }
}

/// Remove the node at `segments`; returns whether anything was there.
pub fn remove(root: &mut Value, segments: &[String]) -> bool {
    let Some((first, rest)) = segments.split_first() else {
        let existed = !is_empty(root);
        *root = Value::Null;
        return existed;
    };
    let Some(object) = root.as_object_mut() else {
        return false;
    };
    if rest.is_empty() {
        return object.remove(first).is_some();
    }
    match object.get_mut(first) {
        Some(child) => {
            let removed = remove(child, rest);
            if is_empty(child) {
                object.remove(first);
            }
            removed
        }
        None => false,
    }
}

pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn coerce_object(node: &mut Value) -> Option<&mut Map<String, Value>> {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    node.as_object_mut()
}

fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, strip_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(strip_nulls).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn segs(path: &str) -> Vec<String> {
        path.split('/').map(str::to_string).collect()
    }

    #[test]
    fn set_creates_intermediate_objects() {
        let mut root = json!({});
        set(&mut root, &segs("orders/u1/ORD-1"), json!({ "total": 10 }));
        assert_eq!(get(&root, &segs("orders/u1/ORD-1/total")), Some(&json!(10)));
    }

    #[test]
    fn set_null_removes_and_prunes() {
        let mut root = json!({ "users": { "a": { "followers": { "b": true } } } });
        set(&mut root, &segs("users/a/followers/b"), Value::Null);
        assert_eq!(root, json!({}));
    }

    #[test]
    fn update_accepts_relative_paths() {
        let mut root = json!({ "notifications": { "u": { "n1": { "read": false }, "n2": { "read": false } } } });
        let mut patch = Map::new();
        patch.insert("n1/read".into(), json!(true));
        patch.insert("n2/read".into(), json!(true));
        update(&mut root, &segs("notifications/u"), patch);
        assert_eq!(get(&root, &segs("notifications/u/n1/read")), Some(&json!(true)));
        assert_eq!(get(&root, &segs("notifications/u/n2/read")), Some(&json!(true)));
    }

    #[test]
    fn remove_reports_missing_nodes() {
        let mut root = json!({ "blogs": { "1": { "id": 1 } } });
        assert!(!remove(&mut root, &segs("blogs/2")));
        assert!(remove(&mut root, &segs("blogs/1")));
        assert!(get(&root, &segs("blogs")).is_none());
    }
}
