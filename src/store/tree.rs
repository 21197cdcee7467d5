//! Hierarchical JSON tree operations used by the bundled stores.
//!
//! `null` and empty objects never exist in the tree: writing one removes the
//! node, and an object whose last child is removed disappears with it.

use crate::{
    error::{Result, SyncError},
    store::path::{is_valid_segment, StorePath},
};
use serde_json::{Map, Value};

/// Reads the node at `path`, `None` when nothing is stored there
pub fn get<'a>(root: &'a Value, path: &StorePath) -> Option<&'a Value> {
    let mut node = root;
    for segment in path.segments() {
        node = node.as_object()?.get(segment)?;
    }
    if is_empty(node) {
        None
    } else {
        Some(node)
    }
}

/// Replaces the node at `path`, creating intermediate objects as needed
pub fn set(root: &mut Value, path: &StorePath, value: Value) -> Result<()> {
    validate_keys(&value)?;
    let value = normalize(value);
    if value.is_null() {
        remove(root, path);
        return Ok(());
    }

    *root = set_in(std::mem::take(root), path.segments(), value);
    Ok(())
}

/// Deletes the node at `path` and prunes parents left empty
pub fn remove(root: &mut Value, path: &StorePath) {
    if path.is_root() {
        *root = Value::Null;
        return;
    }
    remove_in(root, path.segments());
}

/// Drops nulls and empty objects, recursively
pub fn normalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let map: Map<String, Value> = map
                .into_iter()
                .map(|(key, child)| (key, normalize(child)))
                .filter(|(_, child)| !is_empty(child))
                .collect();
            if map.is_empty() {
                Value::Null
            } else {
                Value::Object(map)
            }
        }
        other => other,
    }
}

fn validate_keys(value: &Value) -> Result<()> {
    if let Value::Object(map) = value {
        for (key, child) in map {
            if !is_valid_segment(key) {
                return Err(SyncError::InvalidPath(key.clone()));
            }
            validate_keys(child)?;
        }
    }
    Ok(())
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Rebuilds `node` with `value` placed at `segments`; scalars on the way become objects
fn set_in(node: Value, segments: &[String], value: Value) -> Value {
    let Some((first, rest)) = segments.split_first() else {
        return value;
    };

    let mut map = match node {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    let child = map.remove(first).unwrap_or(Value::Null);
    map.insert(first.clone(), set_in(child, rest, value));
    Value::Object(map)
}

fn remove_in(node: &mut Value, segments: &[String]) {
    let Value::Object(map) = node else {
        return;
    };
    match segments {
        [] => {}
        [last] => {
            map.remove(last);
        }
        [first, rest @ ..] => {
            let now_empty = match map.get_mut(first) {
                Some(child) => {
                    remove_in(child, rest);
                    is_empty(child)
                }
                None => false,
            };
            if now_empty {
                map.remove(first);
            }
        }
    }
}
