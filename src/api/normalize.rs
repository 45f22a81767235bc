//! Collapses the vendor's `<Field><item>..</item></Field>` list encoding.
//!
//! A generic XML decode cannot tell a one-element list from a plain nested
//! object: `<Set><item>..</item></Set>` decodes to `{"Set": {"item": {..}}}`
//! while two items decode to `{"Set": {"item": [{..}, {..}]}}`. This pass
//! rewrites both shapes to `{"Set": [..]}`, drops empty optional fields and
//! keeps pagination tokens that lived on the wrapper.

use crate::api::tree::ResponseTree;
use std::collections::BTreeMap;

/// Marker field the vendor wraps every list element in.
pub const ITEM_KEY: &str = "item";

/// Continuation token fields carried by list wrappers, in both casings the API uses.
pub const PAGINATION_KEYS: [&str; 2] = ["nextToken", "NextToken"];

/// The one wrapper whose single item is kept as an object instead of becoming
/// a one-element list. The API encodes the bulk instance listing as an
/// object-of-items at this level.
///
/// Idempotence does not hold for this field when the lone item itself has an
/// `item` field: the next pass reads the kept object as a wrapper and
/// collapses it again.
pub const OBJECT_OF_ITEMS_FIELD: &str = "instancesSet";

/// Normalizes a decoded tree, depth first.
pub fn normalize(tree: ResponseTree) -> ResponseTree {
    match tree {
        ResponseTree::Object(fields) => ResponseTree::Object(normalize_fields(fields)),
        ResponseTree::Array(items) => ResponseTree::Array(items.into_iter().map(normalize).collect()),
        text => text,
    }
}

fn normalize_fields(fields: BTreeMap<String, ResponseTree>) -> BTreeMap<String, ResponseTree> {
    let mut out = BTreeMap::new();
    let mut hoisted = Vec::new();

    for (key, value) in fields {
        match value {
            ResponseTree::Text(text) if text.is_empty() => {}
            ResponseTree::Object(mut wrapper) => match wrapper.remove(ITEM_KEY) {
                Some(item) => {
                    hoisted.extend(pagination_tokens(&wrapper));
                    let list = collapse_items(&key, item);
                    out.insert(key, list);
                }
                None => {
                    out.insert(key, ResponseTree::Object(normalize_fields(wrapper)));
                }
            },
            other => {
                out.insert(key, normalize(other));
            }
        }
    }

    for (key, token) in hoisted {
        out.insert(key.to_string(), ResponseTree::Text(token));
    }

    out
}

fn collapse_items(field: &str, item: ResponseTree) -> ResponseTree {
    match item {
        ResponseTree::Array(items) => ResponseTree::Array(items.into_iter().map(normalize).collect()),
        single if field == OBJECT_OF_ITEMS_FIELD => normalize(single),
        single => ResponseTree::Array(vec![normalize(single)]),
    }
}

fn pagination_tokens(wrapper: &BTreeMap<String, ResponseTree>) -> Vec<(&'static str, String)> {
    PAGINATION_KEYS
        .iter()
        .filter_map(|&key| match wrapper.get(key) {
            Some(ResponseTree::Text(token)) if !token.is_empty() => Some((key, token.clone())),
            _ => None,
        })
        .collect()
}
