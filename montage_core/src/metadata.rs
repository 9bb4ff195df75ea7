// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Free-form metadata attached to nodes, markers, effects and media.
//!
//! Metadata is a string-keyed map of JSON values. With the `std` feature the
//! map preserves insertion order; without it keys iterate in sorted order.

use alloc::string::String;

pub use serde_json::Value;

/// A string-keyed dictionary of dynamic values.
pub type Metadata = serde_json::Map<String, Value>;

/// Builds a [`Metadata`] map from key/value pairs.
///
/// Later pairs overwrite earlier ones with the same key.
#[must_use]
pub fn from_pairs<K, V, I>(pairs: I) -> Metadata
where
    K: Into<String>,
    V: Into<Value>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_pairs_win() {
        let md = from_pairs([("a", Value::from(1)), ("b", Value::from("x")), ("a", Value::from(2))]);
        assert_eq!(md.len(), 2);
        assert_eq!(md.get("a"), Some(&Value::from(2)));
        assert_eq!(md.get("b").and_then(Value::as_str), Some("x"));
    }

    #[test]
    fn nested_values_compare_structurally() {
        let inner = from_pairs([("rate", 24.0)]);
        let a = from_pairs([("clip", Value::Object(inner.clone()))]);
        let b = from_pairs([("clip", Value::Object(inner))]);
        assert_eq!(a, b);
    }
}
