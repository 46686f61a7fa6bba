// Copyright 2021 Contributors to the Confidential Packaging project.
// SPDX-License-Identifier: MIT

//! The canonical encoding of a package's protected properties.
//!
//! Signatures in a root key package are computed over the canonical encoding of the
//! `protectedProperties` object, never over the text of the document as it was transported. The
//! encoding is [OLPC canonical JSON](http://wiki.laptop.org/go/Canonical_JSON):
//!
//! - Object members are sorted by key, comparing the keys as UTF-8 byte strings.
//! - There is no insignificant whitespace. Members are separated by `,` and keys from values by
//!   `:`.
//! - Only `"` and `\` are escaped in strings. Every other character is written as literal UTF-8.
//! - Numbers are integers, written in shortest decimal form. Other numbers cannot be encoded, and
//!   the parser rejects them inside the protected properties.
//! - Array elements keep their order.
//!
//! Any deviation from these rules would break every signature, so they must not change.

use olpc_cjson::CanonicalFormatter;
use serde::Serialize;
use serde_json::Value;

/// Encodes a JSON value in canonical form. Fails if the value holds a number that is not an
/// integer.
pub fn encode(value: &Value) -> serde_json::Result<Vec<u8>> {
    let mut data = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut data, CanonicalFormatter::new());
    value.serialize(&mut ser)?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::encode;
    use crate::testing;
    use serde_json::{json, Value};

    #[test]
    fn test_members_are_sorted() {
        let value = json!({"version": 1, "rootKeys": [], "disabledRootKeys": ["b", "a"]});
        assert_eq!(
            br#"{"disabledRootKeys":["b","a"],"rootKeys":[],"version":1}"#.to_vec(),
            encode(&value).unwrap()
        );
    }

    #[test]
    fn test_nested_members_are_sorted() {
        let value = json!({"b": {"z": true, "a": null}, "a": [{"y": 1, "x": 2}]});
        assert_eq!(br#"{"a":[{"x":2,"y":1}],"b":{"a":null,"z":true}}"#.to_vec(), encode(&value).unwrap());
    }

    #[test]
    fn test_sort_is_bytewise() {
        // Upper-case letters sort before lower-case ones, and multi-byte characters last.
        let value = json!({"b": 1, "B": 2, "é": 3, "a": 4});
        assert_eq!("{\"B\":2,\"a\":4,\"b\":1,\"é\":3}".as_bytes().to_vec(), encode(&value).unwrap());
    }

    #[test]
    fn test_string_escapes() {
        let value = Value::String("q\"b\\/ü".to_string());
        assert_eq!("\"q\\\"b\\\\/ü\"".as_bytes().to_vec(), encode(&value).unwrap());
    }

    #[test]
    fn test_fractional_numbers_cannot_be_encoded() {
        assert!(encode(&json!({"version": 1.5})).is_err());
    }

    #[test]
    fn test_integers() {
        let value = json!([0, 18446744073709551615_u64, -42]);
        assert_eq!(b"[0,18446744073709551615,-42]".to_vec(), encode(&value).unwrap());
    }

    #[test]
    fn test_formatting_is_ignored() {
        let a: Value = serde_json::from_str("{ \"version\" : 1 ,\n \"isTest\":false }").unwrap();
        let b: Value = serde_json::from_str("{\"isTest\":false,\"version\":1}").unwrap();
        assert_eq!(encode(&a).unwrap(), encode(&b).unwrap());
    }

    #[test]
    fn test_fixture_canonical_bytes() {
        // The fixture was encoded and signed by an external tool.
        let document: Value = serde_json::from_str(testing::ROOTKEY_PACKAGE_V1).unwrap();
        assert_eq!(testing::CANONICAL_V1.to_vec(), encode(&document["protectedProperties"]).unwrap());

        let reordered: Value = serde_json::from_str(testing::ROOTKEY_PACKAGE_V1_REORDERED).unwrap();
        assert_eq!(testing::CANONICAL_V1.to_vec(), encode(&reordered["protectedProperties"]).unwrap());
    }
}
