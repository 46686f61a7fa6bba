// Copyright 2021 Contributors to the Confidential Packaging project.
// SPDX-License-Identifier: MIT

//! Parsing of root key package documents.

use super::error::bad_format;
use super::{canonical, DisabledSigningKey, ProtectedProperties, Result, RootKeyPackage, Signature};
use crate::encoding;
use crate::keys::{KeyParameters, KeyType, RootKey, RsaParameters};

use log::debug;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeSet;

/// The largest package document that will be parsed, in bytes. Real packages hold a handful of
/// keys and signatures, and are a few kilobytes at most.
pub const MAX_PACKAGE_LENGTH: usize = 1024 * 1024;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageDocument {
    protected_properties: Value,
    signatures: Vec<SignatureEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProtectedPropertiesEntry {
    version: u64,
    #[serde(default)]
    is_test: bool,
    root_keys: Vec<RootKeyEntry>,
    #[serde(default)]
    disabled_root_keys: Vec<String>,
    #[serde(default)]
    disabled_signing_keys: Vec<DisabledSigningKeyEntry>,
}

// The key parameters are optional here so that an unrecognized key type is reported as such,
// rather than as a missing member.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RootKeyEntry {
    kid: String,
    key_type: String,
    n: Option<String>,
    e: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DisabledSigningKeyEntry {
    #[serde(rename = "hashAlg")]
    hash_alg: String,
    hash: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignatureEntry {
    signing_key_id: String,
    alg: String,
    signature: String,
}

/// Parses a root key package from JSON text.
///
/// The whole document is checked before anything is returned. Every failure is reported with a
/// specific error, and the protected properties are canonically encoded as part of parsing, so a
/// package that parses can always be verified.
pub fn parse(json: &str) -> Result<RootKeyPackage> {
    if json.trim().is_empty() {
        return Err(bad_format("the document is empty"));
    }

    if json.len() > MAX_PACKAGE_LENGTH {
        return Err(bad_format(format!(
            "the document is {} bytes long, which exceeds the limit of {} bytes",
            json.len(),
            MAX_PACKAGE_LENGTH
        )));
    }

    let document: Value =
        serde_json::from_str(json).map_err(|e| bad_format(format!("invalid JSON: {}", e)))?;
    if !document.is_object() {
        return Err(bad_format("the document is not a JSON object"));
    }

    let document: PackageDocument = from_value(document, "package")?;
    let protected_properties = parse_protected_properties(document.protected_properties)?;
    let signatures = document
        .signatures
        .into_iter()
        .map(parse_signature)
        .collect::<Result<Vec<Signature>>>()?;

    debug!(
        "Parsed root key package version {} with {} root keys and {} signatures.",
        protected_properties.version,
        protected_properties.root_keys.len(),
        signatures.len()
    );

    Ok(RootKeyPackage {
        protected_properties,
        signatures,
    })
}

/// Makes a root key from the members of a `rootKeys` entry. Built-in anchors given in
/// configuration use the same shape, and are constructed with this function too.
pub fn root_key_from_fields(
    kid: &str,
    key_type: &str,
    n: Option<&str>,
    e: Option<&str>,
) -> Result<RootKey> {
    if kid.is_empty() {
        return Err(bad_format("a root key has an empty kid"));
    }

    let parameters = match key_type.parse::<KeyType>()? {
        KeyType::Rsa => {
            let n = decode_field(n, kid, "n")?;
            let e = decode_field(e, kid, "e")?;
            let rsa = RsaParameters::new(n, e)?;
            // A key that is accepted here must be usable for verification later.
            let _ = rsa.to_public_key()?;
            KeyParameters::Rsa(rsa)
        }
    };

    Ok(RootKey::new(kid, parameters)?)
}

fn parse_protected_properties(source: Value) -> Result<ProtectedProperties> {
    if !source.is_object() {
        return Err(bad_format("protectedProperties is not a JSON object"));
    }

    // Fractional numbers have no canonical form.
    if let Some(path) = find_non_integer(&source, "protectedProperties") {
        return Err(bad_format(format!("{} is not an integer", path)));
    }

    let entry: ProtectedPropertiesEntry = from_value(source.clone(), "protectedProperties")?;

    if entry.root_keys.is_empty() {
        return Err(bad_format("rootKeys is empty"));
    }

    let mut root_keys: Vec<RootKey> = Vec::with_capacity(entry.root_keys.len());
    for key in &entry.root_keys {
        if root_keys.iter().any(|existing| existing.kid() == key.kid) {
            return Err(bad_format(format!("root key id '{}' is listed twice", key.kid)));
        }

        let root_key = root_key_from_fields(
            &key.kid,
            &key.key_type,
            key.n.as_deref(),
            key.e.as_deref(),
        )?;
        root_keys.push(root_key);
    }

    let disabled_root_keys: BTreeSet<String> = entry.disabled_root_keys.into_iter().collect();

    let mut disabled_signing_keys = BTreeSet::new();
    for key in entry.disabled_signing_keys {
        if key.hash_alg.is_empty() {
            return Err(bad_format("a disabled signing key has an empty hashAlg"));
        }
        let hash = decode_buffer(&key.hash, "disabledSigningKeys[].hash")?;
        let _ = disabled_signing_keys.insert(DisabledSigningKey::new(&key.hash_alg, hash));
    }

    let canonical = canonical::encode(&source)
        .map_err(|e| bad_format(format!("protectedProperties has no canonical encoding: {}", e)))?;

    Ok(ProtectedProperties {
        version: entry.version,
        is_test: entry.is_test,
        root_keys,
        disabled_root_keys,
        disabled_signing_keys,
        source,
        canonical,
    })
}

fn parse_signature(entry: SignatureEntry) -> Result<Signature> {
    if entry.signing_key_id.is_empty() {
        return Err(bad_format("a signature has an empty signingKeyId"));
    }

    let bytes = decode_buffer(&entry.signature, "signatures[].signature")?;
    Ok(Signature::new(&entry.signing_key_id, &entry.alg, bytes))
}

fn from_value<T: DeserializeOwned>(value: Value, context: &str) -> Result<T> {
    serde_json::from_value(value).map_err(|e| bad_format(format!("{}: {}", context, e)))
}

fn decode_field(value: Option<&str>, kid: &str, member: &str) -> Result<Vec<u8>> {
    match value {
        Some(text) => decode_buffer(text, &format!("rootKeys[{}].{}", kid, member)),
        None => Err(bad_format(format!("rootKeys[{}].{} is missing", kid, member))),
    }
}

fn decode_buffer(text: &str, context: &str) -> Result<Vec<u8>> {
    let bytes = encoding::decode_base64url(text)
        .map_err(|e| bad_format(format!("{} is not valid base64url: {}", context, e)))?;
    if bytes.is_empty() {
        return Err(bad_format(format!("{} is empty", context)));
    }
    Ok(bytes)
}

fn find_non_integer(value: &Value, path: &str) -> Option<String> {
    match value {
        Value::Number(n) if !(n.is_i64() || n.is_u64()) => Some(path.to_string()),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .find_map(|(i, item)| find_non_integer(item, &format!("{}[{}]", path, i))),
        Value::Object(map) => map
            .iter()
            .find_map(|(key, item)| find_non_integer(item, &format!("{}.{}", path, key))),
        _ => None,
    }
}
