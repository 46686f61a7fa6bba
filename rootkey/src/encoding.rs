// Copyright 2021 Contributors to the Confidential Packaging project.
// SPDX-License-Identifier: MIT

//! Transport encodings for byte buffers carried inside JSON documents.

use base64::DecodeError;

/// Decodes a base64url string without padding, which is how the root key package carries all of
/// its byte buffers. Padding characters and characters from the standard (non-URL) alphabet are
/// rejected rather than tolerated.
pub(crate) fn decode_base64url(value: &str) -> Result<Vec<u8>, DecodeError> {
    if let Some(offset) = value.find('=') {
        return Err(DecodeError::InvalidByte(offset, b'='));
    }
    base64::decode_config(value, base64::URL_SAFE_NO_PAD)
}

/// Encodes bytes as base64url without padding.
pub(crate) fn encode_base64url(bytes: &[u8]) -> String {
    base64::encode_config(bytes, base64::URL_SAFE_NO_PAD)
}

/// Decodes a base64 string in either alphabet, with or without padding.
///
/// Signing key payloads found in deployed update manifests are not consistent about which
/// alphabet they use for the modulus, so this is only used for those payloads.
pub(crate) fn decode_base64_any(value: &str) -> Result<Vec<u8>, DecodeError> {
    let trimmed = value.trim_end_matches('=');
    if trimmed.contains(|c| c == '+' || c == '/') {
        base64::decode_config(trimmed, base64::STANDARD_NO_PAD)
    } else {
        base64::decode_config(trimmed, base64::URL_SAFE_NO_PAD)
    }
}
