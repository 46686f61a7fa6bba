// Copyright 2021 Contributors to the Confidential Packaging project.
// SPDX-License-Identifier: MIT

//! Signs a root key package with a local private key.
//!
//! The signature is made over the canonical encoding of the package's protected properties and
//! appended to its `signatures`. The private key is read from a PEM file, so this command is only
//! suitable for dev/test packages and for signing ceremonies on an offline machine.

use crate::error::Result;

use rootkey::keys::local::LocalSigningKey;
use rootkey::package::parse::parse;
use rootkey::package::{RootKeyPackage, Signature};
use rootkey::signature::SignatureAlgorithm;
use structopt::StructOpt;

/// Models the options required by the sign command.
#[derive(Debug, StructOpt)]
pub struct Sign {
    /// The root key package JSON file to sign. It may have an empty `signatures` list.
    #[structopt(short = "p", long = "package")]
    package_path: String,

    /// The RSA private key, as a PKCS#8 or PKCS#1 PEM file.
    #[structopt(short = "k", long = "key")]
    key_path: String,

    /// The id of the root key that the private key belongs to.
    #[structopt(long = "kid")]
    kid: String,

    /// The signature algorithm: RS256, RS384, RS512, PS256, PS384 or PS512.
    #[structopt(short = "a", long = "alg", default_value = "RS256")]
    algorithm: String,
}

impl Sign {
    fn sign(&self) -> Result<RootKeyPackage> {
        let algorithm: SignatureAlgorithm = self.algorithm.parse()?;
        let package = parse(&std::fs::read_to_string(&self.package_path)?)?;
        let key = LocalSigningKey::from_pem(&self.kid, &std::fs::read_to_string(&self.key_path)?)?;

        let signature = key.sign(package.canonical_protected_properties(), algorithm)?;
        Ok(package.with_signature(Signature::new(key.kid(), algorithm.as_str(), signature)))
    }

    /// Signs the package and writes it to standard output.
    pub fn run(&self) -> Result<()> {
        let signed = self.sign()?;
        println!("{}", signed.to_json_string()?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::subcommands::testing;
    use rootkey::keys::error::KeyError;
    use rootkey::trust::{validate, BuiltinAnchors, QuorumPolicy, TrustAnchor, TrustPolicy};

    fn sign_fixture(dir: &std::path::Path, algorithm: &str) -> Sign {
        Sign {
            package_path: testing::write_file(dir, "package.json", testing::ROOTKEY_PACKAGE_V1),
            key_path: testing::write_file(dir, "k2.pem", testing::K2_PEM),
            kid: "ADU.210609.R".to_string(),
            algorithm: algorithm.to_string(),
        }
    }

    #[test]
    fn test_signature_is_added() {
        let dir = tempfile::tempdir().unwrap();
        let signed = sign_fixture(dir.path(), "PS384").sign().unwrap();
        assert_eq!(2, signed.signatures().len());
        assert_eq!("ADU.210609.R", signed.signatures()[1].signing_key_id());
        assert_eq!("PS384", signed.signatures()[1].algorithm());

        // Both the original signer and the new signer now vouch for the package.
        let k1 = LocalSigningKey::from_pem("ADU.200702.R", testing::K1_PEM).unwrap();
        let k2 = LocalSigningKey::from_pem("ADU.210609.R", testing::K2_PEM).unwrap();
        let anchors = BuiltinAnchors::new(vec![k1.root_key().unwrap(), k2.root_key().unwrap()]);
        let policy = TrustPolicy {
            quorum: QuorumPolicy::All,
            accept_test_packages: false,
        };
        let acceptance = validate(&signed, TrustAnchor::Builtin(&anchors), &policy).unwrap();
        assert_eq!(2, acceptance.signers.len());

        // The written package parses back to the same thing.
        let text = signed.to_json_string().unwrap();
        assert_eq!(signed, parse(&text).unwrap());
    }

    #[test]
    fn test_unsupported_algorithm() {
        let dir = tempfile::tempdir().unwrap();
        match sign_fixture(dir.path(), "HS256").run().unwrap_err() {
            Error::KeyError(KeyError::UnsupportedAlgorithm(alg)) => assert_eq!("HS256", alg),
            _ => panic!("Unexpected error type."),
        }
    }
}
