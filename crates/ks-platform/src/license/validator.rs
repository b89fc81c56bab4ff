//! Offline License Validator
//!
//! Air-gapped installs carry a license key of the form
//! `key/<dataset>.<signature>`. The dataset is URL-safe base64 JSON
//! (`{"expiry": ..., "type": ...}`) and the signature is Ed25519 over the
//! bytes of `key/<dataset>`, checked against the configured public key.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use chrono::{DateTime, Utc};
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::shared::error::{PlatformError, Result};

const SIGNING_PREFIX: &str = "key";

/// URL-safe alphabet, padding optional on decode.
const LICENSE_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LicenseStatus {
    Active,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LicenseOrigin {
    AirGap,
}

/// Result of a license check. An unreadable key yields the empty license; a
/// well-formed key whose signature does not verify keeps the key but is
/// inactive.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct License {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<LicenseStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub license_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<LicenseOrigin>,
}

#[derive(Debug, Deserialize)]
struct LicenseDataset {
    expiry: Option<DateTime<Utc>>,
    #[serde(rename = "type")]
    license_type: Option<String>,
}

#[derive(Debug, Error)]
enum LicenseKeyError {
    #[error("license key is not of the form key/<dataset>.<signature>")]
    Malformed,

    #[error("unsupported signing prefix '{0}'")]
    UnsupportedPrefix(String),

    #[error("invalid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("signature does not verify")]
    BadSignature,

    #[error("dataset has no expiry")]
    MissingExpiry,

    #[error("invalid dataset: {0}")]
    Dataset(#[from] serde_json::Error),
}

pub struct LicenseValidator {
    verifying_key: VerifyingKey,
}

impl LicenseValidator {
    /// Validator for keys signed by the holder of `verification_key`
    /// (hex-encoded 32-byte Ed25519 public key).
    pub fn from_hex(verification_key: &str) -> Result<Self> {
        let bytes = hex::decode(verification_key.trim()).map_err(|e| {
            PlatformError::validation(format!("License verification key is not hex: {}", e))
        })?;
        let bytes: [u8; 32] = bytes.try_into().map_err(|_| {
            PlatformError::validation("License verification key must be 32 bytes")
        })?;
        let verifying_key = VerifyingKey::from_bytes(&bytes).map_err(|e| {
            PlatformError::validation(format!("Invalid license verification key: {}", e))
        })?;

        Ok(Self { verifying_key })
    }

    pub fn check(&self, license_key: &str) -> License {
        self.check_at(license_key, Utc::now())
    }

    pub fn check_at(&self, license_key: &str, now: DateTime<Utc>) -> License {
        let license_key = license_key.trim();
        if license_key.is_empty() {
            return License::default();
        }

        match self.verify(license_key) {
            Ok((expiry, license_type)) => {
                let active = now < expiry;
                License {
                    key: Some(license_key.to_string()),
                    active,
                    status: Some(if active { LicenseStatus::Active } else { LicenseStatus::Expired }),
                    expiry: Some(expiry),
                    license_type,
                    origin: Some(LicenseOrigin::AirGap),
                }
            }
            Err(LicenseKeyError::BadSignature | LicenseKeyError::MissingExpiry) => {
                debug!("License key is invalid");
                License {
                    key: Some(license_key.to_string()),
                    ..License::default()
                }
            }
            Err(e) => {
                debug!(error = %e, "Unreadable license key");
                License::default()
            }
        }
    }

    fn verify(&self, license_key: &str) -> std::result::Result<(DateTime<Utc>, Option<String>), LicenseKeyError> {
        let (signing_data, encoded_signature) = license_key
            .split_once('.')
            .ok_or(LicenseKeyError::Malformed)?;
        let (prefix, encoded_dataset) = signing_data
            .split_once('/')
            .ok_or(LicenseKeyError::Malformed)?;
        if prefix != SIGNING_PREFIX {
            return Err(LicenseKeyError::UnsupportedPrefix(prefix.to_string()));
        }

        let signature_bytes = LICENSE_BASE64.decode(encoded_signature)?;
        let signature = Signature::from_slice(&signature_bytes)
            .map_err(|_| LicenseKeyError::BadSignature)?;
        self.verifying_key
            .verify(signing_data.as_bytes(), &signature)
            .map_err(|_| LicenseKeyError::BadSignature)?;

        let dataset: LicenseDataset = serde_json::from_slice(&LICENSE_BASE64.decode(encoded_dataset)?)?;
        let expiry = dataset.expiry.ok_or(LicenseKeyError::MissingExpiry)?;
        Ok((expiry, dataset.license_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ed25519_dalek::{Signer, SigningKey};

    fn signing_key() -> SigningKey {
        SigningKey::from_bytes(&[7u8; 32])
    }

    fn validator() -> LicenseValidator {
        LicenseValidator::from_hex(&hex::encode(signing_key().verifying_key().to_bytes())).unwrap()
    }

    fn license_key(prefix: &str, dataset: &str, key: &SigningKey) -> String {
        let signing_data = format!("{}/{}", prefix, LICENSE_BASE64.encode(dataset));
        let signature = key.sign(signing_data.as_bytes());
        format!("{}.{}", signing_data, LICENSE_BASE64.encode(signature.to_bytes()))
    }

    fn at(year: i32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).unwrap()
    }

    const DATASET: &str = r#"{"expiry":"2030-01-01T00:00:00Z","type":"ENTERPRISE"}"#;

    #[test]
    fn test_valid_key_is_active() {
        let key = license_key("key", DATASET, &signing_key());
        let license = validator().check_at(&key, at(2029));

        assert!(license.active);
        assert_eq!(license.status, Some(LicenseStatus::Active));
        assert_eq!(license.expiry, Some(at(2030)));
        assert_eq!(license.license_type.as_deref(), Some("ENTERPRISE"));
        assert_eq!(license.origin, Some(LicenseOrigin::AirGap));
        assert_eq!(license.key.as_deref(), Some(key.as_str()));
    }

    #[test]
    fn test_past_expiry_is_expired() {
        let key = license_key("key", DATASET, &signing_key());
        let license = validator().check_at(&key, at(2031));

        assert!(!license.active);
        assert_eq!(license.status, Some(LicenseStatus::Expired));
    }

    #[test]
    fn test_unknown_prefix_yields_empty_license() {
        let key = license_key("lic", DATASET, &signing_key());
        assert_eq!(validator().check_at(&key, at(2029)), License::default());
    }

    #[test]
    fn test_foreign_signature_keeps_key_inactive() {
        let forged = SigningKey::from_bytes(&[9u8; 32]);
        let key = license_key("key", DATASET, &forged);
        let license = validator().check_at(&key, at(2029));

        assert!(!license.active);
        assert_eq!(license.status, None);
        assert_eq!(license.key.as_deref(), Some(key.as_str()));
    }

    #[test]
    fn test_tampered_dataset_fails_signature() {
        let key = license_key("key", DATASET, &signing_key());
        let (_, signature) = key.split_once('.').unwrap();
        let other = LICENSE_BASE64.encode(r#"{"expiry":"2099-01-01T00:00:00Z"}"#);
        let tampered = format!("key/{}.{}", other, signature);

        let license = validator().check_at(&tampered, at(2029));
        assert!(!license.active);
        assert!(license.expiry.is_none());
    }

    #[test]
    fn test_missing_expiry_is_invalid() {
        let key = license_key("key", r#"{"type":"TRIAL"}"#, &signing_key());
        let license = validator().check_at(&key, at(2029));
        assert!(!license.active);
        assert_eq!(license.key.as_deref(), Some(key.as_str()));
    }

    #[test]
    fn test_malformed_and_empty_keys() {
        assert_eq!(validator().check_at("not-a-license", at(2029)), License::default());
        assert_eq!(validator().check_at("  ", at(2029)), License::default());
    }

    #[test]
    fn test_padded_signature_accepted() {
        let key = license_key("key", DATASET, &signing_key());
        let padded = format!("{}==", key);
        assert!(validator().check_at(&padded, at(2029)).active);
    }

    #[test]
    fn test_verification_key_must_be_32_byte_hex() {
        assert!(LicenseValidator::from_hex("zz").is_err());
        assert!(LicenseValidator::from_hex("abcd").is_err());
    }
}
