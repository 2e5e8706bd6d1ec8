//! Signed QR label payloads: `base64url(json) "." hex(hmac_sha256(secret, body))`.

use std::collections::BTreeMap;

use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine,
};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::warn;

use crate::config::{Config, ConfigError};
use crate::domain::models::spool::Spool;
use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

const MAX_PAYLOAD_LEN: usize = 4096;
const ID_FIELD: &str = "id";

const BODY_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QrError {
    #[error("malformed QR payload: {0}")]
    MalformedPayload(String),
    #[error("QR signature mismatch")]
    InvalidSignature,
    #[error("QR payload lacks required field '{0}'")]
    MissingRequiredField(&'static str),
}

impl From<QrError> for AppError {
    fn from(_: QrError) -> Self {
        AppError::InvalidQrCode
    }
}

/// Flat string -> scalar record printed on a spool label. Keys serialize in sorted order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QrRecord(BTreeMap<String, Value>);

impl QrRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn for_spool(spool: &Spool, plastic_type: &str, group: Option<&str>) -> Self {
        let record = Self::new()
            .with(ID_FIELD, spool.id)
            .with("plastic_type", plastic_type)
            .with("color", spool.color.as_str());
        match group {
            Some(name) => record.with("group", name),
            None => record,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn spool_id(&self) -> Option<i64> {
        self.0.get(ID_FIELD).and_then(Value::as_i64)
    }
}

pub struct QrCodec {
    mac: HmacSha256,
}

impl QrCodec {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        Self::from_secret(config.auth_secret_key.as_bytes())
    }

    pub fn from_secret(secret: &[u8]) -> Result<Self, ConfigError> {
        let mac = HmacSha256::new_from_slice(secret).map_err(|e| ConfigError::Invalid {
            key: "AUTH_SECRET_KEY",
            reason: e.to_string(),
        })?;
        Ok(Self { mac })
    }

    fn sign(&self, body: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(body.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    pub fn encode(&self, record: &QrRecord) -> Result<String, QrError> {
        if let Some((key, _)) = record.0.iter().find(|(_, v)| v.is_array() || v.is_object()) {
            return Err(QrError::MalformedPayload(format!("field '{}' is not a scalar", key)));
        }

        let json = serde_json::to_vec(&record.0).map_err(|e| QrError::MalformedPayload(e.to_string()))?;
        let body = BODY_ENGINE.encode(json);
        let signature = self.sign(&body);
        Ok(format!("{}.{}", body, signature))
    }

    pub fn decode(&self, payload: &str) -> Result<QrRecord, QrError> {
        let payload = payload.trim();
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(QrError::MalformedPayload("payload exceeds max length".to_string()));
        }

        let mut parts = payload.split('.');
        let (body, signature) = match (parts.next(), parts.next(), parts.next()) {
            (Some(body), Some(signature), None) => (body, signature),
            _ => return Err(QrError::MalformedPayload("expected exactly one '.' separator".to_string())),
        };

        let expected = self.sign(body);
        if !bool::from(expected.as_bytes().ct_eq(signature.as_bytes())) {
            return Err(QrError::InvalidSignature);
        }

        let json = BODY_ENGINE
            .decode(body)
            .map_err(|e| QrError::MalformedPayload(e.to_string()))?;
        let fields: BTreeMap<String, Value> =
            serde_json::from_slice(&json).map_err(|e| QrError::MalformedPayload(e.to_string()))?;

        if !fields.contains_key(ID_FIELD) {
            return Err(QrError::MissingRequiredField(ID_FIELD));
        }

        Ok(QrRecord(fields))
    }

    /// Decodes a scanned label down to its spool id. Every failure surfaces as
    /// `InvalidQrCode`; the specific reason is only logged.
    pub fn resolve(&self, payload: &str) -> Result<i64, AppError> {
        let record = self.decode(payload).map_err(|e| {
            warn!(reason = %e, "QR payload rejected");
            AppError::from(e)
        })?;

        record.spool_id().ok_or_else(|| {
            warn!("QR payload rejected: id is not an integer");
            AppError::InvalidQrCode
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> QrCodec {
        QrCodec::from_secret(b"label-secret").unwrap()
    }

    fn spool_record() -> QrRecord {
        QrRecord::new()
            .with("id", 42)
            .with("plastic_type", "PLA")
            .with("group", "GroupA")
    }

    #[test]
    fn test_round_trip() {
        let codec = codec();
        let record = spool_record().with("color", "Galaxy Black").with("weight", 750.5);
        let payload = codec.encode(&record).unwrap();
        assert_eq!(codec.decode(&payload).unwrap(), record);
    }

    #[test]
    fn test_spool_scenario_decodes_to_minted_record() {
        let codec = codec();
        let payload = codec.encode(&spool_record()).unwrap();

        let decoded = codec.decode(&payload).unwrap();
        assert_eq!(decoded.get("id"), Some(&Value::from(42)));
        assert_eq!(decoded.get("plastic_type"), Some(&Value::from("PLA")));
        assert_eq!(decoded.get("group"), Some(&Value::from("GroupA")));
        assert_eq!(codec.resolve(&payload).unwrap(), 42);
    }

    #[test]
    fn test_payload_shape() {
        let payload = codec().encode(&spool_record()).unwrap();
        let (body, signature) = payload.split_once('.').unwrap();
        assert!(!body.contains('='));
        assert_eq!(signature.len(), 64);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));

        let json = BODY_ENGINE.decode(body).unwrap();
        assert_eq!(String::from_utf8(json).unwrap(), r#"{"group":"GroupA","id":42,"plastic_type":"PLA"}"#);
    }

    #[test]
    fn test_any_single_character_change_is_rejected() {
        let codec = codec();
        let payload = codec.encode(&spool_record()).unwrap();
        let original: Vec<char> = payload.chars().collect();

        for i in 0..original.len() {
            if original[i] == '.' {
                continue;
            }
            for replacement in ['A', 'f', '0', '-', '_', 'F', '='] {
                if replacement == original[i] {
                    continue;
                }
                let mut altered = original.clone();
                altered[i] = replacement;
                let altered: String = altered.into_iter().collect();
                match codec.decode(&altered) {
                    Err(QrError::InvalidSignature) | Err(QrError::MalformedPayload(_)) => {}
                    other => panic!("position {} -> {:?} decoded to {:?}", i, replacement, other),
                }
            }
        }
    }

    #[test]
    fn test_tampered_signature_resolves_to_invalid_qr_code() {
        let codec = codec();
        let payload = codec.encode(&spool_record()).unwrap();
        let mut flipped = payload.clone();
        let last = flipped.pop().unwrap();
        flipped.push(if last == '0' { '1' } else { '0' });

        assert_eq!(codec.decode(&flipped), Err(QrError::InvalidSignature));
        assert!(matches!(codec.resolve(&flipped), Err(AppError::InvalidQrCode)));
    }

    #[test]
    fn test_other_secret_is_rejected() {
        let payload = codec().encode(&spool_record()).unwrap();
        let other = QrCodec::from_secret(b"another-secret").unwrap();
        assert_eq!(other.decode(&payload), Err(QrError::InvalidSignature));
    }

    #[test]
    fn test_separator_count_must_be_one() {
        let codec = codec();
        let payload = codec.encode(&spool_record()).unwrap();
        assert!(matches!(codec.decode("no-separator"), Err(QrError::MalformedPayload(_))));
        assert!(matches!(codec.decode(&format!("{}.extra", payload)), Err(QrError::MalformedPayload(_))));
        assert!(matches!(codec.decode(""), Err(QrError::MalformedPayload(_))));
    }

    #[test]
    fn test_signed_garbage_body_is_malformed() {
        let codec = codec();
        let not_json = BODY_ENGINE.encode(b"not json");
        let payload = format!("{}.{}", not_json, codec.sign(&not_json));
        assert!(matches!(codec.decode(&payload), Err(QrError::MalformedPayload(_))));

        let bad_base64 = "!!!";
        let payload = format!("{}.{}", bad_base64, codec.sign(bad_base64));
        assert!(matches!(codec.decode(&payload), Err(QrError::MalformedPayload(_))));

        let array = BODY_ENGINE.encode(b"[1,2]");
        let payload = format!("{}.{}", array, codec.sign(&array));
        assert!(matches!(codec.decode(&payload), Err(QrError::MalformedPayload(_))));
    }

    #[test]
    fn test_padded_body_is_accepted() {
        let codec = codec();
        let padded = base64::engine::general_purpose::URL_SAFE.encode(br#"{"id":7}"#);
        assert!(padded.ends_with('='));
        let payload = format!("{}.{}", padded, codec.sign(&padded));
        assert_eq!(codec.resolve(&payload).unwrap(), 7);
    }

    #[test]
    fn test_missing_id_is_reported() {
        let codec = codec();
        let payload = codec.encode(&QrRecord::new().with("color", "red")).unwrap();
        assert_eq!(codec.decode(&payload), Err(QrError::MissingRequiredField("id")));
        assert!(matches!(codec.resolve(&payload), Err(AppError::InvalidQrCode)));
    }

    #[test]
    fn test_non_integer_id_does_not_resolve() {
        let codec = codec();
        let payload = codec.encode(&QrRecord::new().with("id", "42")).unwrap();
        assert!(codec.decode(&payload).is_ok());
        assert!(matches!(codec.resolve(&payload), Err(AppError::InvalidQrCode)));
    }

    #[test]
    fn test_nested_values_are_refused() {
        let record = QrRecord::new().with("id", 1).with("tags", vec!["a", "b"]);
        assert!(matches!(codec().encode(&record), Err(QrError::MalformedPayload(_))));
    }

    #[test]
    fn test_oversized_payload_is_malformed() {
        let huge = "a".repeat(MAX_PAYLOAD_LEN + 1);
        assert!(matches!(codec().decode(&huge), Err(QrError::MalformedPayload(_))));
    }
}
