//! The structured, field-by-field form of a transaction.
//!
//! Values are kept close to what a caller hands in (quantities as `U256`,
//! byte fields as raw bytes) so that length and range checks happen in the
//! codec and produce typed errors.

use core::{fmt, ops::Deref};

use ethereum_types::U256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, TransactionError};

/// Transaction mapping, with the JSON field names used by wallets and RPC.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TransactionRequest {
	/// Explicit type discriminant. Inferred from the other fields when absent.
	#[serde(rename = "type", default, with = "quantity", skip_serializing_if = "Option::is_none")]
	pub transaction_type: Option<U256>,
	#[serde(default, with = "quantity", skip_serializing_if = "Option::is_none")]
	pub chain_id: Option<U256>,
	#[serde(default, with = "quantity", skip_serializing_if = "Option::is_none")]
	pub nonce: Option<U256>,
	/// Gas limit.
	#[serde(default, with = "quantity", skip_serializing_if = "Option::is_none")]
	pub gas: Option<U256>,
	#[serde(default, with = "quantity", skip_serializing_if = "Option::is_none")]
	pub gas_price: Option<U256>,
	#[serde(default, with = "quantity", skip_serializing_if = "Option::is_none")]
	pub max_priority_fee_per_gas: Option<U256>,
	#[serde(default, with = "quantity", skip_serializing_if = "Option::is_none")]
	pub max_fee_per_gas: Option<U256>,
	/// Recipient. Absent or empty means contract creation.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub to: Option<HexBytes>,
	#[serde(default, with = "quantity", skip_serializing_if = "Option::is_none")]
	pub value: Option<U256>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data: Option<HexBytes>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub access_list: Option<Vec<AccessListEntry>>,
	#[serde(default, with = "quantity", skip_serializing_if = "Option::is_none")]
	pub v: Option<U256>,
	#[serde(default, with = "quantity", skip_serializing_if = "Option::is_none")]
	pub r: Option<U256>,
	#[serde(default, with = "quantity", skip_serializing_if = "Option::is_none")]
	pub s: Option<U256>,
}

impl TransactionRequest {
	/// Parse a JSON object. Unknown keys and unparsable values are
	/// reported as invalid fields.
	pub fn from_json(json: &str) -> Result<Self> {
		serde_json::from_str(json)
			.map_err(|err| TransactionError::invalid_field("request", err.to_string()))
	}

	pub fn to_json(&self) -> Result<String> {
		serde_json::to_string(self)
			.map_err(|err| TransactionError::invalid_field("request", err.to_string()))
	}

	/// Whether any of `v`, `r`, `s` is set.
	pub fn has_signature_fields(&self) -> bool {
		self.v.is_some() || self.r.is_some() || self.s.is_some()
	}

	/// Copy of the request with `v`, `r`, `s` removed.
	pub fn without_signature(&self) -> Self {
		Self {
			v: None,
			r: None,
			s: None,
			..self.clone()
		}
	}
}

/// One access list entry as given by the caller.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AccessListEntry {
	pub address: HexBytes,
	#[serde(default)]
	pub storage_keys: Vec<HexBytes>,
}

/// Byte string carried as `0x`-prefixed, even-length hex.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct HexBytes(pub Vec<u8>);

impl Deref for HexBytes {
	type Target = [u8];

	fn deref(&self) -> &[u8] {
		&self.0
	}
}

impl From<Vec<u8>> for HexBytes {
	fn from(bytes: Vec<u8>) -> Self {
		Self(bytes)
	}
}

impl From<&[u8]> for HexBytes {
	fn from(bytes: &[u8]) -> Self {
		Self(bytes.to_vec())
	}
}

impl fmt::Debug for HexBytes {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "0x{}", hex::encode(&self.0))
	}
}

impl Serialize for HexBytes {
	fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
		serializer.serialize_str(&format!("0x{}", hex::encode(&self.0)))
	}
}

impl<'de> Deserialize<'de> for HexBytes {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
		let text = String::deserialize(deserializer)?;
		parse_hex_bytes(&text)
			.map(HexBytes)
			.map_err(serde::de::Error::custom)
	}
}

/// Decode `0x`-prefixed hex. The empty string is accepted as no bytes.
pub fn parse_hex_bytes(text: &str) -> core::result::Result<Vec<u8>, String> {
	if text.is_empty() {
		return Ok(Vec::new());
	}
	let digits = strip_hex_prefix(text)?;
	hex::decode(digits).map_err(|err| format!("invalid hex byte string {:?}: {}", text, err))
}

/// Parse a `0x`-prefixed hex quantity. Odd digit counts are accepted.
pub fn parse_quantity(text: &str) -> core::result::Result<U256, String> {
	let digits = strip_hex_prefix(text)?;
	if digits.is_empty() {
		return Ok(U256::zero());
	}
	if digits.len() > 64 {
		return Err(format!("quantity {:?} exceeds 256 bits", text));
	}
	U256::from_str_radix(digits, 16).map_err(|_| format!("invalid hex quantity {:?}", text))
}

fn strip_hex_prefix(text: &str) -> core::result::Result<&str, String> {
	text.strip_prefix("0x")
		.or_else(|| text.strip_prefix("0X"))
		.ok_or_else(|| format!("missing 0x prefix in {:?}", text))
}

/// Serde adapter for optional quantities: JSON integers or hex strings in,
/// minimal hex strings out.
pub(crate) mod quantity {
	use ethereum_types::U256;
	use serde::{de::Error as _, Deserialize, Deserializer, Serializer};
	use serde_json::Value;

	pub fn serialize<S: Serializer>(
		value: &Option<U256>,
		serializer: S,
	) -> Result<S::Ok, S::Error> {
		match value {
			Some(value) => serializer.serialize_str(&format!("{:#x}", value)),
			None => serializer.serialize_none(),
		}
	}

	/// JSON integers keep their full decimal text (`arbitrary_precision`),
	/// so amounts above `u64::MAX` parse exactly.
	pub fn deserialize<'de, D: Deserializer<'de>>(
		deserializer: D,
	) -> Result<Option<U256>, D::Error> {
		match Option::<Value>::deserialize(deserializer)? {
			None => Ok(None),
			Some(Value::Number(number)) => {
				U256::from_dec_str(&number.to_string()).map(Some).map_err(|_| {
					D::Error::custom(format!("{} is not a 256-bit unsigned integer", number))
				})
			}
			Some(Value::String(text)) => {
				super::parse_quantity(&text).map(Some).map_err(D::Error::custom)
			}
			Some(other) => Err(D::Error::custom(format!(
				"expected an integer or a hex string, got {}",
				other
			))),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn quantities_accept_integers_and_hex() {
		let request = TransactionRequest::from_json(
			r#"{"nonce": "0x2", "gas": 100000, "value": "0x5af3107a4000", "type": "0x2"}"#,
		)
		.unwrap();
		assert_eq!(request.nonce, Some(2.into()));
		assert_eq!(request.gas, Some(100_000.into()));
		assert_eq!(request.value, Some(0x5af3107a4000_u64.into()));
		assert_eq!(request.transaction_type, Some(2.into()));
		assert_eq!(request.gas_price, None);
	}

	#[test]
	fn integer_quantities_above_u64() {
		let request = TransactionRequest::from_json(
			r#"{"nonce": 0, "gasPrice": 1, "gas": 21000, "value": 100000000000000000000}"#,
		)
		.unwrap();
		assert_eq!(request.value, Some(U256::from(100_u64) * U256::exp10(18)));

		let max = U256::max_value().to_string();
		let request = TransactionRequest::from_json(&format!(r#"{{"value": {}}}"#, max)).unwrap();
		assert_eq!(request.value, Some(U256::max_value()));

		let too_big = format!(r#"{{"value": {}0}}"#, max);
		let rejected = [
			too_big.as_str(),
			r#"{"value": -1}"#,
			r#"{"value": 1.5}"#,
			r#"{"value": true}"#,
		];
		for json in rejected {
			assert!(matches!(
				TransactionRequest::from_json(json),
				Err(TransactionError::InvalidTransactionFields { field: "request", .. })
			));
		}
	}

	#[test]
	fn quantity_parsing_edge_cases() {
		assert_eq!(parse_quantity("0x0"), Ok(U256::zero()));
		assert_eq!(parse_quantity("0x"), Ok(U256::zero()));
		assert_eq!(parse_quantity("0X76C"), Ok(0x76c.into()));
		assert!(parse_quantity("76c").is_err());
		assert!(parse_quantity("0xzz").is_err());
		assert!(parse_quantity(&format!("0x1{}", "0".repeat(64))).is_err());
	}

	#[test]
	fn byte_fields_require_even_length_hex() {
		assert_eq!(parse_hex_bytes("0x5544"), Ok(vec![0x55, 0x44]));
		assert_eq!(parse_hex_bytes(""), Ok(vec![]));
		assert_eq!(parse_hex_bytes("0x"), Ok(vec![]));
		assert!(parse_hex_bytes("0x554").is_err());
		assert!(parse_hex_bytes("5544").is_err());
	}

	#[test]
	fn unknown_keys_are_rejected() {
		let err = TransactionRequest::from_json(r#"{"nonce": 1, "gasLimit": 21000}"#).unwrap_err();
		assert!(matches!(
			err,
			TransactionError::InvalidTransactionFields { field: "request", .. }
		));
	}

	#[test]
	fn serializes_as_hex_with_camel_case_keys() {
		let request = TransactionRequest {
			transaction_type: Some(2.into()),
			max_fee_per_gas: Some(2_000_000_000_u64.into()),
			data: Some(HexBytes(vec![0x55, 0x44])),
			access_list: Some(vec![AccessListEntry {
				address: HexBytes(vec![0x01; 20]),
				storage_keys: vec![],
			}]),
			..Default::default()
		};
		let text = request.to_json().unwrap();
		let json: serde_json::Value = serde_json::from_str(&text).unwrap();
		assert_eq!(json["type"], "0x2");
		assert_eq!(json["maxFeePerGas"], "0x77359400");
		assert_eq!(json["data"], "0x5544");
		assert_eq!(json["accessList"][0]["storageKeys"], serde_json::json!([]));
		assert!(json.get("gasPrice").is_none());

		assert_eq!(TransactionRequest::from_json(&text), Ok(request));
	}
}
