//! Generic recursive-length-prefix items.
//!
//! Encoding goes through [`rlp::RlpStream`], decoding through [`rlp::Rlp`].
//! Decoding is strict: every header must use the shortest form, and the
//! input must be consumed exactly, so that each logical value has a single
//! accepted encoding.

use ethereum_types::{Address, H256, U256};
use rlp::{DecoderError, Rlp, RlpStream};

use crate::error::Result;

/// Lists nested deeper than this are rejected while decoding.
pub const MAX_NESTING_DEPTH: usize = 64;

/// A byte string or a list of items.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RlpItem {
	Bytes(Vec<u8>),
	List(Vec<RlpItem>),
}

impl RlpItem {
	/// The empty byte string, which is also how zero is encoded.
	pub fn empty() -> Self {
		RlpItem::Bytes(Vec::new())
	}

	/// Canonical encoding of this item.
	pub fn encode(&self) -> Vec<u8> {
		rlp::encode(self).to_vec()
	}

	/// Decode exactly one item spanning all of `bytes`.
	pub fn decode(bytes: &[u8]) -> Result<Self> {
		let rlp = Rlp::new(bytes);
		if rlp.payload_info()?.total() != bytes.len() {
			return Err(DecoderError::RlpIsTooBig.into());
		}
		Ok(decode_rlp(&rlp, 0)?)
	}

	pub fn as_bytes(&self) -> core::result::Result<&[u8], DecoderError> {
		match self {
			RlpItem::Bytes(bytes) => Ok(bytes),
			RlpItem::List(_) => Err(DecoderError::RlpExpectedToBeData),
		}
	}

	pub fn as_list(&self) -> core::result::Result<&[RlpItem], DecoderError> {
		match self {
			RlpItem::List(items) => Ok(items),
			RlpItem::Bytes(_) => Err(DecoderError::RlpExpectedToBeList),
		}
	}

	/// Interpret the item as a big-endian integer of at most 32 bytes.
	/// Leading zero bytes are not canonical and are rejected.
	pub fn as_uint(&self) -> core::result::Result<U256, DecoderError> {
		let bytes = self.as_bytes()?;
		match bytes.first() {
			Some(0) => Err(DecoderError::RlpInvalidIndirection),
			_ if bytes.len() > 32 => Err(DecoderError::RlpIsTooBig),
			_ => Ok(U256::from_big_endian(bytes)),
		}
	}

	/// Like [`RlpItem::as_uint`], limited to 8 bytes.
	pub fn as_u64(&self) -> core::result::Result<u64, DecoderError> {
		let value = self.as_uint()?;
		if value.bits() > 64 {
			return Err(DecoderError::RlpIsTooBig);
		}
		Ok(value.low_u64())
	}
}

impl rlp::Encodable for RlpItem {
	fn rlp_append(&self, s: &mut RlpStream) {
		match self {
			RlpItem::Bytes(bytes) => s.encoder().encode_value(bytes),
			RlpItem::List(items) => {
				s.begin_list(items.len());
				for item in items {
					s.append(item);
				}
			}
		}
	}
}

impl From<U256> for RlpItem {
	fn from(value: U256) -> Self {
		let mut buf = [0_u8; 32];
		value.to_big_endian(&mut buf);
		let skip = 32 - (value.bits() + 7) / 8;
		RlpItem::Bytes(buf[skip..].to_vec())
	}
}

impl From<u64> for RlpItem {
	fn from(value: u64) -> Self {
		U256::from(value).into()
	}
}

impl From<bool> for RlpItem {
	fn from(value: bool) -> Self {
		u64::from(value).into()
	}
}

impl From<Address> for RlpItem {
	fn from(address: Address) -> Self {
		RlpItem::Bytes(address.as_bytes().to_vec())
	}
}

impl From<H256> for RlpItem {
	fn from(hash: H256) -> Self {
		RlpItem::Bytes(hash.as_bytes().to_vec())
	}
}

impl From<&[u8]> for RlpItem {
	fn from(bytes: &[u8]) -> Self {
		RlpItem::Bytes(bytes.to_vec())
	}
}

impl From<Vec<u8>> for RlpItem {
	fn from(bytes: Vec<u8>) -> Self {
		RlpItem::Bytes(bytes)
	}
}

impl From<Vec<RlpItem>> for RlpItem {
	fn from(items: Vec<RlpItem>) -> Self {
		RlpItem::List(items)
	}
}

fn decode_rlp(rlp: &Rlp, depth: usize) -> core::result::Result<RlpItem, DecoderError> {
	if depth > MAX_NESTING_DEPTH {
		return Err(DecoderError::Custom("rlp nesting too deep"));
	}

	if !rlp.is_list() {
		return rlp.as_val::<Vec<u8>>().map(RlpItem::Bytes);
	}

	// `Rlp::iter` stops at the first malformed child, so walk by index to
	// surface the error and account for every payload byte.
	let payload_len = rlp.payload_info()?.value_len;
	let mut items = Vec::new();
	let mut consumed = 0;
	while consumed < payload_len {
		let child = rlp.at(items.len())?;
		consumed += child.as_raw().len();
		items.push(decode_rlp(&child, depth + 1)?);
	}
	Ok(RlpItem::List(items))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::TransactionError;
	use hex_literal::hex;

	fn malformed(err: DecoderError) -> TransactionError {
		TransactionError::MalformedEncoding(err)
	}

	#[test]
	fn encodes_short_and_long_strings() {
		assert_eq!(RlpItem::empty().encode(), vec![0x80]);
		assert_eq!(RlpItem::from(vec![0x7f_u8]).encode(), vec![0x7f]);
		assert_eq!(RlpItem::from(vec![0x80_u8]).encode(), vec![0x81, 0x80]);
		assert_eq!(RlpItem::from(b"dog".to_vec()).encode(), hex!("83646f67").to_vec());

		let long = vec![0xaa_u8; 56];
		let encoded = RlpItem::from(long.clone()).encode();
		assert_eq!(&encoded[..2], &[0xb8, 56]);
		assert_eq!(&encoded[2..], &long[..]);
	}

	#[test]
	fn encodes_nested_lists() {
		// [ [], [[]], [ [], [[]] ] ]
		let item = RlpItem::List(vec![
			RlpItem::List(vec![]),
			RlpItem::List(vec![RlpItem::List(vec![])]),
			RlpItem::List(vec![
				RlpItem::List(vec![]),
				RlpItem::List(vec![RlpItem::List(vec![])]),
			]),
		]);
		let encoded = item.encode();
		assert_eq!(encoded, hex!("c7c0c1c0c3c0c1c0").to_vec());
		assert_eq!(RlpItem::decode(&encoded).unwrap(), item);
	}

	#[test]
	fn integers_are_minimal() {
		assert_eq!(RlpItem::from(0_u64), RlpItem::empty());
		assert_eq!(RlpItem::from(0x0400_u64), RlpItem::Bytes(vec![0x04, 0x00]));
		assert_eq!(RlpItem::from(U256::max_value()), RlpItem::Bytes(vec![0xff; 32]));
		assert_eq!(RlpItem::from(true), RlpItem::Bytes(vec![0x01]));
		assert_eq!(RlpItem::from(false), RlpItem::empty());
	}

	#[test]
	fn decodes_long_list() {
		let item = RlpItem::List((0..30_u64).map(|i| RlpItem::from(i + 0x100)).collect());
		let encoded = item.encode();
		assert_eq!(encoded[0], 0xf8);
		assert_eq!(RlpItem::decode(&encoded).unwrap(), item);
	}

	#[test]
	fn rejects_wrapped_single_byte() {
		assert_eq!(
			RlpItem::decode(&hex!("8105")),
			Err(malformed(DecoderError::RlpInvalidIndirection))
		);
		assert_eq!(RlpItem::decode(&hex!("8180")).unwrap(), RlpItem::Bytes(vec![0x80]));
	}

	#[test]
	fn rejects_long_form_for_short_payload() {
		assert_eq!(
			RlpItem::decode(&hex!("b803646f67")),
			Err(malformed(DecoderError::RlpInvalidIndirection))
		);
		assert_eq!(
			RlpItem::decode(&hex!("f80180")),
			Err(malformed(DecoderError::RlpInvalidIndirection))
		);
	}

	#[test]
	fn rejects_zero_prefixed_length() {
		let mut bytes = vec![0xb9, 0x00, 0x38];
		bytes.extend_from_slice(&[0xaa; 56]);
		assert_eq!(
			RlpItem::decode(&bytes),
			Err(malformed(DecoderError::RlpDataLenWithZeroPrefix))
		);

		let mut bytes = vec![0xf9, 0x00, 0x38];
		bytes.extend_from_slice(&[0x01; 56]);
		assert!(matches!(
			RlpItem::decode(&bytes),
			Err(TransactionError::MalformedEncoding(_))
		));
	}

	#[test]
	fn rejects_truncated_and_trailing_input() {
		assert_eq!(RlpItem::decode(&[]), Err(malformed(DecoderError::RlpIsTooShort)));
		assert_eq!(
			RlpItem::decode(&hex!("83646f")),
			Err(malformed(DecoderError::RlpIsTooShort))
		);
		assert_eq!(
			RlpItem::decode(&hex!("b8")),
			Err(malformed(DecoderError::RlpIsTooShort))
		);
		assert_eq!(
			RlpItem::decode(&hex!("83646f6700")),
			Err(malformed(DecoderError::RlpIsTooBig))
		);
		// list payload is two bytes but its child needs three
		assert_eq!(
			RlpItem::decode(&hex!("c28264")),
			Err(malformed(DecoderError::RlpIsTooShort))
		);
	}

	#[test]
	fn rejects_excessive_nesting() {
		let mut bytes = vec![0xc0];
		for _ in 0..=MAX_NESTING_DEPTH {
			let len = bytes.len();
			let mut outer = if len <= 55 {
				vec![0xc0 + len as u8]
			} else {
				vec![0xf8, len as u8]
			};
			outer.extend_from_slice(&bytes);
			bytes = outer;
		}
		assert!(matches!(
			RlpItem::decode(&bytes),
			Err(TransactionError::MalformedEncoding(DecoderError::Custom(_)))
		));
	}

	#[test]
	fn integer_accessors_reject_leading_zeros() {
		assert_eq!(
			RlpItem::from(vec![0x00_u8, 0x01]).as_uint(),
			Err(DecoderError::RlpInvalidIndirection)
		);
		assert_eq!(RlpItem::empty().as_uint(), Ok(U256::zero()));
		assert_eq!(RlpItem::Bytes(vec![0x01; 33]).as_uint(), Err(DecoderError::RlpIsTooBig));
		assert_eq!(RlpItem::Bytes(vec![0x01; 9]).as_u64(), Err(DecoderError::RlpIsTooBig));
		assert_eq!(RlpItem::from(0x0539_u64).as_u64(), Ok(0x0539));
		assert_eq!(RlpItem::List(vec![]).as_uint(), Err(DecoderError::RlpExpectedToBeData));
	}
}
