//! Shared field checks for building variants from a [`TransactionRequest`].

use ethereum_types::{H256, U256};

use crate::{
	error::{Result, TransactionError},
	request::TransactionRequest,
	rlp_item::RlpItem,
	Bytes,
};

use super::TransactionAction;

pub(crate) fn required(field: &'static str, value: Option<U256>) -> Result<U256> {
	value.ok_or_else(|| TransactionError::invalid_field(field, "missing"))
}

pub(crate) fn forbidden<T>(field: &'static str, value: &Option<T>, variant: &str) -> Result<()> {
	match value {
		Some(_) => Err(TransactionError::invalid_field(
			field,
			format!("not recognized by {} transactions", variant),
		)),
		None => Ok(()),
	}
}

pub(crate) fn to_u64(field: &'static str, value: U256) -> Result<u64> {
	if value.bits() > 64 {
		return Err(TransactionError::invalid_field(field, "does not fit in 64 bits"));
	}
	Ok(value.low_u64())
}

pub(crate) fn action(request: &TransactionRequest) -> Result<TransactionAction> {
	match request.to.as_deref() {
		None | Some([]) => Ok(TransactionAction::Create),
		Some(bytes) => TransactionAction::from_slice(bytes),
	}
}

pub(crate) fn input(request: &TransactionRequest) -> Bytes {
	request
		.data
		.as_ref()
		.map(|data| data.to_vec())
		.unwrap_or_default()
}

/// `v`, `r`, `s` from the request: all three or none.
pub(crate) fn signature_values(request: &TransactionRequest) -> Result<Option<(U256, H256, H256)>> {
	match (request.v, request.r, request.s) {
		(None, None, None) => Ok(None),
		(Some(v), Some(r), Some(s)) => Ok(Some((v, u256_to_h256(r), u256_to_h256(s)))),
		(None, _, _) => Err(TransactionError::invalid_field("v", "missing while r/s are present")),
		(_, None, _) => Err(TransactionError::invalid_field("r", "missing while v/s are present")),
		(_, _, None) => Err(TransactionError::invalid_field("s", "missing while v/r are present")),
	}
}

/// Signature scalars must lie in `[1, n)` for the secp256k1 order `n`.
pub(crate) fn check_signature_scalar(field: &'static str, value: &H256) -> Result<()> {
	const LOWER: H256 = H256([
		0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
		0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
		0x00, 0x00, 0x00, 0x01,
	]);
	const UPPER: H256 = H256([
		0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
		0xff, 0xfe, 0xba, 0xae, 0xdc, 0xe6, 0xaf, 0x48, 0xa0, 0x3b, 0xbf, 0xd2, 0x5e, 0x8c,
		0xd0, 0x36, 0x41, 0x41,
	]);

	if *value < LOWER || *value >= UPPER {
		return Err(TransactionError::invalid_field(field, "outside the secp256k1 scalar range"));
	}
	Ok(())
}

pub(crate) fn u256_to_h256(value: U256) -> H256 {
	let mut buf = [0_u8; 32];
	value.to_big_endian(&mut buf);
	H256(buf)
}

pub(crate) fn h256_to_u256(value: &H256) -> U256 {
	U256::from_big_endian(value.as_bytes())
}

/// Fail unless `fields` holds exactly `unsigned` or `unsigned + 3` items.
/// Returns whether the signature triple is present.
pub(crate) fn check_field_count(fields: &[RlpItem], unsigned: usize) -> Result<bool> {
	match fields.len() {
		n if n == unsigned => Ok(false),
		n if n == unsigned + 3 => Ok(true),
		_ => Err(rlp::DecoderError::RlpIncorrectListLen.into()),
	}
}
