use ethereum_types::{H256, U256};

use super::{
	access_list::{self, AccessList},
	fields, TransactionAction, TransactionPayload,
};
use crate::{
	error::{Result, TransactionError},
	request::{HexBytes, TransactionRequest},
	rlp_item::RlpItem,
	signer::RecoverableSignature,
	Bytes,
};

/// Signature of a typed transaction: `v` is the bare y parity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypedSignature {
	pub odd_y_parity: bool,
	pub r: H256,
	pub s: H256,
}

impl TypedSignature {
	pub fn new(v: U256, r: H256, s: H256) -> Result<Self> {
		let odd_y_parity = if v.is_zero() {
			false
		} else if v == U256::one() {
			true
		} else {
			return Err(TransactionError::invalid_field(
				"v",
				format!("{} is not a y parity (0 or 1)", v),
			));
		};
		fields::check_signature_scalar("r", &r)?;
		fields::check_signature_scalar("s", &s)?;
		Ok(Self { odd_y_parity, r, s })
	}

	pub fn v(&self) -> u64 {
		u64::from(self.odd_y_parity)
	}

	pub(crate) fn from_request(request: &TransactionRequest) -> Result<Option<Self>> {
		fields::signature_values(request)?
			.map(|(v, r, s)| Self::new(v, r, s))
			.transpose()
	}

	pub(crate) fn from_recoverable(signature: &RecoverableSignature) -> Result<Self> {
		Self::new(U256::from(signature.parity()?), signature.r, signature.s)
	}

	pub(crate) fn decode_items(items: &[RlpItem]) -> Result<Self> {
		Self::new(
			items[0].as_uint()?,
			fields::u256_to_h256(items[1].as_uint()?),
			fields::u256_to_h256(items[2].as_uint()?),
		)
	}

	pub(crate) fn items(&self) -> [RlpItem; 3] {
		[
			self.odd_y_parity.into(),
			fields::h256_to_u256(&self.r).into(),
			fields::h256_to_u256(&self.s).into(),
		]
	}

	pub(crate) fn fill_request(signature: Option<&Self>, request: &mut TransactionRequest) {
		if let Some(signature) = signature {
			request.v = Some(U256::from(signature.v()));
			request.r = Some(fields::h256_to_u256(&signature.r));
			request.s = Some(fields::h256_to_u256(&signature.s));
		}
	}
}

/// EIP-2930 (type `0x01`) transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EIP2930Transaction {
	pub chain_id: u64,
	pub nonce: U256,
	pub gas_price: U256,
	pub gas_limit: U256,
	pub action: TransactionAction,
	pub value: U256,
	pub input: Bytes,
	pub access_list: AccessList,
	pub signature: Option<TypedSignature>,
}

impl EIP2930Transaction {
	pub const TYPE_ID: u8 = 0x01;
	pub const NAME: &'static str = "EIP-2930";
	const UNSIGNED_FIELD_COUNT: usize = 8;

	pub fn from_request(request: &TransactionRequest) -> Result<Self> {
		fields::forbidden("maxPriorityFeePerGas", &request.max_priority_fee_per_gas, Self::NAME)?;
		fields::forbidden("maxFeePerGas", &request.max_fee_per_gas, Self::NAME)?;

		Ok(Self {
			chain_id: fields::to_u64("chainId", fields::required("chainId", request.chain_id)?)?,
			nonce: fields::required("nonce", request.nonce)?,
			gas_price: fields::required("gasPrice", request.gas_price)?,
			gas_limit: fields::required("gas", request.gas)?,
			action: fields::action(request)?,
			value: request.value.unwrap_or_default(),
			input: fields::input(request),
			access_list: access_list::from_request(
				request.access_list.as_deref().unwrap_or_default(),
			)?,
			signature: TypedSignature::from_request(request)?,
		})
	}

	pub fn to_request(&self) -> TransactionRequest {
		let mut request = TransactionRequest {
			transaction_type: Some(Self::TYPE_ID.into()),
			chain_id: Some(self.chain_id.into()),
			nonce: Some(self.nonce),
			gas: Some(self.gas_limit),
			gas_price: Some(self.gas_price),
			to: self.action.to_request(),
			value: Some(self.value),
			data: Some(HexBytes(self.input.clone())),
			access_list: Some(access_list::to_request(&self.access_list)),
			..Default::default()
		};
		TypedSignature::fill_request(self.signature.as_ref(), &mut request);
		request
	}

	/// Decode the field list following the type byte, signed or not.
	pub fn decode_fields(items: &[RlpItem]) -> Result<Self> {
		let signed = fields::check_field_count(items, Self::UNSIGNED_FIELD_COUNT)?;
		let signature = if signed {
			Some(TypedSignature::decode_items(&items[Self::UNSIGNED_FIELD_COUNT..])?)
		} else {
			None
		};

		Ok(Self {
			chain_id: items[0].as_u64()?,
			nonce: items[1].as_uint()?,
			gas_price: items[2].as_uint()?,
			gas_limit: items[3].as_uint()?,
			action: TransactionAction::decode_item(&items[4])?,
			value: items[5].as_uint()?,
			input: items[6].as_bytes()?.to_vec(),
			access_list: access_list::decode(&items[7])?,
			signature,
		})
	}

	pub fn with_signature(self, signature: &RecoverableSignature) -> Result<Self> {
		Ok(Self {
			signature: Some(TypedSignature::from_recoverable(signature)?),
			..self
		})
	}
}

impl TransactionPayload for EIP2930Transaction {
	fn type_id(&self) -> Option<u8> {
		Some(Self::TYPE_ID)
	}

	fn core_fields(&self) -> Vec<RlpItem> {
		vec![
			self.chain_id.into(),
			self.nonce.into(),
			self.gas_price.into(),
			self.gas_limit.into(),
			self.action.into(),
			self.value.into(),
			self.input.clone().into(),
			access_list::encode(&self.access_list),
		]
	}

	fn signature_fields(&self) -> Option<[RlpItem; 3]> {
		self.signature.as_ref().map(TypedSignature::items)
	}
}
