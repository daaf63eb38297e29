use ethereum_types::U256;

use super::{
	access_list::{self, AccessList},
	eip2930::TypedSignature,
	fields, TransactionAction, TransactionPayload,
};
use crate::{
	error::Result,
	request::{HexBytes, TransactionRequest},
	rlp_item::RlpItem,
	signer::RecoverableSignature,
	Bytes,
};

/// EIP-1559 (type `0x02`) dynamic-fee transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EIP1559Transaction {
	pub chain_id: u64,
	pub nonce: U256,
	pub max_priority_fee_per_gas: U256,
	pub max_fee_per_gas: U256,
	pub gas_limit: U256,
	pub action: TransactionAction,
	pub value: U256,
	pub input: Bytes,
	pub access_list: AccessList,
	pub signature: Option<TypedSignature>,
}

impl EIP1559Transaction {
	pub const TYPE_ID: u8 = 0x02;
	pub const NAME: &'static str = "EIP-1559";
	const UNSIGNED_FIELD_COUNT: usize = 9;

	pub fn from_request(request: &TransactionRequest) -> Result<Self> {
		fields::forbidden("gasPrice", &request.gas_price, Self::NAME)?;

		Ok(Self {
			chain_id: fields::to_u64("chainId", fields::required("chainId", request.chain_id)?)?,
			nonce: fields::required("nonce", request.nonce)?,
			max_priority_fee_per_gas: fields::required(
				"maxPriorityFeePerGas",
				request.max_priority_fee_per_gas,
			)?,
			max_fee_per_gas: fields::required("maxFeePerGas", request.max_fee_per_gas)?,
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
			max_priority_fee_per_gas: Some(self.max_priority_fee_per_gas),
			max_fee_per_gas: Some(self.max_fee_per_gas),
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
			max_priority_fee_per_gas: items[2].as_uint()?,
			max_fee_per_gas: items[3].as_uint()?,
			gas_limit: items[4].as_uint()?,
			action: TransactionAction::decode_item(&items[5])?,
			value: items[6].as_uint()?,
			input: items[7].as_bytes()?.to_vec(),
			access_list: access_list::decode(&items[8])?,
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

impl TransactionPayload for EIP1559Transaction {
	fn type_id(&self) -> Option<u8> {
		Some(Self::TYPE_ID)
	}

	fn core_fields(&self) -> Vec<RlpItem> {
		vec![
			self.chain_id.into(),
			self.nonce.into(),
			self.max_priority_fee_per_gas.into(),
			self.max_fee_per_gas.into(),
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
