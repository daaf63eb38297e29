use ethereum_types::{H160, H256, U256};

use super::{fields, TransactionPayload};
use crate::{
	error::{Result, TransactionError},
	request::{HexBytes, TransactionRequest},
	rlp_item::RlpItem,
	signer::RecoverableSignature,
	Bytes,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionAction {
	Call(H160),
	Create,
}

impl TransactionAction {
	pub(crate) fn from_slice(bytes: &[u8]) -> Result<Self> {
		match bytes.len() {
			0 => Ok(TransactionAction::Create),
			20 => Ok(TransactionAction::Call(H160::from_slice(bytes))),
			len => Err(TransactionError::invalid_field(
				"to",
				format!("expected 20 bytes, got {}", len),
			)),
		}
	}

	pub(crate) fn decode_item(item: &RlpItem) -> Result<Self> {
		Self::from_slice(item.as_bytes()?)
	}

	pub(crate) fn to_request(self) -> Option<HexBytes> {
		match self {
			TransactionAction::Call(address) => Some(HexBytes(address.as_bytes().to_vec())),
			TransactionAction::Create => None,
		}
	}
}

impl From<TransactionAction> for RlpItem {
	fn from(action: TransactionAction) -> Self {
		match action {
			TransactionAction::Call(address) => address.into(),
			TransactionAction::Create => RlpItem::empty(),
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransactionRecoveryId(pub u64);

impl TransactionRecoveryId {
	pub fn standard(self) -> u8 {
		if self.0 == 27 || self.0 == 28 || self.0 >= 35 {
			((self.0 - 1) % 2) as u8
		} else {
			4
		}
	}

	pub fn chain_id(self) -> Option<u64> {
		if self.0 >= 35 {
			Some((self.0 - 35) / 2)
		} else {
			None
		}
	}
}

/// Legacy signature, with `v` carrying the EIP-155 chain id when present.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionSignature {
	v: TransactionRecoveryId,
	r: H256,
	s: H256,
}

impl TransactionSignature {
	pub fn new(v: u64, r: H256, s: H256) -> Result<Self> {
		let v = TransactionRecoveryId(v);
		if v.standard() > 1 {
			return Err(TransactionError::invalid_field(
				"v",
				format!("{} is neither 27/28 nor an EIP-155 value", v.0),
			));
		}
		fields::check_signature_scalar("r", &r)?;
		fields::check_signature_scalar("s", &s)?;
		Ok(Self { v, r, s })
	}

	#[must_use]
	pub fn v(&self) -> u64 {
		self.v.0
	}

	#[must_use]
	pub fn chain_id(&self) -> Option<u64> {
		self.v.chain_id()
	}

	#[must_use]
	pub fn r(&self) -> &H256 {
		&self.r
	}

	#[must_use]
	pub fn s(&self) -> &H256 {
		&self.s
	}
}

/// Pre-EIP-2718 transaction. `chain_id` is the EIP-155 chain id: for a
/// signed transaction it always equals the one carried by `v`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LegacyTransaction {
	pub nonce: U256,
	pub gas_price: U256,
	pub gas_limit: U256,
	pub action: TransactionAction,
	pub value: U256,
	pub input: Bytes,
	pub chain_id: Option<u64>,
	pub signature: Option<TransactionSignature>,
}

impl LegacyTransaction {
	pub const NAME: &'static str = "legacy";

	pub fn from_request(request: &TransactionRequest) -> Result<Self> {
		fields::forbidden("maxPriorityFeePerGas", &request.max_priority_fee_per_gas, Self::NAME)?;
		fields::forbidden("maxFeePerGas", &request.max_fee_per_gas, Self::NAME)?;
		fields::forbidden("accessList", &request.access_list, Self::NAME)?;

		let chain_id = request
			.chain_id
			.map(|chain_id| fields::to_u64("chainId", chain_id))
			.transpose()?;

		let signature = match fields::signature_values(request)? {
			Some((v, r, s)) => Some(TransactionSignature::new(fields::to_u64("v", v)?, r, s)?),
			None => None,
		};
		let chain_id = reconcile_chain_id(chain_id, signature.as_ref())?;

		Ok(Self {
			nonce: fields::required("nonce", request.nonce)?,
			gas_price: fields::required("gasPrice", request.gas_price)?,
			gas_limit: fields::required("gas", request.gas)?,
			action: fields::action(request)?,
			value: request.value.unwrap_or_default(),
			input: fields::input(request),
			chain_id,
			signature,
		})
	}

	pub fn to_request(&self) -> TransactionRequest {
		let signature = self.signature.as_ref();
		TransactionRequest {
			chain_id: self.chain_id.map(U256::from),
			nonce: Some(self.nonce),
			gas: Some(self.gas_limit),
			gas_price: Some(self.gas_price),
			to: self.action.to_request(),
			value: Some(self.value),
			data: Some(HexBytes(self.input.clone())),
			v: signature.map(|sig| U256::from(sig.v())),
			r: signature.map(|sig| fields::h256_to_u256(sig.r())),
			s: signature.map(|sig| fields::h256_to_u256(sig.s())),
			..Default::default()
		}
	}

	/// Accepts the 9-item signed list, the 6-item pre-EIP-155 signing list,
	/// or the 9-item EIP-155 signing list ending in `chainId, 0, 0`.
	pub fn decode_fields(items: &[RlpItem]) -> Result<Self> {
		let signed = fields::check_field_count(items, 6)?;

		let (chain_id, signature) = if signed {
			let v = items[6].as_u64()?;
			let r = items[7].as_uint()?;
			let s = items[8].as_uint()?;
			if r.is_zero() && s.is_zero() {
				(Some(v), None)
			} else {
				let signature = TransactionSignature::new(
					v,
					fields::u256_to_h256(r),
					fields::u256_to_h256(s),
				)?;
				(signature.chain_id(), Some(signature))
			}
		} else {
			(None, None)
		};

		Ok(Self {
			nonce: items[0].as_uint()?,
			gas_price: items[1].as_uint()?,
			gas_limit: items[2].as_uint()?,
			action: TransactionAction::decode_item(&items[3])?,
			value: items[4].as_uint()?,
			input: items[5].as_bytes()?.to_vec(),
			chain_id,
			signature,
		})
	}

	pub fn with_signature(self, signature: &RecoverableSignature) -> Result<Self> {
		let parity = u64::from(signature.parity()?);
		let v = match self.chain_id {
			Some(chain_id) => chain_id
				.checked_mul(2)
				.and_then(|v| v.checked_add(35 + parity))
				.ok_or_else(|| {
					TransactionError::invalid_field("chainId", "too large for EIP-155")
				})?,
			None => 27 + parity,
		};
		let signature = TransactionSignature::new(v, signature.r, signature.s)?;
		let chain_id = reconcile_chain_id(self.chain_id, Some(&signature))?;

		Ok(Self {
			chain_id,
			signature: Some(signature),
			..self
		})
	}
}

fn reconcile_chain_id(
	chain_id: Option<u64>,
	signature: Option<&TransactionSignature>,
) -> Result<Option<u64>> {
	let signature = match signature {
		Some(signature) => signature,
		None => return Ok(chain_id),
	};
	match (chain_id, signature.chain_id()) {
		(Some(explicit), Some(from_v)) if explicit != from_v => Err(TransactionError::invalid_field(
			"v",
			format!("encodes chain id {} but chainId is {}", from_v, explicit),
		)),
		(Some(_), None) => Err(TransactionError::invalid_field(
			"v",
			"27/28 carries no chain id but chainId is set",
		)),
		(_, from_v) => Ok(from_v),
	}
}

impl TransactionPayload for LegacyTransaction {
	fn type_id(&self) -> Option<u8> {
		None
	}

	fn core_fields(&self) -> Vec<RlpItem> {
		vec![
			self.nonce.into(),
			self.gas_price.into(),
			self.gas_limit.into(),
			self.action.into(),
			self.value.into(),
			self.input.clone().into(),
		]
	}

	fn signing_fields(&self) -> Vec<RlpItem> {
		let mut fields = self.core_fields();
		if let Some(chain_id) = self.chain_id {
			fields.push(chain_id.into());
			fields.push(RlpItem::empty());
			fields.push(RlpItem::empty());
		}
		fields
	}

	fn signature_fields(&self) -> Option<[RlpItem; 3]> {
		self.signature.as_ref().map(|signature| {
			[
				signature.v().into(),
				fields::h256_to_u256(signature.r()).into(),
				fields::h256_to_u256(signature.s()).into(),
			]
		})
	}
}
