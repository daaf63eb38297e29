pub mod access_list;
mod eip1559;
mod eip2930;
mod fields;
mod legacy;

use ethereum_types::{H256, U256};
use hash_db::Hasher;
use tracing::{debug, trace};

pub use self::{
	access_list::{AccessList, AccessListItem},
	eip1559::EIP1559Transaction,
	eip2930::{EIP2930Transaction, TypedSignature},
	legacy::{LegacyTransaction, TransactionAction, TransactionRecoveryId, TransactionSignature},
};
use crate::{
	enveloped::{seal, EnvelopedDecodable, EnvelopedEncodable, Envelope},
	error::{Result, TransactionError},
	request::TransactionRequest,
	rlp_item::RlpItem,
	signer::{RecoverableSignature, TransactionSigner},
	util::KeccakHasher,
};

/// The ordered field lists a transaction variant contributes to its
/// signing payload and to its signed wire encoding.
pub trait TransactionPayload {
	/// EIP-2718 type byte, `None` for legacy transactions.
	fn type_id(&self) -> Option<u8>;

	/// Fields shared by the unsigned and signed forms, in wire order.
	fn core_fields(&self) -> Vec<RlpItem>;

	/// Fields hashed for signing.
	fn signing_fields(&self) -> Vec<RlpItem> {
		self.core_fields()
	}

	/// `[v, r, s]`, when signed.
	fn signature_fields(&self) -> Option<[RlpItem; 3]>;

	/// Core fields followed by `v, r, s`.
	fn signed_fields(&self) -> Option<Vec<RlpItem>> {
		let signature = self.signature_fields()?;
		let mut fields = self.core_fields();
		fields.extend(signature);
		Some(fields)
	}

	fn signing_payload(&self) -> Vec<u8> {
		seal(self.type_id(), &RlpItem::List(self.signing_fields()).encode())
	}

	fn signed_payload(&self) -> Option<Vec<u8>> {
		let fields = self.signed_fields()?;
		Some(seal(self.type_id(), &RlpItem::List(fields).encode()))
	}
}

/// The closed set of supported wire formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransactionType {
	Legacy,
	EIP2930,
	EIP1559,
}

impl TransactionType {
	pub fn type_id(self) -> Option<u8> {
		match self {
			TransactionType::Legacy => None,
			TransactionType::EIP2930 => Some(EIP2930Transaction::TYPE_ID),
			TransactionType::EIP1559 => Some(EIP1559Transaction::TYPE_ID),
		}
	}

	/// `0x00` names the legacy format when given explicitly in a mapping.
	pub fn from_type_id(type_id: u8) -> Result<Self> {
		match type_id {
			0x00 => Ok(TransactionType::Legacy),
			EIP2930Transaction::TYPE_ID => Ok(TransactionType::EIP2930),
			EIP1559Transaction::TYPE_ID => Ok(TransactionType::EIP1559),
			other => Err(TransactionError::UnsupportedType(other)),
		}
	}

	/// Pick the variant for `request`: an explicit `type` wins, then
	/// fee-market fields, then `accessList`, else legacy.
	///
	/// Fields that contradict the chosen variant are rejected when the
	/// variant is built.
	pub fn infer(request: &TransactionRequest) -> Result<Self> {
		if let Some(explicit) = request.transaction_type {
			if explicit > U256::from(u8::MAX) {
				return Err(TransactionError::invalid_field("type", "does not fit in one byte"));
			}
			return Self::from_type_id(explicit.low_u64() as u8);
		}

		let fee_market =
			request.max_fee_per_gas.is_some() || request.max_priority_fee_per_gas.is_some();
		match (
			fee_market,
			request.gas_price.is_some(),
			request.access_list.is_some(),
		) {
			(true, true, _) => Err(TransactionError::invalid_field(
				"gasPrice",
				"cannot be combined with maxFeePerGas or maxPriorityFeePerGas",
			)),
			(true, false, _) => Ok(TransactionType::EIP1559),
			(false, _, true) => Ok(TransactionType::EIP2930),
			(false, _, false) => Ok(TransactionType::Legacy),
		}
	}
}

/// Which byte sequence [`TypedTransaction::hash`] digested.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HashedPayload {
	/// The unsigned signing payload.
	Signing,
	/// The full signed wire encoding.
	Signed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransactionHash {
	pub hash: H256,
	pub payload: HashedPayload,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypedTransaction {
	/// Legacy transaction type
	Legacy(LegacyTransaction),
	/// EIP-2930 transaction
	EIP2930(EIP2930Transaction),
	/// EIP-1559 transaction
	EIP1559(EIP1559Transaction),
}

impl TypedTransaction {
	/// Build a transaction from its field mapping.
	pub fn from_dict(request: &TransactionRequest) -> Result<Self> {
		let built = TransactionType::infer(request).and_then(|transaction_type| {
			debug!(
				?transaction_type,
				signed = request.has_signature_fields(),
				"building transaction"
			);
			match transaction_type {
				TransactionType::Legacy => {
					LegacyTransaction::from_request(request).map(Self::Legacy)
				}
				TransactionType::EIP2930 => {
					EIP2930Transaction::from_request(request).map(Self::EIP2930)
				}
				TransactionType::EIP1559 => {
					EIP1559Transaction::from_request(request).map(Self::EIP1559)
				}
			}
		});
		built.map_err(|err| {
			debug!(%err, "rejected transaction fields");
			err
		})
	}

	/// Build a transaction from a JSON object of fields.
	pub fn from_json(json: &str) -> Result<Self> {
		Self::from_dict(&TransactionRequest::from_json(json)?)
	}

	/// Decode wire bytes, signed or unsigned.
	pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
		trace!(len = bytes.len(), "decoding transaction");
		match <Self as EnvelopedDecodable>::decode(bytes) {
			Ok(tx) => {
				debug!(
					transaction_type = ?tx.transaction_type(),
					signed = tx.is_signed(),
					"decoded transaction"
				);
				Ok(tx)
			}
			Err(err) => {
				debug!(%err, "rejected transaction bytes");
				Err(err)
			}
		}
	}

	/// Signed wire encoding. Fails with `MissingSignature` when unsigned.
	pub fn encode(&self) -> Result<Vec<u8>> {
		let encoded = <Self as EnvelopedEncodable>::encode(self)?;
		trace!(len = encoded.len(), "encoded transaction");
		Ok(encoded)
	}

	/// The bytes that are hashed for signing.
	pub fn signing_payload(&self) -> Vec<u8> {
		self.payload().signing_payload()
	}

	pub fn signing_hash(&self) -> H256 {
		self.signing_hash_with::<KeccakHasher>()
	}

	pub fn signing_hash_with<H: Hasher<Out = H256>>(&self) -> H256 {
		H::hash(&self.signing_payload())
	}

	/// Hash of the signing payload while unsigned, of the signed encoding
	/// once signed.
	pub fn hash(&self) -> TransactionHash {
		self.hash_with::<KeccakHasher>()
	}

	pub fn hash_with<H: Hasher<Out = H256>>(&self) -> TransactionHash {
		match self.payload().signed_payload() {
			Some(encoded) => TransactionHash {
				hash: H::hash(&encoded),
				payload: HashedPayload::Signed,
			},
			None => TransactionHash {
				hash: H::hash(&self.signing_payload()),
				payload: HashedPayload::Signing,
			},
		}
	}

	/// Field mapping of this transaction. Typed variants always carry
	/// `type` and `accessList`.
	pub fn as_dict(&self) -> TransactionRequest {
		match self {
			Self::Legacy(tx) => tx.to_request(),
			Self::EIP2930(tx) => tx.to_request(),
			Self::EIP1559(tx) => tx.to_request(),
		}
	}

	pub fn transaction_type(&self) -> TransactionType {
		match self {
			Self::Legacy(_) => TransactionType::Legacy,
			Self::EIP2930(_) => TransactionType::EIP2930,
			Self::EIP1559(_) => TransactionType::EIP1559,
		}
	}

	pub fn type_id(&self) -> Option<u8> {
		self.payload().type_id()
	}

	pub fn is_signed(&self) -> bool {
		self.payload().signature_fields().is_some()
	}

	/// Attach a signature over [`TypedTransaction::signing_hash`], encoding
	/// `v` the way this variant expects.
	pub fn with_signature(self, signature: &RecoverableSignature) -> Result<Self> {
		Ok(match self {
			Self::Legacy(tx) => Self::Legacy(tx.with_signature(signature)?),
			Self::EIP2930(tx) => Self::EIP2930(tx.with_signature(signature)?),
			Self::EIP1559(tx) => Self::EIP1559(tx.with_signature(signature)?),
		})
	}

	/// Ask `signer` for a signature over the signing hash and attach it.
	pub fn sign_with<S: TransactionSigner>(&self, signer: &S) -> Result<Self> {
		let hash = self.signing_hash();
		let signature = signer
			.sign_hash(hash)
			.map_err(|err| TransactionError::Signer(err.to_string()))?;
		debug!(?hash, transaction_type = ?self.transaction_type(), "signed transaction");
		self.clone().with_signature(&signature)
	}

	fn payload(&self) -> &dyn TransactionPayload {
		match self {
			Self::Legacy(tx) => tx,
			Self::EIP2930(tx) => tx,
			Self::EIP1559(tx) => tx,
		}
	}
}

impl EnvelopedEncodable for TypedTransaction {
	fn type_id(&self) -> Option<u8> {
		self.payload().type_id()
	}

	fn encode_payload(&self) -> Result<Vec<u8>> {
		let fields = self
			.payload()
			.signed_fields()
			.ok_or(TransactionError::MissingSignature)?;
		Ok(RlpItem::List(fields).encode())
	}
}

impl EnvelopedDecodable for TypedTransaction {
	fn decode(bytes: &[u8]) -> Result<Self> {
		match Envelope::open(bytes)? {
			Envelope::Legacy(payload) => {
				decode_list(payload, LegacyTransaction::decode_fields).map(Self::Legacy)
			}
			Envelope::Typed {
				type_id: EIP2930Transaction::TYPE_ID,
				payload,
			} => decode_list(payload, EIP2930Transaction::decode_fields).map(Self::EIP2930),
			Envelope::Typed {
				type_id: EIP1559Transaction::TYPE_ID,
				payload,
			} => decode_list(payload, EIP1559Transaction::decode_fields).map(Self::EIP1559),
			Envelope::Typed { type_id, .. } => Err(TransactionError::UnsupportedType(type_id)),
		}
	}
}

fn decode_list<T>(payload: &[u8], decode: fn(&[RlpItem]) -> Result<T>) -> Result<T> {
	let item = RlpItem::decode(payload)?;
	decode(item.as_list()?)
}

impl From<LegacyTransaction> for TypedTransaction {
	fn from(t: LegacyTransaction) -> Self {
		TypedTransaction::Legacy(t)
	}
}

impl From<EIP2930Transaction> for TypedTransaction {
	fn from(t: EIP2930Transaction) -> Self {
		TypedTransaction::EIP2930(t)
	}
}

impl From<EIP1559Transaction> for TypedTransaction {
	fn from(t: EIP1559Transaction) -> Self {
		TypedTransaction::EIP1559(t)
	}
}
