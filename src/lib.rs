//! Codec for Ethereum transactions in their legacy, EIP-2930 and EIP-1559
//! formats.
//!
//! A [`TypedTransaction`] is built from a field mapping
//! ([`TransactionRequest`]) or decoded from wire bytes, and can be encoded
//! back, hashed for signing, or projected back into a mapping.
//!
//! ```
//! use typed_transaction::TypedTransaction;
//!
//! let tx = TypedTransaction::from_json(
//! 	r#"{
//! 		"chainId": "0x539", "nonce": "0x2", "gas": "0x186a0",
//! 		"maxFeePerGas": "0x77359400", "maxPriorityFeePerGas": "0x77359400",
//! 		"to": "0x96216849c49358B10257cb55b28eA603c874b05E",
//! 		"value": "0x5af3107a4000", "data": "0x5544"
//! 	}"#,
//! )
//! .unwrap();
//! assert_eq!(tx.type_id(), Some(2));
//! assert!(tx.encode().is_err());
//! assert_eq!(tx.signing_payload()[0], 0x02);
//! ```

mod enveloped;
mod error;
mod request;
pub mod rlp_item;
mod signer;
mod transaction;
mod util;

pub type Bytes = Vec<u8>;

pub use enveloped::{EnvelopedDecodable, EnvelopedEncodable, Envelope};
pub use error::{Result, TransactionError};
pub use request::{parse_hex_bytes, parse_quantity, AccessListEntry, HexBytes, TransactionRequest};
pub use rlp_item::RlpItem;
pub use signer::{RecoverableSignature, TransactionSigner};
pub use transaction::{
	access_list, AccessList, AccessListItem, EIP1559Transaction, EIP2930Transaction,
	HashedPayload, LegacyTransaction, TransactionAction, TransactionHash, TransactionPayload,
	TransactionRecoveryId, TransactionSignature, TransactionType, TypedSignature, TypedTransaction,
};
pub use util::{keccak256, KeccakHasher};
