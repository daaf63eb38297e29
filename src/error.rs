//! Error type shared by every codec operation.

use rlp::DecoderError;
use thiserror::Error;

/// Errors raised while building, encoding, decoding or signing a transaction.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TransactionError {
	/// Structurally invalid or non-canonical RLP input.
	#[error("malformed encoding: {0}")]
	MalformedEncoding(#[from] DecoderError),

	/// An access list entry with a wrong-length address or storage key,
	/// or an entry that is not an `[address, storageKeys]` pair.
	#[error("invalid access list entry {index}: {reason}")]
	InvalidAccessListEntry { index: usize, reason: String },

	/// Missing, unrecognized, contradictory or out-of-range field.
	#[error("invalid transaction field `{field}`: {reason}")]
	InvalidTransactionFields { field: &'static str, reason: String },

	/// Type discriminant outside the known set.
	#[error("unsupported transaction type {0:#04x}")]
	UnsupportedType(u8),

	/// Wire encoding requested for a transaction without `v`, `r`, `s`.
	#[error("transaction is not signed")]
	MissingSignature,

	/// The external signer failed to produce a signature.
	#[error("signer failed: {0}")]
	Signer(String),
}

impl TransactionError {
	pub(crate) fn invalid_field(field: &'static str, reason: impl Into<String>) -> Self {
		Self::InvalidTransactionFields {
			field,
			reason: reason.into(),
		}
	}

	pub(crate) fn invalid_access_list(index: usize, reason: impl Into<String>) -> Self {
		Self::InvalidAccessListEntry {
			index,
			reason: reason.into(),
		}
	}
}

/// Result type for codec operations.
pub type Result<T> = core::result::Result<T, TransactionError>;
