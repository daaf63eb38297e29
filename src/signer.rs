//! Seam to the external signer. Key handling and elliptic-curve signing
//! live outside this crate; the codec only hands over the signing hash and
//! places the returned signature into the variant's `v, r, s` fields.

use core::fmt::Display;

use ethereum_types::H256;

use crate::error::{Result, TransactionError};

/// A secp256k1 signature with its recovery id (y parity), before any
/// variant-specific `v` encoding is applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecoverableSignature {
	pub recovery_id: u8,
	pub r: H256,
	pub s: H256,
}

impl RecoverableSignature {
	pub fn new(recovery_id: u8, r: H256, s: H256) -> Self {
		Self { recovery_id, r, s }
	}

	pub(crate) fn parity(&self) -> Result<u8> {
		match self.recovery_id {
			0 | 1 => Ok(self.recovery_id),
			other => Err(TransactionError::invalid_field(
				"v",
				format!("recovery id must be 0 or 1, got {}", other),
			)),
		}
	}
}

/// Something that can sign a 32-byte transaction hash.
pub trait TransactionSigner {
	type Error: Display;

	fn sign_hash(&self, hash: H256) -> core::result::Result<RecoverableSignature, Self::Error>;
}
