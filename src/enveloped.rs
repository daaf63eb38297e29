use rlp::DecoderError;

use crate::error::{Result, TransactionError};

/// Encodable typed transactions.
pub trait EnvelopedEncodable {
	/// Wire bytes: the type byte, if any, followed by the payload.
	fn encode(&self) -> Result<Vec<u8>> {
		let payload = self.encode_payload()?;
		Ok(seal(self.type_id(), &payload))
	}

	/// Type Id of the transaction.
	fn type_id(&self) -> Option<u8>;

	/// Encode inner payload.
	fn encode_payload(&self) -> Result<Vec<u8>>;
}

/// Decodable typed transactions.
pub trait EnvelopedDecodable: Sized {
	/// Decode raw bytes to a Self type.
	fn decode(bytes: &[u8]) -> Result<Self>;
}

/// Prefix `payload` with `type_id`, if any.
pub fn seal(type_id: Option<u8>, payload: &[u8]) -> Vec<u8> {
	let mut out = Vec::with_capacity(payload.len() + 1);
	if let Some(type_id) = type_id {
		debug_assert!(type_id <= 0x7f);
		out.push(type_id);
	}
	out.extend_from_slice(payload);
	out
}

/// Raw transaction bytes split by their first byte.
///
/// A canonical legacy transaction is an RLP list and so starts at `0xc0` or
/// above, while EIP-2718 reserves `0x00..=0x7f` for type bytes. Nothing but
/// this convention tells the two apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Envelope<'a> {
	Legacy(&'a [u8]),
	Typed { type_id: u8, payload: &'a [u8] },
}

impl<'a> Envelope<'a> {
	pub fn open(bytes: &'a [u8]) -> Result<Self> {
		match bytes.split_first() {
			None => Err(DecoderError::RlpIsTooShort.into()),
			Some((&first, _)) if first >= 0xc0 => Ok(Envelope::Legacy(bytes)),
			Some((&type_id, payload)) if type_id <= 0x7f => {
				Ok(Envelope::Typed { type_id, payload })
			}
			Some(_) => Err(TransactionError::MalformedEncoding(
				DecoderError::RlpExpectedToBeList,
			)),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn seal_prefixes_type_byte() {
		assert_eq!(seal(Some(2), &[0xc0]), vec![0x02, 0xc0]);
		assert_eq!(seal(None, &[0xc0]), vec![0xc0]);
	}

	#[test]
	fn open_splits_on_first_byte() {
		assert_eq!(Envelope::open(&[0xc0]), Ok(Envelope::Legacy(&[0xc0])));
		assert_eq!(
			Envelope::open(&[0x01, 0xc0]),
			Ok(Envelope::Typed {
				type_id: 1,
				payload: &[0xc0]
			})
		);
		assert_eq!(
			Envelope::open(&[0x7f]),
			Ok(Envelope::Typed {
				type_id: 0x7f,
				payload: &[]
			})
		);
		assert_eq!(
			Envelope::open(&[]),
			Err(TransactionError::MalformedEncoding(DecoderError::RlpIsTooShort))
		);
		assert_eq!(
			Envelope::open(&[0x83, 0x64, 0x6f, 0x67]),
			Err(TransactionError::MalformedEncoding(DecoderError::RlpExpectedToBeList))
		);
	}
}
