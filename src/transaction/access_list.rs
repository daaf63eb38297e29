//! EIP-2930 access lists: `[[address, [storageKey, ...]], ...]`.

use ethereum_types::{Address, H256};

use crate::{
	error::{Result, TransactionError},
	request::{AccessListEntry, HexBytes},
	rlp_item::RlpItem,
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccessListItem {
	pub address: Address,
	pub storage_keys: Vec<H256>,
}

pub type AccessList = Vec<AccessListItem>;

impl From<&AccessListItem> for RlpItem {
	fn from(item: &AccessListItem) -> Self {
		RlpItem::List(vec![
			item.address.into(),
			RlpItem::List(item.storage_keys.iter().map(|key| (*key).into()).collect()),
		])
	}
}

/// The list item for `list`; empty lists encode as `0xc0`.
pub fn encode(list: &[AccessListItem]) -> RlpItem {
	RlpItem::List(list.iter().map(RlpItem::from).collect())
}

pub fn decode(item: &RlpItem) -> Result<AccessList> {
	item.as_list()?
		.iter()
		.enumerate()
		.map(|(index, entry)| decode_entry(index, entry))
		.collect()
}

fn decode_entry(index: usize, entry: &RlpItem) -> Result<AccessListItem> {
	let (address, storage_keys) = match entry {
		RlpItem::List(pair) if pair.len() == 2 => (&pair[0], &pair[1]),
		_ => {
			return Err(TransactionError::invalid_access_list(
				index,
				"expected an [address, storageKeys] pair",
			))
		}
	};

	let address = match address {
		RlpItem::Bytes(bytes) => address_from_slice(index, bytes)?,
		RlpItem::List(_) => {
			return Err(TransactionError::invalid_access_list(
				index,
				"address must be a byte string",
			))
		}
	};
	let storage_keys = match storage_keys {
		RlpItem::List(keys) => keys
			.iter()
			.map(|key| match key {
				RlpItem::Bytes(bytes) => storage_key_from_slice(index, bytes),
				RlpItem::List(_) => Err(TransactionError::invalid_access_list(
					index,
					"storage key must be a byte string",
				)),
			})
			.collect::<Result<Vec<_>>>()?,
		RlpItem::Bytes(_) => {
			return Err(TransactionError::invalid_access_list(index, "storage keys must be a list"))
		}
	};

	Ok(AccessListItem {
		address,
		storage_keys,
	})
}

/// Validate caller-supplied entries.
pub fn from_request(entries: &[AccessListEntry]) -> Result<AccessList> {
	entries
		.iter()
		.enumerate()
		.map(|(index, entry)| {
			Ok(AccessListItem {
				address: address_from_slice(index, &entry.address)?,
				storage_keys: entry
					.storage_keys
					.iter()
					.map(|key| storage_key_from_slice(index, key))
					.collect::<Result<Vec<_>>>()?,
			})
		})
		.collect()
}

pub fn to_request(list: &[AccessListItem]) -> Vec<AccessListEntry> {
	list.iter()
		.map(|item| AccessListEntry {
			address: HexBytes(item.address.as_bytes().to_vec()),
			storage_keys: item
				.storage_keys
				.iter()
				.map(|key| HexBytes(key.as_bytes().to_vec()))
				.collect(),
		})
		.collect()
}

fn address_from_slice(index: usize, bytes: &[u8]) -> Result<Address> {
	if bytes.len() != Address::len_bytes() {
		return Err(TransactionError::invalid_access_list(
			index,
			format!("address must be 20 bytes, got {}", bytes.len()),
		));
	}
	Ok(Address::from_slice(bytes))
}

fn storage_key_from_slice(index: usize, bytes: &[u8]) -> Result<H256> {
	if bytes.len() != H256::len_bytes() {
		return Err(TransactionError::invalid_access_list(
			index,
			format!("storage key must be 32 bytes, got {}", bytes.len()),
		));
	}
	Ok(H256::from_slice(bytes))
}

#[cfg(test)]
mod tests {
	use super::*;
	use hex_literal::hex;

	fn eip2930_example() -> AccessList {
		vec![
			AccessListItem {
				address: hex!("de0b295669a9fd93d5f28d9ec85e40f4cb697bae").into(),
				storage_keys: vec![
					hex!("0000000000000000000000000000000000000000000000000000000000000003").into(),
					hex!("0000000000000000000000000000000000000000000000000000000000000007").into(),
				],
			},
			AccessListItem {
				address: hex!("bb9bc244d798123fde783fcc1c72d3bb8c189413").into(),
				storage_keys: vec![],
			},
		]
	}

	#[test]
	fn empty_list_is_an_empty_rlp_list() {
		assert_eq!(encode(&[]).encode(), vec![0xc0]);
		assert_eq!(decode(&RlpItem::List(vec![])), Ok(vec![]));
	}

	#[test]
	fn encodes_eip2930_example() {
		let encoded = encode(&eip2930_example()).encode();
		assert_eq!(
			encoded,
			hex!("f872f85994de0b295669a9fd93d5f28d9ec85e40f4cb697baef842a00000000000000000000000000000000000000000000000000000000000000003a00000000000000000000000000000000000000000000000000000000000000007d694bb9bc244d798123fde783fcc1c72d3bb8c189413c0").to_vec()
		);
		let item = RlpItem::decode(&encoded).unwrap();
		assert_eq!(decode(&item), Ok(eip2930_example()));
	}

	#[test]
	fn wrong_length_storage_key_is_rejected() {
		let item = RlpItem::List(vec![RlpItem::List(vec![
			RlpItem::Bytes(vec![0x11; 20]),
			RlpItem::List(vec![RlpItem::Bytes(vec![0x22; 32]), RlpItem::Bytes(vec![0x22; 31])]),
		])]);
		assert!(matches!(
			decode(&item),
			Err(TransactionError::InvalidAccessListEntry { index: 0, .. })
		));
	}

	#[test]
	fn wrong_length_address_is_rejected() {
		for len in [19, 21] {
			let item = RlpItem::List(vec![
				RlpItem::List(vec![RlpItem::Bytes(vec![0x11; 20]), RlpItem::List(vec![])]),
				RlpItem::List(vec![RlpItem::Bytes(vec![0x11; len]), RlpItem::List(vec![])]),
			]);
			assert!(matches!(
				decode(&item),
				Err(TransactionError::InvalidAccessListEntry { index: 1, .. })
			));
		}
	}

	#[test]
	fn entries_must_be_pairs() {
		let item = RlpItem::List(vec![RlpItem::List(vec![RlpItem::Bytes(vec![0x11; 20])])]);
		assert!(matches!(
			decode(&item),
			Err(TransactionError::InvalidAccessListEntry { index: 0, .. })
		));
		assert!(matches!(
			decode(&RlpItem::empty()),
			Err(TransactionError::MalformedEncoding(_))
		));
	}

	#[test]
	fn request_entries_are_length_checked() {
		let entries = vec![AccessListEntry {
			address: HexBytes(vec![0x01; 20]),
			storage_keys: vec![HexBytes(vec![0x01; 33])],
		}];
		assert!(matches!(
			from_request(&entries),
			Err(TransactionError::InvalidAccessListEntry { index: 0, .. })
		));

		let list = eip2930_example();
		assert_eq!(from_request(&to_request(&list)), Ok(list));
	}
}
