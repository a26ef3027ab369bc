// This file is Copyright its original authors, visible in version control
// history.
//
// This file is licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your option.
// You may not use this file except in accordance with one or both of these
// licenses.

use std::fmt;
use std::fmt::{Display, Formatter};

use bech32::{Bech32, Fe32IterExt};
use bitcoin::hashes::Hash;

use crate::cursor::WordCursor;
use crate::routing::RouteHintHop;
use crate::{
	Currency, Fallback, RawDataPart, RawHrp, SignedRawInvoice, TaggedField, TIMESTAMP_BITS,
};

/// Number of 5-bit words needed to hold `bits` bits.
pub(crate) fn symbols_for_bits(bits: usize) -> usize {
	bits / 5 + if bits % 5 == 0 { 0 } else { 1 }
}

/// Minimum number of 5-bit words able to represent `n` as an integer. Zero still takes one word.
pub(crate) fn minimal_symbol_width(n: usize) -> usize {
	let bit_len = (usize::BITS - n.leading_zeros()) as usize;
	symbols_for_bits(bit_len).max(1)
}

impl Display for SignedRawInvoice {
	fn fmt(&self, f: &mut Formatter) -> Result<(), fmt::Error> {
		for ch in self.data.iter().copied().with_checksum::<Bech32>(&self.hrp).chars() {
			write!(f, "{}", ch)?;
		}
		Ok(())
	}
}

impl Display for RawHrp {
	fn fmt(&self, f: &mut Formatter) -> Result<(), fmt::Error> {
		write!(f, "ln{}", self.currency)?;
		if let Some(ref amount) = self.raw_amount {
			write!(f, "{}", amount)?;
		}
		Ok(())
	}
}

impl Display for Currency {
	fn fmt(&self, f: &mut Formatter) -> Result<(), fmt::Error> {
		let currency_code = match *self {
			Currency::Bitcoin => "bc",
			Currency::BitcoinTestnet => "tb",
			Currency::Regtest => "bcrt",
			Currency::Simnet => "sb",
			Currency::Signet => "tbs",
		};
		write!(f, "{}", currency_code)
	}
}

impl RawDataPart {
	/// Writes the timestamp followed by every tagged field, in order.
	pub(crate) fn write_words(&self, cursor: &mut WordCursor) {
		cursor.write_uint(self.timestamp.as_unix_timestamp(), TIMESTAMP_BITS / 5);
		for tagged_field in self.tagged_fields.iter() {
			tagged_field.write_words(cursor);
		}
	}
}

impl TaggedField {
	/// The value of the field's length prefix, i.e. the number of words its payload occupies.
	///
	/// For every field but the expiry time this is derived from the payload's bit length. The
	/// expiry time instead announces `ceil(seconds / 32)` words and its value is written across
	/// exactly that many words.
	pub fn data_len(&self) -> usize {
		match *self {
			TaggedField::PaymentHash(_) => symbols_for_bits(256),
			TaggedField::PrivateRoute(ref route) => {
				symbols_for_bits(route.0 .0.len() * RouteHintHop::ENCODED_LEN * 8)
			},
			TaggedField::ExpiryTime(ref expiry) => {
				let seconds = expiry.as_seconds();
				let words = seconds / 32 + if seconds % 32 == 0 { 0 } else { 1 };
				usize::try_from(words).unwrap_or(usize::MAX)
			},
			TaggedField::Fallback(ref fallback) => {
				symbols_for_bits(fallback.address().len() * 8) + 1
			},
			TaggedField::Description(ref description) => symbols_for_bits(description.len() * 8),
			TaggedField::PaymentSecret(ref secret) => symbols_for_bits(secret.0.len() * 8),
		}
	}

	/// Number of words the length prefix occupies.
	///
	/// Payment hash, expiry time and description always use two words. A payment secret uses
	/// `ceil(data_len / 32)` words, while routes and fallbacks use as few words as their length
	/// needs.
	pub fn length_prefix_width(&self) -> usize {
		match *self {
			TaggedField::PaymentHash(_)
			| TaggedField::ExpiryTime(_)
			| TaggedField::Description(_) => 2,
			TaggedField::PaymentSecret(_) => {
				let data_len = self.data_len();
				data_len / 32 + if data_len % 32 == 0 { 0 } else { 1 }
			},
			TaggedField::PrivateRoute(_) | TaggedField::Fallback(_) => {
				minimal_symbol_width(self.data_len())
			},
		}
	}

	/// Writes tag, length prefix and payload.
	///
	/// Panics if an expiry time doesn't fit the words announced by [`TaggedField::data_len`],
	/// which [`RawInvoice::validate`] rules out.
	///
	/// [`RawInvoice::validate`]: crate::RawInvoice::validate
	pub(crate) fn write_words(&self, cursor: &mut WordCursor) {
		let data_len = self.data_len();

		cursor.write_uint(self.tag().to_u8() as u64, 1);
		cursor.write_uint(data_len as u64, self.length_prefix_width());

		match *self {
			TaggedField::PaymentHash(ref hash) => {
				cursor.write_bytes(hash.0.as_byte_array());
			},
			TaggedField::PrivateRoute(ref route) => {
				let hops = &route.0 .0;
				let mut bytes = Vec::with_capacity(hops.len() * RouteHintHop::ENCODED_LEN);
				for hop in hops.iter() {
					hop.write_to(&mut bytes);
				}
				cursor.write_bytes(&bytes);
			},
			TaggedField::ExpiryTime(ref expiry) => {
				cursor.write_uint(expiry.as_seconds(), data_len);
			},
			TaggedField::Fallback(ref fallback) => {
				write_fallback(fallback, cursor);
			},
			TaggedField::Description(ref description) => {
				cursor.write_bytes(description.as_bytes());
			},
			TaggedField::PaymentSecret(ref secret) => {
				cursor.write_bytes(&secret.0);
			},
		}
	}
}

fn write_fallback(fallback: &Fallback, cursor: &mut WordCursor) {
	cursor.write_uint(fallback.address_type().to_u8() as u64, 1);
	cursor.write_bytes(fallback.address());
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::{Description, ExpiryTime, PaymentSecret, PositiveTimestamp, PrivateRoute, Sha256};
	use crate::{RouteHint, RoutingFees, RawAmount, SiPrefix};
	use bech32::Fe32;
	use bitcoin::hashes::{sha256, Hash};
	use bitcoin::secp256k1::{PublicKey, Secp256k1, SecretKey};

	fn words_of(field: &TaggedField) -> Vec<u8> {
		let mut cursor = WordCursor::new();
		field.write_words(&mut cursor);
		cursor.into_words().iter().map(|w| w.to_u8()).collect()
	}

	/// Reads `width` words starting at `start` as a big-endian integer.
	fn read_uint(words: &[u8], start: usize, width: usize) -> u64 {
		words[start..start + width].iter().fold(0, |acc, w| (acc << 5) | *w as u64)
	}

	fn hop(seed: u8) -> RouteHintHop {
		let secp = Secp256k1::signing_only();
		RouteHintHop {
			src_node_id: PublicKey::from_secret_key(&secp, &SecretKey::from_slice(&[seed; 32]).unwrap()),
			short_channel_id: seed as u64,
			fees: RoutingFees { base_msat: 1000, proportional_millionths: 1 },
			cltv_expiry_delta: 144,
		}
	}

	#[test]
	fn test_symbol_sizes() {
		assert_eq!(symbols_for_bits(0), 0);
		assert_eq!(symbols_for_bits(1), 1);
		assert_eq!(symbols_for_bits(5), 1);
		assert_eq!(symbols_for_bits(256), 52);
		assert_eq!(symbols_for_bits(408), 82);

		assert_eq!(minimal_symbol_width(0), 1);
		assert_eq!(minimal_symbol_width(31), 1);
		assert_eq!(minimal_symbol_width(32), 2);
		assert_eq!(minimal_symbol_width(1023), 2);
		assert_eq!(minimal_symbol_width(1024), 3);
	}

	#[test]
	fn test_currency_code() {
		assert_eq!("bc", Currency::Bitcoin.to_string());
		assert_eq!("tb", Currency::BitcoinTestnet.to_string());
		assert_eq!("bcrt", Currency::Regtest.to_string());
		assert_eq!("sb", Currency::Simnet.to_string());
		assert_eq!("tbs", Currency::Signet.to_string());
	}

	#[test]
	fn test_raw_hrp() {
		let hrp = RawHrp {
			currency: Currency::Bitcoin,
			raw_amount: Some(RawAmount { value: 100, si_prefix: Some(SiPrefix::Micro) }),
		};
		assert_eq!(hrp.to_string(), "lnbc100u");

		let hrp = RawHrp { currency: Currency::Regtest, raw_amount: None };
		assert_eq!(hrp.to_string(), "lnbcrt");
	}

	#[test]
	fn test_payment_hash_layout() {
		let hash = sha256::Hash::hash(b"payment");
		let words = words_of(&TaggedField::PaymentHash(Sha256(hash)));

		// tag, 2 words for 52, 52 payload words
		assert_eq!(words.len(), 1 + 2 + 52);
		assert_eq!(words[0], 1);
		assert_eq!(read_uint(&words, 1, 2), 52);

		let fes = words[3..].iter().map(|w| Fe32::try_from(*w).unwrap());
		assert_eq!(fes.fes_to_bytes().collect::<Vec<u8>>(), hash.to_byte_array().to_vec());
	}

	#[test]
	fn test_description_layout() {
		let words = words_of(&TaggedField::Description(Description::new("coffee".to_owned()).unwrap()));
		// 48 bits fit into 10 words, the prefix is two words regardless
		assert_eq!(words[..3], [13, 0, 10]);
		assert_eq!(words.len(), 3 + 10);

		let words = words_of(&TaggedField::Description(Description::new("1 cup coffee".to_owned()).unwrap()));
		assert_eq!(words[..3], [13, 0, 20]);

		let words = words_of(&TaggedField::Description(Description::new(String::new()).unwrap()));
		assert_eq!(words, vec![13, 0, 0]);

		let words = words_of(&TaggedField::Description(Description::new("a".repeat(639)).unwrap()));
		assert_eq!(read_uint(&words, 1, 2), 1023);
		assert_eq!(words.len(), 1 + 2 + 1023);
	}

	#[test]
	fn test_expiry_length_follows_value() {
		let words = words_of(&TaggedField::ExpiryTime(ExpiryTime::from_seconds(3600)));
		assert_eq!(words[0], 6);
		assert_eq!(read_uint(&words, 1, 2), 113);
		assert_eq!(words.len(), 1 + 2 + 113);
		assert_eq!(read_uint(&words, 3, 113), 3600);

		let words = words_of(&TaggedField::ExpiryTime(ExpiryTime::from_seconds(60)));
		assert_eq!(words, vec![6, 0, 2, 1, 28]);

		let words = words_of(&TaggedField::ExpiryTime(ExpiryTime::from_seconds(0)));
		assert_eq!(words, vec![6, 0, 0]);
	}

	#[test]
	fn test_payment_secret_layout() {
		let words = words_of(&TaggedField::PaymentSecret(PaymentSecret([0xff; 32])));
		assert_eq!(words[..3], [23, 1, 20]);
		assert_eq!(words.len(), 3 + 52);
		// the last word holds one data bit and four padding bits
		assert_eq!(*words.last().unwrap(), 0b10000);
	}

	#[test]
	fn test_fallback_layout() {
		let words = words_of(&TaggedField::Fallback(Fallback::PubKeyHash([0; 20])));
		// 160 bits are 32 words plus one for the address type
		assert_eq!(words[..4], [9, 1, 1, 17]);
		assert_eq!(words.len(), 4 + 32);

		let program = vec![0xaa; 32];
		let words = words_of(&TaggedField::Fallback(Fallback::SegWitProgram {
			version: Fe32::Q,
			program,
		}));
		assert_eq!(read_uint(&words, 1, 2), 53);
		assert_eq!(words[3], 0);
		assert_eq!(words.len(), 1 + 2 + 53);
	}

	#[test]
	fn test_private_route_layout() {
		let route = PrivateRoute::new(RouteHint(vec![hop(1), hop(2)])).unwrap();
		let words = words_of(&TaggedField::PrivateRoute(route));

		// 2 * 408 bits
		assert_eq!(words[0], 3);
		assert_eq!(read_uint(&words, 1, 2), 164);
		assert_eq!(words.len(), 1 + 2 + 164);

		let fes = words[3..].iter().map(|w| Fe32::try_from(*w).unwrap());
		let bytes = fes.fes_to_bytes().collect::<Vec<u8>>();
		let mut expected = Vec::new();
		hop(1).write_to(&mut expected);
		hop(2).write_to(&mut expected);
		assert_eq!(bytes, expected);
	}

	#[test]
	fn test_length_prefix_widths() {
		let hash = TaggedField::PaymentHash(Sha256(sha256::Hash::hash(b"payment")));
		assert_eq!(hash.length_prefix_width(), 2);
		assert_eq!(TaggedField::ExpiryTime(ExpiryTime::from_seconds(1)).length_prefix_width(), 2);
		let description = TaggedField::Description(Description::new("a".to_owned()).unwrap());
		assert_eq!(description.length_prefix_width(), 2);
		// ceil(52 / 32)
		assert_eq!(TaggedField::PaymentSecret(PaymentSecret([0; 32])).length_prefix_width(), 2);

		let short_program = TaggedField::Fallback(Fallback::SegWitProgram {
			version: Fe32::try_from(1).unwrap(),
			program: vec![0xaa; 2],
		});
		// 16 bits take 4 words, plus the address type
		assert_eq!(short_program.data_len(), 5);
		assert_eq!(short_program.length_prefix_width(), 1);
		assert_eq!(words_of(&short_program)[..3], [9, 5, 1]);

		let route = PrivateRoute::new(RouteHint(vec![hop(1)])).unwrap();
		assert_eq!(TaggedField::PrivateRoute(route).length_prefix_width(), 2);
	}

	#[test]
	fn test_length_prefix_recovers_byte_length() {
		for len in [0usize, 1, 5, 20, 100, 639] {
			let field = TaggedField::Description(Description::new("x".repeat(len)).unwrap());
			let words = words_of(&field);
			let width = field.length_prefix_width();
			let data_len = read_uint(&words, 1, width) as usize;
			assert_eq!(words.len(), 1 + width + data_len);
			assert_eq!(data_len * 5 / 8, len);
		}
	}

	#[test]
	fn test_data_part_starts_with_timestamp() {
		let data = RawDataPart {
			timestamp: PositiveTimestamp::from_unix_timestamp(1496314658).unwrap(),
			tagged_fields: vec![TaggedField::ExpiryTime(ExpiryTime::from_seconds(60))],
		};
		let mut cursor = WordCursor::new();
		data.write_words(&mut cursor);
		let words = cursor.into_words().iter().map(|w| w.to_u8()).collect::<Vec<_>>();

		assert_eq!(words.len(), 7 + 5);
		assert_eq!(read_uint(&words, 0, 7), 1496314658);
		assert_eq!(words[7..], [6, 0, 2, 1, 28]);
	}
}
