// This file is Copyright its original authors, visible in version control
// history.
//
// This file is licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your option.
// You may not use this file except in accordance with one or both of these
// licenses.

//! Types which describe private routing hints carried in an invoice's `r` field.

use bitcoin::secp256k1::PublicKey;

use crate::{constants, CreationError};

/// Fees for routing via a given channel
#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash, Ord, PartialOrd)]
pub struct RoutingFees {
	/// Flat routing fee in millisatoshis.
	pub base_msat: u32,
	/// Liquidity-based routing fee in millionths of a routed amount.
	/// In other words, 10000 is 1%.
	pub proportional_millionths: u32,
}

/// A list of hops along a payment path terminating with a channel to the recipient.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct RouteHint(pub Vec<RouteHintHop>);

/// A channel descriptor for a hop along a payment path.
///
/// Each hop occupies exactly [`RouteHintHop::ENCODED_LEN`] bytes once serialized.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct RouteHintHop {
	/// The node_id of the non-target end of the route
	pub src_node_id: PublicKey,
	/// The short_channel_id of this channel
	pub short_channel_id: u64,
	/// The fees which must be paid to use this channel
	pub fees: RoutingFees,
	/// The difference in CLTV values between this node and the next node.
	pub cltv_expiry_delta: u16,
}

impl RouteHintHop {
	/// Serialized size of a single hop: 33 byte pubkey, 8 byte short channel id, two 4 byte fee
	/// fields and a 2 byte CLTV delta.
	pub const ENCODED_LEN: usize = 33 + 8 + 4 + 4 + 2;

	/// Builds a hop from its raw byte-level parts, failing with
	/// [`CreationError::MalformedField`] if the public key or short channel id do not have their
	/// fixed lengths (33 and 8 bytes).
	pub fn from_slices(
		src_node_id: &[u8], short_channel_id: &[u8], fees: RoutingFees, cltv_expiry_delta: u16,
	) -> Result<RouteHintHop, CreationError> {
		let malformed = CreationError::MalformedField(constants::TAG_PRIVATE_ROUTE);
		let src_node_id = PublicKey::from_slice(src_node_id).map_err(|_| malformed.clone())?;
		let scid_bytes: [u8; 8] = short_channel_id.try_into().map_err(|_| malformed)?;

		Ok(RouteHintHop {
			src_node_id,
			short_channel_id: u64::from_be_bytes(scid_bytes),
			fees,
			cltv_expiry_delta,
		})
	}

	/// Appends the big-endian wire form of this hop to `out`.
	pub(crate) fn write_to(&self, out: &mut Vec<u8>) {
		out.extend_from_slice(&self.src_node_id.serialize());
		out.extend_from_slice(&self.short_channel_id.to_be_bytes());
		out.extend_from_slice(&self.fees.base_msat.to_be_bytes());
		out.extend_from_slice(&self.fees.proportional_millionths.to_be_bytes());
		out.extend_from_slice(&self.cltv_expiry_delta.to_be_bytes());
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use bitcoin::secp256k1::{Secp256k1, SecretKey};

	fn pubkey() -> PublicKey {
		let secp = Secp256k1::signing_only();
		PublicKey::from_secret_key(&secp, &SecretKey::from_slice(&[0x42; 32]).unwrap())
	}

	#[test]
	fn hop_serializes_to_fixed_width() {
		let hop = RouteHintHop {
			src_node_id: pubkey(),
			short_channel_id: 0x0102_0304_0506_0708,
			fees: RoutingFees { base_msat: 1, proportional_millionths: 20 },
			cltv_expiry_delta: 3,
		};
		let mut out = Vec::new();
		hop.write_to(&mut out);

		assert_eq!(out.len(), RouteHintHop::ENCODED_LEN);
		assert_eq!(&out[..33], &pubkey().serialize()[..]);
		assert_eq!(&out[33..41], &[1, 2, 3, 4, 5, 6, 7, 8]);
		assert_eq!(&out[41..45], &[0, 0, 0, 1]);
		assert_eq!(&out[45..49], &[0, 0, 0, 20]);
		assert_eq!(&out[49..], &[0, 3]);
	}

	#[test]
	fn from_slices_rejects_bad_lengths() {
		let fees = RoutingFees { base_msat: 0, proportional_millionths: 0 };
		let pk = pubkey().serialize();

		assert!(RouteHintHop::from_slices(&pk, &[0; 8], fees, 0).is_ok());
		assert_eq!(
			RouteHintHop::from_slices(&pk[..32], &[0; 8], fees, 0),
			Err(CreationError::MalformedField(constants::TAG_PRIVATE_ROUTE))
		);
		assert_eq!(
			RouteHintHop::from_slices(&pk, &[0; 7], fees, 0),
			Err(CreationError::MalformedField(constants::TAG_PRIVATE_ROUTE))
		);
	}
}
