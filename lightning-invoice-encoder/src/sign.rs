// This file is Copyright its original authors, visible in version control
// history.
//
// This file is licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your option.
// You may not use this file except in accordance with one or both of these
// licenses.

//! Assembly of the signed token: human readable part, data words, preimage hash and signature.

use core::convert::Infallible;

use bech32::{Fe32, Fe32IterExt, Hrp};
use bitcoin::hashes::{sha256, Hash};
use bitcoin::secp256k1::ecdsa::RecoverableSignature;
use bitcoin::secp256k1::{Message, Secp256k1, SecretKey};

use crate::cursor::WordCursor;
use crate::{
	CreationError, EncodeConfig, InvoiceSignature, RawInvoice, SignOrCreationError,
	SignedRawInvoice,
};

/// Builds the message a signature is computed over: the human readable part's bytes followed by
/// the data part words regrouped into bytes. The words are padded with zero bits to the next
/// byte boundary.
pub fn construct_invoice_preimage(hrp_bytes: &[u8], data_without_signature: &[Fe32]) -> Vec<u8> {
	let mut preimage = Vec::<u8>::from(hrp_bytes);

	let mut data_part = Vec::from(data_without_signature);
	let overhang = (data_part.len() * 5) % 8;
	if overhang > 0 {
		// add padding if data does not end at a byte boundary
		data_part.push(Fe32::Q);

		// if overhang is in (1..3) we need to add Fe32::Q padding two times
		if overhang < 3 {
			data_part.push(Fe32::Q);
		}
	}

	preimage.extend(data_part.iter().copied().fes_to_bytes());
	preimage
}

/// Encodes and signs `invoice` with `private_key`, returning the bech32 token.
///
/// Fails without producing any output if the invoice doesn't pass [`RawInvoice::validate`].
pub fn encode(invoice: &RawInvoice, private_key: &SecretKey) -> Result<String, CreationError> {
	invoice.encode(private_key)
}

impl RawInvoice {
	/// Writes the timestamp and all tagged fields into a fresh cursor.
	fn data_words(&self) -> WordCursor {
		let mut cursor = WordCursor::new();
		self.data.write_words(&mut cursor);
		cursor
	}

	/// Calculate the hash of the encoded `RawInvoice` which should be signed.
	pub fn signable_hash(&self) -> Result<[u8; 32], CreationError> {
		self.signable_hash_with_config(&EncodeConfig::default())
	}

	fn signable_hash_with_config(&self, config: &EncodeConfig) -> Result<[u8; 32], CreationError> {
		self.validate(config)?;
		let hrp = self.hrp(config)?.to_string();
		let preimage = construct_invoice_preimage(hrp.as_bytes(), self.data_words().words());
		Ok(sha256::Hash::hash(&preimage).to_byte_array())
	}

	/// Signs the invoice using the supplied `sign_method`. This function MAY fail with an error of
	/// type `E`. Since the signature of a [`SignedRawInvoice`] is not required to be valid there
	/// are no constraints regarding the validity of the produced signature.
	///
	/// This is not exported to bindings users as we don't currently support passing function
	/// pointers into methods explicitly.
	pub fn sign<F, E>(self, sign_method: F) -> Result<SignedRawInvoice, SignOrCreationError<E>>
		where F: FnOnce(&Message) -> Result<RecoverableSignature, E>
	{
		self.sign_with_config(&EncodeConfig::default(), sign_method)
	}

	/// Same as [`RawInvoice::sign`], with explicit encoding options.
	pub fn sign_with_config<F, E>(
		self, config: &EncodeConfig, sign_method: F,
	) -> Result<SignedRawInvoice, SignOrCreationError<E>>
		where F: FnOnce(&Message) -> Result<RecoverableSignature, E>
	{
		self.validate(config)?;

		let hrp = self.hrp(config)?.to_string();
		tracing::trace!(hrp = %hrp, fields = self.data.tagged_fields.len(), "encoding invoice");

		let mut cursor = self.data_words();
		let preimage = construct_invoice_preimage(hrp.as_bytes(), cursor.words());
		let hash = sha256::Hash::hash(&preimage).to_byte_array();
		tracing::trace!(data_words = cursor.words().len(), preimage_len = preimage.len(), "hashed invoice preimage");

		let signature = sign_method(&Message::from_digest(hash))
			.map_err(SignOrCreationError::SignError)?;

		let (recovery_id, signature_bytes) = signature.serialize_compact();
		cursor.write_bytes(&signature_bytes);
		cursor.write_uint(recovery_id.to_i32() as u64, 1);
		let data = cursor.into_words();
		tracing::debug!(hrp = %hrp, data_words = data.len(), "signed invoice");

		Ok(SignedRawInvoice {
			raw_invoice: self,
			// Only lowercase ASCII letters and digits, well below the length limit.
			hrp: Hrp::parse_unchecked(&hrp),
			data,
			hash,
			signature: InvoiceSignature(signature),
		})
	}

	/// Signs the invoice with `private_key` using a deterministic (RFC6979) signature and returns
	/// the resulting token.
	pub fn encode(&self, private_key: &SecretKey) -> Result<String, CreationError> {
		self.encode_with_config(private_key, &EncodeConfig::default())
	}

	/// Same as [`RawInvoice::encode`], with explicit encoding options.
	pub fn encode_with_config(
		&self, private_key: &SecretKey, config: &EncodeConfig,
	) -> Result<String, CreationError> {
		let secp_ctx = Secp256k1::signing_only();
		let signed = self.clone().sign_with_config::<_, Infallible>(config, |hash| {
			Ok(secp_ctx.sign_ecdsa_recoverable(hash, private_key))
		});

		match signed {
			Ok(signed) => Ok(signed.to_string()),
			Err(SignOrCreationError::CreationError(e)) => Err(e),
			Err(SignOrCreationError::SignError(never)) => match never {},
		}
	}
}
