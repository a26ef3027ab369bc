// This file is Copyright its original authors, visible in version control
// history.
//
// This file is licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your option.
// You may not use this file except in accordance with one or both of these
// licenses.

//! Checks run on a [`RawInvoice`] before any encoding work starts.

use crate::amount::RawAmount;
use crate::{
	constants, CreationError, EncodeConfig, Fallback, RawInvoice, TaggedField,
	MAX_TAGGED_FIELD_WORDS,
};

impl RawInvoice {
	/// Checks that the invoice can be encoded as is:
	///  * the amount is neither negative nor above the bitcoin supply and is representable with
	///    one of the multipliers, subject to `config`'s [`ImpreciseAmountPolicy`]
	///  * every field payload fits into [`MAX_TAGGED_FIELD_WORDS`] words
	///  * every expiry time fits into the words derived from its value
	///  * every fallback address has a valid type and length
	///
	/// The network and the timestamp can't be out of range by construction.
	///
	/// [`ImpreciseAmountPolicy`]: crate::ImpreciseAmountPolicy
	pub fn validate(&self, config: &EncodeConfig) -> Result<(), CreationError> {
		if let Err(e) = RawAmount::from_decimal(self.amount, config) {
			tracing::debug!(amount = ?self.amount, error = %e, "rejecting invoice amount");
			return Err(e);
		}

		for field in self.data.tagged_fields.iter() {
			if let Err(e) = check_tagged_field(field) {
				tracing::debug!(tag = field.tag().to_u8(), error = %e, "rejecting tagged field");
				return Err(e);
			}
		}

		Ok(())
	}
}

fn check_tagged_field(field: &TaggedField) -> Result<(), CreationError> {
	let data_len = field.data_len();

	match *field {
		TaggedField::PaymentHash(_) | TaggedField::PaymentSecret(_) => {},
		TaggedField::Description(_) => {
			if data_len > MAX_TAGGED_FIELD_WORDS {
				return Err(CreationError::DescriptionTooLong);
			}
		},
		TaggedField::PrivateRoute(_) => {
			if data_len > MAX_TAGGED_FIELD_WORDS {
				return Err(CreationError::RouteTooLong);
			}
		},
		TaggedField::ExpiryTime(ref expiry) => {
			let width = data_len.saturating_mul(5);
			let fits = width >= 64 || expiry.as_seconds() >> width == 0;
			if data_len > MAX_TAGGED_FIELD_WORDS || !fits {
				return Err(CreationError::ExpiryTimeOutOfBounds);
			}
		},
		TaggedField::Fallback(ref fallback) => check_fallback(fallback)?,
	}

	Ok(())
}

fn check_fallback(fallback: &Fallback) -> Result<(), CreationError> {
	match *fallback {
		Fallback::SegWitProgram { version, ref program } => {
			if version.to_u8() > 16 || program.len() < 2 || program.len() > 40 {
				return Err(CreationError::MalformedField(constants::TAG_FALLBACK));
			}
		},
		Fallback::PubKeyHash(_) | Fallback::ScriptHash(_) => {},
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		Currency, ExpiryTime, ImpreciseAmountPolicy, PositiveTimestamp, RawDataPart,
	};
	use bech32::Fe32;
	use rust_decimal_macros::dec;

	fn invoice_with(fields: Vec<TaggedField>) -> RawInvoice {
		RawInvoice {
			currency: Currency::BitcoinTestnet,
			amount: None,
			data: RawDataPart {
				timestamp: PositiveTimestamp::from_unix_timestamp(1_700_000_000).unwrap(),
				tagged_fields: fields,
			},
		}
	}

	fn expiry(seconds: u64) -> Result<(), CreationError> {
		invoice_with(vec![TaggedField::ExpiryTime(ExpiryTime::from_seconds(seconds))])
			.validate(&EncodeConfig::default())
	}

	#[test]
	fn accepts_empty_invoice() {
		assert_eq!(invoice_with(vec![]).validate(&EncodeConfig::default()), Ok(()));
	}

	#[test]
	fn checks_amount() {
		let mut invoice = invoice_with(vec![]);

		invoice.amount = Some(dec!(0.0025));
		assert_eq!(invoice.validate(&EncodeConfig::default()), Ok(()));

		invoice.amount = Some(dec!(-0.0025));
		assert_eq!(invoice.validate(&EncodeConfig::default()), Err(CreationError::InvalidAmount));

		invoice.amount = Some(dec!(21000001));
		assert_eq!(invoice.validate(&EncodeConfig::default()), Err(CreationError::InvalidAmount));

		invoice.amount = Some(dec!(0.0000000000001));
		assert_eq!(invoice.validate(&EncodeConfig::default()), Err(CreationError::ImpreciseAmount));

		invoice.amount = Some(dec!(0.0000000000011));
		let rounding = EncodeConfig { imprecise_amount: ImpreciseAmountPolicy::RoundToPico };
		assert_eq!(invoice.validate(&rounding), Ok(()));
	}

	#[test]
	fn expiry_must_fit_its_length() {
		assert_eq!(expiry(0), Ok(()));
		assert_eq!(expiry(31), Ok(()));
		// ceil(32 / 32) = 1 word can't hold 32
		assert_eq!(expiry(32), Err(CreationError::ExpiryTimeOutOfBounds));
		assert_eq!(expiry(33), Ok(()));
		assert_eq!(expiry(3600), Ok(()));
		assert_eq!(expiry(32 * 1023), Ok(()));
		assert_eq!(expiry(32 * 1023 + 1), Err(CreationError::ExpiryTimeOutOfBounds));
		assert_eq!(expiry(u64::MAX), Err(CreationError::ExpiryTimeOutOfBounds));
	}

	#[test]
	fn checks_fallback_shape() {
		let segwit = |version: u8, len: usize| {
			invoice_with(vec![TaggedField::Fallback(Fallback::SegWitProgram {
				version: Fe32::try_from(version).unwrap(),
				program: vec![0; len],
			})]).validate(&EncodeConfig::default())
		};
		let malformed = Err(CreationError::MalformedField(constants::TAG_FALLBACK));

		assert_eq!(segwit(0, 20), Ok(()));
		assert_eq!(segwit(16, 40), Ok(()));
		assert_eq!(segwit(17, 20), malformed);
		assert_eq!(segwit(1, 41), malformed);
		assert_eq!(segwit(1, 1), malformed);
	}
}
