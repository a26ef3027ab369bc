// This file is Copyright its original authors, visible in version control
// history.
//
// This file is licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your option.
// You may not use this file except in accordance with one or both of these
// licenses.

//! Conversion of a BTC amount into the shortest exact `<digits><multiplier>` form used in the
//! human readable part of an invoice.

use core::fmt::{self, Display, Formatter};

use rust_decimal::{Decimal, RoundingStrategy};

use crate::config::{EncodeConfig, ImpreciseAmountPolicy};
use crate::CreationError;

/// Finest precision expressible through a multiplier (pico-BTC).
const MAX_FRACTIONAL_DIGITS: u32 = 12;

/// The total bitcoin supply, in BTC.
pub const MAX_AMOUNT_BTC: u64 = 21_000_000;

/// SI prefixes for the human readable part
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum SiPrefix {
	/// 10^-3
	Milli,
	/// 10^-6
	Micro,
	/// 10^-9
	Nano,
	/// 10^-12
	Pico,
}

impl SiPrefix {
	/// Returns the multiplier to go from a BTC value to picoBTC implied by this SiPrefix.
	/// This is effectively 10^12 * the prefix multiplier
	pub fn multiplier(&self) -> u64 {
		match *self {
			SiPrefix::Milli => 1_000_000_000,
			SiPrefix::Micro => 1_000_000,
			SiPrefix::Nano => 1_000,
			SiPrefix::Pico => 1,
		}
	}

	/// Number of decimal places the prefix shifts an amount by.
	pub fn exponent(&self) -> u32 {
		match *self {
			SiPrefix::Milli => 3,
			SiPrefix::Micro => 6,
			SiPrefix::Nano => 9,
			SiPrefix::Pico => 12,
		}
	}

	/// Returns the coarsest prefix able to carry `fractional_digits` decimal places, or `None`
	/// for whole amounts.
	pub fn for_fractional_digits(fractional_digits: u32) -> Option<SiPrefix> {
		match fractional_digits {
			0 => None,
			1..=3 => Some(SiPrefix::Milli),
			4..=6 => Some(SiPrefix::Micro),
			7..=9 => Some(SiPrefix::Nano),
			_ => Some(SiPrefix::Pico),
		}
	}
}

impl Display for SiPrefix {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		write!(f, "{}",
			match *self {
				SiPrefix::Milli => "m",
				SiPrefix::Micro => "u",
				SiPrefix::Nano => "n",
				SiPrefix::Pico => "p",
			}
		)
	}
}

/// An amount as it appears in the human readable part: an integer and an optional multiplier.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub struct RawAmount {
	/// The integer part written out in decimal digits
	pub value: u64,
	/// Multiplier applied to `value`, whole BTC if `None`
	pub si_prefix: Option<SiPrefix>,
}

impl RawAmount {
	/// Picks the representation of `amount` (in BTC) with the coarsest multiplier that loses no
	/// precision. Returns `Ok(None)` if there is no amount to encode, i.e. it is absent or zero.
	pub fn from_decimal(
		amount: Option<Decimal>, config: &EncodeConfig,
	) -> Result<Option<RawAmount>, CreationError> {
		let amount = match amount {
			Some(a) if !a.is_zero() => a,
			_ => return Ok(None),
		};
		check_amount(&amount)?;

		let normalized = amount.normalize();
		if normalized.scale() <= MAX_FRACTIONAL_DIGITS {
			let si_prefix = SiPrefix::for_fractional_digits(normalized.scale());
			return Ok(Some(RawAmount::scale(&normalized, si_prefix)?));
		}

		match config.imprecise_amount {
			ImpreciseAmountPolicy::Reject => Err(CreationError::ImpreciseAmount),
			ImpreciseAmountPolicy::RoundToPico => {
				let rounded = amount
					.round_dp_with_strategy(MAX_FRACTIONAL_DIGITS, RoundingStrategy::MidpointAwayFromZero)
					.normalize();
				if rounded.is_zero() {
					return Err(CreationError::ImpreciseAmount);
				}
				tracing::debug!(requested = %amount, encoded = %rounded, "rounding amount to pico-BTC");
				Ok(Some(RawAmount::scale(&rounded, Some(SiPrefix::Pico))?))
			},
		}
	}

	/// Scales a normalized amount with at most `si_prefix.exponent()` fractional digits to an
	/// integer.
	fn scale(amount: &Decimal, si_prefix: Option<SiPrefix>) -> Result<RawAmount, CreationError> {
		let exponent = si_prefix.map_or(0, |si| si.exponent());
		debug_assert!(amount.scale() <= exponent);

		let mantissa = u64::try_from(amount.mantissa()).map_err(|_| CreationError::InvalidAmount)?;
		let value = 10u64.checked_pow(exponent - amount.scale())
			.and_then(|shift| mantissa.checked_mul(shift))
			.ok_or(CreationError::InvalidAmount)?;

		Ok(RawAmount { value, si_prefix })
	}

	/// The amount in pico-BTC, if it fits.
	pub fn to_pico_btc(&self) -> Option<u64> {
		self.value.checked_mul(self.si_prefix.map_or(1_000_000_000_000, |si| si.multiplier()))
	}
}

impl Display for RawAmount {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		write!(f, "{}", self.value)?;
		if let Some(si) = self.si_prefix {
			write!(f, "{}", si)?;
		}
		Ok(())
	}
}

/// Checks that `amount` is neither negative nor exceeds the total bitcoin supply.
pub(crate) fn check_amount(amount: &Decimal) -> Result<(), CreationError> {
	if amount.is_sign_negative() && !amount.is_zero() {
		return Err(CreationError::InvalidAmount);
	}
	if *amount > Decimal::from(MAX_AMOUNT_BTC) {
		return Err(CreationError::InvalidAmount);
	}
	Ok(())
}

/// Encodes an amount in BTC for the human readable part, e.g. `0.001` becomes `"1m"`.
///
/// An absent or zero amount yields an empty string. Amounts finer than one pico-BTC are rejected
/// with [`CreationError::ImpreciseAmount`]; use [`encode_amount_with_config`] to round them
/// instead.
pub fn encode_amount(amount: Option<Decimal>) -> Result<String, CreationError> {
	encode_amount_with_config(amount, &EncodeConfig::default())
}

/// Same as [`encode_amount`] with explicit encoding options.
pub fn encode_amount_with_config(
	amount: Option<Decimal>, config: &EncodeConfig,
) -> Result<String, CreationError> {
	Ok(match RawAmount::from_decimal(amount, config)? {
		Some(raw) => raw.to_string(),
		None => String::new(),
	})
}
