// This file is Copyright its original authors, visible in version control
// history.
//
// This file is licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your option.
// You may not use this file except in accordance with one or both of these
// licenses.

//! User-configurable encoding behavior.

/// What to do with an amount that needs more than twelve fractional digits (i.e. is finer than
/// one pico-BTC) and therefore has no exact representation in the human readable part.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ImpreciseAmountPolicy {
	/// Fail with [`CreationError::ImpreciseAmount`].
	///
	/// [`CreationError::ImpreciseAmount`]: crate::CreationError::ImpreciseAmount
	Reject,
	/// Round half away from zero to the nearest pico-BTC and encode with the `p` multiplier. The
	/// encoded amount then differs from the requested one.
	RoundToPico,
}

/// Options applied while encoding an invoice.
///
/// `Default::default()` provides sane defaults.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EncodeConfig {
	/// Handling of amounts which can't be encoded without losing precision.
	///
	/// Default value: [`ImpreciseAmountPolicy::Reject`].
	pub imprecise_amount: ImpreciseAmountPolicy,
}

impl Default for EncodeConfig {
	fn default() -> Self {
		EncodeConfig {
			imprecise_amount: ImpreciseAmountPolicy::Reject,
		}
	}
}
