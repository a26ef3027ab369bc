// This file is Copyright its original authors, visible in version control
// history.
//
// This file is licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your option.
// You may not use this file except in accordance with one or both of these
// licenses.

#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

#![deny(missing_docs)]
#![deny(non_upper_case_globals)]
#![deny(non_camel_case_types)]
#![deny(non_snake_case)]
#![deny(unused_mut)]

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! This crate turns lightning payment invoices into their signed, checksummed bech32 text form.
//!
//! An invoice consists of a human readable part (`ln`, the network and an optional amount with a
//! multiplier) and a data part made of a timestamp and an ordered list of tagged fields. The data
//! part is packed into 5-bit words, hashed together with the human readable part and signed with
//! a recoverable ECDSA signature, which lets the recipient recover the signer's public key.
//!
//!   * For constructing invoices use the [`InvoiceBuilder`]
//!   * For encoding use [`encode`], [`RawInvoice::encode`] or [`RawInvoice::sign`] with your own
//!     signer
//!   * For the amount part alone use [`encode_amount`]
//!
//! Decoding tokens back into invoices is not supported.

use core::convert::Infallible;
use std::fmt::{self, Display, Formatter};
use std::ops::Deref;
use std::str::FromStr;
use std::time::{Duration, SystemTime};

use bech32::{Fe32, Hrp};
use bitcoin::hashes::{sha256, Hash};
use bitcoin::secp256k1;
use bitcoin::secp256k1::ecdsa::RecoverableSignature;
use bitcoin::secp256k1::{Message, PublicKey};

#[cfg(feature = "serde")]
use serde::{Serialize, Serializer};

pub use rust_decimal::Decimal;

mod amount;
mod config;
mod cursor;
mod routing;
mod ser;
mod sign;
mod validate;

pub use crate::amount::{encode_amount, encode_amount_with_config, RawAmount, SiPrefix, MAX_AMOUNT_BTC};
pub use crate::config::{EncodeConfig, ImpreciseAmountPolicy};
pub use crate::routing::{RouteHint, RouteHintHop, RoutingFees};
pub use crate::sign::{construct_invoice_preimage, encode};

/// The number of bits used to represent timestamps.
const TIMESTAMP_BITS: usize = 35;

/// The maximum timestamp as [`Duration::as_secs`] since the Unix epoch allowed in an invoice.
pub const MAX_TIMESTAMP: u64 = (1 << TIMESTAMP_BITS) - 1;

/// The maximum number of 5-bit words a single tagged field's data may occupy.
pub const MAX_TAGGED_FIELD_WORDS: usize = 1023;

/// Builder for [`RawInvoice`]s. Field constructors that can fail (e.g. a too long description)
/// don't fail immediately, the error is returned from [`InvoiceBuilder::build_raw`] instead.
///
/// ```
/// use bitcoin::hashes::{sha256, Hash};
/// use bitcoin::secp256k1::SecretKey;
/// use lightning_invoice_encoder::{Currency, Decimal, InvoiceBuilder, PaymentSecret};
/// use std::time::Duration;
///
/// let private_key = SecretKey::from_slice(&[0xe1; 32]).unwrap();
///
/// let invoice = InvoiceBuilder::new(Currency::Bitcoin)
/// 	.amount(Decimal::new(25, 4))
/// 	.duration_since_epoch(Duration::from_secs(1496314658))
/// 	.payment_hash(sha256::Hash::hash(b"preimage"))
/// 	.payment_secret(PaymentSecret([42; 32]))
/// 	.description("1 cup coffee".into())
/// 	.build_raw()
/// 	.unwrap();
///
/// let token = invoice.encode(&private_key).unwrap();
/// assert!(token.starts_with("lnbc2500u1"));
/// ```
///
/// # Type parameters
/// `T` signals whether the timestamp, the only mandatory field, has been set.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct InvoiceBuilder<T: tb::Bool> {
	currency: Currency,
	amount: Option<Decimal>,
	timestamp: Option<PositiveTimestamp>,
	tagged_fields: Vec<TaggedField>,
	error: Option<CreationError>,
	config: EncodeConfig,

	phantom_t: core::marker::PhantomData<T>,
}

/// An invoice which has not been signed yet. Encoding it does not lose information, the tagged
/// fields are written in exactly the order they appear in `data.tagged_fields`.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct RawInvoice {
	/// The network the invoice is meant for
	pub currency: Currency,

	/// Amount in BTC, `None` (or zero) if the payer may choose
	pub amount: Option<Decimal>,

	/// data part
	pub data: RawDataPart,
}

/// Data of the [`RawInvoice`] that is encoded in the data part
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct RawDataPart {
	/// generation time of the invoice
	pub timestamp: PositiveTimestamp,

	/// tagged fields of the payment request
	pub tagged_fields: Vec<TaggedField>,
}

/// Human readable part of an encoded invoice, i.e. `ln` + currency + amount
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct RawHrp {
	/// The currency deferred from the 3rd and 4th character of the bech32 transaction
	pub currency: Currency,

	/// The amount and its multiplier, `None` if the invoice is for any amount
	pub raw_amount: Option<RawAmount>,
}

/// Represents an encoded and signed invoice. The token is available through its [`Display`]
/// implementation.
///
/// # Invariants
/// `data` starts with the words `hash` was computed over and ends with the words of `signature`.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct SignedRawInvoice {
	/// The rawInvoice that the signature belongs to
	raw_invoice: RawInvoice,

	/// Human readable part as it was hashed and encoded
	hrp: Hrp,

	/// Timestamp, tagged fields and signature as 5-bit words
	data: Vec<Fe32>,

	/// Hash of the human readable part and the signature-less data part
	hash: [u8; 32],

	/// signature of the payment request
	signature: InvoiceSignature,
}

/// A timestamp that refers to a date after 1 January 1970.
///
/// # Invariants
///
/// The Unix timestamp representing the stored time has to be positive and no greater than
/// [`MAX_TIMESTAMP`].
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct PositiveTimestamp(Duration);

/// Enum representing the networks supported by this library
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub enum Currency {
	/// Bitcoin mainnet
	Bitcoin,

	/// Bitcoin testnet
	BitcoinTestnet,

	/// Bitcoin regtest
	Regtest,

	/// Bitcoin simnet
	Simnet,

	/// Bitcoin signet
	Signet,
}

/// Tagged field of an invoice
///
/// For descriptions of the enum values please refer to the enclosed type's docs.
#[allow(missing_docs)]
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub enum TaggedField {
	PaymentHash(Sha256),
	PrivateRoute(PrivateRoute),
	ExpiryTime(ExpiryTime),
	Fallback(Fallback),
	Description(Description),
	PaymentSecret(PaymentSecret),
}

/// SHA-256 hash
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct Sha256(pub sha256::Hash);

/// Description string
///
/// # Invariants
/// The description can be at most 639 __bytes__ long
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct Description(String);

/// Positive duration that defines when (relatively to the timestamp) in the future the invoice
/// expires
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct ExpiryTime(Duration);

/// 32 byte secret the payer has to present along with the payment
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub struct PaymentSecret(pub [u8; 32]);

/// Fallback address in case no LN payment is possible
#[allow(missing_docs)]
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub enum Fallback {
	SegWitProgram {
		version: Fe32,
		program: Vec<u8>,
	},
	PubKeyHash([u8; 20]),
	ScriptHash([u8; 20]),
}

/// Recoverable signature
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct InvoiceSignature(pub RecoverableSignature);

/// Private routing information
///
/// # Invariants
/// The encoded route has to be <1024 5bit characters long (<=637 bytes or <=12 hops)
///
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct PrivateRoute(RouteHint);

/// Tag constants of the supported tagged fields
#[allow(missing_docs)]
pub mod constants {
	pub const TAG_PAYMENT_HASH: u8 = 1;
	pub const TAG_PRIVATE_ROUTE: u8 = 3;
	pub const TAG_EXPIRY_TIME: u8 = 6;
	pub const TAG_FALLBACK: u8 = 9;
	pub const TAG_DESCRIPTION: u8 = 13;
	pub const TAG_PAYMENT_SECRET: u8 = 23;
}

/// Type-level booleans used to track which mandatory builder fields are set.
mod tb {
	/// The field is set
	#[derive(Eq, PartialEq, Debug, Clone)]
	pub struct True {}

	/// The field is not set yet
	#[derive(Eq, PartialEq, Debug, Clone)]
	pub struct False {}

	/// Either [`True`] or [`False`]
	pub trait Bool {}

	impl Bool for True {}
	impl Bool for False {}
}

impl InvoiceBuilder<tb::False> {
	/// Construct new, empty `InvoiceBuilder`. The timestamp has to be set before
	/// [`InvoiceBuilder::build_raw`] becomes available.
	pub fn new(currency: Currency) -> Self {
		InvoiceBuilder {
			currency,
			amount: None,
			timestamp: None,
			tagged_fields: Vec::new(),
			error: None,
			config: EncodeConfig::default(),

			phantom_t: core::marker::PhantomData,
		}
	}
}

impl<T: tb::Bool> InvoiceBuilder<T> {
	/// Helper function to set the completeness flags.
	fn set_flags<TN: tb::Bool>(self) -> InvoiceBuilder<TN> {
		InvoiceBuilder::<TN> {
			currency: self.currency,
			amount: self.amount,
			timestamp: self.timestamp,
			tagged_fields: self.tagged_fields,
			error: self.error,
			config: self.config,

			phantom_t: core::marker::PhantomData,
		}
	}

	/// Sets the options the invoice is validated and signed with. Defaults to
	/// [`EncodeConfig::default`].
	pub fn encode_config(mut self, config: EncodeConfig) -> Self {
		self.config = config;
		self
	}

	/// Sets the amount in BTC. The coarsest exact multiplier is chosen when encoding.
	pub fn amount(mut self, amount: Decimal) -> Self {
		self.amount = Some(amount);
		self
	}

	/// Sets the amount in millisatoshis.
	pub fn amount_milli_satoshis(mut self, amount_msat: u64) -> Self {
		// 1 BTC = 10^11 msat
		self.amount = Some(Decimal::from_i128_with_scale(amount_msat as i128, 11));
		self
	}

	/// Adds the payment hash.
	pub fn payment_hash(mut self, hash: sha256::Hash) -> Self {
		self.tagged_fields.push(TaggedField::PaymentHash(Sha256(hash)));
		self
	}

	/// Adds the payment secret.
	pub fn payment_secret(mut self, payment_secret: PaymentSecret) -> Self {
		self.tagged_fields.push(TaggedField::PaymentSecret(payment_secret));
		self
	}

	/// Adds a description.
	pub fn description(mut self, description: String) -> Self {
		match Description::new(description) {
			Ok(d) => self.tagged_fields.push(TaggedField::Description(d)),
			Err(e) => self.error = Some(e),
		}
		self
	}

	/// Sets the expiry time, dropping the subsecond part.
	pub fn expiry_time(mut self, expiry_time: Duration) -> Self {
		self.tagged_fields.push(TaggedField::ExpiryTime(ExpiryTime::from_duration(expiry_time)));
		self
	}

	/// Adds a fallback address.
	pub fn fallback(mut self, fallback: Fallback) -> Self {
		self.tagged_fields.push(TaggedField::Fallback(fallback));
		self
	}

	/// Adds a private route.
	pub fn private_route(mut self, hint: RouteHint) -> Self {
		match PrivateRoute::new(hint) {
			Ok(r) => self.tagged_fields.push(TaggedField::PrivateRoute(r)),
			Err(e) => self.error = Some(e),
		}
		self
	}

	/// Appends an arbitrary tagged field. Fields keep the order in which they were added.
	pub fn tagged_field(mut self, field: TaggedField) -> Self {
		self.tagged_fields.push(field);
		self
	}
}

impl InvoiceBuilder<tb::False> {
	/// Sets the timestamp to a specific [`SystemTime`].
	pub fn timestamp(mut self, time: SystemTime) -> InvoiceBuilder<tb::True> {
		match PositiveTimestamp::from_system_time(time) {
			Ok(t) => self.timestamp = Some(t),
			Err(e) => self.error = Some(e),
		}

		self.set_flags()
	}

	/// Sets the timestamp to a duration since the Unix epoch, dropping the subsecond part (which
	/// is not representable in invoices).
	pub fn duration_since_epoch(mut self, time: Duration) -> InvoiceBuilder<tb::True> {
		match PositiveTimestamp::from_duration_since_epoch(time) {
			Ok(t) => self.timestamp = Some(t),
			Err(e) => self.error = Some(e),
		}

		self.set_flags()
	}

	/// Sets the timestamp to the current system time.
	pub fn current_timestamp(mut self) -> InvoiceBuilder<tb::True> {
		let now = PositiveTimestamp::from_system_time(SystemTime::now());
		self.timestamp = Some(now.expect("for the foreseeable future this shouldn't happen"));
		self.set_flags()
	}
}

impl InvoiceBuilder<tb::True> {
	/// Builds a [`RawInvoice`] if no [`CreationError`] occurred while constructing any of the
	/// fields and the result passes [`RawInvoice::validate`] under the builder's
	/// [`EncodeConfig`].
	pub fn build_raw(self) -> Result<RawInvoice, CreationError> {
		// If an error occurred at any time before, return it now
		if let Some(e) = self.error {
			return Err(e);
		}

		let timestamp = self.timestamp.expect("ensured to be Some(t) by type T");

		let invoice = RawInvoice {
			currency: self.currency,
			amount: self.amount,
			data: RawDataPart {
				timestamp,
				tagged_fields: self.tagged_fields,
			},
		};
		invoice.validate(&self.config)?;

		Ok(invoice)
	}

	/// Builds and signs an invoice using the supplied `sign_function`. This function MAY NOT fail
	/// and MUST produce a recoverable signature valid for the given hash.
	pub fn build_signed<F>(self, sign_function: F) -> Result<SignedRawInvoice, CreationError>
		where F: FnOnce(&Message) -> RecoverableSignature
	{
		let invoice = self.try_build_signed::<_, Infallible>(|hash| {
			Ok(sign_function(hash))
		});

		match invoice {
			Ok(i) => Ok(i),
			Err(SignOrCreationError::CreationError(e)) => Err(e),
			Err(SignOrCreationError::SignError(never)) => match never {},
		}
	}

	/// Builds and signs an invoice using the supplied `sign_function`. This function MAY fail with
	/// an error of type `E` and MUST produce a recoverable signature valid for the given hash.
	pub fn try_build_signed<F, E>(self, sign_function: F) -> Result<SignedRawInvoice, SignOrCreationError<E>>
		where F: FnOnce(&Message) -> Result<RecoverableSignature, E>
	{
		let config = self.config;
		let raw = self.build_raw()?;
		raw.sign_with_config(&config, sign_function)
	}
}

/// Finds the first element of an enum stream of a given variant and extracts one member of the
/// variant. If no element was found `None` gets returned.
macro_rules! find_extract {
	($iter:expr, $enm:pat, $enm_var:ident) => {
		find_all_extract!($iter, $enm, $enm_var).next()
	};
}

/// Finds the all elements of an enum stream of a given variant and extracts one member of the
/// variant through an iterator.
macro_rules! find_all_extract {
	($iter:expr, $enm:pat, $enm_var:ident) => {
		$iter.filter_map(|tf| match *tf {
			$enm => Some($enm_var),
			_ => None,
		})
	};
}

#[allow(missing_docs)]
impl RawInvoice {
	/// Returns an iterator over all tagged fields, in encoding order.
	pub fn tagged_fields(&self) -> core::slice::Iter<'_, TaggedField> {
		self.data.tagged_fields.iter()
	}

	pub fn payment_hash(&self) -> Option<&Sha256> {
		find_extract!(self.tagged_fields(), TaggedField::PaymentHash(ref x), x)
	}

	pub fn description(&self) -> Option<&Description> {
		find_extract!(self.tagged_fields(), TaggedField::Description(ref x), x)
	}

	pub fn expiry_time(&self) -> Option<&ExpiryTime> {
		find_extract!(self.tagged_fields(), TaggedField::ExpiryTime(ref x), x)
	}

	pub fn payment_secret(&self) -> Option<&PaymentSecret> {
		find_extract!(self.tagged_fields(), TaggedField::PaymentSecret(ref x), x)
	}

	pub fn fallbacks(&self) -> Vec<&Fallback> {
		find_all_extract!(self.tagged_fields(), TaggedField::Fallback(ref x), x).collect()
	}

	pub fn private_routes(&self) -> Vec<&PrivateRoute> {
		find_all_extract!(self.tagged_fields(), TaggedField::PrivateRoute(ref x), x).collect()
	}

	pub fn currency(&self) -> Currency {
		self.currency.clone()
	}

	/// Returns the amount in BTC, treating a zero amount like an absent one.
	pub fn amount(&self) -> Option<Decimal> {
		self.amount.filter(|a| !a.is_zero())
	}

	/// Computes the human readable part, choosing the amount's multiplier according to `config`.
	pub fn hrp(&self, config: &EncodeConfig) -> Result<RawHrp, CreationError> {
		Ok(RawHrp {
			currency: self.currency.clone(),
			raw_amount: RawAmount::from_decimal(self.amount, config)?,
		})
	}
}

impl PositiveTimestamp {
	/// Creates a `PositiveTimestamp` from a Unix timestamp in the range `0..=MAX_TIMESTAMP`.
	///
	/// Otherwise, returns a [`CreationError::TimestampOutOfBounds`].
	pub fn from_unix_timestamp(unix_seconds: u64) -> Result<Self, CreationError> {
		if unix_seconds <= MAX_TIMESTAMP {
			Ok(Self(Duration::from_secs(unix_seconds)))
		} else {
			Err(CreationError::TimestampOutOfBounds)
		}
	}

	/// Creates a `PositiveTimestamp` from a [`SystemTime`] with a corresponding Unix timestamp in
	/// the range `0..=MAX_TIMESTAMP`.
	///
	/// Note that the subsecond part is dropped as it is not representable in invoices.
	///
	/// Otherwise, returns a [`CreationError::TimestampOutOfBounds`].
	pub fn from_system_time(time: SystemTime) -> Result<Self, CreationError> {
		time.duration_since(SystemTime::UNIX_EPOCH)
			.map(Self::from_duration_since_epoch)
			.unwrap_or(Err(CreationError::TimestampOutOfBounds))
	}

	/// Creates a `PositiveTimestamp` from a [`Duration`] since the Unix epoch in the range
	/// `0..=MAX_TIMESTAMP`.
	///
	/// Note that the subsecond part is dropped as it is not representable in invoices.
	///
	/// Otherwise, returns a [`CreationError::TimestampOutOfBounds`].
	pub fn from_duration_since_epoch(duration: Duration) -> Result<Self, CreationError> {
		Self::from_unix_timestamp(duration.as_secs())
	}

	/// Returns the Unix timestamp representing the stored time
	pub fn as_unix_timestamp(&self) -> u64 {
		self.0.as_secs()
	}

	/// Returns the duration of the stored time since the Unix epoch
	pub fn as_duration_since_epoch(&self) -> Duration {
		self.0
	}

	/// Returns the [`SystemTime`] representing the stored time
	pub fn as_time(&self) -> SystemTime {
		SystemTime::UNIX_EPOCH + self.0
	}
}

impl From<PositiveTimestamp> for SystemTime {
	fn from(val: PositiveTimestamp) -> Self {
		SystemTime::UNIX_EPOCH + val.0
	}
}

impl FromStr for Currency {
	type Err = CreationError;

	fn from_str(currency_prefix: &str) -> Result<Self, CreationError> {
		match currency_prefix {
			"bc" => Ok(Currency::Bitcoin),
			"tb" => Ok(Currency::BitcoinTestnet),
			"bcrt" => Ok(Currency::Regtest),
			"sb" => Ok(Currency::Simnet),
			"tbs" => Ok(Currency::Signet),
			_ => Err(CreationError::UnknownCurrency),
		}
	}
}

impl TaggedField {
	/// Numeric representation of the field's tag
	pub fn tag(&self) -> Fe32 {
		let tag = match *self {
			TaggedField::PaymentHash(_) => constants::TAG_PAYMENT_HASH,
			TaggedField::PrivateRoute(_) => constants::TAG_PRIVATE_ROUTE,
			TaggedField::ExpiryTime(_) => constants::TAG_EXPIRY_TIME,
			TaggedField::Fallback(_) => constants::TAG_FALLBACK,
			TaggedField::Description(_) => constants::TAG_DESCRIPTION,
			TaggedField::PaymentSecret(_) => constants::TAG_PAYMENT_SECRET,
		};

		Fe32::try_from(tag).expect("all tags defined are <32")
	}
}

impl Sha256 {
	/// Creates a hash field from a 32 byte slice, returning
	/// [`CreationError::MalformedField`] for any other length.
	pub fn from_slice(bytes: &[u8]) -> Result<Sha256, CreationError> {
		sha256::Hash::from_slice(bytes)
			.map(Sha256)
			.map_err(|_| CreationError::MalformedField(constants::TAG_PAYMENT_HASH))
	}
}

impl Deref for Sha256 {
	type Target = sha256::Hash;

	fn deref(&self) -> &sha256::Hash {
		&self.0
	}
}

impl PaymentSecret {
	/// Creates a payment secret from a 32 byte slice, returning
	/// [`CreationError::MalformedField`] for any other length.
	pub fn from_slice(bytes: &[u8]) -> Result<PaymentSecret, CreationError> {
		bytes.try_into()
			.map(PaymentSecret)
			.map_err(|_| CreationError::MalformedField(constants::TAG_PAYMENT_SECRET))
	}
}

impl Description {
	/// Creates a new `Description` if `description` is at most 639 __bytes__ long,
	/// returns [`CreationError::DescriptionTooLong`] otherwise
	///
	/// Please note that single characters may use more than one byte due to UTF8 encoding.
	pub fn new(description: String) -> Result<Description, CreationError> {
		if description.len() > 639 {
			Err(CreationError::DescriptionTooLong)
		} else {
			Ok(Description(description))
		}
	}

	/// Returns the underlying description `String`
	pub fn into_inner(self) -> String {
		self.0
	}
}

impl From<Description> for String {
	fn from(val: Description) -> Self {
		val.into_inner()
	}
}

impl Deref for Description {
	type Target = str;

	fn deref(&self) -> &str {
		&self.0
	}
}

impl ExpiryTime {
	/// Construct an `ExpiryTime` from seconds.
	pub fn from_seconds(seconds: u64) -> ExpiryTime {
		ExpiryTime(Duration::from_secs(seconds))
	}

	/// Construct an `ExpiryTime` from a `Duration`, dropping the sub-second part.
	pub fn from_duration(duration: Duration) -> ExpiryTime {
		Self::from_seconds(duration.as_secs())
	}

	/// Returns the expiry time in seconds
	pub fn as_seconds(&self) -> u64 {
		self.0.as_secs()
	}

	/// Returns a reference to the underlying `Duration` (=expiry time)
	pub fn as_duration(&self) -> &Duration {
		&self.0
	}
}

impl Fallback {
	/// Builds a fallback from its on-chain address type and raw address bytes.
	///
	/// Types `0..=16` are SegWit versions with a 2 to 40 byte program, 17 is a 20 byte pubkey
	/// hash and 18 a 20 byte script hash. Anything else is a [`CreationError::MalformedField`].
	pub fn from_parts(address_type: u8, address: &[u8]) -> Result<Fallback, CreationError> {
		let malformed = CreationError::MalformedField(constants::TAG_FALLBACK);
		match address_type {
			0..=16 => {
				if address.len() < 2 || address.len() > 40 {
					return Err(malformed);
				}
				Ok(Fallback::SegWitProgram {
					version: Fe32::try_from(address_type).expect("<= 16"),
					program: address.to_vec(),
				})
			},
			17 => address.try_into().map(Fallback::PubKeyHash).map_err(|_| malformed),
			18 => address.try_into().map(Fallback::ScriptHash).map_err(|_| malformed),
			_ => Err(malformed),
		}
	}

	/// The address type written in front of the address bytes.
	pub fn address_type(&self) -> Fe32 {
		match *self {
			Fallback::SegWitProgram { version, .. } => version,
			Fallback::PubKeyHash(_) => Fe32::try_from(17u8).expect("17 < 32"),
			Fallback::ScriptHash(_) => Fe32::try_from(18u8).expect("18 < 32"),
		}
	}

	/// The raw address bytes.
	pub fn address(&self) -> &[u8] {
		match *self {
			Fallback::SegWitProgram { ref program, .. } => program,
			Fallback::PubKeyHash(ref hash) | Fallback::ScriptHash(ref hash) => &hash[..],
		}
	}
}

impl PrivateRoute {
	/// Creates a new (partial) route from a list of hops
	pub fn new(hops: RouteHint) -> Result<PrivateRoute, CreationError> {
		if hops.0.len() <= 12 {
			Ok(PrivateRoute(hops))
		} else {
			Err(CreationError::RouteTooLong)
		}
	}

	/// Returns the underlying list of hops
	pub fn into_inner(self) -> RouteHint {
		self.0
	}
}

impl From<PrivateRoute> for RouteHint {
	fn from(val: PrivateRoute) -> Self {
		val.into_inner()
	}
}

impl Deref for PrivateRoute {
	type Target = RouteHint;

	fn deref(&self) -> &RouteHint {
		&self.0
	}
}

impl Deref for InvoiceSignature {
	type Target = RecoverableSignature;

	fn deref(&self) -> &RecoverableSignature {
		&self.0
	}
}

impl SignedRawInvoice {
	/// Disassembles the `SignedRawInvoice` into its three parts:
	///  1. raw invoice
	///  2. hash of the raw invoice
	///  3. signature
	pub fn into_parts(self) -> (RawInvoice, [u8; 32], InvoiceSignature) {
		(self.raw_invoice, self.hash, self.signature)
	}

	/// The `RawInvoice` which was signed.
	pub fn raw_invoice(&self) -> &RawInvoice {
		&self.raw_invoice
	}

	/// The human readable part of the token.
	pub fn hrp(&self) -> &Hrp {
		&self.hrp
	}

	/// All 5-bit words of the data part, including the trailing signature.
	pub fn data(&self) -> &[Fe32] {
		&self.data
	}

	/// The hash of the `RawInvoice` that was signed.
	pub fn signable_hash(&self) -> &[u8; 32] {
		&self.hash
	}

	/// InvoiceSignature for the invoice.
	pub fn signature(&self) -> &InvoiceSignature {
		&self.signature
	}

	/// Recovers the public key used for signing the invoice from the recoverable signature.
	pub fn recover_payee_pub_key(&self) -> Result<PublicKey, secp256k1::Error> {
		let hash = Message::from_digest(self.hash);
		secp256k1::Secp256k1::verification_only().recover_ecdsa(&hash, &self.signature)
	}

	/// Checks if the signature is valid for `pub_key`.
	pub fn check_signature(&self, pub_key: &PublicKey) -> bool {
		let hash = Message::from_digest(self.hash);
		secp256k1::Secp256k1::verification_only()
			.verify_ecdsa(&hash, &self.signature.to_standard(), pub_key)
			.is_ok()
	}
}

impl Deref for SignedRawInvoice {
	type Target = RawInvoice;

	fn deref(&self) -> &RawInvoice {
		&self.raw_invoice
	}
}

/// Errors that may occur when constructing or encoding a [`RawInvoice`]. Every error is returned
/// before any output is produced.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum CreationError {
	/// The network identifier is not one of the known currencies
	UnknownCurrency,

	/// The amount is negative, greater than the total bitcoin supply, or too large to be written
	/// with its multiplier.
	InvalidAmount,

	/// The amount needs more than twelve fractional digits and the configured
	/// [`ImpreciseAmountPolicy`] is [`ImpreciseAmountPolicy::Reject`].
	ImpreciseAmount,

	/// The Unix timestamp of the supplied date is less than zero or greater than 35-bits
	TimestampOutOfBounds,

	/// The payload of the tagged field with the given tag doesn't have its fixed length
	MalformedField(u8),

	/// The supplied description string was longer than 639 __bytes__ (see [`Description::new`])
	DescriptionTooLong,

	/// The specified route has too many hops and can't be encoded
	RouteTooLong,

	/// The expiry time can't be written in the number of words derived from its value
	ExpiryTimeOutOfBounds,
}

impl Display for CreationError {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			CreationError::UnknownCurrency => f.write_str("The network identifier is not a known currency"),
			CreationError::InvalidAmount => f.write_str("The supplied amount was negative or greater than the total bitcoin supply"),
			CreationError::ImpreciseAmount => f.write_str("The supplied amount is more precise than one pico-BTC"),
			CreationError::TimestampOutOfBounds => f.write_str("The Unix timestamp of the supplied date is less than zero or greater than 35-bits"),
			CreationError::MalformedField(tag) => write!(f, "The payload of tagged field {} doesn't have the required length", tag),
			CreationError::DescriptionTooLong => f.write_str("The supplied description string was longer than 639 bytes"),
			CreationError::RouteTooLong => f.write_str("The specified route has too many hops and can't be encoded"),
			CreationError::ExpiryTimeOutOfBounds => f.write_str("The supplied expiry time can't be encoded"),
		}
	}
}

impl std::error::Error for CreationError { }

/// When signing using a fallible method either an user-supplied `SignError` or a [`CreationError`]
/// may occur.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum SignOrCreationError<S = ()> {
	/// An error occurred during signing
	SignError(S),

	/// An error occurred while building the invoice
	CreationError(CreationError),
}

impl<S> From<CreationError> for SignOrCreationError<S> {
	fn from(e: CreationError) -> Self {
		SignOrCreationError::CreationError(e)
	}
}

impl<S> Display for SignOrCreationError<S> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			SignOrCreationError::SignError(_) => f.write_str("An error occurred during signing"),
			SignOrCreationError::CreationError(err) => err.fmt(f),
		}
	}
}

#[cfg(feature = "serde")]
impl Serialize for SignedRawInvoice {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where S: Serializer {
		serializer.serialize_str(self.to_string().as_str())
	}
}

#[cfg(feature = "serde")]
impl Serialize for Currency {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where S: Serializer {
		serializer.serialize_str(self.to_string().as_str())
	}
}
