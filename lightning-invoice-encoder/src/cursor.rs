// This file is Copyright its original authors, visible in version control
// history.
//
// This file is licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your option.
// You may not use this file except in accordance with one or both of these
// licenses.

//! A write-only accumulator of 5-bit words.

use bech32::Fe32;

/// Collects integers and byte strings as a stream of 5-bit words (`Fe32`s).
///
/// Bytes written through [`WordCursor::write_bytes`] are packed back to back, so two calls act
/// like a single call with the concatenated input. Whenever an integer is written or the words
/// are read out, a trailing partial word is completed with zero bits first.
pub(crate) struct WordCursor {
	/// Completed words.
	words: Vec<Fe32>,
	/// Holds all unwritten bits left over from the last byte. The bits are stored beginning from
	/// the most significant bit. E.g. if buffer_bits=3, then the byte with bits a, b and c will
	/// look as follows: [a, b, c, 0, 0, 0, 0, 0]
	buffer: u8,
	/// Amount of bits left over from the last byte, stored in buffer.
	buffer_bits: u8,
}

impl WordCursor {
	pub fn new() -> WordCursor {
		WordCursor { words: Vec::new(), buffer: 0, buffer_bits: 0 }
	}

	/// Appends `value` across exactly `num_words` words, most significant word first.
	///
	/// Panics if `value` does not fit into `5 * num_words` bits.
	pub fn write_uint(&mut self, value: u64, num_words: usize) {
		self.flush();

		let width = 5 * num_words;
		assert!(width >= 64 || value >> width == 0, "{} does not fit into {} words", value, num_words);

		self.words.reserve(num_words);
		for pos in (0..num_words).rev() {
			let shift = 5 * pos;
			let word = if shift >= 64 { 0 } else { ((value >> shift) & 0x1f) as u8 };
			self.push(word);
		}
	}

	/// Re-packs `bytes` into 5-bit words, most significant bit first.
	pub fn write_bytes(&mut self, bytes: &[u8]) {
		for b in bytes {
			self.write_u8(*b);
		}
	}

	fn write_u8(&mut self, byte: u8) {
		// Write first word if we have to write two words this round. That only happens if the
		// buffer holds too many bits, so we don't have to combine buffer bits with new bits
		// from this round's byte.
		if self.buffer_bits >= 5 {
			self.push((self.buffer & 0b1111_1000) >> 3);
			self.buffer <<= 5;
			self.buffer_bits -= 5;
		}

		// Combine all bits from buffer with enough bits from this round's byte so that they fill
		// a word. Save remaining bits from byte to buffer.
		let from_buffer = self.buffer >> 3;
		let from_byte = byte >> (3 + self.buffer_bits); // buffer_bits <= 4

		self.push(from_buffer | from_byte);
		self.buffer = byte << (5 - self.buffer_bits);
		self.buffer_bits += 3;
	}

	/// Emits all buffered bits, zero-padding the last word.
	fn flush(&mut self) {
		// There can be at most two words left in the buffer.
		if self.buffer_bits >= 5 {
			self.push((self.buffer & 0b1111_1000) >> 3);
			self.buffer <<= 5;
			self.buffer_bits -= 5;
		}

		if self.buffer_bits != 0 {
			self.push(self.buffer >> 3);
		}

		self.buffer = 0;
		self.buffer_bits = 0;
	}

	fn push(&mut self, word: u8) {
		self.words.push(Fe32::try_from(word).expect("masked to < 32"));
	}

	/// Returns all words written so far, completing a trailing partial word.
	pub fn words(&mut self) -> &[Fe32] {
		self.flush();
		&self.words
	}

	pub fn into_words(mut self) -> Vec<Fe32> {
		self.flush();
		self.words
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn to_u8s(words: &[Fe32]) -> Vec<u8> {
		words.iter().map(|w| w.to_u8()).collect()
	}

	#[test]
	fn uint_is_big_endian_and_padded_to_width() {
		let mut cursor = WordCursor::new();
		cursor.write_uint(33764, 4);
		cursor.write_uint(1, 3);
		assert_eq!(to_u8s(cursor.words()), vec![1, 0, 31, 4, 0, 0, 1]);
	}

	#[test]
	fn zero_width_uint_writes_nothing() {
		let mut cursor = WordCursor::new();
		cursor.write_uint(0, 0);
		assert!(cursor.words().is_empty());
	}

	#[test]
	fn wide_uint_has_leading_zero_words() {
		let mut cursor = WordCursor::new();
		cursor.write_uint(u64::MAX, 15);
		let words = cursor.into_words();
		assert_eq!(words.len(), 15);
		// 15 words hold 75 bits, so the first 11 bits are zero.
		assert_eq!(to_u8s(&words[..3]), vec![0, 0, 15]);
		assert!(words[3..].iter().all(|w| w.to_u8() == 31));
	}

	#[test]
	#[should_panic]
	fn uint_overflowing_its_width_panics() {
		let mut cursor = WordCursor::new();
		cursor.write_uint(32, 1);
	}

	#[test]
	fn bytes_are_repacked_msb_first() {
		let cases: Vec<(&[u8], Vec<u8>)> = vec![
			(&[0][..], vec![0, 0]),
			(&[255][..], vec![31, 28]),
			(&[0, 1][..], vec![0, 0, 0, 16]),
			(&[0, 1, 2, 3, 4][..], vec![0, 0, 0, 16, 4, 0, 24, 4]),
		];
		for (input, expected) in cases {
			let mut cursor = WordCursor::new();
			cursor.write_bytes(input);
			assert_eq!(to_u8s(cursor.words()), expected, "input {:?}", input);
		}
	}

	#[test]
	fn consecutive_byte_writes_are_contiguous() {
		let mut split = WordCursor::new();
		split.write_bytes(&[0xab, 0xcd]);
		split.write_bytes(&[0xef]);

		let mut joined = WordCursor::new();
		joined.write_bytes(&[0xab, 0xcd, 0xef]);

		assert_eq!(split.into_words(), joined.into_words());
	}

	#[test]
	fn uint_after_bytes_starts_on_a_fresh_word() {
		let mut cursor = WordCursor::new();
		cursor.write_bytes(&[0xff]);
		cursor.write_uint(3, 1);
		assert_eq!(to_u8s(cursor.words()), vec![31, 28, 3]);
	}

	#[test]
	fn signature_and_recovery_id_fill_104_words() {
		let mut cursor = WordCursor::new();
		cursor.write_bytes(&[0x11; 64]);
		cursor.write_uint(1, 1);
		assert_eq!(cursor.into_words().len(), 104);
	}
}
