//! Sliding-window codec used by several late-80s/early-90s asset formats.
//!
//! The compressed stream is a sequence of commands, each introduced by one
//! control byte:
//!
//! * `0x00` — end of stream.
//! * `0x01..=0x7F` — short match: copies `((cmd >> 4) & 7) + 3` bytes from
//!   `((cmd & 0x0F) << 8) | next` bytes behind the write cursor.
//! * `0x80..=0xBF` — literal span: copies `(cmd & 0x3F) + 1` input bytes
//!   verbatim.
//! * `0xC0..=0xFF` except `0xFE` — long match: copies `(cmd & 0x3F) + 3`
//!   bytes from a 16-bit little endian back-offset.
//! * `0xFE` — run fill: one count byte `n` selects `n + 3` repeats of the
//!   following value byte; `n == 0xFF` instead reads a second count byte
//!   `m` for `258 + m` repeats.
//!
//! The count biases (+1 on literals, +3 on matches and fills) are constants
//! of the format, inclusive counts exactly as encoded. Matches may overlap
//! the write cursor, which replicates the overlapped bytes.
//!
//! Running out of input mid-command stops decoding and returns whatever was
//! produced so far. Legacy files are routinely a few bytes short and the
//! original decoders tolerated that, so it is kept as documented behavior
//! rather than an error; [`decompress_with_stats`] reports the cut so
//! callers that do care can detect it.

const END: u8 = 0x00;
const RUN: u8 = 0xFE;

/// Literal span counts are stored minus this.
const LITERAL_BIAS: usize = 1;
/// Match and run counts are stored minus this.
const MATCH_BIAS: usize = 3;
/// Smallest count an extended run fill can express.
const LONG_RUN_BIAS: usize = 258;

const MAX_LITERAL: usize = 64;
const MAX_SHORT_COPY: usize = 10;
const MAX_LONG_COPY: usize = 66;
const MAX_SHORT_OFFSET: usize = 4095;

/// Decode diagnostics; `consumed == total` and `!truncated` describe a
/// stream that ended cleanly on its own terminator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stats {
	/// Input bytes actually consumed.
	pub consumed: usize,
	/// Input bytes supplied.
	pub total: usize,
	/// Set when the stream ended mid-command or a match referenced data
	/// that was never produced.
	pub truncated: bool,
}

pub fn decompress(src: &[u8]) -> Vec<u8> {
	decompress_with_stats(src).0
}

pub fn decompress_with_stats(src: &[u8]) -> (Vec<u8>, Stats) {
	// The format carries no total-size header, so the buffer is sized
	// generously up front and trimmed to the actual write cursor at the end.
	let mut out: Vec<u8> = Vec::with_capacity(src.len().saturating_mul(4).max(64));
	let mut i = 0;
	let mut truncated = false;

	loop {
		if i >= src.len() {
			truncated = true;
			break;
		}

		let cmd = src[i];
		i += 1;

		if cmd == END {
			break;
		}

		if cmd & 0x80 == 0 {
			// short match
			if i >= src.len() {
				truncated = true;
				break;
			}

			let count = (((cmd >> 4) & 0x07) as usize) + MATCH_BIAS;
			let offset = (((cmd & 0x0F) as usize) << 8) | src[i] as usize;
			i += 1;

			if offset == 0 || offset > out.len() {
				truncated = true;
				break;
			}

			copy_back(&mut out, offset, count);
		} else if cmd & 0x40 == 0 {
			// literal span
			let count = ((cmd & 0x3F) as usize) + LITERAL_BIAS;
			let available = src.len() - i;
			let take = count.min(available);

			out.extend_from_slice(&src[i..(i + take)]);
			i += take;

			if take < count {
				truncated = true;
				break;
			}
		} else if cmd == RUN {
			// run fill
			if i >= src.len() {
				truncated = true;
				break;
			}

			let n = src[i];
			i += 1;

			let count = if n != 0xFF {
				n as usize + MATCH_BIAS
			} else {
				if i >= src.len() {
					truncated = true;
					break;
				}

				let m = src[i];
				i += 1;
				LONG_RUN_BIAS + m as usize
			};

			if i >= src.len() {
				truncated = true;
				break;
			}

			let value = src[i];
			i += 1;

			out.resize(out.len() + count, value);
		} else {
			// long match
			if i + 2 > src.len() {
				i = src.len();
				truncated = true;
				break;
			}

			let count = ((cmd & 0x3F) as usize) + MATCH_BIAS;
			let offset = u16::from_le_bytes([src[i], src[i + 1]]) as usize;
			i += 2;

			if offset == 0 || offset > out.len() {
				truncated = true;
				break;
			}

			copy_back(&mut out, offset, count);
		}
	}

	out.shrink_to_fit();

	let stats = Stats {
		consumed: i,
		total: src.len(),
		truncated: truncated,
	};

	(out, stats)
}

/// Byte-at-a-time so overlapping matches replicate.
fn copy_back(out: &mut Vec<u8>, offset: usize, count: usize) {
	let start = out.len() - offset;

	for k in 0..count {
		let b = out[start + k];
		out.push(b);
	}
}

/// Greedy encoder. Favors run fills, then window matches, then literals;
/// the output always decodes back to the input but makes no optimality
/// claim beyond that.
pub fn compress(src: &[u8]) -> Vec<u8> {
	let mut out = vec![];
	let mut i = 0;
	let mut lit_start = 0;

	while i < src.len() {
		let run = run_length(src, i);

		if run >= MATCH_BIAS {
			flush_literals(&mut out, &src[lit_start..i]);

			let mut remaining = run;
			while remaining >= MATCH_BIAS {
				let chunk = remaining.min(LONG_RUN_BIAS + 255);

				out.push(RUN);
				if chunk < LONG_RUN_BIAS {
					out.push((chunk - MATCH_BIAS) as u8);
				} else {
					out.push(0xFF);
					out.push((chunk - LONG_RUN_BIAS) as u8);
				}
				out.push(src[i]);

				i += chunk;
				remaining -= chunk;
			}

			lit_start = i;
			continue;
		}

		if let Some((offset, count)) = find_match(src, i) {
			flush_literals(&mut out, &src[lit_start..i]);

			let short_cmd = (((count - MATCH_BIAS) as u8) << 4) | ((offset >> 8) as u8);

			if count <= MAX_SHORT_COPY && offset <= MAX_SHORT_OFFSET && short_cmd != END {
				out.push(short_cmd);
				out.push((offset & 0xFF) as u8);
			} else {
				let mut count = count;
				let mut cmd = 0xC0 | ((count - MATCH_BIAS) as u8);

				// 0xFE is the run fill opcode, not a usable copy length.
				if cmd == RUN {
					count -= 1;
					cmd = 0xC0 | ((count - MATCH_BIAS) as u8);
				}

				out.push(cmd);
				out.extend_from_slice(&(offset as u16).to_le_bytes());
			}

			i += count_after_opcode(short_cmd, count);
			lit_start = i;
			continue;
		}

		i += 1;
	}

	flush_literals(&mut out, &src[lit_start..]);
	out.push(END);
	out
}

// The long form may have shortened the match by one to dodge the run fill
// opcode; recompute what was actually emitted.
fn count_after_opcode(short_cmd: u8, count: usize) -> usize {
	if count <= MAX_SHORT_COPY && short_cmd != END {
		return count;
	}

	if 0xC0 | ((count - MATCH_BIAS) as u8) == RUN {
		count - 1
	} else {
		count
	}
}

fn run_length(src: &[u8], i: usize) -> usize {
	let value = src[i];
	let mut n = 1;

	while i + n < src.len() && src[i + n] == value {
		n += 1;
	}

	n
}

/// Longest match of at least three bytes ending within the last 4095
/// output bytes. The decoder accepts 16-bit offsets; the encoder keeps the
/// search window small on purpose.
fn find_match(src: &[u8], i: usize) -> Option<(usize, usize)> {
	let window_start = i.saturating_sub(MAX_SHORT_OFFSET);
	let max_count = (src.len() - i).min(MAX_LONG_COPY);

	let mut best: Option<(usize, usize)> = None;

	for j in window_start..i {
		let mut count = 0;

		while count < max_count && src[j + count] == src[i + count] {
			count += 1;
		}

		if count >= MATCH_BIAS && best.map_or(true, |(_, b)| count > b) {
			best = Some((i - j, count));
		}
	}

	best
}

fn flush_literals(out: &mut Vec<u8>, mut literals: &[u8]) {
	while !literals.is_empty() {
		let chunk = literals.len().min(MAX_LITERAL);

		out.push(0x80 | ((chunk - LITERAL_BIAS) as u8));
		out.extend_from_slice(&literals[..chunk]);
		literals = &literals[chunk..];
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_zero_byte_ends_immediately() {
		let (out, stats) = decompress_with_stats(&[0x00]);

		assert!(out.is_empty());
		assert!(!stats.truncated);
		assert_eq!(1, stats.consumed);
	}

	#[test]
	fn test_empty_input_is_a_truncated_empty_stream() {
		let (out, stats) = decompress_with_stats(&[]);

		assert!(out.is_empty());
		assert!(stats.truncated);
	}

	#[test]
	fn test_literal_span() {
		assert_eq!(b"abc".to_vec(), decompress(&[0x82, b'a', b'b', b'c', 0x00]));
	}

	#[test]
	fn test_run_fill() {
		// 0 + bias of 3
		assert_eq!(vec![b'A'; 3], decompress(&[0xFE, 0x00, b'A', 0x00]));
		assert_eq!(vec![b'B'; 257], decompress(&[0xFE, 0xFE, b'B', 0x00]));
	}

	#[test]
	fn test_extended_run_fill() {
		assert_eq!(vec![b'C'; 258], decompress(&[0xFE, 0xFF, 0x00, b'C', 0x00]));
		assert_eq!(vec![b'D'; 513], decompress(&[0xFE, 0xFF, 0xFF, b'D', 0x00]));
	}

	#[test]
	fn test_short_match() {
		// "ab", then copy 4 bytes from 2 back: "ababab"
		let src = [0x81, b'a', b'b', 0x10, 0x02, 0x00];
		assert_eq!(b"ababab".to_vec(), decompress(&src));
	}

	#[test]
	fn test_long_match() {
		// "abc", then copy 3 bytes from 3 back
		let src = [0x82, b'a', b'b', b'c', 0xC0, 0x03, 0x00, 0x00];
		assert_eq!(b"abcabc".to_vec(), decompress(&src));
	}

	#[test]
	fn test_overlapping_match_replicates() {
		// "x", then copy 8 bytes from 1 back
		let src = [0x80, b'x', 0xC5, 0x01, 0x00, 0x00];
		assert_eq!(vec![b'x'; 9], decompress(&src));
	}

	#[test]
	fn test_truncated_literal_keeps_partial_output() {
		// literal of 6, only one byte follows
		let (out, stats) = decompress_with_stats(&[0x85, b'x']);

		assert_eq!(b"x".to_vec(), out);
		assert!(stats.truncated);
		assert_eq!(2, stats.consumed);
	}

	#[test]
	fn test_truncated_match_command() {
		let (out, stats) = decompress_with_stats(&[0x10]);

		assert!(out.is_empty());
		assert!(stats.truncated);
	}

	#[test]
	fn test_bad_offset_stops_silently() {
		// copy from 5 back with only 1 byte produced
		let (out, stats) = decompress_with_stats(&[0x80, b'x', 0x30, 0x05, 0x00]);

		assert_eq!(b"x".to_vec(), out);
		assert!(stats.truncated);
	}

	#[test]
	fn test_compress_empty() {
		assert_eq!(vec![0x00], compress(&[]));
		assert!(decompress(&compress(&[])).is_empty());
	}

	fn round_trip(data: &[u8]) {
		let packed = compress(data);
		let (out, stats) = decompress_with_stats(&packed);

		assert_eq!(data, out.as_slice());
		assert!(!stats.truncated);
		assert_eq!(stats.total, stats.consumed);
	}

	#[test]
	fn test_round_trips() {
		round_trip(b"a");
		round_trip(b"abcabcabcabcabc");
		round_trip(&[0x55; 5000]);
		round_trip(b"the quick brown fox jumps over the lazy dog, the quick brown fox");

		let mut mixed = vec![];
		for i in 0..2000usize {
			mixed.push((i * 31 % 251) as u8);
		}
		mixed.extend_from_slice(&[0; 300]);
		let head = mixed[..500].to_vec();
		mixed.extend_from_slice(&head);
		round_trip(&mixed);
	}

	#[test]
	fn test_compress_prefers_runs() {
		let packed = compress(&[0xAA; 100]);

		// one run fill plus the terminator
		assert_eq!(vec![0xFE, 100 - 3, 0xAA, 0x00], packed);
	}
}
