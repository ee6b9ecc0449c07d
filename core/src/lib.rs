pub mod asset;
pub mod caps;
pub mod format;
pub mod pixel;
pub mod registry;

/// Converts a 4-byte string into a 32-bit little endian integer.
/// Byte strings longer than 4 bytes are truncated.
#[macro_export]
macro_rules! rtag4 {
	($b4: literal) => {
		u32::from_le_bytes([$b4[0], $b4[1], $b4[2], $b4[3]])
	}
}

/// Scales a 5 bit value to 8 bits
pub const fn scale5to8(b: u8) -> u8 {
	b << 3 | b >> 2
}

/// Scales an 8 bit value to 5 bits
pub const fn scale8to5(b: u8) -> u8 {
	(b & 0xF8) >> 3
}

/// Scales a 6 bit VGA DAC value to 8 bits
pub const fn scale6to8(b: u8) -> u8 {
	b << 2 | b >> 4
}

/// Scales an 8 bit value to 6 bits
pub const fn scale8to6(b: u8) -> u8 {
	(b & 0xFC) >> 2
}
