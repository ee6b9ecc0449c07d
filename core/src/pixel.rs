use crate::{
	scale5to8,
	scale6to8,
	scale8to5,
	scale8to6
};

/// An 8 bits per channel RGBA color, the common currency between formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
	pub red: u8,
	pub green: u8,
	pub blue: u8,
	pub alpha: u8,
}

impl Color {
	/// Fully transparent sentinel used to pad rewritten color tables.
	pub const EMPTY: Color = Color {
		red: 0,
		green: 0,
		blue: 0,
		alpha: 0,
	};

	pub const fn opaque(red: u8, green: u8, blue: u8) -> Color {
		Color {
			red: red,
			green: green,
			blue: blue,
			alpha: 255,
		}
	}

	/// Builds a color from a 16-bit RGBA5551 value, alpha in the low bit.
	pub fn from_rgba5551(color: u16) -> Color {
		Color {
			red: scale5to8(((color >> 11) & 31) as u8),
			green: scale5to8(((color >> 6) & 31) as u8),
			blue: scale5to8(((color >> 1) & 31) as u8),
			alpha: if color & 1 != 0 { 255 } else { 0 },
		}
	}

	pub fn to_rgba5551(&self) -> u16 {
		((scale8to5(self.red) as u16) << 11) | ((scale8to5(self.green) as u16) << 6) |
			((scale8to5(self.blue) as u16) << 1) | if self.alpha >= 128 { 1 } else { 0 }
	}

	/// Builds a color from three 6-bit VGA DAC values.
	pub fn from_vga6(red: u8, green: u8, blue: u8) -> Color {
		Color {
			red: scale6to8(red),
			green: scale6to8(green),
			blue: scale6to8(blue),
			alpha: 255,
		}
	}

	pub fn to_vga6(&self) -> (u8, u8, u8) {
		(scale8to6(self.red), scale8to6(self.green), scale8to6(self.blue))
	}
}

/// Returns the byte length of one packed row at the given bit depth.
pub const fn stride(width: usize, bpp: u8) -> usize {
	(width * bpp as usize + 7) / 8
}

/// Expands packed 1/4/8 bpp rows into one index byte per pixel.
/// Bits within a byte are consumed most significant first.
pub fn unpack_indices(data: &[u8], width: usize, height: usize, bpp: u8) -> Vec<u8> {
	let row_len = stride(width, bpp);
	let mut indices = Vec::with_capacity(width * height);

	for y in 0..height {
		let row = &data[(y * row_len)..((y + 1) * row_len)];

		for x in 0..width {
			let index = match bpp {
				1 => (row[x / 8] >> (7 - (x % 8))) & 1,
				4 => {
					if x % 2 == 0 {
						row[x / 2] >> 4
					} else {
						row[x / 2] & 0x0F
					}
				},
				_ => row[x],
			};

			indices.push(index);
		}
	}

	indices
}

/// Packs one-byte-per-pixel indices back into 1/4/8 bpp rows.
pub fn pack_indices(indices: &[u8], width: usize, height: usize, bpp: u8) -> Vec<u8> {
	let row_len = stride(width, bpp);
	let mut data = vec![0; row_len * height];

	for y in 0..height {
		for x in 0..width {
			let index = indices[(y * width) + x];
			let row = &mut data[(y * row_len)..((y + 1) * row_len)];

			match bpp {
				1 => row[x / 8] |= (index & 1) << (7 - (x % 8)),
				4 => {
					if x % 2 == 0 {
						row[x / 2] |= (index & 0x0F) << 4;
					} else {
						row[x / 2] |= index & 0x0F;
					}
				},
				_ => row[x] = index,
			}
		}
	}

	data
}
