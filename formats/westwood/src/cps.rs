use std::fs;
use std::io::Cursor;
use std::path::Path;

use byteorder::{
	LE,
	ReadBytesExt,
	WriteBytesExt
};
use log::debug;

use rak_codecs::lcw;
use rak_core::asset::{
	Asset,
	AssetTree
};
use rak_core::caps::Caps;
use rak_core::format::{
	Format,
	LoadError,
	LoadErrorKind,
	SaveError
};
use rak_core::pixel::Color;

pub const NAME: &str = "CPS";

pub const WIDTH: usize = 320;
pub const HEIGHT: usize = 200;
pub const IMAGE_SIZE: usize = WIDTH * HEIGHT;
pub const HEADER_SIZE: usize = 10;
pub const PALETTE_SIZE: usize = 768;

pub const COMPRESSION_NONE: u16 = 0;
pub const COMPRESSION_LCW: u16 = 4;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Header {
	/// File length minus the size of this field.
	pub file_size: u16,
	pub compression: u16,
	pub image_size: u32,
	pub palette_size: u16,
}

impl Header {
	fn read<R>(buf: &mut R) -> Result<Header, LoadErrorKind>
	where
		R: ReadBytesExt,
	{
		Ok(Header {
			file_size: buf.read_u16::<LE>()?,
			compression: buf.read_u16::<LE>()?,
			image_size: buf.read_u32::<LE>()?,
			palette_size: buf.read_u16::<LE>()?,
		})
	}

	fn write<W>(&self, buf: &mut W) -> std::io::Result<()>
	where
		W: WriteBytesExt,
	{
		buf.write_u16::<LE>(self.file_size)?;
		buf.write_u16::<LE>(self.compression)?;
		buf.write_u32::<LE>(self.image_size)?;
		buf.write_u16::<LE>(self.palette_size)
	}
}

/// Westwood full-screen image: always 320×200 at 8 bpp, LCW compressed,
/// with an optional embedded 6-bit VGA palette. Files without an embedded
/// palette often ship with a sibling `.pal`, which is picked up when a
/// source path is available.
pub struct Cps;

impl Cps {
	fn parse(&self, data: &[u8], source: Option<&Path>) -> Result<AssetTree, LoadErrorKind> {
		if data.len() < HEADER_SIZE {
			return Err(LoadErrorKind::TooShort {
				got: data.len(),
				need: HEADER_SIZE,
			});
		}

		let header = Header::read(&mut Cursor::new(data))?;

		if header.file_size as usize != data.len() - 2 {
			return Err(LoadErrorKind::Range {
				field: "file size",
				value: header.file_size as u64,
			});
		}

		if header.compression != COMPRESSION_NONE && header.compression != COMPRESSION_LCW {
			return Err(LoadErrorKind::Range {
				field: "compression",
				value: header.compression as u64,
			});
		}

		if header.image_size as usize != IMAGE_SIZE {
			return Err(LoadErrorKind::Range {
				field: "image size",
				value: header.image_size as u64,
			});
		}

		if header.palette_size != 0 && header.palette_size as usize != PALETTE_SIZE {
			return Err(LoadErrorKind::Range {
				field: "palette size",
				value: header.palette_size as u64,
			});
		}

		let palette_end = HEADER_SIZE + header.palette_size as usize;
		if data.len() < palette_end {
			return Err(LoadErrorKind::TooShort {
				got: data.len(),
				need: palette_end,
			});
		}

		let colors = if header.palette_size != 0 {
			read_vga_palette(&data[HEADER_SIZE..palette_end])?
		} else {
			companion_palette(source)
		};

		let body = &data[palette_end..];
		let pixels = match header.compression {
			COMPRESSION_LCW => lcw::decompress(body),
			_ => body.to_vec(),
		};

		if pixels.len() != IMAGE_SIZE {
			return Err(LoadErrorKind::Codec {
				got: pixels.len(),
				expected: IMAGE_SIZE,
			});
		}

		let mut asset = Asset::indexed(WIDTH, HEIGHT, 8, pixels, colors);
		asset.name = crate::display_name(source);
		asset.info = format!(
			"CPS, {}, {}",
			if header.compression == COMPRESSION_LCW { "LCW" } else { "stored" },
			if header.palette_size != 0 { "embedded palette" } else { "no palette" },
		);

		Ok(AssetTree::new(asset))
	}
}

impl Format for Cps {
	fn name(&self) -> &'static str {
		NAME
	}

	fn description(&self) -> &'static str {
		"Westwood 320x200 8-bit image"
	}

	fn extensions(&self) -> &'static [&'static str] {
		&["cps"]
	}

	fn input_caps(&self) -> Caps {
		Caps::BPP_8
	}

	fn try_load(&self, data: &[u8], source: Option<&Path>) -> Result<AssetTree, LoadError> {
		self.parse(data, source).map_err(|kind| LoadError::new(NAME, kind))
	}

	fn save(&self, tree: &AssetTree) -> Result<Vec<u8>, SaveError> {
		let asset = tree.asset(tree.root());

		let fits = asset.indexed && asset.bits_per_sample == 8
			&& asset.width == WIDTH && asset.height == HEIGHT
			&& asset.pixels.is_some();

		if !fits {
			return Err(SaveError::new(NAME, "only 320x200 8-bit images can be saved as CPS"));
		}

		let pixels = asset.pixels.as_ref().map(|p| p.as_slice()).unwrap_or(&[]);
		if pixels.len() != IMAGE_SIZE {
			return Err(SaveError::new(NAME, "pixel payload does not match the dimensions"));
		}

		let body = lcw::compress(pixels);
		let palette_size = if asset.colors.is_empty() { 0 } else { PALETTE_SIZE };

		if HEADER_SIZE + palette_size + body.len() - 2 > u16::MAX as usize {
			return Err(SaveError::new(NAME, "compressed data exceeds the 16-bit size field"));
		}

		let header = Header {
			file_size: (HEADER_SIZE + palette_size + body.len() - 2) as u16,
			compression: COMPRESSION_LCW,
			image_size: IMAGE_SIZE as u32,
			palette_size: palette_size as u16,
		};

		let mut out = vec![];
		header.write(&mut out).map_err(|e| SaveError::new(NAME, e.to_string()))?;

		if palette_size != 0 {
			write_vga_palette(&mut out, &asset.colors);
		}

		out.extend_from_slice(&body);
		Ok(out)
	}
}

/// Reads 256 6-bit VGA DAC entries.
pub(crate) fn read_vga_palette(data: &[u8]) -> Result<Vec<Color>, LoadErrorKind> {
	let mut colors = Vec::with_capacity(PALETTE_SIZE / 3);

	for entry in data.chunks_exact(3) {
		for value in entry.iter() {
			if *value >= 64 {
				return Err(LoadErrorKind::Range {
					field: "palette entry",
					value: *value as u64,
				});
			}
		}

		colors.push(Color::from_vga6(entry[0], entry[1], entry[2]));
	}

	Ok(colors)
}

/// Writes exactly 256 entries, padding or truncating the table as needed.
pub(crate) fn write_vga_palette(out: &mut Vec<u8>, colors: &[Color]) {
	for i in 0..(PALETTE_SIZE / 3) {
		let (r, g, b) = colors.get(i).unwrap_or(&Color::EMPTY).to_vga6();
		out.push(r);
		out.push(g);
		out.push(b);
	}
}

/// Sibling `.pal` lookup for palette-less files. Read-only and best-effort;
/// any failure just means no palette.
fn companion_palette(source: Option<&Path>) -> Vec<Color> {
	let path = match source {
		Some(p) => p.with_extension("pal"),
		None => return vec![],
	};

	match fs::read(&path) {
		Ok(data) if data.len() == PALETTE_SIZE => {
			match read_vga_palette(&data) {
				Ok(colors) => {
					debug!("using companion palette {}", path.display());
					colors
				},
				Err(_) => vec![],
			}
		},
		_ => vec![],
	}
}
