use std::io::Cursor;
use std::path::Path;

use byteorder::{
	LE,
	ReadBytesExt,
	WriteBytesExt
};

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
use rak_core::pixel::{
	stride,
	Color
};
use rak_core::rtag4;

pub const NAME: &str = "SCR";

pub const TAG_INF: u32 = rtag4!(b"INF:");
pub const TAG_BIN: u32 = rtag4!(b"BIN:");
pub const TAG_PAL: u32 = rtag4!(b"PAL:");

pub const COMPRESSION_NONE: u8 = 0;
pub const COMPRESSION_LCW: u8 = 2;

struct Info {
	width: u16,
	height: u16,
	bpp: u16,
}

struct Body<'a> {
	compression: u8,
	uncompressed_size: u32,
	data: &'a [u8],
}

/// Dynamix tagged screen image. A sequence of chunks, each a 4-byte ASCII
/// tag plus a 32-bit payload size: `INF:` (dimensions and bit depth),
/// `BIN:` (pixel data, optionally LCW compressed) and an optional `PAL:`
/// (6-bit VGA palette). Unknown chunks are skipped.
///
/// Parsing walks every chunk and validates the whole file before a single
/// pixel is materialized, so a failure in a later chunk leaks nothing.
pub struct Scr;

impl Scr {
	fn parse(&self, data: &[u8], source: Option<&Path>) -> Result<AssetTree, LoadErrorKind> {
		let mut offset = 0;
		let mut info: Option<Info> = None;
		let mut body: Option<Body> = None;
		let mut palette: Option<Vec<Color>> = None;

		while offset < data.len() {
			if offset + 8 > data.len() {
				return Err(LoadErrorKind::TooShort {
					got: data.len(),
					need: offset + 8,
				});
			}

			let mut header = Cursor::new(&data[offset..(offset + 8)]);
			let tag = header.read_u32::<LE>()?;
			let size = header.read_u32::<LE>()? as usize;

			let payload_start = offset + 8;
			if payload_start + size > data.len() {
				return Err(LoadErrorKind::Range {
					field: "chunk size",
					value: size as u64,
				});
			}

			let payload = &data[payload_start..(payload_start + size)];

			match tag {
				TAG_INF => {
					if size != 6 {
						return Err(LoadErrorKind::Range {
							field: "INF: chunk size",
							value: size as u64,
						});
					}

					let mut buf = Cursor::new(payload);
					info = Some(Info {
						width: buf.read_u16::<LE>()?,
						height: buf.read_u16::<LE>()?,
						bpp: buf.read_u16::<LE>()?,
					});
				},
				TAG_BIN => {
					if info.is_none() {
						// INF: must precede BIN:
						return Err(LoadErrorKind::MissingChunk("INF:"));
					}

					if size < 5 {
						return Err(LoadErrorKind::Range {
							field: "BIN: chunk size",
							value: size as u64,
						});
					}

					let mut buf = Cursor::new(payload);
					body = Some(Body {
						compression: buf.read_u8()?,
						uncompressed_size: buf.read_u32::<LE>()?,
						data: &payload[5..],
					});
				},
				TAG_PAL => {
					if size != 768 {
						return Err(LoadErrorKind::Range {
							field: "PAL: chunk size",
							value: size as u64,
						});
					}

					let mut colors = Vec::with_capacity(256);
					for entry in payload.chunks_exact(3) {
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

					palette = Some(colors);
				},
				_ => {},
			}

			offset = payload_start + size;
		}

		let info = info.ok_or(LoadErrorKind::MissingChunk("INF:"))?;
		let body = body.ok_or(LoadErrorKind::MissingChunk("BIN:"))?;

		if info.bpp != 4 && info.bpp != 8 {
			return Err(LoadErrorKind::Range {
				field: "bit depth",
				value: info.bpp as u64,
			});
		}

		if info.width == 0 || info.height == 0 {
			return Err(LoadErrorKind::Range {
				field: "dimensions",
				value: info.width.max(info.height) as u64,
			});
		}

		let expected = stride(info.width as usize, info.bpp as u8) * info.height as usize;
		if body.uncompressed_size as usize != expected {
			return Err(LoadErrorKind::Range {
				field: "uncompressed size",
				value: body.uncompressed_size as u64,
			});
		}

		let pixels = match body.compression {
			COMPRESSION_NONE => body.data.to_vec(),
			COMPRESSION_LCW => lcw::decompress(body.data),
			other => {
				return Err(LoadErrorKind::Range {
					field: "compression",
					value: other as u64,
				});
			},
		};

		if pixels.len() != expected {
			return Err(LoadErrorKind::Codec {
				got: pixels.len(),
				expected: expected,
			});
		}

		let mut asset = Asset::indexed(
			info.width as usize,
			info.height as usize,
			info.bpp as u8,
			pixels,
			palette.unwrap_or_default(),
		);
		asset.name = source
			.and_then(|p| p.file_stem())
			.map(|s| s.to_string_lossy().into_owned())
			.unwrap_or_default();
		asset.info = format!("SCR, {}x{}, {} bpp", info.width, info.height, info.bpp);

		Ok(AssetTree::new(asset))
	}
}

impl Format for Scr {
	fn name(&self) -> &'static str {
		NAME
	}

	fn description(&self) -> &'static str {
		"Dynamix tagged screen image"
	}

	fn extensions(&self) -> &'static [&'static str] {
		&["scr"]
	}

	fn input_caps(&self) -> Caps {
		Caps::BPP_4 | Caps::BPP_8
	}

	fn try_load(&self, data: &[u8], source: Option<&Path>) -> Result<AssetTree, LoadError> {
		self.parse(data, source).map_err(|kind| LoadError::new(NAME, kind))
	}

	fn save(&self, tree: &AssetTree) -> Result<Vec<u8>, SaveError> {
		let asset = tree.asset(tree.root());

		let fits = asset.indexed
			&& (asset.bits_per_sample == 4 || asset.bits_per_sample == 8)
			&& asset.pixels.is_some()
			&& asset.width <= u16::MAX as usize
			&& asset.height <= u16::MAX as usize;

		if !fits {
			return Err(SaveError::new(NAME, "only 4-bit and 8-bit indexed images can be saved as SCR"));
		}

		let pixels = asset.pixels.as_ref().map(|p| p.as_slice()).unwrap_or(&[]);
		if pixels.len() != stride(asset.width, asset.bits_per_sample) * asset.height {
			return Err(SaveError::new(NAME, "pixel payload does not match the dimensions"));
		}

		let packed = lcw::compress(pixels);

		let mut out = vec![];
		let io_err = |e: std::io::Error| SaveError::new(NAME, e.to_string());

		out.write_u32::<LE>(TAG_INF).map_err(io_err)?;
		out.write_u32::<LE>(6).map_err(io_err)?;
		out.write_u16::<LE>(asset.width as u16).map_err(io_err)?;
		out.write_u16::<LE>(asset.height as u16).map_err(io_err)?;
		out.write_u16::<LE>(asset.bits_per_sample as u16).map_err(io_err)?;

		out.write_u32::<LE>(TAG_BIN).map_err(io_err)?;
		out.write_u32::<LE>((packed.len() + 5) as u32).map_err(io_err)?;
		out.write_u8(COMPRESSION_LCW).map_err(io_err)?;
		out.write_u32::<LE>(pixels.len() as u32).map_err(io_err)?;
		out.extend_from_slice(&packed);

		if !asset.colors.is_empty() {
			out.write_u32::<LE>(TAG_PAL).map_err(io_err)?;
			out.write_u32::<LE>(768).map_err(io_err)?;

			for i in 0..256 {
				let (r, g, b) = asset.colors.get(i).unwrap_or(&Color::EMPTY).to_vga6();
				out.push(r);
				out.push(g);
				out.push(b);
			}
		}

		Ok(out)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn checkers(width: usize, height: usize, bpp: u8) -> Asset {
		let indices: Vec<u8> = (0..(width * height))
			.map(|i| ((i % width + i / width) % 2) as u8)
			.collect();
		let pixels = rak_core::pixel::pack_indices(&indices, width, height, bpp);

		let colors = vec![Color::from_vga6(0, 0, 0), Color::from_vga6(63, 63, 63)];
		Asset::indexed(width, height, bpp, pixels, colors)
	}

	#[test]
	fn test_round_trip_8bpp() {
		let asset = checkers(17, 9, 8);
		let file = Scr.save(&AssetTree::new(asset.clone())).unwrap();

		let tree = Scr.try_load(&file, None).unwrap();
		let loaded = tree.asset(tree.root());

		assert_eq!(asset.width, loaded.width);
		assert_eq!(asset.height, loaded.height);
		assert_eq!(asset.bits_per_sample, loaded.bits_per_sample);
		assert_eq!(asset.pixels, loaded.pixels);

		// The 2-entry table comes back padded to 256 VGA entries.
		assert_eq!(256, loaded.colors.len());
		assert_eq!(asset.colors[1], loaded.colors[1]);
	}

	#[test]
	fn test_round_trip_4bpp() {
		let mut asset = checkers(10, 4, 4);
		asset.colors = vec![];
		let file = Scr.save(&AssetTree::new(asset.clone())).unwrap();

		let tree = Scr.try_load(&file, None).unwrap();
		let loaded = tree.asset(tree.root());

		assert_eq!(asset.pixels, loaded.pixels);
		assert!(loaded.colors.is_empty());
		assert_eq!(Caps::BPP_4, loaded.caps());
	}

	#[test]
	fn test_unknown_chunks_are_skipped() {
		let mut file = vec![];
		file.extend_from_slice(&rtag4!(b"CMT:").to_le_bytes());
		file.extend_from_slice(&4u32.to_le_bytes());
		file.extend_from_slice(b"niff");
		file.extend_from_slice(&Scr.save(&AssetTree::new(checkers(4, 4, 8))).unwrap());

		assert!(Scr.try_load(&file, None).is_ok());
	}

	#[test]
	fn test_missing_inf() {
		let full = Scr.save(&AssetTree::new(checkers(4, 4, 8))).unwrap();

		// Drop the INF: chunk (14 bytes) so BIN: comes first.
		let err = Scr.try_load(&full[14..], None).unwrap_err();
		assert_eq!(NAME, err.format);
		assert!(matches!(err.kind, LoadErrorKind::MissingChunk("INF:")));
	}

	#[test]
	fn test_missing_bin() {
		let mut file = vec![];
		file.extend_from_slice(&TAG_INF.to_le_bytes());
		file.extend_from_slice(&6u32.to_le_bytes());
		file.extend_from_slice(&[4, 0, 4, 0, 8, 0]);

		let err = Scr.try_load(&file, None).unwrap_err();
		assert!(matches!(err.kind, LoadErrorKind::MissingChunk("BIN:")));
	}

	#[test]
	fn test_oversized_chunk() {
		let mut file = vec![];
		file.extend_from_slice(&TAG_INF.to_le_bytes());
		file.extend_from_slice(&1000u32.to_le_bytes());
		file.extend_from_slice(&[0; 6]);

		let err = Scr.try_load(&file, None).unwrap_err();
		assert!(matches!(err.kind, LoadErrorKind::Range { field: "chunk size", .. }));
	}

	#[test]
	fn test_truncated_chunk_header() {
		let err = Scr.try_load(&[0x49, 0x4E, 0x46], None).unwrap_err();
		assert!(matches!(err.kind, LoadErrorKind::TooShort { .. }));
	}

	#[test]
	fn test_bad_bit_depth() {
		let mut asset = checkers(4, 4, 8);
		asset.bits_per_sample = 8;
		let mut file = Scr.save(&AssetTree::new(asset)).unwrap();

		// INF: bpp field sits at offset 12
		file[12] = 2;

		let err = Scr.try_load(&file, None).unwrap_err();
		assert!(matches!(err.kind, LoadErrorKind::Range { field: "bit depth", .. }));
	}

	#[test]
	fn test_save_rejects_mismatched_payload() {
		let tree = AssetTree::new(Asset::indexed(17, 9, 8, vec![0; 10], vec![]));
		let err = Scr.save(&tree).unwrap_err();

		assert!(err.reason.contains("payload"));
	}

	#[test]
	fn test_save_rejects_1bpp() {
		let tree = AssetTree::new(Asset::indexed(8, 1, 1, vec![0], vec![]));
		let err = Scr.save(&tree).unwrap_err();
		assert!(err.reason.contains("4-bit and 8-bit"));
	}
}
