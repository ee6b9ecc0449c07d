use std::io::Cursor;
use std::path::Path;

use byteorder::{
	BE,
	ReadBytesExt,
	WriteBytesExt
};

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

pub const NAME: &str = "N64";

pub const MAX_DIMENSION: usize = 1024;
pub const HEADER_SIZE: usize = 4;

/// Raw big endian RGBA5551 texture with a two-field dimension header, as
/// dumped from N64 ROM images. Pixels are widened to RGBA8888 in memory.
pub struct Raw16;

impl Raw16 {
	fn parse(&self, data: &[u8], source: Option<&Path>) -> Result<AssetTree, LoadErrorKind> {
		if data.len() < HEADER_SIZE {
			return Err(LoadErrorKind::TooShort {
				got: data.len(),
				need: HEADER_SIZE,
			});
		}

		let mut buf = Cursor::new(data);
		let width = buf.read_u16::<BE>()? as usize;
		let height = buf.read_u16::<BE>()? as usize;

		if width == 0 || width > MAX_DIMENSION {
			return Err(LoadErrorKind::Range {
				field: "width",
				value: width as u64,
			});
		}

		if height == 0 || height > MAX_DIMENSION {
			return Err(LoadErrorKind::Range {
				field: "height",
				value: height as u64,
			});
		}

		let expected = HEADER_SIZE + width * height * 2;
		if data.len() != expected {
			return Err(LoadErrorKind::Size {
				got: data.len(),
				expected: expected,
			});
		}

		let mut pixels = Vec::with_capacity(width * height * 4);
		for _ in 0..(width * height) {
			let color = Color::from_rgba5551(buf.read_u16::<BE>()?);
			pixels.push(color.red);
			pixels.push(color.green);
			pixels.push(color.blue);
			pixels.push(color.alpha);
		}

		let mut asset = Asset::high_color(width, height, 16, pixels);
		asset.name = source
			.and_then(|p| p.file_stem())
			.map(|s| s.to_string_lossy().into_owned())
			.unwrap_or_default();
		asset.info = format!("N64 RGBA5551, {}x{}", width, height);

		Ok(AssetTree::new(asset))
	}
}

impl Format for Raw16 {
	fn name(&self) -> &'static str {
		NAME
	}

	fn description(&self) -> &'static str {
		"N64 raw 16-bit RGBA5551 image"
	}

	fn extensions(&self) -> &'static [&'static str] {
		&["n64"]
	}

	fn input_caps(&self) -> Caps {
		Caps::HIGH_COLOR
	}

	fn try_load(&self, data: &[u8], source: Option<&Path>) -> Result<AssetTree, LoadError> {
		self.parse(data, source).map_err(|kind| LoadError::new(NAME, kind))
	}

	fn save(&self, tree: &AssetTree) -> Result<Vec<u8>, SaveError> {
		let asset = tree.asset(tree.root());

		let pixels = match asset.pixels {
			Some(ref p) if !asset.indexed && asset.bits_per_sample >= 16 => p,
			_ => {
				return Err(SaveError::new(NAME, "only high color images can be saved as N64"));
			},
		};

		if asset.width == 0 || asset.width > MAX_DIMENSION
			|| asset.height == 0 || asset.height > MAX_DIMENSION {
			return Err(SaveError::new(NAME, "dimensions must be between 1 and 1024"));
		}

		if pixels.len() != asset.width * asset.height * 4 {
			return Err(SaveError::new(NAME, "pixel payload does not match the dimensions"));
		}

		let mut out = vec![];
		let io_err = |e: std::io::Error| SaveError::new(NAME, e.to_string());

		out.write_u16::<BE>(asset.width as u16).map_err(io_err)?;
		out.write_u16::<BE>(asset.height as u16).map_err(io_err)?;

		for rgba in pixels.chunks_exact(4) {
			let color = Color {
				red: rgba[0],
				green: rgba[1],
				blue: rgba[2],
				alpha: rgba[3],
			};
			out.write_u16::<BE>(color.to_rgba5551()).map_err(io_err)?;
		}

		Ok(out)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample_file(width: u16, height: u16) -> Vec<u8> {
		let mut file = vec![];
		file.extend_from_slice(&width.to_be_bytes());
		file.extend_from_slice(&height.to_be_bytes());

		for i in 0..(width as usize * height as usize) {
			let pixel = ((i as u16) << 1) | 1;
			file.extend_from_slice(&pixel.to_be_bytes());
		}

		file
	}

	#[test]
	fn test_load() {
		let tree = Raw16.try_load(&sample_file(4, 2), None).unwrap();
		let asset = tree.asset(tree.root());

		assert_eq!(4, asset.width);
		assert_eq!(2, asset.height);
		assert_eq!(16, asset.bits_per_sample);
		assert!(!asset.indexed);
		assert_eq!(Caps::HIGH_COLOR, asset.caps());
		assert_eq!(4 * 2 * 4, asset.pixels.as_ref().unwrap().len());

		// Alpha bit set on every sample pixel.
		assert_eq!(255, asset.pixels.as_ref().unwrap()[3]);
	}

	#[test]
	fn test_round_trip() {
		let file = sample_file(3, 5);
		let tree = Raw16.try_load(&file, None).unwrap();

		assert_eq!(file, Raw16.save(&tree).unwrap());
	}

	#[test]
	fn test_too_short() {
		let err = Raw16.try_load(&[0, 4], None).unwrap_err();
		assert!(matches!(err.kind, LoadErrorKind::TooShort { got: 2, need: 4 }));
	}

	#[test]
	fn test_zero_width() {
		let err = Raw16.try_load(&[0, 0, 0, 4], None).unwrap_err();
		assert!(matches!(err.kind, LoadErrorKind::Range { field: "width", .. }));
	}

	#[test]
	fn test_length_mismatch() {
		let mut file = sample_file(4, 2);
		file.pop();

		let err = Raw16.try_load(&file, None).unwrap_err();
		assert!(matches!(err.kind, LoadErrorKind::Size { .. }));
	}

	#[test]
	fn test_save_rejects_indexed() {
		let tree = AssetTree::new(Asset::indexed(4, 4, 8, vec![0; 16], vec![]));
		let err = Raw16.save(&tree).unwrap_err();
		assert!(err.reason.contains("high color"));
	}
}
