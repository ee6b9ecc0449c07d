use std::path::Path;

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

pub const NAME: &str = "ICN";

pub const TILE_WIDTH: usize = 24;
pub const TILE_HEIGHT: usize = 24;
/// 24×24 pixels at 1 bpp.
pub const TILE_SIZE: usize = 0x48;

/// The two implicit colors of a 1-bit tile.
fn tile_colors() -> Vec<Color> {
	vec![Color::opaque(0, 0, 0), Color::opaque(255, 255, 255)]
}

/// Headerless 1-bit icon container: a bare concatenation of 24×24 tiles,
/// 0x48 bytes each, rows packed most significant bit first. The file
/// length is the only structural handle, which makes this the weakest
/// candidate in autodetection; it belongs at the end of the registry.
pub struct Icn;

impl Icn {
	fn parse(&self, data: &[u8], source: Option<&Path>) -> Result<AssetTree, LoadErrorKind> {
		if data.len() < TILE_SIZE {
			return Err(LoadErrorKind::TooShort {
				got: data.len(),
				need: TILE_SIZE,
			});
		}

		if data.len() % TILE_SIZE != 0 {
			return Err(LoadErrorKind::NotMultipleOf {
				size: data.len(),
				unit: TILE_SIZE,
			});
		}

		let count = data.len() / TILE_SIZE;

		let mut root = Asset::container(true);
		root.name = source
			.and_then(|p| p.file_stem())
			.map(|s| s.to_string_lossy().into_owned())
			.unwrap_or_default();
		root.info = format!("ICN, {} tiles", count);

		let mut tree = AssetTree::new(root);

		for i in 0..count {
			let tile = &data[(i * TILE_SIZE)..((i + 1) * TILE_SIZE)];

			let mut frame = Asset::indexed(TILE_WIDTH, TILE_HEIGHT, 1, tile.to_vec(), tile_colors());
			frame.name = format!("tile {}", i);
			tree.add_frame(tree.root(), frame);
		}

		Ok(tree)
	}

	fn tile_bytes<'a>(asset: &'a Asset) -> Option<&'a [u8]> {
		if asset.indexed && asset.bits_per_sample == 1
			&& asset.width == TILE_WIDTH && asset.height == TILE_HEIGHT {
			asset.pixels.as_deref().filter(|p| p.len() == TILE_SIZE)
		} else {
			None
		}
	}
}

impl Format for Icn {
	fn name(&self) -> &'static str {
		NAME
	}

	fn description(&self) -> &'static str {
		"1-bit 24x24 tile icon container"
	}

	fn extensions(&self) -> &'static [&'static str] {
		&["icn"]
	}

	fn input_caps(&self) -> Caps {
		Caps::BPP_1
	}

	fn frame_input_caps(&self) -> Caps {
		Caps::BPP_1
	}

	fn try_load(&self, data: &[u8], source: Option<&Path>) -> Result<AssetTree, LoadError> {
		self.parse(data, source).map_err(|kind| LoadError::new(NAME, kind))
	}

	fn save(&self, tree: &AssetTree) -> Result<Vec<u8>, SaveError> {
		let root = tree.asset(tree.root());

		if root.frame_container {
			let frames = tree.frames(tree.root());

			if frames.is_empty() {
				return Err(SaveError::new(NAME, "the container holds no frames"));
			}

			let mut out = Vec::with_capacity(frames.len() * TILE_SIZE);

			for id in frames {
				match Icn::tile_bytes(tree.asset(id)) {
					Some(tile) => out.extend_from_slice(tile),
					None => {
						return Err(SaveError::new(NAME, "every frame must be a 24x24 1-bit tile"));
					},
				}
			}

			return Ok(out);
		}

		match Icn::tile_bytes(root) {
			Some(tile) => Ok(tile.to_vec()),
			None => Err(SaveError::new(NAME, "only 24x24 1-bit tiles can be saved as ICN")),
		}
	}

	/// Tiles the frames left to right into one strip.
	fn build_full_image(&self, tree: &AssetTree) -> Option<Asset> {
		let root = tree.asset(tree.root());

		if !root.frame_container || !root.has_composite {
			return None;
		}

		let frames = tree.frames(tree.root());
		if frames.is_empty() {
			return None;
		}

		// 24 bits per tile row is whole bytes, so rows concatenate cleanly.
		let tile_row = stride(TILE_WIDTH, 1);
		let mut pixels = Vec::with_capacity(frames.len() * TILE_SIZE);

		for y in 0..TILE_HEIGHT {
			for id in frames.iter() {
				let tile = Icn::tile_bytes(tree.asset(*id))?;
				pixels.extend_from_slice(&tile[(y * tile_row)..((y + 1) * tile_row)]);
			}
		}

		let mut composite = Asset::indexed(
			TILE_WIDTH * frames.len(),
			TILE_HEIGHT,
			1,
			pixels,
			tree.asset(frames[0]).colors.clone(),
		);
		composite.name = format!("{} (composite)", root.name);

		Some(composite)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_two_tile_file() {
		let data = vec![0u8; 0x90];
		let tree = Icn.try_load(&data, None).unwrap();

		assert_eq!(2, tree.frames(tree.root()).len());
		assert!(tree.asset(tree.root()).frame_container);
		assert!(tree.asset(tree.root()).has_composite);
		assert_eq!(Caps::FRAMES, tree.asset(tree.root()).caps());
		assert_eq!(Caps::BPP_1, tree.frame_caps(tree.root()));
	}

	#[test]
	fn test_below_minimum_length() {
		let err = Icn.try_load(&[0; 0x47], None).unwrap_err();

		assert_eq!(NAME, err.format);
		assert!(matches!(err.kind, LoadErrorKind::TooShort { got: 0x47, need: 0x48 }));
		assert!(err.to_string().contains("not long enough"));
	}

	#[test]
	fn test_not_a_multiple_of_tile_size() {
		let err = Icn.try_load(&[0; 0x91], None).unwrap_err();

		assert!(matches!(err.kind, LoadErrorKind::NotMultipleOf { size: 0x91, unit: 0x48 }));
		assert!(err.to_string().contains("not a multiple"));
	}

	#[test]
	fn test_round_trip() {
		let mut data = vec![0u8; 0x48 * 3];
		for (i, b) in data.iter_mut().enumerate() {
			*b = (i % 251) as u8;
		}

		let tree = Icn.try_load(&data, None).unwrap();
		assert_eq!(data, Icn.save(&tree).unwrap());
	}

	#[test]
	fn test_save_single_tile() {
		let tile = Asset::indexed(TILE_WIDTH, TILE_HEIGHT, 1, vec![0xAA; TILE_SIZE], tile_colors());
		let out = Icn.save(&AssetTree::new(tile)).unwrap();

		assert_eq!(TILE_SIZE, out.len());
	}

	#[test]
	fn test_save_rejects_wrong_tile_shape() {
		let mut tree = AssetTree::new(Asset::container(true));
		tree.add_frame(tree.root(), Asset::indexed(8, 8, 1, vec![0; 8], vec![]));

		let err = Icn.save(&tree).unwrap_err();
		assert!(err.reason.contains("24x24"));
	}

	#[test]
	fn test_save_rejects_short_tile_payload() {
		// 24x24 1-bit shape but an undersized pixel buffer.
		let mut tree = AssetTree::new(Asset::container(true));
		tree.add_frame(tree.root(), Asset::indexed(TILE_WIDTH, TILE_HEIGHT, 1, vec![0; 10], vec![]));

		let err = Icn.save(&tree).unwrap_err();
		assert!(err.reason.contains("24x24"));
	}

	#[test]
	fn test_composite_strip() {
		let mut data = vec![0u8; 0x48];
		data.extend_from_slice(&[0xFF; 0x48]);

		let tree = Icn.try_load(&data, None).unwrap();
		let composite = Icn.build_full_image(&tree).unwrap();

		assert_eq!(48, composite.width);
		assert_eq!(24, composite.height);
		assert_eq!(1, composite.bits_per_sample);

		let pixels = composite.pixels.as_ref().unwrap();
		assert_eq!(6 * 24, pixels.len());

		// Every row: three clear bytes from tile 0, three set from tile 1.
		assert_eq!(&[0, 0, 0, 0xFF, 0xFF, 0xFF], &pixels[0..6]);
	}

	#[test]
	fn test_palette_edit_reaches_all_tiles() {
		let tree = &mut Icn.try_load(&vec![0u8; 0x90], None).unwrap();
		let frames = tree.frames(tree.root());

		let inverted = vec![Color::opaque(255, 255, 255), Color::opaque(0, 0, 0)];
		tree.set_colors(frames[0], &inverted, false);

		assert_eq!(Color::opaque(255, 255, 255), tree.asset(frames[1]).colors[0]);
		assert!(tree.colors_changed(frames[1]));
	}
}
