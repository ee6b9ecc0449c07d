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

use crate::cps::{
	read_vga_palette,
	write_vga_palette,
	PALETTE_SIZE
};

pub const NAME: &str = "PAL";

/// Raw 6-bit VGA palette file: 256 RGB triplets, 768 bytes, no header.
/// Loads as a palette-only asset; saving extracts the color table from any
/// indexed asset.
pub struct Pal;

impl Pal {
	fn parse(&self, data: &[u8], source: Option<&Path>) -> Result<AssetTree, LoadErrorKind> {
		if data.len() != PALETTE_SIZE {
			return Err(LoadErrorKind::Size {
				got: data.len(),
				expected: PALETTE_SIZE,
			});
		}

		let colors = read_vga_palette(data)?;

		let mut asset = Asset::palette_only(colors);
		asset.name = crate::display_name(source);
		asset.info = "VGA palette, 256 entries".to_string();

		Ok(AssetTree::new(asset))
	}
}

impl Format for Pal {
	fn name(&self) -> &'static str {
		NAME
	}

	fn description(&self) -> &'static str {
		"raw 6-bit VGA palette"
	}

	fn extensions(&self) -> &'static [&'static str] {
		&["pal"]
	}

	fn input_caps(&self) -> Caps {
		Caps::BPP_1 | Caps::BPP_4 | Caps::BPP_8
	}

	fn try_load(&self, data: &[u8], source: Option<&Path>) -> Result<AssetTree, LoadError> {
		self.parse(data, source).map_err(|kind| LoadError::new(NAME, kind))
	}

	fn save(&self, tree: &AssetTree) -> Result<Vec<u8>, SaveError> {
		let asset = tree.asset(tree.root());

		if !asset.indexed || asset.colors.is_empty() {
			return Err(SaveError::new(NAME, "only indexed assets with a color table can be saved as PAL"));
		}

		let mut out = Vec::with_capacity(PALETTE_SIZE);
		write_vga_palette(&mut out, &asset.colors);
		Ok(out)
	}
}
