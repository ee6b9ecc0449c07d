use std::path::Path;

use thiserror::Error;

use rak_core::caps::can_save;
use rak_core::format::SaveError;
use rak_core::registry::{
	DetectError,
	Registry
};

use rak_formats_dynamix::scr::Scr;
use rak_formats_n64::raw16::Raw16;
use rak_formats_tileset::icn::Icn;
use rak_formats_westwood::cps::Cps;
use rak_formats_westwood::pal::Pal;

/// Every known format, strictest structural validation first. The 1-bit
/// tile container only checks file length, so it goes last; anything
/// earlier that spuriously matched a tile file would win otherwise.
pub fn default_registry() -> Registry {
	let mut registry = Registry::new();

	registry.register(Box::new(Scr));
	registry.register(Box::new(Cps));
	registry.register(Box::new(Pal));
	registry.register(Box::new(Raw16));
	registry.register(Box::new(Icn));

	registry
}

#[derive(Debug, Error)]
pub enum ConvertError {
	#[error(transparent)]
	Detect(#[from] DetectError),
	#[error("no known format uses extension .{0}")]
	UnknownExtension(String),
	#[error("{0} cannot represent this asset")]
	Incompatible(&'static str),
	#[error(transparent)]
	Save(#[from] SaveError),
}

/// Autodetects `data`, then re-serializes it in the format claiming
/// `target_ext`. The capability check runs before the save attempt so an
/// impossible pairing fails with the cheaper, clearer error.
pub fn convert(registry: &Registry, data: &[u8], source: Option<&Path>, target_ext: &str) -> Result<Vec<u8>, ConvertError> {
	let loaded = registry.detect(data, source, true)?;

	let target = registry
		.by_extension(target_ext)
		.ok_or_else(|| ConvertError::UnknownExtension(target_ext.to_string()))?;

	let root = loaded.tree.asset(loaded.tree.root());
	let legal = can_save(
		target.input_caps(),
		root.caps(),
		target.frame_input_caps(),
		loaded.tree.frame_caps(loaded.tree.root()),
	);

	if !legal {
		return Err(ConvertError::Incompatible(target.name()));
	}

	Ok(target.save(&loaded.tree)?)
}
