pub mod cps;
pub mod pal;

use std::path::Path;

/// Display name for a loaded asset, derived from the source path.
fn display_name(source: Option<&Path>) -> String {
	source
		.and_then(|p| p.file_stem())
		.map(|s| s.to_string_lossy().into_owned())
		.unwrap_or_default()
}
