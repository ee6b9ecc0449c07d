use std::fmt;
use std::path::Path;

use log::debug;

use crate::asset::AssetTree;
use crate::caps::can_save;
use crate::format::{
	Format,
	LoadError
};

/// A successful autodetection: the format that accepted the bytes and the
/// tree it produced.
pub struct Loaded<'a> {
	pub format: &'a dyn Format,
	pub tree: AssetTree,
}

// `dyn Format` has no Debug bound; the format's name stands in for it.
impl fmt::Debug for Loaded<'_> {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.debug_struct("Loaded")
			.field("format", &self.format.name())
			.field("tree", &self.tree)
			.finish()
	}
}

/// No registered format accepted the bytes. The attempt list preserves try
/// order and is the primary user-facing diagnostic, not an internal detail.
#[derive(Debug)]
pub struct DetectError {
	pub attempts: Vec<LoadError>,
}

impl fmt::Display for DetectError {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		writeln!(f, "no format accepted the file; attempted {}:", self.attempts.len())?;

		for attempt in self.attempts.iter() {
			writeln!(f, "  {}", attempt)?;
		}

		Ok(())
	}
}

impl std::error::Error for DetectError {}

/// Ordered list of the known formats.
///
/// Built explicitly at startup from a fixed list; registration order is the
/// autodetection try order, and the only disambiguation the registry does.
/// Formats are ambiguous at the byte level, so strict validation inside
/// each format is what makes trial parsing usable.
#[derive(Default)]
pub struct Registry {
	formats: Vec<Box<dyn Format>>,
}

impl Registry {
	pub fn new() -> Registry {
		Registry {
			formats: vec![],
		}
	}

	pub fn register(&mut self, format: Box<dyn Format>) {
		self.formats.push(format);
	}

	pub fn formats(&self) -> &[Box<dyn Format>] {
		&self.formats
	}

	/// First registered format claiming the given extension.
	pub fn by_extension(&self, ext: &str) -> Option<&dyn Format> {
		for format in self.formats.iter() {
			if format.extensions().iter().any(|e| e.eq_ignore_ascii_case(ext)) {
				return Some(format.as_ref());
			}
		}

		None
	}

	/// Identifies an unknown file by trial parsing.
	///
	/// Tier 1 tries the formats declaring an extension matching `source`,
	/// in registration order. Tier 2, entered only when `fallback` is set
	/// and tier 1 is exhausted, tries every format not already attempted,
	/// again in registration order. The first format whose `try_load`
	/// succeeds wins; one candidate's failure never aborts the sweep.
	pub fn detect(&self, data: &[u8], source: Option<&Path>, fallback: bool) -> Result<Loaded, DetectError> {
		let ext = source
			.and_then(|p| p.extension())
			.and_then(|e| e.to_str())
			.map(|e| e.to_ascii_lowercase());

		let mut attempts = vec![];
		let mut tried = vec![false; self.formats.len()];

		if let Some(ref ext) = ext {
			for (i, format) in self.formats.iter().enumerate() {
				if !format.extensions().iter().any(|e| e.eq_ignore_ascii_case(ext)) {
					continue;
				}

				tried[i] = true;
				debug!("trying {} (extension match)", format.name());

				match format.try_load(data, source) {
					Ok(tree) => {
						return Ok(Loaded {
							format: format.as_ref(),
							tree: tree,
						});
					},
					Err(e) => attempts.push(e),
				}
			}
		}

		if fallback {
			for (i, format) in self.formats.iter().enumerate() {
				if tried[i] {
					continue;
				}

				debug!("trying {} (fallback)", format.name());

				match format.try_load(data, source) {
					Ok(tree) => {
						return Ok(Loaded {
							format: format.as_ref(),
							tree: tree,
						});
					},
					Err(e) => attempts.push(e),
				}
			}
		}

		Err(DetectError {
			attempts: attempts,
		})
	}

	/// Every registered format whose capabilities make it a legal save
	/// target for the given tree.
	pub fn save_targets(&self, tree: &AssetTree) -> Vec<&dyn Format> {
		let asset_caps = tree.asset(tree.root()).caps();
		let frame_caps = tree.frame_caps(tree.root());

		self.formats
			.iter()
			.filter(|f| can_save(f.input_caps(), asset_caps, f.frame_input_caps(), frame_caps))
			.map(|f| f.as_ref())
			.collect()
	}
}
