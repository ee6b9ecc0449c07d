use std::io;
use std::path::Path;

use thiserror::Error;

use crate::asset::{
	Asset,
	AssetTree
};
use crate::caps::Caps;

/// Why a format rejected a byte blob during load.
#[derive(Debug, Error)]
pub enum LoadErrorKind {
	#[error("not long enough: {got} bytes, need at least {need}")]
	TooShort {
		got: usize,
		need: usize,
	},
	#[error("expected {expected} bytes, got {got}")]
	Size {
		got: usize,
		expected: usize,
	},
	#[error("size {size} is not a multiple of {unit} bytes")]
	NotMultipleOf {
		size: usize,
		unit: usize,
	},
	#[error("bad magic: {0:#010X}")]
	Magic(u32),
	#[error("{field} out of range: {value}")]
	Range {
		field: &'static str,
		value: u64,
	},
	#[error("missing {0} chunk")]
	MissingChunk(&'static str),
	#[error("decompressed to {got} bytes, expected {expected}")]
	Codec {
		got: usize,
		expected: usize,
	},
	#[error("{0}")]
	Other(String),
	#[error("I/O error")]
	IO {
		#[from]
		source: io::Error,
	},
}

/// A structural load failure, tagged with the format that rejected the
/// bytes. This is routine control flow during autodetection, not an
/// exceptional condition.
#[derive(Debug, Error)]
#[error("{format}: {kind}")]
pub struct LoadError {
	pub format: &'static str,
	pub kind: LoadErrorKind,
}

impl LoadError {
	pub fn new(format: &'static str, kind: LoadErrorKind) -> LoadError {
		LoadError {
			format: format,
			kind: kind,
		}
	}
}

/// A save was requested for an asset whose shape the target format cannot
/// represent. The reason spells out what the format would accept.
#[derive(Debug, Error)]
#[error("{format}: {reason}")]
pub struct SaveError {
	pub format: &'static str,
	pub reason: String,
}

impl SaveError {
	pub fn new(format: &'static str, reason: impl Into<String>) -> SaveError {
		SaveError {
			format: format,
			reason: reason.into(),
		}
	}
}

/// The load/save/introspection contract one binary layout implements.
///
/// `try_load` must validate structural invariants before materializing any
/// pixel data, and must be fully self-contained: a failure partway through a
/// multi-stage parse leaks no partially constructed state to the caller.
/// Every rejection is a typed [`LoadError`], never a panic, so the registry
/// can sweep candidates freely.
pub trait Format {
	/// Short name, used to tag load errors and pick save targets.
	fn name(&self) -> &'static str;

	fn description(&self) -> &'static str;

	/// Accepted file extensions, lower case, without the dot.
	fn extensions(&self) -> &'static [&'static str];

	/// What whole-asset payloads this format can accept on save.
	fn input_caps(&self) -> Caps;

	/// What per-frame payloads this format can accept on save.
	fn frame_input_caps(&self) -> Caps {
		Caps::empty()
	}

	/// Attempts to parse `data` into an asset tree. `source`, when given,
	/// is only used to derive companion file paths (e.g. a sibling palette)
	/// and never written to.
	fn try_load(&self, data: &[u8], source: Option<&Path>) -> Result<AssetTree, LoadError>;

	/// Serializes an asset tree back to bytes, or explains why its shape
	/// does not fit this format.
	fn save(&self, tree: &AssetTree) -> Result<Vec<u8>, SaveError>;

	/// Synthesizes a single preview image from a container's frames, on
	/// demand. The returned asset is intentionally detached from the tree.
	/// Formats without a meaningful composite return `None`.
	fn build_full_image(&self, tree: &AssetTree) -> Option<Asset> {
		let _ = tree;
		None
	}
}
