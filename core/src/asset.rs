use crate::caps::Caps;
use crate::pixel::Color;

/// In-memory decoded representation of one loaded file or frame.
///
/// `pixels` holds packed row data for indexed assets (see [`crate::pixel`])
/// and RGBA8888 bytes for high color assets. A `bits_per_sample` of 0 means
/// the asset carries no raster at all, e.g. a palette file or a bare frame
/// container.
#[derive(Clone, Debug, PartialEq)]
pub struct Asset {
	pub name: String,
	pub width: usize,
	pub height: usize,
	pub bits_per_sample: u8,
	pub indexed: bool,
	pub pixels: Option<Vec<u8>>,
	pub colors: Vec<Color>,
	backup: Option<Vec<Color>>,
	pub frame_container: bool,
	pub has_composite: bool,
	pub info: String,
}

impl Asset {
	pub fn indexed(width: usize, height: usize, bpp: u8, pixels: Vec<u8>, colors: Vec<Color>) -> Asset {
		Asset {
			name: String::new(),
			width: width,
			height: height,
			bits_per_sample: bpp,
			indexed: true,
			pixels: Some(pixels),
			colors: colors,
			backup: None,
			frame_container: false,
			has_composite: false,
			info: String::new(),
		}
	}

	pub fn high_color(width: usize, height: usize, bpp: u8, pixels: Vec<u8>) -> Asset {
		Asset {
			name: String::new(),
			width: width,
			height: height,
			bits_per_sample: bpp,
			indexed: false,
			pixels: Some(pixels),
			colors: vec![],
			backup: None,
			frame_container: false,
			has_composite: false,
			info: String::new(),
		}
	}

	/// An asset holding nothing but a color table, e.g. a loaded palette file.
	pub fn palette_only(colors: Vec<Color>) -> Asset {
		Asset {
			name: String::new(),
			width: 0,
			height: 0,
			bits_per_sample: 8,
			indexed: true,
			pixels: None,
			colors: colors,
			backup: None,
			frame_container: false,
			has_composite: false,
			info: String::new(),
		}
	}

	/// A rasterless parent for a sequence of frames.
	pub fn container(has_composite: bool) -> Asset {
		Asset {
			name: String::new(),
			width: 0,
			height: 0,
			bits_per_sample: 0,
			indexed: false,
			pixels: None,
			colors: vec![],
			backup: None,
			frame_container: true,
			has_composite: has_composite,
			info: String::new(),
		}
	}

	pub fn caps(&self) -> Caps {
		let mut caps = Caps::for_depth(self.bits_per_sample, self.indexed);

		if self.frame_container {
			caps |= Caps::FRAMES;
		}

		caps
	}

	/// The color table as first observed, frozen by the first palette edit.
	pub fn backup_colors(&self) -> Option<&[Color]> {
		self.backup.as_deref()
	}

	/// Whether the live table differs from the frozen backup. Reports
	/// `false` when no edit ever occurred.
	pub fn colors_changed(&self) -> bool {
		match self.backup {
			Some(ref backup) => *backup != self.colors,
			None => false,
		}
	}
}

/// Index of one asset inside an [`AssetTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AssetId(usize);

#[derive(Debug)]
struct Node {
	asset: Asset,
	parent: Option<AssetId>,
	frames: Vec<AssetId>,
}

/// One loaded asset together with its frames.
///
/// The parent/child relationship is stored as an id arena so palette
/// propagation can walk back-references without shared ownership; the
/// flood fill's visited set is the explicit `came_from` parameter.
#[derive(Debug)]
pub struct AssetTree {
	nodes: Vec<Node>,
}

impl AssetTree {
	pub fn new(root: Asset) -> AssetTree {
		AssetTree {
			nodes: vec![Node {
				asset: root,
				parent: None,
				frames: vec![],
			}],
		}
	}

	pub fn root(&self) -> AssetId {
		AssetId(0)
	}

	/// Total number of assets in the tree, the root included.
	pub fn count(&self) -> usize {
		self.nodes.len()
	}

	pub fn asset(&self, id: AssetId) -> &Asset {
		&self.nodes[id.0].asset
	}

	pub fn asset_mut(&mut self, id: AssetId) -> &mut Asset {
		&mut self.nodes[id.0].asset
	}

	/// Appends a frame to a parent and sets the child's back-reference.
	/// Frames are append-only; there is no reordering.
	pub fn add_frame(&mut self, parent: AssetId, asset: Asset) -> AssetId {
		let id = AssetId(self.nodes.len());

		self.nodes.push(Node {
			asset: asset,
			parent: Some(parent),
			frames: vec![],
		});
		self.nodes[parent.0].frames.push(id);

		id
	}

	/// The ordered frame list of a node, as a copy.
	pub fn frames(&self, id: AssetId) -> Vec<AssetId> {
		self.nodes[id.0].frames.clone()
	}

	pub fn parent(&self, id: AssetId) -> Option<AssetId> {
		self.nodes[id.0].parent
	}

	/// Union of the capability tags of a node's frames.
	pub fn frame_caps(&self, id: AssetId) -> Caps {
		let mut caps = Caps::empty();

		for frame in self.nodes[id.0].frames.iter() {
			caps |= self.nodes[frame.0].asset.caps();
		}

		caps
	}

	/// Replaces the color table of the given node and floods the change
	/// through the whole tree.
	///
	/// Every node with a bit depth above 0 freezes a backup of its table on
	/// the first edit and is then rewritten to exactly `2^bits_per_sample`
	/// entries: positions beyond the supplied table become
	/// [`Color::EMPTY`], positions within range are copied. With `opaque`
	/// set, copied entries get their alpha forced to fully opaque.
	///
	/// Propagation runs upward through the parent back-reference and
	/// downward through the frame list, never revisiting the node the
	/// request came from, so every node is updated exactly once.
	pub fn set_colors(&mut self, id: AssetId, colors: &[Color], opaque: bool) {
		self.propagate_colors(id, colors, opaque, None);
	}

	fn propagate_colors(&mut self, id: AssetId, colors: &[Color], opaque: bool, came_from: Option<AssetId>) {
		if came_from == Some(id) {
			return;
		}

		if colors.is_empty() {
			return;
		}

		{
			let asset = &mut self.nodes[id.0].asset;

			if asset.bits_per_sample > 0 {
				if asset.backup.is_none() {
					asset.backup = Some(asset.colors.clone());
				}

				let size = 1usize << asset.bits_per_sample;
				let mut table = Vec::with_capacity(size);

				for i in 0..size {
					if i < colors.len() {
						let mut color = colors[i];
						if opaque {
							color.alpha = 255;
						}
						table.push(color);
					} else {
						table.push(Color::EMPTY);
					}
				}

				asset.colors = table;
			}
		}

		if let Some(parent) = self.nodes[id.0].parent {
			if came_from != Some(parent) {
				self.propagate_colors(parent, colors, opaque, Some(id));
			}
		}

		for frame in self.frames(id) {
			if came_from != Some(frame) {
				self.propagate_colors(frame, colors, opaque, Some(id));
			}
		}
	}

	/// Whether the node's table differs from its frozen backup.
	pub fn colors_changed(&self, id: AssetId) -> bool {
		self.nodes[id.0].asset.colors_changed()
	}

	/// Re-propagates the node's backup table through the same path as
	/// [`AssetTree::set_colors`].
	pub fn reset_colors(&mut self, id: AssetId) {
		if let Some(backup) = self.nodes[id.0].asset.backup.clone() {
			self.set_colors(id, &backup, false);
		}
	}
}
