use bitflags::bitflags;

bitflags! {
	/// Classification of the payloads a format can produce or accept.
	pub struct Caps: u8 {
		const BPP_1 = 1;
		const BPP_4 = 2;
		const BPP_8 = 4;
		const HIGH_COLOR = 8;
		const FRAMES = 16;
		const MAP = 32;
	}
}

impl Caps {
	/// Capability tag for a raster of the given depth.
	pub fn for_depth(bpp: u8, indexed: bool) -> Caps {
		if indexed {
			match bpp {
				1 => Caps::BPP_1,
				4 => Caps::BPP_4,
				8 => Caps::BPP_8,
				_ => Caps::empty(),
			}
		} else if bpp >= 16 {
			Caps::HIGH_COLOR
		} else {
			Caps::empty()
		}
	}
}

/// Decides whether a format is a legal save target for an asset.
///
/// The pairing is legal if the format's input capabilities intersect the
/// asset's own (the frame-set bit is ignored for this half), or if the
/// format's per-frame input capabilities intersect the capabilities of the
/// asset's frames.
pub fn can_save(target_input: Caps, asset: Caps, target_frame_input: Caps, asset_frames: Caps) -> bool {
	if !(target_input & asset & !Caps::FRAMES).is_empty() {
		return true;
	}

	!(target_frame_input & asset_frames).is_empty()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_depth_tags() {
		assert_eq!(Caps::BPP_1, Caps::for_depth(1, true));
		assert_eq!(Caps::BPP_4, Caps::for_depth(4, true));
		assert_eq!(Caps::BPP_8, Caps::for_depth(8, true));
		assert_eq!(Caps::HIGH_COLOR, Caps::for_depth(16, false));
		assert_eq!(Caps::HIGH_COLOR, Caps::for_depth(32, false));
		assert_eq!(Caps::empty(), Caps::for_depth(0, false));
		assert_eq!(Caps::empty(), Caps::for_depth(2, true));
	}

	#[test]
	fn test_can_save_direct() {
		assert!(can_save(Caps::BPP_8, Caps::BPP_8, Caps::empty(), Caps::empty()));
		assert!(can_save(Caps::BPP_4 | Caps::BPP_8, Caps::BPP_4, Caps::empty(), Caps::empty()));
		assert!(!can_save(Caps::BPP_8, Caps::BPP_1, Caps::empty(), Caps::empty()));
		assert!(!can_save(Caps::HIGH_COLOR, Caps::BPP_8, Caps::empty(), Caps::empty()));
	}

	#[test]
	fn test_can_save_ignores_frame_bit() {
		// A shared FRAMES bit alone never makes a pairing legal.
		assert!(!can_save(Caps::FRAMES, Caps::FRAMES, Caps::empty(), Caps::empty()));
	}

	#[test]
	fn test_can_save_frames() {
		// A frame container with 1-bit frames fits a format taking 1-bit frames.
		assert!(can_save(Caps::BPP_1, Caps::FRAMES, Caps::BPP_1, Caps::BPP_1));
		assert!(!can_save(Caps::BPP_1, Caps::FRAMES, Caps::BPP_1, Caps::BPP_8));
	}
}
