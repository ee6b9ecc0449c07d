use std::{
	env,
	fs,
	path::Path,
	process
};

use rak_kit::{
	convert,
	default_registry
};

fn main() -> anyhow::Result<()> {
	let args: Vec<String> = env::args().collect();

	if args.len() < 2 {
		eprintln!("usage: rak <input> [output]");
		process::exit(2);
	}

	let data = fs::read(&args[1])?;
	let registry = default_registry();

	let loaded = match registry.detect(&data, Some(Path::new(&args[1])), true) {
		Ok(loaded) => loaded,
		Err(e) => {
			eprint!("{}", e);
			process::exit(1);
		},
	};

	let tree = &loaded.tree;
	let asset = tree.asset(tree.root());

	println!("{}: {} ({})", args[1], loaded.format.name(), loaded.format.description());

	if asset.bits_per_sample > 0 && asset.pixels.is_some() {
		println!("  {}x{}, {} bpp", asset.width, asset.height, asset.bits_per_sample);
	}

	let frames = tree.frames(tree.root());
	if !frames.is_empty() {
		println!("  {} frames", frames.len());
	}

	if !asset.colors.is_empty() {
		println!("  {} colors", asset.colors.len());
	}

	if !asset.info.is_empty() {
		println!("  {}", asset.info);
	}

	if let Some(output) = args.get(2) {
		let ext = Path::new(output)
			.extension()
			.and_then(|e| e.to_str())
			.unwrap_or("");

		let bytes = convert(&registry, &data, Some(Path::new(&args[1])), ext)?;
		fs::write(output, bytes)?;
		println!("wrote {}", output);
	}

	Ok(())
}
