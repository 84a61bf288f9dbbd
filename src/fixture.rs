use std::path::{Path, PathBuf};

use log::debug;

use crate::{load_png, Image, Result};

/// a directory holding the `base.png` / `target.png` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixtures {
	root: PathBuf,
}

impl Fixtures {
	/// file name of the base image
	pub const BASE: &'static str = "base.png";
	/// file name of the target image
	pub const TARGET: &'static str = "target.png";

	/// the large fixtures shipped with this crate, `fixtures/large`
	/// next to `Cargo.toml`.
	pub fn bundled() -> Self {
		Self::at(Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures").join("large"))
	}

	/// fixtures in some other directory
	pub fn at(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	/// directory the fixtures are read from
	pub fn root(&self) -> &Path {
		&self.root
	}

	/// path of the base image
	pub fn base_path(&self) -> PathBuf {
		self.root.join(Self::BASE)
	}

	/// path of the target image
	pub fn target_path(&self) -> PathBuf {
		self.root.join(Self::TARGET)
	}

	/// decode base, then target.
	///
	/// fails as soon as either one can't be loaded.
	pub fn load(&self) -> Result<(Image, Image)> {
		debug!("loading fixtures from {}", self.root.display());
		let base = load_png(self.base_path())?;
		let target = load_png(self.target_path())?;
		Ok((base, target))
	}

	/// pixel areas of base and target, in that order
	pub fn areas(&self) -> Result<[u64; 2]> {
		let (base, target) = self.load()?;
		Ok([base.area(), target.area()])
	}
}

impl Default for Fixtures {
	fn default() -> Self {
		Self::bundled()
	}
}
