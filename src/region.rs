//! opaque region detection.
//!
//! pixels whose alpha is above [`VISIBILITY_THRESHOLD`] are grouped into
//! 8-connected components with a two-pass labeling: the first pass hands out
//! provisional labels and records which ones touch, the second resolves each
//! label to its root and grows a bounding box per root.

use serde::Serialize;

use crate::Image;

/// regions smaller than this are usually noise (anti-aliasing, stray pixels).
pub const MINIMUM_REGION_AREA: u64 = 25;

/// alpha values at or below this don't count as visible.
pub const VISIBILITY_THRESHOLD: u8 = 127;

/// bounding box of one connected group of visible pixels.
///
/// corners are inclusive pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Region {
	/// left edge
	pub x1: u32,
	/// top edge
	pub y1: u32,
	/// right edge
	pub x2: u32,
	/// bottom edge
	pub y2: u32,
}

impl Region {
	fn at(x: u32, y: u32) -> Self {
		Self {
			x1: x,
			y1: y,
			x2: x,
			y2: y,
		}
	}

	fn include(&mut self, x: u32, y: u32) {
		self.x1 = self.x1.min(x);
		self.y1 = self.y1.min(y);
		self.x2 = self.x2.max(x);
		self.y2 = self.y2.max(y);
	}

	/// distance between the left and right edges
	pub fn width(&self) -> u32 {
		self.x2 - self.x1
	}

	/// distance between the top and bottom edges
	pub fn height(&self) -> u32 {
		self.y2 - self.y1
	}

	/// `width() * height()`, so a single pixel (or a one pixel wide line) has area 0.
	pub fn area(&self) -> u64 {
		u64::from(self.width()) * u64::from(self.height())
	}
}

/// label 0 is the background and is its own root.
fn find(parents: &mut [usize], mut label: usize) -> usize {
	while parents[label] != label {
		let grandparent = parents[parents[label]];
		parents[label] = grandparent;
		label = grandparent;
	}
	label
}

fn union(parents: &mut [usize], a: usize, b: usize) {
	let a = find(parents, a);
	let b = find(parents, b);
	if a != b {
		parents[a.max(b)] = a.min(b);
	}
}

/// find the bounding boxes of all visible components of `image`.
///
/// regions are returned in the raster order of their top-left-most pixel.
pub fn detect_regions(image: &Image) -> Vec<Region> {
	let width = image.width() as usize;
	let height = image.height() as usize;
	let mut labels = vec![0usize; width * height];
	let mut parents = vec![0usize];

	for y in 0..height {
		for x in 0..width {
			if image.alpha_at(x as u32, y as u32) <= VISIBILITY_THRESHOLD {
				continue;
			}
			// neighbours already visited in raster order: W, NW, N, NE
			let mut neighbours = [0usize; 4];
			if x > 0 {
				neighbours[0] = labels[y * width + x - 1];
			}
			if y > 0 {
				let above = (y - 1) * width;
				if x > 0 {
					neighbours[1] = labels[above + x - 1];
				}
				neighbours[2] = labels[above + x];
				if x + 1 < width {
					neighbours[3] = labels[above + x + 1];
				}
			}

			let label = match neighbours.iter().copied().filter(|&l| l != 0).min() {
				Some(smallest) => {
					for &n in neighbours.iter().filter(|&&l| l != 0) {
						union(&mut parents, n, smallest);
					}
					smallest
				}
				None => {
					let fresh = parents.len();
					parents.push(fresh);
					fresh
				}
			};
			labels[y * width + x] = label;
		}
	}

	let mut slots: Vec<Option<usize>> = vec![None; parents.len()];
	let mut regions: Vec<Region> = Vec::new();
	for y in 0..height {
		for x in 0..width {
			let label = labels[y * width + x];
			if label == 0 {
				continue;
			}
			let root = find(&mut parents, label);
			let (x, y) = (x as u32, y as u32);
			match slots[root] {
				Some(i) => regions[i].include(x, y),
				None => {
					slots[root] = Some(regions.len());
					regions.push(Region::at(x, y));
				}
			}
		}
	}
	regions
}

/// drop regions whose [`Region::area`] is below `minimum_area`.
pub fn filter_regions(regions: Vec<Region>, minimum_area: u64) -> Vec<Region> {
	regions
		.into_iter()
		.filter(|r| r.area() >= minimum_area)
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	/// `#` opaque, `+` alpha 128, `-` alpha 127, anything else transparent
	fn image(rows: &[&str]) -> Image {
		let width = rows[0].len() as u32;
		let height = rows.len() as u32;
		let mut pixels = Vec::new();
		for row in rows {
			assert_eq!(row.len() as u32, width);
			for c in row.bytes() {
				let alpha = match c {
					b'#' => 255,
					b'+' => 128,
					b'-' => 127,
					_ => 0,
				};
				pixels.extend_from_slice(&[0, 0, 0, alpha]);
			}
		}
		Image::from_rgba(width, height, pixels).unwrap()
	}

	fn region(x1: u32, y1: u32, x2: u32, y2: u32) -> Region {
		Region { x1, y1, x2, y2 }
	}

	#[test]
	fn test_separate_blocks() {
		let img = image(&["##..##", "##..##", "......", "...#.."]);
		assert_eq!(
			detect_regions(&img),
			vec![region(0, 0, 1, 1), region(4, 0, 5, 1), region(3, 3, 3, 3)]
		);
	}

	#[test]
	fn test_diagonals_connect() {
		let img = image(&["#..", ".#.", "..#"]);
		assert_eq!(detect_regions(&img), vec![region(0, 0, 2, 2)]);
		let img = image(&[".#", "#."]);
		assert_eq!(detect_regions(&img), vec![region(0, 0, 1, 1)]);
	}

	#[test]
	fn test_concave_shape_merges() {
		let img = image(&["#.#", "#.#", "###"]);
		assert_eq!(detect_regions(&img), vec![region(0, 0, 2, 2)]);
		// the two arms only meet at the bottom, far from where they start
		let img = image(&["#...#", "#...#", "#...#", "#.#.#", "#####"]);
		assert_eq!(detect_regions(&img), vec![region(0, 0, 4, 4)]);
	}

	#[test]
	fn test_visibility_threshold() {
		let img = image(&["+.-", "..."]);
		assert_eq!(detect_regions(&img), vec![region(0, 0, 0, 0)]);
	}

	#[test]
	fn test_transparent_image() {
		let img = image(&["....", "....", "-..-"]);
		assert!(detect_regions(&img).is_empty());
	}

	#[test]
	fn test_many_isolated_pixels() {
		let width = 200u32;
		let height = 120u32;
		let mut pixels = vec![0; 4 * (width * height) as usize];
		for y in (0..height).step_by(2) {
			for x in (0..width).step_by(2) {
				pixels[4 * (y * width + x) as usize + 3] = 255;
			}
		}
		let img = Image::from_rgba(width, height, pixels).unwrap();
		let regions = detect_regions(&img);
		assert_eq!(regions.len(), 100 * 60);
		assert_eq!(regions[0], region(0, 0, 0, 0));
		assert_eq!(regions[101], region(2, 2, 2, 2));
		assert_eq!(*regions.last().unwrap(), region(198, 118, 198, 118));
	}

	#[test]
	fn test_region_dimensions() {
		let r = region(2, 3, 8, 5);
		assert_eq!(r.width(), 6);
		assert_eq!(r.height(), 2);
		assert_eq!(r.area(), 12);
		assert_eq!(region(4, 4, 4, 4).area(), 0);
	}

	#[test]
	fn test_filter_regions() {
		let img = image(&[
			"######...##",
			"######...##",
			"######.....",
			"######.....",
			"######.....",
			"######.....",
		]);
		let regions = detect_regions(&img);
		assert_eq!(regions.len(), 2);
		assert_eq!(
			filter_regions(regions.clone(), MINIMUM_REGION_AREA),
			vec![region(0, 0, 5, 5)]
		);
		assert_eq!(filter_regions(regions, 0).len(), 2);
	}

	#[test]
	fn test_serialize() {
		let json = serde_json::to_string(&vec![region(0, 1, 5, 6)]).unwrap();
		assert_eq!(json, r#"[{"x1":0,"y1":1,"x2":5,"y2":6}]"#);
	}
}
