#![deny(missing_docs)]
#![doc = include_str!("../README.md")]

use std::path::PathBuf;

mod fixture;
mod image;
mod region;

pub use fixture::Fixtures;
pub use image::{decode_png, decode_png_header, load_png, Image, ImageHeader};
pub use region::{detect_regions, filter_regions, Region, MINIMUM_REGION_AREA, VISIBILITY_THRESHOLD};

/// loading error
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
	/// the file could not be read
	#[error("couldn't load {}", .path.display())]
	Io {
		/// path that was being read
		path: PathBuf,
		/// underlying I/O error
		source: std::io::Error,
	},
	/// this file is not a PNG file (missing PNG signature).
	#[error("not a png file")]
	NotPng,
	/// the PNG library rejected the file
	#[error("couldn't decode the png: {0}")]
	Decode(#[from] png::DecodingError),
	/// having the whole image in memory would require close to `usize::MAX` bytes
	#[error("decoded image larger than usize::MAX bytes")]
	TooLargeForUsize,
	/// the decoder produced a pixel layout we can't widen to RGBA
	#[error("unsupported output format {0:?} at {1:?}")]
	UnsupportedFormat(png::ColorType, png::BitDepth),
}

/// alias for `Result<T, Error>`
pub type Result<T> = core::result::Result<T, Error>;
