use std::cmp::max;
use std::fs;
use std::path::Path;

use log::{debug, info};
use png::{BitDepth, ColorType, Decoder, Transformations};

use crate::{Error, Result};

const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// image metadata found at the start of the PNG file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageHeader {
	width: u32,
	height: u32,
	bit_depth: BitDepth,
	color_type: ColorType,
	interlaced: bool,
}

impl ImageHeader {
	/// width of image in pixels
	pub fn width(&self) -> u32 {
		self.width
	}
	/// height of image in pixels
	pub fn height(&self) -> u32 {
		self.height
	}
	/// width × height
	pub fn area(&self) -> u64 {
		u64::from(self.width) * u64::from(self.height)
	}
	/// bits per sample, as stored in the file
	pub fn bit_depth(&self) -> BitDepth {
		self.bit_depth
	}
	/// color channels, as stored in the file
	pub fn color_type(&self) -> ColorType {
		self.color_type
	}
	/// whether the file uses Adam7 interlacing
	pub fn interlaced(&self) -> bool {
		self.interlaced
	}
}

/// decoded image, 8 bits per channel RGBA.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
	width: u32,
	height: u32,
	pixels: Vec<u8>,
}

impl Image {
	/// wrap already-decoded RGBA pixels.
	///
	/// returns `None` unless `pixels.len() == 4 * width * height`.
	pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
		let len = rgba_len(width, height).ok()?;
		(pixels.len() == len).then_some(Self {
			width,
			height,
			pixels,
		})
	}

	/// image width in pixels
	pub fn width(&self) -> u32 {
		self.width
	}

	/// image height in pixels
	pub fn height(&self) -> u32 {
		self.height
	}

	/// number of pixels in the image (width × height)
	pub fn area(&self) -> u64 {
		u64::from(self.width) * u64::from(self.height)
	}

	/// RGBA bytes, row by row, no padding
	pub fn pixels(&self) -> &[u8] {
		&self.pixels
	}

	/// RGBA value at `(x, y)`, or `None` if out of bounds
	pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
		if x >= self.width || y >= self.height {
			return None;
		}
		let i = 4 * (y as usize * self.width as usize + x as usize);
		let mut rgba = [0; 4];
		rgba.copy_from_slice(&self.pixels[i..i + 4]);
		Some(rgba)
	}

	/// alpha channel at `(x, y)`. out of bounds reads as fully transparent.
	pub fn alpha_at(&self, x: u32, y: u32) -> u8 {
		self.pixel(x, y).map_or(0, |[_, _, _, a]| a)
	}
}

fn rgba_len(width: u32, height: u32) -> Result<usize> {
	usize::try_from(width)
		.ok()
		.zip(usize::try_from(height).ok())
		.and_then(|(w, h)| w.checked_mul(h))
		.and_then(|area| area.checked_mul(4))
		.ok_or(Error::TooLargeForUsize)
}

fn check_signature(bytes: &[u8]) -> Result<()> {
	if bytes.starts_with(&PNG_SIGNATURE) {
		Ok(())
	} else {
		Err(Error::NotPng)
	}
}

/// decode image metadata.
///
/// only the chunks before the first IDAT are read, pixel data is left alone.
pub fn decode_png_header(bytes: &[u8]) -> Result<ImageHeader> {
	check_signature(bytes)?;
	let reader = Decoder::new(bytes).read_info()?;
	let info = reader.info();
	Ok(ImageHeader {
		width: info.width,
		height: info.height,
		bit_depth: info.bit_depth,
		color_type: info.color_type,
		interlaced: info.interlaced,
	})
}

/// decode a whole PNG file held in memory.
///
/// palettes, low bit depths and tRNS chunks are expanded by the decoder and
/// 16-bit samples are cut down to their high byte, so every image comes out
/// as 8-bit RGBA.
pub fn decode_png(bytes: &[u8]) -> Result<Image> {
	check_signature(bytes)?;
	let mut decoder = Decoder::new(bytes);
	decoder.set_transformations(Transformations::EXPAND | Transformations::STRIP_16);
	let mut reader = decoder.read_info()?;
	let width = reader.info().width;
	let height = reader.info().height;
	let len = rgba_len(width, height)?;

	let mut buffer = vec![0; max(reader.output_buffer_size(), len)];
	let frame = reader.next_frame(&mut buffer)?;
	widen_to_rgba(&mut buffer, len / 4, frame.color_type, frame.bit_depth)?;
	buffer.truncate(len);

	Ok(Image {
		width,
		height,
		pixels: buffer,
	})
}

/// read and decode the PNG file at `path`.
pub fn load_png(path: impl AsRef<Path>) -> Result<Image> {
	let path = path.as_ref();
	debug!("loading png from {}", path.display());
	let bytes = fs::read(path).map_err(|source| Error::Io {
		path: path.to_path_buf(),
		source,
	})?;
	let image = decode_png(&bytes)?;
	info!(
		"loaded {} ({}x{})",
		path.display(),
		image.width(),
		image.height()
	);
	Ok(image)
}

/// spread 8-bit gray, gray+alpha or RGB samples out to RGBA in place.
///
/// `buffer` must already hold at least `4 * area` bytes.
fn widen_to_rgba(
	buffer: &mut [u8],
	area: usize,
	color_type: ColorType,
	bit_depth: BitDepth,
) -> Result<()> {
	debug_assert!(buffer.len() >= 4 * area);
	match (bit_depth, color_type) {
		(BitDepth::Eight, ColorType::Rgba) => {}
		(BitDepth::Eight, ColorType::Rgb) => {
			// we have to process the pixels in reverse
			// to avoid overwriting data we'll need later
			let mut dest = 4 * area;
			let mut src = 3 * area;
			for _ in 0..area {
				buffer[dest - 1] = 255;
				buffer[dest - 2] = buffer[src - 1];
				buffer[dest - 3] = buffer[src - 2];
				buffer[dest - 4] = buffer[src - 3];
				dest -= 4;
				src -= 3;
			}
		}
		(BitDepth::Eight, ColorType::Grayscale) => {
			let mut dest = 4 * area;
			let mut src = area;
			for _ in 0..area {
				buffer[dest - 1] = 255;
				buffer[dest - 2] = buffer[src - 1];
				buffer[dest - 3] = buffer[src - 1];
				buffer[dest - 4] = buffer[src - 1];
				dest -= 4;
				src -= 1;
			}
		}
		(BitDepth::Eight, ColorType::GrayscaleAlpha) => {
			let mut dest = 4 * area;
			let mut src = 2 * area;
			for _ in 0..area {
				buffer[dest - 1] = buffer[src - 1];
				buffer[dest - 2] = buffer[src - 2];
				buffer[dest - 3] = buffer[src - 2];
				buffer[dest - 4] = buffer[src - 2];
				dest -= 4;
				src -= 2;
			}
		}
		(bit_depth, color_type) => return Err(Error::UnsupportedFormat(color_type, bit_depth)),
	}
	Ok(())
}
