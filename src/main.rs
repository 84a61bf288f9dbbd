use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{debug, warn};
use pngarea::{detect_regions, filter_regions, load_png, Fixtures, MINIMUM_REGION_AREA};

#[derive(Parser)]
#[command(name = "pngarea", about = "Print the pixel areas of the base and target PNG fixtures")]
struct Cli {
	/// Directory holding base.png and target.png (defaults to the bundled fixtures/large).
	/// Only used by the default command; `size` and `regions` take their own paths.
	#[arg(long, env = "PNGAREA_FIXTURES")]
	fixtures: Option<PathBuf>,
	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
	/// Print each image's path followed by its dimensions.
	Size {
		/// PNG files to measure.
		#[arg(required = true)]
		paths: Vec<PathBuf>,
	},
	/// Print the visible regions of an image as a JSON array.
	Regions {
		/// PNG file to scan.
		path: PathBuf,
		/// Smallest region area worth reporting.
		#[arg(long, default_value_t = MINIMUM_REGION_AREA)]
		minimum_region_area: u64,
	},
}

fn print_areas(out: &mut impl Write, fixtures: &Fixtures) -> Result<()> {
	let [base, target] = fixtures
		.areas()
		.with_context(|| format!("couldn't load fixtures from {}", fixtures.root().display()))?;
	writeln!(out, "{base}")?;
	writeln!(out, "{target}")?;
	Ok(())
}

fn print_sizes(out: &mut impl Write, paths: &[PathBuf]) -> Result<()> {
	let images = paths
		.iter()
		.map(|path| load_png(path).with_context(|| format!("couldn't measure {}", path.display())))
		.collect::<Result<Vec<_>>>()?;
	for (path, image) in paths.iter().zip(&images) {
		writeln!(out, "{}", path.display())?;
		writeln!(out, "{}x{}", image.width(), image.height())?;
	}
	Ok(())
}

fn print_regions(out: &mut impl Write, path: &Path, minimum_region_area: u64) -> Result<()> {
	let image = load_png(path).with_context(|| format!("couldn't scan {}", path.display()))?;
	let regions = detect_regions(&image);
	debug!("{} regions before filtering", regions.len());
	let regions = filter_regions(regions, minimum_region_area);
	writeln!(out, "{}", serde_json::to_string(&regions)?)?;
	Ok(())
}

fn main() -> Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
	let cli = Cli::parse();
	let mut out = io::stdout().lock();
	if cli.command.is_some() {
		if let Some(dir) = &cli.fixtures {
			warn!("ignoring fixtures directory {} for this command", dir.display());
		}
	}
	match cli.command {
		None => {
			let fixtures = cli.fixtures.map_or_else(Fixtures::bundled, |dir| Fixtures::at(dir));
			print_areas(&mut out, &fixtures)
		}
		Some(Command::Size { paths }) => print_sizes(&mut out, &paths),
		Some(Command::Regions {
			path,
			minimum_region_area,
		}) => print_regions(&mut out, &path, minimum_region_area),
	}
}
