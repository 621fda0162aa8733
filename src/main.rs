//! Command-line application for extracting the textures of a WAD3 archive as portable pixel-maps.

use std::{
	fs::{self, File},
	io::{Read, Seek},
	path::{Path, PathBuf},
	process::ExitCode,
};

use clap::Parser;
use wad3_extract::{
	read::{Archive, EntryKind},
	tex, write,
};

/// Represents the exit code for an archive that could not be opened.
const EXIT_OPEN: u8 = 1;

/// Represents the exit code for an archive that is not valid WAD3.
/// Usage errors exit with clap's own code of 2.
const EXIT_FORMAT: u8 = 3;

/// Represents the exit code for an output directory that could not be created.
const EXIT_TARGET: u8 = 4;

/// Extracts the textures of a WAD3 archive to portable pixel-map images
#[derive(Debug, Parser)]
struct Cli {
	/// Specifies the archive to extract
	archive: PathBuf,

	/// Specifies the output directory, instead of deriving one from the archive path
	#[arg(short, long)]
	target: Option<PathBuf>,
}

fn main() -> ExitCode {
	let cli = Cli::parse();

	// Open and read the directory of the archive.

	let mut file = match File::open(&cli.archive) {
		Ok(file) => file,
		Err(err) => {
			eprintln!("Failed to open archive <{}>: {}", cli.archive.display(), err);

			return ExitCode::from(EXIT_OPEN);
		}
	};

	let mut archive = match wad3_extract::read(&mut file) {
		Ok(archive) => archive,
		Err(err) => {
			eprintln!("Failed to read archive <{}>: {}", cli.archive.display(), err);

			return ExitCode::from(EXIT_FORMAT);
		}
	};

	// Create the output directory.

	let target = cli.target.unwrap_or_else(|| output_dir(&cli.archive));

	if let Err(err) = fs::create_dir_all(&target) {
		eprintln!("Failed to create output directory <{}>: {}", target.display(), err);

		return ExitCode::from(EXIT_TARGET);
	}

	println!("{} directory entries:", archive.len());

	let (extracted, failed) = extract(&mut archive, &target);

	println!("Extracted {} textures to <{}> ({} failed).", extracted, target.display(), failed);

	ExitCode::SUCCESS
}

/// Walks every entry of the archive, reporting each one and writing the textures that decode
/// successfully to the target directory. A failing entry is reported and skipped, not fatal.
/// Returns how many textures were extracted and how many failed.
fn extract<R>(archive: &mut Archive<R>, target: &Path) -> (usize, usize)
where
	R: Read + Seek,
{
	let mut extracted = 0;
	let mut failed = 0;

	for index in 0..archive.len() {
		let Some(entry) = archive.get(index).cloned() else {
			continue;
		};

		println!("{}: {} {}", entry.name, entry.kind.tag(), entry.size);

		// Only texture entries carry a decodable image.

		if entry.kind != EntryKind::Tex {
			continue;
		}

		let Some(mut payload) = archive.open(index) else {
			continue;
		};

		let texture = match tex::decode(&entry, &mut payload) {
			Ok(texture) => texture,
			Err(err) => {
				eprintln!("Failed to decode entry [{}]: {}", entry.name, err);

				failed += 1;

				continue;
			}
		};

		// Write the texture, named after the directory entry.

		let path = target.join(format!("{}.ppm", entry.name));

		let result = File::create(&path).and_then(|mut file| write::write_ppm(&mut file, &texture));

		match result {
			Ok(()) => extracted += 1,
			Err(err) => {
				eprintln!("Failed to write file <{}>: {}", path.display(), err);

				failed += 1;
			}
		}
	}

	(extracted, failed)
}

/// Derives the output directory for the specified archive path.
/// The final extension becomes a directory; a path without one gains a `_wad` suffix instead.
fn output_dir(path: &Path) -> PathBuf {
	match path.extension() {
		Some(_) => path.with_extension(""),
		None => {
			let mut name = path.file_name().map(|name| name.to_os_string()).unwrap_or_default();

			name.push("_wad");

			path.with_file_name(name)
		}
	}
}
