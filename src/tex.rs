use std::io::{self, Read, Seek};

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::DecodeError;
use crate::read::{read_name, Entry};
use crate::MIP_LEVELS;

/// Represents a texture decoded into plain RGB pixels.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Texture {
	/// The name embedded in the texture itself (typically matching the directory entry).
	pub name: String,

	/// The width of the texture, in pixels.
	pub width: u32,

	/// The height of the texture, in pixels.
	pub height: u32,

	/// The pixels of the texture as RGB triples, row-major from the top-left.
	pub pixels: Vec<u8>,
}

/// Attempts to decode the texture payload of the specified entry from the specified source.
///
/// The source is expected to span exactly the payload of the entry, with the texture header at position zero
/// and every stored offset relative to it. All reads are bounded by the source, so a payload whose declared
/// mip or palette data falls outside it fails with [`DecodeError::Truncated`] rather than reading unrelated data.
pub fn decode<R>(entry: &Entry, src: &mut R) -> Result<Texture, DecodeError>
where
	R: Read + Seek,
{
	// The format carries a compression flag but no known archive uses it; refuse rather than misdecode.

	if entry.compressed {
		return Err(DecodeError::Compressed);
	}

	let span = src.seek(io::SeekFrom::End(0))?;

	src.seek(io::SeekFrom::Start(0))?;

	// Read the texture header: name, dimensions and the offsets of each mip level.

	let name = read_name(src)?;
	let width = src.read_u32::<LittleEndian>()?;
	let height = src.read_u32::<LittleEndian>()?;

	let mut offsets = [0u32; MIP_LEVELS];

	for offset in &mut offsets {
		*offset = src.read_u32::<LittleEndian>()?;
	}

	// Check that the full-resolution pixel plane fits within the payload before committing to it.

	let size = u64::from(width) * u64::from(height);

	if u64::from(offsets[0]).saturating_add(size) > span {
		return Err(DecodeError::Truncated);
	}

	// Read the mip level 0 plane of palette indices, one byte per pixel.

	let mut indices = vec![0u8; size as usize];

	src.seek(io::SeekFrom::Start(u64::from(offsets[0])))?;
	src.read_exact(&mut indices)?;

	// The palette trails the coarsest mip level, whose plane is an eighth of the full size along each dimension.

	let last = u64::from(offsets[MIP_LEVELS - 1]) + u64::from(width >> 3) * u64::from(height >> 3);

	src.seek(io::SeekFrom::Start(last))?;

	let count = src.read_u16::<LittleEndian>()?;

	let mut palette = vec![0u8; usize::from(count) * 3];

	src.read_exact(&mut palette)?;

	// Resolve every index through the palette into an RGB triple, in the order the indices were read.

	let mut pixels = Vec::with_capacity(indices.len() * 3);

	for &index in &indices {
		if u16::from(index) >= count {
			return Err(DecodeError::PaletteIndex {
				index,
				len: count,
			});
		}

		let at = usize::from(index) * 3;

		pixels.extend_from_slice(&palette[at..at + 3]);
	}

	Ok(Texture {
		name,
		width,
		height,
		pixels,
	})
}
