//! Library for reading `WAD3` archives used throughout GoldSrc-era games and decoding their palette-indexed textures into plain RGB images.

use std::io::{Read, Seek};

use error::ReadError;

/// Contains types for errors.
pub mod error;

/// Contains types and the accompanying logic for reading the archive directory.
pub mod read;

/// Contains types and the accompanying logic for decoding texture entries.
pub mod tex;

/// Contains the logic for writing decoded textures as portable pixel-maps.
pub mod write;

/// Represents the magic signature at the start of an archive.
pub const MAGIC: [u8; 4] = [0x57, 0x41, 0x44, 0x33]; // WAD3

/// Represents the length of the name of an entry, including the null terminator.
pub const NAME_SIZE: usize = 16;

/// Represents the null terminator for the names of entries.
pub const NULL_TERMINATOR: u8 = b'\0';

/// Represents the number of mip levels stored for each texture.
pub const MIP_LEVELS: usize = 4;

/// Attempts to fully read the directory of the archive in the specified source.
///
/// If the read is successful, an `Archive` is returned which may be inspected for the contents of the archive.
/// If the read is unsuccessful, a `ReadError` is returned.
pub fn read<R>(inner: &mut R) -> Result<read::Archive<R>, ReadError>
where
	R: Read + Seek,
{
	read::Reader::new(inner).read()
}
