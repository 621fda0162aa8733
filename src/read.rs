use std::io::{self, Read, Seek};

use byteorder::{LittleEndian, ReadBytesExt};

use crate::{error::ReadError, MAGIC, NAME_SIZE, NULL_TERMINATOR};

/// Represents an archive with a fully-read directory.
#[derive(Debug)]
pub struct Archive<'a, R> {
	inner: &'a mut R,

	entries: Vec<Entry>,
}

/// Represents a directory entry.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct Entry {
	/// The name of the entry, up to 15 characters.
	pub name: String,

	/// The offset, in bytes, of the payload of the entry from the start of the archive.
	pub offset: u64,

	/// The length, in bytes, of the payload of the entry as stored in the archive.
	pub disk_size: u64,

	/// The length, in bytes, of the payload of the entry once uncompressed.
	pub size: u64,

	/// The kind of the entry.
	pub kind: EntryKind,

	/// Whether the payload of the entry is stored compressed.
	pub compressed: bool,
}

/// Represents the kind of an entry.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum EntryKind {
	/// Indicates an empty entry.
	None,

	/// Indicates a flat image.
	Qpic,

	/// Indicates a mipmapped texture.
	Tex,

	/// Indicates a collection of mipmapped textures.
	Miptex,

	/// Indicates a font.
	Font,

	/// Indicates a kind this library does not know about.
	Unknown(u8),
}

/// Represents the payload of an entry opened for reading.
#[derive(Debug)]
pub struct OpenEntry<'a, R>
where
	R: Read + Seek,
{
	inner: &'a mut R,

	off: u64,
	len: u64,
	pos: u64,
}

/// Represents a reader of archives.
#[derive(Debug)]
pub struct Reader<'a, R>
where
	R: Read + Seek,
{
	inner: &'a mut R,
}

impl<'a, R> Reader<'a, R>
where
	R: Read + Seek,
{
	/// Creates a new reader over the specified source.
	pub fn new(inner: &'a mut R) -> Self {
		Self {
			inner,
		}
	}

	/// Attempts to fully read the archive directory, consuming `self` in the process.
	pub fn read(self) -> Result<Archive<'a, R>, ReadError> {
		// Read the magic signature of the archive.

		let magic = {
			let mut buffer = [0; MAGIC.len()];

			self.inner.read_exact(&mut buffer)?;

			buffer
		};

		// Check if the signature is of the expected format.

		if magic != MAGIC {
			return Err(ReadError::BadMagic(magic));
		}

		// Read the number of entries in the directory and its offset.

		let count = self.inner.read_i32::<LittleEndian>()?;
		let offset = self.inner.read_i32::<LittleEndian>()?;

		if count < 0 || offset < 0 {
			return Err(ReadError::InvalidDirectory);
		}

		// Seek to the directory and read each of the fixed-size records in order.

		self.inner.seek(io::SeekFrom::Start(offset as u64))?;

		let mut entries: Vec<Entry> = Vec::with_capacity(count as usize);

		for _ in 0..count {
			// Read the properties of the entry.

			let offset = self.inner.read_i32::<LittleEndian>()?;
			let disk_size = self.inner.read_i32::<LittleEndian>()?;
			let size = self.inner.read_i32::<LittleEndian>()?;
			let kind = self.inner.read_u8()?;
			let compressed = self.inner.read_u8()?;
			let _ = self.inner.read_u16::<LittleEndian>()?; // Padding (always 0)

			if offset < 0 || disk_size < 0 || size < 0 {
				return Err(ReadError::InvalidDirectory);
			}

			// Read the name as a null-terminated string.

			let name = read_name(self.inner)?;

			entries.push(Entry {
				name,
				offset: offset as u64,
				disk_size: disk_size as u64,
				size: size as u64,
				kind: EntryKind::from(kind),
				compressed: compressed != 0,
			})
		}

		Ok(Archive {
			inner: self.inner,
			entries,
		})
	}
}

impl From<u8> for EntryKind {
	fn from(value: u8) -> Self {
		match value {
			0x00 => Self::None,
			0x42 => Self::Qpic,
			0x43 => Self::Tex,
			0x44 => Self::Miptex,
			0x45 => Self::Font,
			other => Self::Unknown(other),
		}
	}
}

impl EntryKind {
	/// Returns the raw tag for the kind, as stored in the directory.
	pub fn tag(&self) -> u8 {
		match self {
			Self::None => 0x00,
			Self::Qpic => 0x42,
			Self::Tex => 0x43,
			Self::Miptex => 0x44,
			Self::Font => 0x45,
			Self::Unknown(other) => *other,
		}
	}
}

impl<'a, R> Archive<'a, R> {
	/// Returns the number of entries in the archive.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns if the archive is void of any entries.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Returns the entry at the specified index, if it exists.
	pub fn get(&self, index: usize) -> Option<&Entry> {
		self.entries.get(index)
	}

	/// Returns an iterator over each of the entries in the archive, in directory order.
	pub fn iter(&self) -> impl Iterator<Item = &Entry> {
		self.entries.iter()
	}
}

impl<'a, R> Archive<'a, R>
where
	R: Read + Seek,
{
	/// Opens and returns the payload of the entry at the specified index for reading, if it exists.
	/// Reads and seeks through the returned payload are bounded to the span the directory declares for the entry.
	pub fn open(&mut self, index: usize) -> Option<OpenEntry<R>> {
		let entry = self.entries.get(index)?;

		Some(OpenEntry {
			inner: self.inner,
			off: entry.offset,
			len: entry.disk_size,
			pos: 0,
		})
	}
}

impl<'a, R> Read for OpenEntry<'a, R>
where
	R: Read + Seek,
{
	fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
		// Check if we have already reached the end of the entry.

		if self.pos >= self.len {
			return Ok(0);
		}

		// Seek to the start of the entry including any currently read bytes.

		self.inner.seek(io::SeekFrom::Start(self.off + self.pos))?;

		// Calculate the maximum possible number of bytes to read for the entry, to forbid reading beyond it.
		// Includes the number of bytes already read, honouring the length of the entry and the length of the buffer.

		let len = (self.len - self.pos.min(self.len)).min(buf.len() as u64) as usize;
		let off = self.inner.read(&mut buf[0..len])?;

		self.pos += off as u64;

		Ok(off)
	}
}

impl<'a, R> Seek for OpenEntry<'a, R>
where
	R: Read + Seek,
{
	fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
		// Resolve the target position relative to the start of the entry.
		// Seeking beyond the end of the entry is allowed; subsequent reads simply return nothing.

		let target = match pos {
			io::SeekFrom::Start(target) => Some(target),
			io::SeekFrom::End(delta) => self.len.checked_add_signed(delta),
			io::SeekFrom::Current(delta) => self.pos.checked_add_signed(delta),
		};

		match target {
			Some(target) => {
				self.pos = target;

				Ok(target)
			}
			None => Err(io::Error::new(io::ErrorKind::InvalidInput, "seek before the start of the entry")),
		}
	}
}

pub(crate) fn read_name<T>(inner: &mut T) -> Result<String, io::Error>
where
	T: Read,
{
	// Read the bytes for the string.

	let mut buf = [0; NAME_SIZE];

	inner.read_exact(&mut buf)?;

	// Determine the position of the null terminator and build a string from it.

	let pos = buf.iter().position(|&b| b == NULL_TERMINATOR).unwrap_or(buf.len());
	let str = buf.iter().map(|&b| char::from(b)).take(pos).collect();

	Ok(str)
}

#[cfg(test)]
mod tests {
	use std::io::{Cursor, Read, Seek, SeekFrom};

	use crate::error::ReadError;

	use super::{read_name, Archive, EntryKind, Reader};

	/// Builds an archive with a 12-byte header, the specified payload bytes, and then a one-entry directory describing them.
	fn single_entry_archive(name: &[u8], kind: u8, compressed: u8, payload: &[u8]) -> Vec<u8> {
		let mut bytes = Vec::new();

		bytes.extend_from_slice(b"WAD3");
		bytes.extend_from_slice(&1i32.to_le_bytes()); // Count
		bytes.extend_from_slice(&(12 + payload.len() as i32).to_le_bytes()); // Offset

		bytes.extend_from_slice(payload);

		bytes.extend_from_slice(&12i32.to_le_bytes()); // Payload offset
		bytes.extend_from_slice(&(payload.len() as i32).to_le_bytes()); // Stored size
		bytes.extend_from_slice(&(payload.len() as i32).to_le_bytes()); // Uncompressed size
		bytes.push(kind);
		bytes.push(compressed);
		bytes.extend_from_slice(&[0, 0]); // Padding

		let mut fixed = [0u8; 16];
		fixed[..name.len()].copy_from_slice(name);
		bytes.extend_from_slice(&fixed);

		bytes
	}

	#[test]
	fn test_to_name() {
		let mut cursor = Cursor::new(vec![b'C', b'R', b'E', b'T', b'E', b'4', b'_', b'F', b'L', b'R', 0, 0, 0, 0, 0, 0]); // CRETE4_FLR
		let string = read_name(&mut cursor).expect("failed to read string");

		assert_eq!(string, "CRETE4_FLR");
	}

	#[test]
	fn test_to_name_unterminated() {
		let mut cursor = Cursor::new(vec![b'a'; 16]);
		let string = read_name(&mut cursor).expect("failed to read string");

		assert_eq!(string, "aaaaaaaaaaaaaaaa");
	}

	#[test]
	fn test_read() {
		let mut cursor = Cursor::new(single_entry_archive(b"TEST", 0x43, 0, &[0xAA, 0xBB, 0xCC, 0xDD]));

		let archive: Archive<_> = Reader::new(&mut cursor).read().expect("failed to read archive");

		assert_eq!(archive.len(), 1);
		assert!(!archive.is_empty());

		let entry = archive.get(0).expect("expected first entry");

		assert_eq!(entry.name, "TEST");
		assert_eq!(entry.offset, 12);
		assert_eq!(entry.disk_size, 4);
		assert_eq!(entry.size, 4);
		assert_eq!(entry.kind, EntryKind::Tex);
		assert!(!entry.compressed);
	}

	#[test]
	fn test_read_order() {
		let mut bytes = Vec::new();

		bytes.extend_from_slice(b"WAD3");
		bytes.extend_from_slice(&2i32.to_le_bytes()); // Count
		bytes.extend_from_slice(&12i32.to_le_bytes()); // Offset

		for (name, kind) in [(b"FIRST\0\0\0\0\0\0\0\0\0\0\0", 0x42u8), (b"SECOND\0\0\0\0\0\0\0\0\0\0", 0x45u8)] {
			bytes.extend_from_slice(&0i32.to_le_bytes()); // Payload offset
			bytes.extend_from_slice(&0i32.to_le_bytes()); // Stored size
			bytes.extend_from_slice(&0i32.to_le_bytes()); // Uncompressed size
			bytes.push(kind);
			bytes.push(0);
			bytes.extend_from_slice(&[0, 0]); // Padding
			bytes.extend_from_slice(name);
		}

		let mut cursor = Cursor::new(bytes);

		let archive: Archive<_> = Reader::new(&mut cursor).read().expect("failed to read archive");

		assert_eq!(archive.len(), 2);

		assert_eq!(archive.get(0).expect("expected first entry").name, "FIRST");
		assert_eq!(archive.get(0).expect("expected first entry").kind, EntryKind::Qpic);
		assert_eq!(archive.get(1).expect("expected second entry").name, "SECOND");
		assert_eq!(archive.get(1).expect("expected second entry").kind, EntryKind::Font);

		let names: Vec<_> = archive.iter().map(|entry| entry.name.as_str()).collect();

		assert_eq!(names, vec!["FIRST", "SECOND"]);
	}

	#[test]
	fn test_read_bad_magic() {
		let mut cursor = Cursor::new(b"WAD2\0\0\0\0\0\0\0\0".to_vec());

		let result = Reader::new(&mut cursor).read();

		assert!(matches!(result, Err(ReadError::BadMagic(bytes)) if &bytes == b"WAD2"));
	}

	#[test]
	fn test_read_negative_count() {
		let mut bytes = Vec::new();

		bytes.extend_from_slice(b"WAD3");
		bytes.extend_from_slice(&(-1i32).to_le_bytes()); // Count
		bytes.extend_from_slice(&12i32.to_le_bytes()); // Offset

		let mut cursor = Cursor::new(bytes);

		let result = Reader::new(&mut cursor).read();

		assert!(matches!(result, Err(ReadError::InvalidDirectory)));
	}

	#[test]
	fn test_read_short_directory() {
		let mut bytes = Vec::new();

		bytes.extend_from_slice(b"WAD3");
		bytes.extend_from_slice(&1i32.to_le_bytes()); // Count
		bytes.extend_from_slice(&12i32.to_le_bytes()); // Offset
		bytes.extend_from_slice(&[0; 8]); // Not enough bytes for a full record

		let mut cursor = Cursor::new(bytes);

		let result = Reader::new(&mut cursor).read();

		assert!(matches!(result, Err(ReadError::IoError(_))));
	}

	#[test]
	fn test_open_entry_bounded() {
		let mut cursor = Cursor::new(single_entry_archive(b"TEST", 0x43, 0, &[0xAA, 0xBB, 0xCC, 0xDD]));

		let mut archive: Archive<_> = Reader::new(&mut cursor).read().expect("failed to read archive");
		let mut entry = archive.open(0).expect("expected first entry");

		let mut buf = Vec::new();
		let len = entry.read_to_end(&mut buf).expect("failed to read entry");

		// The read must stop at the declared span, not run on into the directory.

		assert_eq!(len, 4);
		assert_eq!(buf, vec![0xAA, 0xBB, 0xCC, 0xDD]);
	}

	#[test]
	fn test_open_entry_seek() {
		let mut cursor = Cursor::new(single_entry_archive(b"TEST", 0x43, 0, &[0xAA, 0xBB, 0xCC, 0xDD]));

		let mut archive: Archive<_> = Reader::new(&mut cursor).read().expect("failed to read archive");
		let mut entry = archive.open(0).expect("expected first entry");

		let mut buf = [0; 1];

		entry.seek(SeekFrom::Start(2)).expect("failed to seek from start");
		entry.read_exact(&mut buf).expect("failed to read after seek");

		assert_eq!(buf, [0xCC]);

		entry.seek(SeekFrom::Current(-2)).expect("failed to seek from current");
		entry.read_exact(&mut buf).expect("failed to read after relative seek");

		assert_eq!(buf, [0xBB]);

		entry.seek(SeekFrom::End(-1)).expect("failed to seek from end");
		entry.read_exact(&mut buf).expect("failed to read after end seek");

		assert_eq!(buf, [0xDD]);

		// Past the end of the span, reads yield nothing.

		entry.seek(SeekFrom::End(4)).expect("failed to seek past end");

		assert!(matches!(entry.read(&mut buf), Ok(0)));
	}
}
