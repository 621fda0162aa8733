use core::fmt;
use std::{error::Error, fmt::Display, io};

/// Represents a read-related error. These are fatal to the whole run.
#[derive(Debug)]
pub enum ReadError {
	/// Indicates that a generic I/O error occurred.
	IoError(io::Error),

	/// Indicates that the magic signature was not `WAD3`, with the bytes that were found instead.
	BadMagic([u8; 4]),

	/// Indicates that the directory count or offset was not usable.
	InvalidDirectory,
}

/// Represents a decode-related error for a single texture entry. These do not abort the remaining entries.
#[derive(Debug)]
pub enum DecodeError {
	/// Indicates that a generic I/O error occurred.
	IoError(io::Error),

	/// Indicates that the entry payload ended before the texture was complete.
	Truncated,

	/// Indicates that a pixel referenced a palette entry beyond the declared palette length.
	PaletteIndex {
		index: u8,
		len: u16,
	},

	/// Indicates that the entry is flagged as compressed, which is unsupported.
	Compressed,
}

impl Error for ReadError {}

impl Display for ReadError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::IoError(err) => write!(f, "input/output error [{}]", err),
			Self::BadMagic(bytes) => write!(f, "bad magic signature [{}]", bytes.iter().map(|&b| char::from(b)).collect::<String>().escape_default()),
			Self::InvalidDirectory => write!(f, "invalid directory count or offset"),
		}
	}
}

impl From<io::Error> for ReadError {
	fn from(value: io::Error) -> Self {
		Self::IoError(value)
	}
}

impl Error for DecodeError {}

impl Display for DecodeError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::IoError(err) => write!(f, "input/output error [{}]", err),
			Self::Truncated => write!(f, "truncated texture payload"),
			Self::PaletteIndex {
				index,
				len,
			} => write!(f, "palette index out of range [{} >= {}]", index, len),
			Self::Compressed => write!(f, "compressed entries are unsupported"),
		}
	}
}

impl From<io::Error> for DecodeError {
	fn from(value: io::Error) -> Self {
		match value.kind() {
			io::ErrorKind::UnexpectedEof => Self::Truncated,
			_ => Self::IoError(value),
		}
	}
}
