use std::io::{self, Write};

use crate::tex::Texture;

/// Attempts to write the specified texture to the specified destination as a binary portable pixel-map.
///
/// The output is the `P6` flavour: a short ASCII header carrying the dimensions and the maximum
/// channel value, followed by the raw RGB triples in the same row-major order the texture holds them.
pub fn write_ppm<W>(dst: &mut W, texture: &Texture) -> io::Result<()>
where
	W: Write,
{
	writeln!(dst, "P6 {} {} 255", texture.width, texture.height)?;

	dst.write_all(&texture.pixels)?;

	Ok(())
}
