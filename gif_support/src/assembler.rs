use gif2bmp_core::models::Image;

use crate::color_table::ColorTable;
use crate::errors::GIFReaderError;

/// Maps a decoded index stream through the active color table into a
/// width x height grid, keeping the top-down row-major order of the stream.
pub fn assemble_pixels(
    indices: &[u8],
    color_table: &ColorTable,
    width: usize,
    height: usize,
) -> Result<Image, GIFReaderError> {
    if indices.len() != width * height {
        return Err(GIFReaderError::LzwProtocolViolation {
            description: format!(
                "decompressed to {} indices for a {}x{} image",
                indices.len(), width, height
            ),
        });
    }

    let mut pixels = Vec::with_capacity(indices.len());
    for &index in indices {
        let color = color_table.color(index as usize)
            .ok_or_else(|| GIFReaderError::PaletteIndexOutOfRange {
                description: format!(
                    "index {} references a color table with {} entries",
                    index, color_table.len()
                ),
            })?;
        pixels.push(color);
    }

    Ok(Image::from_pixels(width, height, pixels))
}
