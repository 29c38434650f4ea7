use gif2bmp_core::models::Pixel;

use crate::errors::GIFReaderError;

/// Ordered list of RGB entries referenced by palette index.
#[derive(Clone)]
pub struct ColorTable {
    colors: Vec<Pixel>,
}

impl ColorTable {

    /// Splits a raw color table block into RGB triples in declaration order.
    pub fn from_bytes(data: &[u8]) -> Result<Self, GIFReaderError> {
        if data.len() % 3 != 0 {
            return Err(GIFReaderError::MalformedPalette {
                description: format!("color table size {} is not a multiple of 3", data.len()),
            });
        }

        let colors = data.chunks(3)
            .map(|entry| Pixel::from_rgb(entry[0], entry[1], entry[2]))
            .collect();

        Ok(ColorTable {
            colors,
        })
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn color(&self, index: usize) -> Option<Pixel> {
        self.colors.get(index).copied()
    }
}

/// Global and local color tables, innermost last. A local table shadows the
/// global one for the single image block that declared it and is popped when
/// that block finishes decoding.
pub struct ColorTableStack {
    tables: Vec<ColorTable>,
}

impl ColorTableStack {

    pub fn new() -> Self {
        ColorTableStack {
            tables: Vec::new(),
        }
    }

    pub fn push(&mut self, table: ColorTable) {
        self.tables.push(table);
    }

    /// Removes the innermost table. Popping an empty stack is a no-op.
    pub fn pop(&mut self) {
        self.tables.pop();
    }

    pub fn current(&self) -> Option<&ColorTable> {
        self.tables.last()
    }
}
