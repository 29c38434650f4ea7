use byteorder::{ByteOrder, LittleEndian};

use gif2bmp_core::models::{Image, ImageIOError, ImageReader};

use crate::assembler::assemble_pixels;
use crate::buffer::DataBuffer;
use crate::color_table::{ColorTable, ColorTableStack};
use crate::errors::GIFReaderError;
use crate::lzw::LzwDecoder;

// see https://www.fileformat.info/format/gif/egff.htm

const BLOCK_ID_EXTENSION: u8 = 0x21;
const BLOCK_ID_IMAGE_DESCRIPTOR: u8 = 0x2C;
const BLOCK_ID_TRAILER: u8 = 0x3B;

const EXTENSION_ID_PLAIN_TEXT: u8 = 0x01;
const EXTENSION_ID_GRAPHIC_CONTROL: u8 = 0xF9;
const EXTENSION_ID_COMMENT: u8 = 0xFE;
const EXTENSION_ID_APPLICATION: u8 = 0xFF;

// Widths past this leave no room in the 12-bit code space for the sentinels.
const MAX_MINIMUM_CODE_SIZE: u8 = 11;

pub struct GIFReader {
}

impl GIFReader {

    pub fn new() -> Self {
        GIFReader {}
    }
}

impl ImageReader for GIFReader {

    fn read(&self, data: &Vec<u8>) -> Result<Image, ImageIOError> {
        let mut decoder = GifDecoder::new(data.clone());
        decoder.decode().map_err(|err| ImageIOError::FailedToRead {
            description: format!("failed to read gif: {}", err),
        })
    }
}

/// Walks the outer block structure of the stream: signature, logical screen
/// descriptor, then data blocks until the trailer. Color tables are pushed as
/// they are declared and popped when the image block that owns them is done.
struct GifDecoder {
    buffer: DataBuffer,
    pos: usize,
    color_tables: ColorTableStack,
    image: Option<Image>,
}

impl GifDecoder {

    fn new(data: Vec<u8>) -> Self {
        GifDecoder {
            buffer: DataBuffer::from_bytes(data),
            pos: 0,
            color_tables: ColorTableStack::new(),
            image: None,
        }
    }

    fn decode(&mut self) -> Result<Image, GIFReaderError> {
        self.decode_signature()?;
        self.decode_screen_descriptor()?;

        let mut block_counter = 0;
        while self.next_data_block() {
            trace!("block #{}", block_counter);
            self.decode_data_block()?;
            block_counter += 1;
        }

        // A well-formed file may contain more than one image block, the last
        // decoded one is the output of a single-image conversion.
        self.image.take().ok_or_else(|| GIFReaderError::TruncatedInput {
            description: "stream ended without any image data".to_string(),
        })
    }

    fn enough_data(&self, amount: usize) -> bool {
        self.pos + amount <= self.buffer.len()
    }

    fn require(&self, amount: usize, what: &str) -> Result<(), GIFReaderError> {
        if !self.enough_data(amount) {
            return Err(GIFReaderError::TruncatedInput {
                description: format!(
                    "{} needs {} bytes, {} left",
                    what, amount, self.buffer.len() - self.pos
                ),
            });
        }

        Ok(())
    }

    fn read_byte(&mut self, what: &str) -> Result<u8, GIFReaderError> {
        self.require(1, what)?;
        let byte = self.buffer.byte_range(self.pos, 1)[0];
        self.pos += 1;
        Ok(byte)
    }

    fn next_data_block(&self) -> bool {
        if !self.enough_data(1) {
            return false;
        }

        self.buffer.byte_range(self.pos, 1)[0] != BLOCK_ID_TRAILER
    }

    fn decode_signature(&mut self) -> Result<(), GIFReaderError> {
        self.require(6, "signature")?;

        let signature = self.buffer.byte_range(self.pos, 6);
        if signature != b"GIF87a" && signature != b"GIF89a" {
            return Err(GIFReaderError::BadSignature {
                description: format!("unexpected signature: {:x?}", signature),
            });
        }

        trace!("gif version: {}", String::from_utf8_lossy(signature));
        self.pos += 6;
        Ok(())
    }

    fn decode_screen_descriptor(&mut self) -> Result<(), GIFReaderError> {
        self.require(7, "logical screen descriptor")?;

        let screen_width = LittleEndian::read_u16(self.buffer.byte_range(self.pos, 2));
        let screen_height = LittleEndian::read_u16(self.buffer.byte_range(self.pos + 2, 2));
        let background_color = self.buffer.byte_range(self.pos + 5, 1)[0];
        let global_table_present = self.buffer.bit_range((self.pos + 4) * 8 + 7, 1) == 1;
        let table_size_exponent = self.buffer.bit_range((self.pos + 4) * 8, 3) as u8;
        self.pos += 7;

        trace!("screen size: {}x{}", screen_width, screen_height);
        trace!("background color index: {}", background_color);
        trace!("uses global color table: {}", global_table_present);

        if global_table_present {
            let table_size = (1usize << (table_size_exponent + 1)) * 3;
            trace!("global color table size: {} bytes", table_size);
            self.push_color_table(table_size)?;
        }

        Ok(())
    }

    fn push_color_table(&mut self, size: usize) -> Result<(), GIFReaderError> {
        self.require(size, "color table")?;

        let table = ColorTable::from_bytes(self.buffer.byte_range(self.pos, size))?;
        self.pos += size;
        self.color_tables.push(table);
        Ok(())
    }

    fn decode_data_block(&mut self) -> Result<(), GIFReaderError> {
        let block_code = self.read_byte("block identifier")?;

        match block_code {
            BLOCK_ID_IMAGE_DESCRIPTOR => self.decode_table_based_image(),
            BLOCK_ID_EXTENSION => self.decode_extension(),
            other => Err(GIFReaderError::UnknownBlock {
                description: format!("unknown block identifier: 0x{:02x}", other),
            }),
        }
    }

    fn decode_extension(&mut self) -> Result<(), GIFReaderError> {
        let extension_code = self.read_byte("extension identifier")?;

        match extension_code {
            EXTENSION_ID_GRAPHIC_CONTROL => self.decode_graphic_block(),
            EXTENSION_ID_PLAIN_TEXT => Err(GIFReaderError::UnsupportedExtension {
                description: "plain text extensions are not supported".to_string(),
            }),
            EXTENSION_ID_COMMENT => Err(GIFReaderError::UnsupportedExtension {
                description: "comment extensions are not supported".to_string(),
            }),
            EXTENSION_ID_APPLICATION => Err(GIFReaderError::UnsupportedExtension {
                description: "application extensions are not supported".to_string(),
            }),
            other => Err(GIFReaderError::UnknownBlock {
                description: format!("unknown extension identifier: 0x{:02x}", other),
            }),
        }
    }

    /// A graphic control extension only modifies the rendering block right
    /// after it; the disposal and timing fields carry nothing this decoder
    /// needs, so the payload is skipped and the next block is dispatched.
    fn decode_graphic_block(&mut self) -> Result<(), GIFReaderError> {
        let block_size = self.read_byte("graphic control extension size")? as usize;

        // +1 for the block terminator
        self.require(block_size + 1, "graphic control extension")?;
        self.pos += block_size + 1;

        let block_code = self.read_byte("block identifier")?;
        match block_code {
            BLOCK_ID_IMAGE_DESCRIPTOR => self.decode_table_based_image(),
            BLOCK_ID_EXTENSION => {
                let extension_code = self.read_byte("extension identifier")?;
                if extension_code != EXTENSION_ID_PLAIN_TEXT {
                    return Err(GIFReaderError::UnknownBlock {
                        description: format!(
                            "unexpected extension 0x{:02x} after a graphic control extension",
                            extension_code
                        ),
                    });
                }

                Err(GIFReaderError::UnsupportedExtension {
                    description: "plain text extensions are not supported".to_string(),
                })
            },
            other => Err(GIFReaderError::UnknownBlock {
                description: format!("unexpected block 0x{:02x} after a graphic control extension", other),
            }),
        }
    }

    fn decode_table_based_image(&mut self) -> Result<(), GIFReaderError> {
        self.require(9, "image descriptor")?;

        let _left = LittleEndian::read_u16(self.buffer.byte_range(self.pos, 2));
        let _top = LittleEndian::read_u16(self.buffer.byte_range(self.pos + 2, 2));
        let width = LittleEndian::read_u16(self.buffer.byte_range(self.pos + 4, 2)) as usize;
        let height = LittleEndian::read_u16(self.buffer.byte_range(self.pos + 6, 2)) as usize;
        let local_table_present = self.buffer.bit_range((self.pos + 8) * 8 + 7, 1) == 1;
        let table_size_exponent = self.buffer.bit_range((self.pos + 8) * 8, 3) as u8;
        self.pos += 9;

        trace!("image size: {}x{}", width, height);
        trace!("uses local color table: {}", local_table_present);

        if local_table_present {
            let table_size = (1usize << (table_size_exponent + 1)) * 3;
            trace!("local color table size: {} bytes", table_size);
            self.push_color_table(table_size)?;
        }

        let minimum_code_size = self.read_byte("lzw minimum code size")?;
        if minimum_code_size > MAX_MINIMUM_CODE_SIZE {
            return Err(GIFReaderError::LzwProtocolViolation {
                description: format!("minimum code size {} overflows the 12-bit code space", minimum_code_size),
            });
        }

        let compressed = self.collect_sub_blocks()?;
        trace!("lzw compressed data with min code size {} and size {}", minimum_code_size, compressed.len());

        let color_table = self.color_tables.current()
            .ok_or_else(|| GIFReaderError::MalformedPalette {
                description: "image data without any active color table".to_string(),
            })?;

        // The starting code width reserves room for the clear and end sentinels.
        let mut decoder = LzwDecoder::new(minimum_code_size + 1, color_table.len(), compressed);
        let indices = decoder.decode()?;
        let image = assemble_pixels(&indices, color_table, width, height)?;

        if local_table_present {
            self.color_tables.pop();
        }

        self.image = Some(image);
        Ok(())
    }

    /// Concatenates the length-prefixed image data sub-blocks into a single
    /// contiguous compressed buffer. A zero-length sub-block terminates the run.
    fn collect_sub_blocks(&mut self) -> Result<DataBuffer, GIFReaderError> {
        let mut compressed = DataBuffer::new();

        loop {
            let size = self.read_byte("image data sub-block size")? as usize;
            if size == 0 {
                break;
            }

            self.require(size, "image data sub-block")?;
            compressed.append(self.buffer.byte_range(self.pos, size));
            self.pos += size;
        }

        Ok(compressed)
    }
}
