use crate::buffer::DataBuffer;
use crate::errors::GIFReaderError;

const MAX_CODE_SIZE: u8 = 12;
const MAX_DICTIONARY_SIZE: usize = 1 << MAX_CODE_SIZE;

/// One dictionary slot: the byte string a code expands to, or a control
/// sentinel (clear / end of information).
struct Code {
    reset: bool,
    end: bool,
    data: Vec<u8>,
}

/// Variable-width LZW decompressor for GIF image data.
///
/// The dictionary is a flat vector indexed by code value, so the "previous
/// code" tracking is a stable index instead of a reference into the table.
/// The dictionary is rebuilt from the alphabet whenever a clear code is seen
/// and never grows past the 12-bit code space.
pub struct LzwDecoder {
    first_code_size: u8,
    code_size: u8,
    alphabet_size: usize,
    read_pos: usize,
    dictionary: Vec<Code>,
    last_code: Option<usize>,
    coded_data: DataBuffer,
}

impl LzwDecoder {

    pub fn new(first_code_size: u8, alphabet_size: usize, coded_data: DataBuffer) -> Self {
        LzwDecoder {
            first_code_size,
            code_size: first_code_size,
            alphabet_size,
            read_pos: 0,
            dictionary: Vec::new(),
            last_code: None,
            coded_data,
        }
    }

    /// Decompresses the whole stream into a flat run of palette indices.
    pub fn decode(&mut self) -> Result<Vec<u8>, GIFReaderError> {
        let mut decoded = Vec::new();

        let code = self.next_code()?;
        if !self.is_reset_code(code) {
            return Err(GIFReaderError::LzwProtocolViolation {
                description: format!("first code must be a clear code, got {}", code),
            });
        }
        self.reset_dictionary(&mut decoded)?;

        loop {
            let code = self.next_code()?;

            if self.is_end_code(code) {
                break;
            } else if self.is_reset_code(code) {
                self.reset_dictionary(&mut decoded)?;
            } else if code < self.dictionary.len() {
                let data = self.dictionary[code].data.clone();
                decoded.extend_from_slice(&data);

                self.insert_code(data[0])?;
                self.last_code = Some(code);
            } else if code == self.dictionary.len() {
                // Matches the entry the encoder has just created: the previous
                // string extended by its own first byte.
                let last = self.last_code.ok_or_else(|| GIFReaderError::LzwProtocolViolation {
                    description: "no previous code for a match to a just-encoded entry".to_string(),
                })?;

                let mut data = self.dictionary[last].data.clone();
                data.push(data[0]);
                decoded.extend_from_slice(&data);

                self.insert_code(data[0])?;
                self.last_code = Some(code);
            } else {
                return Err(GIFReaderError::LzwProtocolViolation {
                    description: format!("code {} is past the next free dictionary index {}", code, self.dictionary.len()),
                });
            }
        }

        Ok(decoded)
    }

    /// Rebuilds the dictionary from the alphabet plus the two sentinels and
    /// resets the code width, then performs the mandatory read of the literal
    /// that seeds the "previous code" tracking.
    fn reset_dictionary(&mut self, decoded: &mut Vec<u8>) -> Result<(), GIFReaderError> {
        self.code_size = self.first_code_size;

        self.dictionary.clear();
        for i in 0..self.alphabet_size {
            self.dictionary.push(Code {
                reset: false,
                end: false,
                data: vec![i as u8],
            });
        }
        self.dictionary.push(Code {
            reset: true,
            end: false,
            data: Vec::new(),
        });
        self.dictionary.push(Code {
            reset: false,
            end: true,
            data: Vec::new(),
        });

        let code = self.next_code()?;
        if code >= self.alphabet_size {
            return Err(GIFReaderError::LzwProtocolViolation {
                description: format!("code {} right after a clear is not a plain alphabet entry", code),
            });
        }

        decoded.extend_from_slice(&self.dictionary[code].data);
        self.last_code = Some(code);
        Ok(())
    }

    /// Appends a new entry built from the previous code plus `append_byte`.
    /// Grows the code width once the freshly used index saturates it.
    fn insert_code(&mut self, append_byte: u8) -> Result<(), GIFReaderError> {
        if self.dictionary.len() >= MAX_DICTIONARY_SIZE {
            // 12-bit code space is full, the encoder cannot reference new
            // entries until the next clear code.
            return Ok(());
        }

        let last = self.last_code.ok_or_else(|| GIFReaderError::LzwProtocolViolation {
            description: "no previous code to extend into a new dictionary entry".to_string(),
        })?;

        let mut data = self.dictionary[last].data.clone();
        data.push(append_byte);
        self.dictionary.push(Code {
            reset: false,
            end: false,
            data,
        });

        let new_index = self.dictionary.len() - 1;
        if new_index == (1 << self.code_size) - 1 && self.code_size < MAX_CODE_SIZE {
            self.code_size += 1;
        }

        Ok(())
    }

    fn next_code(&mut self) -> Result<usize, GIFReaderError> {
        if self.read_pos + self.code_size as usize > self.coded_data.len() * 8 {
            return Err(GIFReaderError::LzwProtocolViolation {
                description: format!(
                    "reading a {}-bit code at bit {} runs past the end of the {}-byte compressed stream",
                    self.code_size, self.read_pos, self.coded_data.len()
                ),
            });
        }

        let code = self.coded_data.bit_range(self.read_pos, self.code_size as usize) as usize;
        self.read_pos += self.code_size as usize;
        Ok(code)
    }

    fn is_reset_code(&self, code: usize) -> bool {
        match self.dictionary.get(code) {
            Some(entry) => entry.reset,
            None => self.dictionary.is_empty() && code == self.alphabet_size,
        }
    }

    fn is_end_code(&self, code: usize) -> bool {
        match self.dictionary.get(code) {
            Some(entry) => entry.end,
            None => self.dictionary.is_empty() && code == self.alphabet_size + 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decoder_for(compressed: Vec<u8>) -> LzwDecoder {
        // 4-entry alphabet, minimum code size 2, effective starting width 3
        LzwDecoder::new(3, 4, DataBuffer::from_bytes(compressed))
    }

    #[test]
    fn test_decode_literal_run() {
        // clear, 0, 1, 2, 3, end
        let mut decoder = decoder_for(vec![0x44, 0x34, 0x05]);

        let decoded = decoder.decode().expect("failed to decode");
        assert_eq!(decoded, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_code_size_grows_when_index_saturates_it() {
        let mut decoder = decoder_for(vec![0x44, 0x34, 0x05]);
        decoder.decode().expect("failed to decode");

        // inserting index 7 == 2^3 - 1 bumps the width to 4 bits
        assert_eq!(decoder.code_size, 4);
    }

    #[test]
    fn test_decode_repeated_literal() {
        // clear, then ten zero literals, then end
        let mut decoder = decoder_for(vec![0x04, 0x00, 0x00, 0x00, 0x00, 0x05]);

        let decoded = decoder.decode().expect("failed to decode");
        assert_eq!(decoded, vec![0; 10]);
    }

    #[test]
    fn test_decode_match_to_just_encoded_entry() {
        // clear, 0, 6 (== next free index, expands to [0, 0]), end
        let mut decoder = decoder_for(vec![0x84, 0x0B]);

        let decoded = decoder.decode().expect("failed to decode");
        assert_eq!(decoded, vec![0, 0, 0]);
    }

    #[test]
    fn test_mid_stream_clear_resets_width_and_dictionary() {
        // clear, 0, 1, 2, 3 (width is 4 bits by now), clear, 0, end (3 bits again)
        let mut decoder = decoder_for(vec![0x44, 0x34, 0x84, 0x02]);

        let decoded = decoder.decode().expect("failed to decode");
        assert_eq!(decoded, vec![0, 1, 2, 3, 0]);
        assert_eq!(decoder.code_size, 3);
    }

    #[test]
    fn test_dictionary_size_right_after_reset() {
        // clear, 0, end: nothing is inserted beyond the bootstrap entries
        let mut decoder = decoder_for(vec![0x44, 0x01]);
        decoder.decode().expect("failed to decode");

        // alphabet + clear sentinel + end sentinel
        assert_eq!(decoder.dictionary.len(), 4 + 2);
        assert!(decoder.dictionary[4].reset);
        assert!(decoder.dictionary[5].end);
    }

    #[test]
    fn test_first_code_must_be_clear() {
        // first 3-bit code is 0, not the clear code
        let mut decoder = decoder_for(vec![0x00]);

        let result = decoder.decode();
        assert!(matches!(result, Err(GIFReaderError::LzwProtocolViolation { .. })));
    }

    #[test]
    fn test_truncated_stream_is_fatal() {
        // same as the literal run, with the bytes carrying the end code cut off
        let mut decoder = decoder_for(vec![0x44, 0x34]);

        let result = decoder.decode();
        assert!(matches!(result, Err(GIFReaderError::LzwProtocolViolation { .. })));
    }

    #[test]
    fn test_code_past_next_free_index_is_fatal() {
        // clear, 0, 7: the next free index is 6, so 7 cannot be referenced yet
        let mut decoder = decoder_for(vec![0xC4, 0x0F]);

        let result = decoder.decode();
        assert!(matches!(result, Err(GIFReaderError::LzwProtocolViolation { .. })));
    }

    #[test]
    fn test_sentinel_read_right_after_clear_is_fatal() {
        // clear immediately followed by the end sentinel, which is not a literal
        let mut decoder = decoder_for(vec![0x2C]);

        let result = decoder.decode();
        assert!(matches!(result, Err(GIFReaderError::LzwProtocolViolation { .. })));
    }
}
