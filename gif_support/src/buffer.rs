/// Owned byte buffer with byte-range and arbitrary-bit-offset reads.
///
/// Reads are clamped instead of failing: a range starting at or past the end
/// yields an empty slice or a zero value. Callers that need an exact amount
/// check `len` before reading.
pub struct DataBuffer {
    data: Vec<u8>,
}

impl DataBuffer {

    pub fn new() -> Self {
        DataBuffer {
            data: Vec::new(),
        }
    }

    pub fn from_bytes(data: Vec<u8>) -> Self {
        DataBuffer {
            data,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Returns up to `count` bytes starting at `offset`, clamped to the end
    /// of the buffer.
    pub fn byte_range(&self, offset: usize, count: usize) -> &[u8] {
        if offset >= self.data.len() {
            return &[];
        }

        let end = offset.saturating_add(count).min(self.data.len());
        &self.data[offset..end]
    }

    /// Reads up to 64 bits starting at an arbitrary bit position, least
    /// significant bit first, spanning byte boundaries as needed. Bit counts
    /// above 64 are clamped; bits past the end of the buffer read as zero.
    pub fn bit_range(&self, bit_offset: usize, bit_count: usize) -> u64 {
        let bit_count = bit_count.min(64);

        let mut result = 0;
        let mut produced = 0;
        let mut byte_index = bit_offset / 8;
        let mut low_bit = bit_offset % 8;

        while produced < bit_count && byte_index < self.data.len() {
            let take = (8 - low_bit).min(bit_count - produced);
            let bits = (self.data[byte_index] >> low_bit) & bit_mask(take);

            result |= (bits as u64) << produced;
            produced += take;
            byte_index += 1;
            low_bit = 0;
        }

        result
    }

    pub fn append(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }
}

// Keeps exactly the low `bit_count` bits of a shifted byte.
fn bit_mask(bit_count: usize) -> u8 {
    if bit_count >= 8 {
        0xFF
    } else {
        (1 << bit_count) - 1
    }
}
