//! Append-only bit packing into a byte buffer.

/// Accumulates unsigned fields of arbitrary width (0..=32 bits) into a
/// little-endian byte buffer. At most 7 bits are ever pending; whole
/// bytes are emitted as soon as they complete.
#[derive(Default)]
pub struct BitWriter {
    buffer: Vec<u8>,
    pending_bits: u64,
    num_pending_bits: u32,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the low `num_bits` of `bits`. `bits` must fit in `num_bits`.
    pub fn append(&mut self, bits: u32, num_bits: u32) {
        debug_assert!(self.num_pending_bits < 8);
        debug_assert!(num_bits <= 32);
        debug_assert!((bits as u64) < (1u64 << num_bits));

        self.pending_bits |= (bits as u64) << self.num_pending_bits;
        self.num_pending_bits += num_bits;

        while self.num_pending_bits >= 8 {
            self.buffer.push(self.pending_bits as u8);
            self.pending_bits >>= 8;
            self.num_pending_bits -= 8;
        }
    }

    /// Append zero bits until the buffer length is a multiple of `alignment` bytes.
    pub fn flush(&mut self, alignment: usize) {
        debug_assert!(self.num_pending_bits < 8);

        if self.num_pending_bits > 0 {
            self.buffer.push(self.pending_bits as u8);
            self.pending_bits = 0;
            self.num_pending_bits = 0;
        }

        while self.buffer.len() % alignment != 0 {
            self.buffer.push(0);
        }
    }

    /// The accumulated bytes. Only valid after a flush.
    pub fn as_bytes(&self) -> &[u8] {
        debug_assert!(self.num_pending_bits == 0);
        &self.buffer
    }

    /// The accumulated bytes as little-endian words. Only valid after a 4-byte flush.
    pub fn words(&self) -> Vec<u32> {
        debug_assert!(self.num_pending_bits == 0);
        debug_assert!(self.buffer.len() % 4 == 0);
        self.buffer
            .chunks_exact(4)
            .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_come_out_in_append_order() {
        let mut writer = BitWriter::new();
        writer.append(0xAB, 8);
        writer.append(0xCD, 8);
        writer.flush(1);
        assert_eq!(writer.as_bytes(), &[0xAB, 0xCD]);
    }

    #[test]
    fn sub_byte_fields_pack_low_bits_first() {
        let mut writer = BitWriter::new();
        writer.append(0b101, 3);
        writer.append(0b11, 2);
        writer.flush(1);
        // 3-bit field in bits [2:0], 2-bit field in bits [4:3]
        assert_eq!(writer.as_bytes(), &[0b11101]);
    }

    #[test]
    fn straddles_byte_boundaries() {
        let mut writer = BitWriter::new();
        writer.append(0x3FF, 10);
        writer.append(0, 6);
        writer.flush(1);
        assert_eq!(writer.as_bytes(), &[0xFF, 0x03]);
    }

    #[test]
    fn full_width_append() {
        let mut writer = BitWriter::new();
        writer.append(0xDEAD_BEEF, 32);
        writer.flush(4);
        assert_eq!(writer.words(), vec![0xDEAD_BEEF]);
    }

    #[test]
    fn zero_width_append_is_a_no_op() {
        let mut writer = BitWriter::new();
        writer.append(0, 0);
        writer.append(1, 1);
        writer.flush(1);
        assert_eq!(writer.as_bytes(), &[1]);
    }

    #[test]
    fn flush_pads_to_word_alignment() {
        let mut writer = BitWriter::new();
        writer.append(0x7, 3);
        writer.flush(4);
        assert_eq!(writer.as_bytes(), &[0x7, 0, 0, 0]);
        assert_eq!(writer.words(), vec![0x7]);
    }

    #[test]
    fn material_batch_shape() {
        // The 13-batch descriptor of a full 128-triangle cluster:
        // three 4-bit counts then thirteen 5-bit (count - 1) fields.
        let mut writer = BitWriter::new();
        writer.append(13, 4);
        writer.append(0, 4);
        writer.append(0, 4);
        for batch in 0..13 {
            let triangles = if batch == 12 { 8 } else { 10 };
            writer.append(triangles - 1, 5);
        }
        writer.flush(4);
        assert_eq!(writer.as_bytes().len(), 12);
    }
}
