// ---------------------------------------------------------------------------
// Field codec: fixed-width reads and writes over a byte cursor
// ---------------------------------------------------------------------------
//
// All multi-byte integers are little-endian everywhere in both file
// families. Reads past the end of the buffer yield zero and set the overrun
// flag instead of failing, so a truncated record produces garbage values but
// can never index out of bounds; callers that care check `overrun()` after
// a read pass. Writes past the declared capacity are a caller bug: pieces
// are sized by the layout planner before any write happens.

/// Read cursor over a piece buffer.
pub struct BufferReader<'a> {
    data: &'a [u8],
    pos: usize,
    overrun: bool,
}

impl<'a> BufferReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        BufferReader {
            data,
            pos: 0,
            overrun: false,
        }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Moves the cursor to an absolute offset. Used to realign after a
    /// record whose decoded fields do not cover its full declared width.
    pub fn set_pos(&mut self, pos: usize) {
        self.pos = pos.min(self.data.len());
        if pos > self.data.len() {
            self.overrun = true;
        }
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// True once any read has gone past the end of the buffer.
    pub fn overrun(&self) -> bool {
        self.overrun
    }

    pub fn skip(&mut self, n: usize) {
        self.set_pos(self.pos + n);
    }

    fn take<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        let available = self.data.len().saturating_sub(self.pos).min(N);
        out[..available].copy_from_slice(&self.data[self.pos..self.pos + available]);
        if available < N {
            self.overrun = true;
        }
        self.pos += available;
        out
    }

    pub fn u8(&mut self) -> u8 {
        self.take::<1>()[0]
    }

    pub fn i8(&mut self) -> i8 {
        self.take::<1>()[0] as i8
    }

    pub fn u16(&mut self) -> u16 {
        u16::from_le_bytes(self.take::<2>())
    }

    pub fn i16(&mut self) -> i16 {
        i16::from_le_bytes(self.take::<2>())
    }

    pub fn u32(&mut self) -> u32 {
        u32::from_le_bytes(self.take::<4>())
    }

    pub fn i32(&mut self) -> i32 {
        i32::from_le_bytes(self.take::<4>())
    }

    pub fn bool8(&mut self) -> bool {
        self.u8() != 0
    }

    /// Reads up to `n` raw bytes; the slice is shorter than `n` only at the
    /// end of the buffer.
    pub fn raw(&mut self, n: usize) -> &'a [u8] {
        let available = self.data.len().saturating_sub(self.pos).min(n);
        if available < n {
            self.overrun = true;
        }
        let out = &self.data[self.pos..self.pos + available];
        self.pos += available;
        out
    }
}

/// Write cursor over a preallocated piece buffer.
///
/// # Panics
///
/// Panics when a write would exceed the buffer, which means the layout
/// planner and the encoder disagree about the piece size.
pub struct BufferWriter<'a> {
    data: &'a mut [u8],
    pos: usize,
}

impl<'a> BufferWriter<'a> {
    pub fn new(data: &'a mut [u8]) -> Self {
        BufferWriter { data, pos: 0 }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    fn put(&mut self, bytes: &[u8]) {
        assert!(
            self.pos + bytes.len() <= self.data.len(),
            "write of {} bytes at {} exceeds piece size {}",
            bytes.len(),
            self.pos,
            self.data.len()
        );
        self.data[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
    }

    pub fn u8(&mut self, v: u8) {
        self.put(&[v]);
    }

    pub fn i8(&mut self, v: i8) {
        self.put(&[v as u8]);
    }

    pub fn u16(&mut self, v: u16) {
        self.put(&v.to_le_bytes());
    }

    pub fn i16(&mut self, v: i16) {
        self.put(&v.to_le_bytes());
    }

    pub fn u32(&mut self, v: u32) {
        self.put(&v.to_le_bytes());
    }

    pub fn i32(&mut self, v: i32) {
        self.put(&v.to_le_bytes());
    }

    pub fn bool8(&mut self, v: bool) {
        self.u8(u8::from(v));
    }

    pub fn raw(&mut self, bytes: &[u8]) {
        self.put(bytes);
    }

    /// Advances the cursor, leaving the skipped bytes zeroed.
    pub fn skip(&mut self, n: usize) {
        assert!(
            self.pos + n <= self.data.len(),
            "skip of {n} bytes at {} exceeds piece size {}",
            self.pos,
            self.data.len()
        );
        self.pos += n;
    }

    /// Zero-pads up to an absolute offset.
    pub fn pad_to(&mut self, pos: usize) {
        assert!(pos >= self.pos, "pad_to would move the cursor backwards");
        self.skip(pos - self.pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_little_endian() {
        let data = [0x01, 0x02, 0x03, 0x04, 0xFF, 0xFF];
        let mut r = BufferReader::new(&data);
        assert_eq!(r.u32(), 0x0403_0201);
        assert_eq!(r.i16(), -1);
        assert!(r.at_end());
        assert!(!r.overrun());
    }

    #[test]
    fn test_reader_past_end_yields_zero_and_overruns() {
        let data = [0xAA];
        let mut r = BufferReader::new(&data);
        assert_eq!(r.u32(), 0x0000_00AA);
        assert!(r.overrun());
        assert_eq!(r.u8(), 0);
    }

    #[test]
    fn test_reader_raw_short_at_end() {
        let data = [1, 2, 3];
        let mut r = BufferReader::new(&data);
        r.skip(2);
        let tail = r.raw(10);
        assert_eq!(tail, &[3]);
        assert!(r.overrun());
    }

    #[test]
    fn test_reader_set_pos_realigns() {
        let data = [0u8; 16];
        let mut r = BufferReader::new(&data);
        r.u32();
        r.set_pos(12);
        assert_eq!(r.pos(), 12);
        assert_eq!(r.remaining(), 4);
    }

    #[test]
    fn test_writer_roundtrip() {
        let mut buf = [0u8; 12];
        let mut w = BufferWriter::new(&mut buf);
        w.u32(0xDEAD_BEEF);
        w.i16(-42);
        w.u8(7);
        w.pad_to(12);
        let mut r = BufferReader::new(&buf);
        assert_eq!(r.u32(), 0xDEAD_BEEF);
        assert_eq!(r.i16(), -42);
        assert_eq!(r.u8(), 7);
        assert_eq!(r.u8(), 0);
    }

    #[test]
    #[should_panic(expected = "exceeds piece size")]
    fn test_writer_past_capacity_panics() {
        let mut buf = [0u8; 2];
        let mut w = BufferWriter::new(&mut buf);
        w.u32(1);
    }
}
