//! Borrowed byte buffers with size negotiation.
//!
//! Two views cover the read-only/writable split of the protocol:
//! [`BufView`] for caller-supplied data and [`BufMut`] for return
//! destinations. Both track a `required_size` independent of what
//! actually fit, so a callee can report "I needed more room" and the
//! caller can re-request with a larger buffer instead of the transfer
//! failing. Constructors never allocate; they only compute derived
//! fields from caller-supplied spans.

/// Read-only view over a borrowed byte region.
///
/// `region` covers the payload plus any trailing accessible bytes.
/// A trailing zero byte immediately after the payload marks the view
/// as an already-terminated string, which enables zero-copy string
/// extraction.
#[derive(Clone, Copy, Debug)]
pub struct BufView<'a> {
    region: &'a [u8],
    len: usize,
    required_size: usize,
}

impl<'a> BufView<'a> {
    /// View over a string slice. No trailing accessible bytes.
    pub fn from_str(s: &'a str) -> Self {
        Self::from_bytes(s.as_bytes())
    }

    /// View over a raw byte slice. The whole slice is payload.
    pub fn from_bytes(bytes: &'a [u8]) -> Self {
        Self {
            region: bytes,
            len: bytes.len(),
            required_size: bytes.len(),
        }
    }

    /// View over a NUL-terminated byte region.
    ///
    /// The payload ends at the first zero byte, which becomes the one
    /// trailing accessible byte. A region without any zero byte is
    /// treated as plain payload with no terminator.
    pub fn from_nul_terminated(bytes: &'a [u8]) -> Self {
        match bytes.iter().position(|&b| b == 0) {
            Some(n) => Self {
                region: &bytes[..n + 1],
                len: n,
                required_size: n,
            },
            None => Self::from_bytes(bytes),
        }
    }

    /// Rebuild a view from explicit parts, clamping inconsistent
    /// lengths: `len` never exceeds the region, `required_size` never
    /// undercuts `len`.
    pub fn from_parts(region: &'a [u8], len: usize, required_size: usize) -> Self {
        let len = len.min(region.len());
        Self {
            region,
            len,
            required_size: required_size.max(len),
        }
    }

    /// Payload bytes, excluding trailing accessible bytes.
    pub fn payload(&self) -> &'a [u8] {
        &self.region[..self.len]
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bytes needed to hold the complete value, independent of what
    /// this view actually carries.
    pub fn required_size(&self) -> usize {
        self.required_size
    }

    /// Count of accessible bytes immediately after the payload.
    pub fn trailing_accessible(&self) -> usize {
        self.region.len() - self.len
    }

    /// True when a zero byte sits immediately after the payload.
    pub fn has_terminator(&self) -> bool {
        self.trailing_accessible() > 0 && self.region[self.len] == 0
    }

    /// True when the view carries the complete value (no truncation
    /// happened upstream).
    pub fn is_complete(&self) -> bool {
        self.required_size == self.len
    }
}

/// Writable destination buffer over a borrowed mutable region.
///
/// Appends clamp at capacity while `required_size` keeps counting the
/// full encoded length, so truncation is detectable and re-requestable
/// rather than an error.
#[derive(Debug)]
pub struct BufMut<'a> {
    data: &'a mut [u8],
    len: usize,
    required_size: usize,
    terminated: bool,
}

impl<'a> BufMut<'a> {
    /// Empty destination over a writable region.
    pub fn new(data: &'a mut [u8]) -> Self {
        Self {
            data,
            len: 0,
            required_size: 0,
            terminated: false,
        }
    }

    /// Writable bytes available.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Payload bytes written so far.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Full encoded size of everything appended, truncated or not.
    pub fn required_size(&self) -> usize {
        self.required_size
    }

    /// True when some appended bytes did not fit.
    pub fn truncated(&self) -> bool {
        self.required_size > self.len
    }

    /// Count of advertised accessible bytes after the payload
    /// (1 when a terminator slot has been written).
    pub fn trailing_accessible(&self) -> usize {
        usize::from(self.terminated)
    }

    /// Payload written so far.
    pub fn payload(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// Append bytes, clamping at capacity. `required_size` grows by
    /// the full input length regardless of how much fit. Any previously
    /// advertised terminator slot is invalidated.
    pub fn append(&mut self, bytes: &[u8]) {
        let room = self.capacity() - self.len;
        let n = room.min(bytes.len());
        self.data[self.len..self.len + n].copy_from_slice(&bytes[..n]);
        self.len += n;
        self.required_size += bytes.len();
        self.terminated = false;
    }

    /// Record additional required bytes that were never offered for
    /// appending (e.g. when copying from an upstream-truncated view).
    pub fn bump_required(&mut self, extra: usize) {
        self.required_size += extra;
    }

    /// Advertise a terminator slot: writes a zero byte after the
    /// payload when the complete value fit and a byte of room remains.
    /// Returns whether the slot was written.
    pub fn try_terminate(&mut self) -> bool {
        self.terminated = !self.truncated() && self.len < self.capacity();
        if self.terminated {
            self.data[self.len] = 0;
        }
        self.terminated
    }

    /// Read-only view of the current payload (plus the terminator
    /// byte, when advertised).
    pub fn as_view(&self) -> BufView<'_> {
        let end = self.len + self.trailing_accessible();
        BufView::from_parts(&self.data[..end], self.len, self.required_size)
    }

    /// Consume the destination, keeping the borrow of the underlying
    /// region alive in the returned read-only view.
    pub fn into_view(self) -> BufView<'a> {
        let end = self.len + self.trailing_accessible();
        let len = self.len;
        let required_size = self.required_size;
        let region: &'a [u8] = self.data;
        BufView::from_parts(&region[..end], len, required_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_from_str() {
        let view = BufView::from_str("hello");
        assert_eq!(view.payload(), b"hello");
        assert_eq!(view.len(), 5);
        assert_eq!(view.required_size(), 5);
        assert_eq!(view.trailing_accessible(), 0);
        assert!(!view.has_terminator());
        assert!(view.is_complete());
    }

    #[test]
    fn view_from_nul_terminated() {
        let view = BufView::from_nul_terminated(b"hello\0");
        assert_eq!(view.payload(), b"hello");
        assert_eq!(view.len(), 5);
        assert_eq!(view.trailing_accessible(), 1);
        assert!(view.has_terminator());
    }

    #[test]
    fn view_from_nul_terminated_stops_at_first_nul() {
        let view = BufView::from_nul_terminated(b"ab\0cd\0");
        assert_eq!(view.payload(), b"ab");
        assert_eq!(view.trailing_accessible(), 1);
    }

    #[test]
    fn view_without_nul_is_plain_payload() {
        let view = BufView::from_nul_terminated(b"abc");
        assert_eq!(view.payload(), b"abc");
        assert_eq!(view.trailing_accessible(), 0);
        assert!(!view.has_terminator());
    }

    #[test]
    fn from_parts_clamps() {
        let view = BufView::from_parts(b"abcd", 10, 2);
        assert_eq!(view.len(), 4);
        assert_eq!(view.required_size(), 4);
    }

    #[test]
    fn append_within_capacity() {
        let mut scratch = [0u8; 8];
        let mut out = BufMut::new(&mut scratch);
        out.append(b"hi");
        assert_eq!(out.payload(), b"hi");
        assert_eq!(out.required_size(), 2);
        assert!(!out.truncated());
    }

    #[test]
    fn append_clamps_and_reports_required() {
        let mut scratch = [0u8; 4];
        let mut out = BufMut::new(&mut scratch);
        out.append(b"0123456789");
        assert_eq!(out.len(), 4);
        assert_eq!(out.required_size(), 10);
        assert!(out.truncated());
        assert_eq!(out.trailing_accessible(), 0);
    }

    #[test]
    fn terminator_written_when_room_remains() {
        let mut scratch = [0u8; 6];
        let mut out = BufMut::new(&mut scratch);
        out.append(b"abc");
        assert!(out.try_terminate());
        assert_eq!(out.trailing_accessible(), 1);
        assert_eq!(scratch[3], 0);
    }

    #[test]
    fn terminator_refused_on_exact_fit() {
        let mut scratch = [0u8; 3];
        let mut out = BufMut::new(&mut scratch);
        out.append(b"abc");
        assert!(!out.try_terminate());
        assert_eq!(out.trailing_accessible(), 0);
    }

    #[test]
    fn terminator_refused_after_truncation() {
        let mut scratch = [0u8; 2];
        let mut out = BufMut::new(&mut scratch);
        out.append(b"abc");
        assert!(!out.try_terminate());
    }

    #[test]
    fn zero_capacity_accumulates_required_size() {
        let mut out = BufMut::new(&mut []);
        out.append(b"abcdef");
        assert_eq!(out.len(), 0);
        assert_eq!(out.required_size(), 6);
    }

    #[test]
    fn into_view_keeps_terminator() {
        let mut scratch = [0u8; 8];
        let mut out = BufMut::new(&mut scratch);
        out.append(b"ok");
        out.try_terminate();
        let view = out.into_view();
        assert_eq!(view.payload(), b"ok");
        assert!(view.has_terminator());
    }

    #[test]
    fn bump_required_marks_truncation() {
        let mut scratch = [0u8; 8];
        let mut out = BufMut::new(&mut scratch);
        out.append(b"part");
        out.bump_required(4);
        assert_eq!(out.len(), 4);
        assert_eq!(out.required_size(), 8);
        assert!(out.truncated());
    }
}
