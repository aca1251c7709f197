/// A byte range requested through the `Range` header.
///
/// Ends are exclusive everywhere in this crate: `bytes=0-0` is
/// `FromTo { start: 0, end: 1 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteRange {
    /// `bytes=A-B`, stored as `[A, B + 1)`
    FromTo { start: u64, end: u64 },
    /// `bytes=A-`, from `A` to the end of the file
    From { start: u64 },
    /// `bytes=-N`, the last `N` bytes of the file
    Suffix { len: u64 },
}

impl ByteRange {
    /// Resolves the range against a file of `total` bytes.
    ///
    /// Returns the exclusive span clamped to the file, or `None` when no byte
    /// of the file falls inside the range.
    pub fn resolve(&self, total: u64) -> Option<(u64, u64)> {
        let (start, end) = match *self {
            ByteRange::FromTo { start, end } => (start, end.min(total)),
            ByteRange::From { start } => (start, total),
            ByteRange::Suffix { len } => (total.saturating_sub(len), total),
        };

        if start >= end {
            return None;
        }
        Some((start, end))
    }
}

/// A parsed request, ready to be served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Request method as sent by the client
    pub method: String,
    /// Raw request target, kept for logging
    pub uri: String,
    /// Decoded path relative to the document root; `.` is the root itself
    pub path: String,
    /// Requested byte range, if any
    pub range: Option<ByteRange>,
}

impl HttpRequest {
    /// Effective span for a file of `total` bytes.
    ///
    /// Without a range this is the whole file.
    pub fn span(&self, total: u64) -> Option<(u64, u64)> {
        match self.range {
            Some(range) => range.resolve(total),
            None => Some((0, total)),
        }
    }
}
