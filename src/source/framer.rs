//! Line framing for chunked input.
//!
//! Serial ports and pipes hand over data in arbitrary pieces; the framer
//! accumulates them and yields complete `\n`-terminated lines. Bytes are only
//! decoded once a line is complete, so a UTF-8 sequence split across two
//! chunks comes out intact.

/// Splits a stream of chunks into lines.
#[derive(Debug, Default)]
pub struct LineFramer {
    /// Bytes received but not yet emitted as a line
    pending: Vec<u8>,
    /// Force a line break once this many unterminated bytes are pending
    max_pending: Option<usize>,
}

impl LineFramer {
    /// Framer with an unbounded accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Framer that breaks an unterminated line once it grows past `limit`
    /// bytes.
    pub fn with_max_pending(limit: usize) -> Self {
        Self {
            pending: Vec::new(),
            max_pending: Some(limit.max(1)),
        }
    }

    /// Append a chunk and iterate over the lines it completes.
    ///
    /// The iterator is lazy; lines it does not get to stay buffered and are
    /// yielded by the next call.
    pub fn feed(&mut self, chunk: &[u8]) -> FramedLines<'_> {
        self.pending.extend_from_slice(chunk);
        FramedLines {
            framer: self,
            pos: 0,
        }
    }

    pub fn feed_str(&mut self, chunk: &str) -> FramedLines<'_> {
        self.feed(chunk.as_bytes())
    }

    /// Flush the unterminated remainder at end of stream.
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.pending);
        Some(decode_line(&rest))
    }

    /// Number of buffered bytes not yet emitted.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

/// Lines completed by one [`LineFramer::feed`] call.
pub struct FramedLines<'a> {
    framer: &'a mut LineFramer,
    /// Start of the unconsumed part of `framer.pending`
    pos: usize,
}

impl FramedLines<'_> {
    /// Forced break for an oversized unterminated line.
    ///
    /// Cuts at the last complete UTF-8 character so a multi-byte sequence is
    /// never split.
    fn take_overflow(&mut self) -> Option<String> {
        let limit = self.framer.max_pending?;
        let rest = &self.framer.pending[self.pos..];
        if rest.len() <= limit {
            return None;
        }

        let cut = match std::str::from_utf8(rest) {
            Ok(_) => rest.len(),
            Err(e) if e.error_len().is_none() && e.valid_up_to() > 0 => e.valid_up_to(),
            Err(_) => rest.len(),
        };
        tracing::warn!(
            pending = rest.len(),
            limit,
            "unterminated line exceeded limit, forcing a break"
        );
        let line = String::from_utf8_lossy(&rest[..cut]).into_owned();
        self.pos += cut;
        Some(line)
    }
}

impl Iterator for FramedLines<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let rest = &self.framer.pending[self.pos..];
        match memchr::memchr(b'\n', rest) {
            Some(offset) => {
                let line = decode_line(&rest[..offset]);
                self.pos += offset + 1;
                Some(line)
            }
            None => self.take_overflow(),
        }
    }
}

impl Drop for FramedLines<'_> {
    fn drop(&mut self) {
        self.framer.pending.drain(..self.pos);
    }
}

/// Decode a complete line, dropping trailing carriage returns.
fn decode_line(bytes: &[u8]) -> String {
    let mut end = bytes.len();
    while end > 0 && bytes[end - 1] == b'\r' {
        end -= 1;
    }
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all(framer: &mut LineFramer, chunks: &[&str]) -> Vec<String> {
        let mut lines = Vec::new();
        for chunk in chunks {
            lines.extend(framer.feed_str(chunk));
        }
        lines
    }

    #[test]
    fn test_single_chunk_multiple_lines() {
        let mut framer = LineFramer::new();
        let lines: Vec<String> = framer.feed_str("a\nb\nc\n").collect();
        assert_eq!(lines, vec!["a", "b", "c"]);
        assert_eq!(framer.pending_len(), 0);
    }

    #[test]
    fn test_remainder_is_kept_across_calls() {
        let mut framer = LineFramer::new();
        let lines = feed_all(&mut framer, &["hel", "lo\nwor", "ld", "\n"]);
        assert_eq!(lines, vec!["hello", "world"]);
    }

    #[test]
    fn test_unterminated_remainder_is_not_emitted() {
        let mut framer = LineFramer::new();
        let lines = feed_all(&mut framer, &["partial"]);
        assert!(lines.is_empty());
        assert_eq!(framer.pending_len(), 7);
    }

    #[test]
    fn test_crlf_is_stripped() {
        let mut framer = LineFramer::new();
        let lines = feed_all(&mut framer, &["one\r\ntwo\r", "\n\r\n"]);
        assert_eq!(lines, vec!["one", "two", ""]);
    }

    #[test]
    fn test_lone_cr_inside_line_is_kept() {
        let mut framer = LineFramer::new();
        let lines = feed_all(&mut framer, &["a\rb\n"]);
        assert_eq!(lines, vec!["a\rb"]);
    }

    #[test]
    fn test_empty_lines() {
        let mut framer = LineFramer::new();
        let lines = feed_all(&mut framer, &["\n\nx\n"]);
        assert_eq!(lines, vec!["", "", "x"]);
    }

    #[test]
    fn test_multibyte_split_across_chunks() {
        let bytes = "température\n".as_bytes();
        // Split inside the two-byte 'é'
        let split = 5;
        assert!(!"température".is_char_boundary(split));

        let mut framer = LineFramer::new();
        let first: Vec<String> = framer.feed(&bytes[..split]).collect();
        let second: Vec<String> = framer.feed(&bytes[split..]).collect();

        assert!(first.is_empty());
        assert_eq!(second, vec!["température"]);
    }

    #[test]
    fn test_partially_consumed_iterator_keeps_lines() {
        let mut framer = LineFramer::new();
        let first = framer.feed_str("a\nb\nc").next();
        assert_eq!(first.as_deref(), Some("a"));

        let rest: Vec<String> = framer.feed_str("\n").collect();
        assert_eq!(rest, vec!["b", "c"]);
    }

    #[test]
    fn test_finish_flushes_remainder() {
        let mut framer = LineFramer::new();
        let _ = framer.feed_str("done\nlast\r").count();
        assert_eq!(framer.finish().as_deref(), Some("last"));
        assert_eq!(framer.finish(), None);
    }

    #[test]
    fn test_max_pending_forces_break() {
        let mut framer = LineFramer::with_max_pending(4);
        let lines = feed_all(&mut framer, &["abc", "defgh", "ij\n"]);
        assert_eq!(lines, vec!["abcdefgh", "ij"]);
    }

    #[test]
    fn test_max_pending_respects_char_boundary() {
        let mut framer = LineFramer::with_max_pending(2);
        let bytes = "abé".as_bytes();
        // "ab" plus the first byte of 'é'
        let lines: Vec<String> = framer.feed(&bytes[..3]).collect();
        assert_eq!(lines, vec!["ab"]);

        assert_eq!(framer.pending_len(), 1);

        let lines: Vec<String> = framer.feed(&bytes[3..]).collect();
        assert!(lines.is_empty());
        assert_eq!(framer.finish().as_deref(), Some("é"));
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut framer = LineFramer::new();
        let lines: Vec<String> = framer.feed(b"ok\xff\n").collect();
        assert_eq!(lines, vec!["ok\u{fffd}"]);
    }
}
