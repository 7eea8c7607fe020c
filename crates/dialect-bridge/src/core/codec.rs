//! Byte and text codec helpers shared by decoders and the quoting engine.

use std::io;

use bytes::BytesMut;
use encoding_rs::Encoding;
use tracing::warn;

use super::cursor::{CharStream, DriverStream};
use crate::error::DriverFault;

/// Read buffer size used when draining driver streams.
pub const STREAM_BUFFER_SIZE: usize = 4096;

/// Combine the outcome of a read with the outcome of closing its source.
///
/// A read fault wins over a close fault; the close fault is only logged.
fn finish_scoped<T>(read: io::Result<T>, close: io::Result<()>) -> io::Result<T> {
    match (read, close) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(close_err)) => Err(close_err),
        (Err(read_err), Ok(())) => Err(read_err),
        (Err(read_err), Err(close_err)) => {
            warn!("Suppressed stream close failure after read failure: {}", close_err);
            Err(read_err)
        }
    }
}

/// Drain a binary stream into memory, then close it.
///
/// Reads in [`STREAM_BUFFER_SIZE`] chunks. The stream is closed exactly once on
/// both the success and the failure path.
pub fn drain_bytes(stream: &mut dyn DriverStream) -> Result<BytesMut, DriverFault> {
    let read = (|| {
        let mut out = BytesMut::with_capacity(STREAM_BUFFER_SIZE);
        let mut buf = [0u8; STREAM_BUFFER_SIZE];
        loop {
            match stream.read(&mut buf) {
                Ok(0) => return Ok(out),
                Ok(n) => out.extend_from_slice(&buf[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    })();
    let close = stream.close();
    finish_scoped(read, close).map_err(DriverFault::from)
}

/// Drain a character stream into a string, then close it.
pub fn drain_chars(stream: &mut dyn CharStream) -> Result<String, DriverFault> {
    let read = (|| {
        let mut out = String::with_capacity(STREAM_BUFFER_SIZE);
        let mut buf = ['\0'; STREAM_BUFFER_SIZE];
        loop {
            match stream.read_chars(&mut buf) {
                Ok(0) => return Ok(out),
                Ok(n) => out.extend(&buf[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    })();
    let close = stream.close();
    finish_scoped(read, close).map_err(DriverFault::from)
}

/// Uppercase hex of every byte, two digits per byte.
pub fn hex_upper(bytes: &[u8]) -> String {
    hex::encode_upper(bytes)
}

/// Split bytes into uppercase-hex chunks of at most `max_chunk_bytes` bytes each.
///
/// `None` (or a zero limit) yields a single chunk. An empty input yields one
/// empty chunk so callers always emit a complete literal.
pub fn hex_chunks(bytes: &[u8], max_chunk_bytes: Option<usize>) -> Vec<String> {
    match max_chunk_bytes {
        Some(limit) if limit > 0 && bytes.len() > limit => {
            bytes.chunks(limit).map(hex::encode_upper).collect()
        }
        _ => vec![hex::encode_upper(bytes)],
    }
}

/// Resolve a WHATWG encoding label such as "UTF-8" or "windows-1252".
pub fn lookup_encoding(label: &str) -> Option<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
}

/// Decode raw bytes with a fixed encoding. Malformed input is a fault, not
/// a silent replacement.
pub fn decode_with_encoding(bytes: &[u8], encoding: &'static Encoding) -> Result<String, DriverFault> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
        .ok_or_else(|| {
            DriverFault::new(format!(
                "{} bytes are not valid {}",
                bytes.len(),
                encoding.name()
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    struct FlakyStream {
        data: Vec<u8>,
        pos: usize,
        fail_at: Option<usize>,
        close_fails: bool,
        closes: usize,
    }

    impl Read for FlakyStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if let Some(at) = self.fail_at {
                if self.pos >= at {
                    return Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer"));
                }
            }
            let n = buf.len().min(self.data.len() - self.pos).min(1000);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    impl DriverStream for FlakyStream {
        fn close(&mut self) -> io::Result<()> {
            self.closes += 1;
            if self.close_fails {
                Err(io::Error::new(io::ErrorKind::Other, "close failed"))
            } else {
                Ok(())
            }
        }
    }

    fn stream(len: usize) -> FlakyStream {
        FlakyStream {
            data: (0..len).map(|i| (i % 251) as u8).collect(),
            pos: 0,
            fail_at: None,
            close_fails: false,
            closes: 0,
        }
    }

    // =========================================================================
    // Stream draining
    // =========================================================================

    #[test]
    fn test_drain_bytes_exact_length() {
        let mut s = stream(10_000);
        let out = drain_bytes(&mut s).unwrap();
        assert_eq!(out.len(), 10_000);
        assert_eq!(&out[..], &s.data[..]);
        assert_eq!(s.closes, 1);
    }

    #[test]
    fn test_drain_bytes_empty() {
        let mut s = stream(0);
        assert!(drain_bytes(&mut s).unwrap().is_empty());
        assert_eq!(s.closes, 1);
    }

    #[test]
    fn test_drain_bytes_read_fault_still_closes() {
        let mut s = stream(5000);
        s.fail_at = Some(2000);
        let err = drain_bytes(&mut s).unwrap_err();
        assert!(err.message.contains("reset by peer"));
        assert_eq!(s.closes, 1);
    }

    #[test]
    fn test_read_fault_not_masked_by_close_fault() {
        let mut s = stream(5000);
        s.fail_at = Some(1000);
        s.close_fails = true;
        let err = drain_bytes(&mut s).unwrap_err();
        assert!(err.message.contains("reset by peer"));
        assert_eq!(s.closes, 1);
    }

    #[test]
    fn test_close_fault_reported_after_clean_read() {
        let mut s = stream(10);
        s.close_fails = true;
        let err = drain_bytes(&mut s).unwrap_err();
        assert!(err.message.contains("close failed"));
    }

    struct FlakyChars {
        chars: Vec<char>,
        pos: usize,
        fail_at: Option<usize>,
        close_fails: bool,
        closes: usize,
    }

    impl CharStream for FlakyChars {
        fn read_chars(&mut self, buf: &mut [char]) -> io::Result<usize> {
            if let Some(at) = self.fail_at {
                if self.pos >= at {
                    return Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer"));
                }
            }
            let n = buf.len().min(self.chars.len() - self.pos).min(1000);
            buf[..n].copy_from_slice(&self.chars[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }

        fn close(&mut self) -> io::Result<()> {
            self.closes += 1;
            if self.close_fails {
                Err(io::Error::new(io::ErrorKind::Other, "close failed"))
            } else {
                Ok(())
            }
        }
    }

    fn chars(len: usize) -> FlakyChars {
        FlakyChars {
            chars: (0..len).map(|i| if i % 2 == 0 { 'é' } else { 'a' }).collect(),
            pos: 0,
            fail_at: None,
            close_fails: false,
            closes: 0,
        }
    }

    #[test]
    fn test_drain_chars_exact_length() {
        let mut s = chars(9_000);
        let out = drain_chars(&mut s).unwrap();
        assert_eq!(out.chars().count(), 9_000);
        assert!(out.starts_with("éaé"));
        assert_eq!(s.closes, 1);
    }

    #[test]
    fn test_drain_chars_read_fault_still_closes() {
        let mut s = chars(5000);
        s.fail_at = Some(2000);
        let err = drain_chars(&mut s).unwrap_err();
        assert!(err.message.contains("reset by peer"));
        assert_eq!(s.closes, 1);
    }

    #[test]
    fn test_drain_chars_close_fault_after_clean_read() {
        let mut s = chars(10);
        s.close_fails = true;
        let err = drain_chars(&mut s).unwrap_err();
        assert!(err.message.contains("close failed"));
        assert_eq!(s.closes, 1);
    }

    #[test]
    fn test_drain_chars_read_fault_not_masked_by_close_fault() {
        let mut s = chars(5000);
        s.fail_at = Some(1000);
        s.close_fails = true;
        let err = drain_chars(&mut s).unwrap_err();
        assert!(err.message.contains("reset by peer"));
        assert_eq!(s.closes, 1);
    }

    // =========================================================================
    // Hex
    // =========================================================================

    #[test]
    fn test_hex_upper() {
        assert_eq!(hex_upper(&[0x00, 0xab, 0xff]), "00ABFF");
    }

    #[test]
    fn test_hex_chunks_split() {
        let chunks = hex_chunks(&[1, 2, 3, 4, 5], Some(2));
        assert_eq!(chunks, vec!["0102", "0304", "05"]);
    }

    #[test]
    fn test_hex_chunks_unbounded_and_empty() {
        assert_eq!(hex_chunks(&[1, 2, 3], None), vec!["010203"]);
        assert_eq!(hex_chunks(&[], Some(4)), vec![""]);
        assert_eq!(hex_chunks(&[1, 2], Some(2)), vec!["0102"]);
    }

    // =========================================================================
    // Encodings
    // =========================================================================

    #[test]
    fn test_decode_with_encoding_latin1() {
        let enc = lookup_encoding("windows-1252").unwrap();
        assert_eq!(decode_with_encoding(&[0x63, 0x61, 0x66, 0xe9], enc).unwrap(), "café");
    }

    #[test]
    fn test_decode_with_encoding_rejects_malformed_utf8() {
        let enc = lookup_encoding("UTF-8").unwrap();
        assert!(decode_with_encoding(&[0xff, 0xfe, 0x41], enc).is_err());
    }

    #[test]
    fn test_lookup_encoding_unknown() {
        assert!(lookup_encoding("no-such-charset").is_none());
    }
}
