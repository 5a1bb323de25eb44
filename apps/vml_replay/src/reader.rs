//! Replay feed reader: one VML message per input line.
//!
//! Captured sessions are stored line-delimited: each line is one message as
//! it came off the wire, with trailing `\r` tolerated for feeds captured on
//! CRLF transports. A feed that ends without a final newline still yields
//! its tail as the last message; an over-long line is a corrupt capture and
//! surfaces as an error rather than being limped through.

use bytes::{Bytes, BytesMut};
use memchr::memchr;
use tokio::io::{AsyncRead, AsyncReadExt};

const MAX_MESSAGE_LEN: usize = 64 * 1024;

#[derive(Debug)]
pub struct FeedReader<R> {
    inner: R,
    buf: BytesMut,
    max_message_len: usize,
}

impl<R> FeedReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(8 * 1024),
            max_message_len: MAX_MESSAGE_LEN,
        }
    }
}

impl<R: AsyncRead + Unpin> FeedReader<R> {
    /// Read one message, stripping the trailing `\n` and optional `\r`.
    ///
    /// Returns `Ok(Some(bytes))` for a message (may be empty) and `Ok(None)`
    /// on clean EOF with no buffered data.
    pub async fn next_message(&mut self) -> std::io::Result<Option<Bytes>> {
        loop {
            if let Some(i) = memchr(b'\n', &self.buf) {
                let raw = self.buf.split_to(i + 1).freeze();
                return Ok(Some(trim_crlf(raw)));
            }

            if self.buf.len() > self.max_message_len {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "replay message too long",
                ));
            }

            let n = self.inner.read_buf(&mut self.buf).await?;
            if n == 0 {
                if self.buf.is_empty() {
                    return Ok(None);
                }
                let len = self.buf.len();
                let raw = self.buf.split_to(len).freeze();
                return Ok(Some(trim_crlf(raw)));
            }
        }
    }
}

fn trim_crlf(mut b: Bytes) -> Bytes {
    let mut end = b.len();
    if end > 0 && b[end - 1] == b'\n' {
        end -= 1;
    }
    if end > 0 && b[end - 1] == b'\r' {
        end -= 1;
    }
    b.truncate(end);
    b
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn reads_crlf_and_lf_messages() {
        let (a, b) = tokio::io::duplex(64);
        tokio::spawn(async move {
            let mut b = b;
            b.write_all(b"{npc}Orc{/npc}\r\nplain\n").await.unwrap();
        });

        let mut fr = FeedReader::new(a);
        let m1 = fr.next_message().await.unwrap().unwrap();
        let m2 = fr.next_message().await.unwrap().unwrap();
        assert_eq!(&m1[..], b"{npc}Orc{/npc}");
        assert_eq!(&m2[..], b"plain");
        assert!(fr.next_message().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn eof_without_newline_yields_the_tail() {
        let (a, b) = tokio::io::duplex(64);
        tokio::spawn(async move {
            let mut b = b;
            b.write_all(b"tail with no newline").await.unwrap();
        });

        let mut fr = FeedReader::new(a);
        let m = fr.next_message().await.unwrap().unwrap();
        assert_eq!(&m[..], b"tail with no newline");
        assert!(fr.next_message().await.unwrap().is_none());
    }
}
