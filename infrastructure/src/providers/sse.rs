//! Incremental decoder for `text/event-stream` bodies.
//!
//! Provider streaming endpoints send events as blocks of
//! `event:`/`data:` lines separated by blank lines. reqwest hands us
//! arbitrary byte chunks, so the decoder buffers until it has whole
//! lines and yields the `data:` payloads in order.

/// Buffering decoder turning byte chunks into SSE `data:` payloads
#[derive(Debug, Default)]
pub struct SseLineDecoder {
    buffer: Vec<u8>,
}

impl SseLineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk of bytes; returns the complete data payloads it unlocked.
    ///
    /// The buffer stays raw bytes and only complete lines are decoded:
    /// a chunk boundary can split a multi-byte UTF-8 code point, and
    /// decoding per chunk would mangle it.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut payloads = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end_matches(['\n', '\r']);

            if let Some(data) = line.strip_prefix("data:") {
                payloads.push(data.trim_start().to_string());
            }
            // `event:`, `id:`, comments and blank separator lines are
            // irrelevant here: both providers we stream from put the
            // whole event into the data field.
        }
        payloads
    }
}

/// Sentinel the OpenAI streaming API sends as its final payload
pub const DONE_SENTINEL: &str = "[DONE]";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_event() {
        let mut decoder = SseLineDecoder::new();
        let payloads = decoder.feed(b"data: {\"x\":1}\n\n");
        assert_eq!(payloads, vec!["{\"x\":1}"]);
    }

    #[test]
    fn test_event_split_across_chunks() {
        let mut decoder = SseLineDecoder::new();
        assert!(decoder.feed(b"data: {\"x\"").is_empty());
        let payloads = decoder.feed(b":1}\ndata: [DONE]\n");
        assert_eq!(payloads, vec!["{\"x\":1}", "[DONE]"]);
    }

    #[test]
    fn test_multibyte_char_split_across_chunks() {
        // "café" with the é ("\xc3\xa9") split between two chunks.
        let mut decoder = SseLineDecoder::new();
        assert!(decoder.feed(b"data: caf\xc3").is_empty());
        let payloads = decoder.feed(b"\xa9\n");
        assert_eq!(payloads, vec!["caf\u{e9}"]);
    }

    #[test]
    fn test_crlf_and_named_events() {
        let mut decoder = SseLineDecoder::new();
        let payloads = decoder.feed(b"event: message_delta\r\ndata: {\"y\":2}\r\n\r\n");
        assert_eq!(payloads, vec!["{\"y\":2}"]);
    }

    #[test]
    fn test_non_data_lines_ignored() {
        let mut decoder = SseLineDecoder::new();
        let payloads = decoder.feed(b": keep-alive\nid: 7\n\ndata: x\n");
        assert_eq!(payloads, vec!["x"]);
    }
}
