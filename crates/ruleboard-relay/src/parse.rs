use serde::Deserialize;
use tracing::debug;

/// One decoded line of the model's streaming reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatChunk {
    pub content: String,
    pub done: bool,
}

#[derive(Deserialize)]
struct WireLine {
    #[serde(default)]
    message: Option<WireMessage>,
    #[serde(default)]
    done: bool,
}

#[derive(Deserialize)]
struct WireMessage {
    #[serde(default)]
    content: String,
}

/// Incremental decoder for newline-delimited JSON. Network chunks do not respect line
/// boundaries, so the trailing partial line is kept until the next push.
#[derive(Debug, Default)]
pub struct ChunkDecoder {
    pending: Vec<u8>,
}

impl ChunkDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: &[u8]) -> Vec<ChatChunk> {
        self.pending.extend_from_slice(bytes);
        let Some(last_newline) = self.pending.iter().rposition(|&b| b == b'\n') else {
            return Vec::new();
        };
        let complete: Vec<u8> = self.pending.drain(..=last_newline).collect();
        complete.split(|&b| b == b'\n').filter_map(decode_line).collect()
    }

    /// Decode whatever is left once the stream has ended.
    pub fn finish(mut self) -> Option<ChatChunk> {
        let rest = std::mem::take(&mut self.pending);
        decode_line(&rest)
    }
}

fn decode_line(line: &[u8]) -> Option<ChatChunk> {
    if line.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    match serde_json::from_slice::<WireLine>(line) {
        Ok(wire) => Some(ChatChunk {
            content: wire.message.map(|m| m.content).unwrap_or_default(),
            done: wire.done,
        }),
        Err(e) => {
            debug!(error = %e, "skipping malformed stream line");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(chunks: &[ChatChunk]) -> String {
        chunks.iter().map(|c| c.content.as_str()).collect()
    }

    #[test]
    fn line_split_across_chunks_is_reassembled() {
        let mut dec = ChunkDecoder::new();
        let first = dec.push(br#"{"message":{"role":"assistant","content":"Hel"#);
        assert!(first.is_empty());
        let second = dec.push(b"lo\"},\"done\":false}\n{\"message\":{\"content\":\" world\"},\"done\":false}\n");
        assert_eq!(text(&second), "Hello world");
        assert!(dec.finish().is_none());
    }

    #[test]
    fn multibyte_characters_survive_chunk_boundaries() {
        let line = "{\"message\":{\"content\":\"taka \u{09F3}\"},\"done\":false}\n".as_bytes();
        // inside the three-byte encoding of U+09F3
        let split = line.iter().position(|&b| b == 0xE0).unwrap() + 1;
        let mut dec = ChunkDecoder::new();
        let mut out = dec.push(&line[..split]);
        out.extend(dec.push(&line[split..]));
        assert_eq!(text(&out), "taka \u{09F3}");
    }

    #[test]
    fn malformed_and_blank_lines_are_skipped() {
        let mut dec = ChunkDecoder::new();
        let out = dec.push(b"not json\n\n{\"message\":{\"content\":\"ok\"}}\n");
        assert_eq!(out, vec![ChatChunk { content: "ok".into(), done: false }]);
    }

    #[test]
    fn final_line_without_newline_is_flushed() {
        let mut dec = ChunkDecoder::new();
        assert!(dec.push(br#"{"done":true}"#).is_empty());
        assert_eq!(dec.finish(), Some(ChatChunk { content: String::new(), done: true }));
    }
}
