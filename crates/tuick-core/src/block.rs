//! The Block Record: one parsed unit of checker output, plus its wire
//! serialisation to the fuzzy-finder and the `select` callback.

use crate::error::{Result, TuickError};
use serde::{Deserialize, Serialize};

/// Field separator used between a block's six fields on the wire.
pub const FIELD_SEP: u8 = 0x1F;
/// Record terminator on the wire.
pub const RECORD_END: u8 = 0x00;

/// A diagnostic unit: location plus the original (possibly ANSI-coloured)
/// text. Informational blocks (summaries, anchor-less notes) carry no
/// location and only `content`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub file: String,
    pub line: Option<u32>,
    pub col: Option<u32>,
    pub end_line: Option<u32>,
    pub end_col: Option<u32>,
    pub content: String,
}

impl Block {
    /// An informational block: no location, just content.
    pub fn informational(content: impl Into<String>) -> Self {
        Block {
            file: String::new(),
            line: None,
            col: None,
            end_line: None,
            end_col: None,
            content: content.into(),
        }
    }

    /// Whether this block carries a location anchor.
    pub fn has_location(&self) -> bool {
        self.line.is_some() || self.col.is_some() || self.end_line.is_some() || self.end_col.is_some()
    }

    /// Encode to the six-field, `0x1F`-separated, `0x00`-terminated wire
    /// record. Fails with [`TuickError::BlockEncoding`] if `content`
    /// contains a reserved delimiter byte; callers that want the
    /// strip-and-continue default should use [`Block::sanitized`] first.
    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.content.as_bytes().contains(&FIELD_SEP) || self.content.as_bytes().contains(&RECORD_END) {
            return Err(TuickError::BlockEncoding);
        }
        let mut out = Vec::with_capacity(self.content.len() + 32);
        out.extend_from_slice(self.file.as_bytes());
        out.push(FIELD_SEP);
        push_opt(&mut out, self.line);
        out.push(FIELD_SEP);
        push_opt(&mut out, self.col);
        out.push(FIELD_SEP);
        push_opt(&mut out, self.end_line);
        out.push(FIELD_SEP);
        push_opt(&mut out, self.end_col);
        out.push(FIELD_SEP);
        out.extend_from_slice(self.content.as_bytes());
        out.push(RECORD_END);
        Ok(out)
    }

    /// Return a copy with delimiter bytes stripped from `content` so that
    /// encoding can never fail. This is the default "strip and continue"
    /// behaviour for [`TuickError::BlockEncoding`].
    pub fn sanitized(&self) -> Block {
        let mut b = self.clone();
        if b.content.as_bytes().contains(&FIELD_SEP) || b.content.as_bytes().contains(&RECORD_END) {
            b.content = b
                .content
                .bytes()
                .filter(|&b| b != FIELD_SEP && b != RECORD_END)
                .map(|b| b as char)
                .collect();
        }
        b
    }

    /// Decode the location fields used by the `select` callback: the
    /// first five `\x1f`-separated tokens. Trailing content is ignored.
    pub fn decode_location(bytes: &[u8]) -> LocationFields {
        let mut fields = bytes.splitn(6, |&b| b == FIELD_SEP);
        let file = fields.next().unwrap_or(b"");
        let line = fields.next().unwrap_or(b"");
        let col = fields.next().unwrap_or(b"");
        let end_line = fields.next().unwrap_or(b"");
        let end_col = fields.next().unwrap_or(b"");
        LocationFields {
            file: String::from_utf8_lossy(file).into_owned(),
            line: parse_opt(line),
            col: parse_opt(col),
            end_line: parse_opt(end_line),
            end_col: parse_opt(end_col),
        }
    }
}

/// The five location fields decoded out of a serialised block, used by
/// the `--select` callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationFields {
    pub file: String,
    pub line: Option<u32>,
    pub col: Option<u32>,
    pub end_line: Option<u32>,
    pub end_col: Option<u32>,
}

fn push_opt(out: &mut Vec<u8>, v: Option<u32>) {
    if let Some(v) = v {
        out.extend_from_slice(v.to_string().as_bytes());
    }
}

fn parse_opt(field: &[u8]) -> Option<u32> {
    if field.is_empty() {
        return None;
    }
    std::str::from_utf8(field).ok()?.parse().ok()
}

/// A monotonically increasing identifier for one checker run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GenerationId(u64);

impl GenerationId {
    pub const FIRST: GenerationId = GenerationId(1);

    pub fn next(self) -> GenerationId {
        GenerationId(self.0 + 1)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for GenerationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_of_block_fields() {
        let block = Block {
            file: "a.py".into(),
            line: Some(3),
            col: Some(5),
            end_line: None,
            end_col: None,
            content: "a.py:3:5: oops".into(),
        };
        let encoded = block.encode().expect("encode");
        assert!(encoded.ends_with(&[RECORD_END]));
        let body = &encoded[..encoded.len() - 1];
        let decoded = Block::decode_location(body);
        assert_eq!(decoded.file, block.file);
        assert_eq!(decoded.line, block.line);
        assert_eq!(decoded.col, block.col);
        assert_eq!(decoded.end_line, block.end_line);
        assert_eq!(decoded.end_col, block.end_col);
    }

    #[test]
    fn informational_block_has_empty_location() {
        let block = Block::informational("Summary: 3 errors");
        assert!(!block.has_location());
        assert_eq!(block.file, "");
    }

    #[test]
    fn encode_rejects_reserved_bytes() {
        let block = Block::informational("bad\x1fcontent");
        assert!(matches!(block.encode(), Err(TuickError::BlockEncoding)));
        let sanitized = block.sanitized();
        assert!(sanitized.encode().is_ok());
    }

    #[test]
    fn absent_numeric_fields_serialise_empty() {
        let block = Block {
            file: "b.py".into(),
            line: Some(1),
            col: Some(1),
            end_line: None,
            end_col: None,
            content: "b.py:1:1: error: bad\n    note: see here".into(),
        };
        let encoded = block.encode().unwrap();
        let text = String::from_utf8_lossy(&encoded);
        // Five leading fields then content; end_line/end_col are empty.
        assert!(text.starts_with("b.py\x1f1\x1f1\x1f\x1f\x1f"));
    }

    #[test]
    fn generation_ids_increase_monotonically() {
        let g1 = GenerationId::FIRST;
        let g2 = g1.next();
        assert!(g2 > g1);
        assert_eq!(g1.get(), 1);
        assert_eq!(g2.get(), 2);
    }
}
