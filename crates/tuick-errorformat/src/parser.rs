//! The streaming adapter itself: turns a line stream into Block Records,
//! one completed block at a time, honouring the back-pressure and
//! never-drop requirements of the errorformat adapter.

use crate::ansi::strip_ansi_codes;
use crate::pattern::CompiledPattern;
use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tuick_core::Block;

/// Accumulates lines into Block Records according to the anchor/
/// continuation grouping rules. Pure and synchronous so it can be unit
/// tested without any I/O.
#[derive(Default)]
pub struct BlockAssembler {
    open: Option<Block>,
}

impl BlockAssembler {
    pub fn new() -> Self {
        Self { open: None }
    }

    /// Feed one raw line (as it came from the checker, ANSI intact).
    /// Returns a block if feeding this line closed a previously open one.
    pub fn feed_line(&mut self, pattern: Option<&CompiledPattern>, raw: &str) -> Option<Block> {
        let stripped = strip_ansi_codes(raw);

        if stripped.trim().is_empty() {
            return self.open.take();
        }

        if let Some(pattern) = pattern {
            if let Some(anchor) = pattern.match_anchor(&stripped) {
                let completed = self.open.take();
                self.open = Some(Block {
                    file: anchor.file,
                    line: anchor.line,
                    col: anchor.col,
                    end_line: None,
                    end_col: None,
                    content: raw.to_string(),
                });
                return completed;
            }
        }

        match self.open.as_mut() {
            Some(block) => {
                block.content.push('\n');
                block.content.push_str(raw);
                None
            }
            None => {
                self.open = Some(Block::informational(raw.to_string()));
                None
            }
        }
    }

    /// Flush whatever block is still open at EOF.
    pub fn finish(&mut self) -> Option<Block> {
        self.open.take()
    }
}

/// Reads a byte stream line-by-line and emits completed Block Records,
/// one at a time, without buffering the full output. Back-pressure
/// propagates naturally: the caller only gets the next `.next_block()`
/// future resolved once enough input has been read to complete a block.
pub struct LineParser<R> {
    lines: Lines<BufReader<R>>,
    assembler: BlockAssembler,
    pattern: Option<CompiledPattern>,
    done: bool,
}

impl<R: AsyncBufRead + Unpin> LineParser<R> {
    pub fn new(reader: R, pattern: Option<CompiledPattern>) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
            assembler: BlockAssembler::new(),
            pattern,
            done: false,
        }
    }

    /// Produce the next completed block, or `None` once the stream and
    /// any trailing open block are fully drained.
    pub async fn next_block(&mut self) -> io::Result<Option<Block>> {
        if self.done {
            return Ok(None);
        }
        loop {
            match self.lines.next_line().await? {
                Some(raw) => {
                    if let Some(block) = self.assembler.feed_line(self.pattern.as_ref(), &raw) {
                        return Ok(Some(block));
                    }
                }
                None => {
                    self.done = true;
                    return Ok(self.assembler.finish());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn ruff_pattern() -> CompiledPattern {
        CompiledPattern::compile("%f:%l:%c: %m").unwrap()
    }

    fn mypy_pattern() -> CompiledPattern {
        CompiledPattern::compile("%f:%l:%c: %t: %m").unwrap()
    }

    #[tokio::test]
    async fn s1_single_anchored_line() {
        let input = Cursor::new(b"a.py:3:5: oops\n".to_vec());
        let mut parser = LineParser::new(input, Some(ruff_pattern()));
        let block = parser.next_block().await.unwrap().unwrap();
        assert_eq!(block.file, "a.py");
        assert_eq!(block.line, Some(3));
        assert_eq!(block.col, Some(5));
        assert_eq!(block.content, "a.py:3:5: oops");
        assert!(parser.next_block().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn s2_multiline_mypy_block() {
        let input = Cursor::new(b"b.py:1:1: error: bad\n    note: see here\n".to_vec());
        let mut parser = LineParser::new(input, Some(mypy_pattern()));
        let block = parser.next_block().await.unwrap().unwrap();
        assert_eq!(block.file, "b.py");
        assert_eq!(block.line, Some(1));
        assert_eq!(block.col, Some(1));
        assert_eq!(block.content, "b.py:1:1: error: bad\n    note: see here");
    }

    #[tokio::test]
    async fn s4_informational_block() {
        let input = Cursor::new(b"Summary: 3 errors\n".to_vec());
        let mut parser = LineParser::new(input, Some(ruff_pattern()));
        let block = parser.next_block().await.unwrap().unwrap();
        assert!(!block.has_location());
        assert_eq!(block.content, "Summary: 3 errors");
    }

    #[tokio::test]
    async fn blank_line_closes_the_open_block() {
        let input = Cursor::new(b"a.py:3:5: oops\n\nb.py:4:1: other\n".to_vec());
        let mut parser = LineParser::new(input, Some(ruff_pattern()));
        let first = parser.next_block().await.unwrap().unwrap();
        assert_eq!(first.content, "a.py:3:5: oops");
        let second = parser.next_block().await.unwrap().unwrap();
        assert_eq!(second.file, "b.py");
    }

    #[tokio::test]
    async fn new_anchor_closes_previous_block_without_blank_line() {
        let input = Cursor::new(b"a.py:3:5: oops\nb.py:4:1: other\n".to_vec());
        let mut parser = LineParser::new(input, Some(ruff_pattern()));
        let first = parser.next_block().await.unwrap().unwrap();
        assert_eq!(first.file, "a.py");
        let second = parser.next_block().await.unwrap().unwrap();
        assert_eq!(second.file, "b.py");
    }

    #[tokio::test]
    async fn ansi_colour_is_preserved_in_content_but_ignored_for_matching() {
        let coloured = "\x1b[31ma.py:3:5: oops\x1b[0m\n";
        let input = Cursor::new(coloured.as_bytes().to_vec());
        let mut parser = LineParser::new(input, Some(ruff_pattern()));
        let block = parser.next_block().await.unwrap().unwrap();
        assert_eq!(block.file, "a.py");
        assert!(block.content.contains("\x1b[31m"));
    }

    #[test]
    fn assembler_never_drops_a_stray_continuation_line() {
        let mut assembler = BlockAssembler::new();
        assert!(assembler.feed_line(None, "just some text").is_none());
        let block = assembler.finish().unwrap();
        assert_eq!(block.content, "just some text");
    }
}
