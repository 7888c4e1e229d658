//! Parser for the tab-indented usb.ids format.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, trace};

use crate::error::SourceReadError;
use crate::record::{Record, RecordCollection, RecordType};

/// Traversal state carried from one line to the next.
///
/// Depth is taken from the number of tab characters on the line. A line one
/// level deeper than the previous one opens a new branch, a line without tabs
/// starts a new root, and any other count replaces the last key of the
/// current path. The depth counter only goes back down at a root line, so an
/// irregular decrease (two tabs, then one) keeps the deeper path length.
#[derive(Debug, Default)]
pub struct LineParser {
    path: Vec<String>,
    depth: usize,
    kind: RecordType,
    line: usize,
}

impl LineParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of lines fed so far, skipped lines included.
    pub fn lines_read(&self) -> usize {
        self.line
    }

    /// Consume one line. Returns `None` for blank and `#` comment lines.
    pub fn feed(&mut self, line: &str) -> Option<Record> {
        self.line += 1;

        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return None;
        }

        let mut tokens = line.split(' ').peekable();

        if let Some(kind) = tokens
            .peek()
            .and_then(|token| RecordType::from_marker(token.trim()))
        {
            trace!("line {}: entering section {}", self.line, kind);
            self.kind = kind;
            tokens.next();
        }

        let key = tokens.next().map(str::trim).unwrap_or_default().to_string();
        let value = tokens.collect::<Vec<_>>().join(" ").trim().to_string();

        let tabs = line.matches('\t').count();
        if tabs == 0 {
            self.path.clear();
            self.path.push(key.clone());
            self.depth = 0;
        } else if tabs == self.depth + 1 {
            self.depth += 1;
            self.path.push(key.clone());
        } else if let Some(last) = self.path.last_mut() {
            *last = key.clone();
        } else {
            // indented line before any root
            self.path.push(key.clone());
        }

        Some(Record {
            key,
            value,
            path: self.path.clone(),
            kind: self.kind,
        })
    }
}

/// Parse an in-memory sequence of lines.
pub fn parse_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> RecordCollection {
    let mut parser = LineParser::new();
    let mut collection = RecordCollection::default();
    for line in lines {
        if let Some(record) = parser.feed(line) {
            collection.push(record);
        }
    }
    collection
}

/// Parse a buffered byte stream until its end.
///
/// Lines end at `\n`, an optional `\r` before it is dropped. Bytes that are
/// not valid UTF-8 are replaced rather than rejected. A read error discards
/// everything parsed so far.
pub async fn parse_reader<R>(mut reader: R) -> Result<RecordCollection, SourceReadError>
where
    R: AsyncBufRead + Unpin,
{
    let mut parser = LineParser::new();
    let mut collection = RecordCollection::default();
    let mut buf = Vec::with_capacity(256);

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .await
            .map_err(|source| SourceReadError {
                line: parser.lines_read() + 1,
                source,
            })?;
        if read == 0 {
            break;
        }

        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }

        let line = String::from_utf8_lossy(&buf);
        if let Some(record) = parser.feed(&line) {
            collection.push(record);
        }
    }

    debug!(
        "parsed {} records from {} lines",
        collection.len(),
        parser.lines_read()
    );

    Ok(collection)
}
