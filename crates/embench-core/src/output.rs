//! Output formatting for JSON, JSONL and Markdown reports.
//!
//! Scores and rank tables are written as JSON objects or JSON Lines; reports
//! that implement [`ToMarkdown`] can also be rendered as Markdown tables.

use serde::Serialize;
use std::io::{self, Write};

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Single JSON object or array
    Json,
    /// One JSON object per line (newline-delimited JSON)
    JsonLines,
    /// Markdown table (reports only)
    Markdown,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            "md" | "markdown" => Some(Self::Markdown),
            _ => None,
        }
    }
}

/// A report that renders as a Markdown table.
pub trait ToMarkdown {
    fn to_markdown(&self) -> String;
}

/// A writer that serializes items in the configured format.
pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
    items_written: usize,
}

impl<W: Write> OutputWriter<W> {
    /// Create a new output writer.
    ///
    /// `pretty` only affects the JSON format.
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            items_written: 0,
        }
    }

    /// Write a single serializable item.
    ///
    /// Markdown is rejected here; use [`OutputWriter::write_report`].
    pub fn write<T: Serialize + ?Sized>(&mut self, item: &T) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => {
                if self.pretty {
                    serde_json::to_writer_pretty(&mut self.writer, item)
                        .map_err(io::Error::other)?;
                } else {
                    serde_json::to_writer(&mut self.writer, item).map_err(io::Error::other)?;
                }
                writeln!(self.writer)?;
            }
            OutputFormat::JsonLines => {
                // JSONL is never pretty-printed (one object per line)
                serde_json::to_writer(&mut self.writer, item).map_err(io::Error::other)?;
                writeln!(self.writer)?;
            }
            OutputFormat::Markdown => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "markdown output is only available for reports",
                ));
            }
        }
        self.items_written += 1;
        Ok(())
    }

    /// Write multiple items: a JSON array, or one line per item for JSONL.
    pub fn write_all<T: Serialize>(&mut self, items: &[T]) -> io::Result<()> {
        match self.format {
            OutputFormat::JsonLines => {
                for item in items {
                    self.write(item)?;
                }
            }
            _ => {
                self.write(items)?;
                // write() counted the array as one item
                self.items_written = self.items_written - 1 + items.len();
            }
        }
        Ok(())
    }

    /// Write a report in any format, including Markdown.
    pub fn write_report<T: Serialize + ToMarkdown + ?Sized>(&mut self, report: &T) -> io::Result<()> {
        if self.format == OutputFormat::Markdown {
            self.writer.write_all(report.to_markdown().as_bytes())?;
            self.items_written += 1;
            return Ok(());
        }
        self.write(report)
    }

    /// Get the number of items written.
    pub fn items_written(&self) -> usize {
        self.items_written
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Consume the writer and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Serialize an item to a JSON string.
pub fn to_json<T: Serialize + ?Sized>(item: &T, pretty: bool) -> Result<String, serde_json::Error> {
    if pretty {
        serde_json::to_string_pretty(item)
    } else {
        serde_json::to_string(item)
    }
}
