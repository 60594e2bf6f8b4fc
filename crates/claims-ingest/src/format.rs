//! Input format detection
//!
//! The format comes from an explicit hint or the file extension. For CSV the
//! field delimiter is sniffed from a small sample of the content; the sniff is
//! best-effort and a file that mixes both characters may be misread.

use crate::error::{IngestError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Number of leading bytes inspected when choosing a CSV delimiter
pub const SNIFF_SAMPLE_BYTES: usize = 1024;

/// Supported input/output file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Csv,
    Json,
}

impl FileFormat {
    /// Resolve the format for `path`, preferring an explicit hint
    pub fn detect(path: &Path, hint: Option<FileFormat>) -> Result<Self> {
        if let Some(format) = hint {
            return Ok(format);
        }
        Self::from_extension(path).ok_or_else(|| IngestError::FormatUndetectable(path.to_path_buf()))
    }

    /// Map a file extension (case-insensitive) to a format
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(FileFormat::Csv),
            "json" => Some(FileFormat::Json),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FileFormat::Csv => "csv",
            FileFormat::Json => "json",
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Choose the CSV delimiter from the start of the content.
///
/// Pipe wins only when strictly more frequent than comma in the first
/// [`SNIFF_SAMPLE_BYTES`] bytes.
pub fn sniff_delimiter(content: &[u8]) -> u8 {
    let sample = &content[..content.len().min(SNIFF_SAMPLE_BYTES)];
    let pipes = sample.iter().filter(|&&b| b == b'|').count();
    let commas = sample.iter().filter(|&&b| b == b',').count();
    if pipes > commas {
        b'|'
    } else {
        b','
    }
}
