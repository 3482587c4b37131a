//! Output character encodings

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Replacement byte for characters the target encoding cannot carry
pub const REPLACEMENT: u8 = b'?';

/// Character encoding of the fixed-width file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputEncoding {
    #[default]
    #[serde(rename = "utf-8")]
    Utf8,
    /// ISO-8859-1, one byte per character
    #[serde(rename = "latin-1")]
    Latin1,
}

impl OutputEncoding {
    pub fn name(&self) -> &'static str {
        match self {
            OutputEncoding::Utf8 => "utf-8",
            OutputEncoding::Latin1 => "latin-1",
        }
    }

    /// Whether a character survives encoding unchanged
    pub fn can_encode(&self, c: char) -> bool {
        match self {
            OutputEncoding::Utf8 => true,
            OutputEncoding::Latin1 => u32::from(c) <= 0xFF,
        }
    }

    /// Encodes text, replacing anything unencodable with [`REPLACEMENT`]
    ///
    /// ```
    /// use bpa_export::core::codec::encoding::OutputEncoding;
    ///
    /// assert_eq!(OutputEncoding::Latin1.encode("São"), vec![b'S', 0xE3, b'o']);
    /// assert_eq!(OutputEncoding::Latin1.encode("a€b"), b"a?b".to_vec());
    /// assert_eq!(OutputEncoding::Utf8.encode("São"), "São".as_bytes().to_vec());
    /// ```
    pub fn encode(&self, text: &str) -> Vec<u8> {
        match self {
            OutputEncoding::Utf8 => text.as_bytes().to_vec(),
            OutputEncoding::Latin1 => text
                .chars()
                .map(|c| u8::try_from(u32::from(c)).unwrap_or(REPLACEMENT))
                .collect(),
        }
    }
}

impl fmt::Display for OutputEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutputEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "utf-8" | "utf8" => Ok(OutputEncoding::Utf8),
            "latin-1" | "latin1" | "iso-8859-1" => Ok(OutputEncoding::Latin1),
            other => Err(format!(
                "Unknown encoding '{other}'. Must be 'utf-8' or 'latin-1'"
            )),
        }
    }
}
