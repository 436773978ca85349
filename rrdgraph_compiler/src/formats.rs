//! Output formats understood by the renderer

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ImageFormat {
    Png,
    Pdf,
    Svg,
    Eps,
    Ssv,
    Xml,
    XmlEnum,
    Json,
    JsonTime,
    Csv,
    Tsv,
}

impl ImageFormat {
    pub const ALL: [ImageFormat; 11] = [
        ImageFormat::Png,
        ImageFormat::Pdf,
        ImageFormat::Svg,
        ImageFormat::Eps,
        ImageFormat::Ssv,
        ImageFormat::Xml,
        ImageFormat::XmlEnum,
        ImageFormat::Json,
        ImageFormat::JsonTime,
        ImageFormat::Csv,
        ImageFormat::Tsv,
    ];

    /// Name passed to `--imgformat`
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Png => "PNG",
            ImageFormat::Pdf => "PDF",
            ImageFormat::Svg => "SVG",
            ImageFormat::Eps => "EPS",
            ImageFormat::Ssv => "SSV",
            ImageFormat::Xml => "XML",
            ImageFormat::XmlEnum => "XMLENUM",
            ImageFormat::Json => "JSON",
            ImageFormat::JsonTime => "JSONTIME",
            ImageFormat::Csv => "CSV",
            ImageFormat::Tsv => "TSV",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Pdf => "application/pdf",
            ImageFormat::Svg => "image/svg+xml",
            ImageFormat::Eps => "application/eps",
            ImageFormat::Ssv => "text/plain",
            ImageFormat::Xml | ImageFormat::XmlEnum => "application/xml",
            ImageFormat::Json | ImageFormat::JsonTime => "application/json",
            ImageFormat::Csv => "text/csv",
            ImageFormat::Tsv => "text/tab-separated-values",
        }
    }

    /// Case-insensitive lookup by format name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content type for a format name, case-insensitive
pub fn content_type(format_name: &str) -> Option<&'static str> {
    ImageFormat::from_name(format_name).map(|format| format.content_type())
}

/// Infer the format from the suffix of a request target (`load.svg`)
pub fn format_from_path(path: &Path) -> Option<ImageFormat> {
    let file_name = path.file_name()?.to_str()?;
    let (_, suffix) = file_name.rsplit_once('.')?;
    ImageFormat::from_name(suffix)
}
