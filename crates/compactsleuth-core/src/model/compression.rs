/// Compression schemes that can be assigned to a directory or file.
///
/// The indexer never chooses a scheme itself; these values are set by the
/// host (or an external policy engine when `auto_compress` is on) and are
/// carried through analysis untouched.
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionType {
    #[default]
    None,
    Xpress4K,
    Xpress8K,
    Xpress16K,
    Lzma,
}

impl CompressionType {
    /// Every scheme, in ascending order of compression strength.
    pub const ALL: [CompressionType; 5] = [
        Self::None,
        Self::Xpress4K,
        Self::Xpress8K,
        Self::Xpress16K,
        Self::Lzma,
    ];

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Xpress4K => "XPRESS 4K",
            Self::Xpress8K => "XPRESS 8K",
            Self::Xpress16K => "XPRESS 16K",
            Self::Lzma => "LZMA",
        }
    }
}
