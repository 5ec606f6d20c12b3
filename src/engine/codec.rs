//! External decompression codecs for compressed SQL input

use std::fmt;
use std::path::Path;
use std::process::Command;

/// Compression codec of a `.sql.<ext>` file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    Bzip2,
    Gzip,
    Xz,
    Zstd,
}

impl Codec {
    /// All supported codecs
    pub const ALL: [Codec; 4] = [Codec::Bzip2, Codec::Gzip, Codec::Xz, Codec::Zstd];

    /// File extension after `.sql`
    pub fn extension(&self) -> &'static str {
        match self {
            Codec::Bzip2 => "bz2",
            Codec::Gzip => "gz",
            Codec::Xz => "xz",
            Codec::Zstd => "zst",
        }
    }

    /// Decompressor binary
    pub fn program(&self) -> &'static str {
        match self {
            Codec::Bzip2 => "bunzip2",
            Codec::Gzip => "gunzip",
            Codec::Xz => "xzcat",
            Codec::Zstd => "zstd",
        }
    }

    fn flags(&self) -> &'static [&'static str] {
        match self {
            Codec::Bzip2 | Codec::Gzip => &["-c"],
            Codec::Xz => &[],
            Codec::Zstd => &["-dc"],
        }
    }

    /// Command that writes the decompressed contents of `path` to stdout
    pub fn command(&self, path: &Path) -> Command {
        let mut cmd = Command::new(self.program());
        cmd.args(self.flags()).arg(path);
        cmd
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program())
    }
}
