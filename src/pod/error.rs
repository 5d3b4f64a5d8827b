#![forbid(unsafe_code)]

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PodError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid input: {0}")]
    Invalid(String),

    #[error("read of {len} bytes at offset {offset} exceeds buffer of {buf_len} bytes")]
    OutOfBounds {
        offset: usize,
        len: usize,
        buf_len: usize,
    },

    #[error("truncated header: archive is {len} bytes, header needs {needed}")]
    TruncatedHeader { len: usize, needed: usize },

    #[error("unrecognized format: ident {ident:?} is not POD3")]
    UnrecognizedFormat { ident: [u8; 4] },

    #[error(
        "truncated entry table: {count} entries at offset {offset} do not fit in {len} bytes"
    )]
    TruncatedEntryTable { offset: u32, count: u32, len: usize },

    #[error("entry {index}: name offset {start} is outside archive of {len} bytes")]
    InvalidNameOffset { index: usize, start: u64, len: usize },

    #[error("entry {index}: content range {offset}+{size} exceeds archive of {len} bytes")]
    InvalidContentRange {
        index: usize,
        offset: u32,
        size: u32,
        len: usize,
    },

    #[error("unsafe entry path: {name:?}")]
    UnsafePath { name: String },

    #[error("entry {index}: {} was already written by entry {first}", path.display())]
    DuplicatePath {
        index: usize,
        path: PathBuf,
        first: usize,
    },

    #[error("output {} overlaps the output of {}", path.display(), other.display())]
    OutputCollision { path: PathBuf, other: PathBuf },

    #[error("write {}: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PodError {
    /// True when a write failed in a way that makes further writes to the
    /// same filesystem pointless.
    pub fn is_filesystem_unusable(&self) -> bool {
        match self {
            PodError::OutputWrite { source, .. } => matches!(
                source.kind(),
                std::io::ErrorKind::StorageFull | std::io::ErrorKind::ReadOnlyFilesystem
            ),
            _ => false,
        }
    }
}

pub type PodResult<T> = Result<T, PodError>;
