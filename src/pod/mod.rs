#![forbid(unsafe_code)]

mod error;
mod format;
mod io;
mod ops;
mod path;
mod read;

pub use error::{PodError, PodResult};
pub use format::{
    Entry, EntryInfo, Header, ARCHIVE_EXT, ENTRY_SIZE, HEADER_SIZE, MAGIC, NAME_SCAN_LIMIT,
};
pub use io::ByteReader;
pub use path::{
    archive_dir_name, archive_output_dir, is_pod_file, matches_filter, to_host_path,
};
pub use read::{check_ident, decode_entries, decode_header, entry_content, resolve_name, Archive};

pub use ops::{
    entries, extract, extract_archive, extract_bytes, extract_with_progress, find_archives, info,
    list, problems, verify, ArchiveFailure, ArchiveReport, BatchReport, EntryFailure,
    ExtractOptions, ExtractProgress, ExtractStage,
};
