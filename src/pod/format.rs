#![forbid(unsafe_code)]

use std::ops::Range;

/// POD3 header ident.
pub const MAGIC: [u8; 4] = *b"POD3";

/// Size of the fixed header at offset 0.
pub const HEADER_SIZE: usize = 288;

/// Size of one entry table record.
pub const ENTRY_SIZE: usize = 20;

/// Length of the comment, author and copyright text fields.
pub const TEXT_FIELD_LEN: usize = 80;

/// Upper bound when scanning an entry name for its NUL terminator.
pub const NAME_SCAN_LIMIT: usize = 256;

/// Conventional archive file extension (matched case-insensitively).
pub const ARCHIVE_EXT: &str = "pod";

/// Header field offsets.
pub(crate) mod offsets {
    pub const IDENT: usize = 0x000;
    pub const CHECKSUM: usize = 0x004;
    pub const COMMENT: usize = 0x008;
    pub const ENTRY_COUNT: usize = 0x058;
    pub const AUDIT_COUNT: usize = 0x05C;
    pub const REVISION: usize = 0x060;
    pub const PRIORITY: usize = 0x064;
    pub const AUTHOR: usize = 0x068;
    pub const COPYRIGHT: usize = 0x0B8;
    pub const ENTRY_OFFSET: usize = 0x108;
    pub const ENTRY_CRC: usize = 0x10C;
    pub const NAMES_SIZE: usize = 0x110;
    pub const DEPENDS_COUNT: usize = 0x114;
    pub const DEPENDS_CRC: usize = 0x118;
    pub const AUDITS_CRC: usize = 0x11C;
}

/// Decoded POD3 header. CRC fields and the audit/depends counts are carried
/// as read and never validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub ident: [u8; 4],
    pub checksum: u32,
    pub comment: String,
    pub entry_count: u32,
    pub audit_count: u32,
    pub revision: u32,
    pub priority: u32,
    pub author: String,
    pub copyright: String,
    pub entry_offset: u32,
    pub entry_crc: u32,
    pub names_size: u32,
    pub depends_count: u32,
    pub depends_crc: u32,
    pub audits_crc: u32,
}

impl Header {
    /// Byte length of the entry table.
    pub fn entry_table_len(&self) -> u64 {
        self.entry_count as u64 * ENTRY_SIZE as u64
    }

    /// Absolute offset where the name region begins.
    pub fn names_start(&self) -> u64 {
        self.entry_offset as u64 + self.entry_table_len()
    }

    /// Unparsed bytes between the end of the header and the entry table.
    /// Layout unknown; never interpreted.
    pub fn reserved_region(&self) -> Range<usize> {
        let end = (self.entry_offset as usize).max(HEADER_SIZE);
        HEADER_SIZE..end
    }
}

/// One entry table record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    /// Relative to the end of the entry table.
    pub name_offset: u32,
    pub size: u32,
    /// Absolute offset of the content.
    pub offset: u32,
    pub timestamp: u32,
    pub checksum: u32,
}

/// Public view of an entry with its name resolved, for listings.
#[derive(Debug, Clone)]
pub struct EntryInfo {
    pub index: usize,
    /// Resolved archive path, or the resolution error.
    pub name: Result<String, String>,
    pub size: u32,
    pub offset: u32,
    pub timestamp: u32,
    pub checksum: u32,
    /// Blake3 hash (hex) of the content, when its range is valid.
    pub content_hash_hex: Option<String>,
}
