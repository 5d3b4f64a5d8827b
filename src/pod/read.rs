#![forbid(unsafe_code)]

use crate::pod::error::{PodError, PodResult};
use crate::pod::format::{
    offsets, Entry, Header, ENTRY_SIZE, HEADER_SIZE, MAGIC, NAME_SCAN_LIMIT, TEXT_FIELD_LEN,
};
use crate::pod::io::ByteReader;

/// POD3 layout:
/// - header (288 bytes, see `format::offsets`)
/// - reserved bytes up to `entry_offset` (unparsed)
/// - entry table: `entry_count` x 20-byte records
///     - [u32 name_offset] relative to the end of the table
///     - [u32 size]
///     - [u32 offset] absolute
///     - [u32 timestamp]
///     - [u32 checksum]
/// - name region: NUL-terminated, backslash-separated paths
/// - content blobs, addressed by absolute offset (stored, not compressed)
pub fn decode_header(data: &[u8]) -> PodResult<Header> {
    if data.len() < HEADER_SIZE {
        return Err(PodError::TruncatedHeader {
            len: data.len(),
            needed: HEADER_SIZE,
        });
    }

    let r = ByteReader::new(data);
    Ok(Header {
        ident: r.read_exact::<4>(offsets::IDENT)?,
        checksum: r.read_u32(offsets::CHECKSUM)?,
        comment: r.read_fixed_string(offsets::COMMENT, TEXT_FIELD_LEN)?,
        entry_count: r.read_u32(offsets::ENTRY_COUNT)?,
        audit_count: r.read_u32(offsets::AUDIT_COUNT)?,
        revision: r.read_u32(offsets::REVISION)?,
        priority: r.read_u32(offsets::PRIORITY)?,
        author: r.read_fixed_string(offsets::AUTHOR, TEXT_FIELD_LEN)?,
        copyright: r.read_fixed_string(offsets::COPYRIGHT, TEXT_FIELD_LEN)?,
        entry_offset: r.read_u32(offsets::ENTRY_OFFSET)?,
        entry_crc: r.read_u32(offsets::ENTRY_CRC)?,
        names_size: r.read_u32(offsets::NAMES_SIZE)?,
        depends_count: r.read_u32(offsets::DEPENDS_COUNT)?,
        depends_crc: r.read_u32(offsets::DEPENDS_CRC)?,
        audits_crc: r.read_u32(offsets::AUDITS_CRC)?,
    })
}

/// Strict mode: reject anything whose ident is not `POD3`.
pub fn check_ident(header: &Header) -> PodResult<()> {
    if header.ident != MAGIC {
        return Err(PodError::UnrecognizedFormat {
            ident: header.ident,
        });
    }
    Ok(())
}

pub fn decode_entries(data: &[u8], entry_offset: u32, entry_count: u32) -> PodResult<Vec<Entry>> {
    let table_end = entry_offset as u64 + entry_count as u64 * ENTRY_SIZE as u64;
    if table_end > data.len() as u64 {
        return Err(PodError::TruncatedEntryTable {
            offset: entry_offset,
            count: entry_count,
            len: data.len(),
        });
    }

    let r = ByteReader::new(data);
    let mut out = Vec::with_capacity(entry_count as usize);
    for i in 0..entry_count as usize {
        let at = entry_offset as usize + i * ENTRY_SIZE;
        out.push(Entry {
            name_offset: r.read_u32(at)?,
            size: r.read_u32(at + 4)?,
            offset: r.read_u32(at + 8)?,
            timestamp: r.read_u32(at + 12)?,
            checksum: r.read_u32(at + 16)?,
        });
    }
    Ok(out)
}

/// Archive path of entry `index`, still backslash-separated.
pub fn resolve_name(data: &[u8], header: &Header, entry: &Entry, index: usize) -> PodResult<String> {
    let start = header.names_start() + entry.name_offset as u64;
    if start >= data.len() as u64 {
        return Err(PodError::InvalidNameOffset {
            index,
            start,
            len: data.len(),
        });
    }
    ByteReader::new(data).read_cstring_bounded(start as usize, NAME_SCAN_LIMIT)
}

/// Stored bytes of entry `index`.
pub fn entry_content<'a>(data: &'a [u8], entry: &Entry, index: usize) -> PodResult<&'a [u8]> {
    let end = entry.offset as u64 + entry.size as u64;
    if end > data.len() as u64 {
        return Err(PodError::InvalidContentRange {
            index,
            offset: entry.offset,
            size: entry.size,
            len: data.len(),
        });
    }
    Ok(&data[entry.offset as usize..end as usize])
}

/// A decoded archive borrowing its bytes.
#[derive(Debug, Clone)]
pub struct Archive<'a> {
    pub header: Header,
    pub entries: Vec<Entry>,
    data: &'a [u8],
}

impl<'a> Archive<'a> {
    pub fn parse(data: &'a [u8]) -> PodResult<Self> {
        let header = decode_header(data)?;
        let entries = decode_entries(data, header.entry_offset, header.entry_count)?;
        Ok(Self {
            header,
            entries,
            data,
        })
    }

    pub fn parse_strict(data: &'a [u8]) -> PodResult<Self> {
        let header = decode_header(data)?;
        check_ident(&header)?;
        let entries = decode_entries(data, header.entry_offset, header.entry_count)?;
        Ok(Self {
            header,
            entries,
            data,
        })
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn name(&self, index: usize) -> PodResult<String> {
        let entry = self.entry(index)?;
        resolve_name(self.data, &self.header, entry, index)
    }

    pub fn content(&self, index: usize) -> PodResult<&'a [u8]> {
        let entry = self.entry(index)?;
        entry_content(self.data, entry, index)
    }

    pub fn reserved(&self) -> &'a [u8] {
        let range = self.header.reserved_region();
        &self.data[range.start.min(self.data.len())..range.end.min(self.data.len())]
    }

    fn entry(&self, index: usize) -> PodResult<&Entry> {
        self.entries
            .get(index)
            .ok_or_else(|| PodError::Invalid(format!("no entry {index}")))
    }
}
