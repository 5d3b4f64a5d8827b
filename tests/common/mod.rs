#![allow(dead_code)]

use podex::pod::{ENTRY_SIZE, HEADER_SIZE, MAGIC};
use std::sync::Once;

static INIT: Once = Once::new();

pub fn init_logging() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

pub const ENTRY_COUNT_AT: usize = 0x058;
pub const ENTRY_OFFSET_AT: usize = 0x108;

pub fn put_u32(buf: &mut [u8], at: usize, v: u32) {
    buf[at..at + 4].copy_from_slice(&v.to_le_bytes());
}

/// Byte offset of entry `index`'s record for an archive built with the
/// default table position.
pub fn entry_at(buf: &[u8], index: usize) -> usize {
    let off = u32::from_le_bytes(buf[ENTRY_OFFSET_AT..ENTRY_OFFSET_AT + 4].try_into().unwrap());
    off as usize + index * ENTRY_SIZE
}

/// Builds POD3 images: header, optional reserved bytes, entry table, name
/// region, then contents in entry order.
pub struct PodBuilder {
    ident: [u8; 4],
    entry_offset: Option<usize>,
    reserved: Vec<u8>,
    files: Vec<(String, Vec<u8>)>,
}

impl PodBuilder {
    pub fn new() -> Self {
        Self {
            ident: MAGIC,
            entry_offset: None,
            reserved: Vec::new(),
            files: Vec::new(),
        }
    }

    pub fn ident(mut self, ident: [u8; 4]) -> Self {
        self.ident = ident;
        self
    }

    pub fn entry_offset(mut self, offset: usize) -> Self {
        self.entry_offset = Some(offset);
        self
    }

    pub fn reserved(mut self, bytes: &[u8]) -> Self {
        self.reserved = bytes.to_vec();
        self
    }

    pub fn file(mut self, name: &str, content: &[u8]) -> Self {
        self.files.push((name.to_string(), content.to_vec()));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let entry_offset = self
            .entry_offset
            .unwrap_or(HEADER_SIZE + self.reserved.len());
        let table_end = entry_offset + self.files.len() * ENTRY_SIZE;
        assert!(table_end >= HEADER_SIZE, "entry table must end after the header");

        let mut buf = vec![0u8; HEADER_SIZE];
        buf[..4].copy_from_slice(&self.ident);
        buf[0x008..0x008 + 9].copy_from_slice(b"test pack");
        buf[0x068..0x068 + 6].copy_from_slice(b"podex!");
        put_u32(&mut buf, ENTRY_COUNT_AT, self.files.len() as u32);
        put_u32(&mut buf, ENTRY_OFFSET_AT, entry_offset as u32);
        buf.extend_from_slice(&self.reserved);
        buf.resize(table_end, 0);

        let mut name_offsets = Vec::new();
        let names_start = buf.len();
        for (name, _) in &self.files {
            name_offsets.push((buf.len() - names_start) as u32);
            buf.extend_from_slice(name.as_bytes());
            buf.push(0);
        }
        let names_size = (buf.len() - names_start) as u32;
        put_u32(&mut buf, 0x110, names_size);

        for (i, (_, content)) in self.files.iter().enumerate() {
            let offset = buf.len() as u32;
            buf.extend_from_slice(content);
            let at = entry_offset + i * ENTRY_SIZE;
            put_u32(&mut buf, at, name_offsets[i]);
            put_u32(&mut buf, at + 4, content.len() as u32);
            put_u32(&mut buf, at + 8, offset);
            put_u32(&mut buf, at + 12, 0x3C00_0000 + i as u32);
            put_u32(&mut buf, at + 16, 0);
        }
        buf
    }
}
