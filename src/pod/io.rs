#![forbid(unsafe_code)]

use crate::pod::error::{PodError, PodResult};

/// Bounds-checked reads over an in-memory archive.
#[derive(Debug, Clone, Copy)]
pub struct ByteReader<'a> {
    data: &'a [u8],
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// `len` bytes starting at `offset`.
    pub fn bytes(&self, offset: usize, len: usize) -> PodResult<&'a [u8]> {
        offset
            .checked_add(len)
            .and_then(|end| self.data.get(offset..end))
            .ok_or(PodError::OutOfBounds {
                offset,
                len,
                buf_len: self.data.len(),
            })
    }

    pub fn read_exact<const N: usize>(&self, offset: usize) -> PodResult<[u8; N]> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.bytes(offset, N)?);
        Ok(buf)
    }

    pub fn read_u32(&self, offset: usize) -> PodResult<u32> {
        Ok(u32::from_le_bytes(self.read_exact::<4>(offset)?))
    }

    /// Fixed-width text field, cut at the first NUL.
    pub fn read_fixed_string(&self, offset: usize, length: usize) -> PodResult<String> {
        let raw = self.bytes(offset, length)?;
        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        Ok(decode_text(&raw[..end]))
    }

    /// NUL-terminated text starting at `offset`, scanning at most
    /// `max_length` bytes. A missing terminator truncates at the bound or at
    /// the end of the buffer.
    pub fn read_cstring_bounded(&self, offset: usize, max_length: usize) -> PodResult<String> {
        if offset > self.data.len() {
            return Err(PodError::OutOfBounds {
                offset,
                len: 0,
                buf_len: self.data.len(),
            });
        }
        let window = &self.data[offset..];
        let window = &window[..window.len().min(max_length)];
        let end = window.iter().position(|&b| b == 0).unwrap_or(window.len());
        Ok(decode_text(&window[..end]))
    }
}

/// One char per byte; bytes above 0x7F map to their Latin-1 code point so
/// decoding cannot fail.
pub fn decode_text(raw: &[u8]) -> String {
    raw.iter().map(|&b| b as char).collect()
}
