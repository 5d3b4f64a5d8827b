#![forbid(unsafe_code)]

//! Reader and extractor for POD3 game asset archives.

pub mod pod;
