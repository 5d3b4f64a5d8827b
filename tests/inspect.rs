mod common;

use common::{entry_at, put_u32, PodBuilder};
use podex::pod::{self, PodError};
use std::fs;
use tempfile::TempDir;

#[test]
fn entries_resolve_names_and_hash_content() {
    let tmp = TempDir::new().unwrap();
    let data = PodBuilder::new()
        .file("maps\\level1.bsp", b"BSP")
        .file("readme.txt", b"hello")
        .build();
    let p = tmp.path().join("m.pod");
    fs::write(&p, &data).unwrap();

    let infos = pod::entries(&p).unwrap();
    assert_eq!(infos.len(), 2);
    assert_eq!(infos[0].name.as_deref(), Ok("maps\\level1.bsp"));
    assert_eq!(infos[1].size, 5);
    assert_eq!(infos[1].timestamp, 0x3C00_0001);

    let expected = blake3::hash(b"hello").to_hex().to_string();
    assert_eq!(infos[1].content_hash_hex.as_deref(), Some(expected.as_str()));
}

#[test]
fn damaged_entries_have_no_hash() {
    let tmp = TempDir::new().unwrap();
    let mut data = PodBuilder::new().file("a", b"1").build();
    let at = entry_at(&data, 0);
    put_u32(&mut data, at + 4, 1 << 20);
    let p = tmp.path().join("d.pod");
    fs::write(&p, &data).unwrap();

    let infos = pod::entries(&p).unwrap();
    assert!(infos[0].content_hash_hex.is_none());
    assert!(infos[0].name.is_ok());
}

#[test]
fn problems_lists_every_bad_entry() {
    let mut data = PodBuilder::new()
        .file("ok.txt", b"1")
        .file("..\\up.txt", b"2")
        .file("big.bin", b"3")
        .build();
    let at = entry_at(&data, 2);
    put_u32(&mut data, at + 4, 1 << 20);

    let archive = pod::Archive::parse(&data).unwrap();
    let found = pod::problems(&archive);
    let indexes: Vec<usize> = found.iter().map(|p| p.index).collect();
    assert_eq!(indexes, vec![1, 2]);
    assert!(matches!(found[0].error, PodError::UnsafePath { .. }));
    assert!(matches!(found[1].error, PodError::InvalidContentRange { .. }));
}

#[test]
fn verify_passes_clean_and_fails_damaged() {
    let tmp = TempDir::new().unwrap();
    let clean = tmp.path().join("clean.pod");
    fs::write(&clean, PodBuilder::new().file("a", b"1").build()).unwrap();
    assert!(pod::verify(&clean).is_ok());

    let mut data = PodBuilder::new().file("a", b"1").build();
    let at = entry_at(&data, 0);
    put_u32(&mut data, at, 1 << 24);
    let damaged = tmp.path().join("damaged.pod");
    fs::write(&damaged, &data).unwrap();
    assert!(matches!(pod::verify(&damaged), Err(PodError::Invalid(_))));
}

#[test]
fn header_text_and_reserved_region_decode() {
    let data = PodBuilder::new()
        .reserved(b"ONE\r\nTWO\r\n")
        .file("a", b"1")
        .build();

    let archive = pod::Archive::parse(&data).unwrap();
    assert_eq!(archive.header.ident, *b"POD3");
    assert_eq!(archive.header.comment, "test pack");
    assert_eq!(archive.header.author, "podex!");
    assert_eq!(archive.header.copyright, "");
    assert_eq!(archive.header.entry_offset as usize, pod::HEADER_SIZE + 10);
    assert_eq!(archive.reserved(), b"ONE\r\nTWO\r\n");
    assert_eq!(archive.header.names_size, 2);

    let tmp = TempDir::new().unwrap();
    let p = tmp.path().join("h.pod");
    fs::write(&p, &data).unwrap();
    assert!(pod::info(&p).is_ok());
}

#[test]
fn duplicate_names_fail_verification() {
    let tmp = TempDir::new().unwrap();
    let data = PodBuilder::new()
        .file("maps\\a.bsp", b"1")
        .file("maps\\a.bsp", b"2")
        .build();

    let archive = pod::Archive::parse(&data).unwrap();
    let found = pod::problems(&archive);
    assert_eq!(found.len(), 1);
    assert!(matches!(
        found[0].error,
        PodError::DuplicatePath { index: 1, first: 0, .. }
    ));

    let p = tmp.path().join("dup.pod");
    fs::write(&p, &data).unwrap();
    assert!(pod::verify(&p).is_err());
}
