#![forbid(unsafe_code)]

use blake3::Hasher;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::pod::error::{PodError, PodResult};
use crate::pod::format::EntryInfo;
use crate::pod::path::{archive_output_dir, is_pod_file, matches_filter, to_host_path};
use crate::pod::read::Archive;

/// Settings for `extract`, filled from the command line.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Only extract entries whose archive path contains one of these.
    pub filters: Vec<String>,
    /// Descend into subdirectories when the input is a directory.
    pub recursive: bool,
    /// Reject archives whose ident is not `POD3`.
    pub strict: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractStage {
    Archive,
    Entry,
}

#[derive(Debug, Clone)]
pub struct ExtractProgress {
    pub stage: ExtractStage,
    pub done: u64,
    pub total: u64,
    pub item: Option<String>,
}

#[derive(Debug)]
pub struct EntryFailure {
    pub index: usize,
    /// Resolved name, when resolution got that far.
    pub name: Option<String>,
    pub error: PodError,
}

#[derive(Debug)]
pub struct ArchiveReport {
    pub archive: PathBuf,
    pub output_dir: PathBuf,
    pub extracted: usize,
    /// Entries left out by the name filter.
    pub filtered: usize,
    pub failures: Vec<EntryFailure>,
    /// Set when the output filesystem became unusable mid-archive.
    pub aborted: bool,
}

impl ArchiveReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && !self.aborted
    }
}

/// An archive that could not be decoded at all.
#[derive(Debug)]
pub struct ArchiveFailure {
    pub archive: PathBuf,
    pub error: PodError,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub archives: Vec<Result<ArchiveReport, ArchiveFailure>>,
}

impl BatchReport {
    pub fn failed_archives(&self) -> usize {
        self.archives.iter().filter(|a| a.is_err()).count()
    }

    pub fn failed_entries(&self) -> usize {
        self.archives
            .iter()
            .filter_map(|a| a.as_ref().ok())
            .map(|r| r.failures.len())
            .sum()
    }

    pub fn extracted_entries(&self) -> usize {
        self.archives
            .iter()
            .filter_map(|a| a.as_ref().ok())
            .map(|r| r.extracted)
            .sum()
    }

    pub fn is_success(&self) -> bool {
        self.archives
            .iter()
            .all(|a| a.as_ref().is_ok_and(ArchiveReport::is_clean))
    }
}

/// Extract a single archive or every archive in a directory.
pub fn extract(input: &Path, output: &Path, opts: &ExtractOptions) -> PodResult<BatchReport> {
    extract_with_progress(input, output, opts, &mut |_| {})
}

pub fn extract_with_progress(
    input: &Path,
    output: &Path,
    opts: &ExtractOptions,
    on_progress: &mut dyn FnMut(ExtractProgress),
) -> PodResult<BatchReport> {
    let (input_root, archives) = if input.is_dir() {
        (Some(input), find_archives(input, opts.recursive)?)
    } else if input.is_file() {
        (None, vec![input.to_path_buf()])
    } else {
        return Err(PodError::Invalid(format!(
            "input does not exist: {}",
            input.display()
        )));
    };

    log::info!("{} archive(s) under {}", archives.len(), input.display());

    let total = archives.len() as u64;
    let mut report = BatchReport::default();
    let mut claimed: Vec<(PathBuf, PathBuf)> = Vec::new();
    for (i, pod) in archives.into_iter().enumerate() {
        on_progress(ExtractProgress {
            stage: ExtractStage::Archive,
            done: i as u64,
            total,
            item: Some(pod.display().to_string()),
        });

        let res = claim_output(&mut claimed, input_root, &pod, output)
            .and_then(|dest| extract_archive(&pod, &dest, opts, on_progress))
            .map_err(|error| {
                log::warn!("{}: {error}", pod.display());
                ArchiveFailure {
                    archive: pod.clone(),
                    error,
                }
            });
        report.archives.push(res);
    }
    Ok(report)
}

/// Reserve the output directory for `pod`. Two archives may not share an
/// output directory or nest one inside the other.
fn claim_output(
    claimed: &mut Vec<(PathBuf, PathBuf)>,
    input_root: Option<&Path>,
    pod: &Path,
    output: &Path,
) -> PodResult<PathBuf> {
    let dest = archive_output_dir(input_root, pod, output)?;
    if let Some((_, other)) = claimed
        .iter()
        .find(|(d, _)| dest.starts_with(d) || d.starts_with(&dest))
    {
        return Err(PodError::OutputCollision {
            path: dest,
            other: other.clone(),
        });
    }
    claimed.push((dest.clone(), pod.to_path_buf()));
    Ok(dest)
}

/// Archive files (symlinks followed), sorted by path.
pub fn find_archives(dir: &Path, recursive: bool) -> PodResult<Vec<PathBuf>> {
    let mut walk = WalkDir::new(dir).min_depth(1).follow_links(false);
    if !recursive {
        walk = walk.max_depth(1);
    }

    let mut out = Vec::new();
    for ent in walk.sort_by_file_name() {
        let ent = ent.map_err(|e| {
            let msg = e.to_string();
            let io = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, msg));
            PodError::Io(io)
        })?;

        if !is_pod_file(ent.path()) {
            continue;
        }
        if ent.path().is_file() {
            out.push(ent.into_path());
        } else {
            log::debug!("skipping non-file {}", ent.path().display());
        }
    }
    Ok(out)
}

/// Extract one archive file into `dest`.
pub fn extract_archive(
    pod: &Path,
    dest: &Path,
    opts: &ExtractOptions,
    on_progress: &mut dyn FnMut(ExtractProgress),
) -> PodResult<ArchiveReport> {
    let data = std::fs::read(pod)?;
    let mut report = extract_bytes(&data, dest, opts, on_progress)?;
    report.archive = pod.to_path_buf();
    Ok(report)
}

/// Walk an in-memory archive and write every entry under `dest`.
/// Header and table errors are returned; entry errors land in the report.
pub fn extract_bytes(
    data: &[u8],
    dest: &Path,
    opts: &ExtractOptions,
    on_progress: &mut dyn FnMut(ExtractProgress),
) -> PodResult<ArchiveReport> {
    let archive = if opts.strict {
        Archive::parse_strict(data)?
    } else {
        Archive::parse(data)?
    };

    log::debug!(
        "{} entries, table at {}, names at {}",
        archive.header.entry_count,
        archive.header.entry_offset,
        archive.header.names_start()
    );

    let mut report = ArchiveReport {
        archive: PathBuf::new(),
        output_dir: dest.to_path_buf(),
        extracted: 0,
        filtered: 0,
        failures: Vec::new(),
        aborted: false,
    };

    let total = archive.entries.len() as u64;
    let mut written: HashMap<PathBuf, usize> = HashMap::new();
    for index in 0..archive.entries.len() {
        let name = match archive.name(index) {
            Ok(n) => n,
            Err(error) => {
                log::warn!("entry {index}: {error}");
                report.failures.push(EntryFailure {
                    index,
                    name: None,
                    error,
                });
                continue;
            }
        };

        if !matches_filter(&name, &opts.filters) {
            report.filtered += 1;
            continue;
        }

        on_progress(ExtractProgress {
            stage: ExtractStage::Entry,
            done: index as u64,
            total,
            item: Some(name.clone()),
        });

        match extract_entry(&archive, index, &name, dest, &mut written) {
            Ok(path) => {
                log::debug!("entry {index}: {name} -> {}", path.display());
                report.extracted += 1;
            }
            Err(error) => {
                log::warn!("entry {index} ({name}): {error}");
                let fatal = error.is_filesystem_unusable();
                report.failures.push(EntryFailure {
                    index,
                    name: Some(name),
                    error,
                });
                if fatal {
                    report.aborted = true;
                    break;
                }
            }
        }
    }

    Ok(report)
}

fn extract_entry(
    archive: &Archive<'_>,
    index: usize,
    name: &str,
    dest: &Path,
    written: &mut HashMap<PathBuf, usize>,
) -> PodResult<PathBuf> {
    let content = archive.content(index)?;
    let rel = to_host_path(name)?;
    if let Some(&first) = written.get(&rel) {
        return Err(PodError::DuplicatePath {
            index,
            path: rel,
            first,
        });
    }
    let out_path = dest.join(&rel);
    write_output(&out_path, content)?;
    written.insert(rel, index);
    Ok(out_path)
}

fn write_output(path: &Path, content: &[u8]) -> PodResult<()> {
    let write_err = |source| PodError::OutputWrite {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    std::fs::write(path, content).map_err(write_err)
}

/// Read archive entries with names resolved (without writing anything).
pub fn entries(pod: &Path) -> PodResult<Vec<EntryInfo>> {
    let data = std::fs::read(pod)?;
    let archive = Archive::parse(&data)?;

    Ok(archive
        .entries
        .iter()
        .enumerate()
        .map(|(index, e)| EntryInfo {
            index,
            name: archive.name(index).map_err(|err| err.to_string()),
            size: e.size,
            offset: e.offset,
            timestamp: e.timestamp,
            checksum: e.checksum,
            content_hash_hex: archive.content(index).ok().map(|c| {
                let mut hasher = Hasher::new();
                hasher.update(c);
                hasher.finalize().to_hex().to_string()
            }),
        })
        .collect())
}

pub fn list(pod: &Path, verbose: bool) -> PodResult<()> {
    for e in entries(pod)? {
        let name = e.name.unwrap_or_else(|err| format!("<{err}>"));
        if verbose {
            println!(
                "{}  off={} len={} time={} crc={:08x} hash={}",
                name,
                e.offset,
                e.size,
                e.timestamp,
                e.checksum,
                e.content_hash_hex.as_deref().unwrap_or("-")
            );
        } else {
            println!("{name}");
        }
    }
    Ok(())
}

pub fn info(pod: &Path) -> PodResult<()> {
    let data = std::fs::read(pod)?;
    let archive = Archive::parse(&data)?;
    let h = &archive.header;

    println!("ident        : {}", String::from_utf8_lossy(&h.ident));
    println!("checksum     : {:08x}", h.checksum);
    println!("comment      : {}", h.comment);
    println!("entry_count  : {}", h.entry_count);
    println!("audit_count  : {}", h.audit_count);
    println!("revision     : {}", h.revision);
    println!("priority     : {}", h.priority);
    println!("author       : {}", h.author);
    println!("copyright    : {}", h.copyright);
    println!("entry_offset : {}", h.entry_offset);
    println!("entry_crc    : {:08x}", h.entry_crc);
    println!("names_size   : {}", h.names_size);
    println!("depends_count: {}", h.depends_count);
    println!("depends_crc  : {:08x}", h.depends_crc);
    println!("audits_crc   : {:08x}", h.audits_crc);
    println!("names_start  : {}", h.names_start());
    println!("reserved     : {} bytes (unparsed)", archive.reserved().len());
    Ok(())
}

/// Every problem found in an archive, without writing anything.
pub fn problems(archive: &Archive<'_>) -> Vec<EntryFailure> {
    let mut out = Vec::new();
    let mut seen: HashMap<PathBuf, usize> = HashMap::new();
    for index in 0..archive.entries.len() {
        let name = match archive.name(index) {
            Ok(n) => n,
            Err(error) => {
                out.push(EntryFailure {
                    index,
                    name: None,
                    error,
                });
                continue;
            }
        };
        let checked = to_host_path(&name).and_then(|rel| {
            archive.content(index)?;
            match seen.get(&rel) {
                Some(&first) => Err(PodError::DuplicatePath {
                    index,
                    path: rel,
                    first,
                }),
                None => {
                    seen.insert(rel, index);
                    Ok(())
                }
            }
        });
        if let Err(error) = checked {
            out.push(EntryFailure {
                index,
                name: Some(name),
                error,
            });
        }
    }
    out
}

pub fn verify(pod: &Path) -> PodResult<()> {
    let data = std::fs::read(pod)?;
    let archive = Archive::parse(&data)?;
    let total = archive.entries.len();
    let found = problems(&archive);

    for p in &found {
        println!("entry {} ({}): {}", p.index, p.name.as_deref().unwrap_or("?"), p.error);
    }
    if !found.is_empty() {
        return Err(PodError::Invalid(format!(
            "{} of {} entries are damaged",
            found.len(),
            total
        )));
    }

    println!("ok: {total} entries");
    Ok(())
}
