#![forbid(unsafe_code)]

mod ui;

use clap::{Parser, Subcommand};
use podex::pod::{self, ExtractOptions, ExtractProgress, ExtractStage};
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "podex", version, about = "POD3 archive extractor")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive wizard for extracting archives (terminal).
    Ui,

    /// Extract one archive, or every .pod archive in a directory.
    Extract {
        /// Archive file or directory of archives.
        #[arg(long)]
        input: PathBuf,
        /// Output directory. Each archive gets a subdirectory named after it.
        #[arg(long)]
        output: PathBuf,
        /// Only extract entries whose path contains this substring (repeatable).
        #[arg(long)]
        filter: Vec<String>,
        /// Also look for archives in subdirectories of --input.
        #[arg(long, default_value_t = false)]
        recursive: bool,
        /// Refuse archives whose header ident is not POD3.
        #[arg(long, default_value_t = false)]
        strict: bool,
    },

    /// List entries in an archive.
    List {
        #[arg(long)]
        pod: PathBuf,
        /// Print offsets, sizes, timestamps and content hashes too.
        #[arg(long, default_value_t = false)]
        verbose: bool,
    },

    /// Print the decoded archive header.
    Info {
        #[arg(long)]
        pod: PathBuf,
    },

    /// Check every entry's name and content range without extracting.
    Verify {
        #[arg(long)]
        pod: PathBuf,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let res = match cli.cmd {
        Command::Ui => ui::run(),
        Command::Extract {
            input,
            output,
            filter,
            recursive,
            strict,
        } => run_extract(
            &input,
            &output,
            &ExtractOptions {
                filters: filter,
                recursive,
                strict,
            },
        ),
        Command::List { pod, verbose } => pod::list(&pod, verbose),
        Command::Info { pod } => pod::info(&pod),
        Command::Verify { pod } => pod::verify(&pod),
    };

    if let Err(e) = res {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Extract with progress lines on stdout; errors if anything failed.
pub(crate) fn run_extract(input: &Path, output: &Path, opts: &ExtractOptions) -> pod::PodResult<()> {
    let mut on_progress = |p: ExtractProgress| {
        let item = p.item.unwrap_or_default();
        match p.stage {
            ExtractStage::Archive => println!("[{}/{}] {}", p.done + 1, p.total, item),
            ExtractStage::Entry => println!("  ({}/{}) {}", p.done + 1, p.total, item),
        }
    };

    let report = pod::extract_with_progress(input, output, opts, &mut on_progress)?;

    for archive in &report.archives {
        match archive {
            Ok(r) => {
                for f in &r.failures {
                    println!(
                        "  failed: {} entry {} ({}): {}",
                        r.archive.display(),
                        f.index,
                        f.name.as_deref().unwrap_or("?"),
                        f.error
                    );
                }
                if r.aborted {
                    println!("  aborted: {}", r.archive.display());
                }
            }
            Err(f) => println!("failed: {}: {}", f.archive.display(), f.error),
        }
    }

    println!(
        "done: {} file(s) from {} archive(s), {} archive failure(s), {} entry failure(s)",
        report.extracted_entries(),
        report.archives.len(),
        report.failed_archives(),
        report.failed_entries()
    );

    if !report.is_success() {
        return Err(pod::PodError::Invalid(format!(
            "{} archive(s) failed to decode, {} entry failure(s)",
            report.failed_archives(),
            report.failed_entries()
        )));
    }
    Ok(())
}
