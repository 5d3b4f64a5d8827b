#![forbid(unsafe_code)]

use inquire::{Confirm, Text};
use podex::pod::{self, ExtractOptions, PodError};
use std::path::PathBuf;

fn prompt_err(e: inquire::InquireError) -> PodError {
    PodError::Io(std::io::Error::new(std::io::ErrorKind::Other, e))
}

fn split_filters(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim())
        .filter(|x| !x.is_empty())
        .map(|x| x.to_string())
        .collect()
}

pub fn run() -> pod::PodResult<()> {
    println!("POD3 Extract Wizard\n");

    let input = Text::new("Archive file or directory")
        .with_default(".")
        .prompt()
        .map(PathBuf::from)
        .map_err(prompt_err)?;
    if !input.exists() {
        return Err(PodError::Invalid(format!(
            "path does not exist: {}",
            input.display()
        )));
    }

    let recursive = if input.is_dir() {
        Confirm::new("Search subdirectories too?")
            .with_default(false)
            .prompt()
            .map_err(prompt_err)?
    } else {
        false
    };

    let output = Text::new("Output directory")
        .with_default("./extracted")
        .prompt()
        .map(PathBuf::from)
        .map_err(prompt_err)?;

    let filters_raw = Text::new("Filters (comma-separated substrings, optional)")
        .with_default("")
        .prompt()
        .map_err(prompt_err)?;
    let filters = split_filters(&filters_raw);

    println!("\nExtract summary:");
    println!("  input    : {}", input.display());
    println!("  output   : {}", output.display());
    println!("  recursive: {}", recursive);
    println!(
        "  filters  : {}",
        if filters.is_empty() { "<none>".to_string() } else { filters.join(", ") }
    );

    let proceed = Confirm::new("Proceed?")
        .with_default(true)
        .prompt()
        .map_err(prompt_err)?;
    if !proceed {
        return Ok(());
    }

    crate::run_extract(
        &input,
        &output,
        &ExtractOptions {
            filters,
            recursive,
            strict: false,
        },
    )
}
