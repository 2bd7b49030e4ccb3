use clap::{ArgAction, Parser};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use crate::{Result, SortError};

#[derive(Parser, Debug)]
#[command(name = "music-sorter")]
#[command(version)]
#[command(about = "Sort a messy music library into folders by artist, using the tags inside each file", long_about = None)]
pub struct Cli {
    /// Input music library directory to be processed
    #[arg(short = 'i', long = "in-dir")]
    pub in_dir: PathBuf,

    /// Output directory to back up processed files to
    #[arg(short = 'o', long = "out-dir")]
    pub out_dir: PathBuf,

    /// Include album title in output directory structure
    #[arg(long, default_value_t = false, action = ArgAction::Set)]
    pub keep_album: bool,

    /// Write the gathered records (sources, targets, tags) as CSV into the output directory
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub keep_data: bool,

    /// Uppercase the first letter of every artist folder
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub capitalize: bool,

    /// Route songs matching a keyword preset (e.g. xmas, comedy) into their own folder.
    /// Earlier filters take precedence.
    #[arg(short = 'f', long = "filt")]
    pub filters: Vec<String>,

    /// TOML file with extra `[[classifier]]` presets
    #[arg(long)]
    pub classifiers: Option<PathBuf>,

    /// Sub-directory for files that could not be processed
    #[arg(long, default_value = crate::config::DEFAULT_FAILURE_DIRNAME)]
    pub failure_dirname: String,

    /// Folder for tracks with no usable artist
    #[arg(long, default_value = crate::config::DEFAULT_BLANK_NAME)]
    pub blank_name: String,

    /// CSV of reference artist names (needs a `name` column)
    #[arg(long = "ref-artists-file")]
    pub ref_artists: Option<PathBuf>,

    /// Audio extensions to pick up; repeat to give several
    #[arg(long = "ext")]
    pub extensions: Vec<String>,

    /// Strip only the older character set from folder names (keeps ' and `)
    #[arg(long)]
    pub legacy_sanitize: bool,

    /// Plan and summarize without copying or writing anything
    #[arg(short = 'd', long)]
    pub dry_run: bool,

    /// Do not ask before writing into an existing output directory
    #[arg(short = 'y', long)]
    pub yes: bool,
}

fn absolute(path: &Path) -> Result<PathBuf> {
    Ok(std::path::absolute(path)?)
}

/// Resolve both directories to absolute paths and check they can be used together.
pub fn resolve_directories(in_dir: &Path, out_dir: &Path) -> Result<(PathBuf, PathBuf)> {
    if !in_dir.is_dir() {
        return Err(SortError::Config(format!(
            "input directory '{}' does not exist",
            in_dir.display()
        )));
    }
    let in_dir = in_dir.canonicalize()?;
    let out_dir = match out_dir.canonicalize() {
        Ok(existing) => existing,
        Err(_) => {
            // Not created yet; resolve through its parent so symlinked temp roots still compare equal
            let out_dir = absolute(out_dir)?;
            let resolved = match (out_dir.parent(), out_dir.file_name()) {
                (Some(parent), Some(name)) => parent.canonicalize().ok().map(|p| p.join(name)),
                _ => None,
            };
            resolved.unwrap_or(out_dir)
        }
    };
    if in_dir == out_dir {
        return Err(SortError::Config(
            "you must back up your data to a different directory".into(),
        ));
    }
    Ok((in_dir, out_dir))
}

/// Ask on `output` and read one line from `input`. Only `y` or `yes` counts as agreement.
pub fn confirm(prompt: &str, mut input: impl BufRead, mut output: impl Write) -> io::Result<bool> {
    write!(output, "{} [y/N] ", prompt)?;
    output.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
