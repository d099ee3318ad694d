//! Ikou - Evernote to remote store migrator
//!
//! Processes ENEX export files into a PDF-centric directory tree, then
//! optionally mirrors that tree into a remote store target (a mounted or
//! synced drive folder). Supports a dry-run mode that skips the mirror step
//! entirely.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use env_logger::Env;
use log::info;

use ikou::MigrationConfig;
use ikou::error::{Error, Result};
use ikou::upload::{DirectoryStore, upload_directory};

#[derive(Parser, Debug)]
#[command(
    name = "ikou",
    version,
    about = "Exports and processes Evernote ENEX files, replicating notebook structure \
             into a mirror directory. Supports dry-run mode to skip the mirror step."
)]
struct Cli {
    /// Directory containing the .enex export files
    #[arg(short = 'i', long, default_value = "./input_data")]
    input_directory: PathBuf,

    /// Directory where the converted notes will be saved
    #[arg(short = 'o', long, default_value = "./EverNote Notes")]
    output_directory: PathBuf,

    /// Location of the JSON run log
    #[arg(long, default_value = "./extraction_log.json")]
    log_file: PathBuf,

    /// Run without mirroring (for testing output structure only)
    #[arg(short = 'd', long)]
    dry_run: bool,

    /// Preserve original filenames without adding an identifier prefix
    #[arg(short = 'n', long = "no-serial")]
    preserve_filenames: bool,

    /// Mounted/synced drive folder that receives a mirror of the output tree
    #[arg(short = 'm', long)]
    mirror_directory: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    info!("processing notes into: {}", cli.output_directory.display());
    if cli.dry_run {
        info!("dry run mode enabled, mirroring will be skipped");
    }

    let config = MigrationConfig::builder()
        .input_path(cli.input_directory.clone())
        .output_path(cli.output_directory.clone())
        .log_path(cli.log_file.clone())
        .preserve_filenames(cli.preserve_filenames)
        .build()?;

    let report = config.migrate()?;
    info!(
        "converted {} artifact(s) across {} notebook(s) ({} failure(s), {} collision(s))",
        report.artifacts, report.notebooks, report.failures, report.collisions
    );

    if cli.dry_run {
        info!("dry run complete, no files were mirrored");
        return Ok(());
    }

    let Some(mirror) = &cli.mirror_directory else {
        return Err(Error::Configuration(
            "mirroring requested but no --mirror-directory was given; \
             pass --dry-run to skip the mirror step"
                .to_string(),
        ));
    };

    let mut store = DirectoryStore::new(mirror.clone());
    let upload = upload_directory(&mut store, &cli.output_directory)?;
    info!(
        "mirrored {} folder(s) and {} file(s) into {} ({} failure(s))",
        upload.folders_created,
        upload.files_uploaded,
        mirror.display(),
        upload.failures
    );
    Ok(())
}
