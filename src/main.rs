// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Initialize tracing with the requested log level
// 3. Dispatch to the appropriate subcommand handler
// 4. Exit with proper code (0 = success, -1 = bad input files, 1 = error)
//
// The handlers own all file and network I/O; the keybindings and releases
// modules only ever see plain data (records, template text, API payloads).
//
// Rust concepts:
// - async/await: The releases subcommand talks to the GitHub API
// - Result<T, E>: For error handling (T = success type, E = error type)
// - match: Pattern matching to handle different subcommands
// =============================================================================

// Module declarations - tells Rust about our other source files
mod cli; // src/cli.rs - command-line parsing
mod keybindings; // src/keybindings/ - JSON -> LaTeX documentation generator
mod releases; // src/releases/ - GitHub release statistics

// Import items we need from our modules
use cli::{Cli, Commands};
use clap::Parser; // Parser trait enables the parse() method
use keybindings::RawKeybinding;
use releases::{OsDownloads, Release};

// anyhow::Result is like std::result::Result but simpler for applications
// It lets us return any error type with the ? operator
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// The #[tokio::main] attribute transforms our async main into a real main function
// It creates a tokio runtime and runs our async code inside it
#[tokio::main]
async fn main() {
    // Parse command-line arguments into our Cli struct
    // This will automatically handle --help, --version, etc.
    let cli = Cli::parse();

    // One subscriber for the whole process, level taken from --log-level
    // (RUST_LOG can still override individual targets)
    let filter = EnvFilter::builder()
        .with_default_directive(cli.log_level.level_filter().into())
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();

    // Run our application logic and capture the exit code
    // std::process::exit() terminates the program with the given code
    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            // If an unexpected error occurred, print it and exit with code 1
            eprintln!("Error: {:#}", e);
            1
        }
    };

    std::process::exit(exit_code);
}

// This is the main application logic
// Returns:
//   Ok(0) = success
//   Ok(-1) = missing or invalid input files
//   Err = fatal error (parse failures, HTTP errors, rendering errors)
async fn run(cli: Cli) -> Result<i32> {
    // Match on which subcommand was used
    match cli.command {
        Commands::Keybindings {
            keybindings,
            additional_input,
            output,
            template,
        } => handle_keybindings(&keybindings, &additional_input, &output, &template),
        Commands::Releases { owner, repo } => handle_releases(&owner, &repo).await,
    }
}

// Handles the 'keybindings' subcommand: read all JSON inputs, render the
// LaTeX tables, substitute them into the template and write the output
//
// Parameters:
//   keybindings: path to the primary keybindings.json
//   additional_input: further JSON files merged after the primary one
//   output: path of the .tex file to write
//   template: path of the template carrying the %{template} placeholder
fn handle_keybindings(
    keybindings: &Path,
    additional_input: &[PathBuf],
    output: &Path,
    template: &Path,
) -> Result<i32> {
    let mut file_paths: Vec<PathBuf> = Vec::new();

    // main input file
    if !keybindings.is_file() {
        error!(
            "The given json input file path '{}' is not a file or does not exist.",
            keybindings.display()
        );
        return Ok(-1);
    }
    file_paths.push(keybindings.to_path_buf());

    // additional input file(s); report every bad path before giving up
    let mut has_error = false;
    for additional_file_path in additional_input {
        if !additional_file_path.is_file() {
            has_error = true;
            error!(
                "The given additional json input file path '{}' is not a file or does not exist.",
                additional_file_path.display()
            );
        } else {
            file_paths.push(additional_file_path.clone());
        }
    }
    if has_error {
        return Ok(-1);
    }

    // read json from all input files; a parse error anywhere is fatal, so
    // no partial merge can slip through
    let mut records: Vec<RawKeybinding> = Vec::new();
    for file_path in &file_paths {
        let text = fs::read_to_string(file_path)
            .with_context(|| format!("reading '{}'", file_path.display()))?;
        let file_records: Vec<RawKeybinding> = serde_json::from_str(&text)
            .with_context(|| format!("parsing '{}'", file_path.display()))?;
        records.extend(file_records);
    }

    // read latex template file
    if !template.is_file() {
        error!(
            "The given .tex input template file path '{}' is not a file or does not exist.",
            template.display()
        );
        return Ok(-1);
    }
    let template_text = fs::read_to_string(template)
        .with_context(|| format!("reading '{}'", template.display()))?;

    let document = keybindings::render_document(records, &template_text)?;

    info!("Writing output file: {}", output.display());
    fs::write(output, document).with_context(|| format!("writing '{}'", output.display()))?;

    info!("Done!");
    Ok(0)
}

// Handles the 'releases' subcommand: fetch every release page and print
// the download statistics report
async fn handle_releases(owner: &str, repo: &str) -> Result<i32> {
    let releases = releases::fetch_releases(owner, repo).await?;
    print_report(&releases);
    Ok(0)
}

// Prints the release statistics report to stdout
//
// Layout: one line per release with its assets indented below it, then a
// separator, the grand total, and the per-OS breakdown with percentages.
fn print_report(releases: &[Release]) {
    let mut total_downloads: u64 = 0;

    for release in releases {
        let downloads = release.total_downloads();
        total_downloads += downloads;
        println!(
            "{}: {} [{}]",
            release.display_name(),
            downloads,
            release.published_at.as_deref().unwrap_or("unpublished")
        );
        for asset in &release.assets {
            println!("    - {}: {}", asset.display_name(), asset.download_count);
        }
    }

    // ---- totals
    println!("{}\nTotal: {}", "-".repeat(79), total_downloads);

    let mut total_per_os = OsDownloads::default();
    for release in releases {
        total_per_os += release.downloads_per_os();
    }

    println!("Total per OS:");
    for (os_name, count) in total_per_os.named() {
        if total_downloads > 0 {
            let percent = (count as f64 / total_downloads as f64) * 100.0;
            println!("    - {}: {} [{:.2}%]", os_name, count, percent);
        } else {
            println!("    - {}: {}", os_name, count);
        }
    }
}
