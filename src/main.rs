use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use zip_as_png::png::is_png_signature;
use zip_as_png::{cli, embed, extract, from_base64, from_data_url, generate_html, inspect, to_base64, to_data_url, validate_container};

#[derive(Parser)]
#[command(name = "zip-as-png")]
#[command(about = "Embed ZIP archives in PNG images and get them back")]
struct Cli {
    /// Verbose output (also raises the log level to info)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Embed a ZIP archive into a PNG image
    Embed {
        /// Path to input ZIP file
        #[arg(short, long)]
        zip: PathBuf,

        /// Path to input PNG file
        #[arg(short, long)]
        png: PathBuf,

        /// Path for the output PNG container
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Recover the ZIP archive from a PNG container
    Extract {
        /// Path to PNG container
        #[arg(short, long)]
        input: PathBuf,

        /// Path for extracted ZIP file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Check that a file decodes as a PNG and carries a readable ZIP
    Validate {
        /// Path to potential container file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Package a ZIP and its thumbnail as a standalone HTML page
    Html {
        /// Path to input ZIP file
        #[arg(short, long)]
        zip: PathBuf,

        /// Path to thumbnail PNG file
        #[arg(short, long)]
        png: PathBuf,

        /// Path for the HTML document
        #[arg(short, long)]
        output: PathBuf,

        /// Name shown in the page and used for downloads (defaults to the ZIP file name)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Print a file as a Base64 data URL
    Encode {
        /// Path to the file to encode
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Decode a Base64 string or data URL back to bytes
    Decode {
        /// Path to a file holding the Base64 text or data URL
        #[arg(short, long)]
        input: PathBuf,

        /// Path for the decoded bytes
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Embed { zip, png, output } => {
            println!("Embedding {} into {} -> {}", zip.display(), png.display(), output.display());
            run_embed(&zip, &png, &output)?;
            println!("PNG container created successfully!");
        }

        Commands::Extract { input, output } => {
            println!("Extracting ZIP from {} -> {}", input.display(), output.display());
            let size = run_extract(&input, &output)?;
            println!("ZIP extracted successfully! ({} bytes)", size);
        }

        Commands::Validate { input } => {
            println!("Validating container: {}", input.display());
            let data = read_file(&input)?;
            println!("{}", validate_container(&data));

            if cli.verbose {
                print_report(&data);
            }
        }

        Commands::Html { zip, png, output, name } => {
            let name = name.unwrap_or_else(|| cli::document_name(&zip));
            println!("Packaging {} with thumbnail {} -> {}", zip.display(), png.display(), output.display());
            run_html(&zip, &png, &output, &name)?;
            println!("HTML document created successfully!");
        }

        Commands::Encode { input } => {
            let data = read_file(&input)?;
            println!("{}", to_data_url(&data, Some(guess_mime_type(&data))));
        }

        Commands::Decode { input, output } => {
            let size = run_decode(&input, &output)?;
            println!("Decoded {} bytes -> {}", size, output.display());
        }
    }

    Ok(())
}

/// Default level `warn`, `info` with `--verbose`, `RUST_LOG` wins over both
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn write_file(path: &Path, data: &[u8]) -> Result<()> {
    fs::write(path, data).with_context(|| format!("Failed to write {}", path.display()))
}

fn run_embed(zip_path: &Path, png_path: &Path, output_path: &Path) -> Result<()> {
    let zip = read_file(zip_path)?;
    let png = read_file(png_path)?;

    let container = embed(&zip, &png)
        .with_context(|| format!("Cannot embed {} into {}", zip_path.display(), png_path.display()))?;
    info!(bytes = container.len(), "container built");

    write_file(output_path, &container)
}

fn run_extract(input_path: &Path, output_path: &Path) -> Result<usize> {
    let container = read_file(input_path)?;

    let zip = extract(&container)
        .with_context(|| format!("Cannot extract a ZIP from {}", input_path.display()))?;
    info!(bytes = zip.len(), "archive recovered");

    write_file(output_path, &zip)?;
    Ok(zip.len())
}

fn run_html(zip_path: &Path, png_path: &Path, output_path: &Path, name: &str) -> Result<()> {
    let zip = read_file(zip_path)?;
    let png = read_file(png_path)?;

    // The page embeds client-side; a pair that fails here fails there too
    if let Err(e) = embed(&zip, &png) {
        warn!(error = %e, "archive and thumbnail cannot be embedded, the page's PNG download will fail");
    }

    let html = generate_html(&to_base64(&zip), &to_base64(&png), name);
    write_file(output_path, html.as_bytes())
}

fn run_decode(input_path: &Path, output_path: &Path) -> Result<usize> {
    let text = fs::read_to_string(input_path)
        .with_context(|| format!("Failed to read {}", input_path.display()))?;
    let text = text.trim();

    let data = if text.starts_with("data:") {
        from_data_url(text)
    } else {
        from_base64(text)
    }
    .with_context(|| format!("Cannot decode {}", input_path.display()))?;

    write_file(output_path, &data)?;
    Ok(data.len())
}

fn guess_mime_type(data: &[u8]) -> &'static str {
    if is_png_signature(data) {
        "image/png"
    } else if data.starts_with(b"PK") {
        "application/zip"
    } else {
        "application/octet-stream"
    }
}

fn print_report(data: &[u8]) {
    println!("Detailed validation information:");

    match inspect(data) {
        Ok(report) => {
            println!("  Chunk offset:    {}", report.chunk.offset);
            println!("  Payload length:  {} bytes", report.chunk.length);
            match report.stored_crc {
                Some(crc) => println!("  Stored CRC:      {:#010x}", crc),
                None => println!("  Stored CRC:      (missing)"),
            }
            println!(
                "  Computed CRC:    {:#010x}{}",
                report.computed_crc,
                if report.crc_matches() { "" } else { " (mismatch)" }
            );
            println!("  ZIP entries:     {}", report.num_entries);
            println!("  Central dir:     {} bytes", report.cd_size);
        }
        Err(e) => println!("  No container details: {}", e),
    }
}
