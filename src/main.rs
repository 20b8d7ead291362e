// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use scan_camera::Config;
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "scan-camera")]
#[command(about = "Scan barcodes and QR codes from a camera or image files")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.config/scan-camera/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the cameras of an image source directory
    List {
        /// Directory of images, one virtual camera per image
        #[arg(short, long)]
        source: PathBuf,
    },

    /// Decode a single image file
    ScanImage {
        /// Image to decode
        file: PathBuf,
    },

    /// Run the scanner on a virtual camera source
    Scan {
        /// Directory of images, one virtual camera per image
        #[arg(short, long)]
        source: PathBuf,

        /// Device id to scan with (from 'scan-camera list')
        #[arg(short, long)]
        device: Option<String>,

        /// Scanning duration in seconds
        #[arg(long, default_value = "5")]
        duration: u64,

        /// Turn the torch on if the camera has one
        #[arg(short, long)]
        torch: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set RUST_LOG to control the log level, e.g. RUST_LOG=scan_camera=debug
    scan_camera::platform::ensure_initialized();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(),
    };

    match cli.command {
        Commands::List { source } => cli::list_cameras(&source, &config),
        Commands::ScanImage { file } => cli::scan_image(&file),
        Commands::Scan {
            source,
            device,
            duration,
            torch,
        } => cli::scan(&source, device, duration, torch, config),
    }
}
