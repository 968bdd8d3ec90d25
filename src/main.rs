use clap::{Parser, Subcommand};
use log::LevelFilter;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;
use zarr_checksum_listing::checksum::aggregate_digest;
use zarr_checksum_listing::errors::ManifestError;
use zarr_checksum_listing::manifest::tree_from_manifest;
use zarr_checksum_listing::{ChecksumListing, ListingError, ParseError};

/// Compute and check Zarr checksum listings
#[derive(Clone, Debug, Eq, Parser, PartialEq)]
#[command(version)]
struct Arguments {
    /// Set the logging level
    #[arg(
        short,
        long,
        default_value = "WARN",
        value_name = "OFF|ERROR|WARN|INFO|DEBUG|TRACE"
    )]
    log_level: LevelFilter,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, Eq, PartialEq, Subcommand)]
enum Command {
    /// Compute the checksum of a Zarr from an `md5sum`-style manifest of its
    /// files
    Tree {
        /// Also print the checksum listing for each nonempty directory
        #[arg(long)]
        listings: bool,

        /// Also print the tree of entry names and checksums
        #[arg(long)]
        show: bool,

        /// The manifest to read; use `-` for standard input
        manifest: PathBuf,
    },
    /// Check that a checksum listing's digest matches its entries
    Verify {
        /// The listing to check; use `-` for standard input
        listing: PathBuf,
    },
    /// Recompute the digest of a checksum listing from its entries
    Digest {
        /// The listing to read; use `-` for standard input
        listing: PathBuf,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error("failed to read input: {0}")]
    Read(#[from] io::Error),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Listing(#[from] ListingError),
}

fn main() -> ExitCode {
    let args = Arguments::parse();
    init_logging(args.log_level);
    match run(args.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("zarr-checksum-listing: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<(), CliError> {
    match command {
        Command::Tree {
            listings,
            show,
            manifest,
        } => {
            let tree = tree_from_manifest(open_input(&manifest)?)?;
            if show {
                print!("{}", tree.to_termtree());
            }
            if listings {
                for (dirpath, listing) in tree.listings() {
                    println!("{dirpath}\t{}", listing.to_json());
                }
            }
            println!("{}", tree.checksum());
        }
        Command::Verify { listing } => {
            let listing = read_listing(&listing)?;
            listing.verify()?;
            println!("OK {}", listing.digest());
        }
        Command::Digest { listing } => {
            let listing = read_listing(&listing)?;
            println!("{}", aggregate_digest(listing.checksums()));
        }
    }
    Ok(())
}

fn init_logging(level: LevelFilter) {
    let r = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{:<5}] {}: {}",
                record.level(),
                record.target(),
                message
            ));
        })
        .level(level)
        .chain(io::stderr())
        .apply();
    if let Err(e) = r {
        eprintln!("zarr-checksum-listing: failed to initialize logging: {e}");
    }
}

fn open_input(path: &Path) -> io::Result<Box<dyn BufRead>> {
    if path == Path::new("-") {
        Ok(Box::new(io::stdin().lock()))
    } else {
        Ok(Box::new(BufReader::new(fs_err::File::open(path)?)))
    }
}

fn read_listing(path: &Path) -> Result<ChecksumListing, CliError> {
    let mut s = String::new();
    open_input(path)?.read_to_string(&mut s)?;
    Ok(ChecksumListing::from_json(&s)?)
}
