use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;

use photo_gallery::camera::ImportCamera;
use photo_gallery::config::{Config, CONFIG_ENV};
use photo_gallery::logging;
use photo_gallery::storage::{BlobStore, FsBlobStore, SqliteKvStore};
use photo_gallery::{create_platform, PhotoGallery, PlatformKind, UserPhoto};

enum Command {
    List,
    Capture(String),
    Manifest,
}

struct Args {
    config_path: Option<PathBuf>,
    platform: Option<PlatformKind>,
    command: Command,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut config_path = None;
    let mut platform = None;
    let mut command = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("photo-gallery {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                } else {
                    eprintln!("Error: --config requires a path argument");
                    std::process::exit(1);
                }
            }
            "--platform" | "-p" => {
                if i + 1 < args.len() {
                    match args[i + 1].parse::<PlatformKind>() {
                        Ok(kind) => platform = Some(kind),
                        Err(e) => {
                            eprintln!("Error: {}", e);
                            std::process::exit(1);
                        }
                    }
                    i += 1;
                } else {
                    eprintln!("Error: --platform requires 'hybrid' or 'web'");
                    std::process::exit(1);
                }
            }
            "list" if command.is_none() => command = Some(Command::List),
            "manifest" if command.is_none() => command = Some(Command::Manifest),
            "capture" if command.is_none() => {
                if i + 1 < args.len() {
                    command = Some(Command::Capture(args[i + 1].clone()));
                    i += 1;
                } else {
                    eprintln!("Error: capture requires a SOURCE file or url");
                    std::process::exit(1);
                }
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    Args {
        config_path,
        platform,
        command: command.unwrap_or(Command::List),
    }
}

fn print_help() {
    println!(
        r#"photo-gallery - capture photos and reload the saved gallery

USAGE:
    photo-gallery [OPTIONS] [COMMAND]

COMMANDS:
    list                Load and print the saved gallery (default)
    capture SOURCE      Capture SOURCE (file path or url) into the gallery
    manifest            Print the stored manifest as-is

OPTIONS:
    --config, -c PATH       Path to config file
    --platform, -p KIND     Override the platform: hybrid or web
    --version, -V           Show version
    --help, -h              Show this help message

ENVIRONMENT:
    {}    Path to config file (overrides default location)
    PHOTO_GALLERY_LOG       Log level (trace, debug, info, warn, error)

Config file location: $XDG_CONFIG_HOME/photo-gallery/config.toml"#,
        CONFIG_ENV
    );
}

/// Keep data URLs readable on a terminal.
fn short_ref(reference: &str) -> String {
    const MAX: usize = 72;
    if reference.chars().count() <= MAX {
        reference.to_string()
    } else {
        let head: String = reference.chars().take(MAX).collect();
        format!("{}...", head)
    }
}

fn print_photo(index: usize, photo: &UserPhoto) {
    println!("{:>3}  {}", index, photo.filepath);
    if let Some(ref webview) = photo.webview_path {
        println!("     -> {}", short_ref(webview));
    }
}

fn main() -> Result<()> {
    let args = parse_args();

    let _ = logging::init(Some(Config::config_dir().join("logs")));

    let mut config = match args.config_path {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(kind) = args.platform {
        config.platform = kind;
    }

    let blobs: Arc<dyn BlobStore> = Arc::new(FsBlobStore::new(
        config.storage.data_dir.clone(),
        config.storage.cache_dir.clone(),
    ));
    let store = Arc::new(SqliteKvStore::open(&config.storage.kv_path)?);

    // Only `capture` ever asks the camera for a photo.
    let source = match args.command {
        Command::Capture(ref source) => source.clone(),
        _ => String::new(),
    };
    let camera = Arc::new(ImportCamera::new(source, blobs.clone()));
    let platform = create_platform(&config, camera, blobs);

    let mut gallery = PhotoGallery::new(platform, store, config.storage.manifest_key.clone())
        .with_capture_options(config.capture);

    match args.command {
        Command::List => {
            gallery.load_saved()?;
            if gallery.photos().is_empty() {
                println!("No photos yet.");
            }
            for (i, photo) in gallery.photos().iter().enumerate() {
                print_photo(i, photo);
            }
        }
        Command::Capture(_) => {
            gallery.load_saved()?;
            let photo = gallery.take_photo()?.clone();
            print_photo(0, &photo);
        }
        Command::Manifest => match gallery.stored_manifest()? {
            Some(manifest) => println!("{}", manifest),
            None => println!("[]"),
        },
    }

    Ok(())
}
