//! sharepoint-fs - command line access to a SharePoint document library
//!
//! Reads `sharepoint.toml` (or `SHAREPOINT_*` environment variables) and runs
//! one filesystem command against the configured library.

use env_logger;
use log::{error, info};
use std::process::ExitCode;

use sharepoint_fs::{AdapterConfig, FileEntry, Filesystem, GetUrl, SharepointAdapter, StorageError};

const USAGE: &str = "usage: sharepoint-fs <command> [args]

commands:
  ls [-r] [dir]        list a directory (recursively with -r)
  stat <path>          print metadata
  cat <path>           write file content to stdout
  put <path> <local>   upload a local file
  mkdir <path>         create a directory
  rm <path>            delete a file or empty directory
  rmdir <path>         delete a directory and its contents
  mv <from> <to>       move a file or directory
  cp <from> <to>       copy a file
  url <path>           print the object's URL";

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize the logger (env_logger picks up RUST_LOG environment variable)
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        eprintln!("{}", USAGE);
        return ExitCode::FAILURE;
    }

    let config = match AdapterConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            eprintln!("configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let adapter = match SharepointAdapter::new(&config) {
        Ok(adapter) => adapter,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut fs = Filesystem::new(adapter);
    fs.add_plugin(Box::new(GetUrl));

    match run(&fs, &args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(fs: &Filesystem, args: &[String]) -> Result<(), StorageError> {
    let arg = |i: usize| {
        args.get(i)
            .map(String::as_str)
            .ok_or_else(|| StorageError::InvalidPath(format!("missing argument\n\n{}", USAGE)))
    };

    match arg(0)? {
        "ls" => {
            let (recursive, dir) = match args.get(1).map(String::as_str) {
                Some("-r") => (true, args.get(2).map(String::as_str).unwrap_or("")),
                other => (false, other.unwrap_or("")),
            };
            print_entries(&fs.list_contents(dir, recursive).await?)
        }
        "stat" => print_entries(&[fs.get_metadata(arg(1)?).await?]),
        "cat" => {
            use tokio::io::AsyncWriteExt;

            let mut stream = fs.read_stream(arg(1)?).await?;
            let mut stdout = tokio::io::stdout();
            while let Some(chunk) = stream.next_chunk().await? {
                stdout.write_all(&chunk).await?;
            }
            stdout.flush().await?;
            Ok(())
        }
        "put" => {
            let mut file = tokio::fs::File::open(arg(2)?).await?;
            let entry = fs.write_stream(arg(1)?, &mut file).await?;
            info!("Uploaded {} bytes to {}", entry.size.unwrap_or(0), entry.path);
            print_entries(&[entry])
        }
        "mkdir" => print_entries(&[fs.create_dir(arg(1)?).await?]),
        "rm" => fs.delete(arg(1)?).await,
        "rmdir" => fs.delete_dir(arg(1)?).await,
        "mv" => fs.rename(arg(1)?, arg(2)?).await,
        "cp" => fs.copy(arg(1)?, arg(2)?).await,
        "url" => {
            println!("{}", fs.get_url(arg(1)?).await?);
            Ok(())
        }
        other => Err(StorageError::Unsupported(format!(
            "unknown command {}\n\n{}",
            other, USAGE
        ))),
    }
}

fn print_entries(entries: &[FileEntry]) -> Result<(), StorageError> {
    for entry in entries {
        let line = serde_json::to_string(entry)
            .map_err(|e| StorageError::Io(std::io::Error::other(e)))?;
        println!("{}", line);
    }
    Ok(())
}
