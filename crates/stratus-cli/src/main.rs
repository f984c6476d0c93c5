//! Stratus CLI — exercise the storage backends from the command line.
//!
//! Configuration comes from the environment (or a `.env` file): set
//! STORAGE_BACKEND plus the OSS_* or LOCAL_STORAGE_* settings.

use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use stratus_cli::{human_size, init_tracing};
use stratus_core::{generate_key, Config, Disposition, Filename};
use stratus_storage::{checksum, create_storage, UrlOptions};

#[derive(Parser)]
#[command(name = "stratus", about = "Stratus blob storage CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a file
    Upload {
        /// Path to the file to upload
        file: std::path::PathBuf,
        /// Storage key; generated when omitted
        #[arg(long)]
        key: Option<String>,
        /// MIME type of the file
        #[arg(long, default_value = "application/octet-stream")]
        content_type: String,
        /// Requested disposition: inline or attachment
        #[arg(long, default_value = "inline")]
        disposition: String,
    },
    /// Download an object
    Download {
        /// Storage key
        key: String,
        /// Output file; stdout when omitted
        #[arg(long)]
        output: Option<std::path::PathBuf>,
    },
    /// Delete an object
    Delete {
        /// Storage key
        key: String,
    },
    /// Delete every object under a key prefix
    DeletePrefixed {
        /// Key prefix
        prefix: String,
    },
    /// Check whether an object exists
    Exists {
        /// Storage key
        key: String,
    },
    /// Get the size of an object
    Stat {
        /// Storage key
        key: String,
    },
    /// Generate a download URL
    Url {
        /// Storage key
        key: String,
        /// URL validity in seconds (presigned URLs only)
        #[arg(long)]
        expires_in: Option<u64>,
        /// Download filename (backends with disposition control only)
        #[arg(long)]
        filename: Option<String>,
        /// MIME type to serve with
        #[arg(long)]
        content_type: Option<String>,
        /// Requested disposition: inline or attachment
        #[arg(long, default_value = "inline")]
        disposition: String,
    },
    /// Generate a presigned direct-upload URL
    PresignUpload {
        /// Storage key
        key: String,
        /// MIME type the client will send
        #[arg(long, default_value = "application/octet-stream")]
        content_type: String,
        /// Base64 MD5 checksum the client must send
        #[arg(long)]
        checksum: Option<String>,
        /// URL validity in seconds
        #[arg(long)]
        expires_in: Option<u64>,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = Config::from_env();
    let storage = create_storage(&config)
        .await
        .context("Failed to create storage backend. Check STORAGE_BACKEND and its settings")?;

    match cli.command {
        Commands::Upload {
            file,
            key,
            content_type,
            disposition,
        } => {
            let disposition: Disposition = disposition.parse()?;
            let data = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Read {}", file.display()))?;
            let checksum = checksum::base64_md5(&data);
            let size = data.len() as u64;

            let filename = file
                .file_name()
                .map(|name| Filename::new(name.to_string_lossy()));
            let key = key.unwrap_or_else(|| {
                generate_key(
                    filename.as_ref(),
                    Some(&content_type),
                    disposition,
                    storage.supports_serving_disposition(),
                )
            });

            storage
                .upload(&key, &content_type, data, Some(checksum.as_str()))
                .await?;

            print_json(&serde_json::json!({
                "key": key,
                "size": size,
                "size_human": human_size(size),
                "checksum": checksum,
            }))?;
        }
        Commands::Download { key, output } => {
            let data = storage.download(&key).await?;
            match output {
                Some(path) => {
                    tokio::fs::write(&path, &data)
                        .await
                        .with_context(|| format!("Write {}", path.display()))?;
                    print_json(&serde_json::json!({
                        "key": key,
                        "output": path,
                        "size": data.len(),
                    }))?;
                }
                None => {
                    use tokio::io::AsyncWriteExt;
                    tokio::io::stdout().write_all(&data).await?;
                }
            }
        }
        Commands::Delete { key } => {
            storage.delete(&key).await?;
            print_json(&serde_json::json!({ "deleted": key }))?;
        }
        Commands::DeletePrefixed { prefix } => {
            storage.delete_prefixed(&prefix).await?;
            print_json(&serde_json::json!({ "deleted_prefix": prefix }))?;
        }
        Commands::Exists { key } => {
            let exists = storage.exists(&key).await?;
            print_json(&serde_json::json!({ "key": key, "exists": exists }))?;
        }
        Commands::Stat { key } => {
            let size = storage.content_length(&key).await?;
            print_json(&serde_json::json!({
                "key": key,
                "size": size,
                "size_human": human_size(size),
            }))?;
        }
        Commands::Url {
            key,
            expires_in,
            filename,
            content_type,
            disposition,
        } => {
            let opts = UrlOptions {
                expires_in: Duration::from_secs(expires_in.unwrap_or(config.url_expiry_secs())),
                disposition: disposition.parse()?,
                filename: filename.map(Filename::new),
                content_type,
            };
            let url = storage.url(&key, &opts).await?;
            print_json(&serde_json::json!({ "key": key, "url": url }))?;
        }
        Commands::PresignUpload {
            key,
            content_type,
            checksum,
            expires_in,
        } => {
            let presigned = storage
                .presign_upload(
                    &key,
                    &content_type,
                    checksum.as_deref(),
                    Duration::from_secs(expires_in.unwrap_or(config.url_expiry_secs())),
                )
                .await?;
            print_json(&presigned)?;
        }
    }

    Ok(())
}
