//! S3 command handlers
//!
//! Handles directory bucket lifecycle, single-request puts and multipart
//! uploads through the runner's uploader.

use anyhow::{Context, Result};
use cirrus_client::{DirectoryBucketClient, MultipartStore, load_sdk_config};
use cirrus_runner::MultipartUploader;
use clap::Subcommand;
use colored::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::config::Config;

/// S3 subcommands
#[derive(Subcommand)]
pub enum S3Commands {
    /// Create a directory bucket (name: <base>--<zone-id>--x-s3)
    CreateBucket {
        /// Bucket name
        bucket: String,
    },
    /// Upload a file with a multipart upload
    Upload {
        /// Bucket name
        bucket: String,

        /// Local file to upload
        file: PathBuf,

        /// Object key (defaults to the file name)
        #[arg(long)]
        key: Option<String>,

        /// Part size in MiB (at least 5)
        #[arg(long)]
        part_size_mb: Option<u64>,

        /// Number of parts uploaded at once
        #[arg(long)]
        concurrency: Option<usize>,
    },
    /// Upload a small file in a single request
    PutObject {
        /// Bucket name
        bucket: String,

        /// Local file to upload
        file: PathBuf,

        /// Object key (defaults to the file name)
        #[arg(long)]
        key: Option<String>,
    },
    /// List multipart uploads left open in a bucket
    ListUploads {
        /// Bucket name
        bucket: String,
    },
    /// Abort an open multipart upload
    AbortUpload {
        /// Bucket name
        bucket: String,

        /// Object key
        key: String,

        /// Upload id
        upload_id: String,
    },
    /// Delete an object
    DeleteObject {
        /// Bucket name
        bucket: String,

        /// Object key
        key: String,
    },
    /// Delete an empty directory bucket
    DeleteBucket {
        /// Bucket name
        bucket: String,
    },
}

/// Handle S3 commands
///
/// # Arguments
/// * `command` - The S3 command to execute
/// * `config` - The CLI configuration
pub async fn handle_s3_command(command: S3Commands, config: &Config) -> Result<()> {
    let sdk_config = load_sdk_config(config.region.clone()).await;

    match command {
        S3Commands::CreateBucket { bucket } => {
            let client = DirectoryBucketClient::new(&sdk_config, bucket);
            client
                .create_bucket()
                .await
                .with_context(|| format!("Failed to create bucket {}", client.bucket()))?;
            println!("{} Created bucket {}", "✓".green(), client.bucket().bold());
            Ok(())
        }
        S3Commands::Upload {
            bucket,
            file,
            key,
            part_size_mb,
            concurrency,
        } => {
            let client = DirectoryBucketClient::new(&sdk_config, bucket);
            upload(client, config, &file, key, part_size_mb, concurrency).await
        }
        S3Commands::PutObject { bucket, file, key } => {
            let client = DirectoryBucketClient::new(&sdk_config, bucket);
            let key = object_key(&file, key)?;
            let body = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let etag = client.put_object(&key, body).await?;

            println!("{} Uploaded s3://{}/{}", "✓".green(), client.bucket(), key.bold());
            if let Some(etag) = etag {
                println!("    ETag: {}", etag.dimmed());
            }
            Ok(())
        }
        S3Commands::ListUploads { bucket } => {
            let client = DirectoryBucketClient::new(&sdk_config, bucket);
            let uploads = client.list_multipart_uploads().await?;

            if uploads.is_empty() {
                println!("{}", "No open multipart uploads.".yellow());
            } else {
                println!(
                    "{}",
                    format!("Found {} open multipart upload(s):", uploads.len()).bold()
                );
                println!();
                for upload in uploads {
                    println!("  {} {}", "▸".cyan(), upload.key.bold());
                    println!("    Upload ID: {}", upload.upload_id.dimmed());
                    if let Some(initiated) = upload.initiated {
                        println!("    Initiated: {}", initiated.dimmed());
                    }
                    println!();
                }
            }
            Ok(())
        }
        S3Commands::AbortUpload {
            bucket,
            key,
            upload_id,
        } => {
            let client = DirectoryBucketClient::new(&sdk_config, bucket);
            match client.abort_upload(&key, &upload_id).await {
                Ok(()) => {
                    println!("{} Aborted upload {} of {}", "✓".green(), upload_id, key.bold());
                    Ok(())
                }
                Err(err) if err.is_not_found() => {
                    println!(
                        "{}",
                        format!("Upload {} is already gone.", upload_id).yellow()
                    );
                    Ok(())
                }
                Err(err) => {
                    Err(err).with_context(|| format!("Failed to abort upload {}", upload_id))
                }
            }
        }
        S3Commands::DeleteObject { bucket, key } => {
            let client = DirectoryBucketClient::new(&sdk_config, bucket);
            client.delete_object(&key).await?;
            println!("{} Deleted s3://{}/{}", "✓".green(), client.bucket(), key.bold());
            Ok(())
        }
        S3Commands::DeleteBucket { bucket } => {
            let client = DirectoryBucketClient::new(&sdk_config, bucket);
            client.delete_bucket().await?;
            println!("{} Deleted bucket {}", "✓".green(), client.bucket().bold());
            Ok(())
        }
    }
}

async fn upload(
    client: DirectoryBucketClient,
    config: &Config,
    file: &Path,
    key: Option<String>,
    part_size_mb: Option<u64>,
    concurrency: Option<usize>,
) -> Result<()> {
    let key = object_key(file, key)?;

    let mut transfer = config.transfer.clone();
    if let Some(mb) = part_size_mb {
        transfer = transfer.with_part_size_mb(mb)?;
    }
    if let Some(concurrency) = concurrency {
        transfer = transfer.with_max_concurrent_parts(concurrency);
    }
    transfer.validate()?;
    info!(
        "Uploading {} as {} ({} byte parts, {} at a time)",
        file.display(),
        key,
        transfer.part_size,
        transfer.max_concurrent_parts
    );

    let bucket = client.bucket().to_string();
    let uploader = MultipartUploader::new(Arc::new(client), transfer);
    let summary = uploader
        .upload_file(file, &key)
        .await
        .with_context(|| format!("Failed to upload {}", file.display()))?;

    println!(
        "{} Uploaded {} to s3://{}/{}",
        "✓".green(),
        file.display(),
        bucket,
        summary.key.bold()
    );
    println!(
        "    {} bytes in {} part(s), upload {}",
        summary.size,
        summary.parts,
        summary.upload_id.dimmed()
    );
    Ok(())
}

/// Uses the explicit key, or the file name when none is given
fn object_key(file: &Path, key: Option<String>) -> Result<String> {
    match key {
        Some(key) => Ok(key),
        None => file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .with_context(|| format!("Cannot derive an object key from {}", file.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key_defaults_to_file_name() {
        let key = object_key(Path::new("/tmp/videos/clip.mp4"), None).unwrap();
        assert_eq!(key, "clip.mp4");

        let key = object_key(Path::new("clip.mp4"), Some("media/clip.mp4".to_string())).unwrap();
        assert_eq!(key, "media/clip.mp4");

        assert!(object_key(Path::new("/"), None).is_err());
    }
}
