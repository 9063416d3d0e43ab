use std::{io::ErrorKind, path::PathBuf};

use anyhow::{Context, Result};
use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt},
};
use tracing::debug;

use super::NameNormalizer;

/// Keeps the name table in a single JSON document. The table is small and curated by hand, so
/// every update rewrites the whole file.
pub struct NameTableFile {
    path: PathBuf,
}

impl NameTableFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Reads the table. A file that doesn't exist yet is an empty table.
    pub async fn load(&self) -> Result<NameNormalizer> {
        let mut file = match File::open(&self.path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No name table at {:?}, starting empty", self.path);
                return Ok(NameNormalizer::new());
            }
            Err(e) => Err(e)?,
        };

        file.lock_shared()?;
        let mut content = String::new();
        let read = file.read_to_string(&mut content).await;
        file.unlock_async().await?;
        read?;

        if content.trim().is_empty() {
            return Ok(NameNormalizer::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    /// Applies `change` to the stored table and writes the result back. The file stays under an
    /// exclusive lock from the read to the write, so concurrent updates are applied one after
    /// another instead of overwriting each other.
    pub async fn update<F>(&self, change: F) -> Result<NameNormalizer>
    where
        F: FnOnce(&mut NameNormalizer),
    {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = File::options()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .await?;

        file.lock_exclusive()?;
        let result = async {
            let mut content = String::new();
            file.read_to_string(&mut content).await?;
            let mut names = if content.trim().is_empty() {
                NameNormalizer::new()
            } else {
                serde_json::from_str(&content)
                    .with_context(|| format!("Malformed name table at {:?}", self.path))?
            };

            change(&mut names);

            file.set_len(0).await?;
            file.rewind().await?;
            file.write_all(&serde_json::to_vec_pretty(&names)?).await?;
            file.flush().await?;
            Ok::<_, anyhow::Error>(names)
        }
        .await;
        file.unlock_async().await?;
        result
    }
}
