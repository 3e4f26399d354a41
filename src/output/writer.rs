//! Output writer

use crate::error::{Result, ResultExt};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::info;

/// Where generated text goes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OutputTarget {
    #[default]
    Stdout,
    File(PathBuf),
}

impl OutputTarget {
    /// File target when a path is given, stdout otherwise
    pub fn from_path(path: Option<&Path>) -> Self {
        match path {
            Some(path) => Self::File(path.to_path_buf()),
            None => Self::Stdout,
        }
    }
}

/// Write `text` to `target`; a file target is replaced
pub async fn write_output(target: &OutputTarget, text: &str) -> Result<()> {
    match target {
        OutputTarget::Stdout => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(text.as_bytes()).await?;
            stdout.flush().await?;
        }
        OutputTarget::File(path) => {
            tokio::fs::write(path, text)
                .await
                .with_context(|| format!("Failed to write '{}'", path.display()))?;
            info!("Wrote {} bytes to {}", text.len(), path.display());
        }
    }
    Ok(())
}
