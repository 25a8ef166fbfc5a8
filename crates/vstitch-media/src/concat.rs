//! Concatenation of per-hop clips into one video.

use std::path::Path;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// Name of the concat-demuxer list inside a working directory.
pub const CONCAT_LIST_NAME: &str = "vidlist.txt";

/// Name of the stitched output inside a working directory.
pub const OUTPUT_NAME: &str = "output.mp4";

/// Name of the `index`-th downloaded clip.
pub fn clip_file_name(index: usize) -> String {
    format!("{}.mp4", index)
}

/// One `file '<name>'` line, quoted for the concat demuxer.
pub fn concat_entry(file_name: &str) -> String {
    format!("file '{}'\n", file_name.replace('\'', r"'\''"))
}

/// Add `file_name` to the list at `list_path`. `truncate` starts a new list.
pub async fn append_concat_entry(list_path: &Path, file_name: &str, truncate: bool) -> MediaResult<()> {
    let mut options = tokio::fs::OpenOptions::new();
    if truncate {
        options.write(true).create(true).truncate(true);
    } else {
        options.append(true).create(true);
    }
    let mut file = options.open(list_path).await?;
    file.write_all(concat_entry(file_name).as_bytes()).await?;
    file.flush().await?;
    Ok(())
}

/// Joins the clips named in a concat list into one file.
#[async_trait]
pub trait Concatenator: Send + Sync {
    /// Concatenate the entries of `list` into `output`. Entries are
    /// resolved relative to the list's directory.
    async fn concat(&self, list: &Path, output: &Path) -> MediaResult<()>;
}

/// [`Concatenator`] that stream-copies with the ffmpeg concat demuxer.
#[derive(Debug, Clone, Default)]
pub struct FfmpegConcat {
    runner: FfmpegRunner,
}

impl FfmpegConcat {
    pub fn new(runner: FfmpegRunner) -> Self {
        Self { runner }
    }

    pub fn command(list: &Path, output: &Path) -> FfmpegCommand {
        FfmpegCommand::new(list, output).concat_demuxer().stream_copy()
    }
}

#[async_trait]
impl Concatenator for FfmpegConcat {
    async fn concat(&self, list: &Path, output: &Path) -> MediaResult<()> {
        if !list.exists() {
            return Err(MediaError::FileNotFound(list.to_path_buf()));
        }
        self.runner.run(&Self::command(list, output)).await?;
        info!(output = %output.display(), "Concatenated clips");
        Ok(())
    }
}
