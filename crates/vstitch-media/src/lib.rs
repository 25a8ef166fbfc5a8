//! FFmpeg CLI wrapper for joining downloaded clips.
//!
//! This crate provides:
//! - An FFmpeg command builder and runner
//! - The concat-demuxer list format and the [`Concatenator`] seam
//! - Working-directory helpers

pub mod command;
pub mod concat;
pub mod error;
pub mod fs_utils;

pub use command::{check_ffmpeg, FfmpegCommand, FfmpegRunner};
pub use concat::{
    append_concat_entry, clip_file_name, Concatenator, FfmpegConcat, CONCAT_LIST_NAME, OUTPUT_NAME,
};
pub use error::{MediaError, MediaResult};
pub use fs_utils::{ensure_dir, remove_dir_if_exists};
