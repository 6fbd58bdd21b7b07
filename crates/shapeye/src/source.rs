//! Frame sources: where the processing loop gets its frames from.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use shapeye_pipeline::Frame;

/// A supplier of frames, one per cycle.
pub trait FrameSource {
    /// Fetch the next frame.
    ///
    /// Returns `None` once the source is exhausted, `Some(Err(_))` if a
    /// frame exists but could not be read. A failed read does not end the
    /// source.
    fn next_frame(&mut self) -> Option<Result<Frame>>;
}

/// Still images read from disk in order, optionally replayed several
/// times to simulate a longer stream.
#[derive(Debug)]
pub struct ImageSequence {
    paths: Vec<PathBuf>,
    passes: usize,
    position: usize,
}

impl ImageSequence {
    /// Build a sequence from files and directories. Directories contribute
    /// every regular file they contain, sorted by name.
    ///
    /// # Errors
    ///
    /// Fails if a directory cannot be listed or no file was found.
    pub fn from_inputs(inputs: &[PathBuf], passes: usize) -> Result<Self> {
        let mut paths = Vec::new();
        for input in inputs {
            if input.is_dir() {
                paths.extend(list_dir(input)?);
            } else {
                paths.push(input.clone());
            }
        }
        if paths.is_empty() {
            bail!("no input images found");
        }
        Ok(Self {
            paths,
            passes: passes.max(1),
            position: 0,
        })
    }

    /// Total number of frames the sequence will yield.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len() * self.passes
    }
}

impl FrameSource for ImageSequence {
    fn next_frame(&mut self) -> Option<Result<Frame>> {
        if self.position >= self.len() {
            return None;
        }
        let path = &self.paths[self.position % self.paths.len()];
        self.position += 1;
        Some(read_frame(path))
    }
}

fn read_frame(path: &Path) -> Result<Frame> {
    let image = image::open(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok(image.to_rgb8())
}

fn list_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("failed to list {}", dir.display()))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("failed to list {}", dir.display()))?
            .path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
