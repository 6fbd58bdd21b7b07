//! Frame sinks: where annotated frames go once a cycle is done.

use std::path::PathBuf;

use anyhow::{Context, Result};
use shapeye_pipeline::Frame;

/// A consumer of annotated frames.
pub trait FrameSink {
    /// Hand over the annotated frame of cycle `index`.
    fn write_frame(&mut self, index: usize, frame: &Frame) -> Result<()>;
}

/// Writes each frame as `frame_NNNNN.png` into a directory.
#[derive(Debug)]
pub struct PngDirectory {
    dir: PathBuf,
}

impl PngDirectory {
    /// Create the directory if needed.
    ///
    /// # Errors
    ///
    /// Fails if the directory cannot be created.
    pub fn create(dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        Ok(Self { dir })
    }
}

impl FrameSink for PngDirectory {
    fn write_frame(&mut self, index: usize, frame: &Frame) -> Result<()> {
        let path = self.dir.join(format!("frame_{index:05}.png"));
        frame
            .save(&path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::debug!("wrote {}", path.display());
        Ok(())
    }
}
