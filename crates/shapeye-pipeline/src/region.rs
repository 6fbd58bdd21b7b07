//! Region of interest: the movable, resizable rectangle detection runs in.
//!
//! The rectangle is written by the input side (keyboard, scripted moves)
//! and read once per cycle by the processing side. Both may run on
//! different threads, so the whole rectangle is packed into a single
//! [`AtomicU64`] and replaced in one store. A reader always observes the
//! rectangle from before or after a move, never a mix of the two.
//!
//! Moves that would push the rectangle out of the frame, or shrink it to
//! nothing, are dropped rather than clamped.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::types::{PipelineError, Rect};

/// Largest frame dimension the packed representation can hold.
pub const MAX_FRAME_DIM: u32 = u16::MAX as u32;

/// Arrow direction of a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Towards `x = 0`.
    Left,
    /// Towards `y = 0`.
    Up,
    /// Towards `x = frame width`.
    Right,
    /// Towards `y = frame height`.
    Down,
}

/// What a move does to the rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Modifier {
    /// Translate the whole rectangle.
    #[default]
    None,
    /// Push the edge facing `direction` outwards.
    Grow,
    /// Pull the edge opposite `direction` inwards, moving it in
    /// `direction`.
    Shrink,
}

/// A single region update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveCommand {
    /// Which way the affected edge travels.
    pub direction: Direction,
    /// Translate, grow, or shrink.
    pub modifier: Modifier,
}

impl MoveCommand {
    /// Create a new command.
    #[must_use]
    pub const fn new(direction: Direction, modifier: Modifier) -> Self {
        Self {
            direction,
            modifier,
        }
    }

    /// Map an arrow key plus modifier keys to a command.
    ///
    /// `grow_held` (control on a desktop keyboard) takes precedence over
    /// `shrink_held` (alt).
    #[must_use]
    pub const fn from_arrow_key(direction: Direction, grow_held: bool, shrink_held: bool) -> Self {
        let modifier = if grow_held {
            Modifier::Grow
        } else if shrink_held {
            Modifier::Shrink
        } else {
            Modifier::None
        };
        Self::new(direction, modifier)
    }

    /// Map a legacy virtual key code (37..=40 for left, up, right, down)
    /// to a command. Other codes yield `None`.
    #[must_use]
    pub const fn from_key_code(code: u32, grow_held: bool, shrink_held: bool) -> Option<Self> {
        let direction = match code {
            37 => Direction::Left,
            38 => Direction::Up,
            39 => Direction::Right,
            40 => Direction::Down,
            _ => return None,
        };
        Some(Self::from_arrow_key(direction, grow_held, shrink_held))
    }
}

/// Owner of the region of interest and its update rules.
///
/// Shareable between threads via `Arc`; every method takes `&self`.
#[derive(Debug)]
pub struct RegionController {
    packed: AtomicU64,
    frame_width: u32,
    frame_height: u32,
    step: u32,
}

impl RegionController {
    /// Create a controller with the default region: one tenth of the frame
    /// in each dimension (at least one pixel), centred.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::FrameTooLarge`] if either dimension
    /// exceeds [`MAX_FRAME_DIM`].
    pub fn new(frame_width: u32, frame_height: u32, step: u32) -> Result<Self, PipelineError> {
        let width = (frame_width / 10).max(1).min(frame_width);
        let height = (frame_height / 10).max(1).min(frame_height);
        let roi = Rect::new(
            frame_width / 2 - width / 2,
            frame_height / 2 - height / 2,
            width,
            height,
        );
        Self::with_rect(frame_width, frame_height, step, roi)
    }

    /// Create a controller with an explicit starting region.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::FrameTooLarge`] if either frame dimension
    /// exceeds [`MAX_FRAME_DIM`], or [`PipelineError::RoiOutOfBounds`] if
    /// `roi` is empty or does not fit inside the frame.
    pub fn with_rect(
        frame_width: u32,
        frame_height: u32,
        step: u32,
        roi: Rect,
    ) -> Result<Self, PipelineError> {
        if frame_width > MAX_FRAME_DIM || frame_height > MAX_FRAME_DIM {
            return Err(PipelineError::FrameTooLarge {
                width: frame_width,
                height: frame_height,
            });
        }
        if roi.is_empty() || !roi.fits_within(frame_width, frame_height) {
            return Err(PipelineError::RoiOutOfBounds {
                roi,
                frame_width,
                frame_height,
            });
        }
        Ok(Self {
            packed: AtomicU64::new(pack(roi)),
            frame_width,
            frame_height,
            step,
        })
    }

    /// The region as of this call.
    #[must_use]
    pub fn current_rect(&self) -> Rect {
        unpack(self.packed.load(Ordering::Acquire))
    }

    /// Frame size the region is constrained to.
    #[must_use]
    pub const fn frame_size(&self) -> (u32, u32) {
        (self.frame_width, self.frame_height)
    }

    /// Step size in pixels.
    #[must_use]
    pub const fn step(&self) -> u32 {
        self.step
    }

    /// Check that a frame matches the size this controller was built for.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::FrameSizeMismatch`] otherwise.
    pub const fn check_frame(&self, width: u32, height: u32) -> Result<(), PipelineError> {
        if width == self.frame_width && height == self.frame_height {
            Ok(())
        } else {
            Err(PipelineError::FrameSizeMismatch {
                expected_width: self.frame_width,
                expected_height: self.frame_height,
                actual_width: width,
                actual_height: height,
            })
        }
    }

    /// Apply a move. Returns `true` if the region changed, `false` if the
    /// move was rejected and the region left as it was.
    pub fn apply_move(&self, command: MoveCommand) -> bool {
        self.packed
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
                moved(
                    unpack(bits),
                    command,
                    self.step,
                    self.frame_width,
                    self.frame_height,
                )
                .map(pack)
            })
            .is_ok()
    }
}

/// Compute the region after `command`, or `None` if the move is not
/// allowed.
///
/// For a frame `W x H`, translating or growing towards the left needs
/// `x >= step`; towards the right needs `x + width + step <= W` (likewise
/// for up/down). The region may end up flush with the frame edge.
/// Shrinking needs the affected dimension to exceed `step`.
fn moved(
    roi: Rect,
    command: MoveCommand,
    step: u32,
    frame_width: u32,
    frame_height: u32,
) -> Option<Rect> {
    let Rect {
        x,
        y,
        width,
        height,
    } = roi;
    let room_left = x >= step;
    let room_up = y >= step;
    let room_right = u64::from(x) + u64::from(width) + u64::from(step) <= u64::from(frame_width);
    let room_down = u64::from(y) + u64::from(height) + u64::from(step) <= u64::from(frame_height);

    let next = match (command.direction, command.modifier) {
        (Direction::Left, Modifier::None) if room_left => Rect::new(x - step, y, width, height),
        (Direction::Left, Modifier::Grow) if room_left => {
            Rect::new(x - step, y, width + step, height)
        }
        (Direction::Left, Modifier::Shrink) if width > step => {
            Rect::new(x, y, width - step, height)
        }
        (Direction::Up, Modifier::None) if room_up => Rect::new(x, y - step, width, height),
        (Direction::Up, Modifier::Grow) if room_up => Rect::new(x, y - step, width, height + step),
        (Direction::Up, Modifier::Shrink) if height > step => Rect::new(x, y, width, height - step),
        (Direction::Right, Modifier::None) if room_right => Rect::new(x + step, y, width, height),
        (Direction::Right, Modifier::Grow) if room_right => Rect::new(x, y, width + step, height),
        (Direction::Right, Modifier::Shrink) if width > step => {
            Rect::new(x + step, y, width - step, height)
        }
        (Direction::Down, Modifier::None) if room_down => Rect::new(x, y + step, width, height),
        (Direction::Down, Modifier::Grow) if room_down => Rect::new(x, y, width, height + step),
        (Direction::Down, Modifier::Shrink) if height > step => {
            Rect::new(x, y + step, width, height - step)
        }
        _ => return None,
    };

    debug_assert!(next.fits_within(frame_width, frame_height));
    Some(next)
}

/// Pack four `u16`-range fields into one word: x, y, width, height from
/// the high bits down.
fn pack(roi: Rect) -> u64 {
    let field = |v: u32| u64::from(v) & 0xFFFF;
    (field(roi.x) << 48) | (field(roi.y) << 32) | (field(roi.width) << 16) | field(roi.height)
}

#[allow(clippy::cast_possible_truncation)]
fn unpack(bits: u64) -> Rect {
    let field = |shift: u32| ((bits >> shift) & 0xFFFF) as u32;
    Rect::new(field(48), field(32), field(16), field(0))
}
