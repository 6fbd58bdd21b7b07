//! Scripted region moves, standing in for keyboard input.
//!
//! A move is written `<frame>:<direction>[+grow|+shrink]`, for example
//! `0:left`, `3:up+grow`, or `12:right+shrink`. Moves for frame `n` are
//! applied just before frame `n` is processed, in the order given.

use std::str::FromStr;

use shapeye_pipeline::{Direction, Modifier, MoveCommand, Rect};

/// A move bound to a frame index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledMove {
    /// Frame index the move applies before.
    pub frame: usize,
    /// The move itself.
    pub command: MoveCommand,
}

impl FromStr for ScheduledMove {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (frame, action) = s
            .split_once(':')
            .ok_or_else(|| format!("expected <frame>:<direction>[+modifier], got {s:?}"))?;
        let frame = frame
            .trim()
            .parse()
            .map_err(|e| format!("bad frame index in {s:?}: {e}"))?;
        let (direction, modifier) = action.split_once('+').unwrap_or((action, ""));

        let direction = match direction.trim().to_ascii_lowercase().as_str() {
            "left" => Direction::Left,
            "up" => Direction::Up,
            "right" => Direction::Right,
            "down" => Direction::Down,
            other => return Err(format!("unknown direction {other:?} in {s:?}")),
        };
        let modifier = match modifier.trim().to_ascii_lowercase().as_str() {
            "" => Modifier::None,
            "grow" => Modifier::Grow,
            "shrink" => Modifier::Shrink,
            other => return Err(format!("unknown modifier {other:?} in {s:?}")),
        };

        Ok(Self {
            frame,
            command: MoveCommand::new(direction, modifier),
        })
    }
}

/// Moves due before `frame`, in the order they were given.
pub fn due(moves: &[ScheduledMove], frame: usize) -> impl Iterator<Item = MoveCommand> + '_ {
    moves
        .iter()
        .filter(move |m| m.frame == frame)
        .map(|m| m.command)
}

/// Parse `x,y,width,height` into a rectangle.
///
/// # Errors
///
/// Returns a message if there are not exactly four unsigned integers.
pub fn parse_rect(s: &str) -> Result<Rect, String> {
    let fields: Vec<u32> = s
        .split(',')
        .map(|f| f.trim().parse::<u32>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("bad rectangle {s:?}: {e}"))?;
    match fields[..] {
        [x, y, width, height] => Ok(Rect::new(x, y, width, height)),
        _ => Err(format!("expected x,y,width,height, got {s:?}")),
    }
}
