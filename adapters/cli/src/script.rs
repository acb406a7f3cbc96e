//! Parser for headless input scripts.
//!
//! Each symbol is one simulation step:
//!
//! | Symbol | Input |
//! |--------|-------|
//! | `U` `^` | steer up |
//! | `D` `v` | steer down |
//! | `L` `<` | steer left |
//! | `R` `>` | steer right |
//! | `P` | toggle pause |
//! | `X` | restart after game over |
//! | `A` | acknowledge the interstitial |
//! | `.` | no input |
//!
//! Whitespace is ignored and `#` starts a comment that runs to the end of the line.

use grid_snake_core::Direction;
use grid_snake_rendering::FrameInput;
use thiserror::Error;

/// Errors raised while parsing a script.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum ScriptError {
    /// The script contained no steps.
    #[error("script contains no steps")]
    Empty,
    /// A symbol outside the script alphabet was found.
    #[error("unknown script symbol {symbol:?} at line {line}, column {column}")]
    UnknownSymbol {
        /// Offending character.
        symbol: char,
        /// One-based line number.
        line: usize,
        /// One-based column number.
        column: usize,
    },
}

/// Parses a script into one frame input per step.
pub(crate) fn parse(source: &str) -> Result<Vec<FrameInput>, ScriptError> {
    let mut steps = Vec::new();

    for (line_index, line) in source.lines().enumerate() {
        let content = line.split('#').next().unwrap_or_default();
        for (column_index, symbol) in content.chars().enumerate() {
            if symbol.is_whitespace() {
                continue;
            }
            let step = step_for(symbol).ok_or(ScriptError::UnknownSymbol {
                symbol,
                line: line_index + 1,
                column: column_index + 1,
            })?;
            steps.push(step);
        }
    }

    if steps.is_empty() {
        return Err(ScriptError::Empty);
    }
    Ok(steps)
}

fn step_for(symbol: char) -> Option<FrameInput> {
    let steer = |direction| FrameInput {
        direction: Some(direction),
        ..FrameInput::default()
    };

    let step = match symbol.to_ascii_uppercase() {
        'U' | '^' => steer(Direction::Up),
        'D' | 'V' => steer(Direction::Down),
        'L' | '<' => steer(Direction::Left),
        'R' | '>' => steer(Direction::Right),
        'P' => FrameInput {
            pause_toggle: true,
            ..FrameInput::default()
        },
        'X' => FrameInput {
            restart: true,
            ..FrameInput::default()
        },
        'A' => FrameInput {
            acknowledge: true,
            ..FrameInput::default()
        },
        '.' => FrameInput::default(),
        _ => return None,
    };
    Some(step)
}
