//! World-space block positions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ParseError;

/// Integer block position in world space.
///
/// Ordered by (x, y, z) so sorted collections iterate deterministically.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct WorldPos {
    /// East-west axis.
    pub x: i32,
    /// Vertical axis, bounded by the configured world height.
    pub y: i32,
    /// North-south axis.
    pub z: i32,
}

impl WorldPos {
    /// Construct a position from its components.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Same column, different height.
    pub const fn with_y(self, y: i32) -> Self {
        Self { y, ..self }
    }

    /// Offset by the given deltas.
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            z: self.z + dz,
        }
    }
}

/// Formats as the stable save-file key `"x,y,z"`.
impl fmt::Display for WorldPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.x, self.y, self.z)
    }
}

impl FromStr for WorldPos {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::InvalidPositionKey(s.to_string());
        let mut parts = s.split(',').map(|part| part.trim().parse::<i32>());

        let x = parts.next().ok_or_else(invalid)?.map_err(|_| invalid())?;
        let y = parts.next().ok_or_else(invalid)?.map_err(|_| invalid())?;
        let z = parts.next().ok_or_else(invalid)?.map_err(|_| invalid())?;
        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok(Self { x, y, z })
    }
}
