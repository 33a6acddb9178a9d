//! Coordinates and facing

use serde::{Deserialize, Serialize};
use std::fmt;

/// A continuous position in the world.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinate {
    /// East-west axis
    pub x: f64,
    /// Vertical axis
    pub y: f64,
    /// North-south axis
    pub z: f64,
}

impl Coordinate {
    /// The zero position
    pub const ORIGIN: Coordinate = Coordinate::new(0.0, 0.0, 0.0);

    /// Create a coordinate
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Straight-line distance to another coordinate
    pub fn distance(&self, other: &Coordinate) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Squared straight-line distance to another coordinate
    pub fn distance_squared(&self, other: &Coordinate) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    /// Whether `other` lies within `radius`, boundary included
    pub fn is_within(&self, other: &Coordinate, radius: f64) -> bool {
        self.distance_squared(other) <= radius * radius
    }

    /// The block containing this coordinate
    pub fn block(&self) -> BlockPos {
        BlockPos::new(
            self.x.floor() as i32,
            self.y.floor() as i32,
            self.z.floor() as i32,
        )
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

/// An integer block position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BlockPos {
    /// East-west axis
    pub x: i32,
    /// Vertical axis
    pub y: i32,
    /// North-south axis
    pub z: i32,
}

impl BlockPos {
    /// Create a block position
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Centre of the block; used when measuring distance to an anchor
    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            f64::from(self.x) + 0.5,
            f64::from(self.y) + 0.5,
            f64::from(self.z) + 0.5,
        )
    }

    /// Centre of the block's floor; where an actor stands on arrival
    pub fn floor_center(&self) -> Coordinate {
        Coordinate::new(
            f64::from(self.x) + 0.5,
            f64::from(self.y),
            f64::from(self.z) + 0.5,
        )
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.x, self.y, self.z)
    }
}

/// Look direction in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Facing {
    /// Horizontal rotation
    pub yaw: f32,
    /// Vertical rotation
    pub pitch: f32,
}

impl Facing {
    /// Facing used after a reset
    pub const CANONICAL: Facing = Facing {
        yaw: 0.0,
        pitch: 0.0,
    };

    /// Create a facing
    pub const fn new(yaw: f32, pitch: f32) -> Self {
        Self { yaw, pitch }
    }
}

/// How a relocation treats the actor's facing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FacingPolicy {
    /// Keep the facing the actor had before the move
    Preserve,
    /// Snap to [`Facing::CANONICAL`]
    Reset,
}

impl FacingPolicy {
    /// The facing to apply given the actor's current one
    pub fn apply(&self, current: Facing) -> Facing {
        match self {
            FacingPolicy::Preserve => current,
            FacingPolicy::Reset => Facing::CANONICAL,
        }
    }
}
