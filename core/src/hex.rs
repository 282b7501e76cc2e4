//! Axial hex coordinate algebra shared by the world and its adapters.
//!
//! Coordinates use the cube/axial convention where `q + r + s == 0`. Only `q`
//! and `r` are stored; `s` is always derived, so equality and hashing cover the
//! two stored axes. Offset coordinates follow the "odd-r" horizontal layout in
//! which odd rows are shoved half a cell to the right.

use std::{
    fmt,
    ops::{Add, Mul, Sub},
};

use serde::{Deserialize, Serialize};

/// Number of neighbours surrounding every hex cell.
pub const DIRECTION_COUNT: usize = 6;

/// Neighbour directions around a pointy-top hex.
///
/// North and south are not modelled because this orientation has no direct
/// neighbour along that axis. The declaration order is the canonical scan order
/// used whenever neighbours are visited.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HexDirection {
    /// Upper right neighbour.
    NorthEast,
    /// Right neighbour.
    East,
    /// Lower right neighbour.
    SouthEast,
    /// Lower left neighbour.
    SouthWest,
    /// Left neighbour.
    West,
    /// Upper left neighbour.
    NorthWest,
}

impl HexDirection {
    /// All directions in canonical scan order, clockwise from north east.
    pub const ALL: [HexDirection; DIRECTION_COUNT] = [
        HexDirection::NorthEast,
        HexDirection::East,
        HexDirection::SouthEast,
        HexDirection::SouthWest,
        HexDirection::West,
        HexDirection::NorthWest,
    ];

    /// Position of the direction within [`HexDirection::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Direction pointing back across the shared edge.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::NorthEast => Self::SouthWest,
            Self::East => Self::West,
            Self::SouthEast => Self::NorthWest,
            Self::SouthWest => Self::NorthEast,
            Self::West => Self::East,
            Self::NorthWest => Self::SouthEast,
        }
    }

    /// Unit coordinate offset that steps one cell in this direction.
    #[must_use]
    pub const fn offset(self) -> HexCoordinate {
        match self {
            Self::NorthEast => HexCoordinate::new(1, -1),
            Self::East => HexCoordinate::new(1, 0),
            Self::SouthEast => HexCoordinate::new(0, 1),
            Self::SouthWest => HexCoordinate::new(-1, 1),
            Self::West => HexCoordinate::new(-1, 0),
            Self::NorthWest => HexCoordinate::new(0, -1),
        }
    }

    /// Heading around the vertical axis, in degrees, for props facing this way.
    #[must_use]
    pub const fn angle_degrees(self) -> u16 {
        match self {
            Self::NorthEast => 30,
            Self::East => 90,
            Self::SouthEast => 150,
            Self::SouthWest => 210,
            Self::West => 270,
            Self::NorthWest => 330,
        }
    }
}

/// Axial hex coordinate with derived cube component.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct HexCoordinate {
    q: i32,
    r: i32,
}

impl HexCoordinate {
    /// Coordinate at the centre of the axial plane.
    pub const ORIGIN: HexCoordinate = HexCoordinate::new(0, 0);

    /// Creates a coordinate from its two stored axes.
    #[must_use]
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Creates a coordinate from all three cube components.
    ///
    /// Returns `None` when the components do not sum to zero.
    #[must_use]
    pub const fn from_cube(q: i32, r: i32, s: i32) -> Option<Self> {
        if q + r + s == 0 {
            Some(Self::new(q, r))
        } else {
            None
        }
    }

    /// Axis running north west to south east.
    #[must_use]
    pub const fn q(&self) -> i32 {
        self.q
    }

    /// Axis running east to west.
    #[must_use]
    pub const fn r(&self) -> i32 {
        self.r
    }

    /// Derived axis running south west to north east.
    #[must_use]
    pub const fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// Multiplies every component by `factor`.
    #[must_use]
    pub const fn scale(self, factor: i32) -> Self {
        Self::new(self.q * factor, self.r * factor)
    }

    /// Rotates the coordinate 60 degrees counter-clockwise around the origin.
    #[must_use]
    pub const fn rotate_left(self) -> Self {
        Self::new(-self.s(), -self.q)
    }

    /// Rotates the coordinate 60 degrees clockwise around the origin.
    #[must_use]
    pub const fn rotate_right(self) -> Self {
        Self::new(-self.r, -self.s())
    }

    /// Number of steps from the origin.
    #[must_use]
    pub const fn length(self) -> u32 {
        (self.q.unsigned_abs() + self.r.unsigned_abs() + self.s().unsigned_abs()) / 2
    }

    /// Number of steps between two coordinates.
    #[must_use]
    pub fn distance(self, other: HexCoordinate) -> u32 {
        (self - other).length()
    }

    /// Coordinate of the neighbour in the provided direction.
    #[must_use]
    pub fn neighbor(self, direction: HexDirection) -> Self {
        self + direction.offset()
    }

    /// Coordinates of all six neighbours in canonical scan order.
    #[must_use]
    pub fn neighbors(self) -> [HexCoordinate; DIRECTION_COUNT] {
        HexDirection::ALL.map(|direction| self.neighbor(direction))
    }

    /// Direction leading to `other`, if the two coordinates are adjacent.
    ///
    /// Coordinates that are not exactly one step apart have no direction.
    #[must_use]
    pub fn direction_to(self, other: HexCoordinate) -> Option<HexDirection> {
        let offset = other - self;
        HexDirection::ALL
            .into_iter()
            .find(|direction| direction.offset() == offset)
    }

    /// Heading in degrees that faces `other`, if the two are adjacent.
    #[must_use]
    pub fn angle_to(self, other: HexCoordinate) -> Option<u16> {
        self.direction_to(other).map(HexDirection::angle_degrees)
    }

    /// Converts the coordinate into the odd-r offset layout.
    #[must_use]
    pub const fn to_offset(self) -> OffsetCoordinate {
        let column = self.q + (self.r - (self.r & 1)) / 2;
        OffsetCoordinate::new(column, self.r)
    }

    /// Converts an odd-r offset coordinate into axial form.
    #[must_use]
    pub const fn from_offset(offset: OffsetCoordinate) -> Self {
        offset.to_axial()
    }
}

impl Add for HexCoordinate {
    type Output = HexCoordinate;

    fn add(self, rhs: HexCoordinate) -> Self::Output {
        HexCoordinate::new(self.q + rhs.q, self.r + rhs.r)
    }
}

impl Sub for HexCoordinate {
    type Output = HexCoordinate;

    fn sub(self, rhs: HexCoordinate) -> Self::Output {
        HexCoordinate::new(self.q - rhs.q, self.r - rhs.r)
    }
}

impl Mul<i32> for HexCoordinate {
    type Output = HexCoordinate;

    fn mul(self, rhs: i32) -> Self::Output {
        self.scale(rhs)
    }
}

impl fmt::Display for HexCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.q, self.r, self.s())
    }
}

/// Column and row address of a cell in the odd-r offset layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OffsetCoordinate {
    column: i32,
    row: i32,
}

impl OffsetCoordinate {
    /// Creates a new offset coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Column index, growing to the right.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Row index, growing downwards.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Reports whether the row is shoved half a cell to the right.
    #[must_use]
    pub const fn is_odd_row(&self) -> bool {
        self.row & 1 == 1
    }

    /// Converts the offset coordinate into axial form.
    #[must_use]
    pub const fn to_axial(self) -> HexCoordinate {
        let q = self.column - (self.row - (self.row & 1)) / 2;
        HexCoordinate::new(q, self.row)
    }
}

impl fmt::Display for OffsetCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}
