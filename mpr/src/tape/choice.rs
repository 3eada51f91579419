use serde::{Deserialize, Serialize};

/// A single choice made at a min/max clause.
///
/// Explicitly stored in a `u8` so that choice slots stay compact in the
/// per-lane arenas.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Serialize,
    Deserialize,
)]
#[repr(u8)]
pub enum Choice {
    /// The operation always picks the left-hand input
    Left = 1,

    /// The operation always picks the right-hand input
    Right = 2,

    /// The operation may pick either input
    #[default]
    Both = 3,
}

impl Choice {
    /// Checks whether this choice lets us drop one branch of the clause
    #[inline]
    pub fn is_resolved(self) -> bool {
        !matches!(self, Choice::Both)
    }
}
