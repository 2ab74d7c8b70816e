//! PDF Object Identifier.

use std::fmt;

/// Identifies an indirect object: object number plus generation.
///
/// Signed output is written in one pass, so every identifier this crate
/// allocates carries generation 0; non-zero generations only appear
/// when binding to objects of a pre-existing file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId {
    /// The object number (must be > 0 for indirect objects).
    pub number: u32,
    /// The generation number.
    pub generation: u16,
}

impl ObjectId {
    /// Creates an ObjectId with generation 0.
    #[inline]
    pub fn new(number: u32) -> Self {
        Self {
            number,
            generation: 0,
        }
    }

    /// Creates an ObjectId with a specific generation number.
    #[inline]
    pub fn with_generation(number: u32, generation: u16) -> Self {
        Self { number, generation }
    }
}

/// Renders the indirect-reference form, e.g. `3 0 R`.
///
/// The definition header (`3 0 obj`) is not a value and is emitted by
/// the serializer directly.
impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} R", self.number, self.generation)
    }
}

impl From<(u32, u16)> for ObjectId {
    fn from((number, generation): (u32, u16)) -> Self {
        Self::with_generation(number, generation)
    }
}

impl From<u32> for ObjectId {
    fn from(number: u32) -> Self {
        Self::new(number)
    }
}
