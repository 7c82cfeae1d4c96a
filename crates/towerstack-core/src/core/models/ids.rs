use std::fmt;

/// One-based identifier of a unit. The build order and both layouts are keyed on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(u32);

impl UnitId {
    /// Returns `None` for zero; unit numbering starts at one.
    pub fn new(number: u32) -> Option<Self> {
        (number > 0).then_some(Self(number))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// The unit's position in the build order, starting at 1.
    pub fn ordinal(self) -> usize {
        self.0 as usize
    }

    /// All ids `1..=count` in ascending order. Counts beyond `u32::MAX` stop at the
    /// largest representable id.
    pub fn first_n(count: usize) -> impl Iterator<Item = UnitId> {
        let last = u32::try_from(count).unwrap_or(u32::MAX);
        (1..=last).map(UnitId)
    }
}

impl TryFrom<u32> for UnitId {
    type Error = u32;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        UnitId::new(value).ok_or(value)
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
