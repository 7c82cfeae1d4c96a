use super::ids::UnitId;

/// Outer dimensions of a unit in millimetres. `length` runs along the unit's long axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitDimensions {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

impl UnitDimensions {
    pub fn new(length: f64, width: f64, height: f64) -> Self {
        Self {
            length,
            width,
            height,
        }
    }
}

/// A single rectangular block of the tower.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Unit {
    pub id: UnitId,
    pub dimensions: UnitDimensions,
}

impl Unit {
    pub fn new(id: UnitId, dimensions: UnitDimensions) -> Self {
        Self { id, dimensions }
    }
}
