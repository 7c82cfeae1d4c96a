use super::LayoutError;
use crate::core::models::ids::UnitId;
use std::fmt;

/// Direction in which the units of one structure layer are laid.
///
/// Even layers are `Horizontal`, odd layers `Vertical`; each layer therefore crosses the
/// seams of the one below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    pub fn for_layer(layer: usize) -> Self {
        if layer % 2 == 0 {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Horizontal => f.write_str("horizontal"),
            Orientation::Vertical => f.write_str("vertical"),
        }
    }
}

/// Position of a unit in the magazine grid. `row` and `index_in_row` are zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MagazineSlot {
    pub ordinal: usize,
    pub row: usize,
    pub index_in_row: usize,
}

/// Position of a unit in the structure. `layer` and `index_in_layer` are zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructureSlot {
    pub ordinal: usize,
    pub layer: usize,
    pub index_in_layer: usize,
    pub orientation: Orientation,
}

/// Walks the row capacities cumulatively to find the unit's row and index within it.
pub fn magazine_slot(unit: UnitId, row_capacities: &[usize]) -> Result<MagazineSlot, LayoutError> {
    let ordinal = unit.ordinal();
    let mut remaining = ordinal - 1;

    for (row, &capacity) in row_capacities.iter().enumerate() {
        if remaining < capacity {
            return Ok(MagazineSlot {
                ordinal,
                row,
                index_in_row: remaining,
            });
        }
        remaining -= capacity;
    }

    Err(LayoutError::IndexOutOfRange {
        ordinal,
        capacity: row_capacities.iter().sum(),
    })
}

/// `layer = (ordinal - 1) / units_per_layer`, `index_in_layer = (ordinal - 1) % units_per_layer`.
pub fn structure_slot(
    unit: UnitId,
    units_per_layer: usize,
    max_units: usize,
) -> Result<StructureSlot, LayoutError> {
    let ordinal = unit.ordinal();
    if ordinal > max_units || units_per_layer == 0 {
        return Err(LayoutError::IndexOutOfRange {
            ordinal,
            capacity: max_units,
        });
    }

    let zero_based = ordinal - 1;
    let layer = zero_based / units_per_layer;
    Ok(StructureSlot {
        ordinal,
        layer,
        index_in_layer: zero_based % units_per_layer,
        orientation: Orientation::for_layer(layer),
    })
}
