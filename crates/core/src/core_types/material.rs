//! Material catalog: per-material physical properties and the pairwise
//! conduction coefficient table.
//!
//! Materials are a closed set of variants, each carrying a constant property
//! record. Propagators match on the variant and read the record; there is no
//! dynamic dispatch. The conduction table is built once at startup and
//! validated for completeness before the engine is allowed to run.

use crate::error::CatalogError;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase of matter, selects which heat exchange rule applies to a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatterState {
    /// Conducts heat through solid neighbours
    Solid,
    /// Exchanges heat by vertical convection, carries smoke and flame
    Fluid,
}

/// Physical properties of a material
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialProperties {
    pub matter_state: MatterState,
    /// °C, catalysed ignition threshold (a neighbour is already burning)
    pub ignition_temperature: f64,
    /// °C, spontaneous ignition threshold
    pub auto_ignition_temperature: f64,
    /// °C, temperature held by a burning cell of this material
    pub burning_temperature: f64,
    /// Smoke added per unit time to the fluid cell above a burning cell
    pub smoke_coefficient: f64,
}

/// Material occupying a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Material {
    Air,
    Wood,
    CellularConcrete,
}

const AIR: MaterialProperties = MaterialProperties {
    matter_state: MatterState::Fluid,
    ignition_temperature: 0.0,
    auto_ignition_temperature: 0.0,
    burning_temperature: 900.0,
    smoke_coefficient: 0.0,
};

const WOOD: MaterialProperties = MaterialProperties {
    matter_state: MatterState::Solid,
    ignition_temperature: 3.0,
    auto_ignition_temperature: 250.0,
    burning_temperature: 550.0,
    smoke_coefficient: 10.0,
};

// Thresholds far above any reachable temperature; concrete is also excluded
// from ignition explicitly in the fire rules.
const CELLULAR_CONCRETE: MaterialProperties = MaterialProperties {
    matter_state: MatterState::Solid,
    ignition_temperature: 10000.0,
    auto_ignition_temperature: 10000.0,
    burning_temperature: 0.0,
    smoke_coefficient: 0.0,
};

impl Material {
    /// Every material, in ordinal order
    pub const ALL: [Material; 3] = [Material::Air, Material::Wood, Material::CellularConcrete];

    /// Constant property record for this material
    #[inline]
    pub fn properties(self) -> &'static MaterialProperties {
        match self {
            Material::Air => &AIR,
            Material::Wood => &WOOD,
            Material::CellularConcrete => &CELLULAR_CONCRETE,
        }
    }

    #[inline]
    pub fn matter_state(self) -> MatterState {
        self.properties().matter_state
    }

    /// Whether this material can ever catch fire
    #[inline]
    pub fn is_combustible(self) -> bool {
        matches!(self, Material::Wood)
    }

    pub fn name(self) -> &'static str {
        match self {
            Material::Air => "air",
            Material::Wood => "wood",
            Material::CellularConcrete => "cellular concrete",
        }
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unordered pair of materials, normalised so the lower ordinal comes first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnorderedMaterialPair {
    low: Material,
    high: Material,
}

impl UnorderedMaterialPair {
    pub fn new(a: Material, b: Material) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    pub fn materials(self) -> (Material, Material) {
        (self.low, self.high)
    }
}

/// Standard coefficients, one row per unordered pair
const STANDARD_COEFFICIENTS: [(Material, Material, f64); 6] = [
    (Material::Air, Material::Air, 0.008),
    (Material::Air, Material::Wood, 0.02),
    (Material::Air, Material::CellularConcrete, 0.015),
    (Material::Wood, Material::Wood, 0.2),
    (Material::Wood, Material::CellularConcrete, 0.15),
    (Material::CellularConcrete, Material::CellularConcrete, 0.1),
];

/// Symmetric conduction coefficient table over all material pairs
///
/// Can only be obtained through validation, so holding one guarantees every
/// unordered pair has exactly one coefficient.
#[derive(Debug, Clone)]
pub struct ConductionTable {
    coefficients: FxHashMap<UnorderedMaterialPair, f64>,
}

impl ConductionTable {
    /// Build and validate a table from explicit entries
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if a pair is listed twice, a pair is missing,
    /// or the entry count differs from `n(n+1)/2` for `n` materials.
    pub fn from_entries(entries: &[(Material, Material, f64)]) -> Result<Self, CatalogError> {
        let mut coefficients = FxHashMap::default();
        for &(a, b, coefficient) in entries {
            let pair = UnorderedMaterialPair::new(a, b);
            if coefficients.insert(pair, coefficient).is_some() {
                return Err(CatalogError::DuplicateCoefficient { a, b });
            }
        }

        for (i, &a) in Material::ALL.iter().enumerate() {
            for &b in &Material::ALL[i..] {
                if !coefficients.contains_key(&UnorderedMaterialPair::new(a, b)) {
                    return Err(CatalogError::MissingCoefficient { a, b });
                }
            }
        }

        let n = Material::ALL.len();
        let expected = n * (n + 1) / 2;
        if coefficients.len() != expected {
            return Err(CatalogError::WrongCount {
                expected,
                actual: coefficients.len(),
            });
        }

        Ok(Self { coefficients })
    }

    /// Table with the standard coefficients for the built-in materials
    ///
    /// # Errors
    ///
    /// Fails only if the built-in table has drifted out of sync with
    /// [`Material::ALL`].
    pub fn standard() -> Result<Self, CatalogError> {
        Self::from_entries(&STANDARD_COEFFICIENTS)
    }

    /// Conduction coefficient between two materials (order-independent)
    #[inline]
    pub fn coefficient(&self, a: Material, b: Material) -> f64 {
        // Validation guarantees presence of every pair.
        self.coefficients
            .get(&UnorderedMaterialPair::new(a, b))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }
}

/// Validated, process-wide material data handed to the algorithm
#[derive(Debug, Clone)]
pub struct MaterialCatalog {
    conduction: ConductionTable,
}

impl MaterialCatalog {
    pub fn new(conduction: ConductionTable) -> Self {
        Self { conduction }
    }

    /// Catalog built from the standard coefficient table
    ///
    /// # Errors
    ///
    /// Propagates [`CatalogError`] from table validation.
    pub fn standard() -> Result<Self, CatalogError> {
        Ok(Self::new(ConductionTable::standard()?))
    }

    #[inline]
    pub fn conduction(&self) -> &ConductionTable {
        &self.conduction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_table_is_complete() {
        let table = ConductionTable::standard().unwrap();
        let n = Material::ALL.len();
        assert_eq!(table.len(), n * (n + 1) / 2);
    }

    #[test]
    fn test_coefficient_is_symmetric() {
        let table = ConductionTable::standard().unwrap();
        for a in Material::ALL {
            for b in Material::ALL {
                assert_eq!(table.coefficient(a, b), table.coefficient(b, a));
            }
        }
        assert_eq!(table.coefficient(Material::Wood, Material::Wood), 0.2);
        assert_eq!(
            table.coefficient(Material::CellularConcrete, Material::Wood),
            0.15
        );
    }

    #[test]
    fn test_missing_pair_is_rejected() {
        let entries = &STANDARD_COEFFICIENTS[..5];
        let err = ConductionTable::from_entries(entries).unwrap_err();
        assert_eq!(
            err,
            CatalogError::MissingCoefficient {
                a: Material::CellularConcrete,
                b: Material::CellularConcrete
            }
        );
    }

    #[test]
    fn test_duplicate_pair_is_rejected() {
        let mut entries = STANDARD_COEFFICIENTS.to_vec();
        // Same pair, reversed order
        entries.push((Material::Wood, Material::Air, 0.5));
        let err = ConductionTable::from_entries(&entries).unwrap_err();
        assert_eq!(
            err,
            CatalogError::DuplicateCoefficient {
                a: Material::Wood,
                b: Material::Air
            }
        );
    }

    #[test]
    fn test_unordered_pair_normalises() {
        let p = UnorderedMaterialPair::new(Material::CellularConcrete, Material::Air);
        assert_eq!(p.materials(), (Material::Air, Material::CellularConcrete));
        assert_eq!(p, UnorderedMaterialPair::new(Material::Air, Material::CellularConcrete));
    }

    #[test]
    fn test_matter_states() {
        assert_eq!(Material::Air.matter_state(), MatterState::Fluid);
        assert_eq!(Material::Wood.matter_state(), MatterState::Solid);
        assert_eq!(Material::CellularConcrete.matter_state(), MatterState::Solid);
        assert!(Material::Wood.is_combustible());
        assert!(!Material::CellularConcrete.is_combustible());
    }
}
