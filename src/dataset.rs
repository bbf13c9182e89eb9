//! # Reference Dataset
//!
//! Versioned, read-only impact-factor tables: per-kg ingredient factors,
//! per-ton-km transport mode factors, per-kg packaging material factors, and
//! the reference min/max ranges the normalizer scales against.
//!
//! - Loads from a JSON file (`ECO_DATASET_PATH`, default
//!   `config/impact_factors.v1.json`); falls back to a built-in
//!   `default_seed()` when no file is present.
//! - A `(ingredient, dataset_version)` pair always yields the same factor:
//!   datasets are immutable once built and published behind an `Arc`.
//! - Refresh is an explicit, atomic swap in `DatasetStore`; readers holding a
//!   `Arc<Dataset>` never observe a partially-updated table.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

use crate::error::EcoError;

pub const DEFAULT_DATASET_PATH: &str = "config/impact_factors.v1.json";
pub const ENV_DATASET_PATH: &str = "ECO_DATASET_PATH";

/// Per-kg environmental cost of an ingredient or material, pinned to the
/// dataset it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactFactor {
    pub co2_per_kg: f64,
    pub water_per_kg: f64,
    pub energy_per_kg: f64,
    pub source_dataset_id: String,
    pub dataset_version: String,
}

/// Per-ton-km emission factors for one transport mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportFactor {
    pub co2_per_tkm: f64,
    pub energy_per_tkm: f64,
}

/// Reference min/max for one indicator, used for min-max normalization.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReferenceRange {
    pub min: f64,
    pub max: f64,
}

/// Reference ranges for all three indicators (per kg of product).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReferenceRanges {
    pub co2: ReferenceRange,
    pub water: ReferenceRange,
    pub energy: ReferenceRange,
}

/* ----------------------------
Dataset file schema (from JSON)
---------------------------- */

#[derive(Debug, Clone, Deserialize)]
struct FactorEntry {
    co2_per_kg: f64,
    water_per_kg: f64,
    energy_per_kg: f64,
    #[serde(default)]
    category: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct DatasetFile {
    version: String,
    source_id: String,
    ingredients: HashMap<String, FactorEntry>,
    transport_modes: HashMap<String, TransportFactor>,
    packaging_materials: HashMap<String, FactorEntry>,
    reference_ranges: ReferenceRanges,
}

/// One immutable dataset version.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub version: String,
    pub source_id: String,
    factors: HashMap<String, ImpactFactor>,
    category_factors: HashMap<String, ImpactFactor>,
    transport_modes: HashMap<String, TransportFactor>,
    packaging_materials: HashMap<String, ImpactFactor>,
    pub reference_ranges: ReferenceRanges,
}

impl Dataset {
    fn from_file_schema(file: DatasetFile) -> Result<Self, EcoError> {
        if file.version.trim().is_empty() {
            return Err(EcoError::configuration("dataset version must not be empty"));
        }
        for (name, e) in file
            .ingredients
            .iter()
            .chain(file.packaging_materials.iter())
        {
            if e.co2_per_kg < 0.0 || e.water_per_kg < 0.0 || e.energy_per_kg < 0.0 {
                return Err(EcoError::configuration(format!(
                    "negative impact factor for '{name}' in dataset '{}'",
                    file.version
                )));
            }
        }
        for (name, r) in [
            ("co2", &file.reference_ranges.co2),
            ("water", &file.reference_ranges.water),
            ("energy", &file.reference_ranges.energy),
        ] {
            // `!(min < max)` also rejects NaN bounds.
            if !(r.min < r.max) {
                return Err(EcoError::configuration(format!(
                    "reference range '{name}' has min {} >= max {} in dataset '{}'",
                    r.min, r.max, file.version
                )));
            }
        }

        let to_factor = |e: &FactorEntry| ImpactFactor {
            co2_per_kg: e.co2_per_kg,
            water_per_kg: e.water_per_kg,
            energy_per_kg: e.energy_per_kg,
            source_dataset_id: file.source_id.clone(),
            dataset_version: file.version.clone(),
        };

        let mut factors = HashMap::new();
        let mut per_category: HashMap<String, Vec<ImpactFactor>> = HashMap::new();
        for (name, entry) in &file.ingredients {
            let key = normalize_key(name);
            let f = to_factor(entry);
            if let Some(cat) = &entry.category {
                per_category
                    .entry(normalize_key(cat))
                    .or_default()
                    .push(f.clone());
            }
            factors.insert(key, f);
        }

        // Category fallback = arithmetic mean of the member factors.
        let mut category_factors = HashMap::new();
        for (cat, members) in per_category {
            let n = members.len() as f64;
            category_factors.insert(
                cat,
                ImpactFactor {
                    co2_per_kg: members.iter().map(|f| f.co2_per_kg).sum::<f64>() / n,
                    water_per_kg: members.iter().map(|f| f.water_per_kg).sum::<f64>() / n,
                    energy_per_kg: members.iter().map(|f| f.energy_per_kg).sum::<f64>() / n,
                    source_dataset_id: file.source_id.clone(),
                    dataset_version: file.version.clone(),
                },
            );
        }

        let packaging_materials = file
            .packaging_materials
            .iter()
            .map(|(name, e)| (normalize_key(name), to_factor(e)))
            .collect();

        let transport_modes = file
            .transport_modes
            .iter()
            .map(|(mode, f)| (normalize_key(mode), f.clone()))
            .collect();

        Ok(Self {
            version: file.version,
            source_id: file.source_id,
            factors,
            category_factors,
            transport_modes,
            packaging_materials,
            reference_ranges: file.reference_ranges,
        })
    }

    /// Load one dataset from a JSON file. Parse or validation failure is a
    /// fatal configuration error; there is no silent fallback here.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, EcoError> {
        let raw = fs::read_to_string(&path).map_err(|e| {
            EcoError::configuration(format!(
                "cannot read dataset file {}: {e}",
                path.as_ref().display()
            ))
        })?;
        let file: DatasetFile = serde_json::from_str(&raw)
            .map_err(|e| EcoError::configuration(format!("invalid dataset file: {e}")))?;
        Self::from_file_schema(file)
    }

    pub fn exact_factor(&self, key: &str) -> Option<&ImpactFactor> {
        self.factors.get(key)
    }

    pub fn category_factor(&self, category: &str) -> Option<&ImpactFactor> {
        self.category_factors.get(&normalize_key(category))
    }

    pub fn transport_factor(&self, mode: &str) -> Option<&TransportFactor> {
        self.transport_modes.get(&normalize_key(mode))
    }

    pub fn packaging_factor(&self, material: &str) -> Option<&ImpactFactor> {
        self.packaging_materials.get(&normalize_key(material))
    }

    pub fn ingredient_count(&self) -> usize {
        self.factors.len()
    }

    /// Built-in seed (`v1`). Factor values follow the ADEME / FAO / EcoInvent
    /// defaults used by the upstream LCA tables.
    pub fn default_seed() -> Self {
        let mut ingredients = HashMap::new();
        for (name, co2, water, energy, category) in [
            // cereals
            ("wheat", 0.8, 1827.0, 3.5, "cereal"),
            ("rice", 2.7, 2497.0, 5.0, "cereal"),
            ("corn", 0.7, 1222.0, 3.0, "cereal"),
            ("oats", 0.6, 1500.0, 3.0, "cereal"),
            // proteins
            ("beef", 27.0, 15400.0, 35.0, "meat"),
            ("pork", 5.8, 5988.0, 15.0, "meat"),
            ("chicken", 3.7, 4325.0, 10.0, "meat"),
            ("egg", 3.0, 3300.0, 6.0, "animal_product"),
            ("milk", 1.3, 1020.0, 2.5, "animal_product"),
            ("cheese", 8.5, 5060.0, 12.0, "animal_product"),
            // vegetables & fruits
            ("tomato", 1.1, 214.0, 2.0, "vegetable"),
            ("potato", 0.3, 287.0, 1.5, "vegetable"),
            ("onion", 0.3, 280.0, 1.5, "vegetable"),
            ("carrot", 0.3, 195.0, 1.5, "vegetable"),
            ("apple", 0.4, 822.0, 1.2, "fruit"),
            ("orange", 0.4, 560.0, 1.2, "fruit"),
            ("banana", 0.8, 790.0, 1.5, "fruit"),
            // oils
            ("palm_oil", 7.3, 5000.0, 9.0, "oil"),
            ("sunflower_oil", 2.1, 6800.0, 8.0, "oil"),
            ("olive_oil", 3.5, 14430.0, 8.0, "oil"),
            ("coconut_oil", 2.3, 4500.0, 8.0, "oil"),
            // other
            ("sugar", 0.6, 1782.0, 5.5, "sweetener"),
            ("salt", 0.1, 10.0, 0.5, "mineral"),
            ("water", 0.001, 1.0, 0.01, "mineral"),
            ("cocoa", 4.5, 27000.0, 25.0, "stimulant"),
            ("coffee", 6.0, 15897.0, 20.0, "stimulant"),
            ("tea", 1.9, 8860.0, 8.0, "stimulant"),
            ("soy", 0.4, 2145.0, 3.0, "legume"),
            ("chocolate", 5.0, 17196.0, 15.0, "sweetener"),
        ] {
            ingredients.insert(
                name.to_string(),
                FactorEntry {
                    co2_per_kg: co2,
                    water_per_kg: water,
                    energy_per_kg: energy,
                    category: Some(category.to_string()),
                },
            );
        }

        let mut packaging = HashMap::new();
        for (name, co2, water, energy) in [
            ("plastic", 6.0, 200.0, 80.0),
            ("pet", 5.5, 180.0, 75.0),
            ("hdpe", 4.8, 160.0, 70.0),
            ("glass", 1.2, 30.0, 15.0),
            ("aluminum", 11.0, 300.0, 170.0),
            ("steel", 2.8, 80.0, 25.0),
            ("cardboard", 1.1, 100.0, 12.0),
            ("paper", 1.3, 150.0, 15.0),
            ("wood", 0.3, 50.0, 5.0),
            ("tetra_pak", 1.5, 120.0, 18.0),
        ] {
            packaging.insert(
                name.to_string(),
                FactorEntry {
                    co2_per_kg: co2,
                    water_per_kg: water,
                    energy_per_kg: energy,
                    category: None,
                },
            );
        }

        let mut transport = HashMap::new();
        for (mode, co2, energy) in [
            ("truck", 0.096, 0.9),
            ("truck_small", 0.180, 1.5),
            ("truck_large", 0.050, 0.6),
            ("refrigerated_truck", 0.150, 1.5),
            ("ship", 0.016, 0.2),
            ("ship_container", 0.010, 0.15),
            ("train", 0.022, 0.3),
            ("train_freight", 0.018, 0.25),
            ("air", 1.130, 15.0),
            ("air_cargo", 0.800, 12.0),
            ("van", 0.250, 2.5),
        ] {
            transport.insert(
                mode.to_string(),
                TransportFactor {
                    co2_per_tkm: co2,
                    energy_per_tkm: energy,
                },
            );
        }

        let file = DatasetFile {
            version: "v1".to_string(),
            source_id: "seed-ademe-fao".to_string(),
            ingredients,
            transport_modes: transport,
            packaging_materials: packaging,
            reference_ranges: ReferenceRanges {
                co2: ReferenceRange { min: 0.1, max: 3.0 },
                water: ReferenceRange {
                    min: 100.0,
                    max: 1500.0,
                },
                energy: ReferenceRange { min: 1.0, max: 8.0 },
            },
        };

        Self::from_file_schema(file).expect("seed dataset is valid")
    }
}

/// Store of all loaded dataset versions. Lookups hand out an `Arc<Dataset>`;
/// reload inserts a freshly-built dataset under its version in one write,
/// so concurrent computations keep the snapshot they started with.
#[derive(Debug)]
pub struct DatasetStore {
    inner: RwLock<HashMap<String, Arc<Dataset>>>,
}

impl DatasetStore {
    /// Seeded store, optionally overlaid by the file at `ECO_DATASET_PATH`
    /// (or the default path). A missing file keeps the seed; a present but
    /// invalid file is a fatal configuration error.
    pub fn bootstrap() -> Result<Self, EcoError> {
        let store = Self::seeded();
        let path = std::env::var(ENV_DATASET_PATH)
            .unwrap_or_else(|_| DEFAULT_DATASET_PATH.to_string());
        if Path::new(&path).exists() {
            let n = store.reload_from(&path)?;
            info!(path, ingredients = n, "dataset loaded from file");
        } else {
            warn!(path, "no dataset file found, using built-in seed (v1)");
        }
        Ok(store)
    }

    pub fn seeded() -> Self {
        let seed = Dataset::default_seed();
        let mut map = HashMap::new();
        map.insert(seed.version.clone(), Arc::new(seed));
        Self {
            inner: RwLock::new(map),
        }
    }

    pub fn get(&self, version: &str) -> Option<Arc<Dataset>> {
        self.inner
            .read()
            .expect("dataset store lock poisoned")
            .get(version)
            .cloned()
    }

    pub fn versions(&self) -> Vec<String> {
        let mut v: Vec<String> = self
            .inner
            .read()
            .expect("dataset store lock poisoned")
            .keys()
            .cloned()
            .collect();
        v.sort();
        v
    }

    /// Load a dataset file and swap it in atomically under its version.
    /// Returns the number of ingredient factors loaded.
    pub fn reload_from<P: AsRef<Path>>(&self, path: P) -> Result<usize, EcoError> {
        let ds = Dataset::load_from_file(path)?;
        let n = ds.ingredient_count();
        let version = ds.version.clone();
        let mut guard = self.inner.write().expect("dataset store lock poisoned");
        guard.insert(version.clone(), Arc::new(ds));
        info!(version, ingredients = n, "dataset version swapped in");
        Ok(n)
    }
}

/// Normalize a lookup key: lowercase, non-alphanumeric runs collapsed to a
/// single underscore. "Olive Oil" and "olive-oil" both map to "olive_oil".
pub fn normalize_key(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_sep = true;
    for ch in s.trim().chars() {
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
            last_sep = false;
        } else if !last_sep {
            out.push('_');
            last_sep = true;
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}
