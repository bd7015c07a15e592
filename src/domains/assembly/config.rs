//! Domain JSON schema and runtime parameter defaults for the assembly variant
//! (spec §6 "Domain JSON schema", §SUPPLEMENT "Details resolved from
//! original_source").

use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Debug, Clone, Deserialize)]
pub struct PartSpec {
    pub name: String,
    pub priority: i32,
    pub cost: u32,
    pub storage: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectSpec {
    pub name: String,
    pub parts: Vec<usize>,
    #[serde(rename = "type")]
    pub type_id: usize,
    #[serde(rename = "needsGlue")]
    pub needs_glue: bool,
}

/// The assembly domain parameter struct (spec §6 "provides the domain parameter
/// struct"), parsed from `--domainFile` JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct Domain {
    pub objects: Vec<ObjectSpec>,
    pub parts: Vec<PartSpec>,
}

impl Domain {
    pub fn from_json_str(path: &str, text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|source| ConfigError::Json { path: path.to_string(), source })
    }

    /// The single built-in fixture kept for tests and as the no-`--domainFile`
    /// default (spec SUPPLEMENT: "one built-in fixture per domain").
    pub fn demo() -> Self {
        Domain {
            objects: vec![
                ObjectSpec { name: "truck-a".into(), parts: vec![0, 1, 2], type_id: 0, needs_glue: true },
                ObjectSpec { name: "truck-b".into(), parts: vec![0, 1], type_id: 1, needs_glue: false },
            ],
            parts: vec![
                PartSpec { name: "chassis".into(), priority: 0, cost: 1, storage: 3 },
                PartSpec { name: "axle".into(), priority: 1, cost: 1, storage: 3 },
                PartSpec { name: "cab".into(), priority: 2, cost: 2, storage: 2 },
            ],
        }
    }

    pub fn num_parts(&self) -> usize {
        self.parts.len()
    }

    pub fn num_types(&self) -> usize {
        self.objects.iter().map(|o| o.type_id).max().map_or(0, |m| m + 1)
    }
}

/// Tunable parameters for the POMDP itself, separate from the static part/object
/// catalogue above (spec §6 paramfile keys `perceive`, `activation`, `PGSAlpha`,
/// `discount`, `fDiscount`, `transitionRate`, `entropy`).
#[derive(Debug, Clone)]
pub struct AssemblyParams {
    pub perceive_acc: f64,
    pub activation: f64,
    pub discount: f64,
    pub f_discount: f64,
    pub entropy_limit: f64,
    pub pgs_alpha: f64,
    pub transition_rate: f64,
    pub refill_amount: usize,
    /// Number of product instances assembled per episode (`original_source`'s
    /// `PROBLEM_PARAMS::n_objs`); not part of the paramfile schema in spec §6,
    /// so it is a runtime default rather than a parsed key.
    pub num_products: usize,
}

impl Default for AssemblyParams {
    fn default() -> Self {
        Self {
            perceive_acc: 0.85,
            activation: -6.0,
            discount: 0.95,
            f_discount: 0.5,
            entropy_limit: 0.5,
            pgs_alpha: 10.0,
            transition_rate: 1.0,
            refill_amount: 5,
            num_products: 2,
        }
    }
}
