use serde::{Deserialize, Serialize};

/// How many candidate breaks the breaker keeps alive at each feasible break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BreakingMode {
    /// Keep the best candidate for every (part count, fitness class) pair.
    /// Exact when the available extent differs from part to part.
    #[default]
    AllBreaks,
    /// Keep only the best candidate per fitness class. Faster, and exact only
    /// when every part has the same extent.
    BestFitness,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    /// Candidate retention policy of the breaking algorithm.
    ///
    /// Defaults to [`BreakingMode::AllBreaks`].
    pub breaking_mode: BreakingMode,

    /// Largest adjustment ratio accepted by the first, strict breaking pass.
    ///
    /// Defaults to `1.0`: glue may stretch up to its declared stretchability.
    pub tolerance: f64,

    /// Largest adjustment ratio accepted by the second pass, which also enables
    /// overflow recovery. Parts beyond `1.0` are reported as underfull.
    ///
    /// Defaults to infinity.
    pub emergency_tolerance: f64,

    /// Extra demerits for two consecutive breaks at flagged penalties.
    ///
    /// Defaults to `3000`.
    pub flagged_demerits: f64,

    /// Extra demerits when neighbouring parts differ by more than one fitness class.
    ///
    /// Defaults to `10000`.
    pub incompatible_fitness_demerits: f64,

    /// When the breaker runs out of candidates, prefer a part that overflows
    /// by one element over an underfull one.
    ///
    /// Defaults to `false`.
    pub part_overflow_recovery: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            breaking_mode: BreakingMode::AllBreaks,
            tolerance: 1.0,
            emergency_tolerance: f64::INFINITY,
            flagged_demerits: 3000.0,
            incompatible_fitness_demerits: 10000.0,
            part_overflow_recovery: false,
        }
    }
}
