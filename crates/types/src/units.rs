//! Fixed sub-unit arithmetic.
//!
//! Layout works exclusively in integer millipoints (1/1000 pt) so that long
//! accumulations of widths never drift. Floating point only appears at the
//! edges: when reading front-end values and when painting.

/// A length in millipoints.
pub type Mpt = i32;

pub const MPT_PER_PT: i32 = 1000;

/// Converts points to millipoints, rounding to the nearest unit.
pub fn from_pt(points: f32) -> Mpt {
    (points * MPT_PER_PT as f32).round() as Mpt
}

pub fn to_pt(value: Mpt) -> f32 {
    value as f32 / MPT_PER_PT as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_both_ways() {
        assert_eq!(from_pt(12.0), 12_000);
        assert_eq!(from_pt(0.0005), 1);
        assert_eq!(to_pt(1500), 1.5);
    }
}
