//! Attention scoring.
//!
//! `attention = clamp(Σ f[i]·w[i] × boost)`, where `boost` is
//! [`EMERGENT_BOOST`] when the emergent feature exceeds
//! [`EMERGENT_THRESHOLD`] and 1 otherwise.

use crate::feature::{clamp_unit, Feature, FeatureVector, FEATURE_COUNT};

/// Static feature weights, indexed by [`Feature`]. Sum to 1.
pub const ATTENTION_WEIGHTS: [f32; FEATURE_COUNT] = [
    0.20, // Load
    0.15, // Memory
    0.10, // Io
    0.25, // Interactive
    0.15, // Realtime
    0.05, // Network
    0.05, // Priority
    0.05, // Emergent
];

/// Emergent value above which the boost applies
pub const EMERGENT_THRESHOLD: f32 = 0.5;

/// Multiplier for processes showing emergent behaviour
pub const EMERGENT_BOOST: f32 = 1.2;

/// Compute the attention level for a set of feature values
pub fn compute_attention(features: &[f32; FEATURE_COUNT]) -> f32 {
    let mut attention: f32 = features
        .iter()
        .zip(ATTENTION_WEIGHTS.iter())
        .map(|(f, w)| f * w)
        .sum();

    if features[Feature::Emergent.index()] > EMERGENT_THRESHOLD {
        attention *= EMERGENT_BOOST;
    }

    clamp_unit(attention)
}

/// Recompute and store the attention level of `vector`
pub(crate) fn rescore(vector: &mut FeatureVector) -> f32 {
    let attention = compute_attention(vector.features());
    vector.set_attention_level(attention);
    attention
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn test_weights_normalized() {
        let sum: f32 = ATTENTION_WEIGHTS.iter().sum();
        assert!((0.99..=1.01).contains(&sum), "weight sum {}", sum);
    }

    #[test]
    fn test_worked_example() {
        let mut f = [0.0; FEATURE_COUNT];
        f[Feature::Load.index()] = 0.3;
        f[Feature::Interactive.index()] = 0.8;
        f[Feature::Emergent.index()] = 0.6;

        // 0.3*0.20 + 0.8*0.25 + 0.6*0.05 = 0.29, boosted x1.2
        assert!(approx(compute_attention(&f), 0.348));
    }

    #[test]
    fn test_boost_threshold_is_strict() {
        let mut f = [0.0; FEATURE_COUNT];
        f[Feature::Emergent.index()] = 0.5;
        assert!(approx(compute_attention(&f), 0.025));

        f[Feature::Emergent.index()] = 0.51;
        assert!(approx(compute_attention(&f), 0.51 * 0.05 * 1.2));
    }

    #[test]
    fn test_saturated_vector_clamps_to_one() {
        let f = [1.0; FEATURE_COUNT];
        assert_eq!(compute_attention(&f), 1.0);
    }

    #[test]
    fn test_bounded_over_grid() {
        let steps = [0.0, 0.1, 0.25, 0.5, 0.51, 0.75, 0.9, 1.0];
        for &a in &steps {
            for &b in &steps {
                let mut f = [a; FEATURE_COUNT];
                f[Feature::Interactive.index()] = b;
                f[Feature::Emergent.index()] = b;
                let attention = compute_attention(&f);
                assert!((0.0..=1.0).contains(&attention));
            }
        }
    }

    #[test]
    fn test_rescore_stores_level() {
        let mut v = FeatureVector::new();
        v.set_feature(Feature::Realtime, 1.0);
        let level = rescore(&mut v);
        assert!(approx(level, 0.15));
        assert_eq!(v.attention_level(), level);
    }
}
