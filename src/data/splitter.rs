// ============================================================
// Layer 4 — Train/Test Splitter
// ============================================================
// Shuffles samples with a seeded RNG and splits them into:
//   - Training set: used to update model weights
//   - Test set:     held out for evaluation
//
// Determinism:
//   The shuffle uses StdRng seeded from a fixed u64, so the same
//   input and seed always produce the same two partitions. This is
//   the only shuffle in the pipeline.
//
// Split size:
//   round(total × train_fraction), rounding half to even, so
//   10 samples at 0.8 give 8 / 2.
//
// Uses Fisher-Yates shuffle via rand::seq::SliceRandom.
//
// Reference: Rust Book §8 (Vectors)
//            rand crate documentation

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

/// Shuffle `samples` with `seed` and split into (train, test).
///
/// # Arguments
/// * `samples`        - All available samples (consumed by this function)
/// * `train_fraction` - Proportion for training, e.g. 0.8 = 80%
/// * `seed`           - RNG seed; identical seeds give identical splits
///
/// # Returns
/// A tuple (train_samples, test_samples). The test samples keep
/// their shuffled order.
pub fn split_train_test<T>(mut samples: Vec<T>, train_fraction: f64, seed: u64) -> (Vec<T>, Vec<T>) {
    let mut rng = StdRng::seed_from_u64(seed);
    samples.shuffle(&mut rng);

    let total    = samples.len();
    let split_at = ((total as f64) * train_fraction).round_ties_even() as usize;

    // Clamp to valid range to avoid panics on tiny datasets
    let split_at = split_at.min(total);

    let test = samples.split_off(split_at);

    tracing::debug!(
        "Dataset split: {} training, {} test ({}% / {}%)",
        samples.len(),
        test.len(),
        (samples.len() * 100) / total.max(1),
        (test.len()    * 100) / total.max(1),
    );

    (samples, test)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_correct_split_sizes() {
        let items: Vec<usize> = (0..100).collect();
        let (train, test)     = split_train_test(items, 0.8, 42);
        assert_eq!(train.len(), 80);
        assert_eq!(test.len(),  20);
    }

    #[test]
    fn test_rounds_half_to_even() {
        // 0.8 × 10 = 8 exactly; 0.5 × 5 = 2.5 → 2
        let (train, _) = split_train_test((0..10).collect::<Vec<_>>(), 0.8, 42);
        assert_eq!(train.len(), 8);
        let (train, _) = split_train_test((0..5).collect::<Vec<_>>(), 0.5, 42);
        assert_eq!(train.len(), 2);
    }

    #[test]
    fn test_partitions_are_disjoint_and_complete() {
        let items: Vec<usize> = (0..53).collect();
        let (train, test)     = split_train_test(items, 0.8, 7);

        let train_set: HashSet<_> = train.iter().copied().collect();
        let test_set:  HashSet<_> = test.iter().copied().collect();
        assert!(train_set.is_disjoint(&test_set));

        let union: HashSet<_> = train_set.union(&test_set).copied().collect();
        assert_eq!(union, (0..53).collect::<HashSet<_>>());
    }

    #[test]
    fn test_same_seed_same_split() {
        let a = split_train_test((0..40).collect::<Vec<usize>>(), 0.8, 42);
        let b = split_train_test((0..40).collect::<Vec<usize>>(), 0.8, 42);
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seed_shuffles_differently() {
        let a = split_train_test((0..40).collect::<Vec<usize>>(), 0.8, 42);
        let b = split_train_test((0..40).collect::<Vec<usize>>(), 0.8, 43);
        assert_ne!(a, b);
    }

    #[test]
    fn test_empty_dataset() {
        let items: Vec<usize> = Vec::new();
        let (train, test)     = split_train_test(items, 0.8, 42);
        assert!(train.is_empty());
        assert!(test.is_empty());
    }

    #[test]
    fn test_full_training_split() {
        let items: Vec<usize> = (0..10).collect();
        let (train, test)     = split_train_test(items, 1.0, 42);
        assert_eq!(train.len(), 10);
        assert!(test.is_empty());
    }
}
