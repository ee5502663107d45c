//! Integration tests for parley-sampling.
//!
//! Validates:
//! - Softmax properties (sums to 1, preserves ordering, stable on extremes)
//! - Greedy vs stochastic modes
//! - Temperature, top-k, top-p and repetition penalty effects
//! - Determinism under a fixed seed
//! - Edge cases (single logit, empty logits, masked logits)

use parley_sampling::*;

// ===========================================================================
// Softmax
// ===========================================================================

#[test]
fn softmax_sums_to_one() {
    let cases: Vec<Vec<f32>> = vec![
        vec![1.0, 2.0, 3.0],
        vec![0.0, 0.0, 0.0],
        vec![-1.0, -2.0, -3.0],
        vec![1000.0, 1001.0, 999.0],
        vec![1.0],
    ];
    for logits in &cases {
        let sum: f32 = softmax(logits).iter().sum();
        assert!((sum - 1.0).abs() < 1e-5, "sum {sum} for {logits:?}");
    }
}

#[test]
fn softmax_preserves_ordering() {
    let probs = softmax(&[1.0, 3.0, 2.0]);
    assert!(probs[1] > probs[2]);
    assert!(probs[2] > probs[0]);
}

#[test]
fn softmax_very_negative_has_no_nan() {
    let probs = softmax(&[-1000.0, -999.0, -1001.0]);
    assert!(!probs.iter().any(|p| p.is_nan()));
}

// ===========================================================================
// Greedy
// ===========================================================================

#[test]
fn greedy_always_picks_highest_logit() {
    let mut sampler = Sampler::greedy();
    let cases = vec![
        (vec![1.0, 5.0, 3.0], 1),
        (vec![10.0, 2.0, 3.0], 0),
        (vec![5.0, 5.0, 5.0, 5.0, 100.0], 4),
    ];
    for (logits, expected) in cases {
        assert_eq!(sampler.sample(&logits).unwrap(), expected);
    }
}

#[test]
fn greedy_respects_repetition_penalty() {
    // Token 0 leads until penalized below token 1.
    let mut sampler = Sampler::greedy().with_repetition_penalty(4.0);
    assert_eq!(sampler.sample_with_history(&[4.0, 3.0], &[]).unwrap(), 0);
    assert_eq!(sampler.sample_with_history(&[4.0, 3.0], &[0]).unwrap(), 1);
}

// ===========================================================================
// Stochastic Strategies
// ===========================================================================

#[test]
fn top_k_one_equals_greedy() {
    let mut sampler = Sampler::new().with_top_k(1).with_seed(7);
    for _ in 0..20 {
        assert_eq!(sampler.sample(&[1.0, 5.0, 2.0, 3.0]).unwrap(), 1);
    }
}

#[test]
fn top_k_zero_has_no_effect() {
    let mut logits = vec![1.0, 2.0, 3.0];
    apply_top_k(&mut logits, 0);
    assert!(logits.iter().all(|l| l.is_finite()));
}

#[test]
fn top_k_restricts_support() {
    let mut sampler = Sampler::new().with_top_k(2).with_seed(3);
    for _ in 0..200 {
        let token = sampler.sample(&[0.0, 5.0, 4.9, 0.1]).unwrap();
        assert!(token == 1 || token == 2, "token {token} outside top-2");
    }
}

#[test]
fn tiny_top_p_is_nearly_greedy() {
    let mut sampler = Sampler::new().with_top_p(0.01).with_seed(11);
    for _ in 0..50 {
        assert_eq!(sampler.sample(&[0.0, 3.0, 1.0]).unwrap(), 1);
    }
}

#[test]
fn top_p_one_keeps_everything() {
    let mut probs = vec![0.7, 0.2, 0.1];
    apply_top_p(&mut probs, 1.0);
    assert_eq!(probs, vec![0.7, 0.2, 0.1]);
}

#[test]
fn repetition_penalty_handles_both_signs() {
    let mut logits = vec![2.0, -2.0, 1.0];
    apply_repetition_penalty(&mut logits, &[0, 1, 99], 2.0);
    assert_eq!(logits, vec![1.0, -4.0, 1.0]);
}

#[test]
fn high_temperature_spreads_choices() {
    let logits = [2.0, 1.9, 1.8, 1.7];
    let mut sampler = Sampler::new().with_temperature(5.0).with_seed(99);
    let mut seen = std::collections::HashSet::new();
    for _ in 0..200 {
        seen.insert(sampler.sample(&logits).unwrap());
    }
    assert!(seen.len() > 2);
}

// ===========================================================================
// Determinism
// ===========================================================================

#[test]
fn same_seed_same_sequence() {
    let logits = [0.1, 0.2, 0.3, 0.4];
    let mut a = Sampler::new().with_top_k(3).with_top_p(0.9).with_seed(42);
    let mut b = Sampler::new().with_top_k(3).with_top_p(0.9).with_seed(42);
    for _ in 0..500 {
        assert_eq!(a.sample(&logits).unwrap(), b.sample(&logits).unwrap());
    }
}

#[test]
fn zero_seed_not_stuck() {
    let mut rng = SeededRng::new(0);
    let first = rng.next_f32();
    assert!((0..10).any(|_| rng.next_f32() != first));
}

// ===========================================================================
// Edge Cases
// ===========================================================================

#[test]
fn single_logit_always_zero() {
    let mut sampler = Sampler::new();
    assert_eq!(sampler.sample(&[3.0]).unwrap(), 0);
}

#[test]
fn empty_logits_error() {
    assert_eq!(Sampler::new().sample(&[]), Err(SamplingError::InvalidLogits));
    assert_eq!(Sampler::greedy().sample(&[]), Err(SamplingError::InvalidLogits));
}

#[test]
fn all_masked_but_one() {
    let mut sampler = Sampler::new();
    let logits = [f32::NEG_INFINITY, 1.0, f32::NEG_INFINITY];
    for _ in 0..20 {
        assert_eq!(sampler.sample(&logits).unwrap(), 1);
    }
}

#[test]
fn argmax_empty_is_none() {
    assert_eq!(argmax(&[]), None);
    assert_eq!(argmax(&[0.5, 0.9]), Some(1));
}

#[test]
fn error_display() {
    assert_eq!(SamplingError::InvalidLogits.to_string(), "Invalid logits array");
    assert_eq!(
        SamplingError::InvalidTemperature.to_string(),
        "Temperature must be > 0"
    );
}
