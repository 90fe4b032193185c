//! End-to-end tests for the analyze -> estimate -> evaluate -> recommend flow.

use kiln_estimation::{
    evaluate_budget, recommend_tier, BenchmarkRegistry, BudgetPolicy, DatasetAnalyzer,
    EstimationError, FineTuningMethod, ModelSizeClass, TrainingConfiguration, TrainingEstimator,
};
use serde_json::{json, Value};

/// A dataset mixing the recognized example shapes, the way an uploaded
/// training file typically looks.
fn mixed_dataset(len: usize) -> Vec<Value> {
    (0..len)
        .map(|i| match i % 3 {
            0 => json!({"messages": [
                {"role": "user", "content": format!("question number {i}")},
                {"role": "assistant", "content": format!("answer number {i}")},
            ]}),
            1 => json!({
                "instruction": format!("summarize item {i}"),
                "output": format!("summary of item {i}"),
            }),
            _ => json!({"text": format!("free-form passage number {i} with extra words")}),
        })
        .collect()
}

fn wizard_config(dataset_size: u64) -> TrainingConfiguration {
    TrainingConfiguration {
        model_id: "llama-8b".to_string(),
        model_size_class: ModelSizeClass::Medium,
        method: FineTuningMethod::ParameterEfficient,
        epochs: 3,
        batch_size: 4,
        grad_accum_steps: 2,
        max_seq_len: 2048,
        dataset_size_hint: Some(dataset_size),
    }
}

#[test]
fn test_full_preflight_flow_produces_consistent_numbers() {
    let registry = BenchmarkRegistry::builtin();
    let examples = mixed_dataset(100);

    let tier = registry.tier("nvidia-l4").unwrap().clone();
    let analyzer = DatasetAnalyzer::with_pricing(tier);
    let stats = analyzer.analyze(&examples, 3).unwrap();
    assert_eq!(stats.quality.score, 100.0, "a clean dataset has no penalties");
    assert!(stats.cost_projection.is_some());

    let estimator = TrainingEstimator::new(&registry);
    let config = wizard_config(examples.len() as u64);
    let estimation = estimator.estimate(&config, "nvidia-l4", None).unwrap();
    assert_eq!(estimation.effective_batch_size, 8);
    assert_eq!(estimation.total_steps, 39, "ceil(100 / 8) * 3 epochs");
    assert!(estimation.fits_in_memory);
    assert!(estimation.estimated_cost.is_some());

    let verdict = evaluate_budget(&estimation, &BudgetPolicy::default());
    assert!(!verdict.exceeded, "no limits set means no budget findings");
    assert!(verdict.warnings.is_empty());

    let recommendation = recommend_tier(&registry, config.model_size_class, None);
    assert_eq!(recommendation.tier_id, "nvidia-l4");
}

#[test]
fn test_analyzer_issues_surface_before_submission() {
    let mut examples = mixed_dataset(7);
    examples.push(json!({"text": ""}));
    examples.push(json!({"text": "   "}));
    examples.push(examples[2].clone());

    let analyzer = DatasetAnalyzer::new();
    let stats = analyzer.analyze(&examples, 1).unwrap();
    assert_eq!(stats.quality.empty_examples, 2);
    assert_eq!(stats.quality.duplicate_count, 1);
    assert!(stats.quality.score < 100.0);
    assert!(stats.token_count_min as f64 <= stats.token_count_avg);
    assert!(stats.token_count_avg <= stats.token_count_max as f64);
}

#[test]
fn test_budget_scenarios_around_a_one_hour_limit() {
    let registry = BenchmarkRegistry::builtin();
    let estimator = TrainingEstimator::new(&registry);
    let policy = BudgetPolicy { max_hours: Some(1.0), ..BudgetPolicy::default() };

    // 8B adapters on the low tier run at the 3B fallback rate of 3.6
    // samples/s, so 11_016 examples take 3_060 s: 51 minutes, 0.85 h.
    let config = TrainingConfiguration {
        epochs: 1,
        dataset_size_hint: Some(11_016),
        ..wizard_config(0)
    };
    let near = estimator.estimate(&config, "nvidia-t4", None).unwrap();
    assert_eq!((near.duration_hours, near.duration_minutes), (0, 51));
    let verdict = evaluate_budget(&near, &policy);
    assert!(!verdict.exceeded, "0.85 h is under the 1.0 h limit");
    assert_eq!(verdict.warnings.len(), 1, "but above the 80% warning threshold");

    let config = TrainingConfiguration {
        epochs: 1,
        dataset_size_hint: Some(15_552),
        ..wizard_config(0)
    };
    let over = estimator.estimate(&config, "nvidia-t4", None).unwrap();
    assert_eq!((over.duration_hours, over.duration_minutes), (1, 12));
    let verdict = evaluate_budget(&over, &policy);
    assert!(verdict.exceeded, "1.2 h breaks the 1.0 h limit");
}

#[test]
fn test_memory_pressure_flows_into_recommendations() {
    let registry = BenchmarkRegistry::builtin();
    let estimator = TrainingEstimator::new(&registry);
    let config = TrainingConfiguration {
        method: FineTuningMethod::Full,
        ..wizard_config(500)
    };

    let estimation = estimator.estimate(&config, "nvidia-l4", None).unwrap();
    assert!(!estimation.fits_in_memory, "full 8B tuning cannot fit in 24 GB");
    let recommended = estimation.recommended.expect("a failing fit must carry suggestions");
    assert!(recommended.use_parameter_efficient);
    assert_eq!(
        u64::from(recommended.suggested_batch_size)
            * u64::from(recommended.suggested_grad_accum_steps),
        config.effective_batch_size(),
        "suggestions preserve the effective batch"
    );

    // The recommender steers the same model class to a tier that fits.
    let recommendation = recommend_tier(&registry, config.model_size_class, Some(1.50));
    let tier = registry.tier(&recommendation.tier_id).unwrap();
    assert!(tier.memory_gb >= 24.0);
}

#[test]
fn test_error_taxonomy_maps_to_form_validation() {
    let registry = BenchmarkRegistry::builtin();
    let estimator = TrainingEstimator::new(&registry);
    let analyzer = DatasetAnalyzer::new();

    assert!(matches!(
        estimator.estimate(&wizard_config(100), "tpu-v9", None),
        Err(EstimationError::UnknownTier(_))
    ));
    assert!(matches!(
        analyzer.analyze(&[], 1),
        Err(EstimationError::InvalidDataset(_))
    ));
    let config = TrainingConfiguration { dataset_size_hint: None, ..wizard_config(0) };
    assert!(matches!(
        estimator.estimate(&config, "nvidia-t4", None),
        Err(EstimationError::InsufficientData(_))
    ));
    let config = TrainingConfiguration { epochs: 0, ..wizard_config(100) };
    assert!(matches!(
        estimator.estimate(&config, "nvidia-t4", None),
        Err(EstimationError::InvalidConfiguration(_))
    ));
}

#[test]
fn test_repeated_invocations_are_stable() {
    // The UI recomputes on every keystroke; identical inputs must give
    // identical outputs with no hidden state in between.
    let registry = BenchmarkRegistry::builtin();
    let estimator = TrainingEstimator::new(&registry);
    let analyzer = DatasetAnalyzer::new();
    let examples = mixed_dataset(30);
    let config = wizard_config(30);

    let first_stats = analyzer.analyze(&examples, 2).unwrap();
    let first_estimate = estimator.estimate(&config, "nvidia-a10g", None).unwrap();
    for _ in 0..5 {
        assert_eq!(analyzer.analyze(&examples, 2).unwrap(), first_stats);
        assert_eq!(estimator.estimate(&config, "nvidia-a10g", None).unwrap(), first_estimate);
    }
}
