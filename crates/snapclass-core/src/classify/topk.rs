//! Decoding raw network output into ranked, labeled predictions.

use crate::types::Prediction;

use super::labels::LabelIndex;

/// Number of predictions reported per image.
pub const TOP_K: usize = 5;

/// Tolerance when deciding whether scores already form a distribution.
const DISTRIBUTION_EPSILON: f32 = 1e-3;

/// Return `scores` as probabilities, applying softmax when the model emits
/// logits instead of a distribution.
pub fn to_probabilities(scores: &[f32]) -> Vec<f32> {
    let in_range = scores.iter().all(|s| (0.0..=1.0).contains(s));
    let sum: f32 = scores.iter().sum();
    if in_range && (sum - 1.0).abs() < DISTRIBUTION_EPSILON {
        return scores.to_vec();
    }

    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = scores.iter().map(|s| (s - max).exp()).collect();
    let total: f32 = exps.iter().sum();
    if total > 0.0 {
        exps.iter().map(|e| e / total).collect()
    } else {
        exps
    }
}

/// The `k` most probable classes, best first. Ties keep the lower class
/// index first so output is stable across runs.
pub fn top_k(probabilities: &[f32], labels: &LabelIndex, k: usize) -> Vec<Prediction> {
    let mut order: Vec<usize> = (0..probabilities.len()).collect();
    order.sort_by(|&a, &b| {
        probabilities[b]
            .total_cmp(&probabilities[a])
            .then(a.cmp(&b))
    });

    order
        .into_iter()
        .take(k)
        .map(|idx| {
            let (class_id, class_name) = labels
                .get(idx)
                .map(|(id, name)| (id.to_string(), name.to_string()))
                .unwrap_or_else(|| (format!("class_{idx}"), format!("class_{idx}")));
            Prediction {
                class_id,
                class_name,
                confidence: as_percentage(probabilities[idx]),
            }
        })
        .collect()
}

/// Probability → percentage rounded to two decimals.
pub fn as_percentage(probability: f32) -> f64 {
    (f64::from(probability) * 10_000.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(n: usize) -> LabelIndex {
        let body: Vec<String> = (0..n)
            .map(|i| format!("\"{i}\": [\"n{i:08}\", \"label{i}\"]"))
            .collect();
        LabelIndex::from_json(&format!("{{{}}}", body.join(","))).unwrap()
    }

    #[test]
    fn test_top_k_sorted_descending() {
        let probs = [0.05, 0.4, 0.1, 0.3, 0.02, 0.13];
        let preds = top_k(&probs, &labels(6), TOP_K);
        assert_eq!(preds.len(), 5);
        let names: Vec<&str> = preds.iter().map(|p| p.class_name.as_str()).collect();
        assert_eq!(names, vec!["label1", "label3", "label5", "label2", "label0"]);
        assert!(preds.windows(2).all(|w| w[0].confidence >= w[1].confidence));
    }

    #[test]
    fn test_confidence_is_rounded_percentage() {
        let probs = [0.123_456, 0.876_544];
        let preds = top_k(&probs, &labels(2), TOP_K);
        assert_eq!(preds[0].confidence, 87.65);
        assert_eq!(preds[1].confidence, 12.35);
        assert_eq!(preds[0].class_id, "n00000001");
    }

    #[test]
    fn test_ties_break_on_index() {
        let probs = [0.25, 0.25, 0.25, 0.25];
        let preds = top_k(&probs, &labels(4), 2);
        assert_eq!(preds[0].class_name, "label0");
        assert_eq!(preds[1].class_name, "label1");
    }

    #[test]
    fn test_same_scores_give_same_ranking() {
        let probs: Vec<f32> = (0..1000).map(|i| ((i * 37) % 101) as f32).collect();
        let probs = to_probabilities(&probs);
        let a = top_k(&probs, &labels(1000), TOP_K);
        let b = top_k(&probs, &labels(1000), TOP_K);
        assert_eq!(a, b);
    }

    #[test]
    fn test_unlabeled_index_falls_back() {
        let preds = top_k(&[0.1, 0.9], &labels(1), 2);
        assert_eq!(preds[0].class_id, "class_1");
    }

    #[test]
    fn test_distribution_passes_through() {
        let probs = [0.7, 0.2, 0.1];
        assert_eq!(to_probabilities(&probs), probs.to_vec());
    }

    #[test]
    fn test_logits_are_softmaxed() {
        let probs = to_probabilities(&[2.0, 1.0, -1.0]);
        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert!(probs[0] > probs[1] && probs[1] > probs[2]);
    }
}
