//! Turning raw logits into a ranked [`PredictionList`].

use studio_core::{PredictionList, SchemaError};

use crate::labels::LabelMap;

/// Numerically stable softmax.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// The `k` most probable classes, sorted descending. `k` of zero is treated
/// as one so the result is never empty.
pub fn top_k(probs: &[f32], labels: &LabelMap, k: usize) -> Result<PredictionList, SchemaError> {
    let mut ranked: Vec<(usize, f32)> = probs.iter().copied().enumerate().collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    ranked.truncate(k.max(1));

    PredictionList::from_pairs(
        ranked
            .into_iter()
            .map(|(idx, p)| (labels.name(idx), p.clamp(0.0, 1.0))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn softmax_sums_to_one() {
        let p = softmax(&[1.0, 2.0, 3.0]);
        let sum: f32 = p.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5, "sum was {sum}");
        assert!(p[2] > p[1] && p[1] > p[0]);
    }

    #[test]
    fn softmax_handles_large_logits() {
        let p = softmax(&[1000.0, 1000.0]);
        assert!((p[0] - 0.5).abs() < 1e-6);
        assert!(p.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn top_k_ranks_descending() {
        let labels = LabelMap::from_names(["NEGATIVE", "POSITIVE"]);
        let list = top_k(&softmax(&[-1.5, 2.0]), &labels, 5).unwrap();

        assert_eq!(list.len(), 2);
        assert_eq!(list.top().label(), "POSITIVE");
        assert!(list.as_slice()[0].score() >= list.as_slice()[1].score());
    }

    #[test]
    fn top_k_truncates_and_never_empties() {
        let labels = LabelMap::from_names(["a", "b", "c", "d"]);
        let probs = [0.1, 0.4, 0.3, 0.2];

        let list = top_k(&probs, &labels, 2).unwrap();
        let names: Vec<&str> = list.iter().map(|p| p.label()).collect();
        assert_eq!(names, ["b", "c"]);

        let list = top_k(&probs, &labels, 0).unwrap();
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn top_k_of_nothing_is_a_schema_error() {
        let labels = LabelMap::from_names(Vec::<String>::new());
        assert_eq!(top_k(&[], &labels, 3), Err(SchemaError::EmptyList));
    }

    #[test]
    fn nan_probabilities_are_rejected() {
        let labels = LabelMap::from_names(["x"]);
        assert!(top_k(&[f32::NAN], &labels, 1).is_err());
    }
}
