use serde::{Deserialize, Serialize};

/// Class probabilities for one image (softmax of the logits).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub probabilities: Vec<f32>,
}

impl Prediction {
    pub fn new(probabilities: Vec<f32>) -> Self {
        Self { probabilities }
    }

    /// Index of the most likely class
    pub fn class(&self) -> usize {
        self.top_k(1).first().map(|(c, _)| *c).unwrap_or(0)
    }

    pub fn confidence(&self) -> f32 {
        self.probabilities.get(self.class()).copied().unwrap_or(0.0)
    }

    /// The `k` most likely classes, highest probability first.
    /// Ties keep the lower class index first.
    pub fn top_k(&self, k: usize) -> Vec<(usize, f32)> {
        let mut ranked: Vec<(usize, f32)> =
            self.probabilities.iter().copied().enumerate().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(k);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_k_orders_by_probability() {
        let p = Prediction::new(vec![0.1, 0.6, 0.05, 0.25]);
        assert_eq!(p.class(), 1);
        assert!((p.confidence() - 0.6).abs() < 1e-6);

        let top: Vec<usize> = p.top_k(3).into_iter().map(|(c, _)| c).collect();
        assert_eq!(top, vec![1, 3, 0]);
    }

    #[test]
    fn test_empty_prediction() {
        let p = Prediction::new(Vec::new());
        assert_eq!(p.class(), 0);
        assert_eq!(p.confidence(), 0.0);
        assert!(p.top_k(5).is_empty());
    }
}
