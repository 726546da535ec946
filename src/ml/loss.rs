// ============================================================
// Layer 5 — Classification Loss
// ============================================================
// Two equivalent ways to score logits against labels:
//
//   CrossEntropy   — Burn's CrossEntropyLoss straight on the
//                    logits (it applies log-softmax internally).
//
//   LogSoftmaxNll  — log_softmax(logits) first, then the negative
//                    log-likelihood of the correct class:
//                      loss = -mean_i( log_probs[i, target_i] )
//
// The second form is what you get when the network ends in a
// LogSoftmax layer. Both produce the same number; having both
// makes it visible that cross-entropy is just NLL of the
// log-softmax.
//
// Reference: Burn Book §3 (Loss functions)

use burn::{
    nn::loss::CrossEntropyLossConfig,
    prelude::*,
    tensor::activation::log_softmax,
};

use crate::domain::settings::LossKind;

/// Mean loss over the batch — shape [1].
pub fn classification_loss<B: Backend>(
    kind:    LossKind,
    logits:  Tensor<B, 2>,
    targets: Tensor<B, 1, Int>,
) -> Tensor<B, 1> {
    match kind {
        LossKind::CrossEntropy => CrossEntropyLossConfig::new()
            .init(&logits.device())
            .forward(logits, targets),
        LossKind::LogSoftmaxNll => nll_loss(log_softmax(logits, 1), targets),
    }
}

/// Negative log-likelihood of `targets` under `log_probs` [batch, classes].
pub fn nll_loss<B: Backend>(log_probs: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> Tensor<B, 1> {
    let [batch] = targets.dims();
    log_probs
        .gather(1, targets.reshape([batch, 1]))
        .mean()
        .neg()
}

/// Number of rows whose argmax equals the target.
pub fn correct_predictions<B: Backend>(logits: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> usize {
    let [batch] = targets.dims();
    // argmax(1) keeps the reduced dim: [batch, 1]
    let predicted = logits.argmax(1).reshape([batch]);
    predicted
        .equal(targets)
        .int()
        .sum()
        .into_scalar()
        .elem::<i64>() as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn logits_and_targets() -> (Tensor<TestBackend, 2>, Tensor<TestBackend, 1, Int>) {
        let device  = Default::default();
        let logits  = Tensor::<TestBackend, 1>::from_floats(
            [2.0, 0.5, -1.0, 0.1, 0.2, 3.0, -0.5, 1.5, 0.0].as_slice(),
            &device,
        ).reshape([3, 3]);
        let targets = Tensor::<TestBackend, 1, Int>::from_ints([0, 2, 0].as_slice(), &device);
        (logits, targets)
    }

    fn scalar(t: Tensor<TestBackend, 1>) -> f32 {
        t.into_scalar().elem::<f32>()
    }

    #[test]
    fn test_both_formulations_agree() {
        let (logits, targets) = logits_and_targets();
        let ce  = scalar(classification_loss(LossKind::CrossEntropy, logits.clone(), targets.clone()));
        let nll = scalar(classification_loss(LossKind::LogSoftmaxNll, logits, targets));
        assert!((ce - nll).abs() < 1e-5, "ce={ce} nll={nll}");
    }

    #[test]
    fn test_matches_hand_computed_value() {
        // Row 0: logits [2, 0.5, -1], target 0
        let row0 = -(2.0f32 - (2.0f32.exp() + 0.5f32.exp() + (-1.0f32).exp()).ln());
        // Row 1: logits [0.1, 0.2, 3], target 2
        let row1 = -(3.0f32 - (0.1f32.exp() + 0.2f32.exp() + 3.0f32.exp()).ln());
        // Row 2: logits [-0.5, 1.5, 0], target 0
        let row2 = -(-0.5f32 - ((-0.5f32).exp() + 1.5f32.exp() + 0.0f32.exp()).ln());
        let expected = (row0 + row1 + row2) / 3.0;

        let (logits, targets) = logits_and_targets();
        let got = scalar(classification_loss(LossKind::LogSoftmaxNll, logits, targets));
        assert!((got - expected).abs() < 1e-5, "got={got} expected={expected}");
    }

    #[test]
    fn test_uniform_logits_give_log_num_classes() {
        let device  = Default::default();
        let logits  = Tensor::<TestBackend, 2>::zeros([4, 10], &device);
        let targets = Tensor::<TestBackend, 1, Int>::from_ints([0, 3, 7, 9].as_slice(), &device);
        let got = scalar(classification_loss(LossKind::CrossEntropy, logits, targets));
        assert!((got - 10f32.ln()).abs() < 1e-5);
    }

    #[test]
    fn test_correct_predictions() {
        let (logits, targets) = logits_and_targets();
        // argmax per row: 0, 2, 1 → first two match
        assert_eq!(correct_predictions(logits, targets), 2);
    }
}
