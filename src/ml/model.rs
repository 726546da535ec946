use burn::{
    nn::{Linear, LinearConfig, Relu},
    prelude::*,
    tensor::activation::softmax,
};

use crate::domain::settings::LossKind;
use crate::ml::loss::classification_loss;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct MlpConfig {
    /// Flattened image size (28 * 28 for MNIST)
    #[config(default = 784)]
    pub input_size:   usize,
    /// Width of each hidden layer, in order
    #[config(default = "vec![128, 64]")]
    pub hidden_sizes: Vec<usize>,
    #[config(default = 10)]
    pub num_classes:  usize,
}

impl MlpConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> Mlp<B> {
        let mut fan_in = self.input_size;
        let mut hidden = Vec::with_capacity(self.hidden_sizes.len());
        for &width in &self.hidden_sizes {
            hidden.push(LinearConfig::new(fan_in, width).init(device));
            fan_in = width;
        }
        let output = LinearConfig::new(fan_in, self.num_classes).init(device);
        Mlp { hidden, output, activation: Relu::new() }
    }
}

/// Feed-forward classifier: (Linear → ReLU)* → Linear.
///
/// The output layer has no activation; `forward` returns logits and the
/// softmax is applied only where probabilities are needed.
#[derive(Module, Debug)]
pub struct Mlp<B: Backend> {
    pub hidden:     Vec<Linear<B>>,
    pub output:     Linear<B>,
    pub activation: Relu,
}

impl<B: Backend> Mlp<B> {
    /// images: [batch, input_size] → logits: [batch, num_classes]
    pub fn forward(&self, images: Tensor<B, 2>) -> Tensor<B, 2> {
        let mut x = images;
        for layer in &self.hidden {
            x = self.activation.forward(layer.forward(x));
        }
        self.output.forward(x)
    }

    /// Loss for a batch plus the logits it was computed from.
    pub fn forward_loss(
        &self,
        images:  Tensor<B, 2>,
        targets: Tensor<B, 1, Int>,
        loss:    LossKind,
    ) -> (Tensor<B, 1>, Tensor<B, 2>) {
        let logits = self.forward(images);
        let loss   = classification_loss(loss, logits.clone(), targets);
        (loss, logits)
    }

    /// Softmax over the class dimension: every row sums to 1.
    pub fn probabilities(&self, images: Tensor<B, 2>) -> Tensor<B, 2> {
        softmax(self.forward(images), 1)
    }

    /// The layer that sees the raw pixels
    pub fn first_layer(&self) -> &Linear<B> {
        self.hidden.first().unwrap_or(&self.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_logits_shape() {
        let device = Default::default();
        let model: Mlp<TestBackend> = MlpConfig::new().init(&device);

        assert_eq!(model.hidden.len(), 2);
        let images = Tensor::<TestBackend, 2>::zeros([5, 784], &device);
        assert_eq!(model.forward(images).dims(), [5, 10]);
    }

    #[test]
    fn test_custom_widths() {
        let device = Default::default();
        let model: Mlp<TestBackend> = MlpConfig::new()
            .with_input_size(16)
            .with_hidden_sizes(vec![8, 6, 4])
            .with_num_classes(3)
            .init(&device);

        assert_eq!(model.hidden.len(), 3);
        assert_eq!(model.first_layer().weight.val().dims(), [16, 8]);
        assert_eq!(model.output.weight.val().dims(), [4, 3]);

        let images = Tensor::<TestBackend, 2>::ones([2, 16], &device);
        assert_eq!(model.forward(images).dims(), [2, 3]);
    }

    #[test]
    fn test_no_hidden_layers_is_logistic_regression() {
        let device = Default::default();
        let model: Mlp<TestBackend> = MlpConfig::new()
            .with_input_size(4)
            .with_hidden_sizes(Vec::new())
            .with_num_classes(2)
            .init(&device);

        assert!(model.hidden.is_empty());
        assert_eq!(model.first_layer().weight.val().dims(), [4, 2]);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let device = Default::default();
        let model: Mlp<TestBackend> = MlpConfig::new().init(&device);
        let images = Tensor::<TestBackend, 2>::random(
            [3, 784],
            burn::tensor::Distribution::Uniform(-1.0, 1.0),
            &device,
        );

        let sums: Vec<f32> = model
            .probabilities(images)
            .sum_dim(1)
            .into_data()
            .iter::<f32>()
            .collect();
        assert_eq!(sums.len(), 3);
        for s in sums {
            assert!((s - 1.0).abs() < 1e-5, "row sums to {s}");
        }
    }
}
