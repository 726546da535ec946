// ============================================================
// Layer 5 — Autograd Demonstration
// ============================================================
// The smallest possible look at reverse-mode differentiation,
// done entirely by Burn's Autodiff backend:
//
//   x = random normal tensor, marked require_grad
//   y = x²               (element-wise)
//   z = mean(y)          (scalar)
//   z.backward()         → gradients for every tracked tensor
//   x.grad(&grads)       → dz/dx
//
// Analytically dz/dx = 2x / n where n is the element count,
// so for the classic 2x2 case the gradient is exactly x / 2.
// We report both and the largest difference between them.
//
// Reference: Burn Book §3 (Autodiff)

use anyhow::{bail, Context, Result};
use burn::{
    prelude::*,
    tensor::{backend::AutodiffBackend, Distribution},
};

use crate::domain::settings::BackendKind;
use crate::ml::backend::{cpu_device, gpu_device, CpuAutodiff, GpuAutodiff};

/// Everything the `autograd` command shows.
#[derive(Debug, Clone)]
pub struct AutogradDemo {
    pub shape:         [usize; 2],
    pub tracks_grad:   bool,
    pub x:             Vec<f32>,
    pub y:             Vec<f32>,
    pub z:             f32,
    pub grad:          Vec<f32>,
    pub expected_grad: Vec<f32>,
    pub max_abs_error: f32,
}

pub fn run_square_mean(backend: BackendKind, rows: usize, cols: usize) -> Result<AutogradDemo> {
    match backend {
        BackendKind::Cpu  => square_mean_demo::<CpuAutodiff>(rows, cols, &cpu_device()),
        BackendKind::Wgpu => square_mean_demo::<GpuAutodiff>(rows, cols, &gpu_device()),
    }
}

pub fn square_mean_demo<B: AutodiffBackend>(
    rows:   usize,
    cols:   usize,
    device: &B::Device,
) -> Result<AutogradDemo> {
    if rows == 0 || cols == 0 {
        bail!("autograd demo needs a non-empty tensor, got {}x{}", rows, cols);
    }

    let x = Tensor::<B, 2>::random([rows, cols], Distribution::Normal(0.0, 1.0), device)
        .require_grad();
    let y = x.clone().powf_scalar(2.0);
    let z = y.clone().mean();

    let grads = z.backward();
    let grad  = x
        .grad(&grads)
        .context("x carries no gradient after backward()")?;

    let n             = (rows * cols) as f32;
    let x_vals: Vec<f32>    = x.clone().into_data().iter::<f32>().collect();
    let expected: Vec<f32>  = x_vals.iter().map(|v| 2.0 * v / n).collect();
    let grad_vals: Vec<f32> = grad.into_data().iter::<f32>().collect();

    let max_abs_error = grad_vals
        .iter()
        .zip(&expected)
        .map(|(g, e)| (g - e).abs())
        .fold(0.0f32, f32::max);

    tracing::debug!("autograd demo on {}x{}: max |grad - 2x/n| = {:e}", rows, cols, max_abs_error);

    Ok(AutogradDemo {
        shape:         [rows, cols],
        tracks_grad:   x.is_require_grad(),
        y:             y.into_data().iter::<f32>().collect(),
        z:             z.into_scalar().elem::<f32>(),
        x:             x_vals,
        grad:          grad_vals,
        expected_grad: expected,
        max_abs_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_is_half_of_x_for_2x2() {
        let demo = square_mean_demo::<CpuAutodiff>(2, 2, &cpu_device()).unwrap();

        assert!(demo.tracks_grad);
        assert_eq!(demo.grad.len(), 4);
        for (g, x) in demo.grad.iter().zip(&demo.x) {
            assert!((g - x / 2.0).abs() < 1e-5, "grad {g} vs x/2 {}", x / 2.0);
        }
        assert!(demo.max_abs_error < 1e-5);
    }

    #[test]
    fn test_forward_values() {
        let demo = square_mean_demo::<CpuAutodiff>(3, 5, &cpu_device()).unwrap();

        for (y, x) in demo.y.iter().zip(&demo.x) {
            assert!((y - x * x).abs() < 1e-5);
        }
        let mean = demo.y.iter().sum::<f32>() / 15.0;
        assert!((demo.z - mean).abs() < 1e-5);
        assert!(demo.max_abs_error < 1e-5);
    }

    #[test]
    fn test_empty_shape_rejected() {
        assert!(square_mean_demo::<CpuAutodiff>(0, 3, &cpu_device()).is_err());
    }
}
