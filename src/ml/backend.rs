// ============================================================
// Layer 5 — Backend Selection
// ============================================================
// Every ML routine is generic over Burn's Backend /
// AutodiffBackend traits. This module names the concrete
// backends and the devices they run on, so the dispatch from
// BackendKind happens in one obvious place per entry point.
//
//   BackendKind::Cpu  → NdArray            (always available)
//   BackendKind::Wgpu → Wgpu               (Vulkan / Metal / DX12)
//
// Training wraps these in Autodiff<...>; evaluation and
// inference use the plain backend, which has no graph
// bookkeeping.

use burn::backend::{
    ndarray::NdArrayDevice,
    wgpu::WgpuDevice,
    Autodiff, NdArray, Wgpu,
};

pub type CpuBackend     = NdArray;
pub type GpuBackend     = Wgpu;
pub type CpuAutodiff    = Autodiff<CpuBackend>;
pub type GpuAutodiff    = Autodiff<GpuBackend>;

pub fn cpu_device() -> NdArrayDevice {
    NdArrayDevice::default()
}

pub fn gpu_device() -> WgpuDevice {
    WgpuDevice::default()
}
