//! CPU implementation of boundary-aware convolution.

use crate::error::RestoreResult;
use crate::ndimage::boundary::BoundaryMode;
use crate::ndimage::helpers::{
    flip_2d, from_f64_slice, to_f64_vec, validate_dtype, validate_non_empty, validate_rank,
};
use crate::ndimage::traits::convolution::ConvolutionAlgorithms;
use crate::ndimage::types::SizeMode;
use log::trace;
use numr::runtime::cpu::{CpuClient, CpuRuntime};
use numr::tensor::Tensor;
use rayon::prelude::*;

impl ConvolutionAlgorithms<CpuRuntime> for CpuClient {
    fn convolve(
        &self,
        signal: &Tensor<CpuRuntime>,
        kernel: &Tensor<CpuRuntime>,
        size: SizeMode,
        boundary: BoundaryMode,
    ) -> RestoreResult<Tensor<CpuRuntime>> {
        validate_rank(signal, 1, "convolve signal")?;
        validate_rank(kernel, 1, "convolve kernel")?;
        validate_dtype(signal.dtype(), "convolve")?;
        validate_non_empty(signal.shape(), "convolve signal")?;
        validate_non_empty(kernel.shape(), "convolve kernel")?;

        let n = signal.shape()[0];
        let m = kernel.shape()[0];
        let src = to_f64_vec(signal, "convolve")?;
        let ker = to_f64_vec(kernel, "convolve")?;

        trace!("convolve: signal [{n}], kernel [{m}], {size:?}, {boundary:?}");
        let (out, shape) = convolve2d_direct(&src, (1, n), &ker, (1, m), size, boundary)?;

        from_f64_slice(
            &out,
            &shape[1..],
            signal.dtype(),
            signal.device(),
            "convolve",
        )
    }

    fn convolve2d(
        &self,
        signal: &Tensor<CpuRuntime>,
        kernel: &Tensor<CpuRuntime>,
        size: SizeMode,
        boundary: BoundaryMode,
    ) -> RestoreResult<Tensor<CpuRuntime>> {
        convolve2d_cpu(signal, kernel, size, boundary, false)
    }

    fn correlate2d(
        &self,
        signal: &Tensor<CpuRuntime>,
        kernel: &Tensor<CpuRuntime>,
        size: SizeMode,
        boundary: BoundaryMode,
    ) -> RestoreResult<Tensor<CpuRuntime>> {
        convolve2d_cpu(signal, kernel, size, boundary, true)
    }
}

fn convolve2d_cpu(
    signal: &Tensor<CpuRuntime>,
    kernel: &Tensor<CpuRuntime>,
    size: SizeMode,
    boundary: BoundaryMode,
    flip_kernel: bool,
) -> RestoreResult<Tensor<CpuRuntime>> {
    let op = if flip_kernel { "correlate2d" } else { "convolve2d" };

    validate_rank(signal, 2, op)?;
    validate_rank(kernel, 2, op)?;
    validate_dtype(signal.dtype(), op)?;
    validate_non_empty(signal.shape(), op)?;
    validate_non_empty(kernel.shape(), op)?;

    let (h, w) = (signal.shape()[0], signal.shape()[1]);
    let (kh, kw) = (kernel.shape()[0], kernel.shape()[1]);

    let src = to_f64_vec(signal, op)?;
    let mut ker = to_f64_vec(kernel, op)?;
    if flip_kernel {
        ker = flip_2d(&ker, kh, kw);
    }

    trace!("{op}: signal [{h}, {w}], kernel [{kh}, {kw}], {size:?}, {boundary:?}");
    let (out, shape) = convolve2d_direct(&src, (h, w), &ker, (kh, kw), size, boundary)?;

    from_f64_slice(&out, &shape, signal.dtype(), signal.device(), op)
}

/// Direct 2D convolution over row-major `f64` buffers.
///
/// Output rows are evaluated in parallel; each cell is accumulated in a fixed
/// order, so the result does not depend on scheduling.
pub(crate) fn convolve2d_direct(
    src: &[f64],
    (h, w): (usize, usize),
    kernel: &[f64],
    (kh, kw): (usize, usize),
    size: SizeMode,
    boundary: BoundaryMode,
) -> RestoreResult<(Vec<f64>, [usize; 2])> {
    let out_shape = size.output_shape(&[h, w], &[kh, kw])?;
    let (oh, ow) = (out_shape[0], out_shape[1]);
    let start_h = size.slice_start(kh) as isize;
    let start_w = size.slice_start(kw) as isize;

    let mut out = vec![0.0f64; oh * ow];
    out.par_chunks_mut(ow).enumerate().for_each(|(i, row)| {
        let fi = i as isize + start_h;
        for (j, cell) in row.iter_mut().enumerate() {
            let fj = j as isize + start_w;
            let mut acc = 0.0;
            for u in 0..kh {
                let Some(si) = boundary.resolve(fi - u as isize, h) else {
                    continue;
                };
                let src_row = &src[si * w..(si + 1) * w];
                let ker_row = &kernel[u * kw..(u + 1) * kw];
                for (v, &k) in ker_row.iter().enumerate() {
                    if let Some(sj) = boundary.resolve(fj - v as isize, w) {
                        acc += src_row[sj] * k;
                    }
                }
            }
            *cell = acc;
        }
    });

    Ok((out, [oh, ow]))
}
