//! Host-side conversion between numr tensors and `f64` working buffers.
//!
//! Every operation in this crate accumulates in `f64` regardless of the
//! element type of its inputs, then casts back to the caller's dtype.

use crate::error::{RestoreError, RestoreResult};
use numr::dtype::DType;
use numr::runtime::Runtime;
use numr::runtime::cpu::CpuRuntime;
use numr::tensor::Tensor;

/// Element types accepted by the CPU kernels.
pub(crate) fn validate_dtype(dtype: DType, op: &'static str) -> RestoreResult<()> {
    match dtype {
        DType::F64 | DType::F32 | DType::I64 | DType::I32 | DType::U8 => Ok(()),
        _ => Err(RestoreError::UnsupportedDType { dtype, op }),
    }
}

/// Require a tensor of the given rank.
pub(crate) fn validate_rank(
    tensor: &Tensor<CpuRuntime>,
    rank: usize,
    context: &str,
) -> RestoreResult<()> {
    if tensor.ndim() != rank {
        return Err(RestoreError::ShapeMismatch {
            expected: Vec::new(),
            got: tensor.shape().to_vec(),
            context: format!("{context} (rank {rank} required)"),
        });
    }
    Ok(())
}

/// Require every axis to be non-empty.
pub(crate) fn validate_non_empty(shape: &[usize], context: &str) -> RestoreResult<()> {
    if shape.iter().any(|&d| d == 0) {
        return Err(RestoreError::invalid_shape(shape, context));
    }
    Ok(())
}

/// Copy a tensor to the host as contiguous `f64` values.
pub(crate) fn to_f64_vec(tensor: &Tensor<CpuRuntime>, op: &'static str) -> RestoreResult<Vec<f64>> {
    let contig = tensor.contiguous();
    let data = match contig.dtype() {
        DType::F64 => contig.to_vec::<f64>(),
        DType::F32 => contig.to_vec::<f32>().into_iter().map(f64::from).collect(),
        DType::I64 => contig.to_vec::<i64>().into_iter().map(|v| v as f64).collect(),
        DType::I32 => contig.to_vec::<i32>().into_iter().map(f64::from).collect(),
        DType::U8 => contig.to_vec::<u8>().into_iter().map(f64::from).collect(),
        dtype => return Err(RestoreError::UnsupportedDType { dtype, op }),
    };
    Ok(data)
}

/// Build a tensor of `dtype` from `f64` values.
///
/// Float to integer casts truncate toward zero and saturate at the type
/// bounds; choosing a signed, wide enough type is the caller's concern.
pub(crate) fn from_f64_slice(
    data: &[f64],
    shape: &[usize],
    dtype: DType,
    device: &<CpuRuntime as Runtime>::Device,
    op: &'static str,
) -> RestoreResult<Tensor<CpuRuntime>> {
    let tensor = match dtype {
        DType::F64 => Tensor::<CpuRuntime>::from_slice(data, shape, device),
        DType::F32 => {
            let cast: Vec<f32> = data.iter().map(|&v| v as f32).collect();
            Tensor::<CpuRuntime>::from_slice(&cast, shape, device)
        }
        DType::I64 => {
            let cast: Vec<i64> = data.iter().map(|&v| v as i64).collect();
            Tensor::<CpuRuntime>::from_slice(&cast, shape, device)
        }
        DType::I32 => {
            let cast: Vec<i32> = data.iter().map(|&v| v as i32).collect();
            Tensor::<CpuRuntime>::from_slice(&cast, shape, device)
        }
        DType::U8 => {
            let cast: Vec<u8> = data.iter().map(|&v| v as u8).collect();
            Tensor::<CpuRuntime>::from_slice(&cast, shape, device)
        }
        _ => return Err(RestoreError::UnsupportedDType { dtype, op }),
    };
    Ok(tensor)
}

/// Flip a row-major `h x w` buffer along both axes.
pub(crate) fn flip_2d(src: &[f64], h: usize, w: usize) -> Vec<f64> {
    let mut dst = vec![0.0; h * w];
    for i in 0..h {
        for j in 0..w {
            dst[i * w + j] = src[(h - 1 - i) * w + (w - 1 - j)];
        }
    }
    dst
}
