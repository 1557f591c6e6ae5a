//! Sobel gradient operator.
//!
//! Produces a two-plane gradient image from a 2D source:
//!
//! - plane 0: convolution with the vertical kernel `ky` (derivative along rows)
//! - plane 1: convolution with the horizontal kernel `kx` (derivative along columns)
//!
//! Kernels are stored in convolution orientation. With default flags
//!
//! ```text
//!       [  1  2  1 ]         [ 1  0 -1 ]
//! ky =  [  0  0  0 ]    kx = [ 2  0 -2 ]
//!       [ -1 -2 -1 ]         [ 1  0 -1 ]
//! ```
//!
//! so plane 0 is positive where intensity grows downward and plane 1 is
//! positive where it grows to the right. `up_positive` negates `ky`,
//! `left_positive` negates `kx`.
//!
//! Responses are accumulated in `f64`. [`Sobel::apply`] casts them to the
//! dtype of the source; [`Sobel::apply_into`] casts them to the dtype of the
//! caller's output, which is how an unsigned image gets a signed result.

use crate::compare::{Similar, slices_close};
use crate::error::{RestoreError, RestoreResult};
use crate::ndimage::boundary::BoundaryMode;
use crate::ndimage::helpers::{from_f64_slice, to_f64_vec, validate_dtype};
use crate::ndimage::traits::convolution::{ConvolutionAlgorithms, Convolver};
use crate::ndimage::types::SizeMode;
use numr::dtype::DType;
use numr::runtime::cpu::CpuRuntime;
use numr::tensor::Tensor;
use serde::{Deserialize, Serialize};

#[rustfmt::skip]
const SOBEL_Y: [f64; 9] = [
     1.0,  2.0,  1.0,
     0.0,  0.0,  0.0,
    -1.0, -2.0, -1.0,
];

#[rustfmt::skip]
const SOBEL_X: [f64; 9] = [
    1.0, 0.0, -1.0,
    2.0, 0.0, -2.0,
    1.0, 0.0, -1.0,
];

/// Construction parameters for [`Sobel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SobelOptions {
    /// Positive response for intensity growing upward.
    /// Default: false
    pub up_positive: bool,

    /// Positive response for intensity growing leftward.
    /// Default: false
    pub left_positive: bool,

    /// Output extents.
    /// Default: Same
    pub size: SizeMode,

    /// Boundary extension.
    /// Default: Mirror
    pub boundary: BoundaryMode,
}

/// Sobel edge operator with precomputed 3x3 kernels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SobelOptions", into = "SobelOptions")]
pub struct Sobel {
    kernel_y: [f64; 9],
    kernel_x: [f64; 9],
    options: SobelOptions,
}

impl Default for Sobel {
    fn default() -> Self {
        Self::from_options(SobelOptions::default())
    }
}

impl From<SobelOptions> for Sobel {
    fn from(options: SobelOptions) -> Self {
        Self::from_options(options)
    }
}

impl From<Sobel> for SobelOptions {
    fn from(sobel: Sobel) -> Self {
        sobel.options
    }
}

impl Sobel {
    pub fn new(
        up_positive: bool,
        left_positive: bool,
        size: SizeMode,
        boundary: BoundaryMode,
    ) -> Self {
        Self::from_options(SobelOptions {
            up_positive,
            left_positive,
            size,
            boundary,
        })
    }

    pub fn from_options(options: SobelOptions) -> Self {
        let mut sobel = Self {
            kernel_y: SOBEL_Y,
            kernel_x: SOBEL_X,
            options,
        };
        sobel.compute_kernels();
        sobel
    }

    fn compute_kernels(&mut self) {
        let sign_y = if self.options.up_positive { -1.0 } else { 1.0 };
        let sign_x = if self.options.left_positive { -1.0 } else { 1.0 };
        self.kernel_y = SOBEL_Y.map(|v| sign_y * v);
        self.kernel_x = SOBEL_X.map(|v| sign_x * v);
    }

    pub fn options(&self) -> SobelOptions {
        self.options
    }

    pub fn up_positive(&self) -> bool {
        self.options.up_positive
    }

    pub fn left_positive(&self) -> bool {
        self.options.left_positive
    }

    pub fn size_mode(&self) -> SizeMode {
        self.options.size
    }

    pub fn boundary_mode(&self) -> BoundaryMode {
        self.options.boundary
    }

    /// Vertical-derivative kernel, row-major 3x3.
    pub fn kernel_y(&self) -> &[f64; 9] {
        &self.kernel_y
    }

    /// Horizontal-derivative kernel, row-major 3x3.
    pub fn kernel_x(&self) -> &[f64; 9] {
        &self.kernel_x
    }

    pub fn set_up_positive(&mut self, up_positive: bool) {
        self.options.up_positive = up_positive;
        self.compute_kernels();
    }

    pub fn set_left_positive(&mut self, left_positive: bool) {
        self.options.left_positive = left_positive;
        self.compute_kernels();
    }

    pub fn set_size_mode(&mut self, size: SizeMode) {
        self.options.size = size;
    }

    pub fn set_boundary_mode(&mut self, boundary: BoundaryMode) {
        self.options.boundary = boundary;
    }

    /// Apply the operator to a 2D image.
    ///
    /// # Returns
    ///
    /// Tensor of shape [2, H', W'] in the source dtype, where `(H', W')`
    /// follow the size mode.
    pub fn apply<C>(
        &self,
        client: &C,
        source: &Tensor<CpuRuntime>,
    ) -> RestoreResult<Tensor<CpuRuntime>>
    where
        C: ConvolutionAlgorithms<CpuRuntime>,
    {
        let (planes, shape) = self.gradient_planes(client, source)?;
        from_f64_slice(&planes, &shape, source.dtype(), source.device(), "sobel")
    }

    /// Apply the operator and store the result in `dst`.
    ///
    /// `dst` must be a [2, H', W'] tensor matching the output extents;
    /// anything else fails with `ShapeMismatch` and leaves `dst` untouched.
    /// The result is cast to the dtype of `dst`, so a signed or floating
    /// destination keeps negative responses of an unsigned source.
    pub fn apply_into<C>(
        &self,
        client: &C,
        source: &Tensor<CpuRuntime>,
        dst: &mut Tensor<CpuRuntime>,
    ) -> RestoreResult<()>
    where
        C: ConvolutionAlgorithms<CpuRuntime>,
    {
        if dst.ndim() != 3 || dst.shape()[0] != 2 {
            let mut expected = vec![2];
            expected.extend(dst.shape().iter().skip(1).copied());
            return Err(RestoreError::shape_mismatch(
                &expected,
                dst.shape(),
                "sobel output (one plane per kernel)",
            ));
        }
        validate_dtype(dst.dtype(), "sobel output")?;

        let (planes, shape) = self.gradient_planes(client, source)?;
        if shape[..] != *dst.shape() {
            return Err(RestoreError::shape_mismatch(&shape, dst.shape(), "sobel output"));
        }

        *dst = from_f64_slice(&planes, &shape, dst.dtype(), dst.device(), "sobel")?;
        Ok(())
    }

    /// Both gradient planes as one row-major `f64` buffer of shape [2, H', W'].
    fn gradient_planes<C>(
        &self,
        client: &C,
        source: &Tensor<CpuRuntime>,
    ) -> RestoreResult<(Vec<f64>, [usize; 3])>
    where
        C: ConvolutionAlgorithms<CpuRuntime>,
    {
        let device = source.device();
        let convolver = Convolver::new(self.options.size, self.options.boundary);
        let ky = Tensor::<CpuRuntime>::from_slice(&self.kernel_y, &[3, 3], device);
        let kx = Tensor::<CpuRuntime>::from_slice(&self.kernel_x, &[3, 3], device);

        // Accumulate in f64 so the source dtype never clips a response.
        let source = if source.dtype() == DType::F64 {
            source.clone()
        } else {
            let shape = source.shape().to_vec();
            from_f64_slice(&to_f64_vec(source, "sobel")?, &shape, DType::F64, device, "sobel")?
        };

        let grad_y = convolver.convolve2d(client, &source, &ky)?;
        let grad_x = convolver.convolve2d(client, &source, &kx)?;

        let (h, w) = (grad_y.shape()[0], grad_y.shape()[1]);
        let mut planes = to_f64_vec(&grad_y, "sobel")?;
        planes.extend(to_f64_vec(&grad_x, "sobel")?);
        Ok((planes, [2, h, w]))
    }
}

impl Similar for Sobel {
    fn is_similar_to(&self, other: &Self, r_epsilon: f64, a_epsilon: f64) -> bool {
        self.options == other.options
            && slices_close(&self.kernel_y, &other.kernel_y, r_epsilon, a_epsilon)
            && slices_close(&self.kernel_x, &other.kernel_x, r_epsilon, a_epsilon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use numr::runtime::cpu::{CpuClient, CpuDevice};

    const MODES: [BoundaryMode; 4] = [
        BoundaryMode::Zero,
        BoundaryMode::NearestNeighbour,
        BoundaryMode::Circular,
        BoundaryMode::Mirror,
    ];

    fn setup() -> (CpuClient, CpuDevice) {
        let device = CpuDevice::new();
        let client = CpuClient::new(device.clone());
        (client, device)
    }

    fn transpose3(k: &[f64; 9]) -> [f64; 9] {
        let mut t = [0.0; 9];
        for i in 0..3 {
            for j in 0..3 {
                t[j * 3 + i] = k[i * 3 + j];
            }
        }
        t
    }

    #[test]
    fn test_flags_negate_kernels() {
        let base = Sobel::default();
        let up = Sobel::new(true, false, SizeMode::Same, BoundaryMode::Mirror);
        let left = Sobel::new(false, true, SizeMode::Same, BoundaryMode::Mirror);

        for i in 0..9 {
            assert_eq!(up.kernel_y()[i], -base.kernel_y()[i]);
            assert_eq!(up.kernel_x()[i], base.kernel_x()[i]);
            assert_eq!(left.kernel_x()[i], -base.kernel_x()[i]);
            assert_eq!(left.kernel_y()[i], base.kernel_y()[i]);
        }
    }

    #[test]
    fn test_kernels_are_transposes() {
        let same = Sobel::default();
        assert_eq!(transpose3(same.kernel_y()), *same.kernel_x());

        let mixed = Sobel::new(true, false, SizeMode::Same, BoundaryMode::Mirror);
        let neg: [f64; 9] = transpose3(mixed.kernel_y()).map(|v| -v);
        assert_eq!(neg, *mixed.kernel_x());
    }

    #[test]
    fn test_uniform_image_all_zero_5x5() {
        let (client, device) = setup();
        let source = Tensor::<CpuRuntime>::from_slice(&[1.0f64; 25], &[5, 5], &device);

        let out = Sobel::default().apply(&client, &source).unwrap();
        assert_eq!(out.shape(), &[2, 5, 5]);
        assert!(out.to_vec::<f64>().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_uniform_image_zero_under_extending_modes() {
        let (client, device) = setup();
        let source = Tensor::<CpuRuntime>::from_slice(&[7.0f64; 24], &[4, 6], &device);

        for mode in [
            BoundaryMode::NearestNeighbour,
            BoundaryMode::Circular,
            BoundaryMode::Mirror,
        ] {
            let sobel = Sobel::new(false, false, SizeMode::Same, mode);
            let out = sobel.apply(&client, &source).unwrap();
            assert!(out.to_vec::<f64>().iter().all(|&v| v == 0.0), "{mode:?}");
        }

        // Zero padding only disturbs the border.
        let sobel = Sobel::new(false, false, SizeMode::Same, BoundaryMode::Zero);
        let data: Vec<f64> = sobel.apply(&client, &source).unwrap().to_vec();
        for plane in 0..2 {
            for i in 1..3 {
                for j in 1..5 {
                    assert_eq!(data[plane * 24 + i * 6 + j], 0.0);
                }
            }
        }
        assert_ne!(data[0], 0.0);
    }

    #[test]
    fn test_gradient_directions() {
        let (client, device) = setup();
        // Intensity grows downward (row index) only.
        let rows: Vec<f64> = (0..5).flat_map(|i| [i as f64; 5]).collect();
        let source = Tensor::<CpuRuntime>::from_slice(&rows, &[5, 5], &device);

        let data: Vec<f64> = Sobel::default().apply(&client, &source).unwrap().to_vec();
        // Interior pixel (2, 2): vertical response 8, horizontal 0.
        assert_eq!(data[2 * 5 + 2], 8.0);
        assert_eq!(data[25 + 2 * 5 + 2], 0.0);

        let flipped = Sobel::new(true, false, SizeMode::Same, BoundaryMode::Mirror);
        let data: Vec<f64> = flipped.apply(&client, &source).unwrap().to_vec();
        assert_eq!(data[2 * 5 + 2], -8.0);
    }

    #[test]
    fn test_horizontal_gradient() {
        let (client, device) = setup();
        let cols: Vec<f64> = (0..5).flat_map(|_| (0..5).map(|j| j as f64)).collect();
        let source = Tensor::<CpuRuntime>::from_slice(&cols, &[5, 5], &device);

        let data: Vec<f64> = Sobel::default().apply(&client, &source).unwrap().to_vec();
        assert_eq!(data[2 * 5 + 2], 0.0);
        assert_eq!(data[25 + 2 * 5 + 2], 8.0);

        let left = Sobel::new(false, true, SizeMode::Same, BoundaryMode::Mirror);
        let data: Vec<f64> = left.apply(&client, &source).unwrap().to_vec();
        assert_eq!(data[25 + 2 * 5 + 2], -8.0);
    }

    #[test]
    fn test_valid_and_full_extents() {
        let (client, device) = setup();
        let source = Tensor::<CpuRuntime>::from_slice(&[1.0f64; 30], &[5, 6], &device);

        let valid = Sobel::new(false, false, SizeMode::Valid, BoundaryMode::Zero);
        assert_eq!(valid.apply(&client, &source).unwrap().shape(), &[2, 3, 4]);

        let full = Sobel::new(false, false, SizeMode::Full, BoundaryMode::Zero);
        assert_eq!(full.apply(&client, &source).unwrap().shape(), &[2, 7, 8]);
    }

    #[test]
    fn test_integer_source_keeps_dtype() {
        let (client, device) = setup();
        let rows: Vec<i64> = (0..4).flat_map(|i| [i * 10; 4]).collect();
        let source = Tensor::<CpuRuntime>::from_slice(&rows, &[4, 4], &device);

        let out = Sobel::default().apply(&client, &source).unwrap();
        assert_eq!(out.dtype(), DType::I64);
        let data: Vec<i64> = out.to_vec();
        assert_eq!(data[5], 80);
    }

    #[test]
    fn test_apply_into_checks_leading_extent() {
        let (client, device) = setup();
        let source = Tensor::<CpuRuntime>::from_slice(&[1.0f64; 25], &[5, 5], &device);
        let sobel = Sobel::default();

        let mut bad = Tensor::<CpuRuntime>::zeros(&[3, 5, 5], DType::F64, &device);
        assert!(matches!(
            sobel.apply_into(&client, &source, &mut bad),
            Err(RestoreError::ShapeMismatch { .. })
        ));
        assert_eq!(bad.shape(), &[3, 5, 5]);

        let mut wrong_extent = Tensor::<CpuRuntime>::zeros(&[2, 4, 5], DType::F64, &device);
        assert!(matches!(
            sobel.apply_into(&client, &source, &mut wrong_extent),
            Err(RestoreError::ShapeMismatch { .. })
        ));

        let mut dst = Tensor::<CpuRuntime>::zeros(&[2, 5, 5], DType::F64, &device);
        sobel.apply_into(&client, &source, &mut dst).unwrap();
        assert!(dst.to_vec::<f64>().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_apply_into_keeps_output_dtype() {
        let (client, device) = setup();
        let rows: Vec<i32> = (0..4).flat_map(|i| [i * 10; 4]).collect();
        let source = Tensor::<CpuRuntime>::from_slice(&rows, &[4, 4], &device);

        let mut dst = Tensor::<CpuRuntime>::zeros(&[2, 4, 4], DType::F64, &device);
        Sobel::default().apply_into(&client, &source, &mut dst).unwrap();
        assert_eq!(dst.dtype(), DType::F64);
        assert_eq!(dst.to_vec::<f64>()[5], 80.0);
    }

    #[test]
    fn test_u8_source_into_signed_output() {
        let (client, device) = setup();
        let rows: Vec<u8> = [150u8, 100, 50, 0].iter().flat_map(|&v| [v; 4]).collect();
        let source = Tensor::<CpuRuntime>::from_slice(&rows, &[4, 4], &device);
        let sobel = Sobel::default();

        let mut dst = Tensor::<CpuRuntime>::zeros(&[2, 4, 4], DType::I32, &device);
        sobel.apply_into(&client, &source, &mut dst).unwrap();
        assert_eq!(dst.dtype(), DType::I32);
        let data: Vec<i32> = dst.to_vec();
        assert_eq!(data[5], -400);
        assert_eq!(data[16 + 5], 0);

        // Same dtype as the source: negative responses saturate at zero.
        let same = sobel.apply(&client, &source).unwrap();
        assert_eq!(same.dtype(), DType::U8);
        assert_eq!(same.to_vec::<u8>()[5], 0);
    }

    #[test]
    fn test_equality_and_similarity() {
        let a = Sobel::default();
        let b = Sobel::new(false, false, SizeMode::Same, BoundaryMode::Mirror);
        assert_eq!(a, b);
        assert!(a.is_similar_to(&b, 0.0, 0.0));

        let mut c = b.clone();
        c.kernel_y[0] += 1e-10;
        assert_ne!(a, c);
        assert!(a.is_similar_to(&c, 1e-5, 1e-8));
        c.kernel_y[0] += 1e-3;
        assert!(!a.is_similar_to(&c, 1e-5, 1e-8));

        let d = Sobel::new(false, false, SizeMode::Same, BoundaryMode::Circular);
        assert!(!a.is_similar_to(&d, 1.0, 1.0));
    }

    #[test]
    fn test_setters_regenerate_kernels() {
        let mut sobel = Sobel::default();
        sobel.set_up_positive(true);
        sobel.set_left_positive(true);
        assert_eq!(sobel, Sobel::new(true, true, SizeMode::Same, BoundaryMode::Mirror));

        sobel.set_boundary_mode(BoundaryMode::Zero);
        sobel.set_size_mode(SizeMode::Valid);
        assert_eq!(sobel.boundary_mode(), BoundaryMode::Zero);
        assert_eq!(sobel.size_mode(), SizeMode::Valid);
    }

    #[test]
    fn test_serde_round_trip() {
        let sobel = Sobel::new(true, false, SizeMode::Full, BoundaryMode::Circular);
        let json = serde_json::to_string(&sobel).unwrap();
        let back: Sobel = serde_json::from_str(&json).unwrap();
        assert_eq!(sobel, back);
        assert_eq!(sobel.options(), back.options());
    }

    #[test]
    fn test_modes_cover_each_boundary() {
        let (client, device) = setup();
        let source = Tensor::<CpuRuntime>::from_slice(&[2.0f64; 9], &[3, 3], &device);
        for mode in MODES {
            let out = Sobel::new(false, false, SizeMode::Same, mode)
                .apply(&client, &source)
                .unwrap();
            assert_eq!(out.shape(), &[2, 3, 3]);
        }
    }
}
