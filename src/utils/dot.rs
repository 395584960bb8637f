//! SIMD-aware bf16 dot-product kernels.
//!
//! Operands stay in bf16 in memory and are widened to f32 in registers: a
//! bf16 value is the upper half of the f32 with the same bits, so widening is
//! a zero-extend and a 16-bit shift. Accumulation happens in f32.

use half::bf16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DotKernel {
    Scalar,
    #[cfg(target_arch = "x86_64")]
    Avx2Fma,
    #[cfg(target_arch = "x86_64")]
    Avx512Fma,
}

impl DotKernel {
    #[inline(always)]
    pub(crate) fn detect() -> Self {
        #[cfg(target_arch = "x86_64")]
        {
            if std::is_x86_feature_detected!("avx512f") && std::is_x86_feature_detected!("fma") {
                return DotKernel::Avx512Fma;
            }
            if std::is_x86_feature_detected!("avx2") && std::is_x86_feature_detected!("fma") {
                return DotKernel::Avx2Fma;
            }
        }

        DotKernel::Scalar
    }

    pub(crate) fn name(&self) -> &'static str {
        match self {
            DotKernel::Scalar => "scalar",
            #[cfg(target_arch = "x86_64")]
            DotKernel::Avx2Fma => "avx2+fma",
            #[cfg(target_arch = "x86_64")]
            DotKernel::Avx512Fma => "avx512f+fma",
        }
    }
}

/// Dot product of the common prefix of `a` and `b`.
///
/// `kernel` must come from [`DotKernel::detect`] on the running CPU.
#[inline(always)]
pub(crate) fn dot_bf16(kernel: DotKernel, a: &[bf16], b: &[bf16]) -> f32 {
    let len = a.len().min(b.len());
    let (a, b) = (&a[..len], &b[..len]);

    match kernel {
        DotKernel::Scalar => dot_scalar(a, b),
        #[cfg(target_arch = "x86_64")]
        DotKernel::Avx2Fma => unsafe {
            x86_64::dot_avx2_fma_impl(a.as_ptr().cast(), b.as_ptr().cast(), len)
        },
        #[cfg(target_arch = "x86_64")]
        DotKernel::Avx512Fma => unsafe {
            x86_64::dot_avx512_fma_impl(a.as_ptr().cast(), b.as_ptr().cast(), len)
        },
    }
}

#[inline(always)]
fn dot_scalar(a: &[bf16], b: &[bf16]) -> f32 {
    let mut sums = [0.0f32; 4];

    let mut a_chunks = a.chunks_exact(4);
    let mut b_chunks = b.chunks_exact(4);
    for (a4, b4) in a_chunks.by_ref().zip(b_chunks.by_ref()) {
        for lane in 0..4 {
            sums[lane] = a4[lane].to_f32().mul_add(b4[lane].to_f32(), sums[lane]);
        }
    }

    let mut sum = (sums[0] + sums[1]) + (sums[2] + sums[3]);
    for (av, bv) in a_chunks.remainder().iter().zip(b_chunks.remainder()) {
        sum = av.to_f32().mul_add(bv.to_f32(), sum);
    }

    sum
}

#[cfg(target_arch = "x86_64")]
mod x86_64 {
    use core::arch::x86_64::*;

    #[inline(always)]
    unsafe fn widen_scalar(p: *const u16) -> f32 {
        f32::from_bits((unsafe { *p } as u32) << 16)
    }

    #[inline]
    #[target_feature(enable = "avx2")]
    unsafe fn load_bf16x8(p: *const u16) -> __m256 {
        let raw = unsafe { _mm_loadu_si128(p.cast::<__m128i>()) };
        _mm256_castsi256_ps(_mm256_slli_epi32(_mm256_cvtepu16_epi32(raw), 16))
    }

    #[inline]
    #[target_feature(enable = "avx512f")]
    unsafe fn load_bf16x16(p: *const u16) -> __m512 {
        let raw = unsafe { _mm256_loadu_si256(p.cast::<__m256i>()) };
        _mm512_castsi512_ps(_mm512_slli_epi32(_mm512_cvtepu16_epi32(raw), 16))
    }

    #[target_feature(enable = "avx2,fma")]
    pub(super) unsafe fn dot_avx2_fma_impl(a: *const u16, b: *const u16, len: usize) -> f32 {
        unsafe fn hsum256(v: __m256) -> f32 {
            let mut tmp = [0.0f32; 8];
            unsafe { _mm256_storeu_ps(tmp.as_mut_ptr(), v) };
            tmp.iter().sum()
        }

        let mut acc0 = _mm256_setzero_ps();
        let mut acc1 = _mm256_setzero_ps();
        let mut i = 0usize;

        while i + 16 <= len {
            let va0 = unsafe { load_bf16x8(a.add(i)) };
            let vb0 = unsafe { load_bf16x8(b.add(i)) };
            let va1 = unsafe { load_bf16x8(a.add(i + 8)) };
            let vb1 = unsafe { load_bf16x8(b.add(i + 8)) };
            acc0 = _mm256_fmadd_ps(va0, vb0, acc0);
            acc1 = _mm256_fmadd_ps(va1, vb1, acc1);
            i += 16;
        }

        while i + 8 <= len {
            let va = unsafe { load_bf16x8(a.add(i)) };
            let vb = unsafe { load_bf16x8(b.add(i)) };
            acc0 = _mm256_fmadd_ps(va, vb, acc0);
            i += 8;
        }

        let mut sum = unsafe { hsum256(_mm256_add_ps(acc0, acc1)) };
        while i < len {
            let av = unsafe { widen_scalar(a.add(i)) };
            let bv = unsafe { widen_scalar(b.add(i)) };
            sum = av.mul_add(bv, sum);
            i += 1;
        }

        sum
    }

    #[target_feature(enable = "avx512f,fma")]
    pub(super) unsafe fn dot_avx512_fma_impl(a: *const u16, b: *const u16, len: usize) -> f32 {
        unsafe fn hsum512(v: __m512) -> f32 {
            let mut tmp = [0.0f32; 16];
            unsafe { _mm512_storeu_ps(tmp.as_mut_ptr(), v) };
            tmp.iter().sum()
        }

        let mut acc = _mm512_setzero_ps();
        let mut i = 0usize;

        while i + 16 <= len {
            let va = unsafe { load_bf16x16(a.add(i)) };
            let vb = unsafe { load_bf16x16(b.add(i)) };
            acc = _mm512_fmadd_ps(va, vb, acc);
            i += 16;
        }

        let mut sum = unsafe { hsum512(acc) };
        while i < len {
            let av = unsafe { widen_scalar(a.add(i)) };
            let bv = unsafe { widen_scalar(b.add(i)) };
            sum = av.mul_add(bv, sum);
            i += 1;
        }

        sum
    }
}
