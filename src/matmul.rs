//! Dense matrix product used by `matrix::multiply`.
//!
//! A plain triple loop over row-major buffers. Layer widths are small, so there is
//! no blocking or tiling.

/// `c = a * b` where `a` is `(m, k)`, `b` is `(k, n)` and `c` is `(m, n)`, all row-major.
#[inline]
pub(crate) fn matmul_into(m: usize, n: usize, k: usize, a: &[f32], b: &[f32], c: &mut [f32]) {
    debug_assert_eq!(a.len(), m * k);
    debug_assert_eq!(b.len(), k * n);
    debug_assert_eq!(c.len(), m * n);

    for i in 0..m {
        let a_row = &a[i * k..(i + 1) * k];
        for j in 0..n {
            let mut acc = 0.0_f32;
            for (p, &av) in a_row.iter().enumerate() {
                acc = av.mul_add(b[p * n + j], acc);
            }
            c[i * n + j] = acc;
        }
    }
}
