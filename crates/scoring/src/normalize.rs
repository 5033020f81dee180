/// Scale `v` to unit length, accumulating the norm in `f64` like
/// [`cosine_similarity`](crate::cosine_similarity).
///
/// Zero and non-finite vectors are left untouched.
pub fn l2_normalize_in_place(v: &mut [f32]) {
    let norm = v
        .iter()
        .map(|&x| f64::from(x) * f64::from(x))
        .sum::<f64>()
        .sqrt();
    if norm == 0.0 || !norm.is_finite() {
        return;
    }
    for x in v.iter_mut() {
        *x = (f64::from(*x) / norm) as f32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn l2_normalize_simple_vector() {
        let mut v = vec![3.0f32, 4.0];
        l2_normalize_in_place(&mut v);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn l2_normalize_zero_vector() {
        let mut v = vec![0.0f32, 0.0, 0.0];
        l2_normalize_in_place(&mut v);
        assert_eq!(v, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn l2_normalize_negative_values() {
        let mut v = vec![-3.0f32, -4.0];
        l2_normalize_in_place(&mut v);
        assert!((v[0] + 0.6).abs() < 1e-6);
        assert!((v[1] + 0.8).abs() < 1e-6);
    }

    #[test]
    fn l2_normalize_empty_slice() {
        let mut v: Vec<f32> = vec![];
        l2_normalize_in_place(&mut v);
        assert!(v.is_empty());
    }

    #[test]
    fn l2_normalize_large_components_do_not_overflow() {
        // x * x overflows f32 here.
        let mut v = vec![3.0e20f32, 4.0e20];
        l2_normalize_in_place(&mut v);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn l2_normalize_leaves_nan_alone() {
        let mut v = vec![f32::NAN, 1.0];
        l2_normalize_in_place(&mut v);
        assert!(v[0].is_nan());
        assert_eq!(v[1], 1.0);
    }

    #[test]
    fn l2_normalize_idempotent() {
        let mut v = vec![1.0f32, 2.0, 3.0];
        l2_normalize_in_place(&mut v);
        let first_result = v.clone();
        l2_normalize_in_place(&mut v);
        for (a, b) in v.iter().zip(first_result.iter()) {
            assert!((a - b).abs() < 1e-6, "{a} vs {b}");
        }
    }
}
