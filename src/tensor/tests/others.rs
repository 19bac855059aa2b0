use crate::assert_panic;
use crate::tensor::Tensor;
use approx::assert_abs_diff_eq;

#[test]
fn test_broadcast_add_and_scalar_ops() {
    let a = Tensor::new(&[1., 2., 3., 4.], &[2, 2]);
    let row = Tensor::new(&[10., 20.], &[1, 2]);
    assert_eq!(&a + &row, Tensor::new(&[11., 22., 13., 24.], &[2, 2]));
    assert_eq!((&a + 1.) * 0.5, Tensor::new(&[1., 1.5, 2., 2.5], &[2, 2]));
    assert_eq!(2. * &a, Tensor::new(&[2., 4., 6., 8.], &[2, 2]));

    let incompatible = Tensor::new(&[1., 2., 3.], &[3]);
    assert_panic!(&a + &incompatible);
}

#[test]
fn test_sum_and_mean_axis() {
    let tensor = Tensor::new(&[1., 2., 3., 4., 5., 6.], &[2, 3]);
    assert_eq!(tensor.sum(), Tensor::from(21.));
    assert_eq!(
        tensor.mean_axis(1).unwrap(),
        Tensor::new(&[2., 5.], &[2])
    );
    assert_eq!(
        tensor.sum_axis(0).unwrap(),
        Tensor::new(&[5., 7., 9.], &[3])
    );
    assert!(tensor.mean_axis(2).is_err());
}

#[test]
fn test_mat_mul() {
    let a = Tensor::new(&[1., 2., 3., 4., 5., 6.], &[2, 3]);
    let b = Tensor::new(&[1., 0., 0., 1., 1., 1.], &[3, 2]);
    assert_eq!(
        a.mat_mul(&b).unwrap(),
        Tensor::new(&[4., 5., 10., 11.], &[2, 2])
    );
    assert!(a.mat_mul(&a).is_err());
}

#[test]
fn test_sigmoid() {
    let tensor = Tensor::new(&[0.5, -1.0, 0.0, 2.0], &[2, 2]);
    let output = tensor.sigmoid();
    assert_abs_diff_eq!(output[[0, 0]], 0.62245935, epsilon = 1e-6);
    assert_abs_diff_eq!(output[[0, 1]], 0.26894143, epsilon = 1e-6);
    assert_abs_diff_eq!(output[[1, 0]], 0.5, epsilon = 1e-6);
    assert_abs_diff_eq!(output[[1, 1]], 0.88079703, epsilon = 1e-6);
}

#[test]
fn test_log_softmax_last() {
    let tensor = Tensor::new(&[1., 2., 3., 1., f32::NEG_INFINITY, 1.], &[2, 3]);
    let output = tensor.log_softmax_last().unwrap();
    for row in 0..2 {
        let prob_sum: f32 = (0..3).map(|c| output[[row, c]].exp()).sum();
        assert_abs_diff_eq!(prob_sum, 1.0, epsilon = 1e-6);
    }
    assert_eq!(output[[1, 1]], f32::NEG_INFINITY);
    assert_abs_diff_eq!(output[[1, 0]], 0.5f32.ln(), epsilon = 1e-6);

    // 整行为-inf时输出NaN
    let all_masked = Tensor::new(&[f32::NEG_INFINITY; 3], &[1, 3]);
    assert!(all_masked.log_softmax_last().unwrap().has_nan());
}
