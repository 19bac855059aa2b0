use crate::errors::TensorError;
use crate::tensor::Tensor;

#[test]
fn test_reshape() {
    let tensor = Tensor::new(&[1., 2., 3., 4., 5., 6.], &[2, 3]);
    let reshaped = tensor.reshape(&[3, 2]).unwrap();
    assert_eq!(reshaped, Tensor::new(&[1., 2., 3., 4., 5., 6.], &[3, 2]));
    assert_eq!(tensor.reshape(&[4, 2]), Err(TensorError::IncompatibleShape));
}

#[test]
fn test_transpose_last2() {
    let tensor = Tensor::new(&[1., 2., 3., 4., 5., 6., 7., 8.], &[2, 2, 2]);
    let transposed = tensor.transpose_last2().unwrap();
    assert_eq!(
        transposed,
        Tensor::new(&[1., 3., 2., 4., 5., 7., 6., 8.], &[2, 2, 2])
    );
    // 1维张量无法转置
    assert_eq!(
        Tensor::new(&[1., 2.], &[2]).transpose_last2(),
        Err(TensorError::AxisOutOfRange {
            axis: 1,
            dimension: 1
        })
    );
}

#[test]
fn test_stack() {
    let a = Tensor::new(&[1., 2.], &[2]);
    let b = Tensor::new(&[3., 4.], &[2]);
    let stacked = Tensor::stack(&[&a, &b]).unwrap();
    assert_eq!(stacked, Tensor::new(&[1., 2., 3., 4.], &[2, 2]));

    let c = Tensor::new(&[1., 2., 3.], &[3]);
    assert_eq!(Tensor::stack(&[&a, &c]), Err(TensorError::InconsitentShape));
    assert_eq!(Tensor::stack(&[]), Err(TensorError::EmptyList));
}

#[test]
fn test_select_and_gather_first() {
    let tensor = Tensor::new(&[1., 2., 3., 4., 5., 6.], &[3, 2]);
    assert_eq!(
        tensor.select_first(1).unwrap(),
        Tensor::new(&[3., 4.], &[2])
    );
    assert_eq!(
        tensor.gather_first(&[2, 2, 0]).unwrap(),
        Tensor::new(&[5., 6., 5., 6., 1., 2.], &[3, 2])
    );
    assert!(tensor.select_first(3).is_err());
    assert!(tensor.gather_first(&[0, 5]).is_err());
}

#[test]
fn test_concat_and_slice_first() {
    let a = Tensor::new(&[1., 2.], &[1, 2]);
    let b = Tensor::new(&[3., 4., 5., 6.], &[2, 2]);
    let joined = Tensor::concat(&[&a, &b]).unwrap();
    assert_eq!(joined, Tensor::new(&[1., 2., 3., 4., 5., 6.], &[3, 2]));
    assert_eq!(joined.slice_first(1..3).unwrap(), b);
    assert_eq!(joined.slice_first(2..2).unwrap().shape(), &[0, 2]);
    assert!(joined.slice_first(2..4).is_err());

    let c = Tensor::new(&[1., 2., 3.], &[1, 3]);
    assert_eq!(Tensor::concat(&[&a, &c]), Err(TensorError::InconsitentShape));
}
