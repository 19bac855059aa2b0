use crate::assert_err;
use crate::errors::DecoderError;
use crate::nn::{Activation, DEFAULT_LEAKY_RELU_SLOPE};
use crate::tensor::Tensor;
use approx::assert_abs_diff_eq;

#[test]
fn test_activation_from_str() {
    assert_eq!("silu".parse::<Activation>().unwrap(), Activation::Silu);
    assert_eq!("ReLU".parse::<Activation>().unwrap(), Activation::Relu);
    assert_eq!(
        "leaky_relu".parse::<Activation>().unwrap(),
        Activation::LeakyRelu(DEFAULT_LEAKY_RELU_SLOPE)
    );
    assert_eq!(
        "Leaky_ReLU( 0.25 )".parse::<Activation>().unwrap(),
        Activation::LeakyRelu(0.25)
    );
    assert_eq!(Activation::default(), Activation::Silu);
    assert_err!(
        "softsign".parse::<Activation>(),
        DecoderError::UnknownActivation("softsign")
    );
    assert_err!(
        "leaky_relu(abc)".parse::<Activation>(),
        DecoderError::UnknownActivation("leaky_relu(abc)")
    );
}

#[test]
fn test_activation_values() {
    assert_abs_diff_eq!(Activation::Silu.apply_scalar(0.0), 0.0);
    assert_abs_diff_eq!(Activation::Silu.apply_scalar(1.0), 0.731_058_6, epsilon = 1e-6);
    assert_abs_diff_eq!(Activation::Relu.apply_scalar(-2.0), 0.0);
    assert_abs_diff_eq!(Activation::Sigmoid.apply_scalar(0.0), 0.5);
    assert_abs_diff_eq!(Activation::LeakyRelu(0.2).apply_scalar(-1.0), -0.2);
    // erf形式：x * Φ(x)
    assert_abs_diff_eq!(Activation::Gelu.apply_scalar(0.0), 0.0, epsilon = 1e-6);
    assert_abs_diff_eq!(Activation::Gelu.apply_scalar(1.0), 0.841_344_7, epsilon = 1e-5);
    assert_abs_diff_eq!(Activation::Gelu.apply_scalar(-1.0), -0.158_655_3, epsilon = 1e-5);
    assert_abs_diff_eq!(Activation::Gelu.apply_scalar(2.0), 1.954_5, epsilon = 1e-4);
    assert_abs_diff_eq!(Activation::Tanh.apply_scalar(0.5), 0.5f32.tanh());

    let x = Tensor::new(&[-1.0, 0.0, 2.0], &[3]);
    assert_eq!(Activation::Relu.apply(&x), Tensor::new(&[0.0, 0.0, 2.0], &[3]));
    assert_eq!(Activation::Identity.apply(&x), x);
}

#[test]
fn test_activation_serde() {
    assert_eq!(serde_json::to_string(&Activation::Silu).unwrap(), "\"silu\"");
    assert_eq!(
        serde_json::to_string(&Activation::LeakyRelu(0.1)).unwrap(),
        "\"leaky_relu(0.1)\""
    );
    let leaky: Activation = serde_json::from_str(r#""leaky_relu(0.1)""#).unwrap();
    assert_eq!(leaky, Activation::LeakyRelu(0.1));
    let leaky: Activation = serde_json::from_str(r#""leaky_relu""#).unwrap();
    assert_eq!(leaky, Activation::LeakyRelu(DEFAULT_LEAKY_RELU_SLOPE));
    assert!(serde_json::from_str::<Activation>(r#""softsign""#).is_err());
}
