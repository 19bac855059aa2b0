use crate::assert_err;
use crate::errors::DecoderError;
use crate::nn::{Activation, DEFAULT_LEAKY_RELU_SLOPE, DecoderConfig};

#[test]
fn test_config_defaults_fill_missing_fields() {
    let config = DecoderConfig::from_json_str(r#"{"env_name": "atsp", "embedding_dim": 32}"#).unwrap();
    assert_eq!(config.env_name, "atsp");
    assert_eq!(config.embedding_dim, 32);
    assert_eq!(config.num_layers, DecoderConfig::default().num_layers);
    assert_eq!(config.act_fn, Activation::Silu);
    assert!(config.undirected_graph);
    assert_eq!(config.max_decode_steps, None);
}

#[test]
fn test_config_json_round_trip() {
    let config = DecoderConfig {
        act_fn: Activation::LeakyRelu(0.2),
        max_decode_steps: Some(100),
        ..Default::default()
    };
    let json = config.to_json_string().unwrap();
    assert_eq!(DecoderConfig::from_json_str(&json).unwrap(), config);
}

#[test]
fn test_config_leaky_relu_as_string() {
    let config = DecoderConfig::from_json_str(r#"{"act_fn": "leaky_relu"}"#).unwrap();
    assert_eq!(config.act_fn, Activation::LeakyRelu(DEFAULT_LEAKY_RELU_SLOPE));

    let config = DecoderConfig::from_json_str(r#"{"act_fn": "leaky_relu(0.2)"}"#).unwrap();
    assert_eq!(config.act_fn, Activation::LeakyRelu(0.2));

    let json = config.to_json_string().unwrap();
    assert!(json.contains(r#""act_fn": "leaky_relu(0.2)""#), "{json}");
    assert_eq!(DecoderConfig::from_json_str(&json).unwrap(), config);
}

#[test]
fn test_config_rejects_invalid_values() {
    assert_err!(
        DecoderConfig::from_json_str(r#"{"num_layers": 0}"#),
        DecoderError::InvalidConfig(msg) if msg.contains("num_layers")
    );
    assert_err!(
        DecoderConfig::from_json_str(r#"{"act_fn": "softsign"}"#),
        DecoderError::Serialization(_)
    );
    assert_err!(
        DecoderConfig::from_json_file("/nonexistent/decoder.json"),
        DecoderError::Io(_)
    );
}
