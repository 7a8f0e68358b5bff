// Integration tests for snapshot persistence: round-trips, tampered
// snapshots, and validation-on-load.

use std::fs;

use tempfile::NamedTempFile;

use trendnet::encoding::VECTOR_SIZE;
use trendnet::persist;
use trendnet::utils::SimpleRng;
use trendnet::{Network, NetworkError};

fn saved_network_file(network: &Network) -> NamedTempFile {
    let file = NamedTempFile::new().unwrap();
    persist::save(network, file.path()).unwrap();
    file
}

#[test]
fn test_round_trip_preserves_classification() {
    let mut rng = SimpleRng::new(42);
    let network = Network::new(VECTOR_SIZE, 16, 8, 1, &mut rng);
    let file = saved_network_file(&network);

    let restored = persist::load(file.path()).unwrap();

    for word in ["кот", "data", "программа", "ai"] {
        assert_eq!(network.is_trendy(word), restored.is_trendy(word));
    }
}

#[test]
fn test_load_rejects_truncated_output_bias() {
    let mut rng = SimpleRng::new(42);
    let network = Network::new(5, 4, 3, 1, &mut rng);
    let file = saved_network_file(&network);

    let mut snapshot: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(file.path()).unwrap()).unwrap();
    snapshot["b3"] = serde_json::json!([]);
    fs::write(file.path(), snapshot.to_string()).unwrap();

    let result = persist::load(file.path());
    assert!(matches!(
        result,
        Err(NetworkError::ShapeMismatch {
            what: "b3",
            expected: 1,
            got: 0
        })
    ));
}

#[test]
fn test_load_rejects_tampered_weight_matrix() {
    let mut rng = SimpleRng::new(42);
    let network = Network::new(5, 4, 3, 1, &mut rng);
    let file = saved_network_file(&network);

    let mut snapshot: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(file.path()).unwrap()).unwrap();
    snapshot["w3"] = serde_json::json!([0.1, 0.2]);
    fs::write(file.path(), snapshot.to_string()).unwrap();

    let result = persist::load(file.path());
    assert!(matches!(
        result,
        Err(NetworkError::ShapeMismatch { what: "w3", .. })
    ));
}

#[test]
fn test_load_rejects_zero_declared_size() {
    let mut rng = SimpleRng::new(42);
    let network = Network::new(5, 4, 3, 1, &mut rng);
    let file = saved_network_file(&network);

    let mut snapshot: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(file.path()).unwrap()).unwrap();
    snapshot["input_size"] = serde_json::json!(0);
    fs::write(file.path(), snapshot.to_string()).unwrap();

    let result = persist::load(file.path());
    assert!(matches!(result, Err(NetworkError::InvalidNetwork(_))));
}

#[test]
fn test_load_rejects_missing_field() {
    let mut rng = SimpleRng::new(42);
    let network = Network::new(5, 4, 3, 1, &mut rng);
    let file = saved_network_file(&network);

    let mut snapshot: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(file.path()).unwrap()).unwrap();
    snapshot.as_object_mut().unwrap().remove("w2");
    fs::write(file.path(), snapshot.to_string()).unwrap();

    let result = persist::load(file.path());
    assert!(matches!(result, Err(NetworkError::Encoding(_))));
}
