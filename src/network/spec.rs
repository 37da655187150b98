use serde::{Deserialize, Serialize};

use crate::activation::activation::ActivationKind;
use crate::error::{NetError, Result};
use crate::layers::layer::LayerKind;
use crate::layers::pooling::PoolingKind;

/// Describes one layer to build. Consumed by `Network::new`, never stored.
///
/// The input size of each layer is not part of the spec: it is threaded from
/// the previous layer's width (or the network input size for the first one).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LayerSpec {
    Dense {
        size: usize,
        activation: ActivationKind,
    },
    Pooling {
        pooling: PoolingKind,
        input_width: usize,
        input_height: usize,
        stride: usize,
    },
    /// Reserved variant; building it fails.
    Convolutional,
}

impl LayerSpec {
    pub fn dense(size: usize, activation: ActivationKind) -> LayerSpec {
        LayerSpec::Dense { size, activation }
    }

    pub fn pooling(pooling: PoolingKind, input_width: usize, input_height: usize, stride: usize) -> LayerSpec {
        LayerSpec::Pooling { pooling, input_width, input_height, stride }
    }

    pub fn kind(&self) -> LayerKind {
        match self {
            LayerSpec::Dense { .. } => LayerKind::Dense,
            LayerSpec::Pooling { .. } => LayerKind::Pooling,
            LayerSpec::Convolutional => LayerKind::Convolutional,
        }
    }
}

/// A serializable network architecture: input width plus ordered layers.
///
/// Saved independently of trained parameters, so the same file can rebuild
/// the architecture a model directory was trained with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    /// Human-readable name, used in logs only.
    pub name: String,
    pub input_size: usize,
    pub layers: Vec<LayerSpec>,
}

impl NetworkSpec {
    /// The architecture of the interactive digit reader: 784 → 16 → 16 → 10.
    pub fn digits() -> NetworkSpec {
        NetworkSpec {
            name: "digits".to_owned(),
            input_size: 28 * 28,
            layers: vec![
                LayerSpec::dense(16, ActivationKind::ReLU),
                LayerSpec::dense(16, ActivationKind::ReLU),
                LayerSpec::dense(10, ActivationKind::Sigmoid),
            ],
        }
    }

    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path).map_err(|e| NetError::io(path, e))?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a `NetworkSpec` from a JSON file.
    pub fn load_json(path: &str) -> Result<NetworkSpec> {
        let file = std::fs::File::open(path).map_err(|e| NetError::io(path, e))?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_uses_type_tag() {
        let spec = NetworkSpec {
            name: "tiny".to_owned(),
            input_size: 16,
            layers: vec![
                LayerSpec::pooling(PoolingKind::Max, 4, 4, 2),
                LayerSpec::dense(3, ActivationKind::Sigmoid),
            ],
        };
        let json = serde_json::to_string(&spec).unwrap();
        assert!(json.contains(r#""type":"Pooling""#));
        assert!(json.contains(r#""type":"Dense""#));
        let back: NetworkSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, spec);
    }

    #[test]
    fn unknown_activation_in_json_is_rejected() {
        let json = r#"{"name":"x","input_size":2,"layers":[{"type":"Dense","size":1,"activation":"Tanh"}]}"#;
        assert!(serde_json::from_str::<NetworkSpec>(json).is_err());
    }

    #[test]
    fn save_and_load_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("arch.json");
        let path = path.to_str().unwrap();
        NetworkSpec::digits().save_json(path).unwrap();
        assert_eq!(NetworkSpec::load_json(path).unwrap(), NetworkSpec::digits());
        assert!(matches!(
            NetworkSpec::load_json(dir.path().join("missing.json").to_str().unwrap()),
            Err(NetError::Io { .. })
        ));
    }

    #[test]
    fn spec_kind_matches_variant() {
        assert_eq!(LayerSpec::Convolutional.kind(), LayerKind::Convolutional);
        assert_eq!(LayerSpec::dense(2, ActivationKind::Linear).kind(), LayerKind::Dense);
    }
}
