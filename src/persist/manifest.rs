use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{NetError, Result};
use crate::layers::layer::LayerKind;
use crate::network::network::Network;

pub const MANIFEST_FILE: &str = "manifest.json";
pub const FORMAT_VERSION: u32 = 1;

/// Shape of one saved layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerShape {
    pub kind: LayerKind,
    pub inputs: usize,
    pub outputs: usize,
}

/// Architecture record written next to the layer directories.
///
/// Parameters are never rebuilt from it; it only lets `load` detect that the
/// target network differs from the one that was saved. Model trees without a
/// manifest still load, unchecked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub format_version: u32,
    pub input_size: usize,
    pub layers: Vec<LayerShape>,
}

impl Manifest {
    pub fn of(network: &Network) -> Manifest {
        Manifest {
            format_version: FORMAT_VERSION,
            input_size: network.input_size(),
            layers: network.layers().iter()
                .map(|layer| LayerShape {
                    kind: layer.kind(),
                    inputs: layer.input_size(),
                    outputs: layer.size(),
                })
                .collect(),
        }
    }

    pub fn write(&self, dir: &Path) -> Result<()> {
        let path = dir.join(MANIFEST_FILE);
        let file = std::fs::File::create(&path).map_err(|e| NetError::io(&path, e))?;
        serde_json::to_writer_pretty(std::io::BufWriter::new(file), self)?;
        Ok(())
    }

    /// `Ok(None)` when the directory has no manifest.
    pub fn read(dir: &Path) -> Result<Option<Manifest>> {
        let path = dir.join(MANIFEST_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let file = std::fs::File::open(&path).map_err(|e| NetError::io(&path, e))?;
        Ok(Some(serde_json::from_reader(std::io::BufReader::new(file))?))
    }

    /// Fails unless `network` has exactly the saved architecture.
    pub fn check(&self, network: &Network) -> Result<()> {
        if self.format_version != FORMAT_VERSION {
            return Err(NetError::InvalidData(format!(
                "unsupported model format version {} (expected {FORMAT_VERSION})",
                self.format_version
            )));
        }
        let current = Manifest::of(network);
        if self.input_size != current.input_size {
            return Err(NetError::shape("saved input size", current.input_size, self.input_size));
        }
        if self.layers.len() != current.layers.len() {
            return Err(NetError::shape("saved layer count", current.layers.len(), self.layers.len()));
        }
        for (l, (saved, built)) in self.layers.iter().zip(&current.layers).enumerate() {
            if saved.kind != built.kind {
                return Err(NetError::InvalidData(format!(
                    "layer {l} was saved as {:?} but the network has {:?}",
                    saved.kind, built.kind
                )));
            }
            if saved.inputs != built.inputs {
                return Err(NetError::shape("saved layer inputs", built.inputs, saved.inputs));
            }
            if saved.outputs != built.outputs {
                return Err(NetError::shape("saved layer outputs", built.outputs, saved.outputs));
            }
        }
        Ok(())
    }
}
