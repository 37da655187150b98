//! Plain-text model directories.
//!
//! ```text
//! <root>/manifest.json
//! <root>/layer_<i>/neuron_<n>/weights.txt   one float per line, input order
//! <root>/layer_<i>/neuron_<n>/bias.txt      a single float
//! ```
//!
//! Pooling layers get an empty `layer_<i>` directory. Floats are written with
//! Rust's shortest round-trip formatting, so a save/load cycle is bit-exact.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, info, warn};

use crate::error::{NetError, Result};
use crate::layers::layer::Layer;
use crate::network::network::Network;
use crate::persist::manifest::Manifest;

pub const WEIGHTS_FILE: &str = "weights.txt";
pub const BIAS_FILE: &str = "bias.txt";

const TREE_DIR: &str = "model";

/// What `save` does when the target directory already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SavePolicy {
    #[default]
    FailIfExists,
    /// Replace the existing tree. Callers decide whether to ask first.
    Overwrite,
}

pub fn layer_dir(root: &Path, layer: usize) -> PathBuf {
    root.join(format!("layer_{layer}"))
}

pub fn neuron_dir(root: &Path, layer: usize, neuron: usize) -> PathBuf {
    layer_dir(root, layer).join(format!("neuron_{neuron}"))
}

/// Writes every layer of `network` under `root`.
///
/// The tree is written to a uniquely named staging directory next to `root`
/// and renamed into place. An existing tree is moved aside first and only
/// deleted once the new one is in place, so a failure leaves either the old
/// model or nothing, never a half-written one.
pub fn save(network: &Network, root: &Path, policy: SavePolicy) -> Result<()> {
    let exists = root.exists();
    if exists && policy == SavePolicy::FailIfExists {
        return Err(NetError::io(
            root,
            std::io::Error::new(ErrorKind::AlreadyExists, "model directory already exists"),
        ));
    }

    let parent = parent_dir(root)?;
    let staging = scratch_dir(parent, ".neurite-save-")?;
    let tree = staging.path().join(TREE_DIR);
    write_tree(network, &tree)?;

    // Dropping `previous` deletes the old tree.
    let mut previous = None;
    if exists {
        warn!(path = %root.display(), "overwriting existing model");
        let aside = scratch_dir(parent, ".neurite-old-")?;
        let old_tree = aside.path().join(TREE_DIR);
        fs::rename(root, &old_tree).map_err(|e| NetError::io(root, e))?;
        previous = Some((aside, old_tree));
    }
    if let Err(err) = fs::rename(&tree, root) {
        if let Some((aside, old_tree)) = previous {
            if let Err(restore) = fs::rename(&old_tree, root) {
                // Keep the old tree on disk rather than lose it with `aside`.
                let kept = aside.into_path();
                warn!(path = %kept.display(), error = %restore, "previous model left aside");
            }
        }
        return Err(NetError::io(root, err));
    }
    drop(previous);
    info!(path = %root.display(), layers = network.layers().len(), "model saved");
    Ok(())
}

/// Reads parameters from `root` into `network`, whose architecture must match
/// the saved one. Nothing is modified unless every file parses.
pub fn load(network: &mut Network, root: &Path) -> Result<()> {
    if !root.is_dir() {
        return Err(not_found(root, "model directory does not exist"));
    }
    if let Some(manifest) = Manifest::read(root)? {
        manifest.check(network)?;
    } else {
        debug!(path = %root.display(), "no manifest, loading without architecture check");
    }

    let mut staged: Vec<Vec<(Vec<f64>, f64)>> = Vec::with_capacity(network.layers().len());
    for (l, layer) in network.layers().iter().enumerate() {
        let Layer::Dense(dense) = layer else {
            staged.push(Vec::new());
            continue;
        };
        let dir = layer_dir(root, l);
        if !dir.is_dir() {
            return Err(not_found(&dir, "layer directory does not exist"));
        }
        let mut params = Vec::with_capacity(dense.size());
        for (n, neuron) in dense.neurons.iter().enumerate() {
            let dir = neuron_dir(root, l, n);
            if !dir.is_dir() {
                return Err(not_found(&dir, "neuron directory does not exist"));
            }
            let weights = read_floats(&dir.join(WEIGHTS_FILE))?;
            if weights.len() != neuron.input_size() {
                return Err(NetError::shape("saved weights", neuron.input_size(), weights.len()));
            }
            let bias_path = dir.join(BIAS_FILE);
            let bias = match read_floats(&bias_path)?.as_slice() {
                [bias] => *bias,
                values => return Err(NetError::shape("saved bias", 1, values.len())),
            };
            params.push((weights, bias));
        }
        debug!(layer = l, neurons = params.len(), "layer parameters read");
        staged.push(params);
    }

    for (layer, params) in network.layers_mut().iter_mut().zip(staged) {
        if let Some(dense) = layer.as_dense_mut() {
            for (neuron, (weights, bias)) in dense.neurons.iter_mut().zip(params) {
                neuron.set_parameters(weights, bias)?;
            }
        }
    }
    info!(path = %root.display(), "model loaded");
    Ok(())
}

fn write_tree(network: &Network, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| NetError::io(dir, e))?;
    for (l, layer) in network.layers().iter().enumerate() {
        let path = layer_dir(dir, l);
        fs::create_dir(&path).map_err(|e| NetError::io(&path, e))?;
        let Layer::Dense(dense) = layer else { continue };
        for (n, neuron) in dense.neurons.iter().enumerate() {
            let path = neuron_dir(dir, l, n);
            fs::create_dir(&path).map_err(|e| NetError::io(&path, e))?;

            let weights: String = neuron.weights().iter().map(|w| format!("{w}\n")).collect();
            write_file(&path.join(WEIGHTS_FILE), &weights)?;
            write_file(&path.join(BIAS_FILE), &format!("{}\n", neuron.bias()))?;
        }
        debug!(layer = l, neurons = dense.size(), "layer parameters written");
    }
    Manifest::of(network).write(dir)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).map_err(|e| NetError::io(path, e))
}

fn read_floats(path: &Path) -> Result<Vec<f64>> {
    let contents = fs::read_to_string(path).map_err(|e| NetError::io(path, e))?;
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            line.parse::<f64>().map_err(|_| NetError::Parse {
                path: path.display().to_string(),
                value: line.to_owned(),
            })
        })
        .collect()
}

/// Directory that holds `root`, where staging and backup directories go.
fn parent_dir(root: &Path) -> Result<&Path> {
    if root.file_name().is_none() {
        return Err(NetError::InvalidConfiguration(format!(
            "'{}' is not a valid model path",
            root.display()
        )));
    }
    match root.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => Ok(parent),
        _ => Ok(Path::new(".")),
    }
}

fn scratch_dir(parent: &Path, prefix: &str) -> Result<TempDir> {
    tempfile::Builder::new()
        .prefix(prefix)
        .tempdir_in(parent)
        .map_err(|e| NetError::io(parent, e))
}

fn not_found(path: &Path, message: &str) -> NetError {
    NetError::io(path, std::io::Error::new(ErrorKind::NotFound, message.to_owned()))
}
