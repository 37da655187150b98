use std::fs;

use neurite::persist::manifest::MANIFEST_FILE;
use neurite::{
    ActivationKind, LayerSpec, NetError, Network, PoolingKind, SavePolicy, TrainConfig, Trainer,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn specs() -> Vec<LayerSpec> {
    vec![
        LayerSpec::dense(5, ActivationKind::ReLU),
        LayerSpec::dense(3, ActivationKind::Sigmoid),
    ]
}

fn build(seed: u64) -> Network {
    Network::new(4, &specs(), &mut StdRng::seed_from_u64(seed)).unwrap()
}

fn trained() -> Network {
    let mut net = build(1);
    let inputs: Vec<Vec<f64>> = (0..12)
        .map(|i| (0..4).map(|j| ((i * 7 + j * 3) % 10) as f64 / 10.0).collect())
        .collect();
    let labels: Vec<usize> = (0..12).map(|i| i % 3).collect();
    Trainer::new(TrainConfig::new(50, 0.3, 4).with_seed(9))
        .train(&mut net, &inputs, &labels, None)
        .unwrap();
    net
}

#[test]
fn round_trip_is_bit_exact() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("model");
    let mut original = trained();
    original.save(&root, SavePolicy::FailIfExists).unwrap();

    let mut restored = build(2);
    restored.load(&root).unwrap();

    for input in [[0.1, 0.9, 0.4, 0.0], [1.0, 1.0, 1.0, 1.0], [0.0; 4]] {
        original.forward(&input).unwrap();
        restored.forward(&input).unwrap();
        assert_eq!(original.outputs(), restored.outputs());
        assert_eq!(original.prediction(), restored.prediction());
    }
}

#[test]
fn layout_matches_documented_tree() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("model");
    let net = build(3);
    net.save(&root, SavePolicy::FailIfExists).unwrap();

    assert!(root.join(MANIFEST_FILE).is_file());
    let neuron = &net.layers()[1].as_dense().unwrap().neurons[2];
    let weights = fs::read_to_string(root.join("layer_1/neuron_2/weights.txt")).unwrap();
    let parsed: Vec<f64> = weights.lines().map(|l| l.parse().unwrap()).collect();
    assert_eq!(parsed, neuron.weights());
    let bias = fs::read_to_string(root.join("layer_1/neuron_2/bias.txt")).unwrap();
    assert_eq!(bias.trim().parse::<f64>().unwrap(), neuron.bias());
    assert!(!root.join("layer_1/neuron_3").exists());
    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .filter(|name| name != "model")
        .collect();
    assert!(leftovers.is_empty(), "scratch directories left behind: {leftovers:?}");
}

#[test]
fn save_refuses_existing_directory_unless_overwriting() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("model");
    fs::create_dir(&root).unwrap();
    fs::write(root.join("keep.txt"), "x").unwrap();

    let net = build(4);
    assert!(matches!(net.save(&root, SavePolicy::FailIfExists), Err(NetError::Io { .. })));
    assert!(root.join("keep.txt").exists());

    net.save(&root, SavePolicy::Overwrite).unwrap();
    assert!(!root.join("keep.txt").exists());
    assert!(root.join("layer_0/neuron_4/weights.txt").is_file());
}

#[test]
fn load_fails_on_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let mut net = build(5);
    assert!(matches!(net.load(dir.path().join("nope")), Err(NetError::Io { .. })));
}

#[test]
fn load_fails_on_missing_neuron_file_without_touching_network() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("model");
    build(6).save(&root, SavePolicy::FailIfExists).unwrap();
    fs::remove_file(root.join("layer_1/neuron_2/bias.txt")).unwrap();

    let mut net = build(7);
    let before = net.layers()[0].as_dense().unwrap().neurons[0].weights().to_vec();
    assert!(matches!(net.load(&root), Err(NetError::Io { .. })));
    assert_eq!(net.layers()[0].as_dense().unwrap().neurons[0].weights(), before.as_slice());

    fs::remove_dir_all(root.join("layer_1/neuron_0")).unwrap();
    assert!(matches!(net.load(&root), Err(NetError::Io { .. })));
}

#[test]
fn manifest_detects_architecture_drift() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("model");
    build(8).save(&root, SavePolicy::FailIfExists).unwrap();

    let mut wider = Network::new(
        4,
        &[
            LayerSpec::dense(6, ActivationKind::ReLU),
            LayerSpec::dense(3, ActivationKind::Sigmoid),
        ],
        &mut StdRng::seed_from_u64(0),
    )
    .unwrap();
    assert!(matches!(wider.load(&root), Err(NetError::ShapeMismatch { .. })));

    let mut deeper = Network::new(
        4,
        &[
            LayerSpec::dense(5, ActivationKind::ReLU),
            LayerSpec::dense(3, ActivationKind::Sigmoid),
            LayerSpec::dense(3, ActivationKind::Sigmoid),
        ],
        &mut StdRng::seed_from_u64(0),
    )
    .unwrap();
    assert!(matches!(deeper.load(&root), Err(NetError::ShapeMismatch { .. })));
}

#[test]
fn trees_without_manifest_still_load_but_weight_counts_are_checked() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("model");
    let saved = build(9);
    saved.save(&root, SavePolicy::FailIfExists).unwrap();
    fs::remove_file(root.join(MANIFEST_FILE)).unwrap();

    let mut net = build(10);
    net.load(&root).unwrap();
    assert_eq!(
        net.layers()[1].as_dense().unwrap().neurons[0].weights(),
        saved.layers()[1].as_dense().unwrap().neurons[0].weights()
    );

    fs::write(root.join("layer_0/neuron_0/weights.txt"), "0.1\n0.2\n0.3\n0.4\n0.5\n").unwrap();
    assert!(matches!(
        net.load(&root),
        Err(NetError::ShapeMismatch { expected: 4, actual: 5, .. })
    ));

    fs::write(root.join("layer_0/neuron_0/weights.txt"), "0.1\nzero\n0.3\n0.4\n").unwrap();
    assert!(matches!(net.load(&root), Err(NetError::Parse { .. })));
}

#[test]
fn pooling_layers_round_trip_as_empty_directories() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("model");
    let specs = [
        LayerSpec::pooling(PoolingKind::Average, 4, 4, 2),
        LayerSpec::dense(2, ActivationKind::Sigmoid),
    ];
    let mut original = Network::new(16, &specs, &mut StdRng::seed_from_u64(1)).unwrap();
    original.save(&root, SavePolicy::FailIfExists).unwrap();
    assert!(root.join("layer_0").is_dir());
    assert!(root.join("layer_1/neuron_1/weights.txt").is_file());

    let mut restored = Network::new(16, &specs, &mut StdRng::seed_from_u64(2)).unwrap();
    restored.load(&root).unwrap();
    let input: Vec<f64> = (0..16).map(|x| x as f64 / 16.0).collect();
    original.forward(&input).unwrap();
    restored.forward(&input).unwrap();
    assert_eq!(original.outputs(), restored.outputs());
}

#[test]
fn save_leaves_unrelated_siblings_alone() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("model");
    let sibling = dir.path().join("model.partial");
    fs::create_dir(&sibling).unwrap();
    fs::write(sibling.join("precious.txt"), "keep me").unwrap();

    let net = build(11);
    net.save(&root, SavePolicy::FailIfExists).unwrap();
    net.save(&root, SavePolicy::Overwrite).unwrap();

    assert_eq!(fs::read_to_string(sibling.join("precious.txt")).unwrap(), "keep me");
    let mut names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["model", "model.partial"]);
}

#[test]
fn overwrite_replaces_the_whole_tree() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("model");
    build(12).save(&root, SavePolicy::FailIfExists).unwrap();
    fs::write(root.join("stale.txt"), "old").unwrap();

    let newer = build(13);
    newer.save(&root, SavePolicy::Overwrite).unwrap();
    assert!(!root.join("stale.txt").exists());

    let mut restored = build(14);
    restored.load(&root).unwrap();
    assert_eq!(
        restored.layers()[0].as_dense().unwrap().neurons[0].weights(),
        newer.layers()[0].as_dense().unwrap().neurons[0].weights()
    );
}

#[test]
fn changed_layer_kind_is_invalid_data() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("model");
    let pooled = [
        LayerSpec::pooling(PoolingKind::Max, 4, 4, 2),
        LayerSpec::dense(2, ActivationKind::Sigmoid),
    ];
    Network::new(16, &pooled, &mut StdRng::seed_from_u64(1))
        .unwrap()
        .save(&root, SavePolicy::FailIfExists)
        .unwrap();

    let dense = [
        LayerSpec::dense(4, ActivationKind::ReLU),
        LayerSpec::dense(2, ActivationKind::Sigmoid),
    ];
    let mut net = Network::new(16, &dense, &mut StdRng::seed_from_u64(2)).unwrap();
    assert!(matches!(net.load(&root), Err(NetError::InvalidData(_))));
}
