use neurite::{ActivationKind, LayerSpec, Network, TrainConfig, Trainer};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> neurite::Result<()> {
    let mut rng = StdRng::seed_from_u64(1);
    let mut network = Network::new(
        2,
        &[
            LayerSpec::dense(4, ActivationKind::Sigmoid),
            LayerSpec::dense(2, ActivationKind::Sigmoid),
        ],
        &mut rng,
    )?;

    let inputs = vec![
        vec![1.0, 0.0],
        vec![1.0, 1.0],
        vec![0.0, 1.0],
        vec![0.0, 0.0],
    ];
    // class 1 = "true"
    let labels = vec![1, 0, 1, 0];

    let mut trainer = Trainer::new(TrainConfig::new(20_000, 0.5, 4).with_seed(1));
    for stats in trainer.train(&mut network, &inputs, &labels, None)? {
        println!("Epoch {}/{}: accuracy = {:.2}", stats.epoch, stats.total_epochs, stats.accuracy);
    }

    for input in &inputs {
        let class = network.predict(input)?;
        println!("Input: {:?} -> {} {:.4?}", input, class, network.outputs());
    }
    Ok(())
}
