//! Classify three synthetic 4-feature blobs with a 4-8-3 network.
//!
//! Run with `RUST_LOG=arena_mlp=debug` to see per-epoch summaries.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::filter::EnvFilter;

use arena_mlp::{Arena, Matrix, Network, Shuffle, TrainConfig, argmax, train_test_split};

const FEATURES: usize = 4;
const CLASSES: usize = 3;
const CENTERS: [[f32; FEATURES]; CLASSES] = [
    [5.0, 3.4, 1.5, 0.2],
    [5.9, 2.8, 4.3, 1.3],
    [6.6, 3.0, 5.6, 2.0],
];

fn blobs(rows_per_class: usize, rng: &mut StdRng) -> arena_mlp::Result<Matrix> {
    let mut rows = Vec::with_capacity(rows_per_class * CLASSES);
    for (class, center) in CENTERS.iter().enumerate() {
        for _ in 0..rows_per_class {
            let mut row: Vec<f32> = center
                .iter()
                .map(|&c| c + rng.gen_range(-0.4_f32..0.4))
                .collect();
            row.extend((0..CLASSES).map(|k| if k == class { 1.0 } else { 0.0 }));
            rows.push(row);
        }
    }
    Matrix::from_rows(&rows)
}

fn main() -> arena_mlp::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .without_time()
        .init();

    let mut rng = StdRng::seed_from_u64(42);

    let mut dataset = blobs(50, &mut rng)?;
    println!(
        "dataset: {} samples, {} columns",
        dataset.rows(),
        dataset.cols()
    );

    dataset.normalize_minmax(FEATURES, 0.0, 1.0);
    dataset.shuffle_rows(&mut rng);
    let (mut train, test) = train_test_split(&mut dataset, 0.8);
    println!("train: {} samples, test: {} samples", train.rows(), test.rows());

    let widths = [FEATURES, 8, CLASSES];
    let model = Arena::with_words(Network::arena_words(&widths));
    let mut scratch = Arena::with_words(Network::arena_words(&widths));

    let mut net = Network::new_in(Some(&model), &widths)?;
    net.randomize_weights(-1.0, 1.0, &mut rng);

    println!(
        "before training: train acc {:.2}%, test acc {:.2}%, cost {:.4}",
        100.0 * net.accuracy(&train)?,
        100.0 * net.accuracy(&test)?,
        net.cost(&train)?
    );

    for round in 0..10 {
        let cfg = TrainConfig {
            epochs: 100,
            batch_size: 32,
            learning_rate: 0.1,
            shuffle: Shuffle::Seeded(round),
        };
        net.train(&mut scratch, &mut train, &cfg)?;
        println!(
            "epoch {:4} | cost {:.4} | train acc {:.2}% | test acc {:.2}%",
            (round + 1) * 100,
            net.cost(&train)?,
            100.0 * net.accuracy(&train)?,
            100.0 * net.accuracy(&test)?
        );
    }

    println!("\nactual -> predicted (confidence)");
    for i in 0..test.rows().min(10) {
        let sample = test.row(i);
        let output = net.predict(&sample[..FEATURES]);
        let predicted = argmax(output);
        let confidence = output[predicted];
        let actual = argmax(&sample[FEATURES..]);
        let mark = if actual == predicted { "ok" } else { "miss" };
        println!("   {actual} -> {predicted} ({confidence:.3}) {mark}");
    }

    Ok(())
}
