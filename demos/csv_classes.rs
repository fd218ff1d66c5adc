//! Load a small labelled CSV, train a 2-6-2 network and report accuracy.

use std::io::Cursor;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing_subscriber::filter::EnvFilter;

use arena_mlp::{Arena, Network, Shuffle, TrainConfig, load_csv};

const CSV: &str = "\
x,y,label
0.10,0.20,0
0.15,0.05,0
0.20,0.25,0
0.05,0.10,0
0.30,0.15,0
0.25,0.30,0
0.80,0.90,1
0.95,0.85,1
0.70,0.80,1
0.90,0.70,1
0.85,0.95,1
0.75,0.75,1
this line is ignored
";

fn main() -> arena_mlp::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .without_time()
        .init();

    let mut data = load_csv(Cursor::new(CSV), 2, 2, 1)?;
    println!("loaded {} rows x {} columns", data.rows(), data.cols());

    let widths = [2, 6, 2];
    let mut scratch = Arena::with_words(Network::arena_words(&widths));
    let mut net = Network::new_in(None, &widths)?;
    net.randomize_weights(-1.0, 1.0, &mut StdRng::seed_from_u64(7));

    let report = net.train(
        &mut scratch,
        &mut data,
        &TrainConfig {
            epochs: 500,
            batch_size: 4,
            learning_rate: 0.5,
            shuffle: Shuffle::Seeded(7),
        },
    )?;

    if let Some(last) = report.epochs.last() {
        println!(
            "after {} epochs: loss {:.4}, accuracy {:.2}%",
            last.epoch,
            last.loss,
            100.0 * last.accuracy
        );
    }
    println!("scratch peak: {} words", scratch.peak());

    Ok(())
}
