use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use arena_mlp::{Arena, BatchCursor, Matrix, Network, Shuffle, TrainConfig};

/// Two tight clusters around (0.15, 0.15) and (0.85, 0.85), one-hot labelled.
fn clusters(rows: usize, seed: u64) -> Matrix {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = Vec::with_capacity(rows);
    for r in 0..rows {
        let class = r % 2;
        let center: f32 = if class == 0 { 0.15 } else { 0.85 };
        let x = center + rng.gen_range(-0.1..0.1);
        let y = center + rng.gen_range(-0.1..0.1);
        let mut row = vec![x, y, 0.0, 0.0];
        row[2 + class] = 1.0;
        out.push(row);
    }
    Matrix::from_rows(&out).unwrap()
}

/// Same clusters with a single 0/1 target column.
fn separable(rows: usize, seed: u64) -> Matrix {
    let one_hot = clusters(rows, seed);
    let out: Vec<Vec<f32>> = (0..one_hot.rows())
        .map(|r| {
            let row = one_hot.row(r);
            vec![row[0], row[1], row[3]]
        })
        .collect();
    Matrix::from_rows(&out).unwrap()
}

fn seeded_network<'a>(arena: &'a Arena, widths: &[usize], seed: u64) -> Network<'a> {
    let mut net = Network::new_in(Some(arena), widths).unwrap();
    net.randomize_weights(-1.0, 1.0, &mut StdRng::seed_from_u64(seed));
    net
}

#[test]
fn training_reduces_cost_on_separable_data() {
    let widths = [2, 8, 1];
    let model = Arena::with_words(Network::arena_words(&widths));
    let mut scratch = Arena::with_words(Network::arena_words(&widths));
    let mut net = seeded_network(&model, &widths, 0);
    let mut data = separable(40, 1);

    let before = net.cost(&data).unwrap();
    let report = net
        .train(
            &mut scratch,
            &mut data,
            &TrainConfig {
                epochs: 300,
                batch_size: 8,
                learning_rate: 0.5,
                shuffle: Shuffle::Seeded(2),
            },
        )
        .unwrap();
    let after = net.cost(&data).unwrap();

    let first = report.epochs.first().unwrap().loss;
    let last = report.final_loss().unwrap();
    assert!(last < first, "epoch loss did not decrease: {first} -> {last}");
    assert!(after < before, "cost did not decrease: {before} -> {after}");
    // A single output unit always has argmax 0.
    assert_eq!(net.accuracy(&data).unwrap(), 1.0);
}

#[test]
fn cost_after_last_epoch_is_below_cost_after_first_epoch() {
    let widths = [2, 8, 1];
    let model = Arena::with_words(Network::arena_words(&widths));
    let mut scratch = Arena::with_words(Network::arena_words(&widths));
    let mut net = seeded_network(&model, &widths, 0);
    let mut data = separable(40, 1);

    let cfg = TrainConfig {
        epochs: 1,
        batch_size: 8,
        learning_rate: 0.5,
        shuffle: Shuffle::Seeded(2),
    };
    net.train(&mut scratch, &mut data, &cfg).unwrap();
    let after_first = net.cost(&data).unwrap();

    net.train(
        &mut scratch,
        &mut data,
        &TrainConfig {
            epochs: 299,
            shuffle: Shuffle::Seeded(3),
            ..cfg
        },
    )
    .unwrap();
    let after_last = net.cost(&data).unwrap();

    assert!(
        after_last < after_first,
        "cost did not decrease: {after_first} -> {after_last}"
    );
    assert_eq!(net.accuracy(&data).unwrap(), 1.0);
}

#[test]
fn training_separates_one_hot_clusters() {
    let widths = [2, 8, 2];
    let model = Arena::with_words(Network::arena_words(&widths));
    let mut scratch = Arena::with_words(Network::arena_words(&widths));
    let mut net = seeded_network(&model, &widths, 3);
    let mut data = clusters(40, 4);

    let report = net
        .train(
            &mut scratch,
            &mut data,
            &TrainConfig {
                epochs: 1000,
                batch_size: 4,
                learning_rate: 0.5,
                shuffle: Shuffle::Seeded(5),
            },
        )
        .unwrap();

    assert_eq!(report.epochs.last().unwrap().accuracy, 1.0);
    assert_eq!(net.accuracy(&data).unwrap(), 1.0);
    assert!(report.final_loss().unwrap() < report.epochs[0].loss);
}

#[test]
fn cursor_loss_is_mean_of_batch_costs() {
    let widths = [2, 8, 2];
    let model = Arena::with_words(Network::arena_words(&widths));
    let mut scratch = Arena::with_words(Network::arena_words(&widths));
    let mut net = seeded_network(&model, &widths, 7);
    let data = clusters(100, 8);

    let mut cursor = BatchCursor::new();
    let mut steps = Vec::new();
    while !cursor.is_epoch_done() {
        steps.push(cursor.step(&scratch, &mut net, &data, 30, 0.1).unwrap());
        scratch.reset();
    }

    let sizes: Vec<usize> = steps.iter().map(|s| s.rows).collect();
    assert_eq!(sizes, vec![30, 30, 30, 10]);
    let starts: Vec<usize> = steps.iter().map(|s| s.start).collect();
    assert_eq!(starts, vec![0, 30, 60, 90]);

    let mean = steps.iter().map(|s| s.cost).sum::<f32>() / 4.0;
    assert_relative_eq!(cursor.accumulated_loss(), mean, max_relative = 1e-6);
    assert_eq!(cursor.batches(), 4);
}

#[test]
fn batch_cost_is_measured_after_the_update() {
    let widths = [2, 4, 2];
    let model_a = Arena::with_words(Network::arena_words(&widths));
    let model_b = Arena::with_words(Network::arena_words(&widths));
    let mut scratch = Arena::with_words(Network::arena_words(&widths));
    let mut stepped = seeded_network(&model_a, &widths, 9);
    let mut replay = seeded_network(&model_b, &widths, 9);
    let data = clusters(12, 10);

    let mut cursor = BatchCursor::new();
    let report = cursor.step(&scratch, &mut stepped, &data, 5, 0.3).unwrap();
    scratch.reset();

    let batch = data.row_slice(0, 5);
    {
        let grads = arena_mlp::compute_gradients(&scratch, &mut replay, &batch).unwrap();
        arena_mlp::apply_gradients(&mut replay, &grads, 0.3);
    }
    scratch.reset();

    assert_eq!(report.cost, replay.cost(&batch).unwrap());
}

#[test]
fn identical_seeds_train_identically() {
    let widths = [2, 6, 2];
    let run = || {
        let model = Arena::with_words(Network::arena_words(&widths));
        let mut scratch = Arena::with_words(Network::arena_words(&widths));
        let mut net = seeded_network(&model, &widths, 11);
        let mut data = clusters(24, 12);
        let report = net
            .train(
                &mut scratch,
                &mut data,
                &TrainConfig {
                    epochs: 20,
                    batch_size: 5,
                    learning_rate: 0.2,
                    shuffle: Shuffle::Seeded(13),
                },
            )
            .unwrap();
        (report, net.weights(0).to_owned_matrix())
    };

    let (a, wa) = run();
    let (b, wb) = run();
    assert_eq!(a, b);
    assert_eq!(wa, wb);
}
