use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::arena::Arena;
use crate::matrix::Matrix;
use crate::{BatchCursor, Error, Network, Result};

/// Row shuffling between epochs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Shuffle {
    /// Keep row order.
    #[default]
    None,
    /// Reshuffle rows before every epoch with an RNG seeded once per `train` call.
    Seeded(u64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f32,
    pub shuffle: Shuffle,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            epochs: 1000,
            batch_size: 32,
            learning_rate: 0.1,
            shuffle: Shuffle::None,
        }
    }
}

impl TrainConfig {
    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(Error::InvalidConfig("epochs must be > 0".to_owned()));
        }
        if self.batch_size == 0 {
            return Err(Error::InvalidConfig("batch_size must be > 0".to_owned()));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(Error::InvalidConfig(
                "learning rate must be finite and > 0".to_owned(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochReport {
    /// 1-based epoch number.
    pub epoch: usize,
    /// Mean batch cost over the epoch.
    pub loss: f32,
    /// Training accuracy after the epoch.
    pub accuracy: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainReport {
    pub epochs: Vec<EpochReport>,
}

impl TrainReport {
    pub fn final_loss(&self) -> Option<f32> {
        self.epochs.last().map(|e| e.loss)
    }
}

impl Network<'_> {
    /// Train with mini-batch gradient descent.
    ///
    /// Every epoch optionally reshuffles `data` in place, then steps a fresh
    /// [`BatchCursor`] to the end of the data, resetting `scratch` after each step.
    /// `scratch` must hold at least `Network::arena_words(self.widths())` words.
    pub fn train<S>(
        &mut self,
        scratch: &mut Arena,
        data: &mut Matrix<S>,
        cfg: &TrainConfig,
    ) -> Result<TrainReport>
    where
        S: AsRef<[f32]> + AsMut<[f32]>,
    {
        cfg.validate()?;

        let mut rng = match cfg.shuffle {
            Shuffle::None => None,
            Shuffle::Seeded(seed) => Some(StdRng::seed_from_u64(seed)),
        };

        info!(
            widths = ?self.widths(),
            rows = data.rows(),
            epochs = cfg.epochs,
            batch_size = cfg.batch_size,
            learning_rate = cfg.learning_rate,
            "training started"
        );

        let mut epochs = Vec::with_capacity(cfg.epochs);
        for epoch in 1..=cfg.epochs {
            if let Some(rng) = rng.as_mut() {
                data.shuffle_rows(rng);
            }

            let mut cursor = BatchCursor::new();
            while !cursor.is_epoch_done() {
                cursor.step(scratch, self, data, cfg.batch_size, cfg.learning_rate)?;
                scratch.reset();
            }

            let accuracy = self.accuracy(data)?;
            let report = EpochReport {
                epoch,
                loss: cursor.accumulated_loss(),
                accuracy,
            };
            if epoch == 1 || epoch == cfg.epochs {
                info!(epoch, loss = report.loss, accuracy, "epoch finished");
            } else {
                debug!(epoch, loss = report.loss, accuracy, "epoch finished");
            }
            epochs.push(report);
        }

        Ok(TrainReport { epochs })
    }
}
