//! Deterministic synthetic operand data.
//!
//! Values are drawn uniformly from [0, 1) with a ChaCha8 engine and rounded
//! to bf16. Every row is read from a fixed segment of the stream: row `r` of
//! a `rows x cols` matrix starts at word `r * cols` of the operand's stream,
//! and each value consumes exactly one 32-bit word. The output therefore only
//! depends on the seed, the operand and the dimensions, never on how many
//! workers filled it or in which order they ran.

use std::thread;

use half::bf16;
use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::errors::{BenchmarkError, BenchmarkResult};

/// Fixed seed shared by every trial so all modes see comparable inputs.
pub const DEFAULT_SEED: u64 = 47;

/// Which side of the kernel a matrix feeds. Each side reads its own stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Lhs,
    Rhs,
}

impl Operand {
    fn stream(self) -> u64 {
        match self {
            Operand::Lhs => 0,
            Operand::Rhs => 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MatrixGenerator {
    seed: u64,
    workers: Option<usize>,
}

impl Default for MatrixGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl MatrixGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            workers: None,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn workers(&self) -> usize {
        self.workers
            .unwrap_or_else(|| {
                thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1)
            })
            .max(1)
    }

    /// Generates a row-major `rows x cols` matrix for `operand`.
    ///
    /// Rows are split into contiguous blocks, one scoped worker per block.
    pub fn generate(
        &self,
        operand: Operand,
        rows: usize,
        cols: usize,
    ) -> BenchmarkResult<Vec<bf16>> {
        let len = rows
            .checked_mul(cols)
            .ok_or(BenchmarkError::MatrixTooLarge { rows, cols })?;
        let mut matrix = vec![bf16::ZERO; len];
        if len == 0 {
            return Ok(matrix);
        }

        let workers = self.workers().min(rows);
        let rows_per_worker = rows.div_ceil(workers);
        let seed = self.seed;
        debug!(
            "Generating {:?} operand {}x{} with {} workers",
            operand, rows, cols, workers
        );

        thread::scope(|scope| -> BenchmarkResult<()> {
            let handles: Vec<_> = matrix
                .chunks_mut(rows_per_worker * cols)
                .enumerate()
                .map(|(block, values)| {
                    let first_row = block * rows_per_worker;
                    scope.spawn(move || fill_rows(seed, operand, first_row, cols, values))
                })
                .collect();

            for handle in handles {
                handle
                    .join()
                    .map_err(|_| BenchmarkError::GeneratorPanicked)?;
            }
            Ok(())
        })?;

        Ok(matrix)
    }
}

fn fill_rows(seed: u64, operand: Operand, first_row: usize, cols: usize, values: &mut [bf16]) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(operand.stream());

    for (offset, row) in values.chunks_mut(cols).enumerate() {
        let row_index = (first_row + offset) as u128;
        rng.set_word_pos(row_index * cols as u128);
        for value in row.iter_mut() {
            *value = bf16::from_f32(rng.random::<f32>());
        }
    }
}
