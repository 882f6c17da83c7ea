use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::shared::ConfigError;

/// Fan-out driver for a batch of independent blocking commands.
///
/// The pool is the only throttle: the whole batch is admitted at once and
/// each worker runs one blocking exchange at a time. There is no retry and
/// no cancellation; a slow command simply holds its worker.
pub struct ParallelRunner {
    pool: ThreadPool,
}

impl ParallelRunner {
    /// Builds a runner over its own dedicated pool. Pool size is explicit
    /// configuration; the reference deployment uses 25 workers.
    pub fn new(pool_size: usize) -> Result<Self, ConfigError> {
        let pool = ThreadPoolBuilder::new().num_threads(pool_size).build()?;
        Ok(ParallelRunner { pool })
    }

    /// Runs the handler over every command and returns one result slot per
    /// command, in input order, once the whole batch has finished. A failed
    /// command occupies its slot as an Err and never disturbs its siblings.
    pub fn run<C, T, E, F>(&self, commands: &[C], handler: F) -> Vec<Result<T, E>>
    where
        C: Sync,
        T: Send,
        E: Send,
        F: Fn(&C) -> Result<T, E> + Send + Sync,
    {
        self.pool
            .install(|| commands.par_iter().map(|command| handler(command)).collect())
    }
}
