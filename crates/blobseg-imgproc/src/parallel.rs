use rayon::prelude::*;
use thiserror::Error;

/// Errors that can occur during parallel execution.
#[derive(Error, Debug, PartialEq)]
pub enum ParallelError {
    /// The thread pool failed to build.
    #[error("failed to build thread pool: {0}")]
    BuildError(String),

    /// The requested thread count is invalid.
    #[error("thread count must be > 0, got {0}")]
    InvalidThreadCount(usize),
}

/// Controls how the row-wise operations are executed.
///
/// Every output row only reads the immutable source image, so all the
/// strategies produce identical results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExecutionStrategy {
    /// Run sequentially on the current thread.
    #[default]
    Serial,

    /// Use the global Rayon thread pool to process rows in parallel.
    ParallelRows,

    /// Run on a local thread pool with `n` threads.
    ///
    /// # Warning
    /// Creates a new thread pool on every call, which has significant overhead.
    Fixed(usize),
}

/// Apply `f` to every row of `dst` with the given strategy.
///
/// `f` receives the row index and the mutable row slice of length `row_len`.
pub fn for_each_row<T, F>(
    dst: &mut [T],
    row_len: usize,
    strategy: ExecutionStrategy,
    f: F,
) -> Result<(), ParallelError>
where
    T: Send,
    F: Fn(usize, &mut [T]) + Send + Sync,
{
    if row_len == 0 {
        return Ok(());
    }

    match strategy {
        ExecutionStrategy::Serial => {
            dst.chunks_exact_mut(row_len)
                .enumerate()
                .for_each(|(r, row)| f(r, row));
        }
        ExecutionStrategy::ParallelRows => {
            dst.par_chunks_exact_mut(row_len)
                .enumerate()
                .for_each(|(r, row)| f(r, row));
        }
        ExecutionStrategy::Fixed(num_threads) => {
            if num_threads == 0 {
                return Err(ParallelError::InvalidThreadCount(num_threads));
            }
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .build()
                .map_err(|e| ParallelError::BuildError(e.to_string()))?;
            pool.install(|| {
                dst.par_chunks_exact_mut(row_len)
                    .enumerate()
                    .for_each(|(r, row)| f(r, row));
            });
        }
    }

    Ok(())
}
