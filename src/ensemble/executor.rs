use crate::ensemble::{EnsembleError, Parallelism};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

/// A member task that panicked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TaskFailure {
    pub member: usize,
    pub message: String,
}

/// Runs one task per member and blocks until all of them finished.
///
/// The bounded pool lives as long as the executor and is torn down with it.
#[derive(Debug)]
pub(crate) enum Executor {
    Sequential,
    Unbounded,
    Pool(ThreadPool),
}

impl Executor {
    pub fn new(parallelism: Parallelism) -> Result<Self, EnsembleError> {
        Ok(match parallelism {
            Parallelism::Sequential => Executor::Sequential,
            Parallelism::Unbounded => Executor::Unbounded,
            Parallelism::Bounded(threads) => Executor::Pool(
                ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("lbag-worker-{i}"))
                    .build()?,
            ),
        })
    }

    pub fn is_sequential(&self) -> bool {
        matches!(self, Executor::Sequential)
    }

    pub fn threads(&self) -> usize {
        match self {
            Executor::Sequential => 1,
            Executor::Unbounded => rayon::current_num_threads(),
            Executor::Pool(pool) => pool.current_num_threads(),
        }
    }

    /// Calls `task(i)` for every `i < members`. A panicking task does not
    /// stop the others; failures come back in member order.
    pub fn run<F>(&self, members: usize, task: F) -> Vec<TaskFailure>
    where
        F: Fn(usize) + Sync + Send,
    {
        let guarded = |member: usize| {
            catch_unwind(AssertUnwindSafe(|| task(member)))
                .err()
                .map(|payload| TaskFailure {
                    member,
                    message: panic_message(payload.as_ref()),
                })
        };
        match self {
            Executor::Sequential => (0..members).filter_map(guarded).collect(),
            Executor::Unbounded => (0..members).into_par_iter().filter_map(guarded).collect(),
            Executor::Pool(pool) => {
                pool.install(|| (0..members).into_par_iter().filter_map(guarded).collect())
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "member task panicked".to_string()
    }
}
