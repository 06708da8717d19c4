//! Yield points for the batched apply path

use std::future::Future;

/// Where the async apply hands control back between batches
pub trait Scheduler {
    fn yield_now(&mut self) -> impl Future<Output = ()>;
}

/// Yields to the tokio runtime so other tasks can run
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskYield;

impl Scheduler for TaskYield {
    fn yield_now(&mut self) -> impl Future<Output = ()> {
        tokio::task::yield_now()
    }
}

/// Never suspends; the async path then runs straight through
#[derive(Debug, Clone, Copy, Default)]
pub struct NoYield;

impl Scheduler for NoYield {
    fn yield_now(&mut self) -> impl Future<Output = ()> {
        std::future::ready(())
    }
}

impl<S: Scheduler + ?Sized> Scheduler for &mut S {
    fn yield_now(&mut self) -> impl Future<Output = ()> {
        (**self).yield_now()
    }
}
