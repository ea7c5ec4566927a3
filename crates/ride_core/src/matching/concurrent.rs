//! Bounded, cancellable fan-out of ETA lookups.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};

use crate::eta::EtaProvider;
use crate::geo::Location;

/// Shared flag used to abandon an in-flight match, e.g. when the client
/// disconnects. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Worker pool that caps how many ETA lookups run at once.
pub struct EtaLookupPool {
    pool: ThreadPool,
    max_in_flight: usize,
}

impl EtaLookupPool {
    pub fn new(max_in_flight: usize) -> Result<Self, ThreadPoolBuildError> {
        let max_in_flight = max_in_flight.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(max_in_flight)
            .thread_name(|i| format!("eta-lookup-{i}"))
            .build()?;
        Ok(Self {
            pool,
            max_in_flight,
        })
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }

    /// Look up the travel time from `from` to every target, preserving order.
    ///
    /// Returns `None` if `cancel` fired before all results were collected.
    pub fn lookup_all<E>(
        &self,
        eta: &E,
        from: Location,
        targets: &[Location],
        cancel: &CancellationToken,
    ) -> Option<Vec<Option<f64>>>
    where
        E: EtaProvider + ?Sized,
    {
        let etas: Vec<Option<f64>> = self.pool.install(|| {
            targets
                .par_iter()
                .map(|to| {
                    if cancel.is_cancelled() {
                        None
                    } else {
                        eta.travel_time_minutes(from, *to)
                    }
                })
                .collect()
        });

        if cancel.is_cancelled() {
            None
        } else {
            Some(etas)
        }
    }
}

impl std::fmt::Debug for EtaLookupPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EtaLookupPool")
            .field("max_in_flight", &self.max_in_flight)
            .finish()
    }
}
