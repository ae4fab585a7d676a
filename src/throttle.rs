// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Outbound request throttling for the GitHub API.
///
/// Bounds both the number of in-flight requests and the number of requests
/// started within a sliding time window.
use std::{collections::VecDeque, sync::Arc, time::Duration};

use tokio::{
    sync::{Mutex, OwnedSemaphorePermit, Semaphore},
    time::{Instant, sleep_until},
};
use tracing::debug;

use crate::error::Error;

/// Limits applied by a [`Throttle`].
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct ThrottleConfig
{
    /// Requests allowed to start within one `per` window (default: 5).
    pub rate:       usize,
    /// Length of the sliding window (default: 10 seconds).
    pub per:        Duration,
    /// Requests allowed in flight at once (default: 2).
    pub concurrent: usize,
}

impl Default for ThrottleConfig
{
    fn default() -> Self
    {
        Self {
            rate: 5, per: Duration::from_secs(10,), concurrent: 2,
        }
    }
}

/// Rate and concurrency limiter shared by every request of a run.
///
/// Call [`Throttle::acquire`] before each request and keep the returned
/// permit alive until the response has been consumed.
#[derive(Debug,)]
pub struct Throttle
{
    slots:   Arc<Semaphore,>,
    started: Mutex<VecDeque<Instant,>,>,
    rate:    usize,
    per:     Duration,
}

/// Concurrency slot held for the duration of one request.
#[derive(Debug,)]
pub struct ThrottlePermit
{
    _slot: OwnedSemaphorePermit,
}

impl Throttle
{
    /// Creates a throttle from the given limits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when any limit is zero.
    pub fn new(config: &ThrottleConfig,) -> Result<Self, Error,>
    {
        if config.rate == 0 || config.concurrent == 0 || config.per.is_zero() {
            return Err(Error::validation("throttle limits must be greater than zero",),);
        }

        Ok(Self {
            slots:   Arc::new(Semaphore::new(config.concurrent,),),
            started: Mutex::new(VecDeque::with_capacity(config.rate,),),
            rate:    config.rate,
            per:     config.per,
        },)
    }

    /// Waits for a free concurrency slot and for room in the rate window.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Service`] if the underlying semaphore was closed.
    pub async fn acquire(&self,) -> Result<ThrottlePermit, Error,>
    {
        let slot = Arc::clone(&self.slots,)
            .acquire_owned()
            .await
            .map_err(|e| Error::service(format!("throttle closed: {e}"),),)?;

        loop {
            let wait_until = {
                let mut started = self.started.lock().await;
                let now = Instant::now();
                while started.front().is_some_and(|first| now.duration_since(*first,) >= self.per,) {
                    started.pop_front();
                }

                if started.len() < self.rate {
                    started.push_back(now,);
                    None
                } else {
                    started.front().map(|first| *first + self.per,)
                }
            };

            match wait_until {
                None => break,
                Some(deadline,) => {
                    debug!(
                        "Request budget of {} per {:?} exhausted, waiting {:?}",
                        self.rate,
                        self.per,
                        deadline.saturating_duration_since(Instant::now())
                    );
                    sleep_until(deadline,).await;
                }
            }
        }

        Ok(ThrottlePermit {
            _slot: slot,
        },)
    }
}
