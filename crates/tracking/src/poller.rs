//! Periodic position sampling.
//!
//! A [`LocationPoller`] is either `Idle` or `Sampling`. While sampling, a
//! spawned task repeatedly acquires a position fix, pushes it to the backend,
//! refreshes the stop list and then waits for the sample interval.
//!
//! Disabling is checked once per iteration. An outstanding fix is cancelled
//! right away, a running delay is not.

use std::{
    panic::AssertUnwindSafe,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use backend::Backend;
use futures::FutureExt;
use model::{location::LocationSample, GeoPoint};
use tokio::{sync::watch, time};
use tokio_util::sync::CancellationToken;

use crate::{
    config::TrackerConfig,
    credentials::{current_session, CredentialStore},
    position::PositionProvider,
    stops::StopCollector,
    sync::{LocationSync, PushOutcome},
    TrackingError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Idle,
    Sampling,
}

#[derive(Default)]
struct Control {
    enabled: bool,
    sampling: bool,
    /// Cancels the fix currently being acquired.
    fix: Option<CancellationToken>,
}

struct Shared<P, B: Backend> {
    provider: P,
    sync: LocationSync<B>,
    stops: Arc<StopCollector<B>>,
    credentials: Arc<dyn CredentialStore>,
    config: TrackerConfig,
    control: Mutex<Control>,
    state: watch::Sender<PollerState>,
}

pub struct LocationPoller<P, B: Backend> {
    shared: Arc<Shared<P, B>>,
}

impl<P, B> LocationPoller<P, B>
where
    P: PositionProvider + 'static,
    B: Backend + 'static,
{
    pub fn new(
        provider: P,
        backend: Arc<B>,
        stops: Arc<StopCollector<B>>,
        credentials: Arc<dyn CredentialStore>,
        config: TrackerConfig,
    ) -> Self {
        let (state, _) = watch::channel(PollerState::Idle);
        Self {
            shared: Arc::new(Shared {
                provider,
                sync: LocationSync::new(backend),
                stops,
                credentials,
                config,
                control: Mutex::default(),
                state,
            }),
        }
    }

    /// Starts a sampling session on the current tokio runtime. Returns
    /// `false` if a session is already running.
    pub fn enable(&self) -> bool {
        let mut control = self.shared.control();
        control.enabled = true;
        if control.sampling {
            return false;
        }
        control.sampling = true;
        self.shared.state.send_replace(PollerState::Sampling);
        drop(control);

        tokio::spawn(self.shared.clone().run());
        true
    }

    /// Stops sampling after the current iteration and aborts an outstanding
    /// position fix.
    pub fn disable(&self) {
        let mut control = self.shared.control();
        control.enabled = false;
        if let Some(fix) = control.fix.take() {
            fix.cancel();
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.shared.control().enabled
    }

    pub fn state(&self) -> PollerState {
        *self.shared.state.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<PollerState> {
        self.shared.state.subscribe()
    }

    pub fn stops(&self) -> &Arc<StopCollector<B>> {
        &self.shared.stops
    }
}

impl<P, B: Backend> Drop for LocationPoller<P, B> {
    fn drop(&mut self) {
        let mut control = self.shared.control();
        control.enabled = false;
        if let Some(fix) = control.fix.take() {
            fix.cancel();
        }
    }
}

impl<P, B: Backend> Shared<P, B> {
    fn control(&self) -> MutexGuard<'_, Control> {
        self.control.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<P, B> Shared<P, B>
where
    P: PositionProvider,
    B: Backend,
{
    async fn run(self: Arc<Self>) {
        log::info!("Location sampling started.");
        loop {
            // checked under the same lock `enable` takes, so a concurrent
            // enable either keeps this session alive or starts a new one
            let cancel = {
                let mut control = self.control();
                if !control.enabled {
                    control.sampling = false;
                    self.state.send_replace(PollerState::Idle);
                    break;
                }
                let cancel = CancellationToken::new();
                control.fix = Some(cancel.clone());
                cancel
            };

            let result = AssertUnwindSafe(self.sample(cancel)).catch_unwind().await;
            let failure = match result {
                Ok(Ok(())) => continue,
                Ok(Err(why)) => why.to_string(),
                Err(_) => "sampling panicked".to_owned(),
            };

            log::error!("Location sampling stopped: {failure}");
            let mut control = self.control();
            control.enabled = false;
            control.sampling = false;
            control.fix = None;
            self.state.send_replace(PollerState::Idle);
            return;
        }
        log::info!("Location sampling stopped.");
    }

    /// One iteration. Errors end the session.
    async fn sample(&self, cancel: CancellationToken) -> Result<(), TrackingError> {
        let timeout = self.config.fix_timeout;
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = time::timeout(
                timeout,
                self.provider.current_position(self.config.accuracy, timeout),
            ) => Some(result),
        };
        self.control().fix = None;

        let point = match result {
            None => {
                log::debug!("Position fix cancelled.");
                return Ok(());
            }
            Some(Err(_)) => {
                log::debug!("No position fix within {timeout:?}.");
                None
            }
            Some(Ok(fix)) => fix?,
        };

        if let Some(point) = point {
            self.on_fix(point).await;
        }

        time::sleep(self.config.sample_interval).await;
        Ok(())
    }

    async fn on_fix(&self, point: GeoPoint) {
        let sample = LocationSample::now(point);
        let session = current_session(self.credentials.as_ref());

        match self.sync.push(session.as_ref(), &sample).await {
            Ok(PushOutcome::Pushed) => log::debug!("Pushed location {}.", sample.point),
            Ok(PushOutcome::Skipped) => {
                log::debug!("Not signed in, location {} not pushed.", sample.point)
            }
            Err(why) => log::warn!("Could not push location: {why}"),
        }

        if let Some(session) = session {
            if let Err(why) = self.stops.refresh(session.driver_id).await {
                log::warn!("Could not refresh stops: {why}");
            }
        }
    }
}
