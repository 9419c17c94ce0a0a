//! `Kiosk` builder and startup.
//!
//! This is the entry point for running a kiosk. It ties the layers
//! together: reader → user manager → session gate → directory, with the
//! router and display on the way out.

use std::time::Duration;

use kioskgate_directory::Directory;
use kioskgate_reader::{DEFAULT_ATTACH_TIMEOUT, EventSink, Reader, event_channel};
use kioskgate_router::{KioskDisplay, NavigationRouter, RouteRule};
use kioskgate_session::{SessionGate, Validator, ValidatorConfig};
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;

use crate::manager::{KioskStatus, UserManager};
use crate::{KioskConfig, KioskError};

/// Default capacity of the reader event channel.
pub const DEFAULT_EVENT_BUFFER: usize = 16;

/// Builder for configuring a [`Kiosk`].
///
/// # Example
///
/// ```rust,ignore
/// use kioskgate::prelude::*;
///
/// let handle = KioskBuilder::new()
///     .attach_timeout(Duration::from_secs(5))
///     .build(reader, directory, TracingDisplay)
///     .start()
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct KioskBuilder {
    validator_config: ValidatorConfig,
    routes: Option<Vec<RouteRule>>,
    attach_timeout: Duration,
    event_buffer: usize,
}

impl KioskBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            validator_config: ValidatorConfig::default(),
            routes: None,
            attach_timeout: DEFAULT_ATTACH_TIMEOUT,
            event_buffer: DEFAULT_EVENT_BUFFER,
        }
    }

    /// Takes the reader settings from a loaded configuration.
    pub fn config(self, config: &KioskConfig) -> Self {
        self.attach_timeout(config.reader.attach_timeout())
            .event_buffer(config.reader.event_buffer)
    }

    pub fn validator_config(mut self, config: ValidatorConfig) -> Self {
        self.validator_config = config;
        self
    }

    /// Replaces the stock role-to-screen rules.
    pub fn routes(mut self, rules: Vec<RouteRule>) -> Self {
        self.routes = Some(rules);
        self
    }

    /// How long [`Kiosk::start`] waits for the reader to attach.
    pub fn attach_timeout(mut self, timeout: Duration) -> Self {
        self.attach_timeout = timeout;
        self
    }

    /// Capacity of the reader event channel. Clamped to at least 1.
    pub fn event_buffer(mut self, buffer: usize) -> Self {
        self.event_buffer = buffer.max(1);
        self
    }

    /// Assembles a kiosk from its collaborators. Nothing is started yet.
    pub fn build<R, D, V>(self, reader: R, directory: D, display: V) -> Kiosk<R, D, V>
    where
        R: Reader,
        D: Directory,
        V: KioskDisplay,
    {
        let router = match self.routes {
            Some(rules) => NavigationRouter::new(rules),
            None => NavigationRouter::default(),
        };
        Kiosk {
            reader,
            validator: Validator::new(directory, self.validator_config),
            router,
            display,
            attach_timeout: self.attach_timeout,
            event_buffer: self.event_buffer,
        }
    }
}

impl Default for KioskBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// An assembled, not yet started kiosk.
pub struct Kiosk<R: Reader, D: Directory, V: KioskDisplay> {
    reader: R,
    validator: Validator<D>,
    router: NavigationRouter,
    display: V,
    attach_timeout: Duration,
    event_buffer: usize,
}

impl<R, D, V> Kiosk<R, D, V>
where
    R: Reader,
    D: Directory,
    V: KioskDisplay,
{
    /// Brings the reader up and starts the user manager.
    ///
    /// Opens the reader, waits for it to attach, logs the device, switches
    /// the antenna on, then spawns the user manager task. Must be called
    /// from within a Tokio runtime.
    ///
    /// # Errors
    /// [`KioskError::HardwareFatal`] if any reader step fails. The reader
    /// is closed before returning.
    pub async fn start(self) -> Result<KioskHandle, KioskError> {
        let (sink, events) = event_channel(self.event_buffer);

        if let Err(error) = bring_up(&self.reader, sink.clone(), self.attach_timeout).await {
            tracing::error!(%error, "reader startup failed");
            if let Err(close_error) = self.reader.close() {
                tracing::debug!(error = %close_error, "reader close after failed startup");
            }
            return Err(error.into());
        }

        let (status_tx, status) = watch::channel(KioskStatus::default());
        let (shutdown, shutdown_rx) = oneshot::channel();
        let manager = UserManager::new(
            self.reader,
            SessionGate::new(self.validator),
            self.router,
            self.display,
            status_tx,
        );
        let join = tokio::spawn(manager.run(events, shutdown_rx));

        tracing::info!("kiosk running");
        Ok(KioskHandle {
            sink,
            status,
            shutdown,
            join,
        })
    }
}

async fn bring_up<R: Reader>(
    reader: &R,
    sink: EventSink,
    attach_timeout: Duration,
) -> Result<(), kioskgate_reader::ReaderError> {
    reader.open(sink)?;
    tracing::info!(?attach_timeout, "waiting for reader to attach");
    let info = reader.wait_for_attach(attach_timeout).await?;
    info.log_table();
    reader.set_antenna_on(true)?;
    Ok(())
}

/// A running kiosk.
///
/// Dropping the handle stops the user manager without waiting for it.
pub struct KioskHandle {
    sink: EventSink,
    status: watch::Receiver<KioskStatus>,
    shutdown: oneshot::Sender<()>,
    join: JoinHandle<()>,
}

impl KioskHandle {
    /// A sink feeding the same channel as the reader. Lets callers inject
    /// events directly.
    pub fn sink(&self) -> &EventSink {
        &self.sink
    }

    /// The latest published status.
    pub fn status(&self) -> KioskStatus {
        self.status.borrow().clone()
    }

    /// Subscribes to status updates.
    pub fn subscribe(&self) -> watch::Receiver<KioskStatus> {
        self.status.clone()
    }

    /// Waits until the published status satisfies `ready`.
    ///
    /// Returns `None` if the user manager stopped first.
    pub async fn wait_for(
        &self,
        ready: impl FnMut(&KioskStatus) -> bool,
    ) -> Option<KioskStatus> {
        let mut status = self.status.clone();
        let reached = status.wait_for(ready).await.ok().map(|s| KioskStatus::clone(&s));
        reached
    }

    /// Waits until the user manager has handled `delivered` events and no
    /// validation is in flight.
    ///
    /// `delivered` counts every event that reached the channel, the reader's
    /// attach event included. Returns `None` if the user manager stopped
    /// first.
    pub async fn settle(&self, delivered: u64) -> Option<KioskStatus> {
        self.wait_for(|status| status.events >= delivered && !status.session.in_flight)
            .await
    }

    /// Stops the user manager and waits for it to close the reader.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(());
        if let Err(error) = self.join.await {
            tracing::error!(%error, "user manager task failed");
        }
    }
}
