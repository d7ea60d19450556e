/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Engine assembly and lifecycle.
//!
//! [`EngineBuilder`] collects the application, sessions and connection
//! policy; [`Engine::start`] spawns one task group per session (initiators
//! dial with a reconnect loop, acceptors listen) and returns an
//! [`EngineHandle`] for shutdown.

use crate::application::Application;
use crate::registry::SessionRegistry;
use crate::session::SessionRuntime;
use fixlink_core::error::{FixError, SessionError};
use fixlink_core::types::{BEGIN_STRING_FIX42, BEGIN_STRING_FIX44};
use fixlink_dictionary::{application as application_dict, transport, Dictionary, Version};
use fixlink_session::{SessionRole, SessionSettings};
use fixlink_store::{MemoryStore, MessageStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Maps a BeginString to the dictionary version pair of a session.
fn version_for(begin_string: &str) -> (Version, Version) {
    match begin_string {
        BEGIN_STRING_FIX42 => (Version::Fix42, Version::Fix42),
        BEGIN_STRING_FIX44 => (Version::Fix44, Version::Fix44),
        _ => (Version::Fixt11, Version::Fix50Sp2),
    }
}

/// Builder for configuring a FIX engine.
pub struct EngineBuilder {
    application: Arc<dyn Application>,
    sessions: Vec<(SessionSettings, Arc<dyn MessageStore>)>,
    connect_timeout: Duration,
    reconnect_interval: Duration,
    max_reconnect_attempts: u32,
}

impl EngineBuilder {
    /// Creates a new engine builder with default settings.
    #[must_use]
    pub fn new(application: Arc<dyn Application>) -> Self {
        Self {
            application,
            sessions: Vec::new(),
            connect_timeout: Duration::from_secs(30),
            reconnect_interval: Duration::from_secs(5),
            max_reconnect_attempts: 10,
        }
    }

    /// Adds a session backed by an in-memory store.
    #[must_use]
    pub fn add_session(self, settings: SessionSettings) -> Self {
        let store: Arc<dyn MessageStore> = Arc::new(MemoryStore::new());
        self.add_session_with_store(settings, store)
    }

    /// Adds a session backed by an injected message store.
    #[must_use]
    pub fn add_session_with_store(
        mut self,
        settings: SessionSettings,
        store: Arc<dyn MessageStore>,
    ) -> Self {
        self.sessions.push((settings, store));
        self
    }

    /// Sets the connection timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the reconnect interval.
    #[must_use]
    pub const fn with_reconnect_interval(mut self, interval: Duration) -> Self {
        self.reconnect_interval = interval;
        self
    }

    /// Sets the maximum consecutive reconnect attempts (0 = unlimited).
    #[must_use]
    pub const fn with_max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.max_reconnect_attempts = attempts;
        self
    }

    /// Returns the configured sessions.
    #[must_use]
    pub fn sessions(&self) -> impl Iterator<Item = &SessionSettings> {
        self.sessions.iter().map(|(settings, _)| settings)
    }

    /// Builds the engine.
    #[must_use]
    pub fn build(self) -> Engine {
        Engine {
            application: self.application,
            sessions: self.sessions,
            connect_timeout: self.connect_timeout,
            reconnect_interval: self.reconnect_interval,
            max_reconnect_attempts: self.max_reconnect_attempts,
            registry: Arc::new(SessionRegistry::new()),
        }
    }
}

impl std::fmt::Debug for EngineBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineBuilder")
            .field("sessions", &self.sessions.len())
            .field("connect_timeout", &self.connect_timeout)
            .finish_non_exhaustive()
    }
}

/// A configured engine, ready to start its sessions.
pub struct Engine {
    application: Arc<dyn Application>,
    sessions: Vec<(SessionSettings, Arc<dyn MessageStore>)>,
    connect_timeout: Duration,
    reconnect_interval: Duration,
    max_reconnect_attempts: u32,
    registry: Arc<SessionRegistry>,
}

impl Engine {
    /// Returns the session registry applications send through.
    #[must_use]
    pub fn registry(&self) -> Arc<SessionRegistry> {
        Arc::clone(&self.registry)
    }

    /// Starts every configured session.
    ///
    /// Initiator sessions dial and reconnect per policy; acceptor sessions
    /// bind their port and serve connections serially.
    ///
    /// # Errors
    /// Returns `FixError` when settings are invalid or a listener cannot
    /// bind.
    pub async fn start(mut self) -> Result<EngineHandle, FixError> {
        let token = CancellationToken::new();
        let mut tasks = Vec::new();

        for (settings, store) in std::mem::take(&mut self.sessions) {
            let (transport_version, app_version) = version_for(&settings.begin_string);
            let transport_dict: Arc<Dictionary> = Arc::new(transport(transport_version));
            let app_dict: Arc<Dictionary> = Arc::new(application_dict(app_version));

            let (runtime, handle) = SessionRuntime::new(
                settings.clone(),
                transport_dict,
                app_dict,
                Arc::clone(&self.application),
                store,
            )?;
            let session_id = handle.session_id().clone();
            self.registry.register(session_id.clone(), handle.commands());
            self.application.on_create(&session_id).await;

            let role = settings.role()?;
            let task = match role {
                SessionRole::Initiator => self.spawn_initiator(settings, runtime, token.clone()),
                SessionRole::Acceptor => self.spawn_acceptor(settings, runtime, token.clone()).await?,
            };
            tasks.push(task);
        }

        Ok(EngineHandle {
            registry: Arc::clone(&self.registry),
            token,
            tasks,
        })
    }

    fn spawn_initiator(
        &self,
        settings: SessionSettings,
        mut runtime: SessionRuntime,
        token: CancellationToken,
    ) -> JoinHandle<()> {
        let connect_timeout = self.connect_timeout;
        let reconnect_interval = self.reconnect_interval;
        let max_attempts = self.max_reconnect_attempts;
        let registry = Arc::clone(&self.registry);

        tokio::spawn(async move {
            let host = settings.socket_connect_host.clone().unwrap_or_default();
            let port = settings.socket_connect_port.unwrap_or_default();
            let session_id = runtime.session_id().clone();
            let mut attempts: u32 = 0;

            loop {
                if token.is_cancelled() {
                    break;
                }

                let dial = tokio::time::timeout(
                    connect_timeout,
                    TcpStream::connect((host.as_str(), port)),
                );
                match dial.await {
                    Ok(Ok(stream)) => {
                        attempts = 0;
                        info!(session = %session_id, %host, port, "connected");
                        if let Err(err) = runtime.run(stream).await {
                            error!(session = %session_id, %err, "session ended with error");
                        }
                    }
                    Ok(Err(err)) => {
                        attempts += 1;
                        warn!(session = %session_id, %err, attempts, "connect failed");
                    }
                    Err(_) => {
                        attempts += 1;
                        warn!(session = %session_id, attempts, "connect timed out");
                    }
                }

                if max_attempts > 0 && attempts >= max_attempts {
                    error!(session = %session_id, "giving up after {attempts} attempts");
                    break;
                }

                tokio::select! {
                    () = token.cancelled() => break,
                    () = tokio::time::sleep(reconnect_interval) => {}
                }
            }

            registry.unregister(&session_id);
        })
    }

    async fn spawn_acceptor(
        &self,
        settings: SessionSettings,
        mut runtime: SessionRuntime,
        token: CancellationToken,
    ) -> Result<JoinHandle<()>, FixError> {
        let port = settings
            .socket_accept_port
            .ok_or_else(|| SessionError::Configuration("acceptor without port".to_string()))?;
        let listener = TcpListener::bind(("0.0.0.0", port)).await?;
        let registry = Arc::clone(&self.registry);

        Ok(tokio::spawn(async move {
            let session_id = runtime.session_id().clone();
            info!(session = %session_id, port, "listening");

            loop {
                tokio::select! {
                    () = token.cancelled() => break,
                    accepted = listener.accept() => match accepted {
                        Ok((stream, peer)) => {
                            info!(session = %session_id, %peer, "accepted connection");
                            if let Err(err) = runtime.run(stream).await {
                                error!(session = %session_id, %err, "session ended with error");
                            }
                        }
                        Err(err) => {
                            error!(session = %session_id, %err, "accept failed");
                            break;
                        }
                    },
                }
            }

            registry.unregister(&session_id);
        }))
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("sessions", &self.sessions.len())
            .finish_non_exhaustive()
    }
}

/// Handle over a started engine.
#[derive(Debug)]
pub struct EngineHandle {
    registry: Arc<SessionRegistry>,
    token: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl EngineHandle {
    /// Returns the session registry.
    #[must_use]
    pub fn registry(&self) -> Arc<SessionRegistry> {
        Arc::clone(&self.registry)
    }

    /// Performs a graceful shutdown: Logout on every session, bounded
    /// drain, then task teardown (forced after five seconds).
    pub async fn shutdown(self) {
        self.registry.logout_all().await;
        tokio::time::sleep(Duration::from_millis(500)).await;
        self.token.cancel();
        for mut task in self.tasks {
            if tokio::time::timeout(Duration::from_secs(5), &mut task)
                .await
                .is_err()
            {
                task.abort();
                let _ = task.await;
            }
        }
    }

    /// Runs until an interrupt/terminate signal, then shuts down.
    pub async fn run_until_signal(self) {
        let _ = tokio::signal::ctrl_c().await;
        info!("signal received, shutting down");
        self.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::NoOpApplication;
    use fixlink_core::types::CompId;

    fn settings() -> SessionSettings {
        SessionSettings::new(
            "FIXT.1.1",
            CompId::new("CL").unwrap(),
            CompId::new("SRV").unwrap(),
        )
        .with_default_appl_ver_id("9")
        .with_connect("localhost", 5001)
    }

    #[test]
    fn test_version_mapping() {
        assert_eq!(version_for("FIX.4.2"), (Version::Fix42, Version::Fix42));
        assert_eq!(version_for("FIX.4.4"), (Version::Fix44, Version::Fix44));
        assert_eq!(version_for("FIXT.1.1"), (Version::Fixt11, Version::Fix50Sp2));
    }

    #[test]
    fn test_builder_collects_sessions() {
        let builder = EngineBuilder::new(Arc::new(NoOpApplication))
            .add_session(settings())
            .with_connect_timeout(Duration::from_secs(3))
            .with_max_reconnect_attempts(1);

        assert_eq!(builder.sessions().count(), 1);
        let engine = builder.build();
        assert!(engine.registry().is_empty());
    }

    #[tokio::test]
    async fn test_start_registers_sessions() {
        // Unlimited reconnect attempts keep the session task alive so the
        // registry entry survives the failing dials to a closed port.
        let engine = EngineBuilder::new(Arc::new(NoOpApplication))
            .add_session(settings())
            .with_connect_timeout(Duration::from_millis(50))
            .with_reconnect_interval(Duration::from_secs(60))
            .with_max_reconnect_attempts(0)
            .build();
        let registry = engine.registry();

        let handle = engine.start().await.unwrap();
        assert_eq!(registry.len(), 1);
        handle.shutdown().await;
        assert!(registry.is_empty());
    }
}
