use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{Notify, Semaphore};

use crate::config::Config;
use crate::statics::StaticFiles;
use logger::ServerLogger;
use router::Router;

pub mod connection;
pub mod handlers;
pub mod logger;
pub mod router;

pub struct Server {
    addr: SocketAddr,
    config: Arc<Config>,
    logger: Arc<ServerLogger>,
    router: Arc<Router>,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn logger(&self) -> Arc<ServerLogger> {
        Arc::clone(&self.logger)
    }

    /// Binds the listening socket without accepting yet.
    pub async fn bind(self) -> Result<Listening, ServerError> {
        let listener = TcpListener::bind(self.addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: self.addr,
                source,
            })?;
        let local_addr = listener.local_addr()?;

        Ok(Listening {
            listener,
            local_addr,
            router: self.router,
            logger: self.logger,
            pool: Arc::new(Semaphore::new(
                self.config.thread_pool_size().min(Semaphore::MAX_PERMITS),
            )),
            shutdown: ShutdownHandle::new(),
        })
    }

    pub async fn serve(self) -> Result<(), ServerError> {
        self.bind().await?.run().await
    }
}

/// Stops a running accept loop from another task.
#[derive(Clone)]
pub struct ShutdownHandle {
    running: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl ShutdownHandle {
    fn new() -> Self {
        ShutdownHandle {
            running: Arc::new(AtomicBool::new(true)),
            notify: Arc::new(Notify::new()),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        // a stored permit wakes the loop even if it is not waiting yet
        self.notify.notify_one();
    }
}

/// A bound server, ready to accept connections.
pub struct Listening {
    listener: TcpListener,
    local_addr: SocketAddr,
    router: Arc<Router>,
    logger: Arc<ServerLogger>,
    pool: Arc<Semaphore>,
    shutdown: ShutdownHandle,
}

impl Listening {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn logger(&self) -> Arc<ServerLogger> {
        Arc::clone(&self.logger)
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Accepts until stopped. Every connection gets its own task, which waits
    /// for a pool permit before touching the socket; waiting tasks are not
    /// bounded.
    pub async fn run(self) -> Result<(), ServerError> {
        let Listening {
            listener,
            local_addr,
            router,
            logger,
            pool,
            shutdown,
        } = self;

        logger.log_server_start(local_addr);

        while shutdown.is_running() {
            let accepted = tokio::select! {
                _ = shutdown.notify.notified() => break,
                accepted = listener.accept() => accepted,
            };

            let (stream, peer) = match accepted {
                Ok(accepted) => accepted,
                Err(err) => {
                    if shutdown.is_running() {
                        logger.log_error(&format!("Error accepting connection: {err}"));
                    }
                    continue;
                }
            };
            logger.log_connection(peer);

            let router = Arc::clone(&router);
            let logger = Arc::clone(&logger);
            let pool = Arc::clone(&pool);
            tokio::task::spawn(async move {
                let _permit = match pool.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return,
                };
                connection::handle_connection(stream, router, logger).await;
            });
        }

        drop(listener);
        logger.log_server_stop();
        Ok(())
    }
}

#[derive(Default)]
pub struct ServerBuilder {
    host: Option<String>,
    port: Option<u16>,
    addr: Option<SocketAddr>,
    config: Option<Config>,
}

impl ServerBuilder {
    pub fn new() -> ServerBuilder {
        ServerBuilder::default()
    }

    pub fn with_host(mut self, host: impl Into<String>) -> ServerBuilder {
        self.host = Some(host.into());
        self
    }

    /// Overrides the port from the config.
    pub fn with_port(mut self, port: u16) -> ServerBuilder {
        self.port = Some(port);
        self
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> ServerBuilder {
        self.addr = Some(addr);
        self
    }

    pub fn with_config(mut self, config: Config) -> ServerBuilder {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> Result<Server, BuildError> {
        let config = self.config.unwrap_or_default();
        if config.thread_pool_size() == 0 {
            return Err(BuildError::EmptyPool);
        }

        let addr = match self.addr {
            Some(addr) => addr,
            None => {
                let host = self.host.ok_or(BuildError::NoHost)?;
                let ip = host.parse().map_err(|_| BuildError::InvalidHost(host.clone()))?;
                SocketAddr::new(ip, self.port.unwrap_or(config.port()))
            }
        };

        let logger = Arc::new(ServerLogger::new(
            config.is_logging_enabled(),
            config.is_monitoring_enabled(),
        ));
        let statics = Arc::new(StaticFiles::new(config.static_dir()));
        let config = Arc::new(config);
        let router = handlers::default_router(Arc::clone(&config), Arc::clone(&logger), statics);

        Ok(Server {
            addr,
            config,
            logger,
            router: Arc::new(router),
        })
    }
}

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("host is not specified")]
    NoHost,

    #[error("given host {0:?} is not a valid ip")]
    InvalidHost(String),

    #[error("worker pool size must be at least 1")]
    EmptyPool,
}

/// Failure inside a route handler. Rendered as a 500.
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("handler panicked: {0}")]
    Panicked(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("failed to serialize response: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}
