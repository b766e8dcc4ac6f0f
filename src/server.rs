use std::net::SocketAddr;
use std::sync::Arc;

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};

use crate::protocol::resp::{MAX_FRAME_LEN, ProtocolError};
use crate::protocol::{CommandFactory, Parser, Session, Value};
use crate::store::{Identity, Service};

/// Initial per-connection read buffer size
const READ_BUFFER_SIZE: usize = 8192;

/// TCP server
pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
    cmd_factory: Arc<CommandFactory>,
    service: Arc<Service>,
    /// Largest incomplete frame a connection may buffer
    max_frame_len: usize,
}

impl Server {
    /// Create and bind TCP server to specified address
    pub async fn bind(addr: &str, service: Arc<Service>) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        info!("TCP server bound to {}", local_addr);

        // Initialize command factory
        let cmd_factory = Arc::new(CommandFactory::init());

        Ok(Self {
            listener,
            local_addr,
            cmd_factory,
            service,
            max_frame_len: MAX_FRAME_LEN,
        })
    }

    /// Override the per-connection frame size limit
    pub fn with_max_frame_len(mut self, max_frame_len: usize) -> Self {
        self.max_frame_len = max_frame_len;
        self
    }

    /// Get local listening address
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Handle a single client connection
    ///
    /// The caller's identity is its peer address.
    async fn handle_connection(
        self: Arc<Self>,
        mut stream: TcpStream,
        peer_addr: SocketAddr,
    ) -> std::io::Result<()> {
        let session = Session::new(
            Arc::clone(&self.service),
            Identity::from(peer_addr.to_string()),
        );
        // Buffer for incomplete commands
        let mut pending = BytesMut::with_capacity(READ_BUFFER_SIZE);

        loop {
            match stream.read_buf(&mut pending).await {
                Ok(0) => {
                    info!("Connection closed by client: {}", peer_addr);
                    break;
                }
                Ok(_) => {
                    // Process every complete command in the buffer
                    loop {
                        let parsed = match Parser::parse(&pending) {
                            Ok(None) if pending.len() > self.max_frame_len => {
                                Err(ProtocolError::FrameTooLarge(self.max_frame_len))
                            }
                            other => other,
                        };
                        match parsed {
                            Ok(Some((value, consumed))) => {
                                pending.advance(consumed);
                                debug!("Received command from {}: {:?}", peer_addr, value);

                                let response = self.cmd_factory.execute(value, &session).await;
                                stream.write_all(&response.encode()).await?;
                            }
                            // No complete command available
                            Ok(None) => break,
                            Err(e) => {
                                warn!("Protocol error from {}: {}", peer_addr, e);
                                let reply = Value::error(format!("ERR protocol error: {}", e));
                                stream.write_all(&reply.encode()).await?;
                                return Ok(());
                            }
                        }
                    }
                }
                Err(e) => {
                    error!("Error reading from {}: {}", peer_addr, e);
                    break;
                }
            }
        }

        info!("Connection handler ended for {}", peer_addr);
        Ok(())
    }

    /// Start server, accept and process connections
    pub async fn run(self: Arc<Self>) {
        info!("Server started, listening on {}", self.local_addr);

        loop {
            match self.listener.accept().await {
                Ok((stream, peer_addr)) => {
                    info!("New connection accepted from {}", peer_addr);

                    // Clone the Arc<Server> for the new connection
                    let server = Arc::clone(&self);

                    // Spawn an independent task for each connection
                    tokio::spawn(async move {
                        if let Err(e) = server.handle_connection(stream, peer_addr).await {
                            warn!("Error handling connection from {}: {}", peer_addr, e);
                        }
                    });
                }
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                }
            }
        }
    }
}
