//! Receipt sink contract and printer adapters
//!
//! Supports:
//! - Network printers (TCP port 9100)
//! - In-memory sink for tests

use crate::error::{PrintError, PrintResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{info, instrument, warn};

/// Which physical printer a document is destined for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrintTarget {
    /// Kitchen printer (KOT documents)
    Kitchen,
    /// Counter printer (Bill documents)
    Counter,
}

/// A fully rendered document ready for dispatch.
///
/// Rendering has no external effect; the same document can be sent any
/// number of times (reprints).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptDocument {
    pub target: PrintTarget,
    pub content: String,
}

impl ReceiptDocument {
    pub fn new(target: PrintTarget, content: impl Into<String>) -> Self {
        Self {
            target,
            content: content.into(),
        }
    }
}

/// Acknowledgement returned by a sink on successful dispatch
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PrintAck {
    pub bytes_sent: usize,
}

/// Asynchronous receipt dispatch contract
///
/// `send` looks synchronous to callers but is asynchronous underneath;
/// failure is reported, never retried here.
#[async_trait]
pub trait ReceiptSink: Send + Sync {
    /// Send a rendered document to the printer
    async fn send(&self, doc: &ReceiptDocument) -> PrintResult<PrintAck>;

    /// Check if the printer is online/reachable
    async fn is_online(&self) -> bool {
        true
    }
}

/// Network printer (TCP port 9100)
///
/// Most thermal printers support raw TCP printing on port 9100.
#[derive(Debug, Clone)]
pub struct NetworkPrinter {
    addr: SocketAddr,
    timeout: Duration,
}

impl NetworkPrinter {
    /// Create a new network printer
    pub fn new(host: &str, port: u16) -> PrintResult<Self> {
        let addr_str = format!("{}:{}", host, port);
        let addr = addr_str
            .parse()
            .map_err(|_| PrintError::InvalidConfig(format!("Invalid address: {}", addr_str)))?;

        Ok(Self {
            addr,
            timeout: Duration::from_secs(5),
        })
    }

    /// Create from a socket address string (e.g., "192.168.1.100:9100")
    pub fn from_addr(addr: &str) -> PrintResult<Self> {
        let addr: SocketAddr = addr
            .parse()
            .map_err(|_| PrintError::InvalidConfig(format!("Invalid address: {}", addr)))?;

        Ok(Self {
            addr,
            timeout: Duration::from_secs(5),
        })
    }

    /// Set connection timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the printer address
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

#[async_trait]
impl ReceiptSink for NetworkPrinter {
    #[instrument(skip(doc), fields(addr = %self.addr, target = ?doc.target))]
    async fn send(&self, doc: &ReceiptDocument) -> PrintResult<PrintAck> {
        info!("Connecting to printer");

        let stream = tokio::time::timeout(self.timeout, TcpStream::connect(self.addr))
            .await
            .map_err(|_| PrintError::Timeout(format!("Connection timeout: {}", self.addr)))?
            .map_err(|e| PrintError::Connection(format!("{}: {}", self.addr, e)))?;

        let data = doc.content.as_bytes();
        info!("Connected, sending {} bytes", data.len());

        let mut stream = stream;
        stream.write_all(data).await.map_err(|e| {
            PrintError::Io(std::io::Error::new(
                e.kind(),
                format!("Write failed: {}", e),
            ))
        })?;

        stream.flush().await?;

        info!("Print job sent successfully");
        Ok(PrintAck {
            bytes_sent: data.len(),
        })
    }

    #[instrument(fields(addr = %self.addr))]
    async fn is_online(&self) -> bool {
        let check_timeout = Duration::from_millis(500);

        match tokio::time::timeout(check_timeout, TcpStream::connect(self.addr)).await {
            Ok(Ok(_)) => {
                info!("Printer online");
                true
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Printer offline");
                false
            }
            Err(_) => {
                warn!("Printer check timeout");
                false
            }
        }
    }
}

/// In-memory sink that records every document it receives.
///
/// Used in tests and as the fallback when no physical printer is
/// configured.
#[derive(Debug, Default)]
pub struct MemorySink {
    docs: Mutex<Vec<ReceiptDocument>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Documents received so far, in dispatch order
    pub fn sent(&self) -> Vec<ReceiptDocument> {
        self.docs.lock().expect("sink mutex poisoned").clone()
    }
}

#[async_trait]
impl ReceiptSink for MemorySink {
    async fn send(&self, doc: &ReceiptDocument) -> PrintResult<PrintAck> {
        let bytes_sent = doc.content.len();
        self.docs.lock().expect("sink mutex poisoned").push(doc.clone());
        Ok(PrintAck { bytes_sent })
    }
}
