//! Serialized command execution over a half-duplex link.
//!
//! A [`CommandChannel`] owns the transport and the [`LinkSession`] behind one
//! async mutex. Every command holds the lock from the moment its frame is
//! written until its reply is complete or the deadline passes, so two
//! logical operations never interleave on the wire. Clones share the same
//! lock.
//!
//! Nothing in here retries. A caller that wants another attempt makes
//! another call.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, MutexGuard};
use tokio::time::Instant;
use tracing::{debug, trace, warn};

use rigmem_core::error::{Error, FrameError, LinkError, Result};
use rigmem_core::transport::Transport;

use crate::protocol::{self, Delimiter};
use crate::session::LinkSession;

/// How long to wait for a complete reply.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(1);

/// Bytes requested from the transport per read.
pub const READ_CHUNK: usize = 200;

/// Upper bound on an accumulated reply.
const MAX_BUF: usize = 8192;

/// A command mnemonic and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    mnemonic: String,
    args: Vec<String>,
}

impl Command {
    pub fn new(mnemonic: &str) -> Self {
        Command {
            mnemonic: mnemonic.to_string(),
            args: Vec::new(),
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn mnemonic(&self) -> &str {
        &self.mnemonic
    }

    /// Wire bytes under `delimiter`.
    pub fn encode(&self, delimiter: Delimiter) -> Vec<u8> {
        let args: Vec<&str> = self.args.iter().map(String::as_str).collect();
        protocol::encode_command(&self.mnemonic, &args, delimiter)
    }
}

/// Text returned by the radio for one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Decoded reply with the terminator stripped and surrounding
    /// whitespace trimmed.
    pub text: String,
    /// False when the deadline passed before the terminator arrived; the
    /// text is then whatever had accumulated and should not be trusted.
    pub terminated: bool,
}

impl Reply {
    /// True if the radio answered with a refusal token.
    pub fn is_error(&self) -> bool {
        self.terminated && protocol::is_error_reply(&self.text)
    }

    /// The reply text, or an error if it never completed.
    ///
    /// Nothing at all maps to [`LinkError::Timeout`]; a partial reply maps
    /// to [`FrameError::Incomplete`].
    pub fn complete(self) -> Result<String> {
        if self.terminated {
            Ok(self.text)
        } else if self.text.is_empty() {
            Err(LinkError::Timeout.into())
        } else {
            Err(FrameError::Incomplete.into())
        }
    }
}

struct Link {
    transport: Box<dyn Transport>,
    session: LinkSession,
}

/// Exclusive access to a command link.
#[derive(Clone)]
pub struct CommandChannel {
    link: Arc<Mutex<Link>>,
    deadline: Duration,
}

impl CommandChannel {
    pub fn new(transport: Box<dyn Transport>, session: LinkSession) -> Self {
        CommandChannel {
            link: Arc::new(Mutex::new(Link { transport, session })),
            deadline: DEFAULT_DEADLINE,
        }
    }

    /// Override the per-reply deadline.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Send one command and collect its reply.
    pub async fn execute(&self, command: &Command) -> Result<Reply> {
        self.lock().await.execute(command).await
    }

    /// Send a command and require a complete, non-error reply.
    pub async fn query(&self, command: &Command) -> Result<String> {
        let reply = self.execute(command).await?;
        if reply.is_error() {
            return Err(LinkError::Rejected(command.mnemonic().to_string()).into());
        }
        reply.complete()
    }

    /// Snapshot of the session state.
    pub async fn session(&self) -> LinkSession {
        self.link.lock().await.session.clone()
    }

    /// Explicit reconfiguration: set the port speed and delimiter and
    /// forget anything negotiation learned.
    pub async fn reconfigure(&self, baud: u32, delimiter: Delimiter) -> Result<()> {
        let mut link = self.link.lock().await;
        link.transport.set_baud_rate(baud).await?;
        link.session.reset(baud, delimiter);
        Ok(())
    }

    /// Hold the link across several exchanges.
    pub async fn lock(&self) -> LinkGuard<'_> {
        LinkGuard {
            link: self.link.lock().await,
            deadline: self.deadline,
        }
    }

    /// Close the underlying transport.
    pub async fn close(&self) -> Result<()> {
        self.link.lock().await.transport.close().await
    }
}

/// A held lock on a [`CommandChannel`].
pub struct LinkGuard<'a> {
    link: MutexGuard<'a, Link>,
    deadline: Duration,
}

impl LinkGuard<'_> {
    pub fn session(&self) -> &LinkSession {
        &self.link.session
    }

    pub(crate) fn session_mut(&mut self) -> &mut LinkSession {
        &mut self.link.session
    }

    pub async fn set_baud_rate(&mut self, baud: u32) -> Result<()> {
        self.link.transport.set_baud_rate(baud).await
    }

    /// Write raw bytes with no framing.
    pub async fn send_raw(&mut self, data: &[u8]) -> Result<()> {
        self.link.transport.send(data).await
    }

    /// Read and throw away up to `max` bytes, waiting at most `timeout`.
    pub async fn discard(&mut self, max: usize, timeout: Duration) -> Result<usize> {
        let mut buf = vec![0u8; max.max(1)];
        match self.link.transport.receive(&mut buf, timeout).await {
            Ok(n) => {
                trace!(bytes = n, "discarded line noise");
                Ok(n)
            }
            Err(e) if e.is_timeout() => Ok(0),
            Err(e) => Err(e),
        }
    }

    /// Send one command under the session delimiter and collect its reply.
    pub async fn execute(&mut self, command: &Command) -> Result<Reply> {
        let delimiter = self.link.session.delimiter();
        let frame = command.encode(delimiter);
        debug!(command = %String::from_utf8_lossy(&frame).trim(), "PC->RADIO");
        self.link.transport.send(&frame).await?;

        let raw = self.read_reply(delimiter).await?;
        let text = protocol::decode_cp1252(&raw)?;
        let terminated = text.ends_with(delimiter.terminator);
        let payload = if terminated {
            protocol::decode_response(&text, delimiter)?
        } else {
            text.as_str()
        };
        let reply = Reply {
            text: payload.trim().to_string(),
            terminated,
        };
        if reply.terminated {
            debug!(reply = %reply.text, "RADIO->PC");
        } else {
            debug!(partial = %reply.text, "RADIO->PC reply incomplete at deadline");
        }
        Ok(reply)
    }

    async fn read_reply(&mut self, delimiter: Delimiter) -> Result<Vec<u8>> {
        let terminator = delimiter.terminator.as_bytes();
        let deadline = Instant::now() + self.deadline;
        let mut buf = [0u8; READ_CHUNK];
        let mut reply = Vec::new();

        while !reply.ends_with(terminator) || reply.is_empty() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match self.link.transport.receive(&mut buf, remaining).await {
                Ok(0) => break,
                Ok(n) => {
                    reply.extend_from_slice(&buf[..n]);
                    if reply.len() > MAX_BUF {
                        warn!(len = reply.len(), "reply buffer overflow, giving up on this reply");
                        break;
                    }
                }
                Err(Error::Link(LinkError::Timeout)) => break,
                Err(e) => return Err(e),
            }
        }
        Ok(reply)
    }
}
