//! Mock transport for deterministic testing of link code.
//!
//! [`MockTransport`] implements the [`Transport`] trait with pre-loaded
//! request/response pairs, so frame encoding, command sequencing, and
//! response parsing can be tested without a radio attached.
//!
//! # Example
//!
//! ```
//! use rigmem_test_harness::MockTransport;
//!
//! let mut mock = MockTransport::new();
//! // When the link sends this request, answer with this response.
//! mock.expect(b"ID;", b"ID017;");
//! // A request the radio never answers.
//! mock.expect_silence(b"AI0;");
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::time::Duration;

use rigmem_core::error::{Error, LinkError, Result};
use rigmem_core::transport::Transport;

/// A pre-loaded request/response pair.
#[derive(Debug, Clone)]
struct Expectation {
    request: Vec<u8>,
    response: Vec<u8>,
}

/// A mock [`Transport`] driven by an ordered queue of expectations.
///
/// When `send()` is called, the sent data is recorded and matched against
/// the next expectation; the paired response is then returned by the
/// following `receive()` calls. Once the response is drained, `receive()`
/// times out. A mismatched request or an exhausted queue is an error.
#[derive(Debug)]
pub struct MockTransport {
    expectations: VecDeque<Expectation>,
    pending_response: Option<Vec<u8>>,
    response_cursor: usize,
    /// Upper bound on bytes returned by one `receive()`, to exercise
    /// reassembly of responses that arrive in pieces.
    chunk_size: usize,
    connected: bool,
    sent_log: Vec<Vec<u8>>,
    baud_log: Vec<u32>,
}

impl MockTransport {
    /// Create a new mock transport in the connected state.
    pub fn new() -> Self {
        MockTransport {
            expectations: VecDeque::new(),
            pending_response: None,
            response_cursor: 0,
            chunk_size: usize::MAX,
            connected: true,
            sent_log: Vec::new(),
            baud_log: Vec::new(),
        }
    }

    /// Add an expected request/response pair.
    pub fn expect(&mut self, request: &[u8], response: &[u8]) {
        self.expectations.push_back(Expectation {
            request: request.to_vec(),
            response: response.to_vec(),
        });
    }

    /// Expect `request` and never answer it.
    pub fn expect_silence(&mut self, request: &[u8]) {
        self.expect(request, &[]);
    }

    /// Deliver responses at most `size` bytes per `receive()`.
    pub fn set_chunk_size(&mut self, size: usize) {
        self.chunk_size = size.max(1);
    }

    /// Every `send()` payload, in order.
    pub fn sent_data(&self) -> &[Vec<u8>] {
        &self.sent_log
    }

    /// Every baud rate requested through `set_baud_rate()`, in order.
    pub fn baud_changes(&self) -> &[u32] {
        &self.baud_log
    }

    /// Return the number of expectations that have not yet been consumed.
    pub fn remaining_expectations(&self) -> usize {
        self.expectations.len()
    }

    /// Set the connected state of the mock transport.
    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        if !self.connected {
            return Err(Error::NotConnected);
        }

        self.sent_log.push(data.to_vec());

        let expectation = self
            .expectations
            .pop_front()
            .ok_or_else(|| Error::Protocol("no more expectations in mock transport".into()))?;
        if data != expectation.request.as_slice() {
            return Err(Error::Protocol(format!(
                "unexpected send data: expected {:?}, got {:?}",
                String::from_utf8_lossy(&expectation.request),
                String::from_utf8_lossy(data)
            )));
        }
        self.pending_response = Some(expectation.response);
        self.response_cursor = 0;
        Ok(())
    }

    async fn receive(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<usize> {
        if !self.connected {
            return Err(Error::NotConnected);
        }

        let Some(response) = self.pending_response.as_ref() else {
            return Err(LinkError::Timeout.into());
        };
        let remaining = &response[self.response_cursor..];
        if remaining.is_empty() {
            self.pending_response = None;
            self.response_cursor = 0;
            return Err(LinkError::Timeout.into());
        }
        let n = remaining.len().min(buf.len()).min(self.chunk_size);
        buf[..n].copy_from_slice(&remaining[..n]);
        self.response_cursor += n;
        if self.response_cursor >= response.len() {
            self.pending_response = None;
            self.response_cursor = 0;
        }
        Ok(n)
    }

    async fn set_baud_rate(&mut self, baud_rate: u32) -> Result<()> {
        if !self.connected {
            return Err(Error::NotConnected);
        }
        self.baud_log.push(baud_rate);
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.connected = false;
        self.pending_response = None;
        self.response_cursor = 0;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}
