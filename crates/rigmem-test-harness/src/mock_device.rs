//! A simulated text-protocol radio.
//!
//! [`MockDevice`] answers delimiter-terminated commands from a reply table
//! instead of a strict request queue, and only understands the link when
//! the port is set to the device's own baud rate. At any other speed it
//! answers with line noise, or with nothing at all. That makes it the
//! right double for testing baud/delimiter negotiation, where the exact
//! order of probes is the thing under test.
//!
//! ```
//! use rigmem_test_harness::MockDevice;
//!
//! let device = MockDevice::new(38_400)
//!     .reply("ID", "ID017;")
//!     .reply("OM", "OM ----------02;");
//! ```

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use rigmem_core::error::{Error, LinkError, Result};
use rigmem_core::transport::Transport;

/// Bytes a radio emits when read at the wrong speed. Includes code points
/// that are undefined in cp1252.
pub const LINE_NOISE: &[u8] = &[0xF8, 0x81, 0x00, 0x9D, 0xFE, 0x8F];

/// A simulated radio speaking a delimiter-terminated text protocol.
#[derive(Debug)]
pub struct MockDevice {
    device_baud: u32,
    current_baud: Option<u32>,
    terminator: u8,
    /// Replies per command. The front entry is used and popped while more
    /// than one remains, so the last reply is sticky.
    replies: HashMap<String, VecDeque<Vec<u8>>>,
    unknown_reply: Vec<u8>,
    noise: Vec<u8>,
    pending: VecDeque<u8>,
    chunk_size: usize,
    connected: bool,
    baud_history: Vec<u32>,
    commands: Vec<(u32, String)>,
}

impl MockDevice {
    /// A device listening at `device_baud` with `;` as its terminator.
    pub fn new(device_baud: u32) -> Self {
        MockDevice {
            device_baud,
            current_baud: None,
            terminator: b';',
            replies: HashMap::new(),
            unknown_reply: b"?;".to_vec(),
            noise: LINE_NOISE.to_vec(),
            pending: VecDeque::new(),
            chunk_size: usize::MAX,
            connected: true,
            baud_history: Vec::new(),
            commands: Vec::new(),
        }
    }

    /// Use a different command terminator.
    pub fn terminator(mut self, terminator: u8) -> Self {
        self.terminator = terminator;
        self
    }

    /// Queue `reply` for `command` (the command text without its
    /// terminator). Replies queued for the same command are returned in
    /// order and the last one repeats.
    pub fn reply(mut self, command: &str, reply: &str) -> Self {
        self.push_reply(command, reply.as_bytes());
        self
    }

    /// Like [`reply`](Self::reply) but with raw bytes.
    pub fn reply_bytes(mut self, command: &str, reply: &[u8]) -> Self {
        self.push_reply(command, reply);
        self
    }

    /// Bytes emitted when the port speed is wrong. Empty means silence.
    pub fn noise(mut self, noise: &[u8]) -> Self {
        self.noise = noise.to_vec();
        self
    }

    /// Deliver at most `size` bytes per `receive()`.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.max(1);
        self
    }

    /// Start with the port already at `baud` without recording a change.
    pub fn starting_baud(mut self, baud: u32) -> Self {
        self.current_baud = Some(baud);
        self
    }

    /// Add a reply after construction.
    pub fn push_reply(&mut self, command: &str, reply: &[u8]) {
        self.replies
            .entry(command.to_string())
            .or_default()
            .push_back(reply.to_vec());
    }

    /// Every baud rate the port was switched to, in order.
    pub fn baud_history(&self) -> &[u32] {
        &self.baud_history
    }

    /// Every command the device understood, with the baud it arrived at.
    /// Bare terminators are not recorded.
    pub fn commands(&self) -> &[(u32, String)] {
        &self.commands
    }

    /// Commands the device understood, without the baud.
    pub fn command_texts(&self) -> Vec<&str> {
        self.commands.iter().map(|(_, c)| c.as_str()).collect()
    }

    fn in_sync(&self) -> bool {
        self.current_baud.is_none_or(|b| b == self.device_baud)
    }

    fn answer(&mut self, command: &str) {
        let reply = match self.replies.get_mut(command) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or_default(),
            Some(queue) => queue.front().cloned().unwrap_or_default(),
            None => self.unknown_reply.clone(),
        };
        self.pending.extend(reply);
    }
}

#[async_trait]
impl Transport for MockDevice {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        if !self.connected {
            return Err(Error::NotConnected);
        }

        if !self.in_sync() {
            let noise = self.noise.clone();
            self.pending.extend(noise);
            return Ok(());
        }

        let baud = self.current_baud.unwrap_or(self.device_baud);
        let mut parts: Vec<&[u8]> = data.split(|&b| b == self.terminator).collect();
        // Text after the last terminator is an unterminated fragment the
        // radio is still waiting to complete.
        parts.pop();
        for part in parts {
            if part.is_empty() {
                continue;
            }
            let command = String::from_utf8_lossy(part).into_owned();
            self.commands.push((baud, command.clone()));
            self.answer(&command);
        }
        Ok(())
    }

    async fn receive(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<usize> {
        if !self.connected {
            return Err(Error::NotConnected);
        }
        if self.pending.is_empty() {
            return Err(LinkError::Timeout.into());
        }
        let n = self.pending.len().min(buf.len()).min(self.chunk_size);
        for (slot, byte) in buf.iter_mut().zip(self.pending.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    async fn set_baud_rate(&mut self, baud_rate: u32) -> Result<()> {
        if !self.connected {
            return Err(Error::NotConnected);
        }
        self.baud_history.push(baud_rate);
        self.current_baud = Some(baud_rate);
        self.pending.clear();
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.connected = false;
        self.pending.clear();
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn read_all(device: &mut MockDevice) -> Vec<u8> {
        let mut out = Vec::new();
        let mut buf = [0u8; 64];
        while let Ok(n) = device.receive(&mut buf, Duration::from_millis(10)).await {
            out.extend_from_slice(&buf[..n]);
        }
        out
    }

    #[tokio::test]
    async fn answers_at_device_baud() {
        let mut device = MockDevice::new(38_400).reply("ID", "ID017;");
        device.set_baud_rate(38_400).await.unwrap();
        device.send(b"ID;").await.unwrap();
        assert_eq!(read_all(&mut device).await, b"ID017;");
        assert_eq!(device.commands(), &[(38_400, "ID".to_string())]);
    }

    #[tokio::test]
    async fn noise_at_wrong_baud() {
        let mut device = MockDevice::new(38_400).reply("ID", "ID017;");
        device.set_baud_rate(9_600).await.unwrap();
        device.send(b"ID;").await.unwrap();
        assert_eq!(read_all(&mut device).await, LINE_NOISE);
        assert!(device.commands().is_empty());
    }

    #[tokio::test]
    async fn silence_when_noise_disabled() {
        let mut device = MockDevice::new(38_400).noise(&[]);
        device.set_baud_rate(4_800).await.unwrap();
        device.send(b"ID;").await.unwrap();
        assert!(read_all(&mut device).await.is_empty());
    }

    #[tokio::test]
    async fn unknown_command_gets_error_token() {
        let mut device = MockDevice::new(38_400);
        device.send(b"XX;").await.unwrap();
        assert_eq!(read_all(&mut device).await, b"?;");
    }

    #[tokio::test]
    async fn queued_replies_then_sticky_last() {
        let mut device = MockDevice::new(38_400)
            .reply("ID", "?;")
            .reply("ID", "ID017;");
        device.send(b"ID;").await.unwrap();
        assert_eq!(read_all(&mut device).await, b"?;");
        device.send(b"ID;").await.unwrap();
        assert_eq!(read_all(&mut device).await, b"ID017;");
        device.send(b"ID;").await.unwrap();
        assert_eq!(read_all(&mut device).await, b"ID017;");
    }

    #[tokio::test]
    async fn bare_terminator_is_ignored() {
        let mut device = MockDevice::new(38_400);
        device.send(b";").await.unwrap();
        assert!(read_all(&mut device).await.is_empty());
        assert!(device.commands().is_empty());
    }

    #[tokio::test]
    async fn baud_change_discards_pending() {
        let mut device = MockDevice::new(38_400).reply("ID", "ID017;");
        device.send(b"ID;").await.unwrap();
        device.set_baud_rate(19_200).await.unwrap();
        assert!(read_all(&mut device).await.is_empty());
        assert_eq!(device.baud_history(), &[19_200]);
    }
}
