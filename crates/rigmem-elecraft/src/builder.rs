//! ElecraftBuilder -- fluent builder for connecting to an Elecraft radio.
//!
//! Separates configuration from connection so that callers can set up
//! the serial port, reply deadline and negotiation parameters before the
//! link is opened. Building performs the whole connection setup:
//!
//! 1. negotiate the baud rate and delimiter, which identifies the radio,
//! 2. check the identified model against the expected one,
//! 3. turn auto-info off (`AI0;`) so unsolicited reports cannot land in
//!    the middle of a memory read.
//!
//! # Example
//!
//! ```no_run
//! use rigmem_elecraft::builder::ElecraftBuilder;
//! use rigmem_elecraft::models::kx3;
//! use std::time::Duration;
//!
//! # async fn example() -> rigmem_core::Result<()> {
//! let radio = ElecraftBuilder::new(kx3())
//!     .serial_port("/dev/ttyUSB0")
//!     .baud_rate(38_400)
//!     .command_timeout(Duration::from_millis(300))
//!     .build()
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use tracing::info;

use rigmem_core::error::{Error, Result};
use rigmem_core::transport::Transport;
use rigmem_link::{CommandChannel, DEFAULT_DEADLINE, LinkNegotiator, LinkSession, NegotiatorConfig, SEMICOLON};

use crate::models::ElecraftModel;
use crate::radio::ElecraftRadio;
use crate::settings::ElecraftSetting;

/// Fluent builder for [`ElecraftRadio`].
///
/// All configuration has sensible defaults derived from the
/// [`ElecraftModel`], so the simplest usage is:
///
/// ```ignore
/// let radio = ElecraftBuilder::new(k3())
///     .serial_port("/dev/ttyUSB0")
///     .build()
///     .await?;
/// ```
pub struct ElecraftBuilder {
    model: ElecraftModel,
    serial_port: Option<String>,
    baud_rate: Option<u32>,
    command_timeout: Duration,
    cache: bool,
    negotiator: NegotiatorConfig,
}

impl ElecraftBuilder {
    /// Create a new builder for the given Elecraft model.
    pub fn new(model: ElecraftModel) -> Self {
        ElecraftBuilder {
            model,
            serial_port: None,
            baud_rate: None,
            command_timeout: DEFAULT_DEADLINE,
            cache: true,
            negotiator: NegotiatorConfig::default(),
        }
    }

    /// Set the serial port path (e.g. `/dev/ttyUSB0` or `COM3`).
    pub fn serial_port(mut self, port: &str) -> Self {
        self.serial_port = Some(port.to_string());
        self
    }

    /// The baud rate the radio was last seen at. The port opens at this
    /// speed and negotiation tries it last. Defaults to the model's rate.
    pub fn baud_rate(mut self, baud: u32) -> Self {
        self.baud_rate = Some(baud);
        self
    }

    /// Set how long to wait for one reply (default: 1 s).
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Enable or disable the per-session record cache (default: on).
    pub fn cache(mut self, enabled: bool) -> Self {
        self.cache = enabled;
        self
    }

    /// Replace the negotiation parameters.
    pub fn negotiator(mut self, config: NegotiatorConfig) -> Self {
        self.negotiator = config;
        self
    }

    /// Connect over a caller-provided transport.
    ///
    /// This is the primary entry point for testing (pass a `MockDevice`
    /// from `rigmem-test-harness`) and for callers who manage the
    /// transport lifecycle directly.
    pub async fn build_with_transport(self, transport: Box<dyn Transport>) -> Result<ElecraftRadio> {
        let baud = self.baud_rate.unwrap_or(self.model.default_baud_rate);
        let channel = CommandChannel::new(transport, LinkSession::new(baud, SEMICOLON))
            .with_deadline(self.command_timeout);

        let identity = LinkNegotiator::new(self.negotiator).identify(&channel).await?;
        if !self.model.accepts(&identity.model) {
            return Err(Error::Protocol(format!(
                "expected {} but radio identified as {}",
                self.model.name, identity.model
            )));
        }
        info!(model = %identity.model, baud = identity.baud, "connected");

        let radio = ElecraftRadio::new(channel, self.model, identity, self.cache);
        radio.set_setting(ElecraftSetting::AutoInfo(false)).await?;
        Ok(radio)
    }

    /// Connect over a serial port.
    ///
    /// Requires that [`serial_port()`](Self::serial_port) has been called.
    pub async fn build(self) -> Result<ElecraftRadio> {
        let port = self
            .serial_port
            .as_ref()
            .ok_or_else(|| Error::InvalidParameter("serial_port is required for build()".into()))?;
        let baud = self.baud_rate.unwrap_or(self.model.default_baud_rate);

        let transport = rigmem_transport::SerialTransport::open(port, baud).await?;
        self.build_with_transport(Box::new(transport)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{generic, k3, kx3};
    use rigmem_core::error::LinkError;
    use rigmem_test_harness::{MockDevice, MockTransport};

    fn kx3_device(baud: u32) -> MockDevice {
        MockDevice::new(baud)
            .reply("ID", "ID017;")
            .reply("OM", "OM AP----------02;")
            .reply("AI0", "")
    }

    #[tokio::test]
    async fn connects_and_identifies() {
        let radio = ElecraftBuilder::new(kx3())
            .command_timeout(Duration::from_millis(20))
            .build_with_transport(Box::new(kx3_device(38_400)))
            .await
            .unwrap();

        assert_eq!(radio.model().name, "KX3");
        assert_eq!(radio.identity().model, "KX3");
        assert_eq!(radio.identity().baud, 38_400);
        assert!(radio.channel().session().await.is_identified());
    }

    #[tokio::test]
    async fn finds_a_radio_at_another_speed() {
        let radio = ElecraftBuilder::new(kx3())
            .command_timeout(Duration::from_millis(20))
            .build_with_transport(Box::new(kx3_device(9_600)))
            .await
            .unwrap();
        assert_eq!(radio.identity().baud, 9_600);
        assert_eq!(radio.channel().session().await.last_baud(), 9_600);
    }

    #[tokio::test]
    async fn exact_exchange_sequence() {
        let mut mock = MockTransport::new();
        mock.expect_silence(b";");
        mock.expect(b"ID;", b"ID017;");
        mock.expect(b"OM;", b"OM AP----------;");
        mock.expect_silence(b"AI0;");

        let radio = ElecraftBuilder::new(k3())
            .command_timeout(Duration::from_millis(20))
            .negotiator(NegotiatorConfig {
                bauds: vec![38_400],
                ..NegotiatorConfig::default()
            })
            .build_with_transport(Box::new(mock))
            .await
            .unwrap();
        assert_eq!(radio.identity().model, "K3");
    }

    #[tokio::test]
    async fn wrong_model_is_refused() {
        let err = ElecraftBuilder::new(k3())
            .command_timeout(Duration::from_millis(20))
            .build_with_transport(Box::new(kx3_device(38_400)))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, Error::Protocol(ref m) if m.contains("KX3")));
    }

    #[tokio::test]
    async fn generic_model_accepts_any_elecraft() {
        let radio = ElecraftBuilder::new(generic())
            .command_timeout(Duration::from_millis(20))
            .build_with_transport(Box::new(kx3_device(38_400)))
            .await
            .unwrap();
        assert_eq!(radio.model().name, "Elecraft");
        assert_eq!(radio.identity().model, "KX3");
    }

    #[tokio::test]
    async fn refused_auto_info_fails_setup() {
        let device = MockDevice::new(38_400)
            .reply("ID", "ID017;")
            .reply("OM", "OM AP----------02;")
            .reply("AI0", "?;");
        let err = ElecraftBuilder::new(kx3())
            .command_timeout(Duration::from_millis(20))
            .build_with_transport(Box::new(device))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, Error::Link(LinkError::Rejected(_))));
    }

    #[tokio::test]
    async fn silent_radio() {
        let err = ElecraftBuilder::new(k3())
            .command_timeout(Duration::from_millis(20))
            .build_with_transport(Box::new(MockDevice::new(38_400).noise(&[]).reply("ID", "")))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, Error::Link(LinkError::NoResponse)));
    }

    #[tokio::test]
    async fn serial_port_required_for_build() {
        let result = ElecraftBuilder::new(k3()).build().await;
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
    }
}
