//! Baud rate and delimiter discovery.
//!
//! [`LinkNegotiator::identify`] walks every configured delimiter convention
//! and, for each, every candidate baud rate in [`LinkSession`] order. At
//! each candidate it sets the port speed, sends a bare terminator, throws
//! away a short warm-up read, and issues the identity command. Line noise
//! at the wrong speed decodes as garbage and simply moves on to the next
//! candidate.
//!
//! Three reply shapes identify a radio:
//!
//! 1. A reply containing the model separator: the second token is the model.
//! 2. A refusal token: the radio choked on the probing noise. The identity
//!    command is reissued once at the same speed.
//! 3. A bare numeric code listed in the [`IdentityTable`]: the extended-info
//!    command is issued and its reply suffix picks the sub-model.

use std::time::Duration;

use tracing::{debug, info, warn};

use rigmem_core::error::{Error, LinkError, Result};

use crate::channel::{Command, CommandChannel, LinkGuard, Reply};
use crate::protocol::{self, Delimiter, SEMICOLON};
use crate::session::DEFAULT_BAUD_CANDIDATES;

/// How a radio family reports its identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityTable {
    /// Command that returns the identity string.
    pub identity_command: &'static str,
    /// Command issued when the identity reply is a bare numeric code.
    pub extended_command: &'static str,
    /// Splits a textual identity reply; the second token is the model.
    pub model_separator: char,
    /// Identity codes and the model each resolves to.
    pub codes: &'static [(&'static str, &'static str)],
    /// Extended-info reply suffixes, checked in order, and the identity
    /// code each one selects.
    pub suffix_rules: &'static [(&'static str, &'static str)],
}

impl IdentityTable {
    fn model_for(&self, code: &str) -> Option<&'static str> {
        self.codes
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, model)| *model)
    }

    /// Refine a base identity code using the extended-info reply.
    fn refine<'a>(&self, code: &'a str, extended: &str) -> &'a str {
        self.suffix_rules
            .iter()
            .find(|(suffix, _)| extended.ends_with(suffix))
            .map(|(_, refined)| *refined)
            .unwrap_or(code)
    }
}

/// Identity codes for the Elecraft family. Every radio before the K4
/// answers `ID017`; `OM` tells them apart.
pub const ELECRAFT_IDENTITY: IdentityTable = IdentityTable {
    identity_command: "ID",
    extended_command: "OM",
    model_separator: ' ',
    codes: &[
        ("ID017", "Elecraft"),
        ("ID017X", "K3"),
        ("ID0171", "KX2"),
        ("ID0172", "KX3"),
        ("ID0174", "K4"),
    ],
    suffix_rules: &[
        ("4---", "ID0174"),
        ("--", "ID017X"),
        ("01", "ID0171"),
        ("02", "ID0172"),
    ],
};

/// Negotiation parameters.
#[derive(Debug, Clone)]
pub struct NegotiatorConfig {
    /// Baud rates to probe. Order does not matter; the session decides it.
    pub bauds: Vec<u32>,
    /// Delimiter conventions to try, in order.
    pub delimiters: Vec<Delimiter>,
    /// Bytes discarded after the warm-up terminator.
    pub warmup_read: usize,
    /// How long to wait for the warm-up read.
    pub warmup_timeout: Duration,
    pub table: IdentityTable,
}

impl Default for NegotiatorConfig {
    fn default() -> Self {
        NegotiatorConfig {
            bauds: DEFAULT_BAUD_CANDIDATES.to_vec(),
            delimiters: vec![SEMICOLON],
            warmup_read: 25,
            warmup_timeout: Duration::from_millis(100),
            table: ELECRAFT_IDENTITY,
        }
    }
}

/// The outcome of a successful negotiation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub model: String,
    pub baud: u32,
    pub delimiter: Delimiter,
}

/// Discovers the link parameters of a connected radio.
#[derive(Debug, Clone, Default)]
pub struct LinkNegotiator {
    config: NegotiatorConfig,
}

impl LinkNegotiator {
    pub fn new(config: NegotiatorConfig) -> Self {
        LinkNegotiator { config }
    }

    pub fn config(&self) -> &NegotiatorConfig {
        &self.config
    }

    /// Probe every candidate until the radio identifies itself.
    ///
    /// The channel stays locked for the whole negotiation. On success the
    /// winning baud rate and delimiter are recorded in the channel's
    /// session. When every candidate under every delimiter fails, the
    /// session's delimiter is restored and [`LinkError::NoResponse`] is
    /// returned.
    pub async fn identify(&self, channel: &CommandChannel) -> Result<Identity> {
        let mut guard = channel.lock().await;
        let original = guard.session().delimiter();

        for &delimiter in &self.config.delimiters {
            let bauds = guard.session().candidate_bauds(&self.config.bauds);
            for baud in bauds {
                info!(
                    baud,
                    terminator = delimiter.terminator,
                    "trying identity probe"
                );
                match self.probe(&mut guard, baud, delimiter).await? {
                    Some(model) => {
                        guard.session_mut().record_success(baud, delimiter);
                        info!(%model, baud, "radio identified");
                        return Ok(Identity {
                            model,
                            baud,
                            delimiter,
                        });
                    }
                    None => continue,
                }
            }
        }

        guard.session_mut().set_delimiter(original);
        warn!("no response from radio at any baud rate");
        Err(LinkError::NoResponse.into())
    }

    /// One candidate. `Ok(None)` moves on to the next candidate; only
    /// transport failures are returned as errors.
    async fn probe(
        &self,
        guard: &mut LinkGuard<'_>,
        baud: u32,
        delimiter: Delimiter,
    ) -> Result<Option<String>> {
        guard.session_mut().set_delimiter(delimiter);
        guard.set_baud_rate(baud).await?;
        guard.send_raw(delimiter.terminator.as_bytes()).await?;
        guard
            .discard(self.config.warmup_read, self.config.warmup_timeout)
            .await?;

        let table = &self.config.table;
        let identity = Command::new(table.identity_command);

        let Some(mut reply) = Self::attempt(guard, &identity).await? else {
            return Ok(None);
        };

        if let Some(model) = self.textual_model(&reply) {
            return Ok(Some(model));
        }

        if reply.is_error() {
            debug!(baud, "identity refused, reissuing once");
            let Some(retry) = Self::attempt(guard, &identity).await? else {
                return Ok(None);
            };
            if let Some(model) = self.textual_model(&retry) {
                return Ok(Some(model));
            }
            reply = retry;
        }

        if table.model_for(&reply.text).is_some() {
            let extended = Command::new(table.extended_command);
            let extra = match Self::attempt(guard, &extended).await? {
                Some(extra) if extra.terminated => extra.text,
                _ => String::new(),
            };
            let code = table.refine(&reply.text, &extra);
            if let Some(model) = table.model_for(code) {
                debug!(code, extended = %extra, "identity code resolved");
                return Ok(Some(model.to_string()));
            }
        }

        debug!(baud, reply = %reply.text, "unrecognized identity reply");
        Ok(None)
    }

    /// Execute `command`, folding decode failures into "next candidate".
    async fn attempt(guard: &mut LinkGuard<'_>, command: &Command) -> Result<Option<Reply>> {
        match guard.execute(command).await {
            Ok(reply) if reply.terminated => Ok(Some(reply)),
            Ok(reply) => {
                debug!(partial = %reply.text, "no complete identity reply");
                Ok(None)
            }
            Err(Error::Frame(e)) => {
                debug!(error = %e, "undecodable reply, wrong speed");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn textual_model(&self, reply: &Reply) -> Option<String> {
        if protocol::is_error_reply(&reply.text) {
            return None;
        }
        let mut tokens = reply.text.split(self.config.table.model_separator);
        tokens.next()?;
        tokens
            .next()
            .filter(|model| !model.is_empty())
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::LinkSession;
    use async_trait::async_trait;
    use rigmem_core::transport::Transport;
    use rigmem_test_harness::MockDevice;
    use std::sync::{Arc, Mutex as StdMutex};

    fn channel(device: MockDevice, session: LinkSession) -> CommandChannel {
        CommandChannel::new(Box::new(device), session).with_deadline(Duration::from_millis(20))
    }

    // -----------------------------------------------------------------------
    // Candidate walk
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn last_good_rate_probed_last_and_wins() {
        let device = MockDevice::new(9_600)
            .reply("ID", "ID017;")
            .reply("OM", "OM AP----------02;");
        let channel = channel(device, LinkSession::new(9_600, SEMICOLON));

        let identity = LinkNegotiator::default().identify(&channel).await.unwrap();
        assert_eq!(identity.model, "KX3");
        assert_eq!(identity.baud, 9_600);
        assert_eq!(identity.delimiter, SEMICOLON);

        let session = channel.session().await;
        assert_eq!(session.last_baud(), 9_600);
        assert!(session.is_identified());
    }

    /// Records every baud change made through it.
    struct BaudSpy {
        inner: MockDevice,
        bauds: Arc<StdMutex<Vec<u32>>>,
    }

    #[async_trait]
    impl Transport for BaudSpy {
        async fn send(&mut self, data: &[u8]) -> Result<()> {
            self.inner.send(data).await
        }
        async fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
            self.inner.receive(buf, timeout).await
        }
        async fn set_baud_rate(&mut self, baud_rate: u32) -> Result<()> {
            self.bauds.lock().unwrap().push(baud_rate);
            self.inner.set_baud_rate(baud_rate).await
        }
        async fn close(&mut self) -> Result<()> {
            self.inner.close().await
        }
        fn is_connected(&self) -> bool {
            self.inner.is_connected()
        }
    }

    #[tokio::test]
    async fn probe_order_never_repeats_a_rate() {
        let bauds = Arc::new(StdMutex::new(Vec::new()));
        let spy = BaudSpy {
            inner: MockDevice::new(9_600).reply("ID", "ID K3;"),
            bauds: Arc::clone(&bauds),
        };
        let channel = CommandChannel::new(Box::new(spy), LinkSession::new(9_600, SEMICOLON))
            .with_deadline(Duration::from_millis(20));
        LinkNegotiator::default().identify(&channel).await.unwrap();

        assert_eq!(
            *bauds.lock().unwrap(),
            vec![115_200, 57_600, 38_400, 19_200, 4_800, 9_600]
        );
    }

    #[tokio::test]
    async fn device_at_38400_found_before_last_good() {
        let device = MockDevice::new(38_400).reply("ID", "ID K3;");
        let channel = channel(device, LinkSession::new(9_600, SEMICOLON));

        let identity = LinkNegotiator::default().identify(&channel).await.unwrap();
        assert_eq!(identity.model, "K3");
        assert_eq!(identity.baud, 38_400);
        assert_eq!(channel.session().await.last_baud(), 38_400);
    }

    #[tokio::test]
    async fn silent_wrong_rates_are_skipped() {
        let device = MockDevice::new(4_800).noise(&[]).reply("ID", "ID K3;");
        let channel = channel(device, LinkSession::default());

        let identity = LinkNegotiator::default().identify(&channel).await.unwrap();
        assert_eq!(identity.baud, 4_800);
    }

    // -----------------------------------------------------------------------
    // Reply shapes
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn textual_identity() {
        let device = MockDevice::new(38_400).reply("ID", "ID KX2;");
        let channel = channel(device, LinkSession::default());
        let identity = LinkNegotiator::default().identify(&channel).await.unwrap();
        assert_eq!(identity.model, "KX2");
    }

    #[tokio::test]
    async fn refused_identity_is_reissued_once() {
        let device = MockDevice::new(38_400)
            .reply("ID", "?;")
            .reply("ID", "ID K3;");
        let channel = channel(device, LinkSession::default());
        let identity = LinkNegotiator::default().identify(&channel).await.unwrap();
        assert_eq!(identity.model, "K3");
        assert_eq!(identity.baud, 38_400);
    }

    #[tokio::test]
    async fn refused_then_numeric_code_still_resolves() {
        let device = MockDevice::new(38_400)
            .reply("ID", "?;")
            .reply("ID", "ID017;")
            .reply("OM", "OM ----------01;");
        let channel = channel(device, LinkSession::default());
        let identity = LinkNegotiator::default().identify(&channel).await.unwrap();
        assert_eq!(identity.model, "KX2");
        assert!(channel.session().await.is_identified());
    }

    #[tokio::test]
    async fn numeric_code_suffix_rules() {
        for (om, model) in [
            ("OM --------4---;", "K4"),
            ("OM AP--------;", "K3"),
            ("OM ----------01;", "KX2"),
            ("OM ----------02;", "KX3"),
            ("OM ----------07;", "Elecraft"),
        ] {
            let device = MockDevice::new(38_400).reply("ID", "ID017;").reply("OM", om);
            let channel = channel(device, LinkSession::default());
            let identity = LinkNegotiator::default().identify(&channel).await.unwrap();
            assert_eq!(identity.model, model, "OM reply {om}");
        }
    }

    #[tokio::test]
    async fn unknown_code_is_not_an_identity() {
        let device = MockDevice::new(38_400).reply("ID", "ID999;");
        let channel = channel(device, LinkSession::default());
        let err = LinkNegotiator::default().identify(&channel).await.unwrap_err();
        assert!(matches!(err, Error::Link(LinkError::NoResponse)));
    }

    // -----------------------------------------------------------------------
    // Exhaustion
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn no_response_after_all_candidates() {
        let device = MockDevice::new(1_200);
        let channel = channel(device, LinkSession::default());

        let err = LinkNegotiator::default().identify(&channel).await.unwrap_err();
        assert!(matches!(err, Error::Link(LinkError::NoResponse)));

        let session = channel.session().await;
        assert!(!session.is_identified());
        assert_eq!(session.delimiter(), SEMICOLON);
        assert_eq!(session.last_baud(), 38_400);
    }

    #[tokio::test]
    async fn second_delimiter_convention() {
        let newline = Delimiter::new("\n", " ");
        let device = MockDevice::new(9_600).terminator(b'\n').noise(&[]).reply("ID", "ID TH-D72\n");
        let channel = channel(device, LinkSession::default());
        let negotiator = LinkNegotiator::new(NegotiatorConfig {
            delimiters: vec![SEMICOLON, newline],
            ..NegotiatorConfig::default()
        });

        let identity = negotiator.identify(&channel).await.unwrap();
        assert_eq!(identity.model, "TH-D72");
        assert_eq!(identity.delimiter, newline);
        assert_eq!(channel.session().await.delimiter(), newline);
    }

    #[test]
    fn refine_falls_back_to_base_code() {
        assert_eq!(ELECRAFT_IDENTITY.refine("ID017", "OM ----"), "ID017X");
        assert_eq!(ELECRAFT_IDENTITY.refine("ID017", "OM 99"), "ID017");
        assert_eq!(ELECRAFT_IDENTITY.model_for("ID0172"), Some("KX3"));
        assert_eq!(ELECRAFT_IDENTITY.model_for("ID0179"), None);
    }
}
