//! rigmem-link: the command link between a PC and a radio.
//!
//! - [`protocol`] -- frame encoding, checksums, hex and cp1252 helpers
//! - [`LinkSession`] -- the baud rate and delimiter a connection last used
//! - [`CommandChannel`] -- one command at a time, with a reply deadline
//! - [`LinkNegotiator`] -- finds the baud rate and delimiter, then the model
//!
//! ```no_run
//! use rigmem_link::{CommandChannel, LinkNegotiator, LinkSession};
//! # async fn demo(transport: Box<dyn rigmem_core::Transport>) -> rigmem_core::Result<()> {
//! let channel = CommandChannel::new(transport, LinkSession::default());
//! let identity = LinkNegotiator::default().identify(&channel).await?;
//! println!("{} at {} baud", identity.model, identity.baud);
//! # Ok(())
//! # }
//! ```

pub mod channel;
pub mod negotiate;
pub mod protocol;
pub mod session;

pub use channel::{Command, CommandChannel, DEFAULT_DEADLINE, LinkGuard, Reply};
pub use negotiate::{ELECRAFT_IDENTITY, Identity, IdentityTable, LinkNegotiator, NegotiatorConfig};
pub use protocol::{ChecksumScheme, Delimiter, MemoryFrame, SEMICOLON};
pub use session::{DEFAULT_BAUD, DEFAULT_BAUD_CANDIDATES, LinkSession};
