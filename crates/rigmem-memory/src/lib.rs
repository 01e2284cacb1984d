//! rigmem-memory: channel addressing and bank bookkeeping.
//!
//! These pieces sit between the editing application's flat channel
//! numbering and a radio's storage:
//!
//! - [`ChannelResolver`] -- canonical numbers and special names to arrays
//! - [`BankMembershipModel`] -- bank member lists in a clone image
//! - [`reconcile_mirrors`] -- primary/backup state kept in step
//! - [`ChecksumRegion`] -- image checksums, verified on load and updated
//!   before upload

pub mod address;
pub mod bank;
pub mod checksum;
pub mod mirror;

pub use address::{ChannelResolver, SpecialGroup};
pub use bank::{BankEncoding, BankLayout, BankMembershipModel, BankPolicy, BankState};
pub use checksum::{ChecksumRegion, update_checksums, verify_checksums};
pub use mirror::{MirrorPair, divergent_mirrors, reconcile_mirrors};
