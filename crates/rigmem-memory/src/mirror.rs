//! Primary/backup copies of mirrored state.
//!
//! Some radios keep state such as the VFO records twice, each copy ending
//! in a checksum byte. The copies are expected to agree whenever no update
//! is in flight. [`reconcile_mirrors`] pushes changes from each primary to
//! its backup, but only when the two checksums agree. A pair that
//! disagrees is reported and never written, since there is no telling
//! which copy the radio trusts.

use tracing::{debug, warn};

use rigmem_core::error::{BankError, Result};
use rigmem_core::layout::{ArrayDef, FieldViewMut, MemoryImage};

/// Two elements of one array that mirror each other.
#[derive(Debug, Clone, Copy)]
pub struct MirrorPair {
    pub name: &'static str,
    pub array: &'static ArrayDef,
    pub primary: usize,
    pub backup: usize,
    /// Numeric field holding each copy's checksum.
    pub checksum_field: &'static str,
    /// Numeric fields copied from primary to backup on reconcile.
    pub synced_fields: &'static [&'static str],
}

impl MirrorPair {
    /// True if both copies carry the same checksum.
    pub fn is_consistent(&self, image: &MemoryImage) -> Result<bool> {
        let primary = image.view(self.array, self.primary)?.get(self.checksum_field)?;
        let backup = image.view(self.array, self.backup)?.get(self.checksum_field)?;
        Ok(primary == backup)
    }

    fn sync_backup(&self, image: &mut MemoryImage) -> Result<bool> {
        let primary = image.view(self.array, self.primary)?;
        let values = self
            .synced_fields
            .iter()
            .map(|&field| primary.get(field).map(|v| (field, v)))
            .collect::<Result<Vec<_>>>()?;

        let mut backup = image.view_mut(self.array, self.backup)?;
        let mut changed = false;
        for (field, value) in values {
            if backup.get(field)? != value {
                backup.set(field, value)?;
                changed = true;
            }
        }
        Ok(changed)
    }
}

/// Names of every pair whose copies disagree.
pub fn divergent_mirrors(image: &MemoryImage, pairs: &[MirrorPair]) -> Result<Vec<&'static str>> {
    let mut divergent = Vec::new();
    for pair in pairs {
        if !pair.is_consistent(image)? {
            divergent.push(pair.name);
        }
    }
    Ok(divergent)
}

/// Apply `update` to each consistent primary and copy the synced fields
/// into its backup.
///
/// Every pair is visited. Divergent pairs are skipped untouched, and if
/// any were found the call ends with [`BankError::MirrorDivergence`] naming
/// them, after the consistent pairs have been reconciled. Returns the
/// number of backups that changed.
pub fn reconcile_mirrors<F>(image: &mut MemoryImage, pairs: &[MirrorPair], mut update: F) -> Result<usize>
where
    F: FnMut(&MirrorPair, &mut FieldViewMut<'_>) -> Result<()>,
{
    let mut divergent = Vec::new();
    let mut changed = 0;

    for pair in pairs {
        if !pair.is_consistent(image)? {
            warn!(pair = pair.name, "mirrored state is inconsistent with its backup");
            divergent.push(pair.name.to_string());
            continue;
        }
        {
            let mut primary = image.view_mut(pair.array, pair.primary)?;
            update(pair, &mut primary)?;
        }
        if pair.sync_backup(image)? {
            debug!(pair = pair.name, "backup updated from primary");
            changed += 1;
        }
    }

    if divergent.is_empty() {
        Ok(changed)
    } else {
        Err(BankError::MirrorDivergence { pairs: divergent }.into())
    }
}
