//! Bus translator
//!
//! Converts a symbolic field read/write into the concrete byte-level bus
//! transactions that realize it. The translator only consults the immutable
//! chip model; it owns no device state, so the same translation drives the
//! virtual device and a physical bus driver alike.

use crate::error::Result;
use busmap_spec::{bitfield, BusTransaction, ByteRead, Chip, FieldRef};

pub struct BusTranslator<'a> {
    chip: &'a Chip,
}

impl<'a> BusTranslator<'a> {
    pub fn new(chip: &'a Chip) -> Self {
        BusTranslator { chip }
    }

    pub fn chip(&self) -> &'a Chip {
        self.chip
    }

    /// Resolve a symbolic path, failing with a lookup error that names the
    /// unknown segment.
    pub fn resolve(&self, page: &str, register: &str, field: &str) -> Result<FieldRef<'a>> {
        Ok(self.chip.field(page, register, field)?)
    }

    /// Transactions realizing `field = value`, ordered low byte to high byte.
    ///
    /// Multi-byte fields produce one transaction per covered byte; the group
    /// is deliberately not atomic, mirroring hardware where an observer can
    /// see the intermediate byte state.
    pub fn translate_write(
        &self,
        page: &str,
        register: &str,
        field: &str,
        value: u64,
    ) -> Result<Vec<BusTransaction>> {
        let fr = self.resolve(page, register, field)?;
        let transactions = fr
            .encode(value)?
            .into_iter()
            .map(|patch| BusTransaction {
                page: fr.page.address,
                offset: fr.register.offset + patch.byte,
                mask: patch.mask,
                shift: patch.shift,
                value: patch.value,
            })
            .collect();
        Ok(transactions)
    }

    /// Byte reads required before decoding `field`, ordered low byte to high
    /// byte.
    pub fn translate_read(&self, page: &str, register: &str, field: &str) -> Result<Vec<ByteRead>> {
        let fr = self.resolve(page, register, field)?;
        let reads = bitfield::spans(fr.field)
            .into_iter()
            .map(|span| ByteRead {
                page: fr.page.address,
                offset: fr.register.offset + span.byte,
                mask: span.mask,
                shift: span.shift,
            })
            .collect();
        Ok(reads)
    }
}
