//! Chip register-map model
//!
//! Immutable hierarchy built once per generation run: a [`Chip`] owns ordered
//! [`Page`]s, each page owns [`Register`]s, each register owns [`Field`]s.
//! Construction goes through [`ChipBuilder`], which enforces the structural
//! invariants (unique addresses, field containment, no unmarked overlap) so
//! downstream components can rely on a well-formed model.

use crate::bitfield;
use crate::error::{LookupError, ModelError, RangeError};
use crate::ident::Ident;
use crate::{MAX_FIELD_BITS, PAGE_SIZE};
use serde::{Deserialize, Serialize};

/// Field access qualifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Access {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl Access {
    pub fn readable(self) -> bool {
        !matches!(self, Access::WriteOnly)
    }

    pub fn writable(self) -> bool {
        !matches!(self, Access::ReadOnly)
    }

    pub fn qualifier(self) -> &'static str {
        match self {
            Access::ReadOnly => "ro",
            Access::WriteOnly => "wo",
            Access::ReadWrite => "rw",
        }
    }
}

/// Named bit range within a register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: Ident,
    /// LSB position within the register, counted from bit 0 of its first
    /// byte; values above 7 place the field in later bytes.
    pub lsb: u16,
    /// Width in bits.
    pub width: u8,
    pub access: Access,
    /// Declared default, overriding the register default bytes.
    pub default: Option<u64>,
    /// Marks a field that intentionally shares bits with another one.
    pub aliased: bool,
}

impl Field {
    pub fn msb(&self) -> u16 {
        self.lsb + self.width as u16 - 1
    }

    pub fn overlaps(&self, other: &Field) -> bool {
        self.lsb <= other.msb() && other.lsb <= self.msb()
    }
}

/// Byte-addressable storage unit within a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Register {
    pub name: Ident,
    /// Byte offset within the page (low byte of the 16-bit address).
    pub offset: u8,
    /// Width in bytes.
    pub width: u8,
    /// Declared default bytes, one per byte of width, low byte first.
    pub defaults: Vec<u8>,
    pub fields: Vec<Field>,
}

impl Register {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name.name() == name)
    }

    /// Reset image of the register: declared default bytes with every field
    /// default patched over them.
    pub fn reset_bytes(&self) -> Vec<u8> {
        let mut bytes = self.defaults.clone();
        for field in &self.fields {
            let Some(default) = field.default else {
                continue;
            };
            // Field defaults are validated against the width at build time.
            for patch in bitfield::encode(field, default).unwrap_or_default() {
                let byte = &mut bytes[patch.byte as usize];
                *byte = (*byte & !patch.mask) | ((patch.value << patch.shift) & patch.mask);
            }
        }
        bytes
    }
}

/// Addressable register group selected by one page byte.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub name: Ident,
    pub address: u8,
    pub registers: Vec<Register>,
}

impl Page {
    pub fn register(&self, name: &str) -> Option<&Register> {
        self.registers.iter().find(|r| r.name.name() == name)
    }
}

/// Complete register map of one device. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chip {
    pub name: String,
    pub pages: Vec<Page>,
}

impl Chip {
    pub fn page(&self, page: &str) -> Result<&Page, LookupError> {
        self.pages
            .iter()
            .find(|p| p.name.name() == page)
            .ok_or_else(|| LookupError::symbol(page))
    }

    pub fn register(&self, page: &str, register: &str) -> Result<(&Page, &Register), LookupError> {
        let p = self.page(page)?;
        let r = p
            .register(register)
            .ok_or_else(|| LookupError::symbol(format!("{page}.{register}")))?;
        Ok((p, r))
    }

    /// Resolve a full `page.register.field` path.
    pub fn field(&self, page: &str, register: &str, field: &str) -> Result<FieldRef<'_>, LookupError> {
        let (p, r) = self.register(page, register)?;
        let f = r
            .field(field)
            .ok_or_else(|| LookupError::symbol(format!("{page}.{register}.{field}")))?;
        Ok(FieldRef {
            page: p,
            register: r,
            field: f,
        })
    }

    pub fn page_by_address(&self, address: u8) -> Option<&Page> {
        self.pages.iter().find(|p| p.address == address)
    }
}

/// Resolved view of one field together with its addressing context.
#[derive(Debug, Clone, Copy)]
pub struct FieldRef<'a> {
    pub page: &'a Page,
    pub register: &'a Register,
    pub field: &'a Field,
}

impl FieldRef<'_> {
    /// Full sanitized `page.register.field` path.
    pub fn path(&self) -> String {
        format!("{}.{}.{}", self.page.name, self.register.name, self.field.name)
    }

    /// 16-bit address of the register's first byte.
    pub fn address(&self) -> u16 {
        (self.page.address as u16) << 8 | self.register.offset as u16
    }

    /// Encode a value for this field, reporting range errors with the full
    /// symbolic path.
    pub fn encode(&self, value: u64) -> Result<Vec<bitfield::BytePatch>, RangeError> {
        bitfield::encode(self.field, value).map_err(|err| match err {
            RangeError::ValueTooWide { value, width, .. } => RangeError::ValueTooWide {
                path: self.path(),
                value,
                width,
            },
            other => other,
        })
    }
}

/// Incremental constructor for [`Chip`].
///
/// Declaration order is preserved. A register re-declaring a name already
/// present in its page collapses into the first declaration: the later
/// register and all of its fields are dropped. Addresses are taken verbatim,
/// never auto-assigned.
#[derive(Debug)]
pub struct ChipBuilder {
    name: String,
    pages: Vec<Page>,
    /// Fields of a collapsed duplicate register are dropped too.
    skipping_register: bool,
}

impl ChipBuilder {
    pub fn new(name: &str) -> Self {
        ChipBuilder {
            name: name.to_string(),
            pages: Vec::new(),
            skipping_register: false,
        }
    }

    /// Open a new page. Fails on a duplicate page name.
    pub fn begin_page(&mut self, name: &str, address: u8) -> Result<(), ModelError> {
        self.skipping_register = false;
        let ident = Ident::new(name);
        if self.pages.iter().any(|p| p.name.name() == ident.name()) {
            return Err(ModelError::DuplicatePage {
                name: ident.name().to_string(),
            });
        }
        self.pages.push(Page {
            name: ident,
            address,
            registers: Vec::new(),
        });
        Ok(())
    }

    /// Open a new register in the current page. Returns `Ok(false)` when the
    /// name collapses into an earlier declaration.
    pub fn begin_register(
        &mut self,
        name: &str,
        offset: u8,
        width: u8,
        defaults: Vec<u8>,
    ) -> Result<bool, ModelError> {
        let ident = Ident::new(name);
        if width == 0 {
            return Err(ModelError::InvalidWidth {
                name: ident.name().to_string(),
                width: width as usize,
            });
        }
        if offset as usize + width as usize > PAGE_SIZE {
            return Err(ModelError::RegisterPastPageEnd {
                name: ident.name().to_string(),
                offset,
                width,
            });
        }
        let defaults = if defaults.is_empty() {
            vec![0u8; width as usize]
        } else if defaults.len() == width as usize {
            defaults
        } else {
            return Err(ModelError::DefaultWidthMismatch {
                name: ident.name().to_string(),
                given: defaults.len(),
                width,
            });
        };

        let page = self
            .pages
            .last_mut()
            .expect("begin_register requires an open page");

        if page.registers.iter().any(|r| r.name.name() == ident.name()) {
            // Idempotent dedup: first declaration wins.
            self.skipping_register = true;
            return Ok(false);
        }

        let page_addr = page.address;
        let page_name = page.name.name().to_string();
        for byte in 0..width {
            let address = (page_addr as u16) << 8 | (offset + byte) as u16;
            if let Some((other_page, other_reg)) = self.register_covering(address) {
                return Err(ModelError::DuplicateAddress {
                    address,
                    first: format!("{other_page}.{other_reg}"),
                    second: format!("{page_name}.{}", ident.name()),
                });
            }
        }

        self.skipping_register = false;
        self.pages.last_mut().unwrap().registers.push(Register {
            name: ident,
            offset,
            width,
            defaults,
            fields: Vec::new(),
        });
        Ok(true)
    }

    /// Whether a register is currently open to receive fields.
    pub fn has_open_register(&self) -> bool {
        self.skipping_register
            || self
                .pages
                .last()
                .is_some_and(|p| !p.registers.is_empty())
    }

    /// Whether a page is currently open to receive registers.
    pub fn has_open_page(&self) -> bool {
        !self.pages.is_empty()
    }

    /// Add a field to the current register. Returns `Ok(false)` when the
    /// field belongs to a collapsed register or collapses into an earlier
    /// field of the same name.
    pub fn add_field(
        &mut self,
        name: &str,
        lsb: u16,
        width: u8,
        access: Access,
        default: Option<u64>,
        aliased: bool,
    ) -> Result<bool, ModelError> {
        if self.skipping_register {
            return Ok(false);
        }

        let register = self
            .pages
            .last_mut()
            .and_then(|p| p.registers.last_mut())
            .expect("add_field requires an open register");

        let ident = Ident::new(name);
        let path = format!("{}.{}", register.name, ident.name());

        if width == 0 || width > MAX_FIELD_BITS {
            return Err(ModelError::InvalidWidth {
                name: path,
                width: width as usize,
            });
        }

        let field = Field {
            name: ident,
            lsb,
            width,
            access,
            default,
            aliased,
        };

        if field.msb() >= register.width as u16 * 8 {
            return Err(RangeError::FieldExceedsRegister {
                path,
                lsb,
                msb: field.msb(),
                register_bytes: register.width,
            }
            .into());
        }

        if let Some(default) = default {
            if default > bitfield::max_value(width) {
                return Err(RangeError::ValueTooWide {
                    path,
                    value: default,
                    width,
                }
                .into());
            }
        }

        if register.fields.iter().any(|f| f.name.name() == field.name.name()) {
            return Ok(false);
        }

        for existing in &register.fields {
            if existing.overlaps(&field) && !(existing.aliased && field.aliased) {
                return Err(ModelError::OverlappingFields {
                    register: register.name.name().to_string(),
                    first: existing.name.name().to_string(),
                    second: field.name.name().to_string(),
                });
            }
        }

        register.fields.push(field);
        Ok(true)
    }

    pub fn finish(self) -> Chip {
        Chip {
            name: self.name,
            pages: self.pages,
        }
    }

    fn register_covering(&self, address: u16) -> Option<(&str, &str)> {
        let page_addr = (address >> 8) as u8;
        let offset = (address & 0xFF) as u8;
        for page in &self.pages {
            if page.address != page_addr {
                continue;
            }
            for reg in &page.registers {
                if offset >= reg.offset && (offset as u16) < reg.offset as u16 + reg.width as u16 {
                    return Some((page.name.name(), reg.name.name()));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_chip() -> Chip {
        let mut b = ChipBuilder::new("demo");
        b.begin_page("AG", 0x06).unwrap();
        b.begin_register("control", 0x00, 1, vec![0x00]).unwrap();
        b.add_field("i2c_audio_format", 5, 3, Access::ReadWrite, Some(0b011), false)
            .unwrap();
        b.add_field("power_down", 0, 1, Access::ReadWrite, None, false)
            .unwrap();
        b.begin_page("PLL", 0x08).unwrap();
        b.begin_register("div", 0x10, 2, vec![0x00, 0x00]).unwrap();
        b.add_field("ratio", 4, 8, Access::ReadWrite, None, false)
            .unwrap();
        b.finish()
    }

    #[test]
    fn test_lookup_paths() {
        let chip = small_chip();
        assert_eq!(chip.page("AG").unwrap().address, 0x06);

        let fr = chip.field("AG", "control", "i2c_audio_format").unwrap();
        assert_eq!(fr.address(), 0x0600);
        assert_eq!(fr.path(), "AG.control.i2c_audio_format");

        let err = chip.field("AG", "control", "bogus").unwrap_err();
        assert_eq!(err.to_string(), "unknown symbol `AG.control.bogus`");
    }

    #[test]
    fn test_page_by_address() {
        let chip = small_chip();
        assert_eq!(chip.page_by_address(0x08).unwrap().name.name(), "PLL");
        assert!(chip.page_by_address(0x55).is_none());
    }

    #[test]
    fn test_reset_bytes_fold_field_defaults() {
        let chip = small_chip();
        let (_, reg) = chip.register("AG", "control").unwrap();
        // register default 0x00, i2c_audio_format default 0b011 at bits[5:7]
        assert_eq!(reg.reset_bytes(), vec![0x60]);
    }

    #[test]
    fn test_duplicate_register_collapses_to_first() {
        let mut b = ChipBuilder::new("demo");
        b.begin_page("AG", 0x06).unwrap();
        assert!(b.begin_register("control", 0x00, 1, vec![0x11]).unwrap());
        b.add_field("first", 0, 4, Access::ReadWrite, None, false).unwrap();
        // Same name again: dropped entirely, including its fields.
        assert!(!b.begin_register("control", 0x02, 1, vec![0x22]).unwrap());
        assert!(!b.add_field("second", 0, 4, Access::ReadWrite, None, false).unwrap());

        let chip = b.finish();
        let (_, reg) = chip.register("AG", "control").unwrap();
        assert_eq!(reg.offset, 0x00);
        assert_eq!(reg.defaults, vec![0x11]);
        assert!(reg.field("first").is_some());
        assert!(reg.field("second").is_none());
    }

    #[test]
    fn test_duplicate_address_rejected() {
        let mut b = ChipBuilder::new("demo");
        b.begin_page("AG", 0x06).unwrap();
        b.begin_register("wide", 0x00, 2, vec![]).unwrap();
        let err = b.begin_register("clash", 0x01, 1, vec![]).unwrap_err();
        assert!(matches!(err, ModelError::DuplicateAddress { address: 0x0601, .. }));
    }

    #[test]
    fn test_duplicate_page_rejected() {
        let mut b = ChipBuilder::new("demo");
        b.begin_page("AG", 0x06).unwrap();
        let err = b.begin_page("AG", 0x07).unwrap_err();
        assert!(matches!(err, ModelError::DuplicatePage { .. }));
    }

    #[test]
    fn test_field_must_fit_register() {
        let mut b = ChipBuilder::new("demo");
        b.begin_page("AG", 0x06).unwrap();
        b.begin_register("narrow", 0x00, 1, vec![]).unwrap();
        let err = b
            .add_field("wide", 4, 8, Access::ReadWrite, None, false)
            .unwrap_err();
        assert!(matches!(
            err,
            ModelError::Range(RangeError::FieldExceedsRegister { msb: 11, .. })
        ));
    }

    #[test]
    fn test_unmarked_overlap_rejected() {
        let mut b = ChipBuilder::new("demo");
        b.begin_page("AG", 0x06).unwrap();
        b.begin_register("r", 0x00, 1, vec![]).unwrap();
        b.add_field("a", 0, 4, Access::ReadWrite, None, false).unwrap();
        let err = b.add_field("b", 3, 2, Access::ReadWrite, None, false).unwrap_err();
        assert!(matches!(err, ModelError::OverlappingFields { .. }));
    }

    #[test]
    fn test_marked_alias_overlap_allowed() {
        let mut b = ChipBuilder::new("demo");
        b.begin_page("AG", 0x06).unwrap();
        b.begin_register("r", 0x00, 1, vec![]).unwrap();
        b.add_field("whole", 0, 8, Access::ReadWrite, None, true).unwrap();
        b.add_field("low_nibble", 0, 4, Access::ReadWrite, None, true).unwrap();
        let chip = b.finish();
        let (_, reg) = chip.register("AG", "r").unwrap();
        assert_eq!(reg.fields.len(), 2);
    }

    #[test]
    fn test_sanitized_names_resolve() {
        let mut b = ChipBuilder::new("demo");
        b.begin_page("Misc Inst", 0x02).unwrap();
        b.begin_register("soft-reset", 0x00, 1, vec![]).unwrap();
        b.add_field("2nd_stage", 0, 1, Access::WriteOnly, None, false).unwrap();
        let chip = b.finish();

        let fr = chip.field("Misc_Inst", "soft_reset", "reg_2nd_stage").unwrap();
        assert_eq!(fr.page.name.raw(), "Misc Inst");
        assert_eq!(fr.field.name.raw(), "2nd_stage");
    }
}
