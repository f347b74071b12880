//! Symbolic accessor generation
//!
//! Derives the discoverability artifacts from a chip model: a string-keyed
//! map of fully-qualified paths to field descriptors, and a nested stub
//! listing whose `read()`/`write(value)` placeholders exist only so an IDE
//! can complete the spelling. Both reflect the sanitized-identifier
//! invariant; raw spellings are kept for diagnostics.

use crate::error::GenError;
use crate::{GenOptions, Result};
use busmap_spec::{bitfield, Access, ByteSpan, Chip};
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Descriptor behind one fully-qualified accessor path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessorEntry {
    /// Sanitized `page.register.field` path (the map key).
    pub path: String,
    /// Original spellings, dotted, for diagnostics.
    pub raw_path: String,
    /// 16-bit address of the register's first byte.
    pub address: u16,
    pub access: Access,
    pub lsb: u16,
    pub width: u8,
    /// Per-byte mask/shift coverage, low byte first.
    pub spans: Vec<ByteSpan>,
}

/// Build the accessor map: fully-qualified symbolic path → descriptor.
///
/// A path collision (two raw names sanitizing identically in a hand-built
/// model) keeps the first entry and warns; strict mode makes it fatal.
pub fn accessor_map(chip: &Chip, opts: &GenOptions) -> Result<BTreeMap<String, AccessorEntry>> {
    let mut map: BTreeMap<String, AccessorEntry> = BTreeMap::new();
    for page in &chip.pages {
        for register in &page.registers {
            for field in &register.fields {
                let path = format!("{}.{}.{}", page.name, register.name, field.name);
                let entry = AccessorEntry {
                    path: path.clone(),
                    raw_path: format!(
                        "{}.{}.{}",
                        page.name.raw(),
                        register.name.raw(),
                        field.name.raw()
                    ),
                    address: (page.address as u16) << 8 | register.offset as u16,
                    access: field.access,
                    lsb: field.lsb,
                    width: field.width,
                    spans: bitfield::spans(field),
                };
                if let Some(existing) = map.get(&path) {
                    if opts.strict {
                        return Err(GenError::DuplicateAccessor {
                            path,
                            first: existing.raw_path.clone(),
                            second: entry.raw_path,
                        });
                    }
                    tracing::warn!(
                        path = %path,
                        first = %existing.raw_path,
                        second = %entry.raw_path,
                        "skipping accessor with colliding sanitized path"
                    );
                    continue;
                }
                map.insert(path, entry);
            }
        }
    }
    Ok(map)
}

/// Render the nested accessor-stub listing.
///
/// The stubs stay unresolved until bound at runtime to a translator and a
/// device session; they are never executed as generated.
pub fn accessor_listing(chip: &Chip, opts: &GenOptions) -> Result<String> {
    // Validate path uniqueness with the same policy as the map.
    let _ = accessor_map(chip, opts)?;

    let mut out = String::new();
    let fields: usize = chip
        .pages
        .iter()
        .flat_map(|p| &p.registers)
        .map(|r| r.fields.len())
        .sum();

    let _ = writeln!(out, "//! Accessor stubs generated from chip `{}`", chip.name);
    let _ = writeln!(out, "//! {} page(s), {} field accessor(s)", chip.pages.len(), fields);
    let _ = writeln!(out, "//!");
    let _ = writeln!(out, "//! Placeholders for IDE discoverability only; bind a translator and");
    let _ = writeln!(out, "//! a device session to resolve them.");

    for page in &chip.pages {
        let _ = writeln!(out);
        let _ = writeln!(out, "pub mod {} {{", page.name);
        let _ = writeln!(out, "    //! Page `{}` @ {:#04x}", page.name.raw(), page.address);
        for register in &page.registers {
            let address = (page.address as u16) << 8 | register.offset as u16;
            let _ = writeln!(out);
            let _ = writeln!(out, "    pub mod {} {{", register.name);
            let _ = writeln!(
                out,
                "        //! Register `{}.{}` @ {:#06x}, {} byte(s)",
                page.name.raw(),
                register.name.raw(),
                address,
                register.width
            );
            for field in &register.fields {
                let _ = writeln!(out);
                let _ = writeln!(
                    out,
                    "        /// `{}.{}.{}` bits[{}:{}] {}",
                    page.name,
                    register.name,
                    field.name,
                    field.lsb,
                    field.msb(),
                    field.access.qualifier()
                );
                for span in bitfield::spans(field) {
                    let _ = writeln!(
                        out,
                        "        /// byte {:#06x}: mask {:#04x}, shift {}",
                        address + span.byte as u16,
                        span.mask,
                        span.shift
                    );
                }
                let _ = writeln!(out, "        pub mod {} {{", field.name);
                if field.access.readable() {
                    let _ = writeln!(out, "            pub fn read() -> u64 {{");
                    let _ = writeln!(out, "                unimplemented!(\"unresolved accessor stub\")");
                    let _ = writeln!(out, "            }}");
                }
                if field.access.writable() {
                    let _ = writeln!(out, "            pub fn write(_value: u64) {{");
                    let _ = writeln!(out, "                unimplemented!(\"unresolved accessor stub\")");
                    let _ = writeln!(out, "            }}");
                }
                let _ = writeln!(out, "        }}");
            }
            let _ = writeln!(out, "    }}");
        }
        let _ = writeln!(out, "}}");
    }
    Ok(out)
}
