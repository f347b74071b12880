//! Page constant tables
//!
//! Bidirectional page-name ↔ page-address lookup, plus the rendered constant
//! listing embedders drop next to their driver code.

use busmap_spec::Chip;
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Forward and reverse page lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageTable {
    forward: BTreeMap<String, u8>,
    reverse: BTreeMap<u8, String>,
}

impl PageTable {
    pub fn address(&self, name: &str) -> Option<u8> {
        self.forward.get(name).copied()
    }

    pub fn name(&self, address: u8) -> Option<&str> {
        self.reverse.get(&address).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Pages sorted by sanitized name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u8)> {
        self.forward.iter().map(|(name, addr)| (name.as_str(), *addr))
    }
}

/// Build the bidirectional table from a chip model.
pub fn page_table(chip: &Chip) -> PageTable {
    let mut table = PageTable::default();
    for page in &chip.pages {
        table
            .forward
            .insert(page.name.name().to_string(), page.address);
        table
            .reverse
            .insert(page.address, page.name.name().to_string());
    }
    table
}

/// Render the page-constant listing: one constant per page plus forward and
/// reverse tables.
pub fn render_page_constants(chip: &Chip) -> String {
    let table = page_table(chip);
    let mut out = String::new();

    let _ = writeln!(out, "//! Page address constants generated from chip `{}`", chip.name);
    let _ = writeln!(out, "//! {} page(s)", table.len());
    let _ = writeln!(out);
    for (name, address) in table.iter() {
        let _ = writeln!(out, "pub const {name}: u8 = {address:#04x};");
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "/// Page name -> address");
    let _ = writeln!(out, "pub const PAGE_ADDRESSES: &[(&str, u8)] = &[");
    for (name, address) in table.iter() {
        let _ = writeln!(out, "    (\"{name}\", {address:#04x}),");
    }
    let _ = writeln!(out, "];");

    let _ = writeln!(out);
    let _ = writeln!(out, "/// Address -> page name");
    let _ = writeln!(out, "pub const ADDRESS_PAGES: &[(u8, &str)] = &[");
    for (address, name) in &table.reverse {
        let _ = writeln!(out, "    ({address:#04x}, \"{name}\"),");
    }
    let _ = writeln!(out, "];");

    out
}
