//! The handle table (component D): an append-only arena assigning handle
//! `n` to the `n`-th registered record.
//!
//! Handle assignment is two-phase (`reserve` / `finish`) because several
//! record kinds (§4.4.1-§4.4.6) must claim their handle *before* the rest of
//! their content is decoded, so that a self-referential back-reference
//! encountered while decoding that remaining content resolves to something
//! rather than failing as a forward reference. Since this crate's output is
//! a tree of owned records rather than a graph of aliased ones (§1), such a
//! reference cannot observe the record's finished content — there is no
//! finished content yet — so it resolves to `Record::Null` as a documented,
//! best-effort placeholder (see DESIGN.md). `assign` is the common-case
//! shortcut for record kinds whose full value is known before they claim a
//! handle at all (strings, `TC_CLASS`).

use crate::constants::BASE_WIRE_HANDLE;
use crate::record::Record;
use crate::result::{Error, Result};

#[derive(Debug, Default)]
pub struct HandleTable {
    records: Vec<Record>,
}

impl HandleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the next handle, for a record whose content is not yet fully
    /// decoded. The slot holds `Record::Null` until [`HandleTable::finish`]
    /// is called.
    pub fn reserve(&mut self) -> u32 {
        let index = self.records.len();
        self.records.push(Record::Null);
        BASE_WIRE_HANDLE + index as u32
    }

    /// Fills in the content of a handle previously returned by
    /// [`HandleTable::reserve`].
    pub fn finish(&mut self, raw_handle: u32, record: Record) {
        let index = (raw_handle - BASE_WIRE_HANDLE) as usize;
        self.records[index] = record;
    }

    /// Registers a fully-formed `record` under the next handle in one step.
    pub fn assign(&mut self, record: Record) -> u32 {
        let handle = self.reserve();
        self.finish(handle, record);
        handle
    }

    /// Resolves a raw wire handle to its record. Errors only if the handle
    /// was never assigned at all; a handle that is reserved but not yet
    /// finished resolves to whatever placeholder currently occupies its
    /// slot (see module docs).
    pub fn resolve(&self, raw_handle: u32) -> Result<&Record> {
        let index = raw_handle
            .checked_sub(BASE_WIRE_HANDLE)
            .ok_or(Error::DanglingHandle(raw_handle))?;
        self.records
            .get(index as usize)
            .ok_or(Error::DanglingHandle(raw_handle))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Honors `TC_RESET`: clears every assigned handle.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assigns_dense_handles_from_base() {
        let mut table = HandleTable::new();
        let h0 = table.assign(Record::Null);
        let h1 = table.assign(Record::Null);
        assert_eq!(h0, BASE_WIRE_HANDLE);
        assert_eq!(h1, BASE_WIRE_HANDLE + 1);
    }

    #[test]
    fn dangling_handle_is_an_error() {
        let table = HandleTable::new();
        assert!(matches!(table.resolve(BASE_WIRE_HANDLE), Err(Error::DanglingHandle(_))));
    }

    #[test]
    fn reserved_but_unfinished_handle_resolves_to_null_placeholder() {
        let mut table = HandleTable::new();
        let handle = table.reserve();
        assert_eq!(table.resolve(handle).unwrap(), &Record::Null);
    }

    #[test]
    fn clear_drops_every_assignment() {
        let mut table = HandleTable::new();
        table.assign(Record::Null);
        table.clear();
        assert!(table.is_empty());
    }
}
