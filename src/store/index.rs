//! In-memory view of one loaded record set
//!
//! Records keep file order. The key map points at the first record with a
//! given application number; a set edited outside the store may hold more
//! than one, and `remove_all` removes every one of them.

use std::collections::HashMap;

use crate::application::LoanApplication;

/// Records in file order plus a key -> first position map
#[derive(Debug, Clone, Default)]
pub struct ApplicationIndex {
    records: Vec<LoanApplication>,
    positions: HashMap<String, usize>,
}

impl ApplicationIndex {
    pub fn from_records(records: Vec<LoanApplication>) -> Self {
        let mut index = Self {
            records,
            positions: HashMap::new(),
        };
        index.rebuild_positions();
        index
    }

    fn rebuild_positions(&mut self) {
        self.positions.clear();
        for (pos, record) in self.records.iter().enumerate() {
            self.positions
                .entry(record.application_number.clone())
                .or_insert(pos);
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, application_number: &str) -> bool {
        self.positions.contains_key(application_number)
    }

    /// Position of the first record with this key
    pub fn position(&self, application_number: &str) -> Option<usize> {
        self.positions.get(application_number).copied()
    }

    pub fn get(&self, application_number: &str) -> Option<&LoanApplication> {
        self.position(application_number).map(|pos| &self.records[pos])
    }

    /// Append a record with a new key.
    ///
    /// Hands the record back if the key is already present.
    pub fn insert(&mut self, record: LoanApplication) -> Result<(), LoanApplication> {
        if self.contains(&record.application_number) {
            return Err(record);
        }
        self.positions
            .insert(record.application_number.clone(), self.records.len());
        self.records.push(record);
        Ok(())
    }

    /// Replace the first record with `record`'s key, in place.
    ///
    /// Returns the replaced record, or hands `record` back if the key is unknown.
    pub fn replace(&mut self, record: LoanApplication) -> Result<LoanApplication, LoanApplication> {
        match self.position(&record.application_number) {
            Some(pos) => Ok(std::mem::replace(&mut self.records[pos], record)),
            None => Err(record),
        }
    }

    /// Remove every record with this key. Returns how many were removed.
    pub fn remove_all(&mut self, application_number: &str) -> usize {
        if !self.contains(application_number) {
            return 0;
        }
        let before = self.records.len();
        self.records
            .retain(|r| r.application_number != application_number);
        self.rebuild_positions();
        before - self.records.len()
    }

    /// Keys that appear more than once, in order of first appearance
    pub fn duplicate_keys(&self) -> Vec<&str> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for record in &self.records {
            *counts.entry(record.application_number.as_str()).or_insert(0) += 1;
        }

        let mut seen = Vec::new();
        for record in &self.records {
            let key = record.application_number.as_str();
            if counts[key] > 1 && !seen.contains(&key) {
                seen.push(key);
            }
        }
        seen
    }

    pub fn records(&self) -> &[LoanApplication] {
        &self.records
    }

    pub fn into_records(self) -> Vec<LoanApplication> {
        self.records
    }
}
