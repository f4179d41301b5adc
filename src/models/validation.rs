//! Field validation errors

use serde::Serialize;
use std::collections::BTreeMap;

/// Validation failures keyed by field, each with one or more messages
#[derive(Debug, Default, Clone, Serialize, PartialEq, Eq)]
pub struct Errors {
    errors: BTreeMap<String, Vec<String>>,
}

impl Errors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn has_any(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Number of fields with at least one error
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.errors.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> &BTreeMap<String, Vec<String>> {
        &self.errors
    }

    pub fn merge(&mut self, other: Errors) {
        for (field, messages) in other.errors {
            self.errors.entry(field).or_default().extend(messages);
        }
    }

    /// Blank strings (after trimming) are an error
    pub fn require_present(&mut self, field: &str, label: &str, value: &str) {
        if value.trim().is_empty() {
            self.add(field, format!("{} can not be blank.", label));
        }
    }

    /// Zero counts as absent for integer fields
    pub fn require_int_present(&mut self, field: &str, label: &str, value: i32) {
        if value == 0 {
            self.add(field, format!("{} can not be blank.", label));
        }
    }
}
