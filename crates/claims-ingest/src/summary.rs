//! Load run summary

use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};
use serde::Serialize;

use crate::reconcile::Outcome;
use crate::record::RecordKind;

/// Outcome counts for one record kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeCounts {
    pub created: u64,
    pub updated: u64,
    pub skipped: u64,
    pub errors: u64,
}

impl OutcomeCounts {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Created => self.created += 1,
            Outcome::Updated => self.updated += 1,
            Outcome::Skipped => self.skipped += 1,
            Outcome::Error => self.errors += 1,
        }
    }

    /// Records that ended in created, updated or skipped
    pub fn processed(&self) -> u64 {
        self.created + self.updated + self.skipped
    }
}

/// Aggregate result of a load run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub claims: OutcomeCounts,
    pub details: OutcomeCounts,
}

impl LoadSummary {
    pub fn record(&mut self, kind: RecordKind, outcome: Outcome) {
        match kind {
            RecordKind::Claim => self.claims.record(outcome),
            RecordKind::Detail => self.details.record(outcome),
        }
    }

    /// Grand total shown in the summary. Errors are not included.
    pub fn total_processed(&self) -> u64 {
        self.claims.processed() + self.details.processed()
    }

    pub fn total_errors(&self) -> u64 {
        self.claims.errors + self.details.errors
    }

    /// Labeled rows in display order
    pub fn rows(&self) -> Vec<(&'static str, u64)> {
        vec![
            ("Claims Created", self.claims.created),
            ("Claims Updated", self.claims.updated),
            ("Claims Skipped", self.claims.skipped),
            ("Details Created", self.details.created),
            ("Details Updated", self.details.updated),
            ("Details Skipped", self.details.skipped),
            ("Total records processed", self.total_processed()),
        ]
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec!["Data Loading Summary", "Count"]);

        for (label, count) in self.rows() {
            table.add_row(vec![label.to_string(), count.to_string()]);
        }
        table
    }
}
