// Tue Jan 17 2026 - Alex

pub mod json;
pub mod report;
pub mod usage;

pub use json::{JsonError, JsonSerializer};
pub use report::{ReportFormat, ReportGenerator};
pub use usage::{link_usages, scan_usages, BufferUsage, UsageLink};

use crate::config::StatusConfig;
use crate::matching::{MatchStatus, StructMatch};
use serde::{Deserialize, Serialize};

/// Status tally over one matching pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSummary {
    pub matched: usize,
    pub mismatched: usize,
    pub unmatched: usize,
}

impl StatusSummary {
    pub fn from_matches(matches: &[StructMatch], config: &StatusConfig) -> Self {
        let mut summary = Self::default();
        for result in matches {
            summary.record(&result.status(config));
        }
        summary
    }

    pub fn record(&mut self, status: &MatchStatus) {
        match status {
            MatchStatus::Matched => self.matched += 1,
            MatchStatus::Mismatched(_) => self.mismatched += 1,
            MatchStatus::Unmatched => self.unmatched += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.matched + self.mismatched + self.unmatched
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_record() {
        let mut summary = StatusSummary::default();
        summary.record(&MatchStatus::Matched);
        summary.record(&MatchStatus::Mismatched("Host".to_string()));
        summary.record(&MatchStatus::Unmatched);
        summary.record(&MatchStatus::Unmatched);
        assert_eq!(summary.matched, 1);
        assert_eq!(summary.mismatched, 1);
        assert_eq!(summary.unmatched, 2);
        assert_eq!(summary.total(), 4);
    }
}
