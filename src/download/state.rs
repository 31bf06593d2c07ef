//! Batch statistics tracking.

use std::collections::BTreeMap;

use crate::download::fetch::{DownloadResult, FileInfo};

/// Aggregated outcome counts for one batch run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchStats {
    pub saved_count: u64,
    pub not_parsed_count: u64,
    pub error_count: u64,
    /// Saved files per `data_type/extension`.
    pub by_type: BTreeMap<String, u64>,
}

impl BatchStats {
    /// Build statistics from a set of results.
    pub fn from_results<'a>(results: impl IntoIterator<Item = &'a DownloadResult>) -> Self {
        let mut stats = Self::default();
        for result in results {
            stats.record(result);
        }
        stats
    }

    /// Record a single result.
    pub fn record(&mut self, result: &DownloadResult) {
        match &result.file_info {
            FileInfo::Media(full_type_info) => {
                self.saved_count += 1;
                *self.by_type.entry(full_type_info.clone()).or_default() += 1;
            }
            FileInfo::NotParsed => self.not_parsed_count += 1,
            FileInfo::Error => self.error_count += 1,
        }
    }

    /// Get total processed count.
    pub fn total(&self) -> u64 {
        self.saved_count + self.not_parsed_count + self.error_count
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }
}
