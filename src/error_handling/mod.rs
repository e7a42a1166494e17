//! Error handling and processing statistics.
//!
//! This module provides:
//! - Typed errors for initialization and the database layer
//! - Enrichment error/warning/info categories
//! - Processing statistics tracking
//! - Mapping of `reqwest` failures onto error categories
//!
//! Data-quality problems are never errors here: the extraction core reports
//! them as classification values.

mod categorization;
mod stats;
mod types;

// Re-export public API
pub use categorization::{
    categorize_reqwest_error, categorize_status, get_retry_strategy, is_retriable,
};
pub use stats::ProcessingStats;
pub use types::{DatabaseError, ErrorType, InfoType, InitializationError, WarningType};

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_processing_stats_initialization() {
        let stats = ProcessingStats::new();
        for error_type in ErrorType::iter() {
            assert_eq!(stats.get_error_count(error_type), 0);
        }
        for warning_type in WarningType::iter() {
            assert_eq!(stats.get_warning_count(warning_type), 0);
        }
        for info_type in InfoType::iter() {
            assert_eq!(stats.get_info_count(info_type), 0);
        }
    }

    #[test]
    fn test_processing_stats_increment() {
        let stats = ProcessingStats::new();
        stats.increment_error(ErrorType::RobotsDisallowed);
        assert_eq!(stats.get_error_count(ErrorType::RobotsDisallowed), 1);

        stats.increment_warning(WarningType::NoEmailFound);
        assert_eq!(stats.get_warning_count(WarningType::NoEmailFound), 1);

        stats.increment_info(InfoType::ContactPageFallback);
        assert_eq!(stats.get_info_count(InfoType::ContactPageFallback), 1);
    }

    #[test]
    fn test_processing_stats_totals() {
        let stats = ProcessingStats::new();
        stats.increment_error(ErrorType::RobotsDisallowed);
        stats.increment_error(ErrorType::HttpRequestTimeoutError);
        stats.increment_warning(WarningType::NoContactFormFound);
        stats.increment_info(InfoType::EmailFilled);

        assert_eq!(stats.total_errors(), 2);
        assert_eq!(stats.total_warnings(), 1);
        assert_eq!(stats.total_info(), 1);
    }
}
