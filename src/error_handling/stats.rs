//! Processing statistics tracking.
//!
//! This module provides thread-safe statistics tracking for errors, warnings,
//! and informational metrics during an enrichment run.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::{ErrorType, InfoType, WarningType};

/// Thread-safe processing statistics tracker.
///
/// Tracks errors, warnings, and informational metrics using atomic counters.
/// All types are initialized to zero on creation, so lookups never miss.
///
/// # Categories
///
/// - **Errors**: rows whose website could not be processed
/// - **Warnings**: rows processed without finding optional data
/// - **Info**: notable events that aren't errors or warnings
pub struct ProcessingStats {
    errors: HashMap<ErrorType, AtomicUsize>,
    warnings: HashMap<WarningType, AtomicUsize>,
    info: HashMap<InfoType, AtomicUsize>,
}

impl Default for ProcessingStats {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingStats {
    pub fn new() -> Self {
        ProcessingStats {
            errors: ErrorType::iter().map(|e| (e, AtomicUsize::new(0))).collect(),
            warnings: WarningType::iter()
                .map(|w| (w, AtomicUsize::new(0)))
                .collect(),
            info: InfoType::iter().map(|i| (i, AtomicUsize::new(0))).collect(),
        }
    }

    pub fn increment_error(&self, error: ErrorType) {
        if let Some(counter) = self.errors.get(&error) {
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn increment_warning(&self, warning: WarningType) {
        if let Some(counter) = self.warnings.get(&warning) {
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn increment_info(&self, info_type: InfoType) {
        if let Some(counter) = self.info.get(&info_type) {
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn get_error_count(&self, error: ErrorType) -> usize {
        self.errors
            .get(&error)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    pub fn get_warning_count(&self, warning: WarningType) -> usize {
        self.warnings
            .get(&warning)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    pub fn get_info_count(&self, info_type: InfoType) -> usize {
        self.info
            .get(&info_type)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    pub fn total_errors(&self) -> usize {
        self.errors.values().map(|c| c.load(Ordering::SeqCst)).sum()
    }

    pub fn total_warnings(&self) -> usize {
        self.warnings.values().map(|c| c.load(Ordering::SeqCst)).sum()
    }

    pub fn total_info(&self) -> usize {
        self.info.values().map(|c| c.load(Ordering::SeqCst)).sum()
    }

    /// Logs every non-zero counter, grouped by category.
    pub fn log_summary(&self) {
        let total_errors = self.total_errors();
        if total_errors > 0 {
            log::info!("Error Counts ({} total):", total_errors);
            for error_type in ErrorType::iter() {
                let count = self.get_error_count(error_type);
                if count > 0 {
                    log::info!("   {}: {}", error_type.as_str(), count);
                }
            }
        }

        let total_warnings = self.total_warnings();
        if total_warnings > 0 {
            log::info!("Warning Counts ({} total):", total_warnings);
            for warning_type in WarningType::iter() {
                let count = self.get_warning_count(warning_type);
                if count > 0 {
                    log::info!("   {}: {}", warning_type.as_str(), count);
                }
            }
        }

        let total_info = self.total_info();
        if total_info > 0 {
            log::info!("Info Counts ({} total):", total_info);
            for info_type in InfoType::iter() {
                let count = self.get_info_count(info_type);
                if count > 0 {
                    log::info!("   {}: {}", info_type.as_str(), count);
                }
            }
        }
    }
}
