//! Error categorization and retry strategy.
//!
//! This module provides functions to categorize HTTP failures and configure
//! the enrichment client's retry strategy.

use std::time::Duration;
use tokio_retry::strategy::ExponentialBackoff;

use super::types::ErrorType;
use crate::config::{
    HTTP_STATUS_FIRST_SERVER_ERROR, HTTP_STATUS_TOO_MANY_REQUESTS, RETRY_INITIAL_DELAY_MS,
    RETRY_MAX_DELAY_SECS,
};

/// Creates an exponential backoff retry strategy.
///
/// The delay starts at `RETRY_INITIAL_DELAY_MS`, doubles on each retry and is
/// capped at `RETRY_MAX_DELAY_SECS`. The iterator yields `max_retries`
/// delays, so the total number of attempts is `max_retries + 1`.
pub fn get_retry_strategy(max_retries: usize) -> impl Iterator<Item = Duration> {
    // ExponentialBackoff computes base^n, so start from the square root of the
    // initial delay's factor: from_millis(2).factor(250) yields 500, 1000, ...
    ExponentialBackoff::from_millis(2)
        .factor(RETRY_INITIAL_DELAY_MS / 2)
        .max_delay(Duration::from_secs(RETRY_MAX_DELAY_SECS))
        .take(max_retries)
}

/// Categorizes a final HTTP status into an `ErrorType`.
pub fn categorize_status(status: u16) -> ErrorType {
    if status == HTTP_STATUS_TOO_MANY_REQUESTS {
        ErrorType::HttpRequestTooManyRequests
    } else {
        ErrorType::HttpRequestStatusError
    }
}

/// Returns true for failures worth another attempt: rate limiting, server
/// errors and transport failures. Client errors and policy refusals are final.
pub fn is_retriable(error: ErrorType, status: Option<u16>) -> bool {
    match error {
        ErrorType::HttpRequestTooManyRequests
        | ErrorType::HttpRequestTimeoutError
        | ErrorType::HttpRequestConnectError => true,
        ErrorType::HttpRequestStatusError => {
            status.is_some_and(|s| s >= HTTP_STATUS_FIRST_SERVER_ERROR)
        }
        ErrorType::InvalidWebsiteUrl
        | ErrorType::RobotsDisallowed
        | ErrorType::HttpRequestBodyError
        | ErrorType::HttpRequestOtherError => false,
    }
}

/// Categorizes a `reqwest::Error` into an `ErrorType`.
pub fn categorize_reqwest_error(error: &reqwest::Error) -> ErrorType {
    if let Some(status) = error.status() {
        return categorize_status(status.as_u16());
    }

    if error.is_timeout() {
        ErrorType::HttpRequestTimeoutError
    } else if error.is_connect() {
        ErrorType::HttpRequestConnectError
    } else if error.is_body() || error.is_decode() {
        ErrorType::HttpRequestBodyError
    } else if error.is_builder() {
        ErrorType::InvalidWebsiteUrl
    } else {
        ErrorType::HttpRequestOtherError
    }
}
