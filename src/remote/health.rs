// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Advisory health probe of the tracking service.

use super::transport::{HealthStatus, TrackingTransport};
use crate::error::{Error, Result, ValidationError};

/// Query `{endpoint}/health`. An unset endpoint is rejected without a request.
pub fn probe(transport: &dyn TrackingTransport, endpoint: &str) -> Result<HealthStatus> {
    if endpoint.trim().is_empty() {
        return Err(ValidationError::MissingEndpoint.into());
    }
    log::info!("Probing {}/health", endpoint);
    match transport.get_health(endpoint) {
        Ok(status) => Ok(status),
        Err(Error::HealthCheck(msg)) => Err(Error::HealthCheck(msg)),
        Err(e) => Err(Error::HealthCheck(e.user_message())),
    }
}

/// Banner text for a successful probe.
pub fn describe(status: &HealthStatus) -> String {
    let gpu = match (&status.gpu_name, status.gpu_available) {
        (Some(name), true) => name.as_str(),
        (None, true) => "Available",
        _ => "Not available",
    };
    format!("API is working. Status: {}. GPU: {}", status.status, gpu)
}

/// Banner text for a failed probe.
pub fn describe_failure(err: &Error) -> String {
    format!(
        "Cannot connect to API. {}. Make sure your backend is running and reachable.",
        err.user_message()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::transport::{HttpReply, TrackForm};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct HealthOnly {
        calls: AtomicUsize,
        answer: Option<HealthStatus>,
    }

    impl TrackingTransport for HealthOnly {
        fn fetch_video(&self, _location: &str) -> Result<Vec<u8>> {
            unreachable!()
        }

        fn post_track(&self, _endpoint: &str, _form: &TrackForm) -> Result<HttpReply> {
            unreachable!()
        }

        fn get_health(&self, _endpoint: &str) -> Result<HealthStatus> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer
                .clone()
                .ok_or_else(|| Error::Transport("dns error".to_string()))
        }
    }

    fn healthy(gpu_name: Option<&str>) -> HealthStatus {
        HealthStatus {
            status: "healthy".to_string(),
            gpu_available: gpu_name.is_some(),
            gpu_name: gpu_name.map(str::to_string),
            model_loaded: None,
        }
    }

    #[test]
    fn test_probe_without_endpoint_makes_no_call() {
        let transport = HealthOnly {
            calls: AtomicUsize::new(0),
            answer: Some(healthy(None)),
        };
        let err = probe(&transport, "  ").unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::MissingEndpoint)));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_probe_success_message() {
        let transport = HealthOnly {
            calls: AtomicUsize::new(0),
            answer: Some(healthy(Some("Tesla T4"))),
        };
        let status = probe(&transport, "https://demo.example").unwrap();
        assert_eq!(
            describe(&status),
            "API is working. Status: healthy. GPU: Tesla T4"
        );
        assert_eq!(
            describe(&healthy(None)),
            "API is working. Status: healthy. GPU: Not available"
        );
    }

    #[test]
    fn test_probe_failure_is_health_check_error() {
        let transport = HealthOnly {
            calls: AtomicUsize::new(0),
            answer: None,
        };
        let err = probe(&transport, "https://demo.example").unwrap_err();
        assert!(matches!(err, Error::HealthCheck(_)));
        assert!(describe_failure(&err).starts_with("Cannot connect to API. dns error."));
    }
}
