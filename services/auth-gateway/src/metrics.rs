//! Prometheus metrics exposition
//!
//! - `auth_logins_total` (counter): label `outcome`
//! - `auth_login_duration_seconds` (histogram): label `outcome`
//! - `auth_token_checks_total` (counter): label `outcome`

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Bucket boundaries for login latency. A login makes two sequential Steam
/// calls, each bounded by the configured timeout (10s by default).
const LOGIN_DURATION_BUCKETS: &[f64] = &[0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 20.0];

fn builder() -> Result<PrometheusBuilder, BuildError> {
    PrometheusBuilder::new().set_buckets_for_metric(
        metrics_exporter_prometheus::Matcher::Full("auth_login_duration_seconds".to_string()),
        LOGIN_DURATION_BUCKETS,
    )
}

/// Install the global Prometheus recorder and return a handle for rendering.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    builder()?.install_recorder()
}

/// Record a finished login attempt.
///
/// `outcome` is "success" or the failure class (e.g. "verification_failed").
pub fn record_login(outcome: &'static str, duration_secs: f64) {
    metrics::counter!("auth_logins_total", "outcome" => outcome).increment(1);
    metrics::histogram!("auth_login_duration_seconds", "outcome" => outcome).record(duration_secs);
}

/// Record a bearer token check ("valid" or "invalid").
pub fn record_token_check(outcome: &'static str) {
    metrics::counter!("auth_token_checks_total", "outcome" => outcome).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_exporter_prometheus::PrometheusRecorder;

    fn isolated_recorder() -> (PrometheusRecorder, PrometheusHandle) {
        let recorder = builder()
            .expect("failed to set histogram buckets")
            .build_recorder();
        let handle = recorder.handle();
        (recorder, handle)
    }

    #[test]
    fn record_functions_do_not_panic_without_recorder() {
        record_login("success", 0.2);
        record_token_check("invalid");
    }

    #[test]
    fn login_outcomes_are_labelled() {
        let (recorder, handle) = isolated_recorder();
        let _guard = metrics::set_default_local_recorder(&recorder);

        record_login("success", 0.3);
        record_login("verification_failed", 0.1);

        let output = handle.render();
        assert!(output.contains("auth_logins_total"));
        assert!(output.contains("outcome=\"success\""));
        assert!(output.contains("outcome=\"verification_failed\""));
        assert!(
            output.contains("auth_login_duration_seconds_bucket"),
            "login duration must render as a histogram"
        );
        assert!(output.contains("le=\"20\""));
    }

    #[test]
    fn token_checks_are_labelled() {
        let (recorder, handle) = isolated_recorder();
        let _guard = metrics::set_default_local_recorder(&recorder);

        record_token_check("valid");
        record_token_check("invalid");

        let output = handle.render();
        assert!(output.contains("auth_token_checks_total"));
        assert!(output.contains("outcome=\"valid\""));
        assert!(output.contains("outcome=\"invalid\""));
    }
}
