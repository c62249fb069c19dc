//! Exploratory connectivity and permission checks.
//!
//! Not part of steady-state record viewing; reachable only through the
//! diagnostics route and the `check_api_permissions` binary.

use crate::api_client::LoanApiClient;
use crate::config::Config;
use crate::models::{EndpointDiscovery, ProbeOutcome, RootInspection};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// How the client is configured to authenticate, minus the secret.
#[derive(Debug, Clone, Serialize)]
pub struct AuthStatus {
    pub credentials_configured: bool,
    pub username: Option<String>,
    /// Whether steady-state requests attach those credentials.
    pub attach_credentials: bool,
}

impl AuthStatus {
    pub fn from_config(config: &Config) -> Self {
        Self {
            credentials_configured: config.api_username.is_some()
                && config.api_password.is_some(),
            username: config.api_username.clone(),
            attach_credentials: config.with_credentials,
        }
    }
}

/// One full diagnostic run, collected for display and then discarded.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticsReport {
    pub generated_at: DateTime<Utc>,
    pub connection: ProbeOutcome,
    pub root: RootInspection,
    pub endpoints: EndpointDiscovery,
    pub loan_endpoint_tests: Vec<ProbeOutcome>,
    pub auth: AuthStatus,
}

/// Runs the exploratory operations sequentially and collects every outcome
/// into a single report. Each step captures its own failure as data, so no
/// step can short-circuit the ones after it.
pub async fn run_report(client: &LoanApiClient, config: &Config) -> DiagnosticsReport {
    tracing::info!("Running API diagnostics");

    let connection = client.test_connection().await;
    let root = client.inspect_root().await;
    let endpoints = client.discover_endpoints().await;
    let loan_endpoint_tests = client.test_loan_endpoint_details().await;

    let report = DiagnosticsReport {
        generated_at: Utc::now(),
        connection,
        root,
        endpoints,
        loan_endpoint_tests,
        auth: AuthStatus::from_config(config),
    };

    let failures = report
        .loan_endpoint_tests
        .iter()
        .filter(|t| !t.success)
        .count();
    tracing::info!(
        "Diagnostics complete: connection ok={}, {} of {} endpoint variants failed",
        report.connection.success,
        failures,
        report.loan_endpoint_tests.len()
    );

    report
}
