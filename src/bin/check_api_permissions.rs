//! Connectivity and permission checker for the loan document API.
//!
//! Probes the JSON:API root and the loan collection anonymously and, when
//! credentials are configured, with basic auth, then reports which backend
//! grants appear to be missing. A manual testing aid, not a security
//! boundary: it checks grants, it never applies them.
//!
//! Run with: cargo run --bin check_api_permissions

use loan_portfolio_api::api_client::LoanApiClient;
use loan_portfolio_api::config::Config;
use loan_portfolio_api::models::ProbeOutcome;

/// Grants the backend's anonymous role needs for the viewer to work,
/// checked directly against observed HTTP behavior.
const REQUIRED_ANONYMOUS_GRANTS: &[(&str, &str)] = &[
    ("access content", "read access to published content"),
    ("view loan_record entities", "read access to loan records"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    // Anonymous probes must stay anonymous even when the viewer itself is
    // configured to attach credentials.
    let anon_client = LoanApiClient::new(&Config {
        with_credentials: false,
        ..config.clone()
    })
    .map_err(|e| format!("Failed to build API client: {}", e))?;

    println!("=== Loan API Permission Checker ===");
    println!("API root: {}", config.api_root());
    println!();

    println!("Service root:");
    let connection = anon_client.test_connection().await;
    print_outcome(&connection);

    let root = anon_client.inspect_root().await;
    if root.success {
        println!(
            "  ✓ root document: data={}, links={} ({}), meta={}",
            root.has_data, root.has_links, root.links_count, root.has_meta
        );
        if root.record_link_names.is_empty() {
            println!("  ✗ no loan-related links advertised; the loan_record type may not be exposed");
        } else {
            println!("  ✓ loan-related links: {}", root.record_link_names.join(", "));
        }
    }
    println!();

    println!("Loan collection (anonymous):");
    let anonymous = probe_collection(&anon_client).await;
    print_outcome(&anonymous);
    for line in interpret_collection(&anonymous, "anonymous") {
        println!("  {}", line);
    }
    println!();

    match (&config.api_username, &config.api_password) {
        (Some(user), Some(pass)) => {
            println!("Loan collection (as {}):", user);
            let credentialed = anon_client.test_auth_with_loans(user, pass).await;
            print_outcome(&credentialed);
            for line in interpret_collection(&credentialed, user) {
                println!("  {}", line);
            }
            if credentialed.success && !anonymous.success {
                println!(
                    "  note: records are visible with credentials only; grant the anonymous \
                     role access if the viewer should run unauthenticated"
                );
            }
        }
        _ => println!("No API_USERNAME/API_PASSWORD configured; skipping credentialed probe."),
    }
    println!();

    println!("Summary:");
    println!("  - The document API relies on entity-level grants, not endpoint-specific ones.");
    for (grant, purpose) in REQUIRED_ANONYMOUS_GRANTS {
        println!("  - Anonymous viewing requires '{}' ({}).", grant, purpose);
    }
    println!("  - 401/403 responses mean a grant above is missing on the backend.");
    println!("  - No response at all means the backend or base URL is wrong, not permissions.");

    Ok(())
}

fn print_outcome(outcome: &ProbeOutcome) {
    let marker = if outcome.success { "✓" } else { "✗" };
    let status = outcome
        .status
        .map(|s| s.to_string())
        .unwrap_or_else(|| "no response".to_string());
    match (&outcome.record_count, &outcome.error) {
        (Some(count), _) => println!("  {} {} [{}] {} records", marker, outcome.test, status, count),
        (None, Some(error)) => println!("  {} {} [{}] {}", marker, outcome.test, status, error),
        (None, None) => println!("  {} {} [{}]", marker, outcome.test, status),
    }
}

/// Runs the plain collection read as a probe.
async fn probe_collection(client: &LoanApiClient) -> ProbeOutcome {
    match client.fetch_loan_records().await {
        Ok(fetch) => ProbeOutcome::passed("Collection Read", 200, Some(fetch.count), None),
        Err(e) => ProbeOutcome::failed("Collection Read", e.status_code(), e.to_string(), None),
    }
}

/// Maps an observed collection outcome to operator guidance.
fn interpret_collection(outcome: &ProbeOutcome, who: &str) -> Vec<String> {
    match (outcome.status, outcome.record_count) {
        (Some(200..=299), Some(0)) => vec![format!(
            "endpoint reachable for {} but returned zero records; either none are \
             published or access filtering hides them",
            who
        )],
        (Some(200..=299), _) => vec![format!("read access confirmed for {}", who)],
        (Some(401), _) | (Some(403), _) => {
            let mut lines = vec![format!(
                "the backend denies {} read access; required grants:",
                who
            )];
            for (grant, purpose) in REQUIRED_ANONYMOUS_GRANTS {
                lines.push(format!("  '{}' ({})", grant, purpose));
            }
            lines
        }
        (Some(404), _) => vec![
            "collection not found; the loan_record type is not exposed through the \
             document API"
                .to_string(),
        ],
        (Some(status), _) => vec![format!("unexpected status {}; inspect the backend logs", status)],
        (None, _) => vec![
            "no HTTP response; check the base URL and that the backend is running".to_string(),
        ],
    }
}
