use crate::api_client::LoanApiClient;
use crate::config::Config;
use crate::diagnostics::{self, DiagnosticsReport};
use crate::errors::AppError;
use crate::models::{LoanRecord, PortfolioView};
use crate::stats;
use axum::{extract::State, http::StatusCode, response::Html, Json};
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared application state injected into handlers.
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Client for the backend's document API.
    pub client: LoanApiClient,
    /// The displayed snapshot: record list and statistics from the same
    /// fetch, replaced wholesale and never mutated in place.
    pub portfolio: RwLock<PortfolioView>,
}

impl AppState {
    pub fn new(config: Config, client: LoanApiClient) -> Self {
        Self {
            config,
            client,
            portfolio: RwLock::new(PortfolioView::default()),
        }
    }
}

/// One fetch-and-update cycle.
///
/// On success the record list and the statistics recomputed from it replace
/// the snapshot atomically under one write lock. On failure only the error
/// message changes; the last successful records and statistics stay up.
/// Overlapping refreshes are not deduplicated; the last one to resolve
/// wins.
pub async fn refresh(state: &AppState) -> PortfolioView {
    match state.client.fetch_loan_records().await {
        Ok(fetch) => {
            let stats = stats::portfolio_statistics(&fetch.records);
            tracing::info!("Loaded {} loan records", fetch.count);

            let mut view = state.portfolio.write().await;
            view.records = fetch.records;
            view.stats = stats;
            view.meta = fetch.meta;
            view.last_error = None;
            view.last_updated = Some(Utc::now());
            view.clone()
        }
        Err(e) => {
            let message = e.to_string();
            tracing::warn!("Failed to refresh loan portfolio: {}", message);

            let mut view = state.portfolio.write().await;
            view.last_error = Some(message);
            view.clone()
        }
    }
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "loan-portfolio-api",
            "version": "0.1.0"
        })),
    )
}

/// GET /api/v1/portfolio
///
/// The current snapshot: records, statistics, and the most recent fetch
/// error if any.
pub async fn get_portfolio(State(state): State<Arc<AppState>>) -> Json<PortfolioView> {
    Json(state.portfolio.read().await.clone())
}

/// GET /api/v1/loans
pub async fn list_loans(State(state): State<Arc<AppState>>) -> Json<Vec<LoanRecord>> {
    Json(state.portfolio.read().await.records.clone())
}

/// POST /api/v1/portfolio/refresh
///
/// Re-enters the fetch cycle and returns the resulting view. Always 200:
/// a failed fetch is part of the view, not an HTTP fault of this service.
pub async fn refresh_portfolio(State(state): State<Arc<AppState>>) -> Json<PortfolioView> {
    tracing::info!("POST /api/v1/portfolio/refresh");
    Json(refresh(&state).await)
}

/// GET /api/v1/loans/raw
///
/// Upstream collection document passed through untouched. The one place an
/// upstream failure surfaces as an HTTP error (502) instead of view data.
pub async fn get_raw_records(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(state.client.fetch_raw_document().await?))
}

/// GET /api/v1/diagnostics
///
/// Explicit diagnostic entry point; never invoked by the record flow.
pub async fn run_diagnostics(State(state): State<Arc<AppState>>) -> Json<DiagnosticsReport> {
    Json(diagnostics::run_report(&state.client, &state.config).await)
}

/// GET /
///
/// Server-rendered dashboard over the current snapshot.
pub async fn dashboard(State(state): State<Arc<AppState>>) -> Html<String> {
    let view = state.portfolio.read().await;
    Html(render_dashboard(&view))
}

/// Display label for a record's risk state, derived from the free-text
/// summary and the defaulted flag.
pub fn risk_label(risk_summary: Option<&str>, defaulted: bool) -> &'static str {
    if defaulted {
        return "DEFAULTED";
    }
    match risk_summary {
        None => "Not Analyzed",
        Some(summary) => {
            let summary = summary.to_lowercase();
            if summary.contains("high risk") {
                "High Risk"
            } else if summary.contains("moderate risk") {
                "Moderate Risk"
            } else if summary.contains("low risk") {
                "Low Risk"
            } else {
                "Analyzed"
            }
        }
    }
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn format_amount(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if amount < 0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

const DASHBOARD_STYLE: &str = "
body { font-family: system-ui, sans-serif; margin: 0; background: #f5f6f8; color: #1f2937; }
main { max-width: 72rem; margin: 0 auto; padding: 1.5rem; }
h1 { margin-bottom: 0.25rem; }
.subtitle { color: #6b7280; margin-top: 0; }
.cards { display: grid; grid-template-columns: repeat(auto-fit, minmax(10rem, 1fr)); gap: 1rem; margin: 1.5rem 0; }
.card { background: #fff; border-radius: 0.5rem; box-shadow: 0 1px 3px rgba(0,0,0,0.1); padding: 1rem; }
.card .label { font-size: 0.8rem; color: #6b7280; }
.card .value { font-size: 1.6rem; font-weight: 700; }
.error { background: #fee2e2; border: 1px solid #fca5a5; color: #b91c1c; padding: 0.75rem; border-radius: 0.5rem; margin-bottom: 1rem; }
.toolbar { display: flex; justify-content: space-between; align-items: center; margin-bottom: 1rem; }
button { background: #2563eb; color: #fff; border: none; border-radius: 0.5rem; padding: 0.5rem 1rem; cursor: pointer; }
button:disabled { opacity: 0.5; }
table { width: 100%; border-collapse: collapse; background: #fff; border-radius: 0.5rem; box-shadow: 0 1px 3px rgba(0,0,0,0.1); }
th, td { text-align: left; padding: 0.6rem 0.8rem; border-bottom: 1px solid #e5e7eb; }
th { font-size: 0.8rem; color: #6b7280; text-transform: uppercase; }
.empty { text-align: center; color: #6b7280; padding: 2rem; }
.updated { color: #6b7280; font-size: 0.85rem; }
";

const REFRESH_SCRIPT: &str = "
const button = document.getElementById('refresh');
button.addEventListener('click', async () => {
  button.disabled = true;
  button.textContent = 'Loading...';
  try {
    await fetch('/api/v1/portfolio/refresh', { method: 'POST' });
  } finally {
    location.reload();
  }
});
";

fn render_dashboard(view: &PortfolioView) -> String {
    let mut rows = String::new();
    for record in &view.records {
        let fico = record
            .fico_score
            .map(|s| s.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        rows.push_str(&format!(
            "<tr><td>{loan_id}</td><td>{name}</td><td>{state}</td>\
             <td>{amount}</td><td>{fico}</td><td>{ltv:.0}%</td><td>{dti:.0}%</td>\
             <td>{risk}</td></tr>\n",
            loan_id = escape_html(&record.loan_id),
            name = escape_html(&record.borrower_name),
            state = escape_html(&record.borrower_state),
            amount = format_amount(record.loan_amount),
            fico = fico,
            ltv = record.ltv_ratio,
            dti = record.dti,
            risk = risk_label(record.risk_summary.as_deref(), record.defaulted),
        ));
    }
    if view.records.is_empty() {
        rows.push_str(
            "<tr><td colspan=\"8\" class=\"empty\">No loan records found. \
             Check your API connection.</td></tr>",
        );
    }

    let error_banner = view
        .last_error
        .as_deref()
        .map(|e| format!("<div class=\"error\"><strong>Error:</strong> {}</div>", escape_html(e)))
        .unwrap_or_default();

    let updated = view
        .last_updated
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "never".to_string());

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Loan Portfolio</title>
<style>{style}</style>
</head>
<body>
<main>
<h1>Loan Portfolio</h1>
<p class="subtitle">Loan risk reporting over the document API</p>
<div class="cards">
<div class="card"><div class="label">Total Loans</div><div class="value">{total}</div></div>
<div class="card"><div class="label">Defaulted</div><div class="value">{defaulted}</div></div>
<div class="card"><div class="label">Default Rate</div><div class="value">{rate}%</div></div>
<div class="card"><div class="label">Avg FICO</div><div class="value">{avg_fico}</div></div>
</div>
{error}
<div class="toolbar">
<span class="updated">Last updated: {updated}</span>
<button id="refresh">Refresh Data</button>
</div>
<table>
<thead><tr><th>Loan ID</th><th>Borrower</th><th>State</th><th>Amount</th><th>FICO</th><th>LTV</th><th>DTI</th><th>Risk</th></tr></thead>
<tbody>
{rows}</tbody>
</table>
</main>
<script>{script}</script>
</body>
</html>
"#,
        style = DASHBOARD_STYLE,
        total = view.stats.total,
        defaulted = view.stats.defaulted,
        rate = view.stats.default_rate_pct,
        avg_fico = view.stats.avg_fico,
        error = error_banner,
        updated = updated,
        rows = rows,
        script = REFRESH_SCRIPT,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PortfolioStatistics;

    #[test]
    fn risk_label_defaulted_wins_over_summary() {
        assert_eq!(risk_label(Some("Low risk profile"), true), "DEFAULTED");
    }

    #[test]
    fn risk_label_from_summary_text() {
        assert_eq!(risk_label(Some("HIGH RISK borrower"), false), "High Risk");
        assert_eq!(risk_label(Some("moderate risk"), false), "Moderate Risk");
        assert_eq!(risk_label(Some("low risk, stable income"), false), "Low Risk");
        assert_eq!(risk_label(Some("healthy profile"), false), "Analyzed");
        assert_eq!(risk_label(None, false), "Not Analyzed");
    }

    #[test]
    fn amounts_get_thousands_separators() {
        assert_eq!(format_amount(0), "$0");
        assert_eq!(format_amount(950), "$950");
        assert_eq!(format_amount(250_000), "$250,000");
        assert_eq!(format_amount(1_234_567), "$1,234,567");
        assert_eq!(format_amount(-42_000), "-$42,000");
    }

    #[test]
    fn html_escaping_covers_markup_characters() {
        assert_eq!(
            escape_html("<script>\"O'Brien & Sons\"</script>"),
            "&lt;script&gt;&quot;O&#39;Brien &amp; Sons&quot;&lt;/script&gt;"
        );
    }

    #[test]
    fn dashboard_renders_stats_and_error() {
        let view = PortfolioView {
            records: Vec::new(),
            stats: PortfolioStatistics {
                total: 11,
                defaulted: 2,
                default_rate_pct: 18,
                avg_fico: 712,
            },
            meta: None,
            last_error: Some("Upstream API returned 403: forbidden".to_string()),
            last_updated: None,
        };
        let html = render_dashboard(&view);
        assert!(html.contains(">11<"));
        assert!(html.contains(">18%<"));
        assert!(html.contains(">712<"));
        assert!(html.contains("Upstream API returned 403"));
        assert!(html.contains("No loan records found"));
    }
}
