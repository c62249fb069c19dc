use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============ JSON:API Wire Shapes ============

/// Top-level document returned by the backend's collection and root
/// endpoints.
///
/// Every field is optional on the wire: a document missing the `data` list
/// is a shape failure and is treated as zero records, not a crash.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonApiDocument {
    /// Resource list. JSON:API nests the payload one level down.
    #[serde(default)]
    pub data: Option<Vec<LoanResource>>,
    /// Collection metadata (counts, etc.), kept opaque.
    #[serde(default)]
    pub meta: Option<Value>,
    /// Link map; only inspected by the diagnostics flow.
    #[serde(default)]
    pub links: Option<Value>,
}

/// One resource object from the collection: identifier plus a flat
/// attribute bag.
#[derive(Debug, Clone, Deserialize)]
pub struct LoanResource {
    pub id: String,
    #[serde(default)]
    pub attributes: LoanAttributes,
}

/// The attribute bag of a loan record as the backend stores it.
///
/// Deserialization is permissive: backends routinely omit fields the
/// content model marks optional, and a partially-filled record is still
/// worth displaying.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoanAttributes {
    /// Business identifier, e.g. "LOAN-001".
    #[serde(default)]
    pub loan_id: String,
    #[serde(default)]
    pub borrower_name: String,
    #[serde(default)]
    pub borrower_state: String,
    /// Whole currency units.
    #[serde(default)]
    pub loan_amount: i64,
    /// Typical range 300-850; absent when the bureau pull failed.
    #[serde(default)]
    pub fico_score: Option<u16>,
    /// Loan-to-value ratio, percent.
    #[serde(default)]
    pub ltv_ratio: f64,
    /// Debt-to-income ratio, percent.
    #[serde(default)]
    pub dti: f64,
    #[serde(default)]
    pub defaulted: bool,
    /// Free-text risk analysis, when one has been generated.
    #[serde(default)]
    pub risk_summary: Option<String>,
    /// Backend-internal numeric identifier.
    #[serde(rename = "drupal_internal__id", default)]
    pub internal_id: Option<i64>,
}

// ============ Domain Models ============

/// One borrower's loan and its risk attributes, flattened out of the
/// JSON:API nesting. Immutable once fetched; the whole list is replaced on
/// refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanRecord {
    /// Upstream resource identifier.
    pub id: String,
    pub loan_id: String,
    pub borrower_name: String,
    pub borrower_state: String,
    pub loan_amount: i64,
    pub fico_score: Option<u16>,
    pub ltv_ratio: f64,
    pub dti: f64,
    pub defaulted: bool,
    pub risk_summary: Option<String>,
    pub internal_id: Option<i64>,
}

impl From<LoanResource> for LoanRecord {
    fn from(resource: LoanResource) -> Self {
        let attrs = resource.attributes;
        Self {
            id: resource.id,
            loan_id: attrs.loan_id,
            borrower_name: attrs.borrower_name,
            borrower_state: attrs.borrower_state,
            loan_amount: attrs.loan_amount,
            fico_score: attrs.fico_score,
            ltv_ratio: attrs.ltv_ratio,
            dti: attrs.dti,
            defaulted: attrs.defaulted,
            risk_summary: attrs.risk_summary,
            internal_id: attrs.internal_id,
        }
    }
}

/// Result of one successful collection fetch.
#[derive(Debug, Clone, Serialize)]
pub struct LoanFetch {
    pub records: Vec<LoanRecord>,
    /// Collection metadata passed through untouched.
    pub meta: Option<Value>,
    pub count: usize,
}

// ============ Portfolio Statistics ============

/// Aggregate figures derived from the complete current record set.
///
/// Always recomputed wholesale on refresh; never partially updated, so the
/// displayed totals cannot drift from the underlying records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioStatistics {
    pub total: usize,
    pub defaulted: usize,
    /// defaulted / total as a rounded integer percentage; 0 when empty.
    pub default_rate_pct: u32,
    /// Rounded mean FICO; records without a score count as zero.
    pub avg_fico: u32,
}

// ============ Presentation Snapshot ============

/// The displayed state: record list and statistics from the same response,
/// plus the most recent fetch error if any.
///
/// A failed refresh sets `last_error` and leaves everything else from the
/// last successful fetch in place.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PortfolioView {
    pub records: Vec<LoanRecord>,
    pub stats: PortfolioStatistics,
    pub meta: Option<Value>,
    pub last_error: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
}

// ============ Diagnostic Probe Results ============

/// Outcome of one diagnostic request: success or failure captured as data,
/// discarded after display.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeOutcome {
    /// Human-readable probe name, e.g. "Basic Request".
    pub test: String,
    pub success: bool,
    /// HTTP status when a response arrived at all.
    pub status: Option<u16>,
    /// Number of records in the payload, for collection probes.
    pub record_count: Option<usize>,
    pub error: Option<String>,
    /// Payload excerpt or upstream error body, kept opaque.
    pub detail: Option<Value>,
}

impl ProbeOutcome {
    pub fn passed(
        test: impl Into<String>,
        status: u16,
        record_count: Option<usize>,
        detail: Option<Value>,
    ) -> Self {
        Self {
            test: test.into(),
            success: true,
            status: Some(status),
            record_count,
            error: None,
            detail,
        }
    }

    pub fn failed(
        test: impl Into<String>,
        status: Option<u16>,
        error: impl Into<String>,
        detail: Option<Value>,
    ) -> Self {
        Self {
            test: test.into(),
            success: false,
            status,
            record_count: None,
            error: Some(error.into()),
            detail,
        }
    }
}

/// Shape information about the service root document.
#[derive(Debug, Clone, Serialize)]
pub struct RootInspection {
    pub success: bool,
    pub has_data: bool,
    pub has_links: bool,
    pub has_meta: bool,
    pub links_count: usize,
    /// Link names that look loan- or record-related.
    pub record_link_names: Vec<String>,
    pub error: Option<String>,
}

/// Link names advertised by the service root.
#[derive(Debug, Clone, Serialize)]
pub struct EndpointDiscovery {
    pub success: bool,
    pub endpoints: Vec<String>,
    pub error: Option<String>,
}
