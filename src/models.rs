use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

// ============ Bureau Classification ============

/// Credit-history bureau (BKI) issuing a report.
///
/// The variant order here is incidental; the detection registry in
/// [`crate::bureau`] carries the authoritative ordering used for tie-breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BureauLabel {
    /// Национальное бюро кредитных историй.
    #[serde(rename = "НБКИ")]
    Nbki,
    /// Объединенное кредитное бюро.
    #[serde(rename = "ОКБ")]
    Okb,
    /// Скоринг Бюро.
    #[serde(rename = "Скоринг Бюро")]
    ScoringBureau,
    /// Эквифакс / Equifax.
    #[serde(rename = "Эквифакс")]
    Equifax,
    /// КБ Киви.
    #[serde(rename = "КБ Киви")]
    KbKiwi,
    /// Русский Стандарт БКИ.
    #[serde(rename = "Русский Стандарт БКИ")]
    RussianStandardBki,
    /// No bureau could be identified from the document text.
    #[serde(rename = "Неизвестно")]
    Unknown,
}

impl BureauLabel {
    /// Display label as it appears in reports and generated documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            BureauLabel::Nbki => "НБКИ",
            BureauLabel::Okb => "ОКБ",
            BureauLabel::ScoringBureau => "Скоринг Бюро",
            BureauLabel::Equifax => "Эквифакс",
            BureauLabel::KbKiwi => "КБ Киви",
            BureauLabel::RussianStandardBki => "Русский Стандарт БКИ",
            BureauLabel::Unknown => "Неизвестно",
        }
    }
}

impl fmt::Display for BureauLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of bureau detection over raw document text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BureauDetection {
    /// Detected bureau, `Unknown` when nothing matched.
    pub bureau: BureauLabel,
    /// Matched patterns / total patterns for the winning bureau, in [0, 1].
    pub confidence: f64,
    /// Per-bureau pattern match counts, in registry order.
    pub match_counts: Vec<(BureauLabel, usize)>,
}

// ============ Extracted Report Payload ============

/// One structured report produced by the extraction collaborator.
///
/// Sections are optional on purpose: the validator reports missing or
/// malformed content instead of failing deserialization. Instances are
/// never mutated after extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedReport {
    /// Processing metadata attached by the extraction pipeline.
    #[serde(default)]
    pub metadata: Option<ReportMetadata>,
    /// Subject (client) identity data.
    #[serde(default)]
    pub subject: Option<Subject>,
    /// Credit accounts in document order.
    #[serde(default)]
    pub accounts: Vec<CreditAccount>,
    /// Report-level aggregates as stated by the bureau.
    #[serde(default)]
    pub summary: Option<ReportSummary>,
}

/// Metadata attached to a report during extraction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Bureau label as recorded by the upstream detector.
    #[serde(default)]
    pub bki_type: Option<String>,
    /// Processing task id.
    #[serde(default)]
    pub processing_id: Option<Uuid>,
    /// When extraction finished.
    #[serde(default)]
    pub processed_at: Option<DateTime<Utc>>,
    /// Original upload filename.
    #[serde(default)]
    pub source_filename: Option<String>,
    /// Overall extraction confidence reported by the LLM pipeline.
    #[serde(default)]
    pub confidence_overall: Option<f64>,

    /// Raw metadata for any additional fields.
    #[serde(flatten)]
    pub raw: Value,
}

/// Subject identity section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Subject {
    #[serde(default)]
    pub full_name: Option<String>,
    /// Birth date as extracted, expected `YYYY-MM-DD`.
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub passport: Option<Passport>,
}

/// Passport identification: 4-digit series, 6-digit number.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Passport {
    #[serde(default)]
    pub series: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
}

/// One credit or loan facility recorded within a report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreditAccount {
    /// Creditor name.
    #[serde(default)]
    pub creditor: Option<String>,
    /// Product type (кредитная карта, микрозайм, ...).
    #[serde(default)]
    pub product_type: Option<String>,
    #[serde(default)]
    pub account_number: Option<String>,
    #[serde(default)]
    pub dates: AccountDates,
    #[serde(default)]
    pub amounts: AccountAmounts,
    #[serde(default)]
    pub status: AccountStatus,
}

/// Open/close dates as extracted, expected `YYYY-MM-DD`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountDates {
    #[serde(default)]
    pub open: Option<String>,
    #[serde(default)]
    pub close: Option<String>,
}

/// Monetary figures for an account.
///
/// Values stay raw JSON: the extraction pipeline occasionally emits amounts
/// as strings, and the validator must be able to flag a non-numeric amount
/// rather than lose the document at parse time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountAmounts {
    #[serde(default)]
    pub limit: Option<Value>,
    #[serde(default)]
    pub current_balance: Option<Value>,
    #[serde(default)]
    pub monthly_payment: Option<Value>,
    #[serde(default)]
    pub currency: Option<String>,
}

/// Account standing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountStatus {
    /// Free-text status from the bureau (активный, закрыт, ...).
    #[serde(default)]
    pub general: Option<String>,
    /// Days the account is currently overdue.
    #[serde(default)]
    pub delinquency_days: Option<u32>,
    /// Whether the account ever had an overdue, current or historical.
    #[serde(default)]
    pub had_overdue: bool,
}

/// Report-level aggregates stated by the bureau.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportSummary {
    #[serde(default)]
    pub credit_score: Option<f64>,
    #[serde(default)]
    pub total_debt: Option<f64>,
    #[serde(default)]
    pub active_accounts: Option<u32>,
    #[serde(default)]
    pub max_delinquency_days: Option<u32>,
}

/// Best-effort numeric reading of a raw amount value.
///
/// Accepts JSON numbers and numeric strings ("125000.50"); anything else is
/// not a number and stays `None` for the validator to flag.
pub fn amount_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

// ============ Validation ============

/// Outcome of consistency validation over one [`ExtractedReport`].
///
/// Pure derived value: the input report is never modified, and anomalies are
/// collected instead of raised so one bad document cannot abort a pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    /// True when no errors were recorded. Warnings do not affect it.
    pub is_valid: bool,
    /// Errors in the order the rules found them.
    pub errors: Vec<String>,
    /// Warnings in the order the rules found them.
    pub warnings: Vec<String>,
}

// ============ Merged Client Profile ============

/// One bureau's summary figures inside a merged profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BureauSummary {
    pub credit_score: f64,
    pub total_debt: f64,
    pub active_accounts: u32,
    pub max_delinquency_days: u32,
    /// Processing id of the report this summary came from.
    #[serde(default)]
    pub report_id: Option<Uuid>,
    #[serde(default)]
    pub processed_at: Option<DateTime<Utc>>,
}

/// An account tagged with the bureau that reported it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcedAccount {
    pub bureau: BureauLabel,
    pub account: CreditAccount,
}

/// Aggregates computed across all of a client's reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateSummary {
    pub total_reports: usize,
    /// Contributing bureaus in input order, duplicates included.
    pub bureau_labels: Vec<BureauLabel>,
    /// Mean over bureaus that reported a non-null score; 0.0 when none did.
    pub avg_credit_score: f64,
    /// Sum across bureaus. Bureaus may legitimately report independent
    /// debts, so this is intentionally not deduplicated.
    pub total_debt: f64,
    pub total_active_accounts: u32,
    /// Running maximum; never decreases as reports are folded in.
    pub max_delinquency_days: u32,
    pub has_overdue: bool,
}

/// The combined view of one client's data across bureau reports.
///
/// Always recomputed from the full ordered set of the client's reports,
/// never updated incrementally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergedClientProfile {
    pub client_id: String,
    /// First non-empty subject name across the reports, in input order.
    pub client_name: Option<String>,
    /// Per-bureau summaries in first-seen order. A label appearing twice in
    /// the input keeps its position; the later summary wins.
    pub bureau_data: Vec<(BureauLabel, BureauSummary)>,
    /// Every account from every report, tagged with its source bureau.
    pub all_accounts: Vec<SourcedAccount>,
    pub summary: AggregateSummary,
}

impl MergedClientProfile {
    /// Summary recorded for a bureau, if any of the merged reports came
    /// from it.
    pub fn bureau(&self, label: BureauLabel) -> Option<&BureauSummary> {
        self.bureau_data
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, s)| s)
    }
}

// ============ Tariff Decision ============

/// Recommended service tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tariff {
    /// Higher-touch remediation tier, not a reward tier.
    Premium,
    Optimum,
    /// Detailed client-portrait analysis; only produced for single reports.
    Analysis,
}

impl Tariff {
    /// Business name used in generated documents.
    pub fn display_name(&self) -> &'static str {
        match self {
            Tariff::Premium => "Премиум",
            Tariff::Optimum => "Оптимум",
            Tariff::Analysis => "Детальный анализ портрета клиента",
        }
    }
}

/// Severity of a recommendation item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    Info,
    Success,
}

/// One entry in the prioritized recommendation list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationItem {
    #[serde(rename = "type")]
    pub severity: Severity,
    pub message: String,
}

impl RecommendationItem {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }
}

/// Deterministic tariff recommendation for a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffDecision {
    pub tariff: Tariff,
    /// Recommendation items, primary finding first.
    pub recommendations: Vec<RecommendationItem>,
    /// Templated explanation interpolating the numbers that justified
    /// the decision.
    pub explanation: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_extraction_contract() {
        let json = r#"
        {
            "metadata": {
                "bki_type": "НБКИ",
                "processed_at": "2025-03-14T10:22:00Z",
                "source_filename": "report.pdf",
                "llm_model": "qwen2.5"
            },
            "subject": {
                "full_name": "Иванов Иван Иванович",
                "birth_date": "1985-06-12",
                "passport": {"series": "4509", "number": "123456"}
            },
            "accounts": [
                {
                    "creditor": "Сбербанк",
                    "product_type": "Кредитная карта",
                    "dates": {"open": "2020-01-15"},
                    "amounts": {"limit": 150000, "current_balance": "42500.75"},
                    "status": {"general": "активный", "delinquency_days": 0}
                }
            ],
            "summary": {"credit_score": 720, "total_debt": 42500.75, "active_accounts": 1}
        }
        "#;

        let report: ExtractedReport = serde_json::from_str(json).unwrap();
        let subject = report.subject.as_ref().unwrap();
        assert_eq!(subject.full_name.as_deref(), Some("Иванов Иван Иванович"));
        assert_eq!(report.accounts.len(), 1);

        let amounts = &report.accounts[0].amounts;
        assert_eq!(
            amount_as_f64(amounts.limit.as_ref().unwrap()),
            Some(150000.0)
        );
        // String amounts from the LLM pipeline still read as numbers
        assert_eq!(
            amount_as_f64(amounts.current_balance.as_ref().unwrap()),
            Some(42500.75)
        );

        // Unknown metadata fields survive via the raw tail
        let metadata = report.metadata.as_ref().unwrap();
        assert_eq!(
            metadata.raw.get("llm_model").and_then(|v| v.as_str()),
            Some("qwen2.5")
        );
    }

    #[test]
    fn test_parse_minimal_report() {
        // The validator flags missing sections; parsing must accept them
        let report: ExtractedReport = serde_json::from_str("{}").unwrap();
        assert!(report.metadata.is_none());
        assert!(report.subject.is_none());
        assert!(report.accounts.is_empty());
        assert!(report.summary.is_none());
    }

    #[test]
    fn test_amount_as_f64_non_numeric() {
        assert_eq!(amount_as_f64(&Value::String("н/д".to_string())), None);
        assert_eq!(amount_as_f64(&Value::Bool(true)), None);
        assert_eq!(
            amount_as_f64(&Value::String(" 100 ".to_string())),
            Some(100.0)
        );
    }

    #[test]
    fn test_severity_serializes_as_type_field() {
        let item = RecommendationItem::new(Severity::Critical, "текст");
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json.get("type").and_then(|v| v.as_str()), Some("critical"));
    }

    #[test]
    fn test_bureau_label_round_trip() {
        let json = serde_json::to_string(&BureauLabel::ScoringBureau).unwrap();
        assert_eq!(json, "\"Скоринг Бюро\"");
        let back: BureauLabel = serde_json::from_str(&json).unwrap();
        assert_eq!(back, BureauLabel::ScoringBureau);
    }
}
