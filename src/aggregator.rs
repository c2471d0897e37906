/// Merging of several bureaus' validated reports into one client profile.
///
/// The merge is a single linear pass over the caller-supplied order
/// (typically chronological upload order) and is always recomputed from the
/// full set of a client's reports, never updated incrementally.
///
/// Two asymmetric rules are intentional and must not be unified: a repeated
/// bureau label keeps the LAST summary written for it, while the client
/// display name keeps the FIRST non-empty subject name encountered.
use crate::errors::AppError;
use crate::models::{
    AggregateSummary, BureauLabel, BureauSummary, ExtractedReport, MergedClientProfile,
    SourcedAccount,
};

/// Minimum reports required for a meaningful merge. A business policy
/// threshold, not a technical one: a single report goes through
/// single-report analysis instead.
const MIN_REPORTS: usize = 2;

pub struct MultiSourceAggregator;

impl MultiSourceAggregator {
    /// Merges per-bureau reports for one client into a single profile.
    ///
    /// Returns [`AppError::InsufficientReports`] when fewer than two reports
    /// are supplied — proceeding would silently fabricate a merge.
    pub fn merge(
        client_id: &str,
        reports: &[(BureauLabel, ExtractedReport)],
    ) -> Result<MergedClientProfile, AppError> {
        if reports.len() < MIN_REPORTS {
            tracing::warn!(
                "Merge rejected for client {}: {} report(s) supplied",
                client_id,
                reports.len()
            );
            return Err(AppError::InsufficientReports {
                client_id: client_id.to_string(),
                found: reports.len(),
            });
        }

        let mut client_name: Option<String> = None;
        let mut bureau_data: Vec<(BureauLabel, BureauSummary)> = Vec::new();
        let mut bureau_labels = Vec::with_capacity(reports.len());
        let mut all_accounts = Vec::new();
        let mut total_debt = 0.0;
        let mut total_active_accounts = 0u32;
        let mut max_delinquency_days = 0u32;
        let mut credit_scores = Vec::new();

        for (bureau, report) in reports {
            let summary = report.summary.as_ref();
            let metadata = report.metadata.as_ref();

            // First non-empty name wins
            if client_name.is_none() {
                if let Some(name) = report
                    .subject
                    .as_ref()
                    .and_then(|s| s.full_name.as_deref())
                    .filter(|name| !name.is_empty())
                {
                    client_name = Some(name.to_string());
                }
            }

            let bureau_summary = BureauSummary {
                credit_score: summary.and_then(|s| s.credit_score).unwrap_or(0.0),
                total_debt: summary.and_then(|s| s.total_debt).unwrap_or(0.0),
                active_accounts: summary.and_then(|s| s.active_accounts).unwrap_or(0),
                max_delinquency_days: summary.and_then(|s| s.max_delinquency_days).unwrap_or(0),
                report_id: metadata.and_then(|m| m.processing_id),
                processed_at: metadata.and_then(|m| m.processed_at),
            };

            // Last write wins for a repeated label; position stays first-seen
            match bureau_data.iter_mut().find(|entry| entry.0 == *bureau) {
                Some((_, existing)) => *existing = bureau_summary,
                None => bureau_data.push((*bureau, bureau_summary)),
            }
            bureau_labels.push(*bureau);

            all_accounts.extend(report.accounts.iter().map(|account| SourcedAccount {
                bureau: *bureau,
                account: account.clone(),
            }));

            total_debt += summary.and_then(|s| s.total_debt).unwrap_or(0.0);
            total_active_accounts += summary.and_then(|s| s.active_accounts).unwrap_or(0);
            max_delinquency_days =
                max_delinquency_days.max(summary.and_then(|s| s.max_delinquency_days).unwrap_or(0));

            if let Some(score) = summary.and_then(|s| s.credit_score) {
                credit_scores.push(score);
            }
        }

        let avg_credit_score = if credit_scores.is_empty() {
            0.0
        } else {
            credit_scores.iter().sum::<f64>() / credit_scores.len() as f64
        };

        tracing::info!(
            "Merged {} report(s) for client {} across {} bureau(s)",
            reports.len(),
            client_id,
            bureau_data.len()
        );

        Ok(MergedClientProfile {
            client_id: client_id.to_string(),
            client_name,
            bureau_data,
            all_accounts,
            summary: AggregateSummary {
                total_reports: reports.len(),
                bureau_labels,
                avg_credit_score,
                total_debt,
                total_active_accounts,
                max_delinquency_days,
                has_overdue: max_delinquency_days > 0,
            },
        })
    }
}
