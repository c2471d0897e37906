/// Deterministic tariff recommendation over a single report or a merged
/// profile.
///
/// Identical inputs always produce an identical tariff, the same
/// recommendation list in the same order, and byte-identical explanation
/// text — decisions must be auditable from the inputs alone.
use crate::config::AnalysisConfig;
use crate::models::{
    CreditAccount, ExtractedReport, MergedClientProfile, RecommendationItem, Severity, Tariff,
    TariffDecision,
};

const TEXT_CURRENT_OVERDUE: &str = "Имеется текущая просрочка, требующая ее закрытия. Любая просроченная задолженность снижает показатель кредитного рейтинга. Для увеличения кредитного рейтинга рекомендуем воспользоваться тарифным планом из линейки «Премиум»";
const TEXT_LOW_RATING: &str = "Имеется низкий кредитный рейтинг. Для увеличения кредитного рейтинга рекомендуем воспользоваться тарифом «Оптимум»";
const TEXT_PAST_OVERDUE: &str = "Допускается возникновение просрочек, которые негативно отражаются на показателе кредитного рейтинга. Рекомендуем воспользоваться тарифом «Оптимум».";
const TEXT_NO_HISTORY: &str = "На основании предоставленных отчетов кредитная история не сформирована. Рекомендуем осуществить детальный анализ портрета клиента.";
const TEXT_NO_ISSUES: &str = "Критичные отклонения в кредитном отчете отсутствуют. Рекомендуем осуществить детальный анализ портрета клиента.";
const TEXT_MICROLOANS: &str = "Вы пользуетесь микрозаймами. Заявки на микрозайм говорят банкам о низкой финансовой грамотности заемщика, либо о финансовых трудностях, что в свою очередь ухудшает Вашу кредитную историю.";
const TEXT_MANY_ACCOUNTS: &str = "Банки негативно относятся к большому количеству активных договоров. Получение нового кредитного продукта при пяти и более активных договорах затруднено. Рекомендуем закрыть кредиты с наименьшей текущей задолженностью, либо (при наличии) кредитные карты, которыми вы не пользуетесь, чтобы количество активных договоров было не более 4. Чем меньше активных договоров, тем проще одобрить новый кредитный продукт.";
const TEXT_HIGH_DEBT: &str = "У клиента высокая кредитная нагрузка. Рекомендуем снизить нагрузку.";

pub struct TariffDecisionEngine {
    config: AnalysisConfig,
}

impl TariffDecisionEngine {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Decides a tariff for one bureau report.
    ///
    /// Primary rule cascade, first match wins:
    /// 1. a currently delinquent account → Premium (critical);
    /// 2. known credit score below the cutoff → Optimum (warning);
    /// 3. any account that ever had an overdue → Optimum (warning);
    /// 4. no accounts at all → Analysis (info);
    /// 5. otherwise → Analysis (success).
    ///
    /// Supplementary checks (microloans, account count, debt load) always
    /// run and append their own items regardless of the primary branch.
    pub fn decide_report(&self, report: &ExtractedReport) -> TariffDecision {
        let score = report.summary.as_ref().and_then(|s| s.credit_score);
        let total_debt = report
            .summary
            .as_ref()
            .and_then(|s| s.total_debt)
            .unwrap_or(0.0);

        let current_overdue_days = report
            .accounts
            .iter()
            .filter_map(|a| a.status.delinquency_days)
            .max()
            .unwrap_or(0);
        let had_overdue = report.accounts.iter().any(|a| a.status.had_overdue);

        let mut recommendations = Vec::new();

        let (tariff, explanation) = if current_overdue_days > 0 {
            recommendations.push(RecommendationItem::new(
                Severity::Critical,
                TEXT_CURRENT_OVERDUE,
            ));
            (
                Tariff::Premium,
                format!(
                    "Выявлена текущая просрочка до {} дней. Рекомендован тариф «{}».",
                    current_overdue_days,
                    Tariff::Premium.display_name()
                ),
            )
        } else if score.is_some_and(|s| s > 0.0 && s < self.config.score_cutoff) {
            recommendations.push(RecommendationItem::new(Severity::Warning, TEXT_LOW_RATING));
            (
                Tariff::Optimum,
                format!(
                    "Кредитный рейтинг {:.0} баллов ниже порога {:.0}. Рекомендован тариф «{}».",
                    score.unwrap_or(0.0),
                    self.config.score_cutoff,
                    Tariff::Optimum.display_name()
                ),
            )
        } else if had_overdue {
            recommendations.push(RecommendationItem::new(Severity::Warning, TEXT_PAST_OVERDUE));
            (
                Tariff::Optimum,
                format!(
                    "Зафиксированы исторические просрочки по кредитным договорам. Рекомендован тариф «{}».",
                    Tariff::Optimum.display_name()
                ),
            )
        } else if report.accounts.is_empty() {
            recommendations.push(RecommendationItem::new(Severity::Info, TEXT_NO_HISTORY));
            (
                Tariff::Analysis,
                "Кредитная история не сформирована. Рекомендован детальный анализ портрета клиента."
                    .to_string(),
            )
        } else {
            recommendations.push(RecommendationItem::new(Severity::Success, TEXT_NO_ISSUES));
            (
                Tariff::Analysis,
                format!(
                    "Критичные отклонения отсутствуют: рейтинг {:.0} баллов, задолженность {} руб. Рекомендован детальный анализ портрета клиента.",
                    score.unwrap_or(0.0),
                    format_rub(total_debt)
                ),
            )
        };

        let active_accounts = report.accounts.iter().filter(|a| is_active(a)).count();
        self.append_supplementary(
            &mut recommendations,
            report.accounts.iter(),
            active_accounts,
            total_debt,
        );

        tracing::debug!(
            "Single-report decision: {:?}, {} recommendation(s)",
            tariff,
            recommendations.len()
        );

        TariffDecision {
            tariff,
            recommendations,
            explanation,
        }
    }

    /// Decides a tariff for a merged multi-bureau profile.
    ///
    /// Simpler two-way rule than the single-report cascade: Premium only
    /// when the average score, the worst delinquency and the combined debt
    /// all clear their thresholds, otherwise Optimum. Analysis is not in
    /// the vocabulary at this level.
    pub fn decide_merged(&self, profile: &MergedClientProfile) -> TariffDecision {
        let summary = &profile.summary;

        let premium = summary.avg_credit_score >= self.config.score_cutoff
            && summary.max_delinquency_days <= self.config.delinquency_tolerance_days
            && summary.total_debt < self.config.merged_debt_ceiling;

        let (tariff, severity, message) = if premium {
            (
                Tariff::Premium,
                Severity::Success,
                format!(
                    "Клиент надёжный, рекомендован тариф «{}».",
                    Tariff::Premium.display_name()
                ),
            )
        } else {
            (
                Tariff::Optimum,
                Severity::Warning,
                format!(
                    "Выявлены риски, рекомендован тариф «{}» с повышенными гарантиями.",
                    Tariff::Optimum.display_name()
                ),
            )
        };

        let explanation = if premium {
            self.explain_merged_premium(profile)
        } else {
            self.explain_merged_optimum(profile)
        };

        let mut recommendations = vec![RecommendationItem::new(severity, message)];

        let active_accounts = profile
            .all_accounts
            .iter()
            .filter(|sourced| is_active(&sourced.account))
            .count();
        self.append_supplementary(
            &mut recommendations,
            profile.all_accounts.iter().map(|sourced| &sourced.account),
            active_accounts,
            summary.total_debt,
        );

        tracing::debug!(
            "Merged decision for client {}: {:?}",
            profile.client_id,
            tariff
        );

        TariffDecision {
            tariff,
            recommendations,
            explanation,
        }
    }

    /// Checks evaluated for every decision, independent of the primary
    /// branch. Each appends one item when its condition holds.
    fn append_supplementary<'a>(
        &self,
        recommendations: &mut Vec<RecommendationItem>,
        accounts: impl Iterator<Item = &'a CreditAccount>,
        active_accounts: usize,
        total_debt: f64,
    ) {
        let has_microloan = accounts
            .filter_map(|a| a.product_type.as_deref())
            .any(|t| t.to_lowercase().contains("микро"));
        if has_microloan {
            recommendations.push(RecommendationItem::new(Severity::Warning, TEXT_MICROLOANS));
        }

        if active_accounts >= self.config.account_count_cutoff {
            recommendations.push(RecommendationItem::new(
                Severity::Warning,
                TEXT_MANY_ACCOUNTS,
            ));
        }

        if total_debt > self.config.large_debt_threshold {
            recommendations.push(RecommendationItem::new(Severity::Warning, TEXT_HIGH_DEBT));
        }
    }

    fn explain_merged_premium(&self, profile: &MergedClientProfile) -> String {
        let summary = &profile.summary;
        let overdue_line = if summary.max_delinquency_days > 0 {
            format!("минимальные ({} дней)", summary.max_delinquency_days)
        } else {
            "отсутствуют".to_string()
        };

        format!(
            "Клиент демонстрирует высокую платёжную дисциплину и может претендовать на наилучшие условия.\n\
             \n\
             Обоснование:\n\
             • Высокий средний кредитный рейтинг: {:.0} баллов\n\
             • Данные подтверждены {} БКИ: {}\n\
             • Просрочки: {}\n\
             • Общая долговая нагрузка: {} руб\n\
             • Активных кредитных продуктов: {}\n\
             \n\
             Клиент надёжный и может обслуживать кредит на лучших условиях.",
            summary.avg_credit_score,
            summary.total_reports,
            bureau_list(profile),
            overdue_line,
            format_rub(summary.total_debt),
            summary.total_active_accounts
        )
    }

    fn explain_merged_optimum(&self, profile: &MergedClientProfile) -> String {
        let summary = &profile.summary;

        let mut reasons = Vec::new();
        if summary.avg_credit_score < self.config.score_cutoff {
            reasons.push(format!(
                "• Средний кредитный рейтинг ниже порога: {:.0} баллов (норма: {:.0}+)",
                summary.avg_credit_score, self.config.score_cutoff
            ));
        }
        if summary.max_delinquency_days > self.config.delinquency_tolerance_days {
            reasons.push(format!(
                "• Имеются просрочки: {} дней",
                summary.max_delinquency_days
            ));
        }
        if summary.total_debt >= self.config.merged_debt_ceiling {
            reasons.push(format!(
                "• Высокая долговая нагрузка: {} руб",
                format_rub(summary.total_debt)
            ));
        }

        let reasons_text = if reasons.is_empty() {
            "• Требуется дополнительный анализ кредитной истории".to_string()
        } else {
            reasons.join("\n")
        };

        format!(
            "Рекомендуется тариф Оптимум с повышенными гарантиями.\n\
             \n\
             Обоснование:\n\
             {}\n\
             \n\
             Данные проверены в {} БКИ: {}\n\
             Активных кредитных продуктов: {}\n\
             \n\
             Клиенту требуются условия с учётом текущей кредитной нагрузки.",
            reasons_text,
            summary.total_reports,
            bureau_list(profile),
            summary.total_active_accounts
        )
    }
}

/// An account is active while it has no close date and its status does not
/// say closed.
fn is_active(account: &CreditAccount) -> bool {
    let closed_status = account
        .status
        .general
        .as_deref()
        .is_some_and(|s| s.trim().to_lowercase() == "закрыт");
    account.dates.close.is_none() && !closed_status
}

fn bureau_list(profile: &MergedClientProfile) -> String {
    profile
        .summary
        .bureau_labels
        .iter()
        .map(|label| label.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Rounds to whole rubles and groups thousands with commas, matching the
/// formatting of the generated client documents.
fn format_rub(amount: f64) -> String {
    let whole = amount.round() as i64;
    let negative = whole < 0;
    let digits = whole.abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_rub_grouping() {
        assert_eq!(format_rub(0.0), "0");
        assert_eq!(format_rub(999.0), "999");
        assert_eq!(format_rub(1500000.0), "1,500,000");
        assert_eq!(format_rub(42500.75), "42,501");
    }
}
