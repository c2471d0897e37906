/// Consistency validation for extracted reports.
///
/// Stateless and total: malformed input never raises, every anomaly becomes
/// a structured entry in the result. All rules run on every call — there is
/// no short-circuiting, so a report with a broken birth date still gets its
/// accounts checked.
use crate::models::{
    amount_as_f64, AccountAmounts, AccountDates, ExtractedReport, ValidationResult,
};
use chrono::NaiveDate;
use serde_json::Value;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct FieldValidator;

impl FieldValidator {
    /// Checks a date string against the `YYYY-MM-DD` calendar format.
    pub fn validate_date(date: &str) -> bool {
        NaiveDate::parse_from_str(date, DATE_FORMAT).is_ok()
    }

    /// Checks the passport format: series exactly 4 digits, number exactly
    /// 6 digits. Both parts must be present.
    pub fn validate_passport(series: Option<&str>, number: Option<&str>) -> bool {
        match (series, number) {
            (Some(series), Some(number)) => {
                is_exact_digits(series, 4) && is_exact_digits(number, 6)
            }
            _ => false,
        }
    }

    /// True when the raw amount reads as a number. Null amounts are
    /// acceptable and handled by the caller.
    pub fn amount_is_numeric(amount: &Value) -> bool {
        amount_as_f64(amount).is_some()
    }

    /// Validates one account's open/close dates, returning the errors found.
    pub fn validate_account_dates(dates: &AccountDates) -> Vec<String> {
        let mut errors = Vec::new();

        let open = dates
            .open
            .as_deref()
            .map(|s| (s, NaiveDate::parse_from_str(s, DATE_FORMAT).ok()));
        let close = dates
            .close
            .as_deref()
            .map(|s| (s, NaiveDate::parse_from_str(s, DATE_FORMAT).ok()));

        if let Some((raw, None)) = open {
            errors.push(format!("Некорректная дата открытия: {}", raw));
        }
        if let Some((raw, None)) = close {
            errors.push(format!("Некорректная дата закрытия: {}", raw));
        }

        if let (Some((open_raw, Some(open_date))), Some((close_raw, Some(close_date)))) =
            (open, close)
        {
            if close_date < open_date {
                errors.push(format!(
                    "Дата закрытия ({}) раньше даты открытия ({})",
                    close_raw, open_raw
                ));
            }
        }

        errors
    }

    /// Validates one account's monetary figures, returning the errors found.
    pub fn validate_account_amounts(amounts: &AccountAmounts) -> Vec<String> {
        let mut errors = Vec::new();

        if let Some(limit) = &amounts.limit {
            if !Self::amount_is_numeric(limit) {
                errors.push(format!("Некорректный лимит: {}", limit));
            }
        }
        if let Some(balance) = &amounts.current_balance {
            if !Self::amount_is_numeric(balance) {
                errors.push(format!("Некорректный остаток: {}", balance));
            }
        }

        if let (Some(limit), Some(balance)) = (
            amounts.limit.as_ref().and_then(amount_as_f64),
            amounts.current_balance.as_ref().and_then(amount_as_f64),
        ) {
            if limit > 0.0 && balance > limit {
                errors.push(format!("Остаток ({}) превышает лимит ({})", balance, limit));
            }
        }

        errors
    }

    /// Validates a full extracted report.
    ///
    /// `is_valid` reflects errors only; warnings accumulate separately and
    /// never flip it.
    pub fn validate(report: &ExtractedReport) -> ValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        match &report.metadata {
            None => errors.push("Отсутствует секция metadata".to_string()),
            Some(metadata) => {
                if metadata.bki_type.is_none() {
                    warnings.push("Не указан тип БКИ".to_string());
                }
            }
        }

        match &report.subject {
            None => errors.push("Отсутствует секция subject".to_string()),
            Some(subject) => {
                if subject.full_name.as_deref().unwrap_or("").is_empty() {
                    warnings.push("Не указано ФИО".to_string());
                }

                if let Some(birth_date) = subject.birth_date.as_deref() {
                    if !Self::validate_date(birth_date) {
                        errors.push(format!("Некорректная дата рождения: {}", birth_date));
                    }
                }

                if let Some(passport) = &subject.passport {
                    let series = passport.series.as_deref();
                    let number = passport.number.as_deref();
                    if (series.is_some() || number.is_some())
                        && !Self::validate_passport(series, number)
                    {
                        errors.push(format!(
                            "Некорректный формат паспорта: {} {}",
                            series.unwrap_or(""),
                            number.unwrap_or("")
                        ));
                    }
                }
            }
        }

        for (idx, account) in report.accounts.iter().enumerate() {
            for err in Self::validate_account_dates(&account.dates) {
                errors.push(format!("Счёт {}: {}", idx, err));
            }
            for err in Self::validate_account_amounts(&account.amounts) {
                errors.push(format!("Счёт {}: {}", idx, err));
            }
        }

        if !errors.is_empty() {
            tracing::debug!(
                "Report failed validation with {} error(s), {} warning(s)",
                errors.len(),
                warnings.len()
            );
        }

        ValidationResult {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

fn is_exact_digits(s: &str, len: usize) -> bool {
    s.len() == len && s.chars().all(|c| c.is_ascii_digit())
}
