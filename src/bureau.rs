/// Bureau detection over raw document text.
///
/// Classifies which BKI issued a report by counting pattern hits
/// (institution names, URL fragments, abbreviations) against a fixed
/// registry. The registry is an ordered list, not a map: when two bureaus
/// tie on match count, the one registered first wins, and that order has to
/// stay reproducible across runs.
use crate::models::{BureauDetection, BureauLabel};
use regex::Regex;

pub struct BureauIdentifier {
    registry: Vec<(BureauLabel, Vec<Regex>)>,
}

impl BureauIdentifier {
    /// Builds the detector with the fixed pattern registry.
    ///
    /// Patterns are matched case-insensitively. Registry order is the
    /// tie-break order.
    pub fn new() -> Self {
        let registry = vec![
            (
                BureauLabel::Nbki,
                compile(&[
                    r"Национальное бюро кредитных историй",
                    r#"ООО\s*["']?НБКИ["']?"#,
                    r"www\.nbki\.ru",
                    r"НБКИ",
                    r"Национальное\s+бюро",
                ]),
            ),
            (
                BureauLabel::Okb,
                compile(&[
                    r"Объединенное кредитное бюро",
                    r#"ООО\s*["']?ОКБ["']?"#,
                    r"www\.bki-okb\.ru",
                    r"ОКБ",
                    r"Объединенное\s+кредитное",
                ]),
            ),
            (
                BureauLabel::ScoringBureau,
                compile(&[
                    r"Скоринг Бюро",
                    r#"ООО\s*["']?Скоринг Бюро["']?"#,
                    r"sb\.bki\.ru",
                    r"Скоринг\s+Бюро",
                ]),
            ),
            (
                BureauLabel::Equifax,
                compile(&[
                    r"Equifax",
                    r"Эквифакс",
                    r"www\.equifax\.ru",
                    r"Equifax\s+Credit",
                ]),
            ),
            (
                BureauLabel::KbKiwi,
                compile(&[r"КБ Киви", r"Киви БКИ", r"kbc\.k\.ru", r"КБ\s+Киви"]),
            ),
            (
                BureauLabel::RussianStandardBki,
                compile(&[
                    r"Русский Стандарт БКИ",
                    r"РС БКИ",
                    r"rsbki\.ru",
                    r"Русский\s+Стандарт\s+БКИ",
                ]),
            ),
        ];

        Self { registry }
    }

    /// Detects the issuing bureau with a confidence level.
    ///
    /// Confidence is matched patterns over total patterns for the winning
    /// bureau, capped at 1.0. Text with zero matches for every bureau
    /// (including empty text) yields `Unknown` with confidence 0.0.
    pub fn detect(&self, text: &str) -> BureauDetection {
        if text.is_empty() {
            return BureauDetection {
                bureau: BureauLabel::Unknown,
                confidence: 0.0,
                match_counts: Vec::new(),
            };
        }

        // PDF extraction leaves hard line breaks inside institution names
        let normalized = text.replace(['\n', '\r'], " ");

        let mut match_counts = Vec::with_capacity(self.registry.len());
        let mut detected = BureauLabel::Unknown;
        let mut max_matches = 0usize;
        let mut pattern_total = 0usize;

        for (bureau, patterns) in &self.registry {
            let matches = patterns
                .iter()
                .filter(|pattern| pattern.is_match(&normalized))
                .count();
            match_counts.push((*bureau, matches));

            // Strictly greater: on a tie the earlier registry entry stays
            if matches > max_matches {
                max_matches = matches;
                detected = *bureau;
                pattern_total = patterns.len();
            }
        }

        if max_matches == 0 {
            tracing::debug!("No bureau patterns matched, classifying as unknown");
            return BureauDetection {
                bureau: BureauLabel::Unknown,
                confidence: 0.0,
                match_counts,
            };
        }

        let confidence = (max_matches as f64 / pattern_total as f64).min(1.0);
        tracing::debug!(
            "Detected bureau {} ({}/{} patterns, confidence {:.2})",
            detected,
            max_matches,
            pattern_total,
            confidence
        );

        BureauDetection {
            bureau: detected,
            confidence,
            match_counts,
        }
    }
}

impl Default for BureauIdentifier {
    fn default() -> Self {
        Self::new()
    }
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(&format!("(?i){}", p)).unwrap())
        .collect()
}
