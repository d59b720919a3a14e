use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::config::PipelineConfig;
use crate::models::{Direction, NewLineItem};
use crate::pipeline::numeric::NumericToken;
use crate::pipeline::structuring::CandidateTransaction;

/// A candidate that passed every check, with fields tightened to their real
/// types. Only these may reach deduplication and the writer.
#[derive(Debug, Clone)]
pub struct ValidTransaction {
    pub occurred_at: NaiveDateTime,
    pub description: String,
    pub amount: f64,
    pub direction: Direction,
    pub suggested_category: Option<String>,
    pub suggested_subcategory: Option<String>,
    pub fiscal_document_id: Option<String>,
    pub line_items: Vec<NewLineItem>,
}

#[derive(Debug)]
pub enum ValidationVerdict {
    Accept(Box<ValidTransaction>),
    Reject { reason: String },
}

/// Per-transaction checks, applied in a fixed order so the first failure
/// names the reason.
pub struct TransactionValidator<'a> {
    config: &'a PipelineConfig,
}

impl<'a> TransactionValidator<'a> {
    pub fn new(config: &'a PipelineConfig) -> Self {
        Self { config }
    }

    pub fn validate(&self, candidate: &CandidateTransaction) -> ValidationVerdict {
        let reject = |reason: &str| ValidationVerdict::Reject { reason: reason.to_string() };

        let Some(date_str) = candidate.date.as_deref().map(str::trim).filter(|s| !s.is_empty())
        else {
            return reject("missing date");
        };
        let Some(description) =
            candidate.description.as_deref().map(str::trim).filter(|s| !s.is_empty())
        else {
            return reject("missing description");
        };
        if candidate.amount.is_none() {
            return reject("missing amount");
        }
        let Some(direction_str) = candidate.direction.as_deref() else {
            return reject("missing transaction type");
        };

        let Some(date) = NaiveDate::parse_from_str(date_str, "%d/%m/%Y").ok() else {
            return ValidationVerdict::Reject {
                reason: format!("invalid date: {date_str}"),
            };
        };
        let year = chrono::Datelike::year(&date);
        if year < self.config.min_year || year > self.config.max_year {
            return ValidationVerdict::Reject {
                reason: format!("date out of range: {date_str}"),
            };
        }

        let Some(amount) = candidate.amount_f64() else {
            return reject("amount is not numeric");
        };
        if amount == 0.0 {
            return reject("amount cannot be zero");
        }

        let Some(direction) = Direction::from_wire(direction_str) else {
            return ValidationVerdict::Reject {
                reason: format!("unknown transaction type: {direction_str}"),
            };
        };

        // receipt time merges into the timestamp; absent or malformed means midnight
        let time = candidate
            .time
            .as_deref()
            .and_then(|t| NaiveTime::parse_from_str(t.trim(), "%H:%M:%S").ok())
            .unwrap_or_else(|| NaiveTime::from_hms_opt(0, 0, 0).unwrap_or_default());

        let line_items = candidate
            .items
            .iter()
            .filter_map(|item| {
                item.name.as_deref().map(|name| NewLineItem {
                    item_name: name.trim().to_string(),
                    quantity: item.quantity.unwrap_or(1.0),
                    unit_price: item.unit_price.unwrap_or(0.0),
                })
            })
            .collect();

        ValidationVerdict::Accept(Box::new(ValidTransaction {
            occurred_at: date.and_time(time),
            description: description.to_string(),
            amount: amount.abs(),
            direction,
            suggested_category: candidate.suggested_category.clone(),
            suggested_subcategory: candidate.suggested_subcategory.clone(),
            fiscal_document_id: normalize_fiscal_id(candidate.fiscal_document.as_deref()),
            line_items,
        }))
    }

    /// Share of accepted amounts that also appear in the independently
    /// scanned numeric tokens. Low values mean the structuring service
    /// probably hallucinated or mangled amounts.
    pub fn consistency_ratio(
        &self,
        accepted: &[ValidTransaction],
        tokens: &[NumericToken],
    ) -> f64 {
        if accepted.is_empty() {
            return 1.0;
        }
        let tolerance = self.config.amount_tolerance;
        let matched = accepted
            .iter()
            .filter(|tx| tokens.iter().any(|t| (t.0 - tx.amount).abs() <= tolerance))
            .count();
        matched as f64 / accepted.len() as f64
    }

    pub fn is_consistent(&self, ratio: f64) -> bool {
        ratio >= self.config.consistency_threshold
    }
}

/// CNPJ/CPF come back punctuated ("12.345.678/0001-99"); only digits are
/// stored and compared.
fn normalize_fiscal_id(raw: Option<&str>) -> Option<String> {
    let digits: String = raw?.chars().filter(|c| c.is_ascii_digit()).collect();
    (!digits.is_empty()).then_some(digits)
}
