//! Rollout request validation

use std::collections::HashSet;
use std::fmt;

use openapi_server::models::{FieldErrorModel, RolloutRequest, TrafficRule};

/// A violation tagged with the offending field's position, e.g. `traffic[1].percent`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Every violation found in one request, in detection order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// `Ok(())` when nothing was collected
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    pub fn to_models(&self) -> Vec<FieldErrorModel> {
        self.errors
            .iter()
            .map(|e| FieldErrorModel {
                field: e.field.clone(),
                message: e.message.clone(),
            })
            .collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|e| {
                if e.field.is_empty() {
                    e.message.clone()
                } else {
                    format!("{}: {}", e.field, e.message)
                }
            })
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Validate a full traffic split.
///
/// All violations are collected: per-rule field limits, duplicate revisions
/// (reported at the repeated rule), an empty rule list, and a percentage sum
/// other than exactly 100.
pub fn validate_rollout_request(request: &RolloutRequest) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let mut percentage: i64 = 0;
    let mut revisions = HashSet::new();

    for (idx, rule) in request.traffic.iter().enumerate() {
        let prefix = format!("traffic[{}]", idx);
        percentage += i64::from(rule.percent);

        if let Some(revision) = rule.riser_revision {
            if !revisions.insert(revision) {
                errors.push(
                    format!("{}.riserRevision", prefix),
                    format!(
                        "revision \"{}\" specified twice. You may only specify one rule per revision",
                        revision
                    ),
                );
            }
        }

        validate_rule(&prefix, rule, &mut errors);
    }

    if request.traffic.is_empty() {
        errors.push("traffic", "must specify one or more traffic rules");
    } else if percentage != 100 {
        errors.push("traffic", "rule percentages must add up to 100");
    }

    errors.into_result()
}

fn validate_rule(prefix: &str, rule: &TrafficRule, errors: &mut ValidationErrors) {
    match rule.riser_revision {
        None => errors.push(format!("{}.riserRevision", prefix), "is required"),
        Some(revision) if revision < 0 => {
            errors.push(format!("{}.riserRevision", prefix), "must be no less than 0")
        }
        Some(_) => {}
    }

    if rule.percent < 0 {
        errors.push(format!("{}.percent", prefix), "must be no less than 0");
    } else if rule.percent > 100 {
        errors.push(format!("{}.percent", prefix), "must be no greater than 100");
    }
}
