use std::fmt::Display;

use serde::Serialize;
use thiserror::Error;

/// One failing request parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiParameterError {
    pub resource: String,
    pub parameter_name: String,
    pub developer_message: String,
    pub default_user_message: String,
    pub user_message_globalisation_code: String,
    pub value: Option<String>,
}

/// Every failing parameter of a rejected request, reported together.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("Validation errors exist.")]
#[serde(rename_all = "camelCase")]
pub struct ValidationErrors {
    pub errors: Vec<ApiParameterError>,
}

impl ValidationErrors {
    pub const GLOBALISATION_CODE: &'static str = "validation.msg.validation.errors.exist";

    pub fn errors(&self) -> &[ApiParameterError] {
        &self.errors
    }

    /// Returns true if any error was raised for the given parameter.
    pub fn has_parameter(&self, parameter: &str) -> bool {
        self.errors.iter().any(|e| e.parameter_name == parameter)
    }

    /// Returns true if any error carries the given globalisation code.
    pub fn has_code(&self, code: &str) -> bool {
        self.errors
            .iter()
            .any(|e| e.user_message_globalisation_code == code)
    }
}

/// Accumulates parameter errors for one resource without short-circuiting.
pub struct DataValidator {
    resource: &'static str,
    errors: Vec<ApiParameterError>,
}

impl DataValidator {
    pub fn new(resource: &'static str) -> Self {
        Self {
            resource,
            errors: Vec::new(),
        }
    }

    /// Start a rule chain for one parameter.
    pub fn parameter<T: Display>(
        &mut self,
        parameter: &'static str,
        value: Option<T>,
    ) -> FieldCheck<'_, T> {
        FieldCheck {
            validator: self,
            parameter,
            value,
            ignore_if_absent: false,
            failed: false,
        }
    }

    /// Rejects the request when none of the given fields is present.
    pub fn any_of_present(&mut self, present: &[bool]) {
        if !present.iter().any(|p| *p) {
            let message = "No parameters passed for update.".to_string();
            // Resource-level code: no parameter segment.
            self.errors.push(ApiParameterError {
                resource: self.resource.to_string(),
                parameter_name: "id".to_string(),
                developer_message: message.clone(),
                default_user_message: message,
                user_message_globalisation_code: format!(
                    "validation.msg.{}.no.parameters.for.update",
                    self.resource
                ),
                value: None,
            });
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Ends validation: `Ok` when nothing failed, otherwise every error at once.
    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors {
                errors: self.errors,
            })
        }
    }

    fn push(&mut self, parameter: &str, rule: &str, message: String, value: Option<String>) {
        self.errors.push(ApiParameterError {
            resource: self.resource.to_string(),
            parameter_name: parameter.to_string(),
            developer_message: message.clone(),
            default_user_message: message,
            user_message_globalisation_code: format!(
                "validation.msg.{}.{}.{}",
                self.resource, parameter, rule
            ),
            value,
        });
    }
}

/// Rule chain for a single parameter. The first failing rule records an
/// error and the remaining rules in the chain are skipped.
pub struct FieldCheck<'a, T> {
    validator: &'a mut DataValidator,
    parameter: &'static str,
    value: Option<T>,
    ignore_if_absent: bool,
    failed: bool,
}

impl<T: Display> FieldCheck<'_, T> {
    /// Skip every following rule when the value is absent.
    pub fn ignore_if_absent(mut self) -> Self {
        self.ignore_if_absent = true;
        self
    }

    pub fn required(mut self) -> Self {
        if self.skipped() {
            return self;
        }
        if self.value.is_none() {
            let message = format!("The parameter {} is mandatory.", self.parameter);
            self.reject("cannot.be.blank", message);
        }
        self
    }

    fn skipped(&self) -> bool {
        self.failed || (self.ignore_if_absent && self.value.is_none())
    }

    fn reject(&mut self, rule: &str, message: String) {
        let value = self.value.as_ref().map(|v| v.to_string());
        self.validator.push(self.parameter, rule, message, value);
        self.failed = true;
    }
}

impl FieldCheck<'_, &str> {
    /// Fails on an absent value or one that is empty after trimming.
    pub fn not_blank(mut self) -> Self {
        if self.skipped() {
            return self;
        }
        if self.value.is_none_or(|v| v.trim().is_empty()) {
            let message = format!("The parameter {} is mandatory.", self.parameter);
            self.reject("cannot.be.blank", message);
        }
        self
    }

    /// Length is counted in characters.
    pub fn max_length(mut self, max: usize) -> Self {
        if self.skipped() {
            return self;
        }
        if let Some(v) = self.value {
            if v.chars().count() > max {
                let message = format!(
                    "The parameter {} exceeds max length of {}.",
                    self.parameter, max
                );
                self.reject("exceeds.max.length", message);
            }
        }
        self
    }
}

impl FieldCheck<'_, i64> {
    pub fn greater_than_zero(mut self) -> Self {
        if self.skipped() {
            return self;
        }
        if let Some(v) = self.value {
            if v <= 0 {
                let message = format!("The parameter {} must be greater than 0.", self.parameter);
                self.reject("not.greater.than.zero", message);
            }
        }
        self
    }

    /// Inclusive on both ends.
    pub fn in_range(mut self, min: i64, max: i64) -> Self {
        if self.skipped() {
            return self;
        }
        if let Some(v) = self.value {
            if v < min || v > max {
                let message = format!(
                    "The parameter {} must be between {} and {}.",
                    self.parameter, min, max
                );
                self.reject("is.not.within.expected.range", message);
            }
        }
        self
    }
}
