//! Declarative payload validation for write endpoints.
//!
//! A [`Schema`] lists every accepted field with one constraint. Validation
//! collects *all* violations instead of stopping at the first, and the value it
//! returns contains only declared fields.

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::error::AppError;

#[derive(Debug, Clone, Copy)]
pub enum Constraint {
    /// A string with at least `min_len` characters.
    String { min_len: usize },
    Boolean,
    /// A string equal to one of the listed variants.
    OneOf(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub name: &'static str,
    pub constraint: Constraint,
}

#[derive(Debug)]
pub struct Schema {
    pub fields: &'static [FieldRule],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, Error)]
#[error("Validation failed")]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    fn single(path: &str, message: impl Into<String>) -> Self {
        Self {
            errors: vec![FieldError {
                path: path.to_string(),
                message: message.into(),
            }],
        }
    }
}

/// Request payloads that carry their own schema.
pub trait Validate: DeserializeOwned {
    const SCHEMA: Schema;
}

impl Schema {
    pub fn validate(&self, payload: &Value) -> Result<Value, ValidationErrors> {
        let Value::Object(input) = payload else {
            return Err(ValidationErrors::single(
                "",
                format!("Expected object, received {}", type_name(payload)),
            ));
        };

        let mut errors = Vec::new();
        let mut output = Map::with_capacity(self.fields.len());
        for rule in self.fields {
            match input.get(rule.name) {
                None => errors.push(FieldError {
                    path: rule.name.to_string(),
                    message: "Required".to_string(),
                }),
                Some(value) => match check(rule.constraint, value) {
                    Ok(()) => {
                        output.insert(rule.name.to_string(), value.clone());
                    }
                    Err(message) => errors.push(FieldError {
                        path: rule.name.to_string(),
                        message,
                    }),
                },
            }
        }

        if errors.is_empty() {
            Ok(Value::Object(output))
        } else {
            Err(ValidationErrors { errors })
        }
    }
}

fn check(constraint: Constraint, value: &Value) -> Result<(), String> {
    match (constraint, value) {
        (Constraint::String { min_len }, Value::String(s)) => {
            if s.chars().count() < min_len {
                Err(format!(
                    "String must contain at least {min_len} character(s)"
                ))
            } else {
                Ok(())
            }
        }
        (Constraint::String { .. }, other) => {
            Err(format!("Expected string, received {}", type_name(other)))
        }
        (Constraint::Boolean, Value::Bool(_)) => Ok(()),
        (Constraint::Boolean, other) => {
            Err(format!("Expected boolean, received {}", type_name(other)))
        }
        (Constraint::OneOf(variants), value) => {
            let expected = variants
                .iter()
                .map(|v| format!("'{v}'"))
                .collect::<Vec<_>>()
                .join(" | ");
            match value {
                Value::String(s) if variants.contains(&s.as_str()) => Ok(()),
                Value::String(s) => Err(format!(
                    "Invalid enum value. Expected {expected}, received '{s}'"
                )),
                other => Err(format!("Expected {expected}, received {}", type_name(other))),
            }
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Validates `payload` against `T::SCHEMA` and builds the typed value.
pub fn parse<T: Validate>(payload: &Value) -> Result<T, ValidationErrors> {
    let clean = T::SCHEMA.validate(payload)?;
    serde_json::from_value(clean).map_err(|e| ValidationErrors::single("", e.to_string()))
}

/// JSON body extractor that runs the payload's schema before the handler.
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        parse::<T>(&payload).map(ValidJson).map_err(AppError::Validation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Subscription {
        plan: String,
        active: bool,
        tier: String,
    }

    impl Validate for Subscription {
        const SCHEMA: Schema = Schema {
            fields: &[
                FieldRule {
                    name: "plan",
                    constraint: Constraint::String { min_len: 1 },
                },
                FieldRule {
                    name: "active",
                    constraint: Constraint::Boolean,
                },
                FieldRule {
                    name: "tier",
                    constraint: Constraint::OneOf(&["free", "pro"]),
                },
            ],
        };
    }

    #[test]
    fn accepts_valid_payload_and_strips_unknown_keys() {
        let clean = Subscription::SCHEMA
            .validate(&json!({ "plan": "monthly", "active": true, "tier": "pro", "extra": 1 }))
            .expect("payload is valid");
        assert_eq!(clean, json!({ "plan": "monthly", "active": true, "tier": "pro" }));

        let typed: Subscription = parse(&clean).expect("typed parse");
        assert_eq!(typed.plan, "monthly");
        assert!(typed.active);
        assert_eq!(typed.tier, "pro");
    }

    #[test]
    fn reports_every_violated_field() {
        let err = parse::<Subscription>(&json!({ "plan": "", "tier": "enterprise" })).unwrap_err();
        assert_eq!(
            err.errors,
            vec![
                FieldError {
                    path: "plan".into(),
                    message: "String must contain at least 1 character(s)".into(),
                },
                FieldError {
                    path: "active".into(),
                    message: "Required".into(),
                },
                FieldError {
                    path: "tier".into(),
                    message: "Invalid enum value. Expected 'free' | 'pro', received 'enterprise'"
                        .into(),
                },
            ]
        );
    }

    #[test]
    fn reports_type_mismatches() {
        let err = parse::<Subscription>(&json!({ "plan": 3, "active": "yes", "tier": null }))
            .unwrap_err();
        let messages: Vec<_> = err.errors.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Expected string, received number",
                "Expected boolean, received string",
                "Expected 'free' | 'pro', received null",
            ]
        );
    }

    #[test]
    fn rejects_non_object_payloads() {
        let err = parse::<Subscription>(&json!([1, 2])).unwrap_err();
        assert_eq!(err.errors.len(), 1);
        assert_eq!(err.errors[0].path, "");
        assert_eq!(err.errors[0].message, "Expected object, received array");
    }
}
