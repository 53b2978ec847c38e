use axum::{
    extract::FromRequest,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::errors::ServiceError;

/// JSON body extractor whose rejections render as the API's 400 error body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ServiceError))]
pub struct AppJson<T>(pub T);

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(data)).into_response()
}

/// Validate request input
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ServiceError> {
    input.validate().map_err(ServiceError::from)
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for ch in field.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            out.extend(ch.to_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}

fn collect_messages(prefix: &str, errors: &ValidationErrors, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            camel_case(field)
        } else {
            format!("{}.{}", prefix, camel_case(field))
        };
        match kind {
            ValidationErrorsKind::Field(errs) => {
                for err in errs {
                    let message = match (&err.message, err.code.as_ref()) {
                        (Some(message), _) => message.to_string(),
                        (None, "required") => "is required".to_string(),
                        (None, code) => format!("failed {} check", code),
                    };
                    out.push(format!("{}: {}", path, message));
                }
            }
            ValidationErrorsKind::Struct(nested) => collect_messages(&path, nested, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_messages(&format!("{}[{}]", path, index), nested, out);
                }
            }
        }
    }
}

/// One human-readable line per failed rule, field paths in camelCase, sorted for stable output.
pub fn flatten_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();
    collect_messages("", errors, &mut messages);
    messages.sort();
    messages.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateOrderRequest, CreateProductRequest};

    #[test]
    fn converts_field_names_to_camel_case() {
        assert_eq!(camel_case("tax_substitution"), "taxSubstitution");
        assert_eq!(camel_case("name"), "name");
    }

    #[test]
    fn flattens_required_fields() {
        let request = CreateProductRequest::default();
        let err = request.validate().unwrap_err();
        let message = flatten_validation_errors(&err);
        assert!(message.contains("code: is required"), "{message}");
        assert!(message.contains("name: is required"), "{message}");
    }

    #[test]
    fn flattens_nested_line_errors() {
        let request: CreateOrderRequest = serde_json::from_value(serde_json::json!({
            "clientId": uuid::Uuid::new_v4(),
            "items": [{ "productId": uuid::Uuid::new_v4(), "quantity": -1 }]
        }))
        .unwrap();
        let message = flatten_validation_errors(&request.validate().unwrap_err());
        assert!(message.starts_with("items[0].quantity"), "{message}");
    }

    #[test]
    fn missing_option_fields_read_as_required() {
        let request: CreateOrderRequest =
            serde_json::from_value(serde_json::json!({ "items": [] })).unwrap();
        let message = flatten_validation_errors(&request.validate().unwrap_err());
        assert_eq!(message, "clientId: is required");
    }
}
