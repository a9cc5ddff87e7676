//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every validation failure becomes an `invalid_request` error whose details
//! name the offending payload field and a stable machine-readable code.

use serde_json::json;

use crate::domain::{
    CredentialsValidationError, Error, IdParseError, ItemValidationError, UserValidationError,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    EmptyField,
    InvalidEmail,
    InvalidYear,
    InvalidUuid,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::EmptyField => "empty_field",
            ErrorCode::InvalidEmail => "invalid_email",
            ErrorCode::InvalidYear => "invalid_year",
            ErrorCode::InvalidUuid => "invalid_uuid",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

fn field_error(field: &str, message: impl Into<String>, code: ErrorCode) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": code.as_str(),
    }))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    field_error(
        field,
        format!("missing required field: {field}"),
        ErrorCode::MissingField,
    )
}

/// Unwrap a required payload field.
pub(crate) fn required<T>(value: Option<T>, field: FieldName) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

/// Parse an identifier path segment or body field.
pub(crate) fn parse_id<'a, T>(
    value: &'a str,
    field: FieldName,
    parse: impl FnOnce(&'a str) -> Result<T, IdParseError>,
) -> Result<T, Error> {
    parse(value).map_err(|err: IdParseError| {
        let field = field.as_str();
        Error::invalid_request(format!("{field} must be a valid UUID")).with_details(json!({
            "field": field,
            "value": value,
            "kind": err.kind(),
            "code": ErrorCode::InvalidUuid.as_str(),
        }))
    })
}

pub(crate) fn map_user_validation_error(err: &UserValidationError) -> Error {
    let code = match err {
        UserValidationError::InvalidEmail => ErrorCode::InvalidEmail,
        UserValidationError::EmptyName
        | UserValidationError::EmptyEmail
        | UserValidationError::EmptyAddress => ErrorCode::EmptyField,
    };
    field_error(err.field(), err.to_string(), code)
}

pub(crate) fn map_credentials_validation_error(err: &CredentialsValidationError) -> Error {
    match err {
        CredentialsValidationError::Profile(inner) => map_user_validation_error(inner),
        CredentialsValidationError::EmptyPassword => {
            field_error(err.field(), err.to_string(), ErrorCode::EmptyField)
        }
    }
}

pub(crate) fn map_item_validation_error(err: &ItemValidationError) -> Error {
    let code = match err {
        ItemValidationError::MissingField { .. } => ErrorCode::MissingField,
        ItemValidationError::BlankField { .. } => ErrorCode::EmptyField,
        ItemValidationError::InvalidYear => ErrorCode::InvalidYear,
    };
    field_error(err.field(), err.to_string(), code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorCode as DomainCode, ItemId};
    use rstest::rstest;
    use serde_json::Value;

    fn detail<'a>(error: &'a Error, key: &str) -> Option<&'a str> {
        error.details().and_then(|d| d.get(key)).and_then(Value::as_str)
    }

    #[rstest]
    fn missing_field_names_the_field() {
        let err = required::<String>(None, FieldName::new("publisher")).expect_err("missing");
        assert_eq!(err.code(), DomainCode::InvalidRequest);
        assert_eq!(err.message(), "missing required field: publisher");
        assert_eq!(detail(&err, "field"), Some("publisher"));
        assert_eq!(detail(&err, "code"), Some("missing_field"));
    }

    #[rstest]
    fn invalid_ids_report_value_and_kind() {
        let err = parse_id("nope", FieldName::new("id"), ItemId::new).expect_err("invalid");
        assert_eq!(detail(&err, "value"), Some("nope"));
        assert_eq!(detail(&err, "kind"), Some("item id"));
        assert_eq!(detail(&err, "code"), Some("invalid_uuid"));
    }

    #[rstest]
    #[case(UserValidationError::EmptyName, "name", "empty_field")]
    #[case(UserValidationError::InvalidEmail, "email", "invalid_email")]
    #[case(UserValidationError::EmptyAddress, "address", "empty_field")]
    fn user_errors_carry_field_and_code(
        #[case] source: UserValidationError,
        #[case] field: &str,
        #[case] code: &str,
    ) {
        let err = map_user_validation_error(&source);
        assert_eq!(detail(&err, "field"), Some(field));
        assert_eq!(detail(&err, "code"), Some(code));
    }

    #[rstest]
    #[case(ItemValidationError::MissingField { field: "system" }, "system", "missing_field")]
    #[case(ItemValidationError::BlankField { field: "name" }, "name", "empty_field")]
    #[case(ItemValidationError::InvalidYear, "yearPublished", "invalid_year")]
    fn item_errors_carry_field_and_code(
        #[case] source: ItemValidationError,
        #[case] field: &str,
        #[case] code: &str,
    ) {
        let err = map_item_validation_error(&source);
        assert_eq!(err.message(), source.to_string());
        assert_eq!(detail(&err, "field"), Some(field));
        assert_eq!(detail(&err, "code"), Some(code));
    }
}
