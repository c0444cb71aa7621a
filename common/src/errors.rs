use thiserror::Error;

/// A single field failed its constraint. Carries the field name so the
/// service can report which part of a payload was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    #[error("{field} must be between {min} and {max} characters")]
    Length {
        field: &'static str,
        min: usize,
        max: usize,
    },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
    },

    #[error("{field} must be greater than or equal to 0")]
    Negative { field: &'static str },

    #[error("{field} must be a positive integer")]
    NotPositive { field: &'static str },

    #[error("{field}: {reason}")]
    InvalidFormat {
        field: &'static str,
        reason: &'static str,
    },

    #[error("invalid {field} '{value}', expected one of: {allowed}")]
    InvalidVariant {
        field: &'static str,
        value: String,
        allowed: &'static str,
    },
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            Self::Empty { field }
            | Self::Length { field, .. }
            | Self::OutOfRange { field, .. }
            | Self::Negative { field }
            | Self::NotPositive { field }
            | Self::InvalidFormat { field, .. }
            | Self::InvalidVariant { field, .. } => field,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_field() {
        let err = ValidationError::Length {
            field: "title",
            min: 2,
            max: 59,
        };
        assert_eq!(err.to_string(), "title must be between 2 and 59 characters");
        assert_eq!(err.field(), "title");

        let err = ValidationError::InvalidVariant {
            field: "rating",
            value: "X".into(),
            allowed: "E, T, M",
        };
        assert_eq!(err.to_string(), "invalid rating 'X', expected one of: E, T, M");
    }
}
