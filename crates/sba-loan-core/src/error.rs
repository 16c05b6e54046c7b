use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoanError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Date error: {0}")]
    DateError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_failure() {
        let err = LoanError::InvalidInput {
            field: "termLength".into(),
            reason: "out of range".into(),
        };
        assert_eq!(err.to_string(), "Invalid input: termLength — out of range");
        assert_eq!(
            LoanError::DateError("overflow".into()).to_string(),
            "Date error: overflow"
        );
    }
}
