use thiserror::Error;

/// Validation errors for user-supplied analysis parameters and envelope metadata.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter or '^': '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("tolerance must be a finite percentage, got '{value}'")]
    NonFiniteTolerance { value: String },
    #[error("tolerance must be non-negative, got {value}")]
    NegativeTolerance { value: String },

    #[error("invalid input format '{value}', expected one of auto, csv, json")]
    InvalidSourceFormat { value: String },

    #[error("source_chain must contain at least one source")]
    EmptySourceChain,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_rejected_value() {
        let tolerance = ValidationError::NegativeTolerance {
            value: String::from("-1"),
        };
        assert_eq!(tolerance.to_string(), "tolerance must be non-negative, got -1");

        let symbol = ValidationError::SymbolInvalidChar { ch: '$', index: 3 };
        assert_eq!(
            symbol.to_string(),
            "symbol contains invalid character '$' at index 3"
        );
    }
}
