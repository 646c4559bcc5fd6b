use std::ops::Add;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid Input")]
pub struct InvalidInputError {
    input: String,
}

impl InvalidInputError {
    /// The rejected input
    pub fn input(&self) -> &str {
        &self.input
    }
}

pub fn sum<T: Add<Output = T>>(a: T, b: T) -> T {
    a + b
}

/// Parses `input` as a number, rejecting anything else
pub fn error_function(input: &str) -> Result<f64, InvalidInputError> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| InvalidInputError {
            input: input.to_string(),
        })
}
