use std::{error::Error, fmt::Display};

/// An error standing in for a failed network call.
#[derive(Debug)]
pub struct TestError;

impl Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TestError: connection reset")
    }
}

impl Error for TestError {}
