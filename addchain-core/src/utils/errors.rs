use num::BigUint;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddChainError {
    #[error("Chain is empty")]
    EmptyChain,
    #[error("Chain does not start with 1")]
    InvalidStart,
    #[error("Position {0} is not the sum of two earlier positions")]
    Unreachable(usize),
    #[error("Chain ends at {found}, expected {expected}")]
    WrongEnd { expected: BigUint, found: BigUint },
    #[error("Chain does not contain target {0}")]
    MissingTarget(BigUint),
    #[error("Target must be positive")]
    ZeroTarget,
    #[error("No targets given")]
    NoTargets,
    #[error("Heuristic found no insertion for target {0}")]
    NoSuggestion(BigUint),
    #[error("Heuristic suggested {value} which is not in (0, {target})")]
    InvalidSuggestion { target: BigUint, value: BigUint },
    #[error("Dictionary chain is missing term {0}")]
    MissingDictionaryTerm(BigUint),
    #[error("Run length {0} does not fit in a machine word")]
    LengthOverflow(BigUint),
    #[error("Position {0} is out of bounds")]
    OutOfBounds(usize),
    #[error("Assertion failed: {0}")]
    AssertionFailure(String),
    #[error("No algorithm produced a result: {0:?}")]
    NoResult(Vec<AddChainError>),
}
