use secret_sharing::SSError;

#[derive(Debug, PartialEq, Eq)]
pub enum PolicyError {
    /// The parser met a token it could not place, or trailing input
    UnexpectedToken(String),
    /// The policy ended in the middle of an expression
    UnexpectedEnd,
    SecretSharing(SSError),
}

impl From<SSError> for PolicyError {
    fn from(e: SSError) -> Self {
        Self::SecretSharing(e)
    }
}
