use ark_serialize::SerializationError;
use membership_accumulator::error::AccumulatorError;
use policy_lang::PolicyError;
use rss_crypto_utils::der::DerError;
use secret_sharing::SSError;

/// Errors of the signature schemes. Only precondition violations and
/// malformed inputs surface here; a signature that merely fails to verify
/// is a `false` return, and an inadmissible redaction is a `None` return.
#[derive(Debug)]
pub enum SignatureError {
    /// The scheme requires a policy and none was given
    PolicyRequired,
    /// The accumulator-only scheme was handed a policy
    PolicyNotSupported,
    /// The small-universe scheme needs a universe at key generation
    UniverseRequired,
    /// A set member does not appear in the declared universe
    SetNotInUniverse,
    /// The set does not satisfy the policy at signing time
    PolicyUnsatisfied,
    /// A characteristic sequence is not a bit string of universe length
    MalformedCharacteristicSequence(String),
    /// The freshly dealt share map failed to recombine its own secret
    SecretReconstruction,
    /// A DER body decoded but did not have the expected shape
    MalformedEncoding(&'static str),
    Policy(PolicyError),
    Accumulator(AccumulatorError),
    SecretSharing(SSError),
    Der(DerError),
    Serialization(SerializationError),
}

impl From<PolicyError> for SignatureError {
    fn from(e: PolicyError) -> Self {
        Self::Policy(e)
    }
}

impl From<AccumulatorError> for SignatureError {
    fn from(e: AccumulatorError) -> Self {
        Self::Accumulator(e)
    }
}

impl From<SSError> for SignatureError {
    fn from(e: SSError) -> Self {
        Self::SecretSharing(e)
    }
}

impl From<DerError> for SignatureError {
    fn from(e: DerError) -> Self {
        Self::Der(e)
    }
}

impl From<SerializationError> for SignatureError {
    fn from(e: SerializationError) -> Self {
        Self::Serialization(e)
    }
}
