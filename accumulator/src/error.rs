use ark_serialize::SerializationError;

#[derive(Debug)]
pub enum AccumulatorError {
    /// A witness was requested for an element that was never accumulated
    ElementAbsent,
    Serialization(SerializationError),
}

impl From<SerializationError> for AccumulatorError {
    fn from(e: SerializationError) -> Self {
        Self::Serialization(e)
    }
}
