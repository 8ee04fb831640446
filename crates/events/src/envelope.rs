use serde::Serialize;

/// Envelope for a published event.
///
/// `sequence_number` is assigned by the publisher and increases by one per
/// event, so subscribers can detect gaps (e.g. a dropped channel).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventEnvelope<E> {
    sequence_number: u64,
    payload: E,
}

impl<E> EventEnvelope<E> {
    pub fn new(sequence_number: u64, payload: E) -> Self {
        Self {
            sequence_number,
            payload,
        }
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }
}
