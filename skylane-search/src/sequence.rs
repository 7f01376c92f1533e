/// Monotonic request counter. Only the most recently issued token is current, so a
/// response carrying an older token is stale no matter when it arrives.
#[derive(Debug, Default)]
pub struct RequestSequence {
    latest: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SequenceToken(u64);

impl RequestSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> SequenceToken {
        self.latest += 1;
        SequenceToken(self.latest)
    }

    pub fn is_current(&self, token: SequenceToken) -> bool {
        token.0 == self.latest
    }

    /// Make every outstanding token stale without starting a new request
    pub fn invalidate(&mut self) {
        self.latest += 1;
    }
}
