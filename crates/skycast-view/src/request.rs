//! Request sequencing so a superseded fetch can never overwrite a newer one.

use std::fmt;

/// Monotonically increasing id of a forecast request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: u64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next id. Ids start at 1.
    pub fn next_id(&mut self) -> RequestId {
        self.latest += 1;
        RequestId(self.latest)
    }

    /// Highest id issued so far, if any.
    pub fn latest(&self) -> Option<RequestId> {
        (self.latest > 0).then_some(RequestId(self.latest))
    }

    /// Only the most recently issued request may update state.
    pub fn is_current(&self, id: RequestId) -> bool {
        id.0 == self.latest
    }
}
