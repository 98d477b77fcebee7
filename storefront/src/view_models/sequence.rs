use serde::Serialize;

/// Identifies one issued fetch. Later tickets compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct FetchTicket(u64);

impl FetchTicket {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Hands out monotonically increasing fetch tickets. Only the most recently
/// issued ticket may write its response into a snapshot.
#[derive(Debug, Default)]
pub struct FetchSequencer {
    latest: u64,
}

impl FetchSequencer {
    pub fn issue(&mut self) -> FetchTicket {
        self.latest += 1;
        FetchTicket(self.latest)
    }

    pub fn is_latest(&self, ticket: FetchTicket) -> bool {
        ticket.0 == self.latest
    }

    pub fn latest(&self) -> Option<FetchTicket> {
        (self.latest > 0).then_some(FetchTicket(self.latest))
    }
}
