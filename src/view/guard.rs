// Render sequence guard.
// Tickets are issued in start order; results older than the last applied one are dropped.

use crate::api::Commit;

/// Sequence number handed to a load path before it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// What to do with a path's result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Newer than what is displayed and different from it.
    Render,
    /// Newer, but identical to what is displayed.
    Unchanged,
    /// Older than what is displayed.
    Stale,
}

/// Tracks which result the render target currently shows.
#[derive(Debug, Default)]
pub struct RenderGuard {
    next: u64,
    applied: Option<Ticket>,
    displayed: Option<Vec<Commit>>,
}

impl RenderGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next ticket.
    pub fn issue(&mut self) -> Ticket {
        self.next += 1;
        Ticket(self.next)
    }

    /// Decide what to do with `commits` produced under `ticket`.
    pub fn admit(&self, ticket: Ticket, commits: &[Commit]) -> Verdict {
        if self.applied.is_some_and(|applied| ticket <= applied) {
            return Verdict::Stale;
        }
        match &self.displayed {
            Some(displayed) if displayed.as_slice() == commits => Verdict::Unchanged,
            _ => Verdict::Render,
        }
    }

    /// Record that `commits` from `ticket` is now what the target shows.
    pub fn record(&mut self, ticket: Ticket, commits: Vec<Commit>) {
        self.applied = Some(ticket);
        self.displayed = Some(commits);
    }

    /// Commits currently displayed, if anything has been applied.
    pub fn displayed(&self) -> Option<&[Commit]> {
        self.displayed.as_deref()
    }
}
