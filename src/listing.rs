//! Request List Logic
//!
//! Mode filters, marker visibility, bottom-sheet grouping and the
//! sequencing guard that drops out-of-order list responses.

use crate::error::ApiError;
use crate::models::{Request, Status, UrgencyWindow};

/// Severity at or above which a request counts as high priority
pub const CRISIS_MIN_SEVERITY: u8 = 4;
/// Rank score at or above which a request counts as high priority
pub const CRISIS_MIN_RANK_SCORE: f64 = 0.75;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Normal,
    /// Only actionable, high-urgency requests
    Crisis,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Normal => ViewMode::Crisis,
            ViewMode::Crisis => ViewMode::Normal,
        }
    }

    pub fn is_crisis(self) -> bool {
        self == ViewMode::Crisis
    }
}

pub fn is_high_priority(request: &Request) -> bool {
    request.severity >= CRISIS_MIN_SEVERITY
        || request.urgency_window == UrgencyWindow::Now
        || request.rank_score >= CRISIS_MIN_RANK_SCORE
}

pub fn is_visible(request: &Request, mode: ViewMode) -> bool {
    match mode {
        ViewMode::Crisis => request.status.is_actionable() && is_high_priority(request),
        ViewMode::Normal => !request.status.is_closed(),
    }
}

/// Keep the server's rank order, drop what the mode hides
pub fn visible_requests(requests: Vec<Request>, mode: ViewMode) -> Vec<Request> {
    requests.into_iter().filter(|r| is_visible(r, mode)).collect()
}

/// Open and funded requests get a marker; a claimed one only while it is selected
pub fn shows_marker(request: &Request, selected_id: Option<&str>) -> bool {
    match request.status {
        Status::Open | Status::Funded => true,
        Status::Claimed => selected_id == Some(request.id.as_str()),
        Status::Delivered | Status::Cancelled => false,
    }
}

/// Bottom sheet sections
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetSections {
    pub open_and_funded: Vec<Request>,
    pub claimed: Vec<Request>,
}

pub fn group_sections(requests: &[Request]) -> SheetSections {
    let mut sections = SheetSections::default();
    for request in requests {
        match request.status {
            Status::Open | Status::Funded => sections.open_and_funded.push(request.clone()),
            Status::Claimed => sections.claimed.push(request.clone()),
            Status::Delivered | Status::Cancelled => {}
        }
    }
    sections
}

/// Ticket handed out when a list fetch starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

/// Monotonic numbering of list fetches.
///
/// A response is applied only if no later-issued fetch has already been
/// applied, so a slow stale response cannot overwrite a newer list.
#[derive(Debug, Clone, Default)]
pub struct FetchSequencer {
    issued: u64,
    applied: u64,
}

impl FetchSequencer {
    pub fn begin(&mut self) -> FetchTicket {
        self.issued += 1;
        FetchTicket(self.issued)
    }

    /// True if the response for `ticket` should be rendered
    pub fn complete(&mut self, ticket: FetchTicket) -> bool {
        if ticket.0 <= self.applied {
            return false;
        }
        self.applied = ticket.0;
        true
    }

    /// No fetch issued after the last applied one is still pending
    pub fn is_idle(&self) -> bool {
        self.applied == self.issued
    }

    /// Settle the fetch behind `ticket`.
    ///
    /// A current response replaces the list (empty on error); a stale one
    /// leaves it alone. `loading` stays set while a later fetch is pending.
    pub fn apply(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<Request>, ApiError>,
        mode: ViewMode,
    ) -> FetchOutcome {
        let requests = if self.complete(ticket) {
            let loaded = result.unwrap_or_else(|e| {
                log::warn!("[APP] Failed to load requests: {}", e);
                Vec::new()
            });
            Some(visible_requests(loaded, mode))
        } else {
            log::debug!("[APP] Discarding stale list response");
            None
        };
        FetchOutcome {
            requests,
            loading: !self.is_idle(),
        }
    }
}

/// What to render after a list fetch settles
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    /// Replacement list, None when the response was stale
    pub requests: Option<Vec<Request>>,
    pub loading: bool,
}
