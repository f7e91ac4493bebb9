use chrono::TimeDelta;

/// Where a match stands relative to one `now` snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchStatus {
    /// The feed flags the match as live.
    Live,
    Finished,
    /// Kicks off within the soon threshold; carries the time left.
    StartingSoon(TimeDelta),
    Scheduled,
    /// Kickoff has passed but the feed neither flags it live nor finished.
    InProgressUnknown,
}

impl MatchStatus {
    pub fn is_live(&self) -> bool {
        matches!(self, MatchStatus::Live)
    }

    pub fn is_starting_soon(&self) -> bool {
        matches!(self, MatchStatus::StartingSoon(_))
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, MatchStatus::Finished)
    }

    /// Status name without the countdown.
    pub fn kind(&self) -> &'static str {
        match self {
            MatchStatus::Live => "live",
            MatchStatus::Finished => "finished",
            MatchStatus::StartingSoon(_) => "starting_soon",
            MatchStatus::Scheduled => "scheduled",
            MatchStatus::InProgressUnknown => "in_progress",
        }
    }
}
