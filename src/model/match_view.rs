use chrono::{DateTime, Utc};

use crate::model::status::MatchStatus;

/// Display-ready record for one match, rebuilt on every refresh.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchView {
    pub match_id: Option<i64>,
    pub kickoff: DateTime<Utc>,
    pub status: MatchStatus,
    pub time_text: String,
    pub team1: String,
    pub team2: String,
    pub score: Option<(i64, i64)>,
    pub score_text: String,
    pub status_label: String,
}
