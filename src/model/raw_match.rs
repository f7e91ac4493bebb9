use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::warn;

use crate::model::wire::{WireMatch, WireResult, WireTeam};

/// Result type marking the final score of a match.
pub const END_OF_MATCH_RESULT_TYPE: i64 = 2;

/// A match record in canonical shape, independent of the key casing the API used.
#[derive(Clone, Debug, PartialEq)]
pub struct RawMatch {
    pub match_id: Option<i64>,
    pub team1: Option<String>,
    pub team2: Option<String>,
    pub kickoff: DateTime<Utc>,
    pub finished: bool,
    /// `None` when the feed did not say; liveness is then derived from the kickoff.
    pub live: Option<bool>,
    pub results: Vec<MatchResult>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MatchResult {
    pub result_type_id: Option<i64>,
    pub name: Option<String>,
    pub points_team1: Option<f64>,
    pub points_team2: Option<f64>,
}

impl MatchResult {
    pub fn is_end_of_match(&self) -> bool {
        self.result_type_id == Some(END_OF_MATCH_RESULT_TYPE)
    }
}

impl From<WireResult> for MatchResult {
    fn from(wire: WireResult) -> Self {
        Self {
            result_type_id: wire.result_type_id,
            name: wire.result_name,
            points_team1: wire.points_team1,
            points_team2: wire.points_team2,
        }
    }
}

impl RawMatch {
    /// Normalize a wire record. The UTC kickoff wins; the local kickoff is read in
    /// `home_tz`. Returns `None` when neither timestamp parses.
    pub fn from_wire(wire: WireMatch, home_tz: Tz) -> Option<Self> {
        let kickoff = wire
            .match_date_time_utc
            .as_deref()
            .and_then(parse_utc_kickoff)
            .or_else(|| {
                wire.match_date_time
                    .as_deref()
                    .and_then(|s| parse_local_kickoff(s, home_tz))
            });

        let Some(kickoff) = kickoff else {
            warn!(
                match_id = ?wire.match_id,
                utc = ?wire.match_date_time_utc,
                local = ?wire.match_date_time,
                "Skipping match without a parseable kickoff"
            );
            return None;
        };

        Some(RawMatch {
            match_id: wire.match_id,
            team1: wire.team1.and_then(team_name),
            team2: wire.team2.and_then(team_name),
            kickoff,
            finished: wire.match_is_finished.unwrap_or(false),
            live: wire.match_is_live,
            results: wire
                .match_results
                .unwrap_or_default()
                .into_iter()
                .map(MatchResult::from)
                .collect(),
        })
    }
}

fn team_name(team: WireTeam) -> Option<String> {
    team.team_name
        .or(team.short_name)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// `2024-08-23T18:30:00Z`, with or without the offset suffix.
fn parse_utc_kickoff(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| parse_naive(s).map(|naive| Utc.from_utc_datetime(&naive)))
}

fn parse_local_kickoff(s: &str, home_tz: Tz) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    let naive = parse_naive(s)?;
    // Ambiguous wall-clock times (autumn DST switch) take the earlier instant.
    home_tz
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_naive(s: &str) -> Option<NaiveDateTime> {
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|pat| NaiveDateTime::parse_from_str(s, pat).ok())
}
