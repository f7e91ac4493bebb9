//! Classification, ordering and display fields for a match list.
//!
//! Every function here is pure: the caller passes the `now` snapshot, so one
//! refresh classifies all of its matches against the same instant.

use chrono::{DateTime, Datelike, TimeDelta, Utc, Weekday};
use chrono_tz::Tz;

use crate::config::FeedSettings;
use crate::model::match_view::MatchView;
use crate::model::raw_match::RawMatch;
use crate::model::status::MatchStatus;

pub const IMMEDIATE_MARKER: &str = "gleich";
pub const SCORE_PLACEHOLDER: &str = "-:-";
pub const TEAM1_PLACEHOLDER: &str = "Team A";
pub const TEAM2_PLACEHOLDER: &str = "Team B";

/// Classify a match against `now`.
///
/// Finished beats everything, an explicit live flag comes next. A match whose
/// kickoff has passed without either flag is in progress but not badged live.
pub fn classify(m: &RawMatch, now: DateTime<Utc>, soon_threshold: TimeDelta) -> MatchStatus {
    if m.finished {
        return MatchStatus::Finished;
    }
    if m.live == Some(true) {
        return MatchStatus::Live;
    }
    if m.kickoff <= now {
        return MatchStatus::InProgressUnknown;
    }
    let remaining = m.kickoff - now;
    if remaining <= soon_threshold {
        MatchStatus::StartingSoon(remaining)
    } else {
        MatchStatus::Scheduled
    }
}

/// Human countdown, rounded to the nearest minute.
pub fn format_countdown(remaining: TimeDelta) -> String {
    let ms = remaining.num_milliseconds();
    if ms <= 0 {
        return IMMEDIATE_MARKER.to_string();
    }
    let total_min = (ms + 30_000) / 60_000;
    if total_min < 60 {
        return format!("{} Min", total_min);
    }
    format!("{} Std {} Min", total_min / 60, total_min % 60)
}

/// The final score: the end-of-match record, else the last record, else nothing.
pub fn extract_score(m: &RawMatch) -> Option<(i64, i64)> {
    let result = m
        .results
        .iter()
        .find(|r| r.is_end_of_match())
        .or_else(|| m.results.last())?;
    Some((whole_points(result.points_team1)?, whole_points(result.points_team2)?))
}

fn whole_points(points: Option<f64>) -> Option<i64> {
    let p = points?;
    if p.is_finite() && p.fract() == 0.0 && p.abs() <= i64::MAX as f64 {
        Some(p as i64)
    } else {
        None
    }
}

pub fn format_score(score: Option<(i64, i64)>) -> String {
    match score {
        Some((a, b)) => format!("{}:{}", a, b),
        None => SCORE_PLACEHOLDER.to_string(),
    }
}

/// Kickoff in the competition's timezone, e.g. `Sa., 15:30`.
pub fn format_kickoff(kickoff: DateTime<Utc>, tz: Tz) -> String {
    let local = kickoff.with_timezone(&tz);
    format!("{}., {}", weekday_abbrev(local.weekday()), local.format("%H:%M"))
}

fn weekday_abbrev(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Mo",
        Weekday::Tue => "Di",
        Weekday::Wed => "Mi",
        Weekday::Thu => "Do",
        Weekday::Fri => "Fr",
        Weekday::Sat => "Sa",
        Weekday::Sun => "So",
    }
}

pub fn status_label(status: &MatchStatus) -> String {
    match status {
        MatchStatus::Live => "LIVE".to_string(),
        MatchStatus::Finished => "Endstand".to_string(),
        MatchStatus::StartingSoon(remaining) => format!("In Kürze • {}", format_countdown(*remaining)),
        MatchStatus::Scheduled => "geplant".to_string(),
        MatchStatus::InProgressUnknown => "läuft".to_string(),
    }
}

/// Build the display record for one already classified match.
pub fn render_fields(m: &RawMatch, status: MatchStatus, tz: Tz) -> MatchView {
    let score = extract_score(m);
    MatchView {
        match_id: m.match_id,
        kickoff: m.kickoff,
        status,
        time_text: format_kickoff(m.kickoff, tz),
        team1: m.team1.clone().unwrap_or_else(|| TEAM1_PLACEHOLDER.to_string()),
        team2: m.team2.clone().unwrap_or_else(|| TEAM2_PLACEHOLDER.to_string()),
        score,
        score_text: format_score(score),
        status_label: status_label(&status),
    }
}

/// Sort key: live first, then starting soon, finished last, then by kickoff.
fn order_key(view: &MatchView) -> (bool, bool, bool, DateTime<Utc>) {
    (
        !view.status.is_live(),
        !view.status.is_starting_soon(),
        view.status.is_finished(),
        view.kickoff,
    )
}

/// Stable sort into display order; equal keys keep the feed's order.
pub fn order_matches(views: &mut [MatchView]) {
    views.sort_by_key(order_key);
}

/// Classify, derive and order a whole feed against one `now` snapshot.
pub fn build_views(matches: &[RawMatch], now: DateTime<Utc>, settings: &FeedSettings) -> Vec<MatchView> {
    let mut views: Vec<MatchView> = matches
        .iter()
        .map(|m| render_fields(m, classify(m, now, settings.soon_threshold), settings.home_tz))
        .collect();
    order_matches(&mut views);
    views
}
