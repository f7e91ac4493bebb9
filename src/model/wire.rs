use serde::{Deserialize, Deserializer};

// OpenLigaDB answers with lowerCamelCase keys on most endpoints and with
// capitalized keys on some older ones. Both spellings land in the same field.

#[derive(Debug, Deserialize)]
pub struct WireMatch {
    #[serde(default, rename = "matchID", alias = "MatchID")]
    pub match_id: Option<i64>,
    #[serde(default, rename = "matchDateTimeUTC", alias = "MatchDateTimeUTC")]
    pub match_date_time_utc: Option<String>,
    #[serde(default, rename = "matchDateTime", alias = "MatchDateTime")]
    pub match_date_time: Option<String>,
    #[serde(default, rename = "matchIsFinished", alias = "MatchIsFinished")]
    pub match_is_finished: Option<bool>,
    #[serde(default, rename = "matchIsLive", alias = "MatchIsLive")]
    pub match_is_live: Option<bool>,
    #[serde(default, rename = "team1", alias = "Team1")]
    pub team1: Option<WireTeam>,
    #[serde(default, rename = "team2", alias = "Team2")]
    pub team2: Option<WireTeam>,
    #[serde(default, rename = "matchResults", alias = "MatchResults")]
    pub match_results: Option<Vec<WireResult>>,
}

#[derive(Debug, Deserialize)]
pub struct WireTeam {
    #[serde(default, rename = "teamName", alias = "TeamName")]
    pub team_name: Option<String>,
    #[serde(default, rename = "shortName", alias = "ShortName")]
    pub short_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WireResult {
    #[serde(default, rename = "resultTypeID", alias = "ResultTypeID")]
    pub result_type_id: Option<i64>,
    #[serde(default, rename = "resultName", alias = "ResultName")]
    pub result_name: Option<String>,
    #[serde(default, rename = "pointsTeam1", alias = "PointsTeam1", deserialize_with = "lenient_points")]
    pub points_team1: Option<f64>,
    #[serde(default, rename = "pointsTeam2", alias = "PointsTeam2", deserialize_with = "lenient_points")]
    pub points_team2: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct WireGroup {
    #[serde(default, rename = "groupName", alias = "GroupName")]
    pub group_name: Option<String>,
    #[serde(default, rename = "groupOrderID", alias = "GroupOrderID")]
    pub group_order_id: Option<i64>,
    #[serde(default, rename = "groupID", alias = "GroupID")]
    pub group_id: Option<i64>,
}

/// Accept any JSON number; everything else (null, strings, objects) reads as absent.
fn lenient_points<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_f64())
}
