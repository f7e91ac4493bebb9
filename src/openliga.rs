use chrono_tz::Tz;
use tracing::{error, info, info_span, instrument, warn};

use crate::config::TickerConfig;
use crate::error::FeedError;
use crate::model::group::CurrentGroup;
use crate::model::raw_match::RawMatch;
use crate::model::wire::{WireGroup, WireMatch};
use crate::ticker::MatchSource;

/// Blocking client for the OpenLigaDB match endpoints of one competition.
#[derive(Clone)]
pub struct OpenLiga {
    agent: ureq::Agent,
    base_url: String,
    competition: String,
    season: Option<u16>,
    home_tz: Tz,
}

impl OpenLiga {
    pub fn new(config: &TickerConfig) -> Self {
        let agent_config = ureq::Agent::config_builder()
            .timeout_global(Some(config.http_timeout))
            .http_status_as_error(false)
            .build();
        Self {
            agent: ureq::Agent::new_with_config(agent_config),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            competition: config.competition.clone(),
            season: config.season,
            home_tz: config.feed.home_tz,
        }
    }

    /// `getmatchdata/{competition}`: the matchday the API considers current.
    pub fn competition_url(&self) -> String {
        format!("{}/getmatchdata/{}", self.base_url, self.competition)
    }

    pub fn matchday_url(&self, season: u16, matchday: u32) -> String {
        format!("{}/getmatchdata/{}/{}/{}", self.base_url, self.competition, season, matchday)
    }

    pub fn current_group_url(&self) -> String {
        format!("{}/getcurrentgroup/{}", self.base_url, self.competition)
    }

    /// Pick the match endpoint given the outcome of the current-group lookup.
    /// Without a season or a usable matchday the whole-competition endpoint is used.
    pub fn endpoint_for(&self, group: Option<&CurrentGroup>) -> String {
        match (self.season, group.and_then(CurrentGroup::matchday)) {
            (Some(season), Some(matchday)) => self.matchday_url(season, matchday),
            _ => self.competition_url(),
        }
    }

    /// Resolve the match endpoint, doing the current-group lookup when a season is set.
    #[instrument(level = "info", skip(self), fields(competition = %self.competition))]
    pub fn resolve_endpoint(&self) -> String {
        if self.season.is_none() {
            return self.competition_url();
        }
        let group = match self
            .get_body(&self.current_group_url())
            .and_then(|body| Self::parse_current_group(&body))
        {
            Ok(group) => Some(group),
            Err(e) => {
                warn!(error = %e, "Current matchday lookup failed; falling back to competition endpoint");
                None
            }
        };
        if let Some(g) = group.as_ref().filter(|g| g.matchday().is_none()) {
            warn!(group = ?g, "Current group has no usable matchday; falling back to competition endpoint");
        }
        self.endpoint_for(group.as_ref())
    }

    /// Fetch and normalize the match list.
    #[instrument(level = "info", skip(self), fields(competition = %self.competition))]
    pub fn fetch_matches(&self) -> Result<Vec<RawMatch>, FeedError> {
        let url = self.resolve_endpoint();
        let body = self.get_body(&url)?;
        match Self::parse_matches(&body, self.home_tz) {
            Ok(matches) => {
                info!(url = %url, count = matches.len(), "Fetched match data");
                Ok(matches)
            }
            Err(e) => {
                error!(error = %e, url = %url, "Failed to parse match data");
                Err(e)
            }
        }
    }

    fn get_body(&self, url: &str) -> Result<String, FeedError> {
        let response_result = {
            let _span = info_span!("openliga_fetch", url = %url).entered();
            self.agent.get(url).call()
        };
        let response = response_result.map_err(|e| {
            error!(error = %e, url = %url, "Request failed");
            FeedError::Network { url: url.to_string(), source: e }
        })?;

        let status = response.status();
        if !status.is_success() {
            error!(status = status.as_u16(), url = %url, "Non-success status");
            return Err(FeedError::Status { url: url.to_string(), status: status.as_u16() });
        }

        response.into_body().read_to_string().map_err(|e| {
            error!(error = %e, url = %url, "Failed to read response body");
            FeedError::Network { url: url.to_string(), source: e }
        })
    }

    /// Parse a `getmatchdata` body (no network). Records without a usable kickoff
    /// are dropped; an empty result is an error.
    #[instrument(level = "debug", skip(body), fields(bytes = body.len()))]
    pub fn parse_matches(body: &str, home_tz: Tz) -> Result<Vec<RawMatch>, FeedError> {
        let wire = serde_json::from_str::<Vec<WireMatch>>(body)?;
        let matches: Vec<RawMatch> = wire
            .into_iter()
            .filter_map(|w| RawMatch::from_wire(w, home_tz))
            .collect();
        if matches.is_empty() {
            return Err(FeedError::Empty);
        }
        Ok(matches)
    }

    /// Parse a `getcurrentgroup` body (no network).
    pub fn parse_current_group(body: &str) -> Result<CurrentGroup, FeedError> {
        let wire = serde_json::from_str::<WireGroup>(body)?;
        Ok(wire.into())
    }
}

impl MatchSource for OpenLiga {
    fn fetch_matches(&self) -> Result<Vec<RawMatch>, FeedError> {
        OpenLiga::fetch_matches(self)
    }
}
