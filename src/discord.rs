use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::model::match_view::MatchView;
use crate::render::{format_match_line, Renderer};

/// Discord rejects message content longer than this.
const MAX_CONTENT_CHARS: usize = 2000;

/// Anything that can deliver a text message to a webhook.
pub trait WebhookPoster: Send {
    fn post(&self, content: &str) -> Result<(), String>;
}

/// Discord webhook client with its own request timeout.
#[derive(Clone)]
pub struct Discord {
    agent: ureq::Agent,
    hook_url: String,
}

impl Discord {
    pub fn new(hook_url: String, timeout: Duration) -> Self {
        let agent_config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();
        Self {
            agent: ureq::Agent::new_with_config(agent_config),
            hook_url,
        }
    }
}

impl fmt::Debug for Discord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Discord").field("hook_url", &self.hook_url).finish_non_exhaustive()
    }
}

impl WebhookPoster for Discord {
    fn post(&self, content: &str) -> Result<(), String> {
        let payload = serde_json::json!({ "content": content });
        let resp = self.agent.post(&self.hook_url).send_json(payload).map_err(|e| {
            error!(error = %e, "Discord webhook post failed");
            format!("Discord webhook post failed: {}", e)
        })?;
        info!(status = resp.status().as_u16(), "Posted match board to Discord");
        Ok(())
    }
}

/// Turns boards into webhook posts, skipping boards that show nothing new.
///
/// Countdowns and the status message are left out of the comparison, otherwise
/// every refresh would produce a post.
pub struct BoardPublisher<P: WebhookPoster> {
    poster: P,
    last_signature: Option<String>,
}

impl<P: WebhookPoster> BoardPublisher<P> {
    pub fn new(poster: P) -> Self {
        Self { poster, last_signature: None }
    }

    /// The message body for a board, or `None` when there is nothing to show.
    pub fn board_message(matches: &[MatchView]) -> Option<String> {
        if matches.is_empty() {
            return None;
        }
        let mut content = String::from(":soccer: Bundesliga\n");
        for view in matches {
            let line = format_match_line(view);
            if content.chars().count() + line.chars().count() + 1 > MAX_CONTENT_CHARS {
                break;
            }
            content.push_str(&line);
            content.push('\n');
        }
        Some(content.trim_end().to_string())
    }

    /// What has to change for a new post: order, teams, scores and status kinds.
    pub fn board_signature(matches: &[MatchView]) -> String {
        matches
            .iter()
            .map(|v| format!("{}|{}|{}|{}|{}", v.time_text, v.team1, v.team2, v.score_text, v.status.kind()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Post the board if it differs from the last successful post.
    /// Returns whether a post went out; a failed post is retried with the next board.
    pub fn publish(&mut self, matches: &[MatchView]) -> bool {
        let Some(content) = Self::board_message(matches) else {
            return false;
        };
        let signature = Self::board_signature(matches);
        if self.last_signature.as_deref() == Some(signature.as_str()) {
            return false;
        }
        if self.poster.post(&content).is_err() {
            return false;
        }
        self.last_signature = Some(signature);
        true
    }
}

/// Renderer that hands boards to a background thread posting to a webhook.
///
/// `render` never waits on the network. When posts fall behind, the worker
/// skips straight to the newest board.
pub struct DiscordRenderer {
    boards: Sender<Vec<MatchView>>,
}

impl DiscordRenderer {
    pub fn new<P: WebhookPoster + 'static>(poster: P) -> Self {
        let (boards, rx) = mpsc::channel();
        let publisher = BoardPublisher::new(poster);
        thread::Builder::new()
            .name("discord-publisher".to_string())
            .spawn(move || publish_loop(publisher, rx))
            .map(|_| ())
            .unwrap_or_else(|e| error!(error = %e, "Failed to start Discord publisher thread"));
        Self { boards }
    }
}

fn publish_loop<P: WebhookPoster>(mut publisher: BoardPublisher<P>, rx: Receiver<Vec<MatchView>>) {
    while let Ok(mut board) = rx.recv() {
        let mut skipped = 0usize;
        while let Ok(newer) = rx.try_recv() {
            board = newer;
            skipped += 1;
        }
        if skipped > 0 {
            debug!(skipped, "Skipping stale boards");
        }
        publisher.publish(&board);
    }
    debug!("Discord publisher stopped");
}

impl Renderer for DiscordRenderer {
    fn render(&mut self, matches: &[MatchView], _status: &str) {
        if self.boards.send(matches.to_vec()).is_err() {
            warn!("Discord publisher is gone; board not posted");
        }
    }
}
