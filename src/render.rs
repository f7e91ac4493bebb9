use std::io::Write;

use tracing::warn;

use crate::model::match_view::MatchView;

/// Receives the ordered match list and the status message after every change.
///
/// Implementations decide how to show them; the list is always complete and
/// replaces whatever was shown before. Renders happen under the ticker's lock
/// so they arrive in cycle order; implementations must not block on I/O.
pub trait Renderer: Send {
    fn render(&mut self, matches: &[MatchView], status: &str);
}

/// One line per match: `Sa., 15:30  Team A - Team B  2:1  Endstand`.
pub fn format_match_line(view: &MatchView) -> String {
    format!(
        "{}  {} - {}  {}  {}",
        view.time_text, view.team1, view.team2, view.score_text, view.status_label
    )
}

pub fn format_board(matches: &[MatchView], status: &str) -> String {
    let mut out = String::new();
    for view in matches {
        out.push_str(&format_match_line(view));
        out.push('\n');
    }
    out.push_str(status);
    out.push('\n');
    out
}

/// Prints the board to stdout.
#[derive(Debug, Default)]
pub struct TerminalRenderer;

impl Renderer for TerminalRenderer {
    fn render(&mut self, matches: &[MatchView], status: &str) {
        let board = format_board(matches, status);
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = stdout.write_all(board.as_bytes()).and_then(|_| stdout.flush()) {
            warn!(error = %e, "Failed to write board to stdout");
        }
    }
}
