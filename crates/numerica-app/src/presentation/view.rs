use std::io::Write;
use tracing::warn;

use numerica_domain::game::Scoreboard;

use super::routes::Route;

/// Channel linked from the home page
pub const SAMPLE_CHANNEL: &str = "rothiotome";

/// Port through which the session shows the game
pub trait ScoreboardView {
    fn render(&mut self, board: &Scoreboard);
}

/// `Max Score: <max> | <count> | <attribution>`, without the last segment when idle
pub fn format_scoreboard(board: &Scoreboard) -> String {
    let mut line = format!("Max Score: {} | {}", board.max_score, board.count);
    if let Some(attribution) = board.attribution() {
        line.push_str(" | ");
        line.push_str(&attribution);
    }
    line
}

pub fn format_home() -> String {
    format!(
        "Numerica\n\
         Count together in Twitch chat: each message must be the next number,\n\
         and nobody may post twice in a row.\n\
         \n\
         Try: numerica {}\n",
        Route::channel_path(SAMPLE_CHANNEL)
    )
}

/// Writes one scoreboard line per render
pub struct TerminalView<W: Write> {
    out: W,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn render_home(&mut self) {
        self.write(&format_home());
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write(&mut self, text: &str) {
        let result = self
            .out
            .write_all(text.as_bytes())
            .and_then(|_| self.out.flush());
        if let Err(e) = result {
            warn!("Failed to write to terminal: {}", e);
        }
    }
}

impl<W: Write> ScoreboardView for TerminalView<W> {
    fn render(&mut self, board: &Scoreboard) {
        let line = format_scoreboard(board);
        self.write(&format!("{line}\n"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use numerica_domain::game::GameStatus;

    fn board(status: GameStatus, count: u64, last_user: &str, max_score: u64) -> Scoreboard {
        Scoreboard {
            status,
            count,
            last_user: last_user.to_string(),
            max_score,
        }
    }

    #[test]
    fn test_idle_board_omits_attribution() {
        assert_eq!(
            format_scoreboard(&board(GameStatus::Idle, 0, "", 12)),
            "Max Score: 12 | 0"
        );
        // an idle board after a zero-length break still hides the sender
        assert_eq!(
            format_scoreboard(&board(GameStatus::Idle, 0, "Alice", 12)),
            "Max Score: 12 | 0"
        );
    }

    #[test]
    fn test_started_board_names_contributor() {
        assert_eq!(
            format_scoreboard(&board(GameStatus::Started, 2, "Bob", 5)),
            "Max Score: 5 | 2 | Bob"
        );
    }

    #[test]
    fn test_game_over_board_blames_breaker() {
        assert_eq!(
            format_scoreboard(&board(GameStatus::GameOver, 0, "Alice", 5)),
            "Max Score: 5 | 0 | Blame on Alice!"
        );
    }

    #[test]
    fn test_terminal_view_writes_one_line_per_render() {
        let mut view = TerminalView::new(Vec::new());
        view.render(&board(GameStatus::Idle, 0, "", 0));
        view.render(&board(GameStatus::Started, 1, "A", 0));

        let output = String::from_utf8(view.into_inner()).unwrap();
        assert_eq!(output, "Max Score: 0 | 0\nMax Score: 0 | 1 | A\n");
    }

    #[test]
    fn test_home_links_sample_channel() {
        let mut view = TerminalView::new(Vec::new());
        view.render_home();

        let output = String::from_utf8(view.into_inner()).unwrap();
        assert!(output.contains("numerica /rothiotome"));
    }
}
