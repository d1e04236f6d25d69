use std::io::{self, BufRead, Write};

use mailbox_chess::config::AppConfig;
use mailbox_chess::engine::{ChessError, Game, Move, PieceKind};

fn main() -> io::Result<()> {
    let config = AppConfig::from_env();

    // Logs go to stderr so the board on stdout stays readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.as_str().into()),
        )
        .with_writer(io::stderr)
        .init();

    let mut game = Game::with_history_capacity(config.history_capacity);
    tracing::info!(
        game_id = %game.id,
        player = %config.player_side,
        "mailbox-chess v{} ready",
        env!("CARGO_PKG_VERSION")
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    writeln!(stdout, "{}", game.board().board_string())?;

    loop {
        let label = if game.side_to_move() == config.player_side {
            "You"
        } else {
            "Them"
        };
        write!(stdout, "{label} ({}) > ", game.side_to_move())?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        match line.trim() {
            "" => continue,
            "quit" | "exit" => break,
            "undo" => match game.takeback() {
                Ok(mv) => writeln!(stdout, "Took back {mv}")?,
                Err(e) => writeln!(stdout, "{e}")?,
            },
            "moves" => match game.legal_moves() {
                Ok(moves) => {
                    let list: Vec<String> = moves.iter().map(Move::to_string).collect();
                    writeln!(stdout, "{}", list.join(" "))?;
                }
                Err(e) => writeln!(stdout, "{e}")?,
            },
            text => match play(&mut game, text) {
                Ok(mv) => writeln!(stdout, "{label}: {mv}")?,
                Err(e) => {
                    writeln!(stdout, "{e}")?;
                    continue;
                }
            },
        }

        writeln!(stdout, "{}", game.board().board_string())?;
        match game.status() {
            Ok(status) if status.is_game_over() => {
                writeln!(stdout, "{status}")?;
                break;
            }
            Ok(status) => writeln!(stdout, "{status}")?,
            Err(e) => writeln!(stdout, "{e}")?,
        }
    }

    Ok(())
}

/// Parse coordinate text, with an optional fifth character naming the
/// promotion piece ("e7e8q").
fn play(game: &mut Game, text: &str) -> Result<Move, ChessError> {
    let (coords, promotion) = if text.len() == 5 && text.is_ascii() {
        (&text[..4], text[4..].chars().next())
    } else {
        (text, None)
    };
    let mut request = Game::parse_coordinate_move(coords)?;
    if let Some(c) = promotion {
        let (_, kind) = PieceKind::from_char(c)
            .ok_or_else(|| ChessError::InvalidPromotion(format!("unknown piece '{c}'")))?;
        request.promotion = Some(kind);
    }
    game.attempt_move(request)
}
