//! The `latindrill play` command.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{self, Instant, Interval};

use latindrill_core::model::{Difficulty, Mode};
use latindrill_core::progression;
use latindrill_core::round::{BoardView, FeedbackEvent, Phase, RoundView, Selection};
use latindrill_core::session::{Event, Game};
use latindrill_core::traits::{NoopSpeaker, Speaker};
use latindrill_store::JsonFileStore;

/// Echoes spoken words to the terminal.
struct EchoSpeaker;

impl Speaker for EchoSpeaker {
    fn speak(&self, text: &str) {
        println!("  >> {text}");
    }
}

/// A parsed line of player input.
#[derive(Debug, Clone, PartialEq)]
enum Command {
    Select(Vec<Selection>),
    Next,
    Restart,
    Sound,
    Show,
    Help,
    Quit,
}

pub async fn execute(
    config_path: Option<PathBuf>,
    difficulty: Option<Difficulty>,
    mode: Mode,
    seed: Option<u64>,
    mute: bool,
) -> Result<()> {
    let config = super::load_config(config_path)?;
    let store = JsonFileStore::new(&config.save_path);
    let speaker: Box<dyn Speaker> = if mute {
        Box::new(NoopSpeaker)
    } else {
        Box::new(EchoSpeaker)
    };
    let mut game = super::open_game(&config, Box::new(store), seed)?.with_speaker(speaker);

    let difficulty = difficulty.unwrap_or(game.progress().player.difficulty);
    println!("Salve, {}! Type 'h' for help.", game.progress().player.name);
    let view = game.start_round(difficulty, mode);
    render(&view);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let period = Duration::from_secs(1);
    let mut interval = time::interval_at(Instant::now() + period, period);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let feedback = game.pump_tick();
                report(&feedback, &game);
            }
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read input")? else {
                    break;
                };
                let Some(view) = game.view() else {
                    break;
                };

                match parse_command(&line, &view) {
                    Ok(Command::Quit) => break,
                    Ok(Command::Help) => print_help(view.mode),
                    Ok(Command::Show) => render(&view),
                    Ok(Command::Sound) => {
                        let on = !game.progress().settings.sound;
                        game.set_sound(on);
                        println!("Sound {}.", if on { "on" } else { "off" });
                    }
                    Ok(Command::Next) => {
                        let feedback = game.handle(Event::Advance);
                        if feedback == FeedbackEvent::Ignored {
                            println!("Finish the round first, or type 'r' to restart it.");
                        }
                        align_ticks(&mut interval, &feedback);
                        report(&feedback, &game);
                    }
                    Ok(Command::Restart) => {
                        let feedback = game.handle(Event::Restart);
                        align_ticks(&mut interval, &feedback);
                        report(&feedback, &game);
                    }
                    Ok(Command::Select(selections)) => {
                        for selection in selections {
                            let feedback = game.handle(Event::Select(selection));
                            report(&feedback, &game);
                        }
                    }
                    Err(message) => println!("{message}"),
                }
            }
        }
    }

    let best = &game.progress().best;
    println!(
        "Vale! Total XP {}, high score {}, best streak {}.",
        best.total_xp, best.high_score, best.best_streak
    );
    Ok(())
}

/// A fresh round gets a whole first second.
fn align_ticks(interval: &mut Interval, feedback: &FeedbackEvent) {
    if matches!(feedback, FeedbackEvent::RoundStarted { .. }) {
        interval.reset();
    }
}

fn parse_command(line: &str, view: &RoundView) -> Result<Command, String> {
    let input = line.trim().to_lowercase();
    match input.as_str() {
        "" => return Ok(Command::Show),
        "q" | "quit" | "exit" => return Ok(Command::Quit),
        "h" | "help" | "?" => return Ok(Command::Help),
        "n" | "next" => return Ok(Command::Next),
        "r" | "restart" => return Ok(Command::Restart),
        "s" | "sound" => return Ok(Command::Sound),
        "u" | "undo" => return Ok(Command::Select(vec![Selection::Undo])),
        _ => {}
    }

    match &view.board {
        BoardView::Matching {
            latin, meanings, ..
        } => {
            let compact: String = input
                .chars()
                .filter(|c| !c.is_whitespace() && *c != '-')
                .collect();
            let split = compact
                .find(|c: char| !c.is_ascii_digit())
                .ok_or_else(|| format!("Pair a number with a letter, e.g. '1b' (got '{input}')."))?;
            let (number, letter) = compact.split_at(split);

            let latin_card = number
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| latin.get(i))
                .ok_or_else(|| format!("No Latin card {number}."))?;
            let meaning_card = letter_index(letter)
                .and_then(|i| meanings.get(i))
                .ok_or_else(|| format!("No meaning card {letter}."))?;

            Ok(Command::Select(vec![Selection::Pair {
                latin: latin_card.id.clone(),
                meaning: meaning_card.id.clone(),
            }]))
        }
        BoardView::Construction { tiles, .. } => {
            let selections = input
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|s| !s.is_empty())
                .map(|token| {
                    token
                        .parse::<usize>()
                        .ok()
                        .and_then(|n| n.checked_sub(1))
                        .and_then(|i| tiles.get(i))
                        .map(|tile| Selection::Tile { id: tile.id })
                        .ok_or_else(|| format!("No tile {token}."))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Command::Select(selections))
        }
    }
}

fn letter_index(letter: &str) -> Option<usize> {
    let mut chars = letter.chars();
    match (chars.next(), chars.next()) {
        (Some(c @ 'a'..='z'), None) => Some(c as usize - 'a' as usize),
        _ => None,
    }
}

fn letter(i: usize) -> char {
    (b'a' + (i % 26) as u8) as char
}

fn print_help(mode: Mode) {
    match mode {
        Mode::Matching => {
            println!("Match each Latin word to its meaning: type a number and a letter, e.g. '2c'.")
        }
        Mode::Construction => println!(
            "Build the Latin sentence: type tile numbers in order, e.g. '3' or '3 7 1'. 'u' takes back a tile."
        ),
    }
    println!("Commands: n(ext) r(estart) s(ound) q(uit), empty line redraws the board.");
}

fn render(view: &RoundView) {
    println!();
    println!(
        "Round {} - {} - {} - {}s left - score {} - combo {}",
        view.round, view.mode, view.difficulty, view.seconds_remaining, view.score, view.combo
    );

    match &view.board {
        BoardView::Matching {
            latin,
            meanings,
            resolved,
        } => {
            for (i, (l, m)) in latin.iter().zip(meanings).enumerate() {
                let done = |id: &str| if resolved.iter().any(|r| r == id) { "*" } else { " " };
                println!(
                    "  {done_l}{:>2}. {:<14} {done_m}{}. {}",
                    i + 1,
                    l.text,
                    letter(i),
                    m.text,
                    done_l = done(&l.id),
                    done_m = done(&m.id),
                );
            }
        }
        BoardView::Construction {
            tiles,
            placed,
            needed,
            gloss,
            hint,
        } => {
            println!("  Translate: {gloss}");
            println!("  Hint: {hint}");
            let offered: Vec<String> = tiles
                .iter()
                .enumerate()
                .filter(|(_, t)| !placed.contains(&t.id))
                .map(|(i, t)| format!("[{}] {}", i + 1, t.text))
                .collect();
            println!("  Tiles: {}", offered.join("  "));

            let mut answer: Vec<&str> = placed
                .iter()
                .filter_map(|id| tiles.iter().find(|t| t.id == *id))
                .map(|t| t.text.as_str())
                .collect();
            answer.resize(*needed, "_");
            println!("  Answer: {}", answer.join(" "));
        }
    }
}

fn report(feedback: &FeedbackEvent, game: &Game) {
    match feedback {
        FeedbackEvent::Ignored => {}
        FeedbackEvent::Tick { seconds_remaining } => {
            if matches!(*seconds_remaining, 30 | 10 | 1..=5) {
                println!("  {seconds_remaining}s left");
            }
        }
        FeedbackEvent::Placed { .. } | FeedbackEvent::Removed { .. } => {
            if let Some(view) = game.view() {
                render(&view);
            }
        }
        FeedbackEvent::Correct {
            awarded,
            score,
            combo,
            feedback,
            round_over,
        } => {
            println!("  [+] {feedback}  +{awarded} (score {score}, combo {combo})");
            if *round_over {
                round_over_message(game);
            } else if let Some(view) = game.view() {
                render(&view);
            }
        }
        FeedbackEvent::Incorrect {
            feedback,
            removed_tile,
        } => {
            println!("  [x] {feedback}");
            if removed_tile.is_some() {
                println!("  The last tile goes back.");
                if let Some(view) = game.view() {
                    render(&view);
                }
            }
        }
        FeedbackEvent::TimeExpired { .. } => {
            println!("  Tempus fugit! Time is up.");
            round_over_message(game);
        }
        FeedbackEvent::RoundStarted { .. } => {
            if let Some(view) = game.view() {
                render(&view);
            }
        }
    }
}

fn round_over_message(game: &Game) {
    let Some(view) = game.view() else {
        return;
    };
    if let Phase::Ended(reason) = view.phase {
        println!(
            "Round over ({reason}): score {}, best combo {}.",
            view.score, view.max_combo
        );
    }

    if let Some(update) = game.last_update() {
        println!("  +{} XP (total {})", update.xp_gained, update.total_xp);
        if update.new_high_score {
            println!("  New high score!");
        }
        if let Some(reward) = update.unlocked.as_deref().and_then(progression::reward) {
            println!("  Unlocked: {} - \"{}\"", reward.name, reward.motto);
        }
    }
    println!("Type 'n' for the next round or 'q' to quit.");
}

#[cfg(test)]
mod tests {
    use super::*;
    use latindrill_core::generator::Tile;
    use latindrill_core::round::Card;

    fn view(board: BoardView) -> RoundView {
        RoundView {
            round: 1,
            mode: match board {
                BoardView::Matching { .. } => Mode::Matching,
                BoardView::Construction { .. } => Mode::Construction,
            },
            difficulty: Difficulty::Easy,
            phase: Phase::Active,
            seconds_remaining: 90,
            score: 0,
            combo: 0,
            max_combo: 0,
            board,
        }
    }

    fn card(id: &str) -> Card {
        Card {
            id: id.into(),
            text: id.into(),
        }
    }

    fn matching() -> RoundView {
        view(BoardView::Matching {
            latin: vec![card("puella:nom"), card("rex:acc")],
            meanings: vec![card("rex:acc"), card("puella:nom")],
            resolved: vec![],
        })
    }

    fn construction() -> RoundView {
        let tile = |id: u32, text: &str| Tile {
            id,
            text: text.into(),
            correct: true,
        };
        view(BoardView::Construction {
            tiles: vec![tile(0, "puella"), tile(1, "portat"), tile(2, "portam")],
            placed: vec![],
            needed: 3,
            gloss: "The girl carries the gate.".into(),
            hint: String::new(),
        })
    }

    #[test]
    fn parses_pairs_in_several_spellings() {
        let expected = Command::Select(vec![Selection::Pair {
            latin: "puella:nom".into(),
            meaning: "puella:nom".into(),
        }]);
        for input in ["1b", "1 b", "1-B", "  1b  "] {
            assert_eq!(parse_command(input, &matching()), Ok(expected.clone()));
        }
    }

    #[test]
    fn rejects_out_of_range_cards() {
        assert!(parse_command("3a", &matching()).is_err());
        assert!(parse_command("1c", &matching()).is_err());
        assert!(parse_command("ab", &matching()).is_err());
        assert!(parse_command("12", &matching()).is_err());
    }

    #[test]
    fn parses_tile_sequences() {
        assert_eq!(
            parse_command("1 2,3", &construction()),
            Ok(Command::Select(vec![
                Selection::Tile { id: 0 },
                Selection::Tile { id: 1 },
                Selection::Tile { id: 2 },
            ]))
        );
        assert!(parse_command("4", &construction()).is_err());
        assert!(parse_command("0", &construction()).is_err());
    }

    #[tokio::test]
    async fn new_round_delays_the_next_tick() {
        let period = Duration::from_secs(1);
        let started = FeedbackEvent::RoundStarted {
            round: 2,
            seconds_remaining: 90,
        };

        // Without a new round the overdue tick fires at once.
        let mut interval = time::interval_at(Instant::now(), period);
        align_ticks(&mut interval, &FeedbackEvent::Ignored);
        assert!(time::timeout(Duration::from_millis(200), interval.tick()).await.is_ok());

        let mut interval = time::interval_at(Instant::now(), period);
        align_ticks(&mut interval, &started);
        assert!(time::timeout(Duration::from_millis(200), interval.tick()).await.is_err());
    }

    #[test]
    fn parses_keywords() {
        assert_eq!(parse_command("q", &matching()), Ok(Command::Quit));
        assert_eq!(parse_command("NEXT", &matching()), Ok(Command::Next));
        assert_eq!(parse_command("", &construction()), Ok(Command::Show));
        assert_eq!(
            parse_command("u", &construction()),
            Ok(Command::Select(vec![Selection::Undo]))
        );
    }
}
