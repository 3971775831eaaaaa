//! The round state machine.
//!
//! A [`Round`] is pure: every input returns a [`Transition`] describing the
//! feedback for the caller and the side effects (speech, timer control, round
//! end) the session layer must carry out. Nothing here touches a clock, a
//! speaker or storage.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::generator::{MatchSample, Puzzle, Tile};
use crate::model::{Difficulty, DifficultySettings, Mode};
use crate::scoring;
use crate::validator::{check_pair, check_sentence};

/// Identity of a round. Every start, advance and restart gets a fresh one.
pub type RoundId = u64;

/// Why a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    TimeExpired,
    RoundComplete,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndReason::TimeExpired => write!(f, "time expired"),
            EndReason::RoundComplete => write!(f, "round complete"),
        }
    }
}

/// Lifecycle phase of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Active,
    Ended(EndReason),
}

/// Final snapshot handed to `on_round_end` and the progression engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub round: RoundId,
    pub mode: Mode,
    pub difficulty: Difficulty,
    pub score: u32,
    pub max_combo: u32,
    pub reason: EndReason,
}

/// A user action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Selection {
    /// Matching mode: a Latin card and a meaning card.
    Pair { latin: String, meaning: String },
    /// Construction mode: tap a tile.
    Tile { id: u32 },
    /// Construction mode: take back the most recently placed tile.
    Undo,
}

/// What the caller should show after an input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeedbackEvent {
    /// The input was not applicable (round ended, item already resolved,
    /// unknown id, answer already full).
    Ignored,
    /// One second elapsed.
    Tick { seconds_remaining: u32 },
    /// A tile was appended to the partial answer.
    Placed {
        tile: u32,
        text: String,
        placed: usize,
        needed: usize,
    },
    Correct {
        awarded: u32,
        score: u32,
        combo: u32,
        feedback: String,
        round_over: bool,
    },
    /// A tile was taken back at the learner's request.
    Removed { tile: u32 },
    Incorrect {
        feedback: String,
        /// The tile taken back off the partial answer, if any.
        removed_tile: Option<u32>,
    },
    /// The clock ran out.
    TimeExpired { summary: RoundSummary },
    /// A fresh round replaced the previous one.
    RoundStarted {
        round: RoundId,
        seconds_remaining: u32,
    },
}

/// Side effects requested by a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Speak(String),
    StopTimer,
    RoundEnded(RoundSummary),
}

/// Output of one state machine step.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub feedback: FeedbackEvent,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn ignored() -> Self {
        Self::from(FeedbackEvent::Ignored)
    }
}

impl From<FeedbackEvent> for Transition {
    fn from(feedback: FeedbackEvent) -> Self {
        Self {
            feedback,
            effects: Vec::new(),
        }
    }
}

/// Per-mode round content and progress.
#[derive(Debug, Clone, PartialEq)]
pub enum RoundContent {
    Matching {
        sample: MatchSample,
        resolved: BTreeSet<String>,
    },
    Construction {
        puzzle: Puzzle,
        /// Tile ids of the partial answer, in placement order.
        placed: Vec<u32>,
    },
}

impl RoundContent {
    pub fn matching(sample: MatchSample) -> Self {
        RoundContent::Matching {
            sample,
            resolved: BTreeSet::new(),
        }
    }

    pub fn construction(puzzle: Puzzle) -> Self {
        RoundContent::Construction {
            puzzle,
            placed: Vec::new(),
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            RoundContent::Matching { .. } => Mode::Matching,
            RoundContent::Construction { .. } => Mode::Construction,
        }
    }
}

/// A card in one column of a matching board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub text: String,
}

/// Mode-specific part of a [`RoundView`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoardView {
    Matching {
        latin: Vec<Card>,
        meanings: Vec<Card>,
        resolved: Vec<String>,
    },
    Construction {
        tiles: Vec<Tile>,
        placed: Vec<u32>,
        needed: usize,
        gloss: String,
        hint: String,
    },
}

/// Read-only snapshot of a round for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundView {
    pub round: RoundId,
    pub mode: Mode,
    pub difficulty: Difficulty,
    pub phase: Phase,
    pub seconds_remaining: u32,
    pub score: u32,
    pub combo: u32,
    pub max_combo: u32,
    pub board: BoardView,
}

/// One round's transient state.
#[derive(Debug, Clone)]
pub struct Round {
    id: RoundId,
    difficulty: Difficulty,
    settings: DifficultySettings,
    phase: Phase,
    seconds_remaining: u32,
    score: u32,
    combo: u32,
    max_combo: u32,
    content: RoundContent,
}

impl Round {
    pub fn new(
        id: RoundId,
        difficulty: Difficulty,
        settings: DifficultySettings,
        content: RoundContent,
    ) -> Self {
        Self {
            id,
            difficulty,
            settings,
            phase: Phase::Active,
            seconds_remaining: settings.round_seconds,
            score: 0,
            combo: 0,
            max_combo: 0,
            content,
        }
    }

    pub fn id(&self) -> RoundId {
        self.id
    }

    pub fn mode(&self) -> Mode {
        self.content.mode()
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    pub fn seconds_remaining(&self) -> u32 {
        self.seconds_remaining
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn max_combo(&self) -> u32 {
        self.max_combo
    }

    pub fn content(&self) -> &RoundContent {
        &self.content
    }

    pub fn summary(&self, reason: EndReason) -> RoundSummary {
        RoundSummary {
            round: self.id,
            mode: self.mode(),
            difficulty: self.difficulty,
            score: self.score,
            max_combo: self.max_combo,
            reason,
        }
    }

    /// One second elapsed. Ends the round when the clock reaches zero.
    pub fn tick(&mut self) -> Transition {
        if !self.is_active() {
            return Transition::ignored();
        }

        self.seconds_remaining = self.seconds_remaining.saturating_sub(1);
        if self.seconds_remaining > 0 {
            return FeedbackEvent::Tick {
                seconds_remaining: self.seconds_remaining,
            }
            .into();
        }

        let mut effects = Vec::new();
        let summary = self.end(EndReason::TimeExpired, &mut effects);
        Transition {
            feedback: FeedbackEvent::TimeExpired { summary },
            effects,
        }
    }

    /// Apply a user selection.
    pub fn select(&mut self, selection: &Selection) -> Transition {
        if !self.is_active() {
            return Transition::ignored();
        }

        match selection {
            Selection::Pair { latin, meaning } => self.select_pair(latin, meaning),
            Selection::Tile { id } => self.select_tile(*id),
            Selection::Undo => self.undo(),
        }
    }

    fn select_pair(&mut self, latin_id: &str, meaning_id: &str) -> Transition {
        let RoundContent::Matching { sample, resolved } = &mut self.content else {
            return Transition::ignored();
        };
        let Some(latin) = sample.item(latin_id) else {
            return Transition::ignored();
        };
        if sample.item(meaning_id).is_none()
            || resolved.contains(latin_id)
            || resolved.contains(meaning_id)
        {
            return Transition::ignored();
        }

        let mut effects = vec![Effect::Speak(latin.latin.clone())];
        let verdict = check_pair(sample, latin_id, meaning_id);
        if !verdict.correct {
            self.combo = 0;
            return Transition {
                feedback: FeedbackEvent::Incorrect {
                    feedback: verdict.feedback,
                    removed_tile: None,
                },
                effects,
            };
        }

        resolved.insert(latin_id.to_string());
        let round_over = resolved.len() == sample.items.len();
        let feedback = self.reward(verdict.feedback, round_over, &mut effects);
        Transition { feedback, effects }
    }

    fn select_tile(&mut self, tile_id: u32) -> Transition {
        let RoundContent::Construction { puzzle, placed } = &mut self.content else {
            return Transition::ignored();
        };
        let needed = puzzle.challenge.tokens.len();
        let Some(tile) = puzzle.tile(tile_id) else {
            return Transition::ignored();
        };
        if placed.contains(&tile_id) || placed.len() >= needed {
            return Transition::ignored();
        }

        placed.push(tile_id);
        let mut effects = vec![Effect::Speak(tile.text.clone())];
        if placed.len() < needed {
            return Transition {
                feedback: FeedbackEvent::Placed {
                    tile: tile_id,
                    text: tile.text.clone(),
                    placed: placed.len(),
                    needed,
                },
                effects,
            };
        }

        let submitted: Vec<&str> = placed
            .iter()
            .filter_map(|id| puzzle.tile(*id))
            .map(|t| t.text.as_str())
            .collect();
        let verdict = check_sentence(&puzzle.challenge, &submitted);
        if verdict.correct {
            let feedback = self.reward(verdict.feedback, true, &mut effects);
            return Transition { feedback, effects };
        }

        // Gentle failure: only the last tile goes back.
        let removed_tile = placed.pop();
        self.combo = 0;
        Transition {
            feedback: FeedbackEvent::Incorrect {
                feedback: verdict.feedback,
                removed_tile,
            },
            effects,
        }
    }

    fn undo(&mut self) -> Transition {
        let RoundContent::Construction { placed, .. } = &mut self.content else {
            return Transition::ignored();
        };
        match placed.pop() {
            Some(tile) => FeedbackEvent::Removed { tile }.into(),
            None => Transition::ignored(),
        }
    }

    fn reward(
        &mut self,
        feedback: String,
        round_over: bool,
        effects: &mut Vec<Effect>,
    ) -> FeedbackEvent {
        self.combo += 1;
        self.max_combo = self.max_combo.max(self.combo);
        let awarded = scoring::award(self.settings.multiplier, self.seconds_remaining, self.combo);
        self.score = self.score.saturating_add(awarded);

        if round_over {
            self.end(EndReason::RoundComplete, effects);
        }

        FeedbackEvent::Correct {
            awarded,
            score: self.score,
            combo: self.combo,
            feedback,
            round_over,
        }
    }

    fn end(&mut self, reason: EndReason, effects: &mut Vec<Effect>) -> RoundSummary {
        self.phase = Phase::Ended(reason);
        let summary = self.summary(reason);
        effects.push(Effect::StopTimer);
        effects.push(Effect::RoundEnded(summary.clone()));
        summary
    }

    pub fn view(&self) -> RoundView {
        let board = match &self.content {
            RoundContent::Matching { sample, resolved } => {
                let latin = sample
                    .latin_column
                    .iter()
                    .filter_map(|id| sample.item(id))
                    .map(|item| Card {
                        id: item.id.clone(),
                        text: item.latin.clone(),
                    })
                    .collect();
                let meanings = sample
                    .meaning_column
                    .iter()
                    .filter_map(|id| sample.item(id))
                    .map(|item| Card {
                        id: item.id.clone(),
                        text: item.meaning.clone(),
                    })
                    .collect();
                BoardView::Matching {
                    latin,
                    meanings,
                    resolved: resolved.iter().cloned().collect(),
                }
            }
            RoundContent::Construction { puzzle, placed } => BoardView::Construction {
                tiles: puzzle.tiles.clone(),
                placed: placed.clone(),
                needed: puzzle.challenge.tokens.len(),
                gloss: puzzle.challenge.gloss.clone(),
                hint: puzzle.challenge.hint.clone(),
            },
        };

        RoundView {
            round: self.id,
            mode: self.mode(),
            difficulty: self.difficulty,
            phase: self.phase,
            seconds_remaining: self.seconds_remaining,
            score: self.score,
            combo: self.combo,
            max_combo: self.max_combo,
            board,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::ChallengeGenerator;
    use crate::lexicon::Lexicon;
    use crate::model::DifficultyTable;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn settings(multiplier: f64, round_seconds: u32) -> DifficultySettings {
        DifficultySettings {
            round_seconds,
            multiplier,
            match_pairs: 4,
            adjectives: false,
        }
    }

    fn matching_round(pairs: usize) -> Round {
        let gen = ChallengeGenerator::new(Lexicon::builtin()).unwrap();
        let sample = gen.matching(pairs, &mut ChaCha8Rng::seed_from_u64(5));
        Round::new(1, Difficulty::Easy, settings(1.0, 30), RoundContent::matching(sample))
    }

    fn construction_round(hard: bool) -> Round {
        let gen = ChallengeGenerator::new(Lexicon::builtin()).unwrap();
        let puzzle = gen.construction(hard, &mut ChaCha8Rng::seed_from_u64(9));
        let difficulty = if hard { Difficulty::Hard } else { Difficulty::Easy };
        let settings = *DifficultyTable::default().get(difficulty);
        Round::new(2, difficulty, settings, RoundContent::construction(puzzle))
    }

    fn item_ids(round: &Round) -> Vec<String> {
        match round.content() {
            RoundContent::Matching { sample, .. } => {
                sample.items.iter().map(|i| i.id.clone()).collect()
            }
            _ => unreachable!(),
        }
    }

    fn pair(latin: &str, meaning: &str) -> Selection {
        Selection::Pair {
            latin: latin.into(),
            meaning: meaning.into(),
        }
    }

    /// Tile ids that spell the expected sentence, in order.
    fn solution(round: &Round) -> Vec<u32> {
        match round.content() {
            RoundContent::Construction { puzzle, .. } => {
                let mut used = Vec::new();
                for token in &puzzle.challenge.tokens {
                    let tile = puzzle
                        .tiles
                        .iter()
                        .find(|t| t.correct && t.text == token.text && !used.contains(&t.id))
                        .unwrap();
                    used.push(tile.id);
                }
                used
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn starts_active_with_full_clock() {
        let round = matching_round(4);
        assert!(round.is_active());
        assert_eq!(round.seconds_remaining(), 30);
        assert_eq!(round.score(), 0);
        assert_eq!(round.combo(), 0);
    }

    #[test]
    fn correct_pairs_build_combo_and_complete_round() {
        let mut round = matching_round(3);
        let ids = item_ids(&round);

        let mut expected_score = 0;
        for (i, id) in ids.iter().enumerate() {
            let t = round.select(&pair(id, id));
            let combo = i as u32 + 1;
            expected_score += scoring::award(1.0, 30, combo);
            match t.feedback {
                FeedbackEvent::Correct {
                    combo: c,
                    score,
                    round_over,
                    ..
                } => {
                    assert_eq!(c, combo);
                    assert_eq!(score, expected_score);
                    assert_eq!(round_over, i == ids.len() - 1);
                }
                other => panic!("unexpected feedback {other:?}"),
            }
        }

        assert_eq!(round.phase(), Phase::Ended(EndReason::RoundComplete));
        assert_eq!(round.max_combo(), 3);
    }

    #[test]
    fn completion_emits_stop_and_summary_once() {
        let mut round = matching_round(1);
        let id = item_ids(&round).remove(0);
        let t = round.select(&pair(&id, &id));
        let ends: Vec<_> = t
            .effects
            .iter()
            .filter(|e| matches!(e, Effect::RoundEnded(_)))
            .collect();
        assert_eq!(ends.len(), 1);
        assert!(t.effects.contains(&Effect::StopTimer));
        assert!(matches!(t.effects[0], Effect::Speak(_)));

        // Further input is ignored.
        assert_eq!(round.select(&pair(&id, &id)).feedback, FeedbackEvent::Ignored);
        assert_eq!(round.tick().feedback, FeedbackEvent::Ignored);
    }

    #[test]
    fn incorrect_pair_resets_combo_without_ending() {
        let mut round = matching_round(4);
        let ids = item_ids(&round);
        round.select(&pair(&ids[0], &ids[0]));
        assert_eq!(round.combo(), 1);

        let t = round.select(&pair(&ids[1], &ids[2]));
        assert!(matches!(t.feedback, FeedbackEvent::Incorrect { .. }));
        assert_eq!(round.combo(), 0);
        assert_eq!(round.max_combo(), 1);
        assert!(round.is_active());
    }

    #[test]
    fn resolved_and_unknown_items_are_ignored() {
        let mut round = matching_round(4);
        let ids = item_ids(&round);
        round.select(&pair(&ids[0], &ids[0]));
        let score = round.score();

        assert_eq!(round.select(&pair(&ids[0], &ids[0])).feedback, FeedbackEvent::Ignored);
        assert_eq!(round.select(&pair(&ids[1], &ids[0])).feedback, FeedbackEvent::Ignored);
        assert_eq!(round.select(&pair("nope", &ids[1])).feedback, FeedbackEvent::Ignored);
        assert_eq!(round.select(&Selection::Tile { id: 0 }).feedback, FeedbackEvent::Ignored);
        assert_eq!(round.score(), score);
        assert_eq!(round.combo(), 1);
    }

    #[test]
    fn huge_multiplier_saturates_score() {
        let gen = ChallengeGenerator::new(Lexicon::builtin()).unwrap();
        let sample = gen.matching(3, &mut ChaCha8Rng::seed_from_u64(5));
        let mut round = Round::new(
            1,
            Difficulty::Easy,
            settings(1e10, 30),
            RoundContent::matching(sample),
        );
        for id in item_ids(&round) {
            round.select(&pair(&id, &id));
        }
        assert_eq!(round.score(), u32::MAX);
        assert_eq!(round.phase(), Phase::Ended(EndReason::RoundComplete));
    }

    #[test]
    fn timer_expires_exactly_once() {
        let mut round = matching_round(4);
        for remaining in (1..30).rev() {
            assert_eq!(
                round.tick().feedback,
                FeedbackEvent::Tick {
                    seconds_remaining: remaining
                }
            );
        }
        let last = round.tick();
        assert!(matches!(last.feedback, FeedbackEvent::TimeExpired { .. }));
        assert_eq!(
            last.effects
                .iter()
                .filter(|e| matches!(e, Effect::RoundEnded(_)))
                .count(),
            1
        );
        assert_eq!(round.phase(), Phase::Ended(EndReason::TimeExpired));

        let again = round.tick();
        assert_eq!(again.feedback, FeedbackEvent::Ignored);
        assert!(again.effects.is_empty());
        assert_eq!(round.seconds_remaining(), 0);
    }

    #[test]
    fn construction_correct_sentence_completes() {
        let mut round = construction_round(true);
        let ids = solution(&round);
        assert_eq!(ids.len(), 4);

        for (i, id) in ids.iter().enumerate() {
            let t = round.select(&Selection::Tile { id: *id });
            if i < ids.len() - 1 {
                assert!(matches!(t.feedback, FeedbackEvent::Placed { placed, .. } if placed == i + 1));
            } else {
                assert!(matches!(t.feedback, FeedbackEvent::Correct { round_over: true, combo: 1, .. }));
            }
            assert!(matches!(t.effects[0], Effect::Speak(_)));
        }
        assert_eq!(round.phase(), Phase::Ended(EndReason::RoundComplete));
        assert!(round.score() > 0);
    }

    #[test]
    fn construction_wrong_order_removes_only_last_tile() {
        let mut round = construction_round(false);
        let mut ids = solution(&round);
        ids.swap(0, 2);

        for id in &ids[..2] {
            round.select(&Selection::Tile { id: *id });
        }
        let t = round.select(&Selection::Tile { id: ids[2] });
        match t.feedback {
            FeedbackEvent::Incorrect { removed_tile, .. } => assert_eq!(removed_tile, Some(ids[2])),
            other => panic!("unexpected feedback {other:?}"),
        }
        match round.content() {
            RoundContent::Construction { placed, .. } => assert_eq!(placed, &ids[..2].to_vec()),
            _ => unreachable!(),
        }
        assert_eq!(round.combo(), 0);
        assert!(round.is_active());
    }

    #[test]
    fn construction_ignores_repeat_and_unknown_tiles() {
        let mut round = construction_round(false);
        let ids = solution(&round);
        round.select(&Selection::Tile { id: ids[0] });
        assert_eq!(round.select(&Selection::Tile { id: ids[0] }).feedback, FeedbackEvent::Ignored);
        assert_eq!(round.select(&Selection::Tile { id: 999 }).feedback, FeedbackEvent::Ignored);
        assert_eq!(round.select(&pair("a", "b")).feedback, FeedbackEvent::Ignored);
    }

    #[test]
    fn undo_takes_back_last_tile_without_scoring() {
        let mut round = construction_round(false);
        let ids = solution(&round);
        assert_eq!(round.select(&Selection::Undo).feedback, FeedbackEvent::Ignored);

        round.select(&Selection::Tile { id: ids[1] });
        assert_eq!(
            round.select(&Selection::Undo).feedback,
            FeedbackEvent::Removed { tile: ids[1] }
        );
        for id in &ids {
            round.select(&Selection::Tile { id: *id });
        }
        assert_eq!(round.phase(), Phase::Ended(EndReason::RoundComplete));
        assert_eq!(round.combo(), 1);

        let mut matching = matching_round(2);
        assert_eq!(matching.select(&Selection::Undo).feedback, FeedbackEvent::Ignored);
    }

    #[test]
    fn view_reflects_board() {
        let round = construction_round(false);
        let view = round.view();
        assert_eq!(view.mode, Mode::Construction);
        assert_eq!(view.phase, Phase::Active);
        match view.board {
            BoardView::Construction { tiles, needed, .. } => {
                assert_eq!(needed, 3);
                assert_eq!(tiles.len(), crate::generator::MAX_TILES);
            }
            other => panic!("unexpected board {other:?}"),
        }

        let round = matching_round(4);
        match round.view().board {
            BoardView::Matching { latin, meanings, resolved } => {
                assert_eq!(latin.len(), 4);
                assert_eq!(meanings.len(), 4);
                assert!(resolved.is_empty());
            }
            other => panic!("unexpected board {other:?}"),
        }
    }
}
