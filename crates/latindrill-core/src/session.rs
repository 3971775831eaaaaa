//! The game session: owns the generator, the current round and the lifetime
//! progress record, and carries out the effects the round state machine
//! requests.
//!
//! Events are processed one at a time. Ending or restarting a round disarms
//! the clock before anything else happens, and ticks stamped for any round
//! other than the current one are dropped.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::clock::ManualClock;
use crate::generator::ChallengeGenerator;
use crate::model::{Difficulty, DifficultyTable, Mode};
use crate::progress::PersistedProgress;
use crate::progression::{self, ProgressUpdate};
use crate::round::{
    Effect, FeedbackEvent, Round, RoundContent, RoundId, RoundSummary, RoundView, Selection,
};
use crate::traits::{Clock, NoopSpeaker, ProgressStore, Speaker};

/// Callback fired once per round on the transition to ended.
pub type RoundEndHook = Box<dyn FnMut(&RoundSummary, &ProgressUpdate)>;

/// Inputs accepted by [`Game::handle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A clock tick armed for `round`.
    Tick { round: RoundId },
    Select(Selection),
    Advance,
    Restart,
}

fn started(view: RoundView) -> FeedbackEvent {
    FeedbackEvent::RoundStarted {
        round: view.round,
        seconds_remaining: view.seconds_remaining,
    }
}

pub struct Game {
    generator: ChallengeGenerator,
    rng: ChaCha8Rng,
    difficulties: DifficultyTable,
    progress: PersistedProgress,
    store: Box<dyn ProgressStore>,
    speaker: Box<dyn Speaker>,
    clock: Box<dyn Clock>,
    on_round_end: Option<RoundEndHook>,
    round: Option<Round>,
    last_id: RoundId,
    last_update: Option<ProgressUpdate>,
}

impl Game {
    /// Create a session and load lifetime progress from `store`.
    ///
    /// A store that cannot be read is logged and replaced by default progress.
    pub fn new(generator: ChallengeGenerator, store: Box<dyn ProgressStore>) -> Self {
        let progress = match store.load() {
            Ok(progress) => progress,
            Err(e) => {
                tracing::error!("failed to load progress from {}: {e:#}", store.name());
                PersistedProgress::default()
            }
        };

        Self {
            generator,
            rng: ChaCha8Rng::from_entropy(),
            difficulties: DifficultyTable::default(),
            progress,
            store,
            speaker: Box::new(NoopSpeaker),
            clock: Box::new(ManualClock::new()),
            on_round_end: None,
            round: None,
            last_id: 0,
            last_update: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self
    }

    pub fn with_difficulties(mut self, difficulties: DifficultyTable) -> Self {
        self.difficulties = difficulties;
        self
    }

    pub fn with_speaker(mut self, speaker: Box<dyn Speaker>) -> Self {
        self.speaker = speaker;
        self
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn on_round_end(mut self, hook: impl FnMut(&RoundSummary, &ProgressUpdate) + 'static) -> Self {
        self.on_round_end = Some(Box::new(hook));
        self
    }

    pub fn progress(&self) -> &PersistedProgress {
        &self.progress
    }

    pub fn generator(&self) -> &ChallengeGenerator {
        &self.generator
    }

    pub fn round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    pub fn view(&self) -> Option<RoundView> {
        self.round.as_ref().map(Round::view)
    }

    /// Progression result of the most recently ended round.
    pub fn last_update(&self) -> Option<&ProgressUpdate> {
        self.last_update.as_ref()
    }

    /// Round currently armed on the clock.
    pub fn armed_round(&self) -> Option<RoundId> {
        self.clock.armed()
    }

    pub fn set_sound(&mut self, on: bool) {
        if self.progress.settings.sound != on {
            self.progress.settings.sound = on;
            self.persist();
        }
    }

    /// Begin a fresh round, discarding any round in progress.
    pub fn start_round(&mut self, difficulty: Difficulty, mode: Mode) -> RoundView {
        self.clock.disarm();
        if self.progress.player.difficulty != difficulty {
            self.progress.player.difficulty = difficulty;
            self.persist();
        }

        let round = self.build_round(difficulty, mode);
        let view = round.view();
        self.round = Some(round);
        view
    }

    /// Start the next round once the current one has ended.
    ///
    /// Returns `None` while a round is still active or before any round.
    pub fn advance_round(&mut self) -> Option<RoundView> {
        let current = self.round.as_ref()?;
        if current.is_active() {
            return None;
        }
        let (difficulty, mode) = (current.difficulty(), current.mode());
        Some(self.start_round(difficulty, mode))
    }

    /// Replace the current round with a fresh one, whatever its phase.
    pub fn restart_round(&mut self) -> Option<RoundView> {
        let current = self.round.as_ref()?;
        let (difficulty, mode) = (current.difficulty(), current.mode());
        tracing::debug!("restarting round {}", current.id());
        Some(self.start_round(difficulty, mode))
    }

    pub fn submit_selection(&mut self, selection: &Selection) -> FeedbackEvent {
        let Some(round) = self.round.as_mut() else {
            return FeedbackEvent::Ignored;
        };
        let transition = round.select(selection);
        self.apply(transition.effects);
        transition.feedback
    }

    /// Deliver a tick stamped with `stamp`. Ticks for superseded rounds are no-ops.
    pub fn tick(&mut self, stamp: RoundId) -> FeedbackEvent {
        let Some(round) = self.round.as_mut() else {
            return FeedbackEvent::Ignored;
        };
        if round.id() != stamp {
            tracing::debug!("dropping stale tick for round {stamp}");
            return FeedbackEvent::Ignored;
        }
        let transition = round.tick();
        self.apply(transition.effects);
        transition.feedback
    }

    /// Advance the clock by one second and deliver the tick, if armed.
    pub fn pump_tick(&mut self) -> FeedbackEvent {
        match self.clock.advance() {
            Some(stamp) => self.tick(stamp),
            None => FeedbackEvent::Ignored,
        }
    }

    /// Single entry point for event-loop drivers.
    pub fn handle(&mut self, event: Event) -> FeedbackEvent {
        match event {
            Event::Tick { round } => self.tick(round),
            Event::Select(selection) => self.submit_selection(&selection),
            Event::Advance => self.advance_round().map_or(FeedbackEvent::Ignored, started),
            Event::Restart => self.restart_round().map_or(FeedbackEvent::Ignored, started),
        }
    }

    fn build_round(&mut self, difficulty: Difficulty, mode: Mode) -> Round {
        let settings = *self.difficulties.get(difficulty);
        let content = match mode {
            Mode::Matching => RoundContent::matching(
                self.generator.matching(settings.match_pairs, &mut self.rng),
            ),
            Mode::Construction => RoundContent::construction(
                self.generator.construction(settings.adjectives, &mut self.rng),
            ),
        };

        self.last_id += 1;
        let round = Round::new(self.last_id, difficulty, settings, content);
        self.clock.arm(round.id());
        tracing::debug!("round {} started: {mode} on {difficulty}", round.id());
        round
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Speak(text) => {
                    if self.progress.settings.sound {
                        self.speaker.speak(&text);
                    }
                }
                Effect::StopTimer => self.clock.disarm(),
                Effect::RoundEnded(summary) => self.finish(summary),
            }
        }
    }

    fn finish(&mut self, summary: RoundSummary) {
        tracing::info!(
            "round {} ended ({}): score {}, best combo {}",
            summary.round,
            summary.reason,
            summary.score,
            summary.max_combo
        );

        let update = progression::record(&mut self.progress, &summary);
        self.persist();

        if let Some(hook) = self.on_round_end.as_mut() {
            hook(&summary, &update);
        }
        self.last_update = Some(update);
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(&self.progress) {
            tracing::error!("failed to save progress to {}: {e:#}", self.store.name());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::Lexicon;
    use crate::round::{BoardView, EndReason, Phase};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct SharedStore {
        saved: Rc<RefCell<Vec<PersistedProgress>>>,
        fail: bool,
    }

    impl ProgressStore for SharedStore {
        fn name(&self) -> &str {
            "shared"
        }

        fn load(&self) -> anyhow::Result<PersistedProgress> {
            Ok(self.saved.borrow().last().cloned().unwrap_or_default())
        }

        fn save(&self, progress: &PersistedProgress) -> anyhow::Result<()> {
            if self.fail {
                anyhow::bail!("disk full");
            }
            self.saved.borrow_mut().push(progress.clone());
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct SharedSpeaker(Rc<RefCell<Vec<String>>>);

    impl Speaker for SharedSpeaker {
        fn speak(&self, text: &str) {
            self.0.borrow_mut().push(text.to_string());
        }
    }

    fn game(store: SharedStore) -> Game {
        let generator = ChallengeGenerator::new(Lexicon::builtin()).unwrap();
        Game::new(generator, Box::new(store)).with_seed(42)
    }

    fn with_recorder(game: Game) -> (Game, Rc<RefCell<Vec<RoundSummary>>>) {
        let ended = Rc::new(RefCell::new(Vec::new()));
        let sink = ended.clone();
        let game = game.on_round_end(move |summary, _| sink.borrow_mut().push(summary.clone()));
        (game, ended)
    }

    fn solve_matching(game: &mut Game) {
        let ids: Vec<String> = match game.view().unwrap().board {
            BoardView::Matching { latin, .. } => latin.into_iter().map(|c| c.id).collect(),
            other => panic!("unexpected board {other:?}"),
        };
        for id in ids {
            game.submit_selection(&Selection::Pair {
                latin: id.clone(),
                meaning: id,
            });
        }
    }

    #[test]
    fn timer_expiry_fires_hook_once_and_saves() {
        let store = SharedStore::default();
        let (mut game, ended) = with_recorder(game(store.clone()));
        let view = game.start_round(Difficulty::Easy, Mode::Matching);
        assert_eq!(view.seconds_remaining, 90);
        assert_eq!(game.armed_round(), Some(view.round));

        for _ in 0..90 {
            game.pump_tick();
        }
        assert_eq!(ended.borrow().len(), 1);
        assert_eq!(ended.borrow()[0].reason, EndReason::TimeExpired);
        assert_eq!(game.armed_round(), None);

        // Nothing left to tick.
        assert_eq!(game.pump_tick(), FeedbackEvent::Ignored);
        assert_eq!(game.tick(view.round), FeedbackEvent::Ignored);
        assert_eq!(ended.borrow().len(), 1);
        assert!(!store.saved.borrow().is_empty());
    }

    #[test]
    fn completed_round_updates_progress() {
        let store = SharedStore::default();
        let (mut game, ended) = with_recorder(game(store.clone()));
        game.start_round(Difficulty::Normal, Mode::Matching);
        solve_matching(&mut game);

        let summary = ended.borrow()[0].clone();
        assert_eq!(summary.reason, EndReason::RoundComplete);
        assert_eq!(summary.max_combo, 5);
        assert_eq!(game.progress().best.high_score, summary.score);
        assert_eq!(game.progress().best.total_xp, u64::from(summary.score));
        assert_eq!(store.saved.borrow().last(), Some(game.progress()));
        assert_eq!(game.last_update().map(|u| u.xp_gained), Some(u64::from(summary.score)));
    }

    #[test]
    fn stale_tick_after_restart_is_ignored() {
        let (mut game, ended) = with_recorder(game(SharedStore::default()));
        let first = game.start_round(Difficulty::Hard, Mode::Construction);
        game.pump_tick();

        let second = game.restart_round().unwrap();
        assert_ne!(first.round, second.round);
        assert_eq!(second.seconds_remaining, 60);

        assert_eq!(game.handle(Event::Tick { round: first.round }), FeedbackEvent::Ignored);
        assert_eq!(game.view().unwrap().seconds_remaining, 60);
        assert!(ended.borrow().is_empty());

        assert_eq!(
            game.handle(Event::Tick { round: second.round }),
            FeedbackEvent::Tick { seconds_remaining: 59 }
        );
    }

    #[test]
    fn advance_only_after_round_ends() {
        let mut game = game(SharedStore::default());
        assert!(game.advance_round().is_none());

        game.start_round(Difficulty::Easy, Mode::Matching);
        assert!(game.advance_round().is_none());
        assert_eq!(game.handle(Event::Advance), FeedbackEvent::Ignored);
        assert!(matches!(
            game.handle(Event::Restart),
            FeedbackEvent::RoundStarted { seconds_remaining: 90, .. }
        ));
        let first = game.view().unwrap();

        solve_matching(&mut game);
        assert_eq!(game.view().unwrap().phase, Phase::Ended(EndReason::RoundComplete));

        let next = game.advance_round().unwrap();
        assert_ne!(next.round, first.round);
        assert_eq!(next.phase, Phase::Active);
        assert_eq!(next.score, 0);
        assert_eq!(next.combo, 0);
        assert_eq!(next.seconds_remaining, 90);
        assert_eq!(game.armed_round(), Some(next.round));
    }

    #[test]
    fn speaker_respects_sound_setting() {
        let speaker = SharedSpeaker::default();
        let mut game = game(SharedStore::default()).with_speaker(Box::new(speaker.clone()));
        game.start_round(Difficulty::Easy, Mode::Matching);
        solve_matching(&mut game);
        assert_eq!(speaker.0.borrow().len(), 4);

        game.set_sound(false);
        game.advance_round();
        solve_matching(&mut game);
        assert_eq!(speaker.0.borrow().len(), 4);
    }

    #[test]
    fn save_failure_does_not_alter_game_state() {
        let store = SharedStore {
            fail: true,
            ..SharedStore::default()
        };
        let (mut game, ended) = with_recorder(game(store));
        game.start_round(Difficulty::Easy, Mode::Matching);
        solve_matching(&mut game);

        assert_eq!(ended.borrow().len(), 1);
        assert!(game.progress().best.total_xp > 0);
    }

    #[test]
    fn progress_loads_from_store() {
        let store = SharedStore::default();
        let mut saved = PersistedProgress::default();
        saved.best.total_xp = 700;
        saved.collection.unlocked = vec!["laurel".into()];
        store.saved.borrow_mut().push(saved);

        let mut game = game(store);
        assert_eq!(game.progress().best.total_xp, 700);
        game.start_round(Difficulty::Easy, Mode::Matching);
        solve_matching(&mut game);
        assert_eq!(game.last_update().and_then(|u| u.unlocked.clone()).as_deref(), Some("stylus"));
    }

    #[test]
    fn selections_without_round_are_ignored() {
        let mut game = game(SharedStore::default());
        assert_eq!(
            game.submit_selection(&Selection::Tile { id: 0 }),
            FeedbackEvent::Ignored
        );
        assert!(game.restart_round().is_none());
        assert_eq!(game.pump_tick(), FeedbackEvent::Ignored);
    }
}
