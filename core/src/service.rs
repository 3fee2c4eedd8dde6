use core::fmt;
use core::time::Duration;
use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::*;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameResult {
    #[default]
    None,
    Won,
    Lost,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    #[default]
    NotStarted,
    Active,
    Ended,
}

impl GamePhase {
    pub fn is_active(self) -> bool {
        self == Self::Active
    }

    pub fn is_ended(self) -> bool {
        self == Self::Ended
    }
}

/// Counters and timing of the current game.
#[derive(Clone, Debug, PartialEq)]
pub struct GameState {
    pub flagged_cells_count: CellCount,
    pub revealed_cells_count: CellCount,
    /// Mines minus flags, negative when the player over-flags.
    pub remaining_mines: i32,
    pub total_cells: CellCount,
    pub mine_count: CellCount,
    pub result: GameResult,
    pub started_at: Instant,
    pub ended_at: Option<Instant>,
    pub duration: Option<Duration>,
    pub is_completed: bool,
}

impl GameState {
    fn new(board: &Board) -> Self {
        let mine_count = board.mine_count();
        Self {
            flagged_cells_count: 0,
            revealed_cells_count: 0,
            remaining_mines: i32::from(mine_count),
            total_cells: board.bounds().total_cells(),
            mine_count,
            result: GameResult::None,
            started_at: Instant::now(),
            ended_at: None,
            duration: None,
            is_completed: false,
        }
    }

    /// Time since the game started, frozen once it ends.
    pub fn elapsed(&self) -> Duration {
        self.duration.unwrap_or_else(|| self.started_at.elapsed())
    }

    pub fn summary(&self) -> GameSummary {
        GameSummary {
            result: self.result,
            duration: self.elapsed(),
            flagged_cells_count: self.flagged_cells_count,
            revealed_cells_count: self.revealed_cells_count,
            remaining_mines: self.remaining_mines,
        }
    }

    fn update_counts(&mut self, board: &Board) {
        self.revealed_cells_count = board.count_cells(Cell::is_revealed);
        self.flagged_cells_count = board.count_cells(Cell::is_flagged);
        self.remaining_mines = i32::from(self.mine_count) - i32::from(self.flagged_cells_count);
    }

    fn finalize(&mut self, result: GameResult) {
        if self.is_completed {
            return;
        }
        let now = Instant::now();
        self.result = result;
        self.ended_at = Some(now);
        self.duration = Some(now.duration_since(self.started_at));
        self.is_completed = true;
    }
}

/// Payload of the end-of-game events.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GameSummary {
    pub result: GameResult,
    pub duration: Duration,
    pub flagged_cells_count: CellCount,
    pub revealed_cells_count: CellCount,
    pub remaining_mines: i32,
}

/// Result of a single player command.
#[derive(Clone, Debug, PartialEq)]
pub struct MoveReport<T> {
    pub outcome: T,
    pub state: GameState,
    pub is_active: bool,
}

/// Cells that were flagged without holding a mine when the game was lost.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WrongFlagRegistry {
    cells: HashSet<CellId>,
}

impl WrongFlagRegistry {
    pub fn mark(&mut self, id: CellId) -> bool {
        self.cells.insert(id)
    }

    pub fn is_wrong_flag(&self, id: &str) -> bool {
        self.cells.contains(id)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CellId> {
        self.cells.iter()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }
}

#[derive(Clone, Debug)]
struct Game {
    board: Board,
    state: GameState,
}

/// Runs games: builds boards, routes player commands, tracks the lifecycle and publishes events.
pub struct GameService {
    config: GameConfig,
    board_factory: BoardFactory,
    generator: Box<dyn MinefieldGenerator + Send>,
    rules: GameRules,
    interaction: CellInteractionService,
    events: EventBus,
    wrong_flags: WrongFlagRegistry,
    game: Option<Game>,
    phase: GamePhase,
    first_move_pending: bool,
}

impl GameService {
    /// A service with randomly placed mines.
    pub fn new(config: GameConfig) -> Self {
        Self::with_generator(config, RandomMinefieldGenerator::from_clock())
    }

    pub fn with_generator(
        config: GameConfig,
        generator: impl MinefieldGenerator + Send + 'static,
    ) -> Self {
        let rules = GameRules;
        Self {
            config,
            board_factory: BoardFactory::default(),
            generator: Box::new(generator),
            rules,
            interaction: CellInteractionService::new(rules),
            events: EventBus::new(),
            wrong_flags: WrongFlagRegistry::default(),
            game: None,
            phase: GamePhase::NotStarted,
            first_move_pending: false,
        }
    }

    pub fn with_board_factory(mut self, board_factory: BoardFactory) -> Self {
        self.board_factory = board_factory;
        self
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase.is_active()
    }

    pub fn game_state(&self) -> Option<&GameState> {
        self.game.as_ref().map(|game| &game.state)
    }

    pub fn board(&self) -> Option<&Board> {
        self.game.as_ref().map(|game| &game.board)
    }

    pub fn board_snapshot(&self) -> Option<BoardSnapshot> {
        self.board().map(Board::snapshot)
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    pub fn wrong_flags(&self) -> &WrongFlagRegistry {
        &self.wrong_flags
    }

    pub fn is_wrong_flag(&self, id: &str) -> bool {
        self.wrong_flags.is_wrong_flag(id)
    }

    /// What a renderer should draw for the cell at `position`.
    pub fn cell_view(&self, position: Position) -> Result<CellView> {
        let board = self.board().ok_or(GameError::NotActive)?;
        let cell = board.cell_at(position)?;
        Ok(cell.snapshot().view(self.is_wrong_flag(cell.id().as_str())))
    }

    /// Replaces any current game with a fresh board.
    ///
    /// On failure the previous game, if any, is left untouched.
    pub fn start_new_game(&mut self) -> Result<GameState> {
        let board = self.generate_board()?;
        let state = GameState::new(&board);

        self.wrong_flags.clear();
        self.game = Some(Game {
            board,
            state: state.clone(),
        });
        self.phase = GamePhase::Active;
        self.first_move_pending = true;

        log::debug!(
            "Started {} game with {} mines",
            self.config.bounds(),
            state.mine_count
        );
        self.events.publish(&GameEvent::GameStarted);
        Ok(state)
    }

    /// Switches to `config` and starts a game with it, keeping the old configuration on failure.
    pub fn start_new_game_with(&mut self, config: GameConfig) -> Result<GameState> {
        let previous = core::mem::replace(&mut self.config, config);
        let started = self.start_new_game();
        if started.is_err() {
            self.config = previous;
        }
        started
    }

    fn generate_board(&mut self) -> Result<Board> {
        let mut board = self.board_factory.create(self.config.bounds());
        let positions = self.generator.mine_positions(&self.config);
        board.place_mines(&positions)?;

        let expected = self.config.mines_count();
        let actual = board.mine_count();
        if actual != expected {
            log::warn!("Generator placed {} mines, expected {}", actual, expected);
            return Err(GameError::MineCountMismatch { expected, actual });
        }

        NeighborService::calculate_mine_counts_for_board(&mut board)?;
        Ok(board)
    }

    pub fn reveal_cell(&mut self, position: Position) -> Result<MoveReport<RevealOutcome>> {
        self.check_active()?;
        let Some(game) = self.game.as_mut() else {
            return Err(GameError::NotActive);
        };

        let cell = game.board.cell_at(position)?;
        if !self.rules.can_reveal_cell(cell) {
            log::warn!("Rejected reveal of {} in state {:?}", position, cell.state());
            return Err(RuleViolation::NotRevealable.into());
        }

        if self.first_move_pending {
            self.first_move_pending = false;
            self.events.publish(&GameEvent::FirstMove { position });
        }

        let outcome = self.interaction.reveal_cell(&mut game.board, position)?;
        game.state.update_counts(&game.board);
        let result = self.rules.evaluate(&game.board);

        self.publish_reveal(&outcome);
        if result != GameResult::None {
            self.end_game(result);
        }
        self.report(outcome)
    }

    pub fn toggle_cell_flag(&mut self, position: Position) -> Result<MoveReport<FlagOutcome>> {
        self.check_active()?;
        let Some(game) = self.game.as_mut() else {
            return Err(GameError::NotActive);
        };

        let outcome = match self.interaction.toggle_cell_flag(&mut game.board, position) {
            Ok(outcome) => outcome,
            Err(err) => {
                log::warn!("Rejected flag toggle at {}: {}", position, err);
                return Err(err);
            }
        };
        game.state.update_counts(&game.board);

        self.events.publish(&GameEvent::CellFlagged {
            position,
            cell: outcome.cell.clone(),
            action: outcome.action,
        });
        self.report(outcome)
    }

    fn check_active(&self) -> Result<()> {
        if self.phase.is_active() && self.game.is_some() {
            Ok(())
        } else {
            log::warn!("Rejected command while {:?}", self.phase);
            Err(GameError::NotActive)
        }
    }

    fn publish_reveal(&mut self, outcome: &RevealOutcome) {
        let origin = outcome.cell();
        self.events.publish(&GameEvent::CellRevealed {
            position: origin.position,
            cell: origin.clone(),
            kind: outcome.kind(),
        });
        for entry in outcome.cascade() {
            self.events.publish(&GameEvent::CellRevealed {
                position: entry.cell.position,
                cell: entry.cell.clone(),
                kind: entry.kind,
            });
        }
    }

    fn end_game(&mut self, result: GameResult) {
        let Some(game) = self.game.as_mut() else {
            return;
        };

        let (mines, wrong_flags) = if result == GameResult::Lost {
            let mines = self.interaction.reveal_all_mines(&mut game.board);
            let wrong_flags = self.interaction.find_wrong_flags(&game.board);
            (mines, wrong_flags)
        } else {
            (Vec::new(), Vec::new())
        };
        self.interaction.disable_all_cells(&mut game.board);

        game.state.finalize(result);
        let summary = game.state.summary();
        self.phase = GamePhase::Ended;
        log::debug!("Game {:?} after {:?}", result, summary.duration);

        for cell in &wrong_flags {
            self.wrong_flags.mark(cell.id.clone());
        }
        for cell in mines {
            self.events.publish(&GameEvent::CellRevealed {
                position: cell.position,
                cell,
                kind: RevealKind::MineReveal,
            });
        }
        for cell in wrong_flags {
            self.events.publish(&GameEvent::CellRevealed {
                position: cell.position,
                cell,
                kind: RevealKind::WrongFlag,
            });
        }

        let event = match result {
            GameResult::Lost => GameEvent::GameLost { summary },
            _ => GameEvent::GameWon { summary },
        };
        self.events.publish(&event);
    }

    fn report<T>(&self, outcome: T) -> Result<MoveReport<T>> {
        let state = self.game_state().ok_or(GameError::NotActive)?.clone();
        Ok(MoveReport {
            outcome,
            state,
            is_active: self.is_active(),
        })
    }
}

impl fmt::Debug for GameService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameService")
            .field("config", &self.config)
            .field("phase", &self.phase)
            .field("game", &self.game)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;
    use std::sync::{Arc, Mutex};

    fn service(rows: Coord, cols: Coord, percentage: f64, mines: &[Coord2]) -> GameService {
        let config = GameConfig::new(rows, cols, percentage).unwrap();
        let mut service =
            GameService::with_generator(config, FixedMinefieldGenerator::new(mines.iter().copied()));
        service.start_new_game().unwrap();
        service
    }

    fn record(service: &mut GameService) -> Arc<Mutex<Vec<GameEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        service.events_mut().subscribe_all(move |event| {
            sink.lock().unwrap().push(event.clone());
            Ok(())
        });
        events
    }

    fn reveal_kinds(events: &[GameEvent]) -> Vec<(Position, RevealKind)> {
        events
            .iter()
            .filter_map(|event| match event {
                GameEvent::CellRevealed { position, kind, .. } => Some((*position, *kind)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn commands_before_start_are_rejected() {
        let mut service = GameService::new(GameConfig::beginner());

        assert_eq!(service.phase(), GamePhase::NotStarted);
        assert!(service.game_state().is_none());
        assert_eq!(
            service.reveal_cell(Position::new(0, 0)).err(),
            Some(GameError::NotActive)
        );
        assert_eq!(
            service.toggle_cell_flag(Position::new(0, 0)).err(),
            Some(GameError::NotActive)
        );
    }

    #[test]
    fn start_builds_a_sealed_board() {
        let mut service = GameService::with_generator(
            GameConfig::beginner(),
            RandomMinefieldGenerator::new(7),
        );
        let events = record(&mut service);

        let state = service.start_new_game().unwrap();

        assert_eq!(state.total_cells, 64);
        assert_eq!(state.mine_count, 10);
        assert_eq!(state.remaining_mines, 10);
        assert_eq!(state.result, GameResult::None);
        assert!(!state.is_completed);
        assert!(service.is_active());
        let board = service.board().unwrap();
        assert!(board.is_sealed());
        assert_eq!(board.hidden_cells().len(), 64);
        assert_eq!(*events.lock().unwrap(), [GameEvent::GameStarted]);
    }

    #[test]
    fn cascade_into_win() {
        let mut service = service(5, 5, 4.0, &[(0, 0)]);
        let events = record(&mut service);

        let report = service.reveal_cell(Position::new(4, 4)).unwrap();

        assert_eq!(report.outcome.kind(), RevealKind::Cascade);
        assert_eq!(report.outcome.cascade().len(), 23);
        assert!(!report.is_active);
        assert_eq!(report.state.result, GameResult::Won);
        assert_eq!(report.state.revealed_cells_count, 24);
        assert!(report.state.is_completed);
        assert!(report.state.ended_at.is_some());
        assert_eq!(service.phase(), GamePhase::Ended);
        assert!(service.board().unwrap().cells().all(Cell::is_disabled));

        let events = events.lock().unwrap();
        assert_eq!(
            events.first(),
            Some(&GameEvent::FirstMove {
                position: Position::new(4, 4)
            })
        );
        assert_eq!(reveal_kinds(&events).len(), 24);
        assert!(matches!(
            events.last(),
            Some(GameEvent::GameWon { summary }) if summary.result == GameResult::Won
        ));
    }

    #[test]
    fn mine_hit_loses_and_uncovers_mines() {
        let mut service = service(5, 5, 8.0, &[(0, 0), (0, 4)]);
        service.toggle_cell_flag(Position::new(0, 4)).unwrap();
        service.toggle_cell_flag(Position::new(4, 4)).unwrap();
        let events = record(&mut service);

        let report = service.reveal_cell(Position::new(0, 0)).unwrap();

        assert!(report.outcome.is_explosion());
        assert_eq!(report.state.result, GameResult::Lost);
        assert!(!report.is_active);
        assert!(service.is_wrong_flag("cell_4_4"));
        assert!(!service.is_wrong_flag("cell_0_4"));
        assert_eq!(service.wrong_flags().len(), 1);

        let events = events.lock().unwrap();
        assert_eq!(
            reveal_kinds(&events),
            [
                (Position::new(0, 0), RevealKind::Explosion),
                (Position::new(0, 0), RevealKind::MineReveal),
                (Position::new(0, 4), RevealKind::MineReveal),
                (Position::new(4, 4), RevealKind::WrongFlag),
            ]
        );
        assert!(matches!(events.last(), Some(GameEvent::GameLost { .. })));

        let board = service.board().unwrap();
        assert!(board[Position::new(0, 0)].is_exploded());
        assert!(
            board
                .cells()
                .filter(|cell| cell.position() != Position::new(0, 0))
                .all(Cell::is_disabled)
        );
        assert!(GameRules.is_game_lost(board));
        assert_eq!(
            service.reveal_cell(Position::new(2, 2)).err(),
            Some(GameError::NotActive)
        );
    }

    #[test]
    fn ended_game_renders_outcome() {
        let mut service = service(5, 5, 8.0, &[(0, 0), (0, 4)]);
        service.toggle_cell_flag(Position::new(4, 4)).unwrap();
        service.reveal_cell(Position::new(0, 0)).unwrap();

        assert_eq!(
            service.cell_view(Position::new(4, 4)),
            Ok(CellView::WrongFlag)
        );
        assert!(matches!(
            service.cell_view(Position::new(0, 4)),
            Ok(CellView::Disabled {
                contains_mine: true,
                ..
            })
        ));
    }

    #[test]
    fn first_move_is_sent_once_per_game() {
        let mut service = service(5, 5, 8.0, &[(0, 0), (0, 1)]);
        let events = record(&mut service);
        service.toggle_cell_flag(Position::new(1, 0)).unwrap();

        assert!(service.reveal_cell(Position::new(1, 0)).is_err());
        assert!(service.reveal_cell(Position::new(9, 9)).is_err());
        service.reveal_cell(Position::new(1, 1)).unwrap();
        service.reveal_cell(Position::new(1, 2)).unwrap();

        let first_moves: Vec<_> = events
            .lock()
            .unwrap()
            .iter()
            .filter(|event| event.kind() == EventKind::FirstMove)
            .cloned()
            .collect();
        assert_eq!(
            first_moves,
            [GameEvent::FirstMove {
                position: Position::new(1, 1)
            }]
        );
    }

    #[test]
    fn flag_toggle_updates_counts() {
        let mut service = service(5, 5, 4.0, &[(2, 2)]);
        let events = record(&mut service);

        let flagged = service.toggle_cell_flag(Position::new(0, 0)).unwrap();
        assert_eq!(flagged.outcome.action, FlagAction::Flagged);
        assert_eq!(flagged.state.flagged_cells_count, 1);
        assert_eq!(flagged.state.remaining_mines, 0);

        let over = service.toggle_cell_flag(Position::new(0, 1)).unwrap();
        assert_eq!(over.state.remaining_mines, -1);

        let unflagged = service.toggle_cell_flag(Position::new(0, 0)).unwrap();
        assert_eq!(unflagged.outcome.action, FlagAction::Unflagged);
        assert_eq!(unflagged.state.flagged_cells_count, 1);
        assert_eq!(unflagged.state.remaining_mines, 0);
        assert!(service.is_active());
        assert_eq!(events.lock().unwrap().len(), 3);
    }

    #[test]
    fn flagging_a_revealed_cell_is_rejected() {
        let mut service = service(5, 5, 4.0, &[(2, 2)]);
        service.reveal_cell(Position::new(1, 1)).unwrap();

        assert_eq!(
            service.toggle_cell_flag(Position::new(1, 1)).err(),
            Some(RuleViolation::NotFlaggable.into())
        );
        assert_eq!(service.game_state().unwrap().flagged_cells_count, 0);
    }

    #[test]
    fn restart_resets_everything() {
        let mut service = service(5, 5, 8.0, &[(0, 0), (0, 4)]);
        service.toggle_cell_flag(Position::new(4, 4)).unwrap();
        service.reveal_cell(Position::new(0, 0)).unwrap();
        assert!(!service.wrong_flags().is_empty());

        let events = record(&mut service);
        let state = service.start_new_game().unwrap();

        assert!(service.is_active());
        assert!(service.wrong_flags().is_empty());
        assert_eq!(state.flagged_cells_count, 0);
        assert_eq!(service.board().unwrap().hidden_cells().len(), 25);

        service.reveal_cell(Position::new(2, 2)).unwrap();
        let kinds: Vec<EventKind> = events.lock().unwrap().iter().map(GameEvent::kind).collect();
        assert_eq!(
            &kinds[..3],
            [
                EventKind::GameStarted,
                EventKind::FirstMove,
                EventKind::CellRevealed
            ]
        );
    }

    #[test]
    fn mismatched_generator_keeps_previous_game() {
        let config = GameConfig::new(5, 5, 8.0).unwrap();
        let generator = FixedMinefieldGenerator::new([Position::new(1, 1), Position::new(3, 3)]);
        let mut service = GameService::with_generator(config, generator);
        service.start_new_game().unwrap();
        service.toggle_cell_flag(Position::new(0, 0)).unwrap();

        let denser = GameConfig::new(5, 5, 12.0).unwrap();
        assert_eq!(
            service.start_new_game_with(denser),
            Err(GameError::MineCountMismatch {
                expected: 3,
                actual: 2
            })
        );
        assert_eq!(service.config(), &config);
        assert_eq!(service.game_state().unwrap().flagged_cells_count, 1);
        assert!(service.is_active());
    }

    #[test]
    fn switching_configuration() {
        let mut service = GameService::with_generator(
            GameConfig::beginner(),
            RandomMinefieldGenerator::new(3),
        );
        service.start_new_game().unwrap();

        let state = service.start_new_game_with(GameConfig::expert()).unwrap();

        assert_eq!(state.total_cells, 480);
        assert_eq!(state.mine_count, 72);
        assert_eq!(service.board().unwrap().bounds(), Bounds::new(16, 30));
    }

    #[test]
    fn custom_cell_ids() {
        let mut service = GameService::with_generator(
            GameConfig::beginner(),
            RandomMinefieldGenerator::new(3),
        )
        .with_board_factory(BoardFactory::new(|p| {
            CellId::new(format!("tile-{}-{}", p.x(), p.y()))
        }));
        service.start_new_game().unwrap();

        let board = service.board().unwrap();
        assert_eq!(board.position_of("tile-7-7"), Ok(Position::new(7, 7)));
    }

    #[test]
    fn failing_observer_does_not_break_the_game() {
        let mut service = service(5, 5, 4.0, &[(0, 0)]);
        service
            .events_mut()
            .subscribe(EventKind::CellRevealed, |_| panic!("observer bug"));
        service
            .events_mut()
            .subscribe(EventKind::GameWon, |_| Err("cannot save score".into()));

        let report = service.reveal_cell(Position::new(4, 4)).unwrap();

        assert_eq!(report.state.result, GameResult::Won);
        assert_eq!(service.phase(), GamePhase::Ended);
    }

    #[test]
    fn snapshot_tracks_board() {
        let mut service = service(5, 5, 4.0, &[(0, 0)]);
        service.reveal_cell(Position::new(0, 1)).unwrap();

        let snapshot = service.board_snapshot().unwrap();

        assert_eq!(snapshot.cells.len(), 25);
        assert!(snapshot.cells[1].is_revealed());
        assert_eq!(snapshot.cells[1].neighbor_mine_count, 1);
    }

    #[test]
    fn service_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<GameService>();
    }

    #[test]
    fn random_commands_respect_cell_transitions() {
        let rules = GameRules;
        for seed in 0..30 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let mut service = GameService::with_generator(
                GameConfig::beginner(),
                RandomMinefieldGenerator::new(seed),
            );
            let events = record(&mut service);
            service.start_new_game().unwrap();
            let mut opened = HashSet::new();

            for _ in 0..200 {
                if !service.is_active() {
                    service.start_new_game().unwrap();
                    opened.clear();
                }
                let position = Position::new(rng.random_range(0..8), rng.random_range(0..8));
                let before = service.board().unwrap()[position].state();
                events.lock().unwrap().clear();

                if rng.random_range(0..3) == 0 {
                    let flagged = service.toggle_cell_flag(position);
                    assert_eq!(
                        flagged.is_ok(),
                        matches!(before, CellState::Hidden | CellState::Flagged),
                        "seed {seed}, flag {position} in {before:?}"
                    );
                } else {
                    let revealed = service.reveal_cell(position);
                    assert_eq!(
                        revealed.is_ok(),
                        before == CellState::Hidden,
                        "seed {seed}, reveal {position} in {before:?}"
                    );
                    for event in events.lock().unwrap().iter() {
                        if let GameEvent::CellRevealed {
                            position,
                            kind: RevealKind::Explosion | RevealKind::Cascade | RevealKind::Single,
                            ..
                        } = event
                        {
                            assert!(opened.insert(*position), "seed {seed}, {position} opened twice");
                        }
                    }
                }

                let board = service.board().unwrap();
                assert!(!(rules.is_game_won(board) && rules.is_game_lost(board)));
            }
        }
    }

    #[test]
    fn played_out_games_end_exactly_once() {
        let rules = GameRules;
        for seed in 0..20 {
            let mut service = GameService::with_generator(
                GameConfig::beginner(),
                RandomMinefieldGenerator::new(seed),
            );
            service.start_new_game().unwrap();
            let board = service.board().unwrap();
            assert_eq!(board.mine_count(), 10);
            for cell in board.non_mine_cells() {
                let expected = cell
                    .position()
                    .neighbors(board.bounds())
                    .filter(|&neighbor| board[neighbor].contains_mine())
                    .count();
                assert_eq!(usize::from(cell.neighbor_mine_count()), expected);
            }

            for position in Bounds::new(8, 8).positions() {
                if !service.is_active() {
                    break;
                }
                let _ = service.reveal_cell(position);
                let board = service.board().unwrap();
                assert!(!(rules.is_game_won(board) && rules.is_game_lost(board)));
            }

            let state = service.game_state().unwrap();
            assert!(state.is_completed, "seed {seed}");
            assert_ne!(state.result, GameResult::None);
            assert!(state.duration.is_some());
        }
    }
}
