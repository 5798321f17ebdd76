//! Interactive human-vs-computer session.
//!
//! The human always sits in seat 0. After every human `end_turn` the
//! computer plays its whole turn before the session answers. Every
//! accepted action, human or computer, is recorded so the match can be
//! saved as a replay at any point.

use std::io::{self, BufRead, Write};

use tracing::{debug, info, warn};

use breach_core::action::GameAction;
use breach_core::ai::AiPlayer;
use breach_core::data::Ruleset;
use breach_core::engine::{GameEngine, MatchConfig};
use breach_core::error::ActionError;
use breach_core::events::GameEvent;
use breach_core::factions::FactionId;
use breach_core::replay::MatchReplay;
use breach_core::state::{GameState, PlayerIndex};

use crate::game_runner::clock_seed;
use crate::protocol::{Command, Response, StateView, PROTOCOL_VERSION};

/// Seat of the human player.
pub const HUMAN_SEAT: PlayerIndex = 0;
/// Seat of the computer player.
pub const COMPUTER_SEAT: PlayerIndex = 1;

struct ActiveMatch {
    engine: GameEngine,
    replay: MatchReplay,
}

/// One interactive session; may host several matches in sequence.
pub struct PlaySession {
    ruleset: Ruleset,
    ai: AiPlayer,
    current: Option<ActiveMatch>,
    closed: bool,
}

impl PlaySession {
    /// Session using `ruleset` for every match; the computer scores with
    /// the ruleset's heuristic tables.
    #[must_use]
    pub fn new(ruleset: Ruleset) -> Self {
        let ai = AiPlayer::new(ruleset.heuristics.clone());
        Self {
            ruleset,
            ai,
            current: None,
            closed: false,
        }
    }

    /// Whether `quit` has been received.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Engine of the current match, if one is in progress.
    #[must_use]
    pub fn engine(&self) -> Option<&GameEngine> {
        self.current.as_ref().map(|m| &m.engine)
    }

    /// Action log of the current match, if one is in progress.
    #[must_use]
    pub fn replay(&self) -> Option<&MatchReplay> {
        self.current.as_ref().map(|m| &m.replay)
    }

    /// Apply one command and return the responses to send back.
    pub fn handle(&mut self, command: Command) -> Vec<Response> {
        debug!(?command, "Session command");

        match command {
            Command::NewGame {
                faction,
                opponent,
                seed,
            } => vec![self.new_game(faction, opponent, seed.unwrap_or_else(clock_seed))],
            Command::Play { card_index } => self.human_action(GameAction::PlayCard { card_index }),
            Command::EndTurn => self.human_action(GameAction::EndTurn),
            Command::State => match &self.current {
                Some(m) => vec![Response::State(StateView::for_seat(
                    m.engine.state(),
                    HUMAN_SEAT,
                ))],
                None => vec![no_match()],
            },
            Command::SaveReplay { path } => vec![self.save_replay(path)],
            Command::Quit => {
                self.closed = true;
                vec![Response::Bye]
            }
        }
    }

    /// Serve commands from `input` until `quit` or end of input.
    ///
    /// Announces itself with [`Response::Ready`] first. Lines that are not
    /// valid commands get an error response and are otherwise ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input or writing output fails.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<()> {
        write_response(
            &mut output,
            &Response::Ready {
                version: PROTOCOL_VERSION.to_string(),
            },
        )?;

        for line in input.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let responses = match serde_json::from_str::<Command>(line) {
                Ok(command) => self.handle(command),
                Err(e) => vec![Response::error(format!("Invalid command: {e}"))],
            };
            for response in &responses {
                write_response(&mut output, response)?;
            }

            if self.closed {
                break;
            }
        }

        Ok(())
    }

    fn new_game(&mut self, faction: FactionId, opponent: FactionId, seed: u64) -> Response {
        let config = MatchConfig::new(format!("session_{seed}"), faction, opponent, seed);
        let engine = GameEngine::with_ruleset(&config, &self.ruleset);
        info!(%faction, %opponent, seed, "New interactive match");

        let view = StateView::for_seat(engine.state(), HUMAN_SEAT);
        self.current = Some(ActiveMatch {
            engine,
            replay: MatchReplay::new(config),
        });
        Response::State(view)
    }

    fn human_action(&mut self, action: GameAction) -> Vec<Response> {
        let Some(active) = self.current.as_mut() else {
            return vec![no_match()];
        };

        let mut events = match active.engine.apply_action(HUMAN_SEAT, action) {
            Ok(outcome) => {
                active.replay.record(HUMAN_SEAT, action);
                outcome.events
            }
            Err(e) => return vec![Response::rejected(e)],
        };

        let mut rejection = None;
        if action == GameAction::EndTurn && !active.engine.is_game_over() {
            rejection = computer_turn(&self.ai, active, &mut events).err();
        }

        turn_responses(active.engine.state(), events, rejection)
    }

    fn save_replay(&self, path: String) -> Response {
        let Some(active) = &self.current else {
            return no_match();
        };

        let mut replay = active.replay.clone();
        replay.finalize(active.engine.state_hash());

        match replay.save(&path) {
            Ok(()) => Response::ReplaySaved {
                actions: replay.len(),
                path,
            },
            Err(e) => Response::error(format!("Failed to save replay: {e}")),
        }
    }
}

/// Let the computer play its turn, recording each action.
///
/// Stops at the first rejected action; everything applied before it stays
/// applied, with its events in `events`.
fn computer_turn(
    ai: &AiPlayer,
    active: &mut ActiveMatch,
    events: &mut Vec<GameEvent>,
) -> Result<(), ActionError> {
    while !active.engine.is_game_over() && active.engine.state().current_turn == COMPUTER_SEAT {
        let action = ai.choose_action(active.engine.state(), COMPUTER_SEAT);
        match active.engine.apply_action(COMPUTER_SEAT, action) {
            Ok(outcome) => {
                active.replay.record(COMPUTER_SEAT, action);
                events.extend(outcome.events);
            }
            Err(e) => {
                warn!(?action, error = %e, "Computer action rejected");
                return Err(e);
            }
        }
    }
    Ok(())
}

/// Responses for an accepted human action.
///
/// Applied events are always reported, followed by the computer's
/// rejection if its turn stopped early, or by `game_over`.
fn turn_responses(
    state: &GameState,
    events: Vec<GameEvent>,
    rejection: Option<ActionError>,
) -> Vec<Response> {
    let mut responses = vec![Response::Events {
        events,
        current_turn: state.current_turn,
        actions_remaining: state.actions_remaining,
    }];

    if let Some(e) = rejection {
        responses.push(Response::rejected(e));
    }

    if let Some(winner) = state.winner {
        info!(winner, turn = state.turn_number, "Interactive match over");
        responses.push(Response::GameOver {
            winner,
            you_won: winner == HUMAN_SEAT,
            turn_number: state.turn_number,
        });
    }

    responses
}

fn no_match() -> Response {
    Response::error("No game in progress; send new_game first")
}

fn write_response<W: Write>(output: &mut W, response: &Response) -> io::Result<()> {
    serde_json::to_writer(&mut *output, response)?;
    output.write_all(b"\n")?;
    output.flush()
}
