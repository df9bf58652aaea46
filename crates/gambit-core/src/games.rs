//! The game session state machine: joining, moves, chat, the draw-offer
//! protocol, abandonment, and settlement.
//!
//! Every operation is one atomic read-modify-write on the game's key; either
//! the whole computed transition persists or nothing does.  Settlement runs
//! after the terminal transition committed, touching each affected record
//! atomically on its own.  Because status transitions are monotonic and
//! every terminal transition is guarded by a prior-status check under the
//! game's lock, settlement for a given game runs at most once.

use chrono::Utc;
use tracing::{info, warn};

use gambit_rules::RulesError;
use gambit_shared::records::{GameRecord, GameSummary, PlayerRecord};
use gambit_shared::types::{
    ChatMessage, Color, GameId, GameResult, GameStatus, MoveInput, PlayerId, Presence, Seat,
};

use crate::coordinator::Coordinator;
use crate::entities::RecordKind;
use crate::error::CoreError;

impl Coordinator {
    // ------------------------------------------------------------------
    // Creation & lookup
    // ------------------------------------------------------------------

    /// Create a waiting game hosted by `host_id` in the white seat, linking
    /// the host's current-game pointer.
    pub(crate) async fn create_hosted_game(
        &self,
        host_id: PlayerId,
        host_name: &str,
        party_code: Option<String>,
    ) -> Result<GameId, CoreError> {
        let game_id = GameId::new();
        let mut game = GameRecord::new(
            game_id,
            Seat {
                id: host_id,
                name: host_name.to_string(),
            },
        );
        game.party_code = party_code;

        self.entities
            .create(RecordKind::Game, &game_id.to_string(), &game)
            .await?;
        self.set_current_game(host_id, Some(game_id)).await?;

        info!(%game_id, %host_id, "created game");
        Ok(game_id)
    }

    /// Create a private game and bind a shareable party code to it.
    pub async fn create_party_game(
        &self,
        host_id: PlayerId,
    ) -> Result<(GameRecord, String), CoreError> {
        let host = self.player_record(host_id).await?;

        let game_id = GameId::new();
        let code = self.bind_party_code(game_id).await?;

        let mut game = GameRecord::new(
            game_id,
            Seat {
                id: host_id,
                name: host.name.clone(),
            },
        );
        game.party_code = Some(code.clone());

        self.entities
            .create(RecordKind::Game, &game_id.to_string(), &game)
            .await?;
        self.set_current_game(host_id, Some(game_id)).await?;

        info!(%game_id, %host_id, code, "created party game");
        Ok((game, code))
    }

    /// Plain lookup without side effects.
    pub async fn get_game(&self, game_id: GameId) -> Result<GameRecord, CoreError> {
        self.entities
            .read_required(RecordKind::Game, &game_id.to_string())
            .await
    }

    /// Lookup used by clients polling a game they are in: also runs the
    /// abandonment check, so a stale opponent forfeits on the next poll.
    pub async fn fetch_game(&self, game_id: GameId) -> Result<GameRecord, CoreError> {
        let game = self.get_game(game_id).await?;
        self.enforce_liveness(game).await
    }

    // ------------------------------------------------------------------
    // Joining
    // ------------------------------------------------------------------

    /// Take the open seat.  Idempotent for a player already seated; fails
    /// with `GameFull` when someone else holds the black seat.
    pub async fn join_game(
        &self,
        game_id: GameId,
        player_id: PlayerId,
    ) -> Result<GameRecord, CoreError> {
        let player = self.player_record(player_id).await?;
        let seat = Seat {
            id: player_id,
            name: player.name.clone(),
        };

        let game = self
            .entities
            .update::<GameRecord, _, _>(RecordKind::Game, &game_id.to_string(), |game| {
                if game.color_of(player_id).is_some() {
                    return Ok(game.clone());
                }
                if game.black.is_some() {
                    return Err(CoreError::GameFull);
                }
                game.black = Some(seat);
                game.status = GameStatus::Ongoing;
                Ok(game.clone())
            })
            .await?;

        // Joining consumes any pending invitation to this game and points
        // the player at it.
        self.entities
            .update::<PlayerRecord, _, _>(RecordKind::Player, &player_id.to_string(), |player| {
                player.remove_invitation(game_id);
                player.current_game = Some(game_id);
                Ok(())
            })
            .await?;

        info!(%game_id, %player_id, "player joined game");
        Ok(game)
    }

    /// Resolve a party code and join the game it points at.
    pub async fn join_by_code(
        &self,
        code: &str,
        player_id: PlayerId,
    ) -> Result<GameRecord, CoreError> {
        let game_id = self.resolve_party_code(code).await?;
        if !self.entities.exists(RecordKind::Game, &game_id.to_string()).await? {
            return Err(CoreError::GameNotFound);
        }
        self.join_game(game_id, player_id).await
    }

    // ------------------------------------------------------------------
    // Moves
    // ------------------------------------------------------------------

    /// Validate and apply a move.  On a terminal verdict the transition also
    /// records the winner, clears chat, and triggers settlement.
    pub async fn make_move(
        &self,
        game_id: GameId,
        player_id: PlayerId,
        mv: &MoveInput,
    ) -> Result<GameRecord, CoreError> {
        let rules = self.rules.clone();

        let game = self
            .entities
            .update::<GameRecord, _, _>(RecordKind::Game, &game_id.to_string(), |game| {
                match game.status {
                    GameStatus::Waiting => return Err(CoreError::NotStarted),
                    GameStatus::Ongoing => {}
                    _ => return Err(CoreError::GameOver),
                }
                if game.black.is_none() {
                    return Err(CoreError::OpponentAbsent);
                }
                let color = game
                    .color_of(player_id)
                    .ok_or(CoreError::NotAParticipant)?;
                if game.turn != color {
                    return Err(CoreError::NotYourTurn);
                }

                let verdict = rules.apply(&game.position, mv).map_err(|e| match e {
                    RulesError::InvalidPosition(p) => CoreError::CorruptPosition(p),
                    RulesError::MalformedMove(m) => CoreError::MalformedMove(m),
                    RulesError::IllegalMove(m) => CoreError::IllegalMove(m),
                })?;

                game.position = verdict.new_position;
                game.turn = verdict.side_to_move;
                game.history.push(verdict.notation);
                // An accepted move supersedes any pending draw offer.
                game.draw_offer = None;

                if let Some(terminal) = verdict.terminal {
                    game.status = terminal.status;
                    game.winner = terminal.winner;
                    game.chat.clear();
                }

                Ok(game.clone())
            })
            .await?;

        if game.status.is_terminal() {
            self.settle(&game).await?;
        }
        Ok(game)
    }

    // ------------------------------------------------------------------
    // Draw protocol
    // ------------------------------------------------------------------

    /// Offer a draw.  Only one offer may be pending at a time.
    pub async fn offer_draw(
        &self,
        game_id: GameId,
        player_id: PlayerId,
    ) -> Result<GameRecord, CoreError> {
        self.entities
            .update::<GameRecord, _, _>(RecordKind::Game, &game_id.to_string(), |game| {
                match game.status {
                    GameStatus::Waiting => return Err(CoreError::NotStarted),
                    GameStatus::Ongoing => {}
                    _ => return Err(CoreError::GameOver),
                }
                let color = game
                    .color_of(player_id)
                    .ok_or(CoreError::NotAParticipant)?;
                if game.draw_offer.is_some() {
                    return Err(CoreError::OfferPending);
                }
                game.draw_offer = Some(color);
                Ok(game.clone())
            })
            .await
    }

    /// Accept or reject the pending draw offer.  The offering color cannot
    /// respond to its own offer.
    pub async fn respond_draw(
        &self,
        game_id: GameId,
        player_id: PlayerId,
        accept: bool,
    ) -> Result<GameRecord, CoreError> {
        let game = self
            .entities
            .update::<GameRecord, _, _>(RecordKind::Game, &game_id.to_string(), |game| {
                match game.status {
                    GameStatus::Waiting => return Err(CoreError::NotStarted),
                    GameStatus::Ongoing => {}
                    _ => return Err(CoreError::GameOver),
                }
                if game.black.is_none() {
                    return Err(CoreError::OpponentAbsent);
                }
                let color = game
                    .color_of(player_id)
                    .ok_or(CoreError::NotAParticipant)?;
                match game.draw_offer {
                    Some(offered) if offered != color => {}
                    _ => return Err(CoreError::NoOffer),
                }

                game.draw_offer = None;
                if accept {
                    game.status = GameStatus::Draw;
                    game.winner = None;
                    game.chat.clear();
                }
                Ok(game.clone())
            })
            .await?;

        if game.status.is_terminal() {
            self.settle(&game).await?;
        }
        Ok(game)
    }

    // ------------------------------------------------------------------
    // Chat
    // ------------------------------------------------------------------

    /// Append a chat message.  Valid in any status; messages sent after the
    /// game ended land in the fresh post-termination log and are simply
    /// never rendered.
    pub async fn send_chat(
        &self,
        game_id: GameId,
        player_id: PlayerId,
        text: &str,
    ) -> Result<GameRecord, CoreError> {
        let player = self.player_record(player_id).await?;
        let message = ChatMessage::new(player_id, player.name.clone(), text.to_string());

        self.entities
            .update::<GameRecord, _, _>(RecordKind::Game, &game_id.to_string(), |game| {
                game.chat.push(message);
                Ok(game.clone())
            })
            .await
    }

    // ------------------------------------------------------------------
    // Abandonment
    // ------------------------------------------------------------------

    /// Declare `abandoning_id` gone and award the game to the opponent.
    /// A no-op (returning `false`) unless the game is ongoing with both
    /// seats filled and the player is a participant.
    pub async fn abandon(
        &self,
        game_id: GameId,
        abandoning_id: PlayerId,
    ) -> Result<bool, CoreError> {
        let settled = self
            .entities
            .update::<GameRecord, _, _>(RecordKind::Game, &game_id.to_string(), |game| {
                if game.status != GameStatus::Ongoing || game.black.is_none() {
                    return Ok(None);
                }
                let Some(color) = game.color_of(abandoning_id) else {
                    return Ok(None);
                };

                game.status = GameStatus::Abandoned;
                game.winner = Some(color.opposite());
                game.chat.clear();
                Ok(Some(game.clone()))
            })
            .await?;

        match settled {
            Some(game) => {
                info!(%game_id, %abandoning_id, "game abandoned");
                self.settle(&game).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Abandonment pass over every ongoing game: any participant offline
    /// beyond the presence threshold forfeits.  Returns how many games were
    /// closed.  Best-effort; also run per-game on fetch.
    pub async fn sweep_abandoned(&self) -> Result<usize, CoreError> {
        let games: Vec<GameRecord> = self.entities.list(RecordKind::Game).await?;
        let mut closed = 0;
        for game in games {
            if game.status != GameStatus::Ongoing {
                continue;
            }
            if let Some(stale) = self.stale_participant(&game).await? {
                if self.abandon(game.id, stale).await? {
                    closed += 1;
                }
            }
        }
        if closed > 0 {
            info!(closed, "liveness sweep closed abandoned games");
        }
        Ok(closed)
    }

    async fn enforce_liveness(&self, game: GameRecord) -> Result<GameRecord, CoreError> {
        if game.status != GameStatus::Ongoing {
            return Ok(game);
        }
        if let Some(stale) = self.stale_participant(&game).await? {
            self.abandon(game.id, stale).await?;
            return self.get_game(game.id).await;
        }
        Ok(game)
    }

    /// First seated player whose heartbeat has gone stale, if any.
    async fn stale_participant(&self, game: &GameRecord) -> Result<Option<PlayerId>, CoreError> {
        let Some((white, black)) = game.seats() else {
            return Ok(None);
        };
        let now = Utc::now();
        for id in [white.id, black.id] {
            let player: Option<PlayerRecord> =
                self.entities.read(RecordKind::Player, &id.to_string()).await?;
            let Some(player) = player else { continue };
            if player.presence(now) == Presence::Offline {
                return Ok(Some(id));
            }
        }
        Ok(None)
    }

    // ------------------------------------------------------------------
    // Settlement
    // ------------------------------------------------------------------

    /// Write the side effects of a terminal game: two counter updates, two
    /// cleared current-game pointers, two ledger rows.  Each write is atomic
    /// on its own record; a missing player skips its writes rather than
    /// failing the rest.
    async fn settle(&self, game: &GameRecord) -> Result<(), CoreError> {
        let Some((white, black)) = game.seats() else {
            warn!(game_id = %game.id, "terminal game with an empty seat; skipping settlement");
            return Ok(());
        };
        let ended_at = Utc::now();

        for (seat, color) in [(white, Color::White), (black, Color::Black)] {
            let result = GameResult::from_winner(game.winner, color);

            let updated = self
                .entities
                .update::<PlayerRecord, _, _>(RecordKind::Player, &seat.id.to_string(), |player| {
                    player.apply_result(result);
                    player.current_game = None;
                    Ok(())
                })
                .await;
            match updated {
                Err(CoreError::PlayerNotFound) => {
                    warn!(player_id = %seat.id, game_id = %game.id, "settling against missing player");
                    continue;
                }
                other => other?,
            }

            self.record_summary(
                seat.id,
                GameSummary {
                    game_id: game.id,
                    white_name: white.name.clone(),
                    black_name: black.name.clone(),
                    result,
                    end_status: game.status,
                    ended_at,
                },
            )
            .await?;
        }

        info!(
            game_id = %game.id,
            status = %game.status,
            winner = ?game.winner,
            "settled game"
        );
        Ok(())
    }
}
