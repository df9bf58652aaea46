//! The matchmaking queue and per-player match mailboxes.
//!
//! The queue is a singleton entity; dequeue-or-enqueue happens in one
//! mutation under its key lock, so two concurrent callers can never claim
//! the same waiting opponent.  The caller whose mutation paired the match
//! learns the game id synchronously; the opponent finds it in their mailbox
//! on the next poll.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use gambit_shared::records::GameRecord;
use gambit_shared::types::{GameId, PlayerId, Seat};

use crate::coordinator::Coordinator;
use crate::entities::RecordKind;
use crate::error::CoreError;

const QUEUE_KEY: &str = "queue";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct QueueRecord {
    pub waiting: Vec<PlayerId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct MailboxRecord {
    pub game: Option<GameId>,
}

/// What a matchmaking call tells the client.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum MatchOutcome {
    /// Still waiting for an opponent.
    Searching,
    /// Paired; the game is ready.
    Matched { game_id: GameId },
    /// Admission control: too many active games right now.
    Full,
}

impl Coordinator {
    /// Enter the matchmaking queue, pairing immediately when someone is
    /// already waiting.
    pub async fn find_match(&self, player_id: PlayerId) -> Result<MatchOutcome, CoreError> {
        // Admission control happens before the queue is touched.
        let games: Vec<GameRecord> = self.entities.list(RecordKind::Game).await?;
        let active = games.iter().filter(|g| g.status.is_active()).count();
        if active >= self.config.max_active_games {
            info!(active, ceiling = self.config.max_active_games, "matchmaking full");
            return Ok(MatchOutcome::Full);
        }

        // Dequeue an opponent or enqueue ourselves, atomically.  A player
        // already queued stays queued exactly once.
        let opponent_id = self
            .entities
            .mutate::<QueueRecord, _, _>(RecordKind::Matchmaker, QUEUE_KEY, |queue| {
                if queue.waiting.contains(&player_id) {
                    return Ok(None);
                }
                match queue.waiting.iter().position(|id| *id != player_id) {
                    Some(pos) => Ok(Some(queue.waiting.remove(pos))),
                    None => {
                        queue.waiting.push(player_id);
                        Ok(None)
                    }
                }
            })
            .await?;

        let Some(opponent_id) = opponent_id else {
            return Ok(MatchOutcome::Searching);
        };

        let game_id = self.pair(player_id, opponent_id).await?;
        Ok(MatchOutcome::Matched { game_id })
    }

    /// Poll for a match made on someone else's call.  Reads and clears the
    /// mailbox, so a match is reported exactly once.
    pub async fn check_match(&self, player_id: PlayerId) -> Result<MatchOutcome, CoreError> {
        let delivered = self
            .entities
            .mutate::<MailboxRecord, _, _>(RecordKind::Mailbox, &player_id.to_string(), |mailbox| {
                Ok(mailbox.game.take())
            })
            .await?;

        Ok(match delivered {
            Some(game_id) => MatchOutcome::Matched { game_id },
            None => MatchOutcome::Searching,
        })
    }

    /// Create the paired game and notify both players.
    async fn pair(&self, caller: PlayerId, opponent: PlayerId) -> Result<GameId, CoreError> {
        let caller_record = self.player_record(caller).await?;
        let opponent_record = self.player_record(opponent).await?;

        let caller_seat = Seat {
            id: caller_record.id,
            name: caller_record.name.clone(),
        };
        let opponent_seat = Seat {
            id: opponent_record.id,
            name: opponent_record.name.clone(),
        };

        // Colors are a coin flip; neither queue position nor call order
        // favors white.
        let (white, black) = if rand::thread_rng().gen_bool(0.5) {
            (caller_seat, opponent_seat)
        } else {
            (opponent_seat, caller_seat)
        };

        let game_id = GameId::new();
        let game = GameRecord::new_paired(game_id, white, black);
        self.entities
            .create(RecordKind::Game, &game_id.to_string(), &game)
            .await?;

        for player_id in [caller, opponent] {
            self.set_current_game(player_id, Some(game_id)).await?;
            self.entities
                .mutate::<MailboxRecord, _, _>(
                    RecordKind::Mailbox,
                    &player_id.to_string(),
                    |mailbox| {
                        mailbox.game = Some(game_id);
                        Ok(())
                    },
                )
                .await?;
        }

        info!(%game_id, %caller, %opponent, "matched players");
        Ok(game_id)
    }
}
