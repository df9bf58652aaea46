//! Per-player ledger of completed games.

use serde::{Deserialize, Serialize};

use gambit_shared::constants::HISTORY_CAP;
use gambit_shared::records::GameSummary;
use gambit_shared::types::PlayerId;

use crate::coordinator::Coordinator;
use crate::entities::RecordKind;
use crate::error::CoreError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct LedgerRecord {
    pub games: Vec<GameSummary>,
}

impl Coordinator {
    /// Prepend one summary row to a player's ledger, keeping the most recent
    /// [`HISTORY_CAP`] rows.
    pub(crate) async fn record_summary(
        &self,
        player_id: PlayerId,
        summary: GameSummary,
    ) -> Result<(), CoreError> {
        self.entities
            .mutate::<LedgerRecord, _, _>(RecordKind::History, &player_id.to_string(), |ledger| {
                ledger.games.insert(0, summary);
                ledger.games.truncate(HISTORY_CAP);
                Ok(())
            })
            .await
    }

    /// A player's completed games, newest first.  Players with no finished
    /// games get an empty list, not an error.
    pub async fn player_history(&self, player_id: PlayerId) -> Result<Vec<GameSummary>, CoreError> {
        let ledger: Option<LedgerRecord> = self
            .entities
            .read(RecordKind::History, &player_id.to_string())
            .await?;
        Ok(ledger.map(|l| l.games).unwrap_or_default())
    }
}
