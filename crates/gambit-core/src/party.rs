//! Short human-shareable codes pointing at joinable games.

use rand::Rng;
use serde::{Deserialize, Serialize};

use gambit_shared::constants::{PARTY_CODE_ALPHABET, PARTY_CODE_LEN};
use gambit_shared::types::GameId;

use crate::coordinator::Coordinator;
use crate::entities::RecordKind;
use crate::error::CoreError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct PartyRecord {
    pub game: Option<GameId>,
}

/// One random candidate code.
fn generate_code<R: Rng>(rng: &mut R) -> String {
    let alphabet: Vec<char> = PARTY_CODE_ALPHABET.chars().collect();
    (0..PARTY_CODE_LEN)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())])
        .collect()
}

/// Codes are case-insensitive; the stored key is always uppercase.
fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

impl Coordinator {
    /// Generate a collision-free code and bind it to `game_id`.  The claim
    /// happens under the code's key lock, so two concurrent creators can
    /// never both win the same code.
    pub(crate) async fn bind_party_code(&self, game_id: GameId) -> Result<String, CoreError> {
        loop {
            let code = generate_code(&mut rand::thread_rng());
            let claimed = self
                .entities
                .mutate::<PartyRecord, _, _>(RecordKind::Party, &code, |party| {
                    if party.game.is_some() {
                        Ok(false)
                    } else {
                        party.game = Some(game_id);
                        Ok(true)
                    }
                })
                .await?;
            if claimed {
                return Ok(code);
            }
        }
    }

    /// Look up the game a party code points at.
    pub async fn resolve_party_code(&self, code: &str) -> Result<GameId, CoreError> {
        let key = normalize_code(code);
        let party: Option<PartyRecord> = self.entities.read(RecordKind::Party, &key).await?;
        party.and_then(|p| p.game).ok_or(CoreError::PartyNotFound)
    }
}
