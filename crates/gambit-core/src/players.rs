//! Player accounts, presence, and the social graph.

use chrono::Utc;
use futures::future::join_all;
use tracing::{info, warn};

use gambit_shared::constants::{MAX_NAME_LEN, MIN_NAME_LEN, MIN_PASSWORD_LEN};
use gambit_shared::credentials;
use gambit_shared::records::{PlayerRecord, PlayerView};
use gambit_shared::types::{FriendRequest, GameId, GameInvitation, PlayerId, PlayerSummary};

use crate::coordinator::Coordinator;
use crate::entities::RecordKind;
use crate::error::CoreError;

impl Coordinator {
    // ------------------------------------------------------------------
    // Accounts
    // ------------------------------------------------------------------

    /// Register a named account.  The name lock is claimed before the
    /// profile is written, so two concurrent registrations for one name
    /// cannot both succeed.
    pub async fn register(&self, name: &str, password: &str) -> Result<PlayerView, CoreError> {
        let name = name.trim();
        if name.len() < MIN_NAME_LEN || name.len() > MAX_NAME_LEN {
            return Err(CoreError::InvalidInput(format!(
                "username must be between {MIN_NAME_LEN} and {MAX_NAME_LEN} characters"
            )));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(CoreError::InvalidInput(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters long"
            )));
        }

        let id = PlayerId::new();
        if !self.claim_name(name, id).await? {
            return Err(CoreError::NameTaken);
        }

        let credential = credentials::hash_password(password);
        let player = PlayerRecord::new(id, name.to_string(), Some(credential));
        self.entities
            .create(RecordKind::Player, &id.to_string(), &player)
            .await?;

        info!(player_id = %id, name, "registered player");
        Ok(player.view(Utc::now()))
    }

    /// Log into a registered account.
    pub async fn login(&self, name: &str, password: &str) -> Result<PlayerView, CoreError> {
        let owner = self
            .resolve_name(name)
            .await?
            .ok_or(CoreError::InvalidCredentials)?;

        let player: PlayerRecord = self
            .entities
            .read(RecordKind::Player, &owner.to_string())
            .await?
            .ok_or(CoreError::InvalidCredentials)?;

        let stored = player
            .credential
            .as_deref()
            .ok_or(CoreError::InvalidCredentials)?;
        if !credentials::verify_password(password, stored) {
            return Err(CoreError::InvalidCredentials);
        }

        Ok(player.view(Utc::now()))
    }

    /// Create a throwaway guest account.
    pub async fn guest(&self) -> Result<PlayerView, CoreError> {
        let id = PlayerId::new();
        let name = format!("Guest_{}", id.short());
        let player = PlayerRecord::new(id, name, None);
        self.entities
            .create(RecordKind::Player, &id.to_string(), &player)
            .await?;

        info!(player_id = %id, "created guest player");
        Ok(player.view(Utc::now()))
    }

    // ------------------------------------------------------------------
    // Presence & profiles
    // ------------------------------------------------------------------

    /// Record a presence heartbeat.
    pub async fn heartbeat(&self, player_id: PlayerId) -> Result<(), CoreError> {
        self.entities
            .update::<PlayerRecord, _, _>(RecordKind::Player, &player_id.to_string(), |player| {
                player.touch(Utc::now());
                Ok(())
            })
            .await
    }

    /// Public profile for one player.
    pub async fn get_player(&self, player_id: PlayerId) -> Result<PlayerView, CoreError> {
        let player: PlayerRecord = self
            .entities
            .read_required(RecordKind::Player, &player_id.to_string())
            .await?;
        Ok(player.view(Utc::now()))
    }

    pub(crate) async fn player_record(
        &self,
        player_id: PlayerId,
    ) -> Result<PlayerRecord, CoreError> {
        self.entities
            .read_required(RecordKind::Player, &player_id.to_string())
            .await
    }

    /// Directory of all players with derived presence.
    pub async fn list_players(&self) -> Result<Vec<PlayerSummary>, CoreError> {
        let now = Utc::now();
        let players: Vec<PlayerRecord> = self.entities.list(RecordKind::Player).await?;
        Ok(players
            .into_iter()
            .map(|p| PlayerSummary {
                id: p.id,
                name: p.name.clone(),
                status: p.presence(now),
            })
            .collect())
    }

    // ------------------------------------------------------------------
    // Friends
    // ------------------------------------------------------------------

    /// A player's friends with derived presence.  Friends whose records have
    /// vanished are skipped rather than failing the whole listing.
    pub async fn list_friends(&self, player_id: PlayerId) -> Result<Vec<PlayerSummary>, CoreError> {
        let player = self.player_record(player_id).await?;
        let now = Utc::now();

        let lookups = player.friends.iter().map(|friend_id| {
            let entities = self.entities.clone();
            let key = friend_id.to_string();
            async move { entities.read::<PlayerRecord>(RecordKind::Player, &key).await }
        });

        let mut friends = Vec::new();
        for result in join_all(lookups).await {
            if let Some(friend) = result? {
                friends.push(PlayerSummary {
                    id: friend.id,
                    name: friend.name.clone(),
                    status: friend.presence(now),
                });
            }
        }
        Ok(friends)
    }

    /// Send a friend request.  Duplicate requests collapse on the receiving
    /// side, so re-sending is harmless.
    pub async fn send_friend_request(
        &self,
        from_id: PlayerId,
        to_id: PlayerId,
    ) -> Result<(), CoreError> {
        if from_id == to_id {
            return Err(CoreError::InvalidInput(
                "cannot send a friend request to yourself".into(),
            ));
        }

        let sender = self.player_record(from_id).await?;
        if !self.entities.exists(RecordKind::Player, &to_id.to_string()).await? {
            return Err(CoreError::PlayerNotFound);
        }

        self.entities
            .update::<PlayerRecord, _, _>(RecordKind::Player, &to_id.to_string(), |player| {
                player.add_friend_request(FriendRequest {
                    from_id,
                    from_name: sender.name.clone(),
                });
                Ok(())
            })
            .await?;
        self.entities
            .update::<PlayerRecord, _, _>(RecordKind::Player, &from_id.to_string(), |player| {
                player.add_sent_request(to_id);
                Ok(())
            })
            .await
    }

    /// Accept a pending friend request: both sides gain a friend, the
    /// request bookkeeping clears on both records.
    pub async fn accept_friend_request(
        &self,
        self_id: PlayerId,
        from_id: PlayerId,
    ) -> Result<(), CoreError> {
        // Both must exist before either side mutates.
        self.player_record(self_id).await?;
        self.player_record(from_id).await?;

        self.entities
            .update::<PlayerRecord, _, _>(RecordKind::Player, &self_id.to_string(), |player| {
                player.add_friend(from_id);
                player.remove_friend_request(from_id);
                Ok(())
            })
            .await?;
        self.entities
            .update::<PlayerRecord, _, _>(RecordKind::Player, &from_id.to_string(), |player| {
                player.add_friend(self_id);
                player.remove_sent_request(self_id);
                Ok(())
            })
            .await
    }

    /// Decline a pending friend request.
    pub async fn decline_friend_request(
        &self,
        self_id: PlayerId,
        from_id: PlayerId,
    ) -> Result<(), CoreError> {
        self.entities
            .update::<PlayerRecord, _, _>(RecordKind::Player, &self_id.to_string(), |player| {
                player.remove_friend_request(from_id);
                Ok(())
            })
            .await?;

        if self.entities.exists(RecordKind::Player, &from_id.to_string()).await? {
            self.entities
                .update::<PlayerRecord, _, _>(RecordKind::Player, &from_id.to_string(), |player| {
                    player.remove_sent_request(self_id);
                    Ok(())
                })
                .await?;
        }
        Ok(())
    }

    /// Remove a friendship from both sides.
    pub async fn remove_friend(
        &self,
        self_id: PlayerId,
        friend_id: PlayerId,
    ) -> Result<(), CoreError> {
        self.entities
            .update::<PlayerRecord, _, _>(RecordKind::Player, &self_id.to_string(), |player| {
                player.remove_friend(friend_id);
                Ok(())
            })
            .await?;

        if self.entities.exists(RecordKind::Player, &friend_id.to_string()).await? {
            self.entities
                .update::<PlayerRecord, _, _>(RecordKind::Player, &friend_id.to_string(), |player| {
                    player.remove_friend(self_id);
                    Ok(())
                })
                .await?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Game invitations
    // ------------------------------------------------------------------

    /// Invite another player: creates a waiting game hosted by the sender
    /// and deposits an invitation on the receiver's record.
    pub async fn send_invitation(
        &self,
        from_id: PlayerId,
        to_id: PlayerId,
    ) -> Result<GameId, CoreError> {
        if from_id == to_id {
            return Err(CoreError::InvalidInput(
                "cannot invite yourself to a game".into(),
            ));
        }

        let sender = self.player_record(from_id).await?;
        if !self.entities.exists(RecordKind::Player, &to_id.to_string()).await? {
            return Err(CoreError::PlayerNotFound);
        }

        let game_id = self.create_hosted_game(from_id, &sender.name, None).await?;

        self.entities
            .update::<PlayerRecord, _, _>(RecordKind::Player, &to_id.to_string(), |player| {
                player.add_invitation(GameInvitation {
                    from_id,
                    from_name: sender.name.clone(),
                    game_id,
                });
                Ok(())
            })
            .await?;

        info!(%from_id, %to_id, %game_id, "sent game invitation");
        Ok(game_id)
    }

    /// Decline an invitation, returning the refreshed profile.
    pub async fn decline_invitation(
        &self,
        player_id: PlayerId,
        game_id: GameId,
    ) -> Result<PlayerView, CoreError> {
        self.entities
            .update::<PlayerRecord, _, _>(RecordKind::Player, &player_id.to_string(), |player| {
                player.remove_invitation(game_id);
                Ok(())
            })
            .await?;
        self.get_player(player_id).await
    }

    // ------------------------------------------------------------------
    // Shared plumbing
    // ------------------------------------------------------------------

    /// Point a player's weak back-reference at a game (or clear it).
    /// Missing players are logged and skipped: settlement and pairing must
    /// stay best-effort per record.
    pub(crate) async fn set_current_game(
        &self,
        player_id: PlayerId,
        game_id: Option<GameId>,
    ) -> Result<(), CoreError> {
        let result = self
            .entities
            .update::<PlayerRecord, _, _>(RecordKind::Player, &player_id.to_string(), |player| {
                player.current_game = game_id;
                Ok(())
            })
            .await;
        match result {
            Err(CoreError::PlayerNotFound) => {
                warn!(%player_id, "skipping current-game link for missing player");
                Ok(())
            }
            other => other,
        }
    }
}
