use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::Method,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use gambit_core::{Coordinator, MatchOutcome};
use gambit_shared::records::{GameRecord, GameSummary, PlayerView};
use gambit_shared::types::{GameId, MoveInput, PlayerId, PlayerSummary};

use crate::config::ServerConfig;
use crate::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<Coordinator>,
    pub config: Arc<ServerConfig>,
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        // Auth
        .route("/api/auth/register", post(auth_register))
        .route("/api/auth/login", post(auth_login))
        .route("/api/auth/guest", post(auth_guest))
        // Players
        .route("/api/players", get(players_list))
        .route("/api/players/:id", get(player_get))
        .route("/api/players/:id/history", get(player_history))
        .route("/api/players/:id/heartbeat", post(player_heartbeat))
        // Friends
        .route("/api/friends", get(friends_list))
        .route("/api/friends/request", post(friends_request))
        .route("/api/friends/accept", post(friends_accept))
        .route("/api/friends/decline", post(friends_decline))
        .route("/api/friends/:friend_id", delete(friends_remove))
        // Invitations
        .route("/api/invites/send", post(invites_send))
        .route("/api/invites/decline", post(invites_decline))
        // Matchmaking
        .route("/api/matchmaking/find", post(matchmaking_find))
        .route("/api/matchmaking/status/:player_id", get(matchmaking_status))
        // Games
        .route("/api/games/create", post(games_create))
        .route("/api/games/:game_id", get(game_get))
        .route("/api/games/:game_id/join", post(game_join))
        .route("/api/games/:game_id/move", post(game_move))
        .route("/api/games/:game_id/chat", post(game_chat))
        .route("/api/games/:game_id/offer-draw", post(game_offer_draw))
        .route("/api/games/:game_id/respond-draw", post(game_respond_draw))
        // Parties
        .route("/api/parties/join", post(parties_join))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    instance: String,
    version: &'static str,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        instance: state.config.instance_name.clone(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ─── Auth ───

#[derive(Deserialize)]
struct CredentialsRequest {
    name: String,
    password: String,
}

async fn auth_register(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<Json<PlayerView>, ApiError> {
    let player = state.coordinator.register(&req.name, &req.password).await?;
    Ok(Json(player))
}

async fn auth_login(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<Json<PlayerView>, ApiError> {
    let player = state.coordinator.login(&req.name, &req.password).await?;
    Ok(Json(player))
}

async fn auth_guest(State(state): State<AppState>) -> Result<Json<PlayerView>, ApiError> {
    let player = state.coordinator.guest().await?;
    Ok(Json(player))
}

// ─── Players ───

async fn players_list(
    State(state): State<AppState>,
) -> Result<Json<Vec<PlayerSummary>>, ApiError> {
    Ok(Json(state.coordinator.list_players().await?))
}

async fn player_get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PlayerView>, ApiError> {
    Ok(Json(state.coordinator.get_player(PlayerId(id)).await?))
}

async fn player_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<GameSummary>>, ApiError> {
    Ok(Json(state.coordinator.player_history(PlayerId(id)).await?))
}

async fn player_heartbeat(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.coordinator.heartbeat(PlayerId(id)).await?;
    Ok(Json(serde_json::json!({ "message": "Heartbeat received" })))
}

// ─── Friends ───

#[derive(Deserialize)]
struct FriendsQuery {
    player_id: Uuid,
}

async fn friends_list(
    State(state): State<AppState>,
    Query(query): Query<FriendsQuery>,
) -> Result<Json<Vec<PlayerSummary>>, ApiError> {
    Ok(Json(
        state
            .coordinator
            .list_friends(PlayerId(query.player_id))
            .await?,
    ))
}

#[derive(Deserialize)]
struct FriendRequestBody {
    from_id: Uuid,
    to_id: Uuid,
}

async fn friends_request(
    State(state): State<AppState>,
    Json(req): Json<FriendRequestBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .coordinator
        .send_friend_request(PlayerId(req.from_id), PlayerId(req.to_id))
        .await?;
    Ok(Json(serde_json::json!({ "message": "Friend request sent." })))
}

#[derive(Deserialize)]
struct FriendResponseBody {
    self_id: Uuid,
    from_id: Uuid,
}

async fn friends_accept(
    State(state): State<AppState>,
    Json(req): Json<FriendResponseBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .coordinator
        .accept_friend_request(PlayerId(req.self_id), PlayerId(req.from_id))
        .await?;
    Ok(Json(serde_json::json!({ "message": "Friend request accepted." })))
}

async fn friends_decline(
    State(state): State<AppState>,
    Json(req): Json<FriendResponseBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .coordinator
        .decline_friend_request(PlayerId(req.self_id), PlayerId(req.from_id))
        .await?;
    Ok(Json(serde_json::json!({ "message": "Friend request declined." })))
}

#[derive(Deserialize)]
struct RemoveFriendBody {
    self_id: Uuid,
}

async fn friends_remove(
    State(state): State<AppState>,
    Path(friend_id): Path<Uuid>,
    Json(req): Json<RemoveFriendBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .coordinator
        .remove_friend(PlayerId(req.self_id), PlayerId(friend_id))
        .await?;
    Ok(Json(serde_json::json!({ "message": "Friend removed." })))
}

// ─── Invitations ───

#[derive(Deserialize)]
struct SendInviteBody {
    from_id: Uuid,
    to_id: Uuid,
}

#[derive(Serialize)]
struct SendInviteResponse {
    game_id: GameId,
}

async fn invites_send(
    State(state): State<AppState>,
    Json(req): Json<SendInviteBody>,
) -> Result<Json<SendInviteResponse>, ApiError> {
    let game_id = state
        .coordinator
        .send_invitation(PlayerId(req.from_id), PlayerId(req.to_id))
        .await?;
    Ok(Json(SendInviteResponse { game_id }))
}

#[derive(Deserialize)]
struct DeclineInviteBody {
    player_id: Uuid,
    game_id: Uuid,
}

async fn invites_decline(
    State(state): State<AppState>,
    Json(req): Json<DeclineInviteBody>,
) -> Result<Json<PlayerView>, ApiError> {
    let view = state
        .coordinator
        .decline_invitation(PlayerId(req.player_id), GameId(req.game_id))
        .await?;
    Ok(Json(view))
}

// ─── Matchmaking ───

#[derive(Deserialize)]
struct FindMatchBody {
    player_id: Uuid,
}

async fn matchmaking_find(
    State(state): State<AppState>,
    Json(req): Json<FindMatchBody>,
) -> Result<Json<MatchOutcome>, ApiError> {
    let outcome = state.coordinator.find_match(PlayerId(req.player_id)).await?;
    Ok(Json(outcome))
}

async fn matchmaking_status(
    State(state): State<AppState>,
    Path(player_id): Path<Uuid>,
) -> Result<Json<MatchOutcome>, ApiError> {
    let outcome = state.coordinator.check_match(PlayerId(player_id)).await?;
    Ok(Json(outcome))
}

// ─── Games ───

#[derive(Deserialize)]
struct CreateGameBody {
    player_id: Uuid,
}

#[derive(Serialize)]
struct CreateGameResponse {
    game: GameRecord,
    party_code: String,
}

async fn games_create(
    State(state): State<AppState>,
    Json(req): Json<CreateGameBody>,
) -> Result<Json<CreateGameResponse>, ApiError> {
    let (game, party_code) = state
        .coordinator
        .create_party_game(PlayerId(req.player_id))
        .await?;
    Ok(Json(CreateGameResponse { game, party_code }))
}

async fn game_get(
    State(state): State<AppState>,
    Path(game_id): Path<Uuid>,
) -> Result<Json<GameRecord>, ApiError> {
    Ok(Json(state.coordinator.fetch_game(GameId(game_id)).await?))
}

#[derive(Deserialize)]
struct JoinGameBody {
    player_id: Uuid,
}

async fn game_join(
    State(state): State<AppState>,
    Path(game_id): Path<Uuid>,
    Json(req): Json<JoinGameBody>,
) -> Result<Json<GameRecord>, ApiError> {
    let game = state
        .coordinator
        .join_game(GameId(game_id), PlayerId(req.player_id))
        .await?;
    Ok(Json(game))
}

#[derive(Deserialize)]
struct MoveBody {
    player_id: Uuid,
    #[serde(rename = "move")]
    mv: MoveInput,
}

async fn game_move(
    State(state): State<AppState>,
    Path(game_id): Path<Uuid>,
    Json(req): Json<MoveBody>,
) -> Result<Json<GameRecord>, ApiError> {
    let game = state
        .coordinator
        .make_move(GameId(game_id), PlayerId(req.player_id), &req.mv)
        .await?;
    Ok(Json(game))
}

#[derive(Deserialize)]
struct ChatBody {
    player_id: Uuid,
    text: String,
}

async fn game_chat(
    State(state): State<AppState>,
    Path(game_id): Path<Uuid>,
    Json(req): Json<ChatBody>,
) -> Result<Json<GameRecord>, ApiError> {
    let game = state
        .coordinator
        .send_chat(GameId(game_id), PlayerId(req.player_id), &req.text)
        .await?;
    Ok(Json(game))
}

#[derive(Deserialize)]
struct OfferDrawBody {
    player_id: Uuid,
}

async fn game_offer_draw(
    State(state): State<AppState>,
    Path(game_id): Path<Uuid>,
    Json(req): Json<OfferDrawBody>,
) -> Result<Json<GameRecord>, ApiError> {
    let game = state
        .coordinator
        .offer_draw(GameId(game_id), PlayerId(req.player_id))
        .await?;
    Ok(Json(game))
}

#[derive(Deserialize)]
struct RespondDrawBody {
    player_id: Uuid,
    accept: bool,
}

async fn game_respond_draw(
    State(state): State<AppState>,
    Path(game_id): Path<Uuid>,
    Json(req): Json<RespondDrawBody>,
) -> Result<Json<GameRecord>, ApiError> {
    let game = state
        .coordinator
        .respond_draw(GameId(game_id), PlayerId(req.player_id), req.accept)
        .await?;
    Ok(Json(game))
}

// ─── Parties ───

#[derive(Deserialize)]
struct JoinPartyBody {
    party_code: String,
    player_id: Uuid,
}

async fn parties_join(
    State(state): State<AppState>,
    Json(req): Json<JoinPartyBody>,
) -> Result<Json<GameRecord>, ApiError> {
    let game = state
        .coordinator
        .join_by_code(&req.party_code, PlayerId(req.player_id))
        .await?;
    Ok(Json(game))
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    tracing::info!(addr = %addr, "Starting HTTP API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
