use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use ulid::Ulid;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::{
    errors::HandlerError,
    models::{
        auction::{Auction, CreateAuctionRequest},
        JoinLink,
    },
    state::AppState,
    utils::join_url,
};

pub fn router() -> OpenApiRouter<Arc<AppState>> {
    OpenApiRouter::new()
        .routes(routes!(list_auctions, create_auction))
        .routes(routes!(get_auction))
        .routes(routes!(start_auction))
        .routes(routes!(finish_auction))
        .routes(routes!(get_join_link))
}

// List Auctions
/// Get all auctions, oldest first.
#[utoipa::path(
    get,
    path = "/v1/auctions",
    tag = "Auction",
    responses(
        (status = OK, description = "Returns every auction", body = Vec<Auction>),
    ),
)]
async fn list_auctions(State(state): State<Arc<AppState>>) -> Json<Vec<Auction>> {
    Json(state.gateway.list())
}

// Create Auction
/// Create an auction in the waiting state.
#[utoipa::path(
    post,
    path = "/v1/auctions",
    tag = "Auction",
    request_body = CreateAuctionRequest,
    responses(
        (status = OK, description = "Auction created", body = Auction),
        (status = BAD_REQUEST, description = "Invalid auction description", body = HandlerError),
    ),
)]
async fn create_auction(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateAuctionRequest>,
) -> Result<Json<Auction>, HandlerError> {
    if payload.title.trim().is_empty() {
        return Err(HandlerError::bad_request("Auction title must not be empty."));
    }

    Ok(Json(state.gateway.create(payload)))
}

// Get Auction
/// Get an auction by auctionId.
#[utoipa::path(
    get,
    path = "/v1/auctions/{auctionId}",
    tag = "Auction",
    params(
        ("auctionId" = String, Path, description = "Auction ID to get", format = Ulid),
    ),
    responses(
        (status = OK, description = "Returns specified auction", body = Auction),
        (status = NOT_FOUND, description = "Auction not found", body = HandlerError),
    ),
)]
async fn get_auction(
    State(state): State<Arc<AppState>>,
    Path(auction_id): Path<Ulid>,
) -> Result<Json<Auction>, HandlerError> {
    Ok(Json(state.gateway.get(&auction_id)?))
}

// Start Auction
/// Open an auction for bidding and notify its room.
#[utoipa::path(
    post,
    path = "/v1/auctions/{auctionId}/start",
    tag = "Auction",
    params(
        ("auctionId" = String, Path, description = "Auction ID to start", format = Ulid),
    ),
    responses(
        (status = OK, description = "Auction started", body = Auction),
        (status = NOT_FOUND, description = "Auction not found", body = HandlerError),
        (status = CONFLICT, description = "Auction is not waiting", body = HandlerError),
    ),
)]
async fn start_auction(
    State(state): State<Arc<AppState>>,
    Path(auction_id): Path<Ulid>,
) -> Result<Json<Auction>, HandlerError> {
    Ok(Json(state.gateway.start(&auction_id)?))
}

// Finish Auction
/// Close an auction and record its winner. Finishing twice is a no-op.
#[utoipa::path(
    post,
    path = "/v1/auctions/{auctionId}/finish",
    tag = "Auction",
    params(
        ("auctionId" = String, Path, description = "Auction ID to finish", format = Ulid),
    ),
    responses(
        (status = OK, description = "Auction finished", body = Auction),
        (status = NOT_FOUND, description = "Auction not found", body = HandlerError),
    ),
)]
async fn finish_auction(
    State(state): State<Arc<AppState>>,
    Path(auction_id): Path<Ulid>,
) -> Result<Json<Auction>, HandlerError> {
    Ok(Json(state.gateway.finish(&auction_id)?))
}

/// Get the bidder join link of an auction, the content of its QR code.
#[utoipa::path(
    get,
    path = "/v1/auctions/{auctionId}/link",
    tag = "Auction",
    params(
        ("auctionId" = String, Path, description = "Auction ID", format = Ulid),
    ),
    responses(
        (status = OK, description = "Join link", body = JoinLink),
        (status = NOT_FOUND, description = "Auction not found", body = HandlerError),
    ),
)]
async fn get_join_link(
    State(state): State<Arc<AppState>>,
    Path(auction_id): Path<Ulid>,
) -> Result<Json<JoinLink>, HandlerError> {
    let auction = state.gateway.get(&auction_id)?;

    Ok(Json(JoinLink {
        auction_id: auction.id(),
        url: join_url(&state.config.frontend_url, &auction.id()),
    }))
}
