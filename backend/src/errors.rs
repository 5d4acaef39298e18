use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use utoipa::{PartialSchema, ToSchema};

use crate::models::{
    auction::{AuctionId, AuctionStatus},
    ErrorResponse,
};

pub type Error = Box<dyn std::error::Error + Send + Sync>;

/// Why a bid was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BidRejection {
    #[error("auction is {0}, bids are only accepted while active")]
    NotActive(AuctionStatus),
    #[error("bid of {amount} must exceed current price {current_price}")]
    TooLow { amount: u64, current_price: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuctionError {
    #[error("Auction {0} not found")]
    NotFound(String),
    /// Only waiting auctions can be started.
    #[error("Cannot start auction, it is already {status}")]
    InvalidTransition { status: AuctionStatus },
    #[error("End time of auction {0} is out of range")]
    EndTimeOutOfRange(String),
    #[error("Bid rejected: {0}")]
    Rejected(#[from] BidRejection),
}

impl AuctionError {
    pub fn not_found(id: &AuctionId) -> Self {
        Self::NotFound(id.to_string())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error(transparent)]
    AuctionError(#[from] AuctionError),
    #[error("Handler failed with status {0}: {1}")]
    HandlerError(StatusCode, String),
}

impl HandlerError {
    pub fn bad_request<S: Into<String>>(message: S) -> Self {
        Self::HandlerError(StatusCode::BAD_REQUEST, message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            HandlerError::AuctionError(AuctionError::NotFound(_)) => StatusCode::NOT_FOUND,
            HandlerError::AuctionError(AuctionError::InvalidTransition { .. }) => {
                StatusCode::CONFLICT
            }
            HandlerError::AuctionError(AuctionError::Rejected(_)) => StatusCode::BAD_REQUEST,
            HandlerError::AuctionError(AuctionError::EndTimeOutOfRange(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            HandlerError::HandlerError(s, _) => *s,
        }
    }
}

impl From<HandlerError> for ErrorResponse {
    fn from(value: HandlerError) -> Self {
        ErrorResponse::new(value.status(), value.to_string())
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        ErrorResponse::from(self).into_response()
    }
}

impl PartialSchema for HandlerError {
    fn schema() -> utoipa::openapi::RefOr<utoipa::openapi::schema::Schema> {
        ErrorResponse::schema()
    }
}

impl ToSchema for HandlerError {
    fn schemas(
        schemas: &mut Vec<(
            String,
            utoipa::openapi::RefOr<utoipa::openapi::schema::Schema>,
        )>,
    ) {
        <ErrorResponse as ToSchema>::schemas(schemas);
    }
}
