use crate::models::auction::AuctionId;

/// Bidder-facing URL for an auction, the payload a QR code encodes.
pub fn join_url(frontend_url: &str, auction_id: &AuctionId) -> String {
    format!("{}/bid/{}", frontend_url.trim_end_matches('/'), auction_id)
}
