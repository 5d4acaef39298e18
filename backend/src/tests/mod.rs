mod auction;
mod event;

use axum::{
    body::{Body, HttpBody},
    extract::Request,
    response::Response,
};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::mpsc;

use crate::{
    errors::Error,
    gateway::Session,
    models::{
        auction::AuctionId,
        event::{PlaceBid, ServerEvent},
    },
    rooms::Subscriber,
};

async fn parse_resp<T: DeserializeOwned>(resp: Response<Body>) -> Result<T, Error> {
    let body = resp.into_body();
    let limit = body.size_hint().upper().unwrap_or(u64::MAX) as usize;
    let data = axum::body::to_bytes(body, limit).await?;
    let res: T = serde_json::from_slice(&data)?;

    Ok(res)
}

fn build_request<T: Serialize>(
    method: &str,
    uri: &str,
    body: Option<T>,
) -> Result<Request<Body>, Error> {
    let req = match body {
        Some(v) => {
            let content = serde_json::to_string(&v)?;
            Request::builder()
                .method(method)
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(Body::new(content))
        }
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty()),
    }?;
    Ok(req)
}

fn session(id: u64) -> (Session, mpsc::Receiver<ServerEvent>) {
    let (subscriber, rx) = Subscriber::new(id, 64);
    (Session::new(subscriber), rx)
}

/// Everything queued for a connection so far.
fn drain(rx: &mut mpsc::Receiver<ServerEvent>) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn place_bid(auction_id: &AuctionId, bidder: &str, amount: u64) -> PlaceBid {
    PlaceBid {
        auction_id: auction_id.to_string(),
        bidder_id: format!("{}-id", bidder),
        bidder_name: bidder.to_string(),
        amount,
    }
}
