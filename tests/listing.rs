use alloy::primitives::{address, Address, U256};
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use bets_with_friends::api::{create_app, AppState};
use bets_with_friends::services::RefreshOutcome;
use bets_with_friends::{
    BetBoard, BetRecord, BetStatus, ChainReader, Config, FetchError, ListingSession, NameResolver,
    Outcome, ViewContext,
};
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::time::Duration;
use tower::ServiceExt;

const FACTORY: Address = address!("124044BebDfB90ef3BC544bD6429D407bcF69533");
const ALICE: Address = address!("00000000000000000000000000000000000a11ce");
const BOB: Address = address!("0000000000000000000000000000000000000b0b");
const CAROL: Address = address!("00000000000000000000000000000000000ca401");
const ONE_ETH: u128 = 1_000_000_000_000_000_000;

/// In-memory chain: bets by address, some of which fail to read
struct MockChain {
    order: Vec<Address>,
    bets: HashMap<Address, BetRecord>,
    delay: Duration,
}

impl MockChain {
    fn new(bets: Vec<BetRecord>, broken: &[Address]) -> Self {
        let mut order: Vec<Address> = bets.iter().map(|b| b.address).collect();
        order.extend_from_slice(broken);
        Self {
            order,
            bets: bets.into_iter().map(|b| (b.address, b)).collect(),
            delay: Duration::ZERO,
        }
    }
}

impl ChainReader for MockChain {
    async fn bet_addresses(&self, factory: Address) -> Result<Vec<Address>, FetchError> {
        assert_eq!(factory, FACTORY);
        Ok(self.order.clone())
    }

    async fn read_bet(&self, bet: Address) -> Result<BetRecord, FetchError> {
        tokio::time::sleep(self.delay).await;
        self.bets
            .get(&bet)
            .cloned()
            .ok_or_else(|| FetchError::Rpc("execution reverted".to_string()))
    }
}

struct MockNames;

impl NameResolver for MockNames {
    async fn lookup(&self, address: Address) -> Option<String> {
        (address == BOB).then(|| "bob.eth".to_string())
    }
}

fn bet(n: u8, status: BetStatus, winner: Option<Address>, wager: u128) -> BetRecord {
    let mut raw = [0u8; 20];
    raw[0] = 0xbe;
    raw[19] = n;
    BetRecord {
        address: Address::from(raw),
        better1: ALICE,
        better2: BOB,
        decider: CAROL,
        wager: U256::from(wager),
        conditions: format!("Bet number {}", n),
        status,
        winner,
    }
}

fn broken(n: u8) -> Address {
    let mut raw = [0u8; 20];
    raw[0] = 0xdd;
    raw[19] = n;
    Address::from(raw)
}

#[tokio::test]
async fn test_listing_survives_one_bad_address() {
    let chain = MockChain::new(
        vec![
            bet(1, BetStatus::Better1Funded, None, ONE_ETH),
            bet(2, BetStatus::FullyFunded, None, ONE_ETH),
            bet(3, BetStatus::Resolved, Some(BOB), ONE_ETH),
            bet(4, BetStatus::Resolved, Some(ALICE), ONE_ETH / 2),
        ],
        &[broken(5)],
    );
    let board = BetBoard::new(chain, MockNames, Duration::from_secs(1));

    let listing = board
        .list_bets(FACTORY, ViewContext::new(BOB, dec!(2000)))
        .await
        .unwrap();

    assert_eq!(listing.total(), 4);
    assert_eq!(listing.failed, 1);
    assert_eq!(listing.unfunded.len(), 1);
    assert_eq!(listing.active.len(), 1);
    assert_eq!(listing.historical.len(), 2);

    assert_eq!(listing.stats.bets_won, 1);
    assert_eq!(listing.stats.bets_lost, 1);
    assert_eq!(listing.stats.bets_decided, 0);
    assert_eq!(listing.stats.pnl, dec!(0.5));
    assert_eq!(listing.stats.pnl_fiat, dec!(1000));

    assert_eq!(listing.historical[0].outcome, Outcome::Won);
    assert_eq!(listing.historical[0].winner_label, "bob.eth");
    assert_eq!(listing.historical[1].outcome, Outcome::Lost);
    assert_eq!(listing.unfunded[0].better2_label, "bob.eth");
    assert!(listing.unfunded[0].can_fund);
}

#[tokio::test]
async fn test_decider_view() {
    let chain = MockChain::new(
        vec![
            bet(1, BetStatus::Unfunded, None, ONE_ETH),
            bet(2, BetStatus::FullyFunded, None, ONE_ETH),
            bet(3, BetStatus::Invalidated, None, ONE_ETH),
        ],
        &[],
    );
    let board = BetBoard::new(chain, MockNames, Duration::from_secs(1));

    let listing = board
        .list_bets(FACTORY, ViewContext::new(CAROL, dec!(0)))
        .await
        .unwrap();

    assert_eq!(listing.unfunded.len(), 1);
    assert_eq!(listing.awaiting_decision().count(), 1);
    assert_eq!(listing.stats.bets_decided, 1);
    assert_eq!(listing.stats.bets_won + listing.stats.bets_lost, 0);
    assert_eq!(listing.stats.pnl_fiat, dec!(0));
}

#[tokio::test]
async fn test_stale_batch_never_published() {
    let mut chain = MockChain::new(vec![bet(1, BetStatus::FullyFunded, None, ONE_ETH)], &[]);
    chain.delay = Duration::from_millis(200);
    let board = BetBoard::new(chain, MockNames, Duration::from_secs(2));

    let first = bet(1, BetStatus::FullyFunded, None, ONE_ETH).address;
    let session = ListingSession::new(vec![first], ALICE);
    let mut published = session.subscribe();

    let (outcome, _) = tokio::join!(session.refresh(&board, dec!(1)), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        session.set_viewer(CAROL);
    });

    assert!(matches!(outcome, RefreshOutcome::Superseded));
    assert!(!published.has_changed().unwrap());

    let outcome = session.refresh(&board, dec!(1)).await;
    assert!(outcome.is_published());
    assert!(published.has_changed().unwrap());
    let latest = published.borrow_and_update().clone().unwrap();
    assert_eq!(latest.viewer, CAROL);
    assert!(latest.active[0].can_decide);
}

async fn get(uri: &str) -> (StatusCode, serde_json::Value) {
    let app = create_app(AppState::new(Config::default()));
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_health() {
    let app = create_app(AppState::new(Config::default()));
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn test_label_endpoint() {
    let (status, body) = get("/api/label?address=0x124044BebDfB90ef3BC544bD6429D407bcF69533").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["label"], "0x1240...9533");

    let (_, body) = get("/api/label?address=0x124044BebDfB90ef3BC544bD6429D407bcF69533&name=vitalik.eth").await;
    assert_eq!(body["label"], "vitalik.eth");

    let (_, body) = get("/api/label?address=0x12").await;
    assert_eq!(body["label"], "0x12");
}

#[tokio::test]
async fn test_rate_before_first_fetch() {
    let (status, body) = get("/api/rate").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], false);
}

#[tokio::test]
async fn test_bets_rejects_bad_account() {
    let (status, body) = get("/api/bets?account=not-an-address").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("account"));
}
