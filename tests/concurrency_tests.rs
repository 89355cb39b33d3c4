//! Concurrent access to one exchange from many tasks.

mod support;

use std::collections::HashSet;
use std::sync::Arc;

use oddsmaker::domain::{ExchangeError, Position, Side, BPS_DENOMINATOR};
use oddsmaker::port::Ledger;
use oddsmaker::testkit::domain::account;
use oddsmaker::testkit::harness::Harness;
use tokio::sync::Barrier;

use support::assertions::assert_pool_consistent;

const DAY_MS: u64 = 86_400_000;

/// Bets racing on one pool are serialized: every fill is accounted for
/// exactly once in reserves, custody and liability.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_bets_on_one_pool_serialize() {
    const BETTORS: usize = 16;

    let h = Harness::new();
    let lp = account("lp");
    let market = h.open_market(&lp, DAY_MS);
    let pool = h.open_pool(&lp, market, 1_000_000, 0);

    let barrier = Arc::new(Barrier::new(BETTORS));
    let mut handles = Vec::with_capacity(BETTORS);
    for i in 0..BETTORS {
        let exchange = h.exchange.clone();
        let barrier = barrier.clone();
        let bettor = h.fund(&format!("bettor-{i}"), 1_000);
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            exchange.place_bet(&bettor, pool, Side::Yes, 1_000, BPS_DENOMINATOR)
        }));
    }

    let mut positions: Vec<Position> = Vec::with_capacity(BETTORS);
    for handle in handles {
        positions.push(handle.await.unwrap().unwrap());
    }

    let ids: HashSet<_> = positions.iter().map(Position::id).collect();
    assert_eq!(ids.len(), BETTORS);

    let snapshot = h.exchange.pool(pool).unwrap();
    assert_eq!(snapshot.custodied_balance, 1_000_000 + 16_000);
    assert_eq!(snapshot.outstanding_positions, BETTORS);
    assert_eq!(
        snapshot.yes_liability,
        positions.iter().map(Position::potential_payout).sum::<u64>()
    );
    assert_eq!(snapshot.yes_reserve, 500_000 + 16_000);
    assert_eq!(h.exchange.market(market).unwrap().total_volume(), 16_000);
    assert_pool_consistent(&h.exchange, pool);
}

/// Under contention the solvency guard still holds: whatever interleaving
/// wins, custody covers every accepted bet and no funds leak.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn contended_small_pool_never_goes_insolvent() {
    const BETTORS: usize = 8;

    let h = Harness::new();
    let lp = account("lp");
    let market = h.open_market(&lp, DAY_MS);
    let pool = h.open_pool(&lp, market, 10_000, 0);

    let barrier = Arc::new(Barrier::new(BETTORS));
    let mut handles = Vec::with_capacity(BETTORS);
    for i in 0..BETTORS {
        let exchange = h.exchange.clone();
        let barrier = barrier.clone();
        let bettor = h.fund(&format!("bettor-{i}"), 5_000);
        let side = if i % 2 == 0 { Side::Yes } else { Side::No };
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            exchange.place_bet(&bettor, pool, side, 5_000, BPS_DENOMINATOR)
        }));
    }

    let mut accepted = 0u64;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(position) => {
                accepted += position.amount();
                drop(position);
            }
            Err(ExchangeError::Insolvent { .. } | ExchangeError::PoolExhausted) => {}
            Err(other) => panic!("unexpected rejection: {other}"),
        }
    }

    assert!(accepted > 0);
    let snapshot = h.exchange.pool(pool).unwrap();
    assert_eq!(snapshot.custodied_balance, 10_000 + accepted);
    assert_pool_consistent(&h.exchange, pool);
    assert_eq!(
        h.ledger.total() + u128::from(snapshot.custodied_balance),
        10_000 + 5_000 * BETTORS as u128
    );
}

/// Markets are independent: bets on different pools proceed in parallel
/// without affecting each other.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn bets_on_separate_markets_do_not_interfere() {
    const MARKETS: usize = 4;
    const BETS_PER_MARKET: usize = 5;

    let h = Harness::new();
    let lp = account("lp");
    let pools: Vec<_> = (0..MARKETS)
        .map(|_| {
            let market = h.open_market(&lp, DAY_MS);
            h.open_pool(&lp, market, 1_000_000, 0)
        })
        .collect();

    let barrier = Arc::new(Barrier::new(MARKETS * BETS_PER_MARKET));
    let mut handles = Vec::new();
    for (m, pool) in pools.iter().copied().enumerate() {
        for b in 0..BETS_PER_MARKET {
            let exchange = h.exchange.clone();
            let barrier = barrier.clone();
            let bettor = h.fund(&format!("m{m}-b{b}"), 2_000);
            handles.push(tokio::spawn(async move {
                barrier.wait().await;
                exchange.place_bet(&bettor, pool, Side::No, 2_000, BPS_DENOMINATOR)
            }));
        }
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let first = h.exchange.pool(pools[0]).unwrap();
    for pool in &pools {
        let snapshot = h.exchange.pool(*pool).unwrap();
        assert_eq!(snapshot.custodied_balance, 1_000_000 + 10_000);
        assert_eq!(snapshot.outstanding_positions, BETS_PER_MARKET);
        // Equal-sized bets leave every pool in the same place.
        assert_eq!(snapshot.yes_reserve, first.yes_reserve);
        assert_eq!(snapshot.no_reserve, first.no_reserve);
        assert_pool_consistent(&h.exchange, *pool);
    }
}

/// Winners redeeming at once each get paid exactly once.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_redemptions_pay_each_position_once() {
    const BETTORS: usize = 10;

    let h = Harness::new();
    let lp = account("lp");
    let market = h.open_market(&lp, DAY_MS);
    let pool = h.open_pool(&lp, market, 1_000_000, 0);

    let mut positions = Vec::with_capacity(BETTORS);
    for i in 0..BETTORS {
        let bettor = h.fund(&format!("bettor-{i}"), 1_000);
        let side = if i % 2 == 0 { Side::Yes } else { Side::No };
        positions.push(
            h.exchange
                .place_bet(&bettor, pool, side, 1_000, BPS_DENOMINATOR)
                .unwrap(),
        );
    }
    let owed: u64 = positions
        .iter()
        .filter(|p| p.side() == Side::Yes)
        .map(Position::potential_payout)
        .sum();
    h.settle(&lp, market, Side::Yes);
    let custody_before = h.exchange.pool(pool).unwrap().custodied_balance;

    let barrier = Arc::new(Barrier::new(BETTORS));
    let handles: Vec<_> = positions
        .into_iter()
        .map(|position| {
            let exchange = h.exchange.clone();
            let barrier = barrier.clone();
            tokio::spawn(async move {
                barrier.wait().await;
                exchange.redeem(position)
            })
        })
        .collect();

    let mut paid = 0u64;
    for handle in handles {
        let settlement = handle.await.unwrap().unwrap();
        assert_eq!(h.ledger.balance_of(&settlement.owner), settlement.payout);
        paid += settlement.payout;
    }

    assert_eq!(paid, owed);
    let snapshot = h.exchange.pool(pool).unwrap();
    assert_eq!(snapshot.custodied_balance, custody_before - owed);
    assert_eq!(snapshot.outstanding_positions, 0);
}
