use oddsmaker::application::Exchange;
use oddsmaker::domain::{PoolId, BPS_DENOMINATOR};

/// Assert the pool invariants that must hold after every operation.
pub fn assert_pool_consistent(exchange: &Exchange, pool_id: PoolId) {
    let pool = exchange.pool(pool_id).expect("pool snapshot");
    assert!(pool.yes_reserve > 0 && pool.no_reserve > 0, "empty reserve: {pool:?}");
    assert_eq!(
        pool.k,
        u128::from(pool.yes_reserve) * u128::from(pool.no_reserve),
        "k drifted from the reserve product"
    );
    assert!(
        pool.custodied_balance >= pool.yes_liability.max(pool.no_liability),
        "insolvent pool: {pool:?}"
    );
    assert_eq!(pool.odds.yes() + pool.odds.no(), BPS_DENOMINATOR);
}
