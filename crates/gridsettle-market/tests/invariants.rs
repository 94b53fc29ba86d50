//! Invariants under load: conservation over randomized workloads,
//! persistence round trips, and serialized concurrent access.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
    thread,
};

use gridsettle_market::{Market, MarketSnapshot, SharedMarket};
use gridsettle_types::*;
use rand::{Rng, SeedableRng, rngs::StdRng};
use rust_decimal::Decimal;

const T0: i64 = 1_700_000_000;

fn build(clock: &Arc<ManualClock>, oracle: &Arc<FixedPriceOracle>) -> Market {
    Market::new(
        AccountId::new(),
        EngineConfig::default(),
        clock.clone(),
        oracle.clone(),
    )
    .unwrap()
}

fn fresh() -> (Market, Arc<ManualClock>, Arc<FixedPriceOracle>) {
    let clock = Arc::new(ManualClock::at_timestamp(T0));
    let oracle = Arc::new(FixedPriceOracle::new(PriceReading::new(3, 0, clock.now())));
    let market = build(&clock, &oracle);
    (market, clock, oracle)
}

/// Checks every flag-ordering invariant against the registry.
fn assert_flag_invariants(market: &Market, previously_settled: &mut HashSet<CommitmentRef>) {
    for (r, c) in market.registry().iter_commitments() {
        if c.settled {
            assert!(c.pool_processed, "{r} settled before posting");
            assert!(c.market_processed, "{r} settled outside the market");
            assert!(!market.engine().is_buffered(r), "{r} settled but still buffered");
            previously_settled.insert(r);
        } else {
            assert!(!previously_settled.contains(&r), "{r} was unsettled");
        }
        if market.engine().is_buffered(r) {
            assert!(c.pool_processed, "{r} buffered before posting");
        }
    }
}

#[test]
fn conservation_under_random_load() {
    let (mut market, clock, oracle) = fresh();
    let mut rng = StdRng::seed_from_u64(0x6772_6964);
    let mut users: Vec<(AccountId, ProfileId)> = Vec::new();
    let mut settled = HashSet::new();
    let mut filled: HashMap<CommitmentRef, Decimal> = HashMap::new();

    for step in 0..400 {
        match rng.gen_range(0..10) {
            0 | 1 => {
                let owner = AccountId::new();
                let pid = market
                    .register_user(owner, Decimal::new(100, 0), "Grid", "Mixed", Decimal::ZERO)
                    .unwrap();
                users.push((owner, pid));
            }
            2..=4 if !users.is_empty() => {
                let (owner, pid) = users[rng.gen_range(0..users.len())];
                let amount = Decimal::new(rng.gen_range(0..5_000), 2);
                let duration = rng.gen_range(60..10_800);
                market
                    .create_commitment(owner, pid, amount, rng.gen_bool(0.5), duration)
                    .unwrap();
                if market.ledger().holds(market.registry(), pid).unwrap() {
                    market.post_new_commitments(pid).unwrap();
                }
            }
            5 if !users.is_empty() => {
                let (owner, pid) = users[rng.gen_range(0..users.len())];
                if market.ledger().holds(market.registry(), pid).unwrap() {
                    market.withdraw(owner, pid).unwrap();
                } else {
                    market.authorize_custody_transfer(owner, pid).unwrap();
                    market.deposit(pid).unwrap();
                }
            }
            6 | 7 => {
                oracle.set(PriceReading::new(rng.gen_range(1..1_000), 2, clock.now()));
                let report = market.settle_commitment().unwrap();
                for fill in &report.fills {
                    *filled.entry(fill.production).or_default() += fill.quantity;
                    *filled.entry(fill.consumption).or_default() += fill.quantity;
                    assert_eq!(fill.value, fill.quantity * report.price);
                }
            }
            8 => {
                market.check_expired_commitments();
            }
            _ => clock.advance_secs(rng.gen_range(1..900)),
        }

        market
            .verify_conservation()
            .unwrap_or_else(|e| panic!("step {step}: {e}"));
        assert_flag_invariants(&market, &mut settled);
    }

    // Matched quantity never exceeds what was committed, and settled
    // commitments with a positive amount were matched in full.
    for (r, c) in market.registry().iter_commitments() {
        let matched = filled.get(&r).copied().unwrap_or_default();
        if c.settled {
            assert_eq!(matched, c.energy_amount, "{r}");
        } else if let Some(remaining) = market.engine().remaining(r) {
            assert_eq!(matched + remaining, c.energy_amount, "{r}");
        } else {
            assert!(matched <= c.energy_amount, "{r}");
        }
    }

    // Interval totals are the registry's view of posted energy.
    let produced: Decimal = market
        .registry()
        .iter_commitments()
        .filter(|(_, c)| c.pool_processed && c.is_production)
        .map(|(_, c)| c.energy_amount)
        .sum();
    let interval_produced: Decimal = market
        .ledger()
        .intervals()
        .map(|(_, i)| i.energy_produced)
        .sum();
    assert_eq!(produced, interval_produced);
    assert_eq!(produced, market.ledger().total_energy_produced());
}

#[test]
fn expired_entries_never_reappear() {
    let (mut market, clock, _) = fresh();
    let owner = AccountId::new();
    let pid = market
        .register_user(owner, Decimal::ONE, "L", "Solar", Decimal::ZERO)
        .unwrap();
    for duration in [100, 200, 300] {
        market
            .create_commitment(owner, pid, Decimal::ONE, true, duration)
            .unwrap();
    }
    market.authorize_custody_transfer(owner, pid).unwrap();
    market.deposit(pid).unwrap();

    let mut gone = HashSet::new();
    for _ in 0..8 {
        clock.advance_secs(50);
        gone.extend(market.check_expired_commitments());
        let now = clock.now();
        for r in &gone {
            assert!(!market.engine().is_buffered(*r));
            assert!(market.registry().commitment(*r).unwrap().is_expired_at(now));
        }
    }
    assert_eq!(gone.len(), 3);
    assert_eq!(market.engine().lapsed().len(), 3);
    assert_eq!(market.get_buffer_length(), 0);
}

#[test]
fn snapshot_roundtrip_preserves_state_and_replay() {
    let (mut market, clock, oracle) = fresh();
    let (o1, o2) = (AccountId::new(), AccountId::new());
    let p1 = market
        .register_user(o1, Decimal::TEN, "A", "Solar", Decimal::ONE)
        .unwrap();
    let p2 = market
        .register_user(o2, Decimal::TEN, "B", "Load", Decimal::ZERO)
        .unwrap();
    market
        .create_commitment(o1, p1, Decimal::new(7, 0), true, 3_600)
        .unwrap();
    market
        .create_commitment(o2, p2, Decimal::new(10, 0), false, 3_600)
        .unwrap();
    market
        .create_commitment(o2, p2, Decimal::new(2, 0), true, 30)
        .unwrap();
    for (o, p) in [(o1, p1), (o2, p2)] {
        market.authorize_custody_transfer(o, p).unwrap();
        market.deposit(p).unwrap();
    }
    market.settle_commitment().unwrap();
    clock.advance_secs(60);
    market.check_expired_commitments();

    let path = std::env::temp_dir().join(format!("gridsettle-it-{}.json", AccountId::new()));
    market.save(&path).unwrap();
    let loaded = MarketSnapshot::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    let mut restored = Market::restore(
        loaded,
        EngineConfig::default(),
        clock.clone(),
        oracle.clone(),
    )
    .unwrap();

    let a = market.snapshot();
    let b = restored.snapshot();
    assert_eq!(
        serde_json::to_value(&a.registry).unwrap(),
        serde_json::to_value(&b.registry).unwrap()
    );
    assert_eq!(
        serde_json::to_value(&a.ledger).unwrap(),
        serde_json::to_value(&b.ledger).unwrap()
    );
    assert_eq!(a.engine.buffer, b.engine.buffer);
    assert_eq!(a.engine.lapsed, b.engine.lapsed);
    assert_eq!(restored.registry().profiles_of(o2), &[p2]);
    restored.verify_conservation().unwrap();

    // Both copies settle the next round identically.
    market
        .create_commitment(o1, p1, Decimal::new(3, 0), true, 3_600)
        .unwrap();
    restored
        .create_commitment(o1, p1, Decimal::new(3, 0), true, 3_600)
        .unwrap();
    market.post_new_commitments(p1).unwrap();
    restored.post_new_commitments(p1).unwrap();
    oracle.set(PriceReading::new(4, 0, clock.now()));
    let ra = market.settle_commitment().unwrap();
    let rb = restored.settle_commitment().unwrap();
    assert_eq!(ra.round, rb.round);
    assert_eq!(ra.fills, rb.fills);
    assert_eq!(ra.settlement_root, rb.settlement_root);
}

#[test]
fn restore_rejects_unwired_snapshot() {
    let (market, clock, oracle) = fresh();
    let mut snap = market.snapshot();
    snap.ledger.settlement_authority = AccountId::new();
    let err = Market::restore(snap, EngineConfig::default(), clock, oracle)
        .err()
        .unwrap();
    assert!(matches!(err, GridsettleError::Configuration(_)));
}

#[test]
fn concurrent_callers_are_serialized() {
    let (market, clock, oracle) = fresh();
    let shared = SharedMarket::new(market);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let shared = shared.clone();
            thread::spawn(move || {
                let owner = AccountId::new();
                let is_production = i % 2 == 0;
                shared
                    .execute(|m| {
                        let pid =
                            m.register_user(owner, Decimal::TEN, "L", "Mixed", Decimal::ZERO)?;
                        for _ in 0..5 {
                            m.create_commitment(owner, pid, Decimal::ONE, is_production, 3_600)?;
                        }
                        m.authorize_custody_transfer(owner, pid)?;
                        m.deposit(pid)?;
                        Ok(pid)
                    })
                    .unwrap()
            })
        })
        .collect();
    let pids: HashSet<ProfileId> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(pids.len(), 8);

    oracle.set(PriceReading::new(1, 0, clock.now()));
    let report = shared.execute(|m| m.settle_commitment()).unwrap();
    assert_eq!(report.matched_energy().unwrap(), Decimal::new(20, 0));
    assert_eq!(report.settled.len(), 40);

    shared
        .read(|m| {
            assert_eq!(m.get_buffer_length(), 0);
            m.verify_conservation()
        })
        .unwrap()
        .unwrap();
}

#[test]
fn poisoned_lock_surfaces_as_internal() {
    let (market, _, _) = fresh();
    let shared = SharedMarket::new(market);
    let victim = shared.clone();
    let crashed = thread::spawn(move || {
        let _: Result<()> = victim.execute(|_| panic!("operation crashed mid-flight"));
    })
    .join();
    assert!(crashed.is_err());

    let err = shared.execute(|m| Ok(m.get_buffer_length())).unwrap_err();
    assert!(matches!(err, GridsettleError::Internal(_)));
}

#[test]
fn overflowing_deposit_leaves_market_usable() {
    let (market, clock, oracle) = fresh();
    let shared = SharedMarket::new(market);
    let pid = shared
        .execute(|m| {
            let owner = AccountId::new();
            let pid = m.register_user(owner, Decimal::ONE, "X", "Solar", Decimal::MAX)?;
            m.create_commitment(owner, pid, Decimal::MAX, true, 3_600)?;
            m.create_commitment(owner, pid, Decimal::ONE, true, 3_600)?;
            m.authorize_custody_transfer(owner, pid)?;
            Ok(pid)
        })
        .unwrap();

    let depositor = shared.clone();
    let err = thread::spawn(move || depositor.execute(|m| m.deposit(pid)))
        .join()
        .unwrap()
        .unwrap_err();
    assert!(matches!(err, GridsettleError::Overflow(_)));

    shared
        .read(|m| {
            assert!(
                m.get_commitments(pid)
                    .unwrap()
                    .iter()
                    .all(|c| !c.pool_processed)
            );
            assert!(!m.ledger().holds(m.registry(), pid).unwrap());
            assert_eq!(m.get_buffer_length(), 0);
            m.verify_conservation()
        })
        .unwrap()
        .unwrap();

    // The staked total is saturated, so only zero stakes still fit.
    let err = shared
        .execute(|m| m.register_user(AccountId::new(), Decimal::ONE, "L", "Grid", Decimal::ONE))
        .unwrap_err();
    assert!(matches!(err, GridsettleError::Overflow(_)));

    oracle.set(PriceReading::new(2, 0, clock.now()));
    let report = shared
        .execute(|m| {
            for is_production in [true, false] {
                let owner = AccountId::new();
                let p = m.register_user(owner, Decimal::ONE, "L", "Grid", Decimal::ZERO)?;
                m.create_commitment(owner, p, Decimal::new(5, 0), is_production, 3_600)?;
                m.authorize_custody_transfer(owner, p)?;
                m.deposit(p)?;
            }
            m.settle_commitment()
        })
        .unwrap();
    assert_eq!(report.settled.len(), 2);
    assert_eq!(report.total_value().unwrap(), Decimal::new(10, 0));
    assert_eq!(shared.read(|m| m.registry().profile_count()).unwrap(), 3);
}
