use driphub::clock::ManualClock;
use driphub::custody::LedgerCustody;
use driphub::Custody;
use driphub::engine::{CreateRequest, Engine, EngineParams, SwapRequest};
use driphub::executor::FixedPriceExecutor;
use driphub::{Address, Amount, EngineError, IntervalSet, PairKey, PositionId, Token};
use std::sync::Arc;

const DAY: u64 = 86_400;

fn addr(fill: char) -> Address {
    Address::new(format!("0x{}", fill.to_string().repeat(40)))
}

fn token(fill: char) -> Token {
    Token::new(addr(fill))
}

fn amount(v: u64) -> Amount {
    Amount::from(v)
}

struct Harness {
    engine: Engine,
    custody: Arc<LedgerCustody>,
    executor: Arc<FixedPriceExecutor>,
    clock: Arc<ManualClock>,
}

fn harness(start_secs: u64) -> Harness {
    let custody = Arc::new(LedgerCustody::new(addr('e')));
    let executor = Arc::new(FixedPriceExecutor::new(custody.clone(), addr('c'), 1, 1));
    let clock = Arc::new(ManualClock::new(start_secs));
    let params = EngineParams {
        governor: addr('9'),
        fee_vault: addr('f'),
        swap_proxy: addr('c'),
        self_address: addr('e'),
        max_no_of_swaps: 4_320,
        threshold_guard_secs: 600,
        allowed_intervals: IntervalSet::all(),
    };
    let mut engine = Engine::new(params, custody.clone(), executor.clone(), clock.clone());
    let governor = addr('9');
    engine.allow_token(&governor, token('a'), 18).unwrap();
    engine.allow_token(&governor, token('b'), 18).unwrap();
    engine.add_swap_executor(&governor, addr('d')).unwrap();
    Harness {
        engine,
        custody,
        executor,
        clock,
    }
}

fn daily_create(amount_in: u64, no_of_swaps: u64) -> CreateRequest {
    CreateRequest {
        from: token('a'),
        to: token('b'),
        interval_seconds: DAY,
        amount: amount(amount_in),
        no_of_swaps,
    }
}

/// One pair swap delivering exactly `delivered` of B.
fn run_swap_delivering(h: &mut Harness, delivered: u64) {
    let pair = PairKey::new(token('a'), token('b'));
    let info = h.engine.next_swap_info(&pair);
    h.executor.push_delivery(amount(delivered));
    h.engine
        .swap(
            &addr('d'),
            vec![SwapRequest {
                from: token('a'),
                to: token('b'),
                amount: info.total_input,
                min_out: Amount::ZERO,
                exec_data: serde_json::Value::Null,
            }],
            &addr('d'),
        )
        .unwrap();
}

#[test]
fn test_increase_mid_flight_reanchors_and_carries_earnings() {
    let mut h = harness(10 * DAY + 3_600);
    let user = addr('1');
    h.custody.mint(&token('a'), &user, amount(1_600));

    let id = h.engine.create_position(&user, daily_create(1_000, 5)).unwrap();

    // Two swaps at 1 B per A: 200 in, 200 out each.
    for day in 0..2 {
        h.clock.set((10 + day) * DAY + 3_600);
        run_swap_delivering(&mut h, 200);
    }
    assert_eq!(h.engine.position_details(id).unwrap().swapped, amount(400));

    // Add 600 to the residual 600 over 3 remaining swaps: rate becomes 400.
    h.clock.set(12 * DAY + 3_600);
    h.engine
        .modify_position(&user, id, amount(600), 3, true)
        .unwrap();

    let position = h.engine.position(id).unwrap();
    assert_eq!(position.rate, amount(400));
    assert_eq!(position.starting_swap, 2);
    assert_eq!(position.final_swap, 5);
    assert_eq!(position.last_updated_swap, 2);
    assert_eq!(position.carry, amount(400));
    assert_eq!(h.custody.balance_of(&token('a'), &user), Amount::ZERO);

    // Three more swaps, now at 2 B per A: 400 in, 800 out each.
    for day in 2..5 {
        h.clock.set((10 + day) * DAY + 3_600);
        run_swap_delivering(&mut h, 800);
    }

    let details = h.engine.position_details(id).unwrap();
    assert_eq!(details.swapped, amount(2_800));
    assert_eq!(details.unswapped, Amount::ZERO);

    assert_eq!(h.engine.withdraw_swapped(&user, id, &user).unwrap(), amount(2_800));
    let (unswapped, swapped) = h.engine.terminate_position(&user, id, &user).unwrap();
    assert_eq!(unswapped, Amount::ZERO);
    assert_eq!(swapped, Amount::ZERO);
}

#[test]
fn test_decrease_returns_funds_immediately() {
    let mut h = harness(10 * DAY + 3_600);
    let user = addr('1');
    h.custody.mint(&token('a'), &user, amount(1_000));
    let id = h.engine.create_position(&user, daily_create(1_000, 5)).unwrap();

    // Shrink the schedule: 1000 unswapped minus 600, over 2 swaps.
    h.engine
        .modify_position(&user, id, amount(600), 2, false)
        .unwrap();

    assert_eq!(h.custody.balance_of(&token('a'), &user), amount(600));
    let position = h.engine.position(id).unwrap();
    assert_eq!(position.rate, amount(200));
    assert_eq!(position.final_swap - position.starting_swap, 2);

    let triple = position.triple();
    assert_eq!(
        h.engine.triple_state(&triple).unwrap().next_amount,
        amount(200)
    );
}

#[test]
fn test_decrease_underflow_is_invalid_amount() {
    let mut h = harness(10 * DAY + 3_600);
    let user = addr('1');
    h.custody.mint(&token('a'), &user, amount(1_000));
    let id = h.engine.create_position(&user, daily_create(1_000, 5)).unwrap();

    assert_eq!(
        h.engine
            .modify_position(&user, id, amount(1_001), 5, false)
            .unwrap_err(),
        EngineError::InvalidAmount
    );
}

#[test]
fn test_no_changes_is_rejected() {
    let mut h = harness(10 * DAY + 3_600);
    let user = addr('1');
    h.custody.mint(&token('a'), &user, amount(1_000));
    let id = h.engine.create_position(&user, daily_create(1_000, 5)).unwrap();

    assert_eq!(
        h.engine
            .modify_position(&user, id, Amount::ZERO, 5, true)
            .unwrap_err(),
        EngineError::NoChanges
    );
}

#[test]
fn test_schedule_only_change_moves_rate() {
    let mut h = harness(10 * DAY + 3_600);
    let user = addr('1');
    h.custody.mint(&token('a'), &user, amount(1_000));
    let id = h.engine.create_position(&user, daily_create(1_000, 5)).unwrap();

    // Same budget, stretched over 10 swaps.
    h.engine
        .modify_position(&user, id, Amount::ZERO, 10, true)
        .unwrap();

    let position = h.engine.position(id).unwrap();
    assert_eq!(position.rate, amount(100));
    assert_eq!(position.final_swap - position.starting_swap, 10);
    assert_eq!(h.custody.balance_of(&token('a'), &user), Amount::ZERO);
}

#[test]
fn test_swap_count_bounds_are_enforced() {
    let mut h = harness(10 * DAY + 3_600);
    let user = addr('1');
    h.custody.mint(&token('a'), &user, amount(1_000));
    let id = h.engine.create_position(&user, daily_create(1_000, 5)).unwrap();

    // A live budget needs a schedule.
    assert_eq!(
        h.engine
            .modify_position(&user, id, amount(100), 0, true)
            .unwrap_err(),
        EngineError::InvalidNoOfSwaps
    );
    assert_eq!(
        h.engine
            .modify_position(&user, id, amount(100), 100_000, true)
            .unwrap_err(),
        EngineError::InvalidNoOfSwaps
    );
    // Emptying the budget forbids a schedule.
    assert_eq!(
        h.engine
            .modify_position(&user, id, amount(1_000), 3, false)
            .unwrap_err(),
        EngineError::InvalidNoOfSwaps
    );
}

#[test]
fn test_withdraw_to_zero_then_keep_dripping() {
    let mut h = harness(10 * DAY + 3_600);
    let user = addr('1');
    h.custody.mint(&token('a'), &user, amount(1_000));
    let id = h.engine.create_position(&user, daily_create(1_000, 5)).unwrap();

    h.clock.set(10 * DAY + 3_600);
    run_swap_delivering(&mut h, 200);
    assert_eq!(h.engine.withdraw_swapped(&user, id, &user).unwrap(), amount(200));

    // Drain the budget to zero; the already-withdrawn earnings stay put.
    h.engine
        .modify_position(&user, id, amount(800), 0, false)
        .unwrap();
    let position = h.engine.position(id).unwrap();
    assert_eq!(position.rate, Amount::ZERO);
    assert_eq!(position.carry, Amount::ZERO);
    assert_eq!(h.custody.balance_of(&token('a'), &user), amount(800));

    let triple = position.triple();
    let state = h.engine.triple_state(&triple).unwrap();
    assert!(!state.has_pending());
    assert!(h
        .engine
        .active_intervals(&PairKey::new(token('a'), token('b')))
        .is_empty());

    let (unswapped, swapped) = h.engine.terminate_position(&user, id, &user).unwrap();
    assert_eq!(unswapped, Amount::ZERO);
    assert_eq!(swapped, Amount::ZERO);
}

#[test]
fn test_modify_rate_truncation_parks_dust_in_residue() {
    let mut h = harness(10 * DAY + 3_600);
    let user = addr('1');
    h.custody.mint(&token('a'), &user, amount(1_000));
    let id = h.engine.create_position(&user, daily_create(1_000, 5)).unwrap();

    // 1000 over 3 swaps floors to 333; the stray 1 stays withdrawable.
    h.engine
        .modify_position(&user, id, Amount::ZERO, 3, true)
        .unwrap();

    let position = h.engine.position(id).unwrap();
    assert_eq!(position.rate, amount(333));
    assert_eq!(position.residue, amount(1));

    let (unswapped, _) = h.engine.terminate_position(&user, id, &user).unwrap();
    assert_eq!(unswapped, amount(1_000));
}

#[test]
fn test_unknown_position_is_invalid() {
    let mut h = harness(10 * DAY + 3_600);
    assert_eq!(
        h.engine
            .modify_position(&addr('1'), PositionId::new(42), amount(1), 1, true)
            .unwrap_err(),
        EngineError::InvalidPosition
    );
}
