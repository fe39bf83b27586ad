use driphub::clock::ManualClock;
use driphub::custody::LedgerCustody;
use driphub::Custody;
use driphub::engine::{CreateRequest, Engine, EngineParams, SwapRequest};
use driphub::executor::FixedPriceExecutor;
use driphub::{Address, Amount, EngineError, IntervalMask, IntervalSet, PairKey, Token};
use std::sync::Arc;

const HOUR: u64 = 3_600;
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

fn pair() -> PairKey {
    PairKey::new(token('a'), token('b'))
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

fn create(h: &mut Harness, user: &Address, interval: u64, amount_in: u64, swaps: u64) {
    h.engine
        .create_position(
            user,
            CreateRequest {
                from: token('a'),
                to: token('b'),
                interval_seconds: interval,
                amount: amount(amount_in),
                no_of_swaps: swaps,
            },
        )
        .unwrap();
}

fn swap_request(declared: u64) -> SwapRequest {
    SwapRequest {
        from: token('a'),
        to: token('b'),
        amount: amount(declared),
        min_out: Amount::ZERO,
        exec_data: serde_json::Value::Null,
    }
}

#[test]
fn test_aligned_intervals_coalesce() {
    // Both streams are created five minutes into the very first windows.
    let mut h = harness(300);
    let user = addr('1');
    h.custody.mint(&token('a'), &user, amount(2_000));
    create(&mut h, &user, HOUR, 1_000, 10); // rate 100
    create(&mut h, &user, DAY, 700, 7); // rate 100

    // At one hour the hourly window has opened; the daily one has not,
    // and the low-to-high break leaves it untouched.
    h.clock.set(HOUR);
    let info = h.engine.next_swap_info(&pair());
    assert_eq!(info.total_input, amount(100));
    assert_eq!(
        info.intervals_in_swap.iter().map(|m| m.seconds()).collect::<Vec<_>>(),
        vec![HOUR]
    );

    h.engine
        .swap(&addr('d'), vec![swap_request(100)], &addr('d'))
        .unwrap();

    // At one day both qualify and swap in a single call.
    h.clock.set(DAY);
    let info = h.engine.next_swap_info(&pair());
    assert_eq!(info.total_input, amount(200));
    assert_eq!(
        info.intervals_in_swap.iter().map(|m| m.seconds()).collect::<Vec<_>>(),
        vec![HOUR, DAY]
    );

    let outcomes = h
        .engine
        .swap(&addr('d'), vec![swap_request(200)], &addr('d'))
        .unwrap();
    assert_eq!(outcomes[0].total_input, amount(200));
    assert_eq!(outcomes[0].delivered, amount(200));

    let hourly = driphub::TripleKey::new(token('a'), token('b'), IntervalMask::from_seconds(HOUR).unwrap());
    let daily = driphub::TripleKey::new(token('a'), token('b'), IntervalMask::from_seconds(DAY).unwrap());
    assert_eq!(h.engine.triple_state(&hourly).unwrap().performed_swaps, 2);
    assert_eq!(h.engine.triple_state(&daily).unwrap().performed_swaps, 1);
}

#[test]
fn test_unopened_smallest_window_blocks_larger_ones() {
    let mut h = harness(300);
    let user = addr('1');
    h.custody.mint(&token('a'), &user, amount(2_000));
    create(&mut h, &user, HOUR, 1_000, 10);
    create(&mut h, &user, DAY, 700, 7);

    // Run the hourly swap, then come back mid-hour on day one: the hourly
    // window is closed again, and the break also skips the (open) daily
    // window sitting behind it.
    h.clock.set(HOUR);
    h.engine
        .swap(&addr('d'), vec![swap_request(100)], &addr('d'))
        .unwrap();

    h.clock.set(HOUR + 600);
    let info = h.engine.next_swap_info(&pair());
    assert_eq!(info.total_input, Amount::ZERO);
    assert!(info.intervals_in_swap.is_empty());
    assert_eq!(
        h.engine
            .swap(&addr('d'), vec![swap_request(0)], &addr('d'))
            .unwrap_err(),
        EngineError::NoAvailableSwap
    );
}

#[test]
fn test_declared_amount_must_match_aggregate() {
    let mut h = harness(300);
    let user = addr('1');
    h.custody.mint(&token('a'), &user, amount(1_000));
    create(&mut h, &user, HOUR, 1_000, 10);

    h.clock.set(HOUR);
    assert_eq!(
        h.engine
            .swap(&addr('d'), vec![swap_request(99)], &addr('d'))
            .unwrap_err(),
        EngineError::InvalidSwapAmount
    );
}

#[test]
fn test_swap_is_executor_gated() {
    let mut h = harness(300);
    let user = addr('1');
    h.custody.mint(&token('a'), &user, amount(1_000));
    create(&mut h, &user, HOUR, 1_000, 10);

    h.clock.set(HOUR);
    assert_eq!(
        h.engine
            .swap(&user, vec![swap_request(100)], &addr('d'))
            .unwrap_err(),
        EngineError::UnauthorizedCaller
    );
}

#[test]
fn test_delivery_below_min_out_reverts() {
    let mut h = harness(300);
    let user = addr('1');
    h.custody.mint(&token('a'), &user, amount(1_000));
    create(&mut h, &user, HOUR, 1_000, 10);

    h.clock.set(HOUR);
    h.executor.push_delivery(amount(40));
    let mut request = swap_request(100);
    request.min_out = amount(50);
    assert_eq!(
        h.engine
            .swap(&addr('d'), vec![request], &addr('d'))
            .unwrap_err(),
        EngineError::InvalidReturnAmount
    );
}

#[test]
fn test_failing_executor_surfaces_swap_call_failed() {
    let mut h = harness(300);
    let user = addr('1');
    h.custody.mint(&token('a'), &user, amount(1_000));
    create(&mut h, &user, HOUR, 1_000, 10);

    h.clock.set(HOUR);
    h.executor.set_failing(true);
    let err = h
        .engine
        .swap(&addr('d'), vec![swap_request(100)], &addr('d'))
        .unwrap_err();
    assert!(matches!(err, EngineError::SwapCallFailed(_)));

    // Nothing registered.
    let hourly = driphub::TripleKey::new(token('a'), token('b'), IntervalMask::from_seconds(HOUR).unwrap());
    assert_eq!(h.engine.triple_state(&hourly).unwrap().performed_swaps, 0);
}

#[test]
fn test_fees_split_between_vault_and_operator() {
    let mut h = harness(300);
    let governor = addr('9');
    let user = addr('1');
    h.custody.mint(&token('a'), &user, amount(100_000));

    // 2% swap fee on the hourly interval, 25% of it to the platform.
    let mask = IntervalMask::from_seconds(HOUR).unwrap();
    h.engine.set_swap_fee(&governor, mask, 200).unwrap();
    h.engine.set_platform_fee_ratio(&governor, 2_500).unwrap();

    create(&mut h, &user, HOUR, 100_000, 10); // rate 10_000

    h.clock.set(HOUR);
    let info = h.engine.next_swap_info(&pair());
    // 2% of 10_000 = 200 gross fee; platform takes 50, operator 150.
    assert_eq!(info.total_input, amount(9_800));
    assert_eq!(info.platform_fee, amount(50));
    assert_eq!(info.operator_reward, amount(150));

    let reward_recipient = addr('7');
    let outcomes = h
        .engine
        .swap(
            &addr('d'),
            vec![SwapRequest {
                from: token('a'),
                to: token('b'),
                amount: amount(9_800),
                min_out: Amount::ZERO,
                exec_data: serde_json::Value::Null,
            }],
            &reward_recipient,
        )
        .unwrap();
    assert_eq!(outcomes[0].total_input, amount(9_800));

    assert_eq!(h.custody.balance_of(&token('a'), &addr('f')), amount(50));
    assert_eq!(
        h.custody.balance_of(&token('a'), &reward_recipient),
        amount(150)
    );
}

#[test]
fn test_fee_is_taken_from_entitlement_math() {
    let mut h = harness(300);
    let governor = addr('9');
    let user = addr('1');
    h.custody.mint(&token('a'), &user, amount(100_000));

    let mask = IntervalMask::from_seconds(HOUR).unwrap();
    h.engine.set_swap_fee(&governor, mask, 200).unwrap();
    create(&mut h, &user, HOUR, 100_000, 10);

    h.clock.set(HOUR);
    let info = h.engine.next_swap_info(&pair());
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

    // delivered = 9_800 at unit price; per-unit ratio floors against the
    // gross rate of 10_000.
    let id = driphub::PositionId::new(1);
    assert_eq!(
        h.engine.position_details(id).unwrap().swapped,
        amount(9_800)
    );
}

#[test]
fn test_seconds_until_next_swap() {
    let mut h = harness(300);
    let user = addr('1');

    // Nothing scheduled at all.
    assert_eq!(h.engine.seconds_until_next_swap(&pair()), u64::MAX);

    h.custody.mint(&token('a'), &user, amount(2_000));
    create(&mut h, &user, HOUR, 1_000, 10);

    // Pending amount, window not open yet: wait for the hour mark.
    assert_eq!(h.engine.seconds_until_next_swap(&pair()), HOUR - 300);

    // Window open with pending amount: ready now.
    h.clock.set(HOUR + 10);
    assert_eq!(h.engine.seconds_until_next_swap(&pair()), 0);

    h.engine
        .swap(&addr('d'), vec![swap_request(100)], &addr('d'))
        .unwrap();
    assert_eq!(h.engine.seconds_until_next_swap(&pair()), HOUR - 10);
}

#[test]
fn test_seconds_until_next_swap_deferred_only() {
    // A deferred-only triple reports its future window, not zero.
    let mut h = harness(100 * HOUR + 55 * 60);
    let user = addr('1');
    h.custody.mint(&token('a'), &user, amount(1_000));
    create(&mut h, &user, HOUR, 500, 5);

    let state = h
        .engine
        .triple_state(&driphub::TripleKey::new(
            token('a'),
            token('b'),
            IntervalMask::from_seconds(HOUR).unwrap(),
        ))
        .unwrap();
    assert_eq!(state.next_amount, Amount::ZERO);
    assert_eq!(state.next_to_next_amount, amount(100));

    assert_eq!(h.engine.seconds_until_next_swap(&pair()), u64::MAX);
}

#[test]
fn test_swapped_event_carries_totals() {
    let mut h = harness(300);
    let user = addr('1');
    h.custody.mint(&token('a'), &user, amount(1_000));
    create(&mut h, &user, HOUR, 1_000, 10);

    h.clock.set(HOUR);
    h.engine
        .swap(&addr('d'), vec![swap_request(100)], &addr('d'))
        .unwrap();

    let events = h.engine.take_events();
    let swapped = events
        .iter()
        .find_map(|e| match e {
            driphub::Event::Swapped {
                total_input,
                delivered,
                ..
            } => Some((*total_input, *delivered)),
            _ => None,
        })
        .expect("swap must emit an event");
    assert_eq!(swapped, (amount(100), amount(100)));
}
