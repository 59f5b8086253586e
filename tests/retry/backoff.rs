use std::time::Duration;
use tower_shield_retry::{
    ConstantBackoff, ExponentialBackoff, FnInterval, IntervalFunction, LinearBackoff,
};

fn schedule_secs(schedule: &dyn IntervalFunction, calls: usize) -> Vec<u64> {
    (0..calls).map(|n| schedule.interval(n).as_secs()).collect()
}

#[test]
fn constant_backoff_repeats_forever() {
    let schedule = ConstantBackoff::new(Duration::from_secs(10));
    assert_eq!(schedule_secs(&schedule, 3), vec![10, 10, 10]);
}

#[test]
fn linear_backoff_climbs_then_sticks_at_the_cap() {
    let schedule = LinearBackoff::new(Duration::from_secs(10), Duration::from_secs(60));
    assert_eq!(
        schedule_secs(&schedule, 8),
        vec![10, 20, 30, 40, 50, 60, 60, 60]
    );
}

#[test]
fn exponential_backoff_accelerates_then_sticks_at_the_cap() {
    let schedule = ExponentialBackoff::new(Duration::from_secs(5), Duration::from_secs(60));
    assert_eq!(
        schedule_secs(&schedule, 8),
        vec![5, 10, 20, 35, 55, 60, 60, 60]
    );
}

#[test]
fn zero_interval_backoffs_never_wait() {
    let schedule = ConstantBackoff::new(Duration::ZERO);
    assert_eq!(schedule_secs(&schedule, 4), vec![0, 0, 0, 0]);
}

#[test]
fn custom_schedules_see_the_retry_index() {
    let schedule = FnInterval::new(|retry| Duration::from_millis(100 * (retry as u64 + 1)));
    assert_eq!(schedule.interval(0), Duration::from_millis(100));
    assert_eq!(schedule.interval(4), Duration::from_millis(500));
}

#[test]
fn a_cap_below_the_interval_applies_from_the_first_call() {
    let linear = LinearBackoff::new(Duration::from_secs(30), Duration::from_secs(10));
    assert_eq!(linear.interval(0), Duration::from_secs(10));

    let exponential = ExponentialBackoff::new(Duration::from_secs(30), Duration::from_secs(10));
    assert_eq!(exponential.interval(0), Duration::from_secs(10));
}
