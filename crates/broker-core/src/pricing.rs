//! Dynamic carrier pricing.
//!
//! A load starts "cold" (target 95% of the listed rate, cap at 100%) and
//! heats up as pickup approaches or as carriers turn it down for price.
//! Pressure is the larger of two signals, each in `[0, 1]`:
//!
//! - urgency: linear over the 72 hours before pickup
//! - rejection pressure: linear over five "Rate too low" rejections
//!
//! ```text
//! target = rate * (0.95 + pressure * 0.05)          -> [0.95, 1.00]
//! cap    = rate * (1.00 + min(pressure * 0.06, 0.05)) -> [1.00, 1.05]
//! ```

use chrono::NaiveDateTime;

use crate::models::Load;

/// Hours before pickup over which urgency ramps from 0 to 1.
pub const URGENCY_WINDOW_HOURS: f64 = 72.0;

/// Rate rejections at which rejection pressure saturates.
pub const REJECTION_SATURATION: f64 = 5.0;

const TARGET_BASE: f64 = 0.95;
const TARGET_SPAN: f64 = 0.05;
const CAP_SLOPE: f64 = 0.06;
const CAP_CEILING: f64 = 0.05;

/// Historical call activity for one load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallPressure {
    /// Calls that discussed the load.
    pub total_calls: i64,
    /// Calls rejected with reason "Rate too low".
    pub rate_rejections: i64,
}

/// Derived carrier rates for a load.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricedRates {
    pub target_carrier_rate: f64,
    pub cap_carrier_rate: f64,
}

/// Urgency from time to pickup, clamped to `[0, 1]`.
///
/// Past pickups count as fully urgent.
pub fn urgency(pickup: NaiveDateTime, now: NaiveDateTime) -> f64 {
    let hours = (pickup - now).num_milliseconds() as f64 / 3_600_000.0;
    (1.0 - hours.max(0.0) / URGENCY_WINDOW_HOURS).clamp(0.0, 1.0)
}

/// Rejection pressure from "Rate too low" rejections, clamped to `[0, 1]`.
pub fn rejection_pressure(rate_rejections: i64) -> f64 {
    (rate_rejections as f64 / REJECTION_SATURATION).clamp(0.0, 1.0)
}

/// Target and cap rates for a listed rate.
pub fn price(
    loadboard_rate: f64,
    pickup: NaiveDateTime,
    pressure: CallPressure,
    now: NaiveDateTime,
) -> PricedRates {
    let pressure = urgency(pickup, now).max(rejection_pressure(pressure.rate_rejections));

    let target_multiplier = TARGET_BASE + pressure * TARGET_SPAN;
    let cap_multiplier = 1.0 + (pressure * CAP_SLOPE).min(CAP_CEILING);

    PricedRates {
        target_carrier_rate: round_cents(loadboard_rate * target_multiplier),
        cap_carrier_rate: round_cents(loadboard_rate * cap_multiplier),
    }
}

/// Fill in a load's derived rate fields.
pub fn apply_pricing(load: &mut Load, pressure: CallPressure, now: NaiveDateTime) {
    let rates = price(load.loadboard_rate, load.pickup_datetime, pressure, now);
    load.target_carrier_rate = Some(rates.target_carrier_rate);
    load.cap_carrier_rate = Some(rates.cap_carrier_rate);
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::models::fixtures;

    fn now() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2027-06-10T12:00:00", crate::DATETIME_FORMAT).unwrap()
    }

    #[test]
    fn test_cold_load_prices_at_floor() {
        let pickup = now() + Duration::hours(72);
        let rates = price(2800.0, pickup, CallPressure::default(), now());
        assert_eq!(rates.target_carrier_rate, 2660.0);
        assert_eq!(rates.cap_carrier_rate, 2800.0);

        let far = now() + Duration::days(30);
        assert_eq!(price(2800.0, far, CallPressure::default(), now()), rates);
    }

    #[test]
    fn test_saturated_pressure_prices_at_ceiling() {
        let pressure = CallPressure {
            total_calls: 9,
            rate_rejections: 7,
        };
        let rates = price(2800.0, now(), pressure, now());
        assert_eq!(rates.target_carrier_rate, 2800.0);
        assert_eq!(rates.cap_carrier_rate, 2940.0);
    }

    #[test]
    fn test_urgency_is_clamped() {
        assert_eq!(urgency(now() - Duration::hours(5), now()), 1.0);
        assert_eq!(urgency(now(), now()), 1.0);
        assert_eq!(urgency(now() + Duration::hours(36), now()), 0.5);
        assert_eq!(urgency(now() + Duration::hours(100), now()), 0.0);
    }

    #[test]
    fn test_rejection_pressure_saturates() {
        assert_eq!(rejection_pressure(0), 0.0);
        assert!((rejection_pressure(2) - 0.4).abs() < 1e-12);
        assert_eq!(rejection_pressure(5), 1.0);
        assert_eq!(rejection_pressure(50), 1.0);
    }

    #[test]
    fn test_pressure_takes_larger_signal() {
        // 36h out (urgency 0.5) with one rejection (0.2): urgency wins.
        let pickup = now() + Duration::hours(36);
        let pressure = CallPressure {
            total_calls: 3,
            rate_rejections: 1,
        };
        let rates = price(1000.0, pickup, pressure, now());
        assert_eq!(rates.target_carrier_rate, 975.0);
        assert_eq!(rates.cap_carrier_rate, 1030.0);
    }

    #[test]
    fn test_rates_stay_in_bounds() {
        for hours in [-48, 0, 1, 24, 48, 71, 72, 500] {
            for rejections in [0, 1, 3, 5, 10] {
                let rates = price(
                    2000.0,
                    now() + Duration::hours(hours),
                    CallPressure {
                        total_calls: rejections,
                        rate_rejections: rejections,
                    },
                    now(),
                );
                assert!((1900.0..=2000.0).contains(&rates.target_carrier_rate));
                assert!((2000.0..=2100.0).contains(&rates.cap_carrier_rate));
            }
        }
    }

    #[test]
    fn test_apply_pricing_sets_both_fields() {
        let mut load = fixtures::load();
        let now = load.pickup_datetime - Duration::days(10);
        apply_pricing(&mut load, CallPressure::default(), now);
        assert_eq!(load.target_carrier_rate, Some(2660.0));
        assert_eq!(load.cap_carrier_rate, Some(2800.0));
    }
}
