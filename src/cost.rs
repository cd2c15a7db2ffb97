use crate::types::JobRecord;

pub const BYTES_PER_GB: u64 = 1 << 30;
pub const BYTES_PER_TB: u64 = 1 << 40;

/// On-demand query price, in dollars per 2^40 bytes processed.
pub const COST_PER_TB_IN_DOLLAR: f64 = 5.0;

/// Round half away from zero to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Dollar cost of one query, already rounded to 4 decimals.
///
/// Only jobs known to have missed the cache are charged. Sums over many queries must add these rounded values,
/// never the raw products.
pub fn query_cost(r: &JobRecord) -> f64 {
    if r.cache_hit != Some(false) {
        return 0.0;
    }
    let cost_factor = COST_PER_TB_IN_DOLLAR / BYTES_PER_TB as f64;
    round_to(r.total_bytes_processed as f64 * cost_factor, 4)
}

/// Bytes to GB rounded to 2 decimals. Apply after summing bytes.
pub fn bytes_to_gb(bytes: u64) -> f64 {
    round_to(bytes as f64 / BYTES_PER_GB as f64, 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::job;

    #[test]
    fn one_tib_costs_five_dollars() {
        let r = job("j1", "proj", "a@x.io", "2024-02-10T10:00:00Z", BYTES_PER_TB);
        assert_eq!(query_cost(&r), 5.0);
    }

    #[test]
    fn cache_hit_is_free() {
        let mut r = job("j1", "proj", "a@x.io", "2024-02-10T10:00:00Z", 10 * BYTES_PER_TB);
        r.cache_hit = Some(true);
        assert_eq!(query_cost(&r), 0.0);
    }

    #[test]
    fn unknown_cache_status_is_not_charged() {
        let mut r = job("j1", "proj", "a@x.io", "2024-02-10T10:00:00Z", BYTES_PER_TB);
        r.cache_hit = None;
        assert_eq!(query_cost(&r), 0.0);
    }

    #[test]
    fn small_queries_round_to_zero() {
        // 8_796_093 bytes is just under $0.00004
        let r = job("j1", "proj", "a@x.io", "2024-02-10T10:00:00Z", 8_796_093);
        assert_eq!(query_cost(&r), 0.0);
    }

    #[test]
    fn gb_conversion_rounds_two_places() {
        assert_eq!(bytes_to_gb(BYTES_PER_GB), 1.0);
        assert_eq!(bytes_to_gb(BYTES_PER_GB / 2 * 3), 1.5);
        assert_eq!(bytes_to_gb(5_000_000), 0.0);
        assert_eq!(bytes_to_gb(15_000_000), 0.01);
    }

    #[test]
    fn round_to_is_half_away_from_zero() {
        assert_eq!(round_to(0.125, 2), 0.13);
        assert_eq!(round_to(2.5, 0), 3.0);
    }
}
