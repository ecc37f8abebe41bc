//! Adapter layer: exchange quotes arrive as `Decimal`; the metric engine works in f64.

use num_traits::ToPrimitive;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use crate::error::DataError;
use crate::types::{RawSample, RawSeries};

/// Convert f64 to Decimal (lossy, non-finite maps to zero).
pub fn to_decimal(v: f64) -> Decimal {
    Decimal::from_f64(v).unwrap_or(Decimal::ZERO)
}

/// Convert Decimal to f64.
pub fn from_decimal(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}

/// Build a validated series from `(timestamp_ms, price)` quotes.
pub fn series_from_quotes(
    entity: impl Into<String>,
    quotes: &[(i64, Decimal)],
) -> Result<RawSeries, DataError> {
    let samples = quotes
        .iter()
        .map(|&(timestamp_ms, price)| RawSample { timestamp_ms, price: from_decimal(price) })
        .collect();
    RawSeries::new(entity, samples)
}

/// Last quoted price of a validated series, back in `Decimal`.
pub fn last_price(series: &RawSeries) -> Option<Decimal> {
    series.samples().last().map(|s| to_decimal(s.price))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn quotes_convert_to_raw_series() {
        let quotes = [(1_000, dec!(64250.50)), (2_000, dec!(64311.25)), (3_000, dec!(64190.00))];
        let series = series_from_quotes("BTC", &quotes).unwrap();
        assert_eq!(series.entity(), "BTC");
        assert_eq!(series.len(), 3);
        assert!((series.samples()[1].price - 64311.25).abs() < 1e-9);
        assert_eq!(last_price(&series), Some(dec!(64190)));
    }

    #[test]
    fn zero_quote_is_rejected() {
        let quotes = [(1_000, dec!(1.5)), (2_000, dec!(0))];
        assert!(matches!(
            series_from_quotes("DEAD", &quotes),
            Err(DataError::NonPositivePrice { index: 1, .. })
        ));
    }

    #[test]
    fn out_of_order_quotes_are_rejected() {
        let quotes = [(2_000, dec!(1.5)), (1_000, dec!(1.6))];
        assert!(matches!(
            series_from_quotes("ETH", &quotes),
            Err(DataError::NonMonotonic { index: 1, .. })
        ));
    }

    #[test]
    fn decimal_round_trip_is_close() {
        assert_eq!(to_decimal(f64::NAN), Decimal::ZERO);
        assert!((from_decimal(dec!(0.000123)) - 0.000123).abs() < 1e-15);
    }
}
