//! Daily time-series construction.

use crate::error::IngestError;
use crate::listing::Listing;
use chrono::{NaiveDate, NaiveTime};
use ledger_mm_domain::entities::{Observation, ObservationSequence, PricePoint};
use std::collections::BTreeMap;

#[derive(Debug, Default, Clone, Copy)]
struct DayPrints {
    sum: f64,
    count: usize,
}

#[derive(Debug, Clone, Copy)]
struct DayAsks {
    min: f64,
    count: usize,
}

/// Resamples sold prints to UTC calendar days and joins active snapshots.
///
/// One observation per calendar day from the first sale to the last. A day
/// with sales carries the mean sale price and the number of sales; a day
/// without sales has no trade price and a trade volume of 0. The lowest ask
/// and ask count are joined onto any covered day with active listings. Asks
/// outside the sale window are dropped.
///
/// # Errors
/// Returns [`IngestError::Domain`] if the resulting sequence is not strictly
/// ordered.
pub fn build_daily_series(
    sold: &[Listing],
    active: &[Listing],
) -> Result<ObservationSequence, IngestError> {
    let mut prints: BTreeMap<NaiveDate, DayPrints> = BTreeMap::new();
    for listing in sold {
        let day = prints.entry(listing.timestamp.date_naive()).or_default();
        day.sum += listing.price;
        day.count += 1;
    }

    let mut asks: BTreeMap<NaiveDate, DayAsks> = BTreeMap::new();
    for listing in active {
        asks.entry(listing.timestamp.date_naive())
            .and_modify(|a| {
                a.min = a.min.min(listing.price);
                a.count += 1;
            })
            .or_insert(DayAsks {
                min: listing.price,
                count: 1,
            });
    }

    let (Some(&first), Some(&last)) = (prints.keys().next(), prints.keys().next_back()) else {
        return Ok(ObservationSequence::empty());
    };

    let observations = first
        .iter_days()
        .take_while(|date| *date <= last)
        .map(|date| {
            let mut obs = Observation::new(date.and_time(NaiveTime::MIN).and_utc());
            match prints.get(&date) {
                Some(day) => {
                    obs = obs.with_trade(day.sum / day.count as f64, day.count as f64);
                }
                None => obs.trade_volume = Some(0.0),
            }
            if let Some(ask) = asks.get(&date) {
                obs = obs
                    .with_best_ask(ask.min)
                    .with_listed_volume(ask.count as f64);
            }
            obs
        })
        .collect();

    Ok(ObservationSequence::new(observations)?)
}

/// Sale prints as a calibration history, in input order.
pub fn price_history(sold: &[Listing]) -> Vec<PricePoint> {
    sold.iter()
        .map(|l| PricePoint::new(l.timestamp, l.price))
        .collect()
}
