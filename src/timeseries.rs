use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::stock::DateWindow;

/// Daily closing prices for one symbol, keyed (and therefore sorted) by date.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    pub symbol: String,
    pub entries: BTreeMap<NaiveDate, f64>,
}

impl PriceSeries {
    pub fn new(symbol: &str) -> Self {
        PriceSeries {
            symbol: symbol.to_string(),
            entries: BTreeMap::new(),
        }
    }

    pub fn from_entries<I>(symbol: &str, entries: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        PriceSeries {
            symbol: symbol.to_string(),
            entries: entries.into_iter().collect(),
        }
    }

    /// Inserting an existing date overwrites its close.
    pub fn insert(&mut self, date: NaiveDate, close: f64) {
        self.entries.insert(date, close);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.entries.iter().map(|(d, c)| (*d, *c))
    }

    /// The inclusive slice `[window.start, window.end]`.
    pub fn between(&self, window: &DateWindow) -> PriceSeries {
        if window.start > window.end {
            return PriceSeries::new(&self.symbol);
        }
        PriceSeries {
            symbol: self.symbol.clone(),
            entries: self
                .entries
                .range(window.start..=window.end)
                .map(|(d, c)| (*d, *c))
                .collect(),
        }
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.entries.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.entries.keys().next_back().copied()
    }

    pub fn min_close(&self) -> Option<f64> {
        self.entries.values().copied().reduce(f64::min)
    }

    pub fn max_close(&self) -> Option<f64> {
        self.entries.values().copied().reduce(f64::max)
    }
}

/// Per-run collection of symbol -> series, in the order symbols were added.
///
/// Only series with at least one point are accepted, so every entry in the
/// table is something the chart can draw.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceTable {
    series: Vec<PriceSeries>,
}

impl PriceTable {
    pub fn new() -> Self {
        PriceTable::default()
    }

    /// Returns `false` (and stores nothing) for an empty series. A symbol
    /// that is already present has its series replaced in place.
    pub fn insert(&mut self, series: PriceSeries) -> bool {
        if series.is_empty() {
            return false;
        }
        match self.series.iter_mut().find(|s| s.symbol == series.symbol) {
            Some(existing) => *existing = series,
            None => self.series.push(series),
        }
        true
    }

    pub fn get(&self, symbol: &str) -> Option<&PriceSeries> {
        self.series.iter().find(|s| s.symbol == symbol)
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.series.iter().map(|s| s.symbol.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PriceSeries> {
        self.series.iter()
    }

    /// Earliest and latest date across all series.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.series.iter().filter_map(|s| s.first_date()).min()?;
        let last = self.series.iter().filter_map(|s| s.last_date()).max()?;
        Some((first, last))
    }

    /// Lowest and highest close across all series.
    pub fn close_span(&self) -> Option<(f64, f64)> {
        let min = self
            .series
            .iter()
            .filter_map(|s| s.min_close())
            .reduce(f64::min)?;
        let max = self
            .series
            .iter()
            .filter_map(|s| s.max_close())
            .reduce(f64::max)?;
        Some((min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn between_is_inclusive_on_both_ends() {
        let series = PriceSeries::from_entries(
            "JPM",
            vec![
                (day(2024, 1, 1), 1.0),
                (day(2024, 1, 2), 2.0),
                (day(2024, 1, 3), 3.0),
                (day(2024, 1, 4), 4.0),
            ],
        );
        let window = DateWindow::new(day(2024, 1, 2), day(2024, 1, 3));
        let sliced = series.between(&window);
        assert_eq!(
            sliced.iter().collect::<Vec<_>>(),
            vec![(day(2024, 1, 2), 2.0), (day(2024, 1, 3), 3.0)]
        );
        assert_eq!(sliced.symbol, "JPM");
    }

    #[test]
    fn between_outside_history_is_empty() {
        let series = PriceSeries::from_entries("BX", vec![(day(2020, 5, 1), 50.0)]);
        let window = DateWindow::new(day(2024, 1, 1), day(2024, 12, 31));
        assert!(series.between(&window).is_empty());
    }

    #[test]
    fn table_refuses_empty_series() {
        let mut table = PriceTable::new();
        assert!(!table.insert(PriceSeries::new("BAC")));
        assert!(table.is_empty());
        assert!(table.get("BAC").is_none());
    }

    #[test]
    fn table_keeps_insertion_order_and_replaces() {
        let mut table = PriceTable::new();
        table.insert(PriceSeries::from_entries("JPM", vec![(day(2024, 1, 2), 170.0)]));
        table.insert(PriceSeries::from_entries("GS", vec![(day(2024, 1, 3), 380.0)]));
        table.insert(PriceSeries::from_entries("JPM", vec![(day(2024, 1, 4), 171.0)]));
        assert_eq!(table.symbols(), vec!["JPM", "GS"]);
        assert_eq!(table.get("JPM").unwrap().first_date(), Some(day(2024, 1, 4)));
    }

    #[test]
    fn spans_cover_every_series() {
        let mut table = PriceTable::new();
        table.insert(PriceSeries::from_entries(
            "C",
            vec![(day(2024, 2, 1), 50.0), (day(2024, 3, 1), 55.0)],
        ));
        table.insert(PriceSeries::from_entries(
            "BLK",
            vec![(day(2024, 1, 15), 800.0), (day(2024, 2, 15), 790.0)],
        ));
        assert_eq!(table.date_span(), Some((day(2024, 1, 15), day(2024, 3, 1))));
        assert_eq!(table.close_span(), Some((50.0, 800.0)));
        assert_eq!(PriceTable::new().date_span(), None);
    }

    proptest! {
        #[test]
        fn sliced_series_is_sorted_and_within_window(
            points in prop::collection::vec((0i64..800, 1.0f64..1000.0), 0..200),
            start_offset in 0i64..800,
            len in 0i64..400,
        ) {
            let base = day(2023, 1, 1);
            let series = PriceSeries::from_entries(
                "MS",
                points.iter().map(|(o, c)| (base + chrono::Duration::days(*o), *c)),
            );
            let window = DateWindow::new(
                base + chrono::Duration::days(start_offset),
                base + chrono::Duration::days(start_offset + len),
            );
            let sliced = series.between(&window);
            let dates: Vec<NaiveDate> = sliced.iter().map(|(d, _)| d).collect();
            prop_assert!(dates.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(dates.iter().all(|d| *d >= window.start && *d <= window.end));
            let expected = series
                .iter()
                .filter(|(d, _)| *d >= window.start && *d <= window.end)
                .count();
            prop_assert_eq!(sliced.len(), expected);
        }
    }
}
