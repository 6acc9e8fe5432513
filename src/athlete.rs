//! Athlete FTP and weight history
//!
//! Both histories are keyed by the date a value became effective. A lookup for
//! a date returns the newest value dated on or before it.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Athlete {
    /// Unique athlete identifier
    pub id: Uuid,

    /// Athlete's display name
    pub name: String,

    /// Functional Threshold Power (watts) by effective date
    ftp_history: BTreeMap<NaiveDate, u16>,

    /// Weight in kilograms by effective date
    weight_history: BTreeMap<NaiveDate, Decimal>,
}

impl Athlete {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            ftp_history: BTreeMap::new(),
            weight_history: BTreeMap::new(),
        }
    }

    /// Record an FTP effective from `date` (today when `None`)
    ///
    /// A second FTP on the same date replaces the first.
    pub fn set_ftp(&mut self, ftp: u16, date: Option<NaiveDate>) {
        self.ftp_history.insert(date.unwrap_or_else(today), ftp);
    }

    /// Record a weight (kg) effective from `date` (today when `None`)
    pub fn set_weight(&mut self, weight: Decimal, date: Option<NaiveDate>) {
        self.weight_history.insert(date.unwrap_or_else(today), weight);
    }

    /// FTP in effect on `date`, or the latest FTP when `date` is `None`
    pub fn ftp(&self, date: Option<NaiveDate>) -> Option<u16> {
        effective(&self.ftp_history, date).copied()
    }

    /// Weight in effect on `date`, or the latest weight when `date` is `None`
    pub fn weight(&self, date: Option<NaiveDate>) -> Option<Decimal> {
        effective(&self.weight_history, date).copied()
    }

    /// Newest first
    pub fn all_ftps(&self) -> Vec<(NaiveDate, u16)> {
        self.ftp_history.iter().rev().map(|(&d, &ftp)| (d, ftp)).collect()
    }

    /// Newest first
    pub fn all_weights(&self) -> Vec<(NaiveDate, Decimal)> {
        self.weight_history.iter().rev().map(|(&d, &w)| (d, w)).collect()
    }

    /// Watts per kilogram on `date`
    ///
    /// `None` unless both an FTP and a non-zero weight are in effect.
    pub fn ftp_per_kg(&self, date: Option<NaiveDate>) -> Option<Decimal> {
        let ftp = self.ftp(date)?;
        let weight = self.weight(date)?;
        if weight.is_zero() {
            return None;
        }
        Some(Decimal::from(ftp) / weight)
    }

    /// W/kg on every date that changed either the FTP or the weight, newest first
    ///
    /// Dates before both histories have a value are left out.
    pub fn all_ftp_per_kg(&self) -> Vec<(NaiveDate, Decimal)> {
        let mut dates: Vec<NaiveDate> = self
            .ftp_history
            .keys()
            .chain(self.weight_history.keys())
            .copied()
            .collect();
        dates.sort_unstable_by(|a, b| b.cmp(a));
        dates.dedup();

        dates
            .into_iter()
            .filter_map(|date| self.ftp_per_kg(Some(date)).map(|wkg| (date, wkg)))
            .collect()
    }
}

fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

fn effective<T>(history: &BTreeMap<NaiveDate, T>, date: Option<NaiveDate>) -> Option<&T> {
    match date {
        Some(date) => history.range(..=date).next_back().map(|(_, value)| value),
        None => history.values().next_back(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn athlete_with_history() -> Athlete {
        let mut athlete = Athlete::new("Test Rider");
        athlete.set_ftp(250, Some(date("2023-01-01")));
        athlete.set_ftp(275, Some(date("2023-06-01")));
        athlete.set_weight(dec!(72.5), Some(date("2023-01-01")));
        athlete.set_weight(dec!(70.0), Some(date("2023-03-15")));
        athlete
    }

    #[test]
    fn test_empty_athlete() {
        let athlete = Athlete::new("Nobody");
        assert_eq!(athlete.ftp(None), None);
        assert_eq!(athlete.weight(None), None);
        assert!(athlete.all_ftps().is_empty());
        assert_eq!(athlete.ftp_per_kg(None), None);
        assert!(athlete.all_ftp_per_kg().is_empty());
    }

    #[test]
    fn test_ftp_lookup_by_date() {
        let athlete = athlete_with_history();
        assert_eq!(athlete.ftp(None), Some(275));
        assert_eq!(athlete.ftp(Some(date("2023-05-31"))), Some(250));
        assert_eq!(athlete.ftp(Some(date("2023-06-01"))), Some(275));
        assert_eq!(athlete.ftp(Some(date("2022-12-31"))), None);
    }

    #[test]
    fn test_same_date_replaces() {
        let mut athlete = athlete_with_history();
        athlete.set_ftp(260, Some(date("2023-06-01")));
        assert_eq!(athlete.all_ftps().len(), 2);
        assert_eq!(athlete.ftp(None), Some(260));
    }

    #[test]
    fn test_histories_newest_first() {
        let athlete = athlete_with_history();
        assert_eq!(
            athlete.all_ftps(),
            vec![(date("2023-06-01"), 275), (date("2023-01-01"), 250)]
        );
        assert_eq!(
            athlete.all_weights(),
            vec![(date("2023-03-15"), dec!(70.0)), (date("2023-01-01"), dec!(72.5))]
        );
    }

    #[test]
    fn test_ftp_per_kg() {
        let athlete = athlete_with_history();
        assert_eq!(athlete.ftp_per_kg(Some(date("2023-02-01"))), Some(dec!(250) / dec!(72.5)));

        let all = athlete.all_ftp_per_kg();
        let dates: Vec<NaiveDate> = all.iter().map(|(d, _)| *d).collect();
        assert_eq!(
            dates,
            vec![date("2023-06-01"), date("2023-03-15"), date("2023-01-01")]
        );
        assert_eq!(all[0].1, dec!(275) / dec!(70.0));
        assert_eq!(all[1].1, dec!(250) / dec!(70.0));
    }

    #[test]
    fn test_default_date_is_today() {
        let mut athlete = Athlete::new("Today");
        athlete.set_ftp(200, None);
        assert_eq!(athlete.all_ftps(), vec![(today(), 200)]);
    }

    #[test]
    fn test_serde_roundtrip() {
        let athlete = athlete_with_history();
        let json = serde_json::to_string(&athlete).unwrap();
        let back: Athlete = serde_json::from_str(&json).unwrap();
        assert_eq!(back, athlete);
    }
}
