mod common;

use agro_price::series::{demo_series, RAINFALL_COLUMN};
use agro_price::{ForecastError, TrainingSeries};
use chrono::{Datelike, NaiveDate};
use common::start_date;
use std::io::Write;
use tempfile::NamedTempFile;

fn csv_file(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file
}

#[test]
fn test_load_market_csv() {
    // Agmarknet style: unsorted, one unparseable date, an extra column
    let file = csv_file(&[
        "State,Arrival_Date,Modal_Price,Rainfall",
        "Kerala,03/01/2024,2520,4.5",
        "Kerala,01/01/2024,2500,10.0",
        "Kerala,not a date,9999,1.0",
        "Kerala,02/01/2024,2510,7.25",
    ]);

    let series = TrainingSeries::from_csv(file.path()).unwrap();

    assert_eq!(series.len(), 3);
    assert_eq!(series.prices(), vec![2500.0, 2510.0, 2520.0]);
    assert_eq!(series.column(RAINFALL_COLUMN), Some(vec![10.0, 7.25, 4.5]));
    assert_eq!(
        series.timestamps()[0].date_naive(),
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    );
}

#[test]
fn test_load_ds_y_csv() {
    let file = csv_file(&["ds,y", "2023-05-01,10.5", "2023-05-02,11.0"]);

    let series = TrainingSeries::from_csv(file.path()).unwrap();

    assert_eq!(series.last_price(), Some(11.0));
    assert!(series.auxiliary_columns().is_empty());
}

#[test]
fn test_duplicate_dates_are_rejected() {
    let file = csv_file(&["date,price", "2023-05-01,10.5", "2023-05-01,11.0"]);

    assert!(matches!(
        TrainingSeries::from_csv(file.path()),
        Err(ForecastError::DataError(_))
    ));
}

#[test]
fn test_missing_price_column() {
    let file = csv_file(&["date,volume", "2023-05-01,10"]);

    let error = TrainingSeries::from_csv(file.path()).unwrap_err();
    assert!(error.to_string().contains("No price column"));
}

#[test]
fn test_missing_file() {
    let result = TrainingSeries::from_csv("/nonexistent/prices.csv");

    assert!(matches!(result, Err(ForecastError::IoError(_))));
}

#[test]
fn test_demo_series_shape() {
    let series = demo_series(3 * 365, NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(), 42).unwrap();
    let rainfall = series.column(RAINFALL_COLUMN).unwrap();
    let timestamps = series.timestamps();

    assert_eq!(series.len(), 1095);
    assert!(rainfall.iter().all(|r| *r >= 0.0));

    // Monsoon rainfall dominates the dry season
    let mean_where = |pred: &dyn Fn(u32) -> bool| {
        let picked: Vec<f64> = timestamps
            .iter()
            .zip(rainfall.iter())
            .filter(|(ts, _)| pred(ts.ordinal()))
            .map(|(_, r)| *r)
            .collect();
        agro_math::mean(&picked).unwrap()
    };
    assert!(mean_where(&|doy| (180..=220).contains(&doy)) > mean_where(&|doy| doy < 60));
}

#[test]
fn test_recent_prices_window() {
    let series = demo_series(50, start_date(), 3).unwrap();

    assert_eq!(series.recent_prices(30).len(), 30);
    assert_eq!(series.recent_prices(30).last(), series.last_price().as_ref());
}
