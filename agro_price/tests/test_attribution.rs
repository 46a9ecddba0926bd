mod common;

use agro_price::attribution::{detect_anomalies, explain, shock_factor};
use agro_price::series::{DEMAND_COLUMN, RAINFALL_COLUMN};
use agro_price::{Anomaly, TrainingSeries};
use common::start_date;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn with_columns(rainfall: Option<Vec<f64>>, demand: Option<Vec<f64>>) -> TrainingSeries {
    let len = rainfall
        .as_ref()
        .or(demand.as_ref())
        .map_or(3, Vec::len);
    let mut series = TrainingSeries::from_daily_prices(start_date(), vec![100.0; len]).unwrap();
    if let Some(values) = rainfall {
        series = series.with_column(RAINFALL_COLUMN, values).unwrap();
    }
    if let Some(values) = demand {
        series = series.with_column(DEMAND_COLUMN, values).unwrap();
    }
    series
}

#[rstest]
// mean 100, latest exactly 80% of it
#[case(vec![120.0, 80.0], false)]
#[case(vec![120.0, 79.0], true)]
#[case(vec![0.0, 0.0], false)]
#[case(vec![50.0, 50.0], false)]
fn test_rainfall_deficit_boundary(#[case] rainfall: Vec<f64>, #[case] fires: bool) {
    let anomalies = detect_anomalies(&with_columns(Some(rainfall), None));

    assert_eq!(
        anomalies.iter().any(|a| matches!(a, Anomaly::LowPrecipitation { .. })),
        fires
    );
}

#[rstest]
// mean 100, latest exactly 120% of it
#[case(vec![80.0, 120.0], false)]
#[case(vec![79.0, 121.0], true)]
#[case(vec![0.0, 0.0], false)]
fn test_demand_surge_boundary(#[case] demand: Vec<f64>, #[case] fires: bool) {
    let anomalies = detect_anomalies(&with_columns(None, Some(demand)));

    assert_eq!(anomalies.contains(&Anomaly::HighDemandVolatility), fires);
}

#[test]
fn test_deficit_percentage() {
    let anomalies = detect_anomalies(&with_columns(Some(vec![100.0, 100.0, 100.0, 40.0]), None));

    // mean 85, latest 40
    assert_eq!(anomalies, vec![Anomaly::LowPrecipitation { deficit_pct: 52.9 }]);
}

#[rstest]
#[case(100.0, 100.0)]
#[case(2600.0, 2400.0)]
#[case(0.0, 42.0)]
#[case(50.0, 500.0)]
fn test_seasonal_contribution_complements_shock_factor(#[case] seasonal: f64, #[case] shock: f64) {
    let record = explain(seasonal, shock, &with_columns(None, None));

    assert_eq!(record.shock_factor, shock_factor(seasonal, shock));
    assert_eq!(record.seasonal_contribution, 1.0 - record.shock_factor);
}

#[test]
fn test_equal_values_have_no_shock() {
    let record = explain(2500.0, 2500.0, &with_columns(None, None));

    assert_eq!(record.shock_factor, 0.0);
    assert_eq!(record.seasonal_contribution, 1.0);
    assert_eq!(
        record.insight,
        "Price is within normal seasonal expectations. No significant anomalies detected."
    );
}

#[test]
fn test_exactly_one_insight_branch() {
    let quiet = with_columns(None, None);
    let dry = with_columns(Some(vec![100.0, 10.0]), None);

    // anomaly wins over a large shock; mean 55, latest 10
    let record = explain(100.0, 50.0, &dry);
    assert_eq!(record.insight, "Price decrease driven by 81.8% rainfall deficit.");
    assert_eq!(record.anomaly_detected(), "Low Precipitation");

    // large shock without anomalies
    let record = explain(100.0, 130.0, &quiet);
    assert!(record
        .insight
        .starts_with("Significant short-term price increase detected (shock factor 30.0%)."));

    // at the threshold the shock is not significant
    let record = explain(100.0, 115.0, &quiet);
    assert!(record.insight.starts_with("Price is within normal seasonal expectations"));
}

#[test]
fn test_attribution_json() {
    let record = explain(3.0, 4.0, &with_columns(None, Some(vec![10.0, 10.0, 50.0])));
    let json = serde_json::to_value(&record).unwrap();

    assert_eq!(json["shock_factor"], 0.3333);
    assert_eq!(json["seasonal_contribution"], 0.6667);
    assert_eq!(json["anomaly_detected"], "High Demand Volatility");
}

#[test]
fn test_missing_latest_reading_raises_no_anomaly() {
    let series = with_columns(
        Some(vec![100.0, 100.0, 10.0, f64::NAN]),
        Some(vec![10.0, 10.0, 90.0, f64::NAN]),
    );

    assert_eq!(series.latest_value(RAINFALL_COLUMN).map(f64::is_nan), Some(true));
    assert!(detect_anomalies(&series).is_empty());
}

#[test]
fn test_mean_skips_missing_readings() {
    // mean of the finite readings is 100, latest is 50
    let series = with_columns(Some(vec![150.0, f64::NAN, 100.0, 50.0]), None);

    assert_eq!(
        detect_anomalies(&series),
        vec![Anomaly::LowPrecipitation { deficit_pct: 50.0 }]
    );
}
