mod common;

use agro_price::live::MarketRecord;
use agro_price::simulation::{SimulationInputs, FALLBACK_PRICE};
use agro_price::{
    AppConfig, AppContext, ForecastError, LiveMarketQuote, LivePrediction, LiveWeather, MarketSnapshot, Result,
    StaticMarketQuote, StaticWeather, WeatherSnapshot,
};
use approx::assert_relative_eq;
use async_trait::async_trait;
use common::{engine_with, quick_federated_config, series_ending_at, FixedForecaster};
use std::sync::Arc;

struct FailingQuote;

#[async_trait]
impl LiveMarketQuote for FailingQuote {
    async fn fetch(&self, _crop_id: &str) -> Result<MarketSnapshot> {
        Err(ForecastError::LiveData("market offline".to_string()))
    }
}

struct FailingWeather;

#[async_trait]
impl LiveWeather for FailingWeather {
    async fn fetch(&self, _lat: f64, _lon: f64) -> Result<WeatherSnapshot> {
        Err(ForecastError::LiveData("weather offline".to_string()))
    }
}

fn quote(avg_price: f64) -> Arc<StaticMarketQuote> {
    let record = MarketRecord {
        district: "Kottayam".to_string(),
        market: "Pala".to_string(),
        min_price: avg_price - 10.0,
        max_price: avg_price + 10.0,
        modal_price: avg_price,
    };
    Arc::new(StaticMarketQuote {
        snapshot: MarketSnapshot::from_records(&[record]),
    })
}

fn rainy() -> Arc<StaticWeather> {
    Arc::new(StaticWeather {
        snapshot: WeatherSnapshot {
            rain_24h: Some(35.0),
            ..WeatherSnapshot::default()
        },
    })
}

fn context(market: Arc<dyn LiveMarketQuote>, weather: Arc<dyn LiveWeather>) -> AppContext {
    let config = AppConfig {
        federated: quick_federated_config(),
        ..AppConfig::default()
    };
    let mut engine = engine_with(FixedForecaster::returning(2600.0), FixedForecaster::returning(2400.0));
    engine.train(series_ending_at(2500.0)).unwrap();

    AppContext::with_engine(config, engine, market, weather).unwrap()
}

#[tokio::test]
async fn test_live_prediction_applies_advisory_bias() {
    let ctx = context(quote(3000.0), rainy());

    let LivePrediction::Predicted { quote, advisory, result } = ctx.predict_live("rubber", 9.59, 76.52).await.unwrap() else {
        panic!("expected a live prediction");
    };

    assert_eq!(quote.record_count, 1);
    let advisory = advisory.unwrap();
    assert!(advisory.triggered);
    assert_eq!(advisory.bias, 1.08);
    assert_relative_eq!(result.fused_price, 3000.0 * (1.04 * 0.7 + 0.96 * 0.3) * 1.08, epsilon = 1e-9);
}

#[tokio::test]
async fn test_no_live_data_is_not_an_error() {
    let ctx = context(Arc::new(StaticMarketQuote::default()), rainy());

    let prediction = ctx.predict_live("Rubber", 9.59, 76.52).await.unwrap();

    assert_eq!(
        prediction,
        LivePrediction::NoLiveData {
            crop_id: "rubber".to_string()
        }
    );
}

#[tokio::test]
async fn test_weather_failure_skips_advisory() {
    let ctx = context(quote(3000.0), Arc::new(FailingWeather));

    let LivePrediction::Predicted { advisory, result, .. } = ctx.predict_live("rubber", 0.0, 0.0).await.unwrap() else {
        panic!("expected a live prediction");
    };

    assert_eq!(advisory, None);
    assert_relative_eq!(result.fused_price, 3000.0 * (1.04 * 0.7 + 0.96 * 0.3), epsilon = 1e-9);
}

#[tokio::test]
async fn test_market_failure_is_surfaced() {
    let ctx = context(Arc::new(FailingQuote), rainy());

    assert!(matches!(
        ctx.predict_live("rubber", 0.0, 0.0).await,
        Err(ForecastError::LiveData(_))
    ));
}

#[tokio::test]
async fn test_simulation_price_source() {
    let live = context(quote(2400.0), rainy());
    let report = live.simulate("Rubber", SimulationInputs::default()).await.unwrap();
    assert!(report.live_price_used);
    assert_eq!(report.simulation.base_price, 2400.0);
    assert_eq!(report.crop_id, "rubber");

    let offline = context(Arc::new(FailingQuote), rainy());
    let report = offline.simulate("rubber", SimulationInputs::default()).await.unwrap();
    assert!(!report.live_price_used);
    assert_eq!(report.simulation.base_price, FALLBACK_PRICE);

    let invalid = SimulationInputs {
        market_price_percent: -120.0,
        ..SimulationInputs::default()
    };
    assert!(offline.simulate("rubber", invalid).await.is_err());
}

#[test]
fn test_synchronous_operations() {
    let ctx = context(quote(3000.0), rainy());

    let prediction = ctx.get_prediction("rubber").unwrap();
    assert_relative_eq!(prediction.fused_price, 2540.0, epsilon = 1e-9);

    let analytics = ctx.get_analytics().unwrap();
    assert!(!analytics.shock_alert);

    let advisory = ctx.evaluate_advisory("rubber", &WeatherSnapshot::default());
    assert!(!advisory.triggered);

    let report = ctx.run_federated_pipeline("mango").unwrap();
    assert_eq!(report.regions.len(), 3);

    let recommendation = ctx.recommend_best_region("mango", 60.0, "Ernakulam").unwrap();
    assert_eq!(recommendation.all_region_averages.len(), 3);
}

#[test]
fn test_predictions_run_concurrently_with_retraining() {
    let ctx = Arc::new(context(quote(3000.0), rainy()));

    std::thread::scope(|scope| {
        for _ in 0..4 {
            let ctx = Arc::clone(&ctx);
            scope.spawn(move || {
                for _ in 0..20 {
                    assert!(ctx.get_prediction("tea").unwrap().fused_price.is_finite());
                }
            });
        }
        scope.spawn(|| {
            for last in [2400.0, 2500.0, 2600.0] {
                ctx.train(series_ending_at(last)).unwrap();
            }
        });
    });

    assert!(ctx.is_trained());
}

#[test]
fn test_bootstrap_demo_trains_default_engine() {
    let config = AppConfig {
        federated: quick_federated_config(),
        ..AppConfig::default()
    };
    let ctx = AppContext::new(config, Arc::new(StaticMarketQuote::default()), Arc::new(StaticWeather::default())).unwrap();
    assert!(!ctx.is_trained());
    assert!(matches!(ctx.get_prediction("rubber"), Err(ForecastError::NotTrained(_))));

    let summary = ctx.bootstrap_demo().unwrap();

    assert_eq!(summary.observations, agro_price::service::DEMO_DAYS);
    assert!(ctx.get_prediction("rubber").unwrap().fused_price > 0.0);
}
