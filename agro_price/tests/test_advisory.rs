use agro_price::advisory::{Comparison, WeatherMetric};
use agro_price::{AgronomicAdvisoryEngine, WeatherSnapshot};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn weather() -> WeatherSnapshot {
    WeatherSnapshot {
        temperature: Some(28.0),
        humidity: Some(70.0),
        precipitation: Some(2.0),
        rain: Some(1.0),
        wind_speed: Some(12.0),
        rain_24h: Some(5.0),
    }
}

#[rstest]
#[case("rubber", WeatherSnapshot { rain_24h: Some(20.5), ..weather() }, true, 1.08)]
#[case("rubber", WeatherSnapshot { rain_24h: Some(20.0), ..weather() }, false, 1.0)]
#[case("tea", WeatherSnapshot { temperature: Some(33.0), ..weather() }, true, 1.05)]
#[case("Coffee", WeatherSnapshot { humidity: Some(95.0), ..weather() }, true, 1.06)]
#[case("black_pepper", WeatherSnapshot { rain_24h: Some(60.0), ..weather() }, true, 1.07)]
#[case("cardamom", WeatherSnapshot { temperature: Some(31.0), ..weather() }, true, 1.10)]
#[case("banana", WeatherSnapshot { wind_speed: Some(41.0), ..weather() }, true, 1.12)]
#[case("coconut", WeatherSnapshot { precipitation: Some(0.5), ..weather() }, true, 1.04)]
#[case("mango", WeatherSnapshot { humidity: Some(84.9), ..weather() }, false, 1.0)]
#[case("paddy", WeatherSnapshot { rain_24h: Some(120.0), ..weather() }, true, 1.09)]
#[case(" TOMATO ", WeatherSnapshot { temperature: Some(35.0), ..weather() }, false, 1.0)]
fn test_rule_table(
    #[case] crop: &str,
    #[case] snapshot: WeatherSnapshot,
    #[case] triggered: bool,
    #[case] bias: f64,
) {
    let result = AgronomicAdvisoryEngine::new().evaluate(crop, &snapshot);

    assert_eq!(result.triggered, triggered);
    assert_eq!(result.bias, bias);
    assert!(result.rule.is_some());
    assert!(result.actual_value.is_some());
}

#[rstest]
#[case("dragon fruit")]
#[case("wheat")]
#[case("")]
fn test_crops_without_rule_are_neutral(#[case] crop: &str) {
    let result = AgronomicAdvisoryEngine::new().evaluate(crop, &weather());

    assert!(!result.triggered);
    assert_eq!(result.bias, 1.0);
    assert!(result.message.contains(&format!("'{}'", crop.trim().to_lowercase())));
    assert_eq!(result.rule, None);
}

#[test]
fn test_triggered_result_carries_rule_and_value() {
    let snapshot = WeatherSnapshot {
        rain_24h: Some(42.0),
        ..weather()
    };
    let result = AgronomicAdvisoryEngine::new().evaluate("Natural_Rubber", &snapshot);

    assert_eq!(result.crop, "rubber");
    assert_eq!(result.rule.as_deref(), Some("rain_24h > 20 mm"));
    assert_eq!(result.actual_value, Some(42.0));
    assert!(result.message.contains("tapping"));
}

#[test]
fn test_safe_weather_message() {
    let result = AgronomicAdvisoryEngine::new().evaluate("tea", &weather());

    assert!(!result.triggered);
    assert_eq!(result.message, "Tea conditions are within safe thresholds.");
    assert_eq!(result.actual_value, Some(28.0));
}

#[test]
fn test_missing_metric_reads_as_zero() {
    // No precipitation reported: 0.0 <= 0.5 triggers the dry-spell rule
    let result = AgronomicAdvisoryEngine::new().evaluate("coconut", &WeatherSnapshot::default());

    assert!(result.triggered);
    assert_eq!(result.actual_value, Some(0.0));
}

#[test]
fn test_evaluation_is_deterministic() {
    let engine = AgronomicAdvisoryEngine::new();
    let snapshot = WeatherSnapshot {
        wind_speed: Some(55.0),
        ..weather()
    };

    assert_eq!(engine.evaluate("banana", &snapshot), engine.evaluate("banana", &snapshot));
}

#[test]
fn test_rule_operators_are_resolved() {
    let engine = AgronomicAdvisoryEngine::new();
    let cardamom = engine
        .rules()
        .iter()
        .find(|rule| rule.metric == WeatherMetric::Temperature && rule.comparison == Comparison::GreaterOrEqual)
        .unwrap();

    assert_eq!(cardamom.threshold, 31.0);
    assert_eq!(cardamom.comparison.symbol(), ">=");
}
