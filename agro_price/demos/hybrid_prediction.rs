use agro_price::live::MarketRecord;
use agro_price::simulation::SimulationInputs;
use agro_price::{
    AppConfig, AppContext, LivePrediction, MarketSnapshot, StaticMarketQuote, StaticWeather, WeatherSnapshot,
};
use std::sync::Arc;

fn sample_quote() -> MarketSnapshot {
    let records = [
        ("Kottayam", "Pala", 17800.0, 18400.0, 18100.0),
        ("Kottayam", "Changanassery", 17600.0, 18200.0, 17950.0),
        ("Idukki", "Thodupuzha", 17900.0, 18600.0, 18300.0),
    ]
    .into_iter()
    .map(|(district, market, min_price, max_price, modal_price)| MarketRecord {
        district: district.to_string(),
        market: market.to_string(),
        min_price,
        max_price,
        modal_price,
    })
    .collect::<Vec<_>>();

    MarketSnapshot::from_records(&records)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    agro_price::logging::init();

    println!("Agro Price: Hybrid Prediction Example");
    println!("=====================================\n");

    let weather = WeatherSnapshot {
        temperature: Some(29.5),
        humidity: Some(88.0),
        rain_24h: Some(42.0),
        ..WeatherSnapshot::default()
    };
    let context = AppContext::new(
        AppConfig::default(),
        Arc::new(StaticMarketQuote {
            snapshot: sample_quote(),
        }),
        Arc::new(StaticWeather { snapshot: weather }),
    )?;

    println!("Training on the synthetic demo series...");
    let summary = context.bootstrap_demo()?;
    println!(
        "Trained on {} observations (seasonal: {}, shock: {})\n",
        summary.observations, summary.seasonal_trained, summary.shock_trained
    );

    let prediction = context.get_prediction("rubber")?;
    println!("Baseline prediction:");
    println!("{}\n", serde_json::to_string_pretty(&prediction)?);

    let analytics = context.get_analytics()?;
    println!(
        "Confidence {:.1}%, deviation {:.2}%, shock alert: {}\n",
        analytics.confidence_score, analytics.deviation_percent, analytics.shock_alert
    );

    match context.predict_live("rubber", 9.59, 76.52).await? {
        LivePrediction::NoLiveData { crop_id } => println!("No live market data for {}", crop_id),
        LivePrediction::Predicted { quote, advisory, result } => {
            println!("Live average price: {:.2} from {} markets", quote.avg_price, quote.record_count);
            if let Some(advisory) = advisory {
                println!("Advisory: {} (bias {:.2})", advisory.message, advisory.bias);
            }
            println!("Live-rebased forecast: {:.2}", result.fused_price);
            println!("Insight: {}\n", result.attribution.insight);
        }
    }

    let inputs = SimulationInputs {
        rainfall_percent: -20.0,
        market_price_percent: 5.0,
        land_size: 2.5,
        fertilizer_cost: 12000.0,
        labour_cost: 30000.0,
    };
    let report = context.simulate("rubber", inputs).await?;
    println!(
        "Simulated profit: {:.2} (live price used: {})",
        report.simulation.predicted_profit, report.live_price_used
    );

    Ok(())
}
