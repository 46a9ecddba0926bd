use agro_price::config::AppConfig;
use agro_price::RegionalFederatedAggregator;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    agro_price::logging::init();

    println!("Agro Price: Federated Regional Forecast Example");
    println!("===============================================\n");

    // An optional JSON config path overrides the defaults
    let config = match std::env::args().nth(1) {
        Some(path) => AppConfig::from_json_file(path)?,
        None => AppConfig::default(),
    };
    let aggregator = RegionalFederatedAggregator::new(config.federated.clone())?;

    let report = aggregator.run_pipeline("mango")?;
    println!("Crop: {}", report.crop);
    println!("Averaged tensors: {}", report.layers);
    println!(
        "Stages: {}",
        report
            .stages
            .iter()
            .map(|stage| stage.to_string())
            .collect::<Vec<_>>()
            .join(" -> ")
    );

    for (region, forecast) in &report.regions {
        let head: Vec<String> = forecast.forecast.iter().take(7).map(|p| format!("{:.2}", p)).collect();
        println!("  {:<10} first week: {}", region, head.join(", "));
    }

    println!("\nBest place to sell 100 kg of mango bought in Kottayam at 60.00/kg:");
    let recommendation = aggregator.recommend_best_region("mango", 60.0, "Kottayam")?;
    for (region, average) in &recommendation.all_region_averages {
        println!("  {:<10} 7-day average {:.2}", region, average);
    }
    println!(
        "{} (difference {:+.2})",
        recommendation.recommendation, recommendation.price_difference
    );

    Ok(())
}
