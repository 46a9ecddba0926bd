use agro_math::MathError;
use agro_price::error::ForecastError;
use polars::prelude::PolarsError;
use std::io;

#[test]
fn test_error_conversion() {
    let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
    assert!(matches!(ForecastError::from(io_error), ForecastError::IoError(_)));

    let math_error = MathError::InsufficientData("need at least two points".to_string());
    assert!(matches!(ForecastError::from(math_error), ForecastError::Math(_)));

    let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    assert!(matches!(ForecastError::from(json_error), ForecastError::Serialization(_)));

    let polars_error = PolarsError::ComputeError("bad column".into());
    match ForecastError::from(polars_error) {
        ForecastError::PolarsError(message) => assert!(message.contains("bad column")),
        other => panic!("Expected PolarsError variant, got {:?}", other),
    }
}

#[test]
fn test_error_display() {
    let error = ForecastError::UnsupportedCrop {
        crop: "wheat".to_string(),
        supported: "rubber, tea".to_string(),
    };
    assert_eq!(error.to_string(), "Unsupported crop 'wheat'. Choose from rubber, tea");

    let error = ForecastError::UnknownRegion {
        region: "Thrissur".to_string(),
        supported: "Kottayam, Idukki, Ernakulam".to_string(),
    };
    assert!(error.to_string().contains("Unknown region 'Thrissur'"));

    let error = ForecastError::from(io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"));
    let message = error.to_string();
    assert!(message.contains("IO error"));
    assert!(message.contains("permission denied"));

    let error = ForecastError::NotTrained("seasonal".to_string());
    assert_eq!(error.to_string(), "Not trained: seasonal");
}
