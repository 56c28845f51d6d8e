//! Integration tests for `HttpWeatherClient` and `IpGeolocator` using wiremock HTTP mocks.

use clima_core::location::IpGeolocator;
use clima_core::{ClimaError, Coordinates, Geolocator, HttpWeatherClient, Target, WeatherBackend};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> HttpWeatherClient {
    HttpWeatherClient::new(Some(base_url.to_string()), Some(format!("{base_url}/city")))
}

fn weather_body(city: &str, temperature: f64) -> serde_json::Value {
    json!({
        "weather": { "city": city, "temperature": temperature, "humidity": 70 },
        "suggestions": "<ul><li>Carry an umbrella</li></ul>"
    })
}

#[tokio::test]
async fn city_request_hits_encoded_path() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/city/New%20Delhi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(weather_body("New Delhi", 33.0)))
        .expect(1)
        .mount(&server)
        .await;

    let payload = test_client(&server.uri())
        .fetch(&Target::City("New Delhi".into()))
        .await
        .expect("should parse payload");

    assert_eq!(payload.weather.city.as_deref(), Some("New Delhi"));
    assert_eq!(payload.weather.temperature, 33.0);
    assert_eq!(
        payload.suggestions.as_deref(),
        Some("<ul><li>Carry an umbrella</li></ul>")
    );
}

#[tokio::test]
async fn manual_coordinates_are_sent_verbatim_in_path() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather/12.97/77.59"))
        .respond_with(ResponseTemplate::new(200).set_body_json(weather_body("Bengaluru", 24.0)))
        .expect(1)
        .mount(&server)
        .await;

    let payload = test_client(&server.uri())
        .fetch(&Target::Coordinates(Coordinates::new(12.97, 77.59)))
        .await
        .expect("should parse payload");

    assert_eq!(payload.weather.city.as_deref(), Some("Bengaluru"));
}

#[tokio::test]
async fn geolocated_coordinates_are_posted_as_json() {
    let server = MockServer::start().await;

    let body = json!({
        "location": { "lat": 12.97, "lon": 77.59, "city": "Bengaluru" },
        "weather": { "temperature": 24.5, "humidity": 61 }
    });

    Mock::given(method("POST"))
        .and(path("/location"))
        .and(body_json(json!({ "lat": 12.97, "lon": 77.59 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let payload = test_client(&server.uri())
        .fetch(&Target::Located(Coordinates::new(12.97, 77.59)))
        .await
        .expect("should parse payload");

    assert!(payload.weather.city.is_none());
    assert_eq!(payload.coordinates(), Some(Coordinates::new(12.97, 77.59)));
}

#[tokio::test]
async fn server_default_location_uses_bare_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(weather_body("Lisbon", 21.0)))
        .expect(1)
        .mount(&server)
        .await;

    let payload = test_client(&server.uri())
        .fetch(&Target::ServerDefault)
        .await
        .expect("should parse payload");

    assert_eq!(payload.weather.city.as_deref(), Some("Lisbon"));
}

#[tokio::test]
async fn server_error_is_a_generic_fetch_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/city/Atlantis"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({ "detail": "Could not fetch weather data" })),
        )
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .fetch(&Target::City("Atlantis".into()))
        .await
        .unwrap_err();

    assert!(matches!(err, ClimaError::FetchFailed { status: Some(500) }));
    assert_eq!(err.user_message(), "Failed to fetch weather data");
}

#[tokio::test]
async fn payload_without_temperature_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/city/Oslo"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "weather": { "city": "Oslo", "humidity": 90 } })),
        )
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .fetch(&Target::City("Oslo".into()))
        .await
        .unwrap_err();

    assert!(matches!(err, ClimaError::MalformedResponse(_)));
}

#[tokio::test]
async fn ip_lookup_success_yields_coordinates() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "lat": 48.8566,
            "lon": 2.3522,
            "city": "Paris"
        })))
        .mount(&server)
        .await;

    let coords = IpGeolocator::new(format!("{}/json", server.uri()))
        .locate()
        .await
        .expect("lookup should succeed");

    assert_eq!(coords, Coordinates::new(48.8566, 2.3522));
}

#[tokio::test]
async fn ip_lookup_failure_status_is_denied() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "fail",
            "message": "private range"
        })))
        .mount(&server)
        .await;

    let err = IpGeolocator::new(format!("{}/json", server.uri()))
        .locate()
        .await
        .unwrap_err();

    match err {
        ClimaError::GeolocationDenied(reason) => assert_eq!(reason, "private range"),
        other => panic!("expected GeolocationDenied, got {other:?}"),
    }
}

#[tokio::test]
async fn ip_lookup_http_error_is_denied() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = IpGeolocator::new(format!("{}/json", server.uri()))
        .locate()
        .await
        .unwrap_err();

    assert!(matches!(err, ClimaError::GeolocationDenied(_)));
}
