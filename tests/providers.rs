use wiremock::matchers::{body_bytes, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gaspar::models::{TranscriptionConfig, ZipLocation};
use gaspar::services::ai::gemini::GeminiProvider;
use gaspar::services::ai::TextModel;
use gaspar::services::places::google::GoogleMapsProvider;
use gaspar::services::places::PlacesProvider;
use gaspar::services::speech::deepgram::DeepgramProvider;
use gaspar::services::speech::SpeechToText;

fn san_francisco() -> ZipLocation {
    ZipLocation {
        zip: "94102".to_string(),
        city: "San Francisco".to_string(),
        state: "CA".to_string(),
        lat: 37.7793,
        lng: -122.4193,
    }
}

#[tokio::test]
async fn test_places_text_search() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/maps/api/place/textsearch/json"))
        .and(query_param("query", "plumber near 94102"))
        .and(query_param("radius", "16000"))
        .and(query_param("key", "maps-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "OK",
            "results": [
                {
                    "name": "Mission Plumbing",
                    "rating": 4.6,
                    "user_ratings_total": 120,
                    "formatted_address": "2100 Mission St",
                    "place_id": "abc123"
                },
                { "name": "Pipe Dreams", "place_id": "def456" }
            ]
        })))
        .mount(&mock_server)
        .await;

    let provider = GoogleMapsProvider::with_base_url("maps-key".to_string(), mock_server.uri());
    let records = provider
        .text_search("plumber", &san_francisco())
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].name, "Mission Plumbing");
    assert_eq!(records[0].user_ratings_total, Some(120));
    assert_eq!(records[1].rating, None);
}

#[tokio::test]
async fn test_places_zero_results_and_denied() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/maps/api/place/textsearch/json"))
        .and(query_param("key", "good-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "ZERO_RESULTS",
            "results": []
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/maps/api/place/textsearch/json"))
        .and(query_param("key", "bad-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "REQUEST_DENIED",
            "error_message": "The provided API key is invalid."
        })))
        .mount(&mock_server)
        .await;

    let good = GoogleMapsProvider::with_base_url("good-key".to_string(), mock_server.uri());
    assert!(good
        .text_search("roofer", &san_francisco())
        .await
        .unwrap()
        .is_empty());

    let bad = GoogleMapsProvider::with_base_url("bad-key".to_string(), mock_server.uri());
    let err = bad
        .text_search("roofer", &san_francisco())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("REQUEST_DENIED"));
}

#[tokio::test]
async fn test_geocode_zip() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/maps/api/geocode/json"))
        .and(query_param("address", "59801"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "OK",
            "results": [{
                "address_components": [
                    { "long_name": "59801", "short_name": "59801", "types": ["postal_code"] },
                    { "long_name": "Missoula", "short_name": "Missoula", "types": ["locality", "political"] },
                    { "long_name": "Montana", "short_name": "MT", "types": ["administrative_area_level_1", "political"] }
                ],
                "geometry": { "location": { "lat": 46.86, "lng": -114.01 } }
            }]
        })))
        .mount(&mock_server)
        .await;

    let provider = GoogleMapsProvider::with_base_url("maps-key".to_string(), mock_server.uri());
    let location = provider.geocode_zip("59801").await.unwrap().unwrap();

    assert_eq!(location.zip, "59801");
    assert_eq!(location.city, "Missoula");
    assert_eq!(location.state, "MT");
    assert!((location.lat - 46.86).abs() < 1e-9);
}

#[tokio::test]
async fn test_gemini_generate() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-test:generateContent"))
        .and(query_param("key", "gemini-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "{\"term\": \"emergency plumber\"}" }] }
            }]
        })))
        .mount(&mock_server)
        .await;

    let provider = GeminiProvider::with_base_url(
        "gemini-key".to_string(),
        "gemini-test".to_string(),
        mock_server.uri(),
    );
    let text = provider.generate("burst pipe").await.unwrap();
    assert_eq!(text, r#"{"term": "emergency plumber"}"#);
}

#[tokio::test]
async fn test_gemini_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "error": { "message": "API key not valid" }
        })))
        .mount(&mock_server)
        .await;

    let provider = GeminiProvider::with_base_url(
        "bad".to_string(),
        "gemini-test".to_string(),
        mock_server.uri(),
    );
    let err = provider.generate("hello").await.unwrap_err();
    assert!(err.to_string().contains("403"));
}

#[tokio::test]
async fn test_deepgram_transcribe() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/listen"))
        .and(header("Authorization", "Token dg-key"))
        .and(header("Content-Type", "audio/wav"))
        .and(query_param("model", "nova-2"))
        .and(query_param("smart_format", "true"))
        .and(body_bytes(b"RIFF".to_vec()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": {
                "channels": [{
                    "alternatives": [{
                        "transcript": "The furnace is making a banging noise.",
                        "confidence": 0.97,
                        "words": [
                            { "word": "the", "start": 0.1, "end": 0.2, "confidence": 0.99 }
                        ]
                    }]
                }]
            }
        })))
        .mount(&mock_server)
        .await;

    let provider = DeepgramProvider::with_base_url("dg-key".to_string(), mock_server.uri());
    let result = provider
        .transcribe(b"RIFF".to_vec(), "audio/wav", &TranscriptionConfig::default())
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(result.transcript, "The furnace is making a banging noise.");
    assert_eq!(result.words.len(), 1);
}

#[tokio::test]
async fn test_deepgram_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/listen"))
        .respond_with(ResponseTemplate::new(401).set_body_string("INVALID_AUTH"))
        .mount(&mock_server)
        .await;

    let provider = DeepgramProvider::with_base_url("nope".to_string(), mock_server.uri());
    let err = provider
        .transcribe(vec![1, 2, 3], "audio/webm", &TranscriptionConfig::default())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("INVALID_AUTH"));
}
