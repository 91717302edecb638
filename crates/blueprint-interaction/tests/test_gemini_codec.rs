use blueprint_core::agent::{AssistantClient, GenerationRequest, RequestTurn};
use blueprint_core::attachment::ImageAttachment;
use blueprint_core::persona::Persona;
use blueprint_core::session::MessageRole;
use blueprint_interaction::GeminiApiClient;
use blueprint_interaction::gemini_api_client::{decode_response, encode_request, map_http_error};
use reqwest::StatusCode;
use serde_json::json;

#[test]
fn test_request_body_shape() {
    let image = ImageAttachment::from_bytes("image/png", b"img");
    let request = GenerationRequest::for_persona(
        Persona::Architect.config(),
        vec![
            RequestTurn::new(MessageRole::User, "design this", &[image.clone()]),
            RequestTurn::new(MessageRole::Assistant, "# SDD", &[]),
        ],
    );

    let body = serde_json::to_value(encode_request(&request)).unwrap();

    assert_eq!(
        body["contents"],
        json!([
            {
                "role": "user",
                "parts": [
                    {"text": "design this"},
                    {"inlineData": {"mimeType": "image/png", "data": image.data}}
                ]
            },
            {"role": "model", "parts": [{"text": "# SDD"}]}
        ])
    );
    assert_eq!(
        body["systemInstruction"],
        json!({"parts": [{"text": Persona::Architect.config().instruction}]})
    );
    let temperature = body["generationConfig"]["temperature"].as_f64().unwrap();
    assert!((temperature - 0.2).abs() < 1e-6);
}

#[test]
fn test_one_shot_has_no_system_instruction() {
    let body =
        serde_json::to_value(encode_request(&GenerationRequest::one_shot("hi", 0.4))).unwrap();
    assert!(body.get("systemInstruction").is_none());
    assert_eq!(body["contents"][0]["parts"][0]["text"], "hi");
}

#[test]
fn test_decode_concatenates_text_parts() {
    let body = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Hello, "},{"text":"world"}]}}]}"#;
    assert_eq!(decode_response(body).unwrap(), "Hello, world");
}

#[test]
fn test_decode_without_text_is_empty_string() {
    assert_eq!(decode_response(r#"{"candidates":[]}"#).unwrap(), "");
    assert_eq!(
        decode_response(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap(),
        ""
    );
    assert_eq!(
        decode_response(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).unwrap(),
        ""
    );
}

#[test]
fn test_decode_garbage_is_delivery_error() {
    let err = decode_response("<html>bad gateway</html>").unwrap_err();
    assert!(err.is_delivery());
}

#[test]
fn test_http_error_uses_structured_message() {
    let body = r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
    let err = map_http_error(StatusCode::TOO_MANY_REQUESTS, body);
    assert_eq!(
        err.to_string(),
        "Delivery error (HTTP 429): RESOURCE_EXHAUSTED: Quota exceeded"
    );
}

#[test]
fn test_http_error_with_plain_body() {
    let err = map_http_error(StatusCode::BAD_GATEWAY, "upstream down");
    assert_eq!(err.to_string(), "Delivery error (HTTP 502): upstream down");
}

#[tokio::test]
async fn test_missing_key_fails_fast_with_config_error() {
    // Unroutable base URL: the call must fail before any connection attempt.
    let client = GeminiApiClient::new("  ", "gemini-2.5-flash").with_base_url("http://0.0.0.0:1");

    let err = client
        .generate(GenerationRequest::one_shot("hello", 0.4))
        .await
        .unwrap_err();

    assert!(err.is_config());
}
