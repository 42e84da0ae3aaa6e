//! Device listing and actions through the authorized-call wrapper.

mod auth_support;

use mowerlink::auth::DeviceBinding;
use mowerlink::device::{DeviceAction, DeviceListing, DeviceSummary, RemoteError};
use mowerlink::error::{ErrorCategory, MowerError};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use auth_support::{
    bare_device_service, device_service, mount_refresh, mower_json, session_with, CLIENT_ID,
};

#[tokio::test]
async fn listing_binds_first_device() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/mowers"))
        .and(header("authorization", "Bearer A1"))
        .and(header("authorization-provider", "husqvarna"))
        .and(header("x-api-key", CLIENT_ID))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                mower_json("mower-1", "Frank", "MOWING", 87),
                mower_json("mower-2", "Second", "PARKED_IN_CS", 100)
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let service = device_service(&server);
    let session = session_with("A1", "R1");
    let listing = service.list_devices(&session).await.expect("list");

    assert_eq!(
        listing,
        DeviceListing::Found(DeviceSummary {
            id: "mower-1".to_string(),
            name: "Frank".to_string(),
            activity: "MOWING".to_string(),
            battery_percent: 87,
        })
    );
    assert_eq!(
        session.tokens().device().unwrap(),
        Some(DeviceBinding::new("mower-1"))
    );
}

#[tokio::test]
async fn empty_listing_reports_no_devices() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/mowers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&server)
        .await;

    let service = device_service(&server);
    let session = session_with("A1", "R1");

    assert_eq!(
        service.list_devices(&session).await.unwrap(),
        DeviceListing::NoDevices
    );
    assert_eq!(session.tokens().device().unwrap(), None);
}

#[tokio::test]
async fn bare_envelope_parses_plain_array() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/mowers"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([mower_json("m-9", "Bare", "CHARGING", 12)])),
        )
        .mount(&server)
        .await;

    let service = bare_device_service(&server);
    let session = session_with("A1", "R1");

    match service.list_devices(&session).await.unwrap() {
        DeviceListing::Found(summary) => assert_eq!(summary.id, "m-9"),
        other => panic!("expected a device, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_listing_is_operation_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/mowers"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = device_service(&server)
        .list_devices(&session_with("A1", "R1"))
        .await
        .unwrap_err();
    assert!(matches!(err, MowerError::Operation(RemoteError::Decode(_))));
    assert_eq!(err.category(), ErrorCategory::Operation);
}

#[tokio::test]
async fn expired_token_is_refreshed_for_listing() {
    let server = MockServer::start().await;
    mount_refresh(&server, "R1", "A2", "R2", 1).await;
    Mock::given(method("GET"))
        .and(path("/v1/mowers"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(401).set_body_string("expired"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/mowers"))
        .and(header("authorization", "Bearer A2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [mower_json("mower-1", "Frank", "MOWING", 87)]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let service = device_service(&server);
    let session = session_with("A1", "R1");

    assert!(matches!(
        service.list_devices(&session).await.unwrap(),
        DeviceListing::Found(_)
    ));
    assert_eq!(
        session.tokens().load().unwrap().unwrap().refresh_token,
        "R2"
    );
}

#[tokio::test]
async fn start_posts_duration_to_bound_device() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/mowers/mower-1/actions"))
        .and(header("authorization", "Bearer A1"))
        .and(header("content-type", "application/vnd.api+json"))
        .and(header("x-api-key", CLIENT_ID))
        .and(body_json(json!({
            "data": { "type": "Start", "attributes": { "duration": 30 } }
        })))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let service = device_service(&server);
    let session = session_with("A1", "R1");
    session
        .tokens()
        .bind_device(DeviceBinding::new("mower-1"))
        .unwrap();

    service
        .act_on_bound_device(&session, DeviceAction::start())
        .await
        .expect("start accepted");
}

#[tokio::test]
async fn park_sends_empty_attributes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/mowers/mower-1/actions"))
        .and(body_json(json!({
            "data": { "type": "Park", "attributes": {} }
        })))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let service = device_service(&server);
    let session = session_with("A1", "R1");

    service
        .send_action(&session, "mower-1", DeviceAction::Park)
        .await
        .expect("park accepted");
}

#[tokio::test]
async fn action_without_bound_device_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(202))
        .expect(0)
        .mount(&server)
        .await;

    let service = device_service(&server);
    let session = session_with("A1", "R1");

    let err = service
        .act_on_bound_device(&session, DeviceAction::Park)
        .await
        .unwrap_err();
    assert!(matches!(err, MowerError::ClientState(_)));
    assert_eq!(err.category(), ErrorCategory::ClientState);
}

#[tokio::test]
async fn rejected_action_surfaces_remote_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/mowers/mower-1/actions"))
        .respond_with(ResponseTemplate::new(409).set_body_string("mower is busy"))
        .mount(&server)
        .await;

    let err = device_service(&server)
        .send_action(&session_with("A1", "R1"), "mower-1", DeviceAction::Park)
        .await
        .unwrap_err();
    match err {
        MowerError::Operation(RemoteError::Api { status, body }) => {
            assert_eq!(status, 409);
            assert_eq!(body, "mower is busy");
        }
        other => panic!("expected Operation error, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_listing_drops_previous_binding() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/mowers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(202))
        .expect(0)
        .mount(&server)
        .await;

    let service = device_service(&server);
    let session = session_with("A1", "R1");
    session
        .tokens()
        .bind_device(DeviceBinding::new("mower-gone"))
        .unwrap();

    assert_eq!(
        service.list_devices(&session).await.unwrap(),
        DeviceListing::NoDevices
    );
    assert_eq!(session.tokens().device().unwrap(), None);

    let err = service
        .act_on_bound_device(&session, DeviceAction::Park)
        .await
        .unwrap_err();
    assert!(matches!(err, MowerError::ClientState(_)));
}
