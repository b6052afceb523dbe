use beacon_core::models::{AppInfo, Event, EventContext, EventIdentity, RemoteConfig, Session};
use beacon_core::traits::SendOutcome;
use chrono::{TimeZone, Utc};
use serde_json::{json, Map};

fn app() -> AppInfo {
    AppInfo {
        platform: "web".into(),
        app: "meridian".into(),
        app_version: "0.1.0".into(),
        build: "1".into(),
        env: "dev".into(),
    }
}

fn identity() -> EventIdentity {
    EventIdentity {
        anonymous_id: "anon-1".into(),
        user_id: None,
        session_id: "sess-1".into(),
    }
}

#[test]
fn event_serializes_flat_wire_shape() {
    let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let event = Event::new(
        "button_click",
        ts,
        identity(),
        app(),
        EventContext::new("en-US", "UTC"),
        Map::new(),
    );
    let value = serde_json::to_value(&event).unwrap();
    let obj = value.as_object().unwrap();

    for key in [
        "schema_version",
        "event_id",
        "event",
        "ts",
        "anonymous_id",
        "user_id",
        "session_id",
        "platform",
        "app",
        "app_version",
        "build",
        "env",
        "context",
        "properties",
    ] {
        assert!(obj.contains_key(key), "missing key {key}");
    }
    assert_eq!(obj.len(), 14);
    assert_eq!(value["schema_version"], 1);
    assert_eq!(value["ts"], "2024-05-01T12:00:00.000Z");
    assert!(value["user_id"].is_null());
    assert!(value["context"].get("referrer").is_none());
}

#[test]
fn event_survives_persistence_format() {
    let event = Event::new(
        "x",
        Utc::now(),
        identity(),
        app(),
        EventContext::new("en-US", "UTC").with_referrer(Some("/home".into())),
        json!({"plan": "pro"}).as_object().cloned().unwrap(),
    );
    let raw = serde_json::to_string(&vec![event.clone()]).unwrap();
    let back: Vec<Event> = serde_json::from_str(&raw).unwrap();
    assert_eq!(back[0].event_id, event.event_id);
    assert_eq!(back[0].app, event.app);
    assert_eq!(back[0].context, event.context);
    assert_eq!(back[0].ts.timestamp_millis(), event.ts.timestamp_millis());
}

#[test]
fn sub_millisecond_timestamps_are_truncated_at_construction() {
    let ts = Utc.timestamp_opt(1_714_564_800, 347_505_539).unwrap();
    let event = Event::new(
        "x",
        ts,
        identity(),
        app(),
        EventContext::new("en-US", "UTC"),
        Map::new(),
    );
    assert_eq!(event.ts.timestamp_subsec_nanos(), 347_000_000);

    let raw = serde_json::to_string(&event).unwrap();
    let back: Event = serde_json::from_str(&raw).unwrap();
    assert_eq!(back, event);
}

#[test]
fn context_overrides_replace_known_keys_and_add_new_ones() {
    let overrides = json!({"screen": "Home", "locale": "de-DE"})
        .as_object()
        .cloned()
        .unwrap();
    let ctx = EventContext::new("en-US", "UTC").with_overrides(overrides);
    assert_eq!(ctx.locale, "de-DE");
    let value = serde_json::to_value(&ctx).unwrap();
    assert_eq!(value["screen"], "Home");
    assert_eq!(value["locale"], "de-DE");
}

#[test]
fn session_expiry_is_strictly_greater_than_timeout() {
    let session = Session {
        session_id: "s".into(),
        session_start: 1_000,
    };
    assert!(!session.is_expired(1_000 + 30 * 60 * 1000, 30 * 60 * 1000));
    assert!(session.is_expired(1_001 + 30 * 60 * 1000, 30 * 60 * 1000));
}

#[test]
fn remote_config_missing_fields_are_permissive() {
    let cfg: RemoteConfig = serde_json::from_value(json!({})).unwrap();
    assert!(cfg.enabled);
    assert!(cfg.exclude_admin_users_from_tracking);

    let cfg: RemoteConfig =
        serde_json::from_value(json!({"enabled": false, "excludeAdminUsersFromTracking": false}))
            .unwrap();
    assert!(!cfg.enabled);
    assert!(!cfg.exclude_admin_users_from_tracking);
}

#[test]
fn send_outcome_classification() {
    assert!(SendOutcome::from_status(204).is_delivered());
    assert!(SendOutcome::from_status(503).is_retryable());
    assert!(SendOutcome::from_status(0).is_retryable());
    assert_eq!(
        SendOutcome::from_status(400),
        SendOutcome::ClientError { status: 400 }
    );
    assert!(!SendOutcome::from_status(404).is_retryable());
    assert!(!SendOutcome::from_status(302).is_retryable());
}
