//! Push-channel frame vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use serde_json::json;

use tally_core::error::ClientCode;
use tally_core::protocol::count::{CountRecord, RelayResult};
use tally_core::protocol::frame::{Frame, OutFrame, EVENT_MESSAGE, EVENT_SEND};
use tally_core::TallyError;

#[test]
fn parse_frame_min() {
    let f = Frame::parse(r#"{"event":"send"}"#).unwrap();
    assert_eq!(f.event, EVENT_SEND);
    assert!(f.id.is_none());
    assert!(f.data.is_none());
}

#[test]
fn parse_frame_full() {
    let f = Frame::parse(r#"{"event":"send","id":12,"data":{"count":0,"message":"","hostname":""}}"#).unwrap();
    assert_eq!(f.id, Some(12));
    let raw = f.data.unwrap();
    assert!(raw.get().contains("\"hostname\""));
}

#[test]
fn reject_unknown_fields_and_empty_event() {
    let err = Frame::parse(r#"{"event":"send","room":"visits"}"#).unwrap_err();
    assert_eq!(err.client_code(), ClientCode::BadRequest);

    let err = Frame::parse(r#"{"event":""}"#).unwrap_err();
    assert_eq!(err.client_code(), ClientCode::BadRequest);

    assert!(Frame::parse("not json").is_err());
}

#[test]
fn out_frame_omits_missing_id() {
    let s = OutFrame::event(EVENT_MESSAGE, None, json!({"count": 1})).to_json().unwrap();
    assert_eq!(s, r#"{"event":"message","data":{"count":1}}"#);

    let s = OutFrame::ack(3, json!("OK")).to_json().unwrap();
    assert_eq!(s, r#"{"event":"ack","id":3,"data":"OK"}"#);
}

#[test]
fn error_frame_uses_client_code() {
    let v: serde_json::Value =
        serde_json::from_str(&OutFrame::error(ClientCode::PayloadTooLarge, "too big").to_json().unwrap()).unwrap();
    assert_eq!(v["event"], "error");
    assert_eq!(v["data"]["code"], "PAYLOAD_TOO_LARGE");
    assert_eq!(v["data"]["msg"], "too big");
}

#[test]
fn count_record_decodes_upstream_body() {
    let rec = CountRecord::from_json(br#"{"count":42,"hostname":"h1"}"#).unwrap();
    assert_eq!(rec, CountRecord { count: 42, hostname: "h1".into() });

    let err = CountRecord::from_json(b"<html>").unwrap_err();
    assert!(matches!(err, TallyError::Decode(_)));

    let err = CountRecord::from_json(br#"{"count":-3,"hostname":"h1"}"#).unwrap_err();
    assert!(matches!(err, TallyError::Decode(_)));
}

#[test]
fn relay_result_shapes() {
    let ok = RelayResult::from(CountRecord { count: 42, hostname: "h1".into() });
    assert_eq!(
        serde_json::to_value(&ok).unwrap(),
        json!({"count": 42, "message": "", "hostname": "h1"})
    );

    let failed = RelayResult::unreachable(&TallyError::Upstream("connection refused".into()));
    assert!(failed.is_unreachable());
    assert_eq!(
        serde_json::to_value(&failed).unwrap(),
        json!({"count": -1, "message": "connection refused", "hostname": "[Unreachable]"})
    );
}
