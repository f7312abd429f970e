//! Decode-once codec for the transport layer.
//!
//! - Text frames => `Frame` (size-checked before parsing, lazy `RawValue` data)
//! - Binary frames are rejected
//! - Ping/Pong/Close are surfaced for lifecycle management

use axum::extract::ws::Message;
use tally_core::{
    error::{Result, TallyError},
    protocol::frame::Frame,
};

#[derive(Debug)]
pub enum Inbound {
    Event(Frame),
    Ping(Vec<u8>),
    Pong,
    Close,
}

pub fn decode(msg: Message, max_frame_bytes: usize) -> Result<Inbound> {
    match msg {
        Message::Text(s) => {
            if s.len() > max_frame_bytes {
                return Err(TallyError::PayloadTooLarge);
            }
            Ok(Inbound::Event(Frame::parse(&s)?))
        }
        Message::Binary(_) => Err(TallyError::BadRequest("binary frames are not supported".into())),
        Message::Ping(v) => Ok(Inbound::Ping(v)),
        Message::Pong(_) => Ok(Inbound::Pong),
        Message::Close(_) => Ok(Inbound::Close),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::error::ClientCode;

    #[test]
    fn oversized_text_is_rejected_before_parse() {
        let big = format!(r#"{{"event":"send","data":"{}"}}"#, "x".repeat(200));
        let err = decode(Message::Text(big), 64).unwrap_err();
        assert_eq!(err.client_code(), ClientCode::PayloadTooLarge);
    }

    #[test]
    fn binary_is_rejected() {
        let err = decode(Message::Binary(vec![1, 2, 3]), 64).unwrap_err();
        assert_eq!(err.client_code(), ClientCode::BadRequest);
    }

    #[test]
    fn text_decodes_to_event() {
        match decode(Message::Text(r#"{"event":"send","id":1}"#.into()), 64).unwrap() {
            Inbound::Event(f) => {
                assert_eq!(f.event, "send");
                assert_eq!(f.id, Some(1));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
