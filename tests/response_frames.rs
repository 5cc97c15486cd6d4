use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use respwire::protocol::{ResponseTag, VERSION_KEY, snapshot};
use respwire::serialize::{Decoder, Serialization, Tlv};
use respwire::{
    DEFAULT_MAX_FRAME_SIZE, Error, HEADER_LENGTH, Outcome, PackageKind, ResponseCodec,
    ResponseHeader, Status, Throwable, Value,
};

fn discriminator(frame: &[u8]) -> Option<ResponseTag> {
    Tlv::decoder(&frame[HEADER_LENGTH..])
        .decode()
        .ok()
        .and_then(|v| v.as_int())
        .and_then(ResponseTag::from_i32)
}

#[test]
fn typed_list_survives_full_frame() {
    let codec = ResponseCodec::new();
    let header = ResponseHeader::response(Tlv::ID, 1001);
    let outcome = Outcome::from_value(Value::List(vec![
        Value::Int(3),
        Value::Int(1),
        Value::Int(2),
    ]));

    let frame = codec.build(&header, &outcome).unwrap();
    let mut reply: Outcome<Vec<i32>> = Outcome::default();
    let decoded = codec.parse_frame(&frame, &mut reply).unwrap();

    assert_eq!(decoded.correlation_id(), 1001);
    assert_eq!(decoded.kind(), PackageKind::Response);
    assert_eq!(decoded.body_len() as usize, frame.len() - HEADER_LENGTH);
    assert_eq!(reply.value, Some(vec![3, 1, 2]));
}

#[test]
fn int_list_does_not_coerce_into_floats() {
    let codec = ResponseCodec::new();
    let outcome = Outcome::from_value(Value::List(vec![
        Value::Int(1),
        Value::Int(2),
        Value::Int(3),
    ]));
    let frame = codec
        .build(&ResponseHeader::response(Tlv::ID, 1), &outcome)
        .unwrap();

    let mut reply: Outcome<Vec<f64>> = Outcome::default();
    let err = codec.parse_frame(&frame, &mut reply).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { .. }));
}

#[test]
fn string_keyed_map_coerces_by_value_type() {
    let codec = ResponseCodec::new();
    let outcome = Outcome::from_value(Value::Map(vec![(Value::from("a"), Value::Int(1))]));
    let frame = codec
        .build(&ResponseHeader::response(Tlv::ID, 2), &outcome)
        .unwrap();

    let mut ints: Outcome<HashMap<String, i32>> = Outcome::default();
    codec.parse_frame(&frame, &mut ints).unwrap();
    assert_eq!(ints.value.unwrap()["a"], 1);

    let mut strings: Outcome<BTreeMap<String, String>> = Outcome::default();
    let err = codec.parse_frame(&frame, &mut strings).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { .. }));
}

#[test]
fn exception_message_survives_roundtrip() {
    let codec = ResponseCodec::new();
    let outcome = Outcome::from_error(std::io::Error::other("connection reset by service"))
        .with_attachment(VERSION_KEY, "2.7.5");
    let frame = codec
        .build(&ResponseHeader::response(Tlv::ID, 3), &outcome)
        .unwrap();
    assert_eq!(
        discriminator(&frame),
        Some(ResponseTag::WithExceptionWithAttachments)
    );

    let mut reply: Outcome<String> = Outcome::default();
    codec.parse_frame(&frame, &mut reply).unwrap();
    let exception = reply.exception.expect("exception");
    let throwable = exception.downcast_ref::<Throwable>().expect("throwable");
    assert_eq!(throwable.message(), "connection reset by service");
    assert_eq!(reply.attachments.get(VERSION_KEY).map(String::as_str), Some("2.7.5"));
    assert!(reply.value.is_none());
}

#[test]
fn null_outcome_leaves_destination_unchanged() {
    let codec = ResponseCodec::new();
    let frame = codec
        .build(&ResponseHeader::response(Tlv::ID, 4), &Outcome::default())
        .unwrap();
    assert_eq!(discriminator(&frame), Some(ResponseTag::NullValue));

    let mut reply: Outcome<Vec<i32>> = Outcome::default();
    codec.parse_frame(&frame, &mut reply).unwrap();
    assert!(reply.value.is_none());
    assert!(reply.exception.is_none());
}

#[test]
fn version_marker_flips_tag_set() {
    let codec = ResponseCodec::new();
    let header = ResponseHeader::response(Tlv::ID, 5);
    let plain = Outcome::from_value(Value::Bool(true));
    let marked = Outcome::from_value(Value::Bool(true)).with_attachment(VERSION_KEY, "2.6.3");
    let gap = Outcome::from_value(Value::Bool(true)).with_attachment(VERSION_KEY, "2.6.2");

    assert_eq!(
        discriminator(&codec.build(&header, &plain).unwrap()),
        Some(ResponseTag::Value)
    );
    assert_eq!(
        discriminator(&codec.build(&header, &marked).unwrap()),
        Some(ResponseTag::ValueWithAttachments)
    );
    assert_eq!(
        discriminator(&codec.build(&header, &gap).unwrap()),
        Some(ResponseTag::Value)
    );
}

#[test]
fn oversize_frame_is_rejected_with_sizes() {
    let codec = ResponseCodec::new();
    let outcome = Outcome::from_value(Value::Binary(vec![0u8; DEFAULT_MAX_FRAME_SIZE]));
    let before = snapshot().oversize_frames;

    let result = codec.build(&ResponseHeader::response(Tlv::ID, 6), &outcome);
    match result {
        Err(Error::OversizeFrame { size, max }) => {
            assert!(size > DEFAULT_MAX_FRAME_SIZE);
            assert_eq!(max, DEFAULT_MAX_FRAME_SIZE);
        }
        other => panic!("expected oversize error, got {other:?}"),
    }
    assert!(snapshot().oversize_frames > before);
}

#[test]
fn non_ok_status_carries_untagged_message() {
    let codec = ResponseCodec::new();
    let header = ResponseHeader::response(Tlv::ID, 7).with_status(Status::SERVER_TIMEOUT);
    let frame = codec
        .build(&header, &Outcome::from_error(Throwable::new("took too long")))
        .unwrap();

    let body = Tlv::decoder(&frame[HEADER_LENGTH..]).decode().unwrap();
    assert_eq!(body, Value::from("took too long"));

    let mut reply: Outcome = Outcome::default();
    let decoded = codec.parse_frame(&frame, &mut reply).unwrap();
    assert_eq!(decoded.status(), Status::SERVER_TIMEOUT);
    assert_eq!(reply.exception.unwrap().to_string(), "took too long");
}

#[test]
fn heartbeat_reply_is_skipped_on_parse() {
    let codec = ResponseCodec::new();
    let frame = codec
        .build(&ResponseHeader::heartbeat(Tlv::ID, 8), &Outcome::default())
        .unwrap();

    let mut reply: Outcome = Outcome::default();
    let decoded = codec.parse_frame(&frame, &mut reply).unwrap();
    assert_eq!(decoded.kind(), PackageKind::Heartbeat);
    assert!(reply.value.is_none());
}

#[test]
fn metrics_count_frames() {
    let before = snapshot();
    let codec = ResponseCodec::new();
    let frame = codec
        .build(
            &ResponseHeader::response(Tlv::ID, 9),
            &Outcome::from_value(Value::Long(1)),
        )
        .unwrap();
    let mut reply: Outcome<i64> = Outcome::default();
    codec.parse_frame(&frame, &mut reply).unwrap();

    let after = snapshot();
    assert!(after.frames_built > before.frames_built);
    assert!(after.frames_parsed > before.frames_parsed);
    assert!(after.largest_frame >= frame.len() as u64);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn shared_codec_handles_concurrent_frames() {
    let codec = Arc::new(ResponseCodec::new());
    let versions = ["2.0.2", "2.5.0", "2.6.3", "2.7.1", "garbage", ""];

    let mut handles = Vec::new();
    for task in 0..32i64 {
        let codec = Arc::clone(&codec);
        let version = versions[task as usize % versions.len()];
        handles.push(tokio::spawn(async move {
            let outcome = Outcome::from_value(Value::Long(task)).with_attachment(VERSION_KEY, version);
            let frame = codec
                .build(&ResponseHeader::response(Tlv::ID, task), &outcome)
                .unwrap();
            let mut reply: Outcome<i64> = Outcome::default();
            let header = codec.parse_frame(&frame, &mut reply).unwrap();
            (header.correlation_id(), reply.value, discriminator(&frame))
        }));
    }

    for handle in handles {
        let (id, value, tag) = handle.await.unwrap();
        assert_eq!(value, Some(id));
        let version = versions[id as usize % versions.len()];
        let expected = if matches!(version, "2.0.2" | "2.6.3" | "2.7.1") {
            ResponseTag::ValueWithAttachments
        } else {
            ResponseTag::Value
        };
        assert_eq!(tag, Some(expected));
    }

    // only well-formed versions are cached
    assert_eq!(codec.versions().len(), 4);
}
