//! End-to-end tests over the public bulk encoding API

use std::io::Read;

use flate2::read::GzDecoder;
use serde::Serialize;
use serde_json::{json, Value};

use skiff_bulk::{BodyEncoder, BufferPool, BulkCodecConfig, BulkEncoder, ContentHeaders};

#[derive(Serialize)]
struct Action<'a> {
    create: Create<'a>,
}

#[derive(Serialize)]
struct Create<'a> {
    #[serde(rename = "_index")]
    index: &'a str,
}

#[derive(Serialize)]
struct LogDoc<'a> {
    seq: u64,
    level: &'a str,
    message: &'a str,
}

fn meta(index: &str) -> Action<'_> {
    Action {
        create: Create { index },
    }
}

fn doc(seq: u64) -> LogDoc<'static> {
    LogDoc {
        seq,
        level: "info",
        message: "service started",
    }
}

fn split_lines(body: &[u8]) -> Vec<&[u8]> {
    body.split(|&b| b == b'\n')
        .filter(|line| !line.is_empty())
        .collect()
}

#[test]
fn test_plain_body_end_to_end() {
    let config: BulkCodecConfig = toml::from_str("compression_level = 0").unwrap();
    let mut encoder = BulkEncoder::from_config(&config).unwrap();

    for seq in 0..3 {
        encoder.add(&meta("logs-2025"), &doc(seq)).unwrap();
    }

    assert_eq!(encoder.content_headers(), ContentHeaders::JSON);

    let body = encoder.finish().unwrap().to_vec();
    let lines = split_lines(&body);
    assert_eq!(lines.len(), 6);

    let first: Value = serde_json::from_slice(lines[0]).unwrap();
    assert_eq!(first["create"]["_index"], json!("logs-2025"));
    let last: Value = serde_json::from_slice(lines[5]).unwrap();
    assert_eq!(last["seq"], json!(2));
}

#[test]
fn test_compressed_body_matches_plain() {
    let records: Vec<(Value, Value)> = (0..4)
        .map(|seq| {
            (
                serde_json::to_value(meta("metrics")).unwrap(),
                serde_json::to_value(doc(seq)).unwrap(),
            )
        })
        .collect();

    let mut plain = BulkEncoder::from_config(&BulkCodecConfig::default()).unwrap();
    let gzip_config = BulkCodecConfig {
        compression_level: 6,
        ..Default::default()
    };
    let mut gzip = BulkEncoder::from_config(&gzip_config).unwrap();

    for (m, d) in &records {
        plain.add(m, d).unwrap();
        gzip.add(m, d).unwrap();
    }

    let plain_body = plain.finish().unwrap().to_vec();
    assert_eq!(gzip.content_headers(), ContentHeaders::GZIP_JSON);

    let mut decoded = Vec::new();
    GzDecoder::new(gzip.finish().unwrap())
        .read_to_end(&mut decoded)
        .unwrap();
    assert_eq!(decoded, plain_body);
}

#[test]
fn test_direct_passthrough_end_to_end() {
    let config: BulkCodecConfig = toml::from_str("direct_passthrough = true").unwrap();
    let mut encoder = BulkEncoder::from_config(&config).unwrap();

    let rendered = r#"{"already":"rendered","seq":9}"#;
    encoder
        .add(
            &json!({"create": {"_index": "raw"}}),
            &json!({"send_direct_flag": true, "message": rendered}),
        )
        .unwrap();
    encoder.add(&json!({"create": {}}), &doc(1)).unwrap();

    let body = encoder.finish().unwrap().to_vec();
    let lines = split_lines(&body);
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[1], rendered.as_bytes());

    // The unmarked document went through normal encoding
    let last: Value = serde_json::from_slice(lines[3]).unwrap();
    assert_eq!(last["seq"], json!(1));
}

#[test]
fn test_bad_record_does_not_poison_batch() {
    // A map with non-string keys cannot be encoded as JSON
    let mut bad = std::collections::HashMap::new();
    bad.insert(vec![1u8], "value");

    let config = BulkCodecConfig {
        compression_level: 3,
        ..Default::default()
    };
    let mut encoder = BulkEncoder::from_config(&config).unwrap();

    encoder.add(&json!({"create": {}}), &doc(1)).unwrap();
    let err = encoder.add(&json!({"create": {}}), &bad).unwrap_err();
    assert!(err.is_record_error());
    encoder.add(&json!({"create": {}}), &doc(2)).unwrap();

    let mut decoded = Vec::new();
    GzDecoder::new(encoder.finish().unwrap())
        .read_to_end(&mut decoded)
        .unwrap();
    assert_eq!(split_lines(&decoded).len(), 4);
}

#[test]
fn test_pool_recycles_encoder_buffers() {
    let pool = BufferPool::new(2, 1024);
    let config = BulkCodecConfig::default();

    for _ in 0..5 {
        let buf = pool.get();
        let mut encoder = BulkEncoder::from_config_with_buffer(&config, buf).unwrap();
        encoder.add(&json!({"create": {}}), &json!({"n": 1})).unwrap();
        pool.put(encoder.into_buffer());
    }

    let snapshot = pool.metrics().snapshot();
    assert_eq!(snapshot.hits, 5);
    assert_eq!(snapshot.returns, 5);
    assert_eq!(snapshot.misses, 0);
}
