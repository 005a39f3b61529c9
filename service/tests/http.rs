use std::f32::consts::PI;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::Value;
use tower::ServiceExt;
use voiceguard_audio::Waveform;
use voiceguard_classifier::{
    train, ClassifierError, ForestConfig, Label, LabeledSample, TrainConfig,
};
use voiceguard_features::{Extractor, FeatureConfig};
use voiceguard_service::{router, start_server, InferenceService, ServiceConfig, StartupError};

const BOUNDARY: &str = "voiceguard-test-boundary";

fn wav_bytes(samples: &[f32], rate: u32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut w = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for &s in samples {
            w.write_sample((s * 20000.0) as i16).unwrap();
        }
        w.finalize().unwrap();
    }
    cursor.into_inner()
}

fn tone(freq: f32, rate: u32, seconds: f32) -> Vec<f32> {
    let n = (rate as f32 * seconds) as usize;
    (0..n)
        .map(|i| 0.7 * (2.0 * PI * freq * i as f32 / rate as f32).sin())
        .collect()
}

fn noise(seed: u64, n: usize) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| rng.gen_range(-0.3f32..0.3)).collect()
}

/// Writes a model that labels tones FAKE and noise REAL.
fn write_model(path: &std::path::Path) {
    write_model_at(path, None);
}

/// Same model, with the schema recording `sample_rate` as the loader rate.
fn write_model_at(path: &std::path::Path, sample_rate: Option<u32>) {
    let ex = Extractor::new(FeatureConfig::default()).unwrap();
    let mut samples = Vec::new();
    for (i, freq) in [220.0, 330.0, 440.0, 660.0, 880.0, 1100.0].into_iter().enumerate() {
        let t = Waveform::new(tone(freq, 16000, 0.6), 16000).unwrap();
        samples.push(LabeledSample {
            features: ex.extract(&t).unwrap(),
            label: Label::Fake,
        });
        let n = Waveform::new(noise(i as u64 + 1, 9600), 16000).unwrap();
        samples.push(LabeledSample {
            features: ex.extract(&n).unwrap(),
            label: Label::Real,
        });
    }
    let cfg = TrainConfig {
        forest: ForestConfig {
            n_estimators: 25,
            ..Default::default()
        },
        ..Default::default()
    };
    let schema = ex.schema().clone().with_sample_rate(sample_rate);
    train(&samples, &schema, &cfg)
        .unwrap()
        .artifact
        .save(path)
        .unwrap();
}

fn app(dir: &std::path::Path, spool: bool) -> Router {
    let model_path = dir.join("model.msgpack");
    write_model(&model_path);
    let cfg = ServiceConfig {
        model_path,
        spool_dir: spool.then(|| dir.join("spool")),
        ..Default::default()
    };
    let service = InferenceService::from_config(&cfg).unwrap();
    router(service, &cfg)
}

fn upload(field: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"clip.wav\"\r\n",
            field
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: audio/wav\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn predict_sine_as_fake() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path(), false);

    let wav = wav_bytes(&tone(440.0, 16000, 3.0), 16000);
    let (status, body) = send(app, upload("file", &wav)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction"], "FAKE");
    let confidence = body["confidence"].as_f64().unwrap();
    assert!((0.5..=1.0).contains(&confidence));
}

#[tokio::test]
async fn empty_upload_is_decode_failure() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path(), false);

    let (status, body) = send(app, upload("file", &[])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("invalid audio"));
    assert!(body.get("prediction").is_none());
}

#[tokio::test]
async fn identical_files_identical_responses() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path(), true);

    let wav = wav_bytes(&noise(77, 24000), 16000);
    let (s1, b1) = send(app.clone(), upload("file", &wav)).await;
    let (s2, b2) = send(app, upload("file", &wav)).await;

    assert_eq!(s1, StatusCode::OK);
    assert_eq!(s2, StatusCode::OK);
    assert_eq!(b1, b2);
    let leftover = std::fs::read_dir(dir.path().join("spool")).unwrap().count();
    assert_eq!(leftover, 0);
}

#[tokio::test]
async fn silent_upload_is_unprocessable() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path(), false);

    let wav = wav_bytes(&vec![0.0; 16000], 16000);
    let (status, body) = send(app, upload("file", &wav)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("silent"));
}

#[tokio::test]
async fn wrong_field_name() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path(), false);

    let wav = wav_bytes(&tone(440.0, 16000, 0.5), 16000);
    let (status, body) = send(app, upload("audio", &wav)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("file"));
}

#[tokio::test]
async fn non_multipart_body_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path(), false);

    let req = Request::builder()
        .method("POST")
        .uri("/predict")
        .header("content-type", "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let (status, body) = send(app, req).await;
    assert!(status.is_client_error());
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn health_reports_schema() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path(), false);

    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["schema"]["name"], "mfcc20-delta-zcr-centroid");
    assert_eq!(body["schema"]["len"], 42);
}

#[tokio::test]
async fn missing_model_aborts_startup() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = ServiceConfig {
        listen: "127.0.0.1:0".into(),
        model_path: dir.path().join("absent.msgpack"),
        ..Default::default()
    };
    assert!(matches!(
        InferenceService::from_config(&cfg),
        Err(StartupError::Model(_))
    ));
    assert!(start_server(cfg).await.is_err());
}

#[tokio::test]
async fn sample_rate_mismatch_aborts_startup() {
    let dir = tempfile::tempdir().unwrap();
    let model_path = dir.path().join("model-16k.msgpack");
    write_model_at(&model_path, Some(16000));

    let cfg = ServiceConfig {
        model_path: model_path.clone(),
        ..Default::default()
    };
    assert!(matches!(
        InferenceService::from_config(&cfg),
        Err(StartupError::Model(ClassifierError::SchemaMismatch { .. }))
    ));

    let cfg = ServiceConfig {
        model_path,
        target_sample_rate: Some(16000),
        ..Default::default()
    };
    let service = InferenceService::from_config(&cfg).unwrap();
    assert_eq!(service.schema().sample_rate, Some(16000));
}
