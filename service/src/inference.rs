//! Per-request orchestration: bytes -> waveform -> features -> verdict.

use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, debug_span, info, warn};
use voiceguard_audio::{LoadOptions, Loader, SpooledAudio, Waveform};
use voiceguard_classifier::{Classifier, ClassifierError, Prediction};
use voiceguard_features::{Extractor, FeatureConfig, FeatureSchema};

use crate::{ServiceConfig, ServiceError, StartupError};

/// Lifecycle of one inference request.
///
/// `Received -> Decoded -> FeatureExtracted -> Scored -> Responded`, or
/// `Failed` from any stage. Both `Responded` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStage {
    Received,
    Decoded,
    FeatureExtracted,
    Scored,
    Responded,
    Failed,
}

impl RequestStage {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestStage::Received => "received",
            RequestStage::Decoded => "decoded",
            RequestStage::FeatureExtracted => "feature_extracted",
            RequestStage::Scored => "scored",
            RequestStage::Responded => "responded",
            RequestStage::Failed => "failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RequestStage::Responded | RequestStage::Failed)
    }
}

impl fmt::Display for RequestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shared inference pipeline. Clones share the loaded model.
///
/// The extractor and classifier are immutable after construction, so
/// requests run concurrently without locking. Uploads spooled to disk get
/// their own uniquely named file, removed when the request ends.
#[derive(Clone)]
pub struct InferenceService {
    inner: Arc<Inner>,
}

struct Inner {
    schema: FeatureSchema,
    loader: Loader,
    extractor: Extractor,
    classifier: Classifier,
    spool_dir: Option<PathBuf>,
    next_id: AtomicU64,
}

impl InferenceService {
    /// Builds the service, refusing a classifier trained on a different
    /// feature schema than `extractor` produces at the loader's sample rate.
    pub fn new(
        loader: Loader,
        extractor: Extractor,
        classifier: Classifier,
        spool_dir: Option<PathBuf>,
    ) -> Result<Self, ClassifierError> {
        let schema = serving_schema(&loader, &extractor);
        if *classifier.schema() != schema {
            return Err(ClassifierError::SchemaMismatch {
                model: classifier.schema().to_string(),
                extractor: schema.to_string(),
            });
        }
        Ok(Self {
            inner: Arc::new(Inner {
                schema,
                loader,
                extractor,
                classifier,
                spool_dir,
                next_id: AtomicU64::new(1),
            }),
        })
    }

    /// Loads the model named by `cfg`. Any failure here means the service
    /// cannot start.
    pub fn from_config(cfg: &ServiceConfig) -> Result<Self, StartupError> {
        let extractor = Extractor::new(FeatureConfig::default())?;
        let loader = Loader::new(LoadOptions {
            target_sample_rate: cfg.target_sample_rate,
        });
        let classifier = Classifier::load(&cfg.model_path, &serving_schema(&loader, &extractor))?;
        if let Some(dir) = &cfg.spool_dir {
            std::fs::create_dir_all(dir)?;
        }
        Ok(Self::new(loader, extractor, classifier, cfg.spool_dir.clone())?)
    }

    /// Schema of the features this service feeds its model.
    pub fn schema(&self) -> &FeatureSchema {
        &self.inner.schema
    }

    /// Runs one request on the blocking pool.
    pub async fn predict(&self, data: Bytes) -> Result<Prediction, ServiceError> {
        let svc = self.clone();
        tokio::task::spawn_blocking(move || svc.infer(&data))
            .await
            .map_err(|e| ServiceError::Internal(format!("inference task failed: {}", e)))?
    }

    /// Runs one request on the current thread.
    pub fn infer(&self, data: &[u8]) -> Result<Prediction, ServiceError> {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let span = debug_span!("request", id);
        let _guard = span.enter();

        debug!(stage = %RequestStage::Received, bytes = data.len());
        match self.run(data) {
            Ok(prediction) => {
                debug!(stage = %RequestStage::Responded);
                info!(
                    request = id,
                    prediction = %prediction.label,
                    confidence = prediction.confidence,
                    "verdict"
                );
                Ok(prediction)
            }
            Err(err) => {
                warn!(request = id, stage = %RequestStage::Failed, error = %err, "request failed");
                Err(err)
            }
        }
    }

    fn run(&self, data: &[u8]) -> Result<Prediction, ServiceError> {
        let wave = self.decode(data)?;
        debug!(
            stage = %RequestStage::Decoded,
            samples = wave.len(),
            sample_rate = wave.sample_rate()
        );

        let features = self.inner.extractor.extract(&wave)?;
        drop(wave);
        debug!(stage = %RequestStage::FeatureExtracted);

        let prediction = self.inner.classifier.score_vector(&features)?;
        debug!(stage = %RequestStage::Scored);
        Ok(prediction)
    }

    fn decode(&self, data: &[u8]) -> Result<Waveform, ServiceError> {
        let Some(dir) = &self.inner.spool_dir else {
            return Ok(self.inner.loader.load_bytes(data)?);
        };
        let spool = SpooledAudio::create_in(dir, data)
            .map_err(|e| ServiceError::Internal(format!("spool upload: {}", e)))?;
        let wave = spool.load(&self.inner.loader)?;
        if let Err(e) = spool.close() {
            warn!(error = %e, "failed to remove spooled upload");
        }
        Ok(wave)
    }
}

fn serving_schema(loader: &Loader, extractor: &Extractor) -> FeatureSchema {
    extractor
        .schema()
        .clone()
        .with_sample_rate(loader.options().target_sample_rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use voiceguard_classifier::{BinaryClassifier, Label};

    /// Calls everything with a ZCR above 0.1 FAKE.
    struct ZcrRule;

    impl BinaryClassifier for ZcrRule {
        fn n_features(&self) -> usize {
            42
        }

        fn predict_proba(&self, x: &[f64]) -> [f64; 2] {
            if x[40] > 0.1 { [0.2, 0.8] } else { [0.9, 0.1] }
        }
    }

    fn wav_bytes(samples: &[f32], rate: u32) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut cursor = std::io::Cursor::new(Vec::new());
        {
            let mut w = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for &s in samples {
                w.write_sample(s).unwrap();
            }
            w.finalize().unwrap();
        }
        cursor.into_inner()
    }

    fn tone(freq: f32, rate: u32, n: usize) -> Vec<f32> {
        (0..n)
            .map(|i| 0.5 * (2.0 * std::f32::consts::PI * freq * i as f32 / rate as f32).sin())
            .collect()
    }

    fn service(spool_dir: Option<PathBuf>) -> InferenceService {
        let extractor = Extractor::new(FeatureConfig::default()).unwrap();
        let classifier = Classifier::new(ZcrRule, extractor.schema().clone());
        InferenceService::new(Loader::default(), extractor, classifier, spool_dir).unwrap()
    }

    #[test]
    fn stages() {
        assert!(RequestStage::Responded.is_terminal());
        assert!(RequestStage::Failed.is_terminal());
        assert!(!RequestStage::Scored.is_terminal());
        assert_eq!(RequestStage::FeatureExtracted.to_string(), "feature_extracted");
    }

    #[test]
    fn infer_tone() {
        let svc = service(None);
        let p = svc.infer(&wav_bytes(&tone(200.0, 16000, 16000), 16000)).unwrap();
        assert_eq!(p.label, Label::Real);
        assert_eq!(p.confidence, 0.9);
    }

    #[test]
    fn empty_bytes_is_decode_error() {
        let svc = service(None);
        assert!(matches!(svc.infer(&[]), Err(ServiceError::Decode(_))));
    }

    #[test]
    fn silence_is_extraction_error() {
        let svc = service(None);
        let err = svc.infer(&wav_bytes(&vec![0.0; 8000], 16000)).unwrap_err();
        assert!(matches!(err, ServiceError::Extraction(_)));
    }

    #[test]
    fn spooled_requests_leave_no_files() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(Some(dir.path().to_path_buf()));
        let data = wav_bytes(&tone(300.0, 16000, 8000), 16000);

        svc.infer(&data).unwrap();
        assert!(svc.infer(b"garbage").is_err());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn concurrent_spooled_requests_agree() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(Some(dir.path().to_path_buf()));
        let data = wav_bytes(&tone(440.0, 16000, 16000), 16000);

        let results: Vec<_> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| svc.infer(&data).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(results.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn schema_skew_is_rejected() {
        let extractor = Extractor::new(FeatureConfig::default()).unwrap();
        let other = FeatureSchema::new(FeatureConfig {
            n_mels: 64,
            ..Default::default()
        });
        let classifier = Classifier::new(ZcrRule, other);
        assert!(matches!(
            InferenceService::new(Loader::default(), extractor, classifier, None),
            Err(ClassifierError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn sample_rate_skew_is_rejected() {
        let extractor = Extractor::new(FeatureConfig::default()).unwrap();
        let trained_at_16k = extractor.schema().clone().with_sample_rate(Some(16000));

        let classifier = Classifier::new(ZcrRule, trained_at_16k.clone());
        assert!(matches!(
            InferenceService::new(Loader::default(), extractor, classifier, None),
            Err(ClassifierError::SchemaMismatch { .. })
        ));

        let extractor = Extractor::new(FeatureConfig::default()).unwrap();
        let classifier = Classifier::new(ZcrRule, trained_at_16k.clone());
        let loader = Loader::new(LoadOptions {
            target_sample_rate: Some(16000),
        });
        let svc = InferenceService::new(loader, extractor, classifier, None).unwrap();
        assert_eq!(*svc.schema(), trained_at_16k);
    }

    #[tokio::test]
    async fn predict_runs_off_thread() {
        let svc = service(None);
        let data = Bytes::from(wav_bytes(&tone(2000.0, 16000, 16000), 16000));
        let p = svc.predict(data).await.unwrap();
        assert_eq!(p.label, Label::Fake);
    }
}
