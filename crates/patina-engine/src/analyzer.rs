//! Offline reference analysis: decode → separate → describe → recommend.
//!
//! [`analyze`] runs the whole chain synchronously and is what the
//! [`AnalysisWorker`] executes on its thread. The worker owns request
//! ordering: every request gets a monotonically increasing token, and
//! results whose token is no longer current are discarded on delivery;
//! in-flight computation is never cancelled, its result just lands in the
//! void. A failed analysis reports its error and changes nothing; results
//! only reach the engine when the caller explicitly publishes the
//! recommended parameters through the parameter bus.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread::JoinHandle;

use patina_analysis::{
    EqBand, InstrumentCategory, SourceFeatures, eq_match, extract, hpss, recommend, resample_to,
};
use patina_core::ProcessorParams;

/// Fixed analysis sample rate in Hz.
const ANALYSIS_RATE: u32 = 48000;

/// Errors from the offline analysis chain.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    /// The reference or source file could not be decoded.
    #[error("decode failed: {0}")]
    Decode(#[from] patina_io::Error),

    /// The decoded file contained no samples.
    #[error("file {0} contains no audio")]
    Empty(PathBuf),

    /// The worker thread is gone (channel closed).
    #[error("analysis worker disconnected")]
    WorkerGone,
}

/// Complete result of one reference analysis run. Immutable once
/// produced.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MojoFingerprint {
    /// Scalar descriptors of the reference's harmonic layer.
    pub features: SourceFeatures,
    /// Parameters recommended from those descriptors.
    pub recommended: ProcessorParams,
    /// Tonal-matching curve toward the reference, present when a source
    /// file was supplied.
    pub eq_match: Option<Vec<EqBand>>,
}

/// One analysis request.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    /// Reference recording to extract the character from.
    pub reference: PathBuf,
    /// Optional source recording for EQ matching.
    pub source: Option<PathBuf>,
    /// Category bias for the recommendation.
    pub category: InstrumentCategory,
}

/// Decode a file and convert it to mono at the analysis rate.
fn load_mono(path: &Path) -> Result<Vec<f32>, AnalyzeError> {
    let (samples, spec) = patina_io::read_wav(path)?;
    if samples.is_empty() {
        return Err(AnalyzeError::Empty(path.to_path_buf()));
    }
    Ok(resample_to(&samples, spec.sample_rate, ANALYSIS_RATE))
}

/// Run the full analysis chain synchronously.
///
/// Not real-time safe: this blocks on file I/O and large FFTs. Aborts
/// atomically on decode failure: no partial fingerprint is ever returned.
pub fn analyze(request: &AnalysisRequest) -> Result<MojoFingerprint, AnalyzeError> {
    tracing::info!(reference = %request.reference.display(), "reference analysis started");

    let reference = load_mono(&request.reference)?;
    let separation = hpss::separate(&reference);
    let features = extract(&separation.harmonic, ANALYSIS_RATE as f32);
    let recommended = recommend(&features, request.category);

    let eq = match &request.source {
        Some(source_path) => {
            let source = load_mono(source_path)?;
            Some(eq_match(
                &source,
                ANALYSIS_RATE as f32,
                &reference,
                ANALYSIS_RATE as f32,
            ))
        }
        None => None,
    };

    tracing::info!(
        crest_db = features.crest_db,
        centroid_hz = features.centroid_hz,
        "reference analysis finished"
    );
    Ok(MojoFingerprint {
        features,
        recommended,
        eq_match: eq,
    })
}

/// Token identifying an in-flight request.
pub type RequestToken = u64;

enum Job {
    Run(RequestToken, AnalysisRequest),
    Shutdown,
}

type JobResult = (RequestToken, Result<MojoFingerprint, AnalyzeError>);

/// Background analysis worker.
///
/// Requests are serialized on one spawned thread. Only the most recent
/// request is considered live: superseded or abandoned results are
/// dropped at [`poll`](Self::poll) time rather than cancelling the
/// computation.
pub struct AnalysisWorker {
    jobs: mpsc::Sender<Job>,
    results: mpsc::Receiver<JobResult>,
    handle: Option<JoinHandle<()>>,
    next_token: RequestToken,
    current: Option<RequestToken>,
}

impl Default for AnalysisWorker {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisWorker {
    /// Spawn the worker thread.
    #[must_use]
    pub fn new() -> Self {
        let (job_tx, job_rx) = mpsc::channel::<Job>();
        let (result_tx, result_rx) = mpsc::channel::<JobResult>();

        let handle = std::thread::spawn(move || {
            while let Ok(job) = job_rx.recv() {
                match job {
                    Job::Run(token, request) => {
                        let result = analyze(&request);
                        if result_tx.send((token, result)).is_err() {
                            break;
                        }
                    }
                    Job::Shutdown => break,
                }
            }
        });

        Self {
            jobs: job_tx,
            results: result_rx,
            handle: Some(handle),
            next_token: 0,
            current: None,
        }
    }

    /// Queue a request. The returned token identifies the result; any
    /// earlier outstanding request is implicitly superseded.
    pub fn request(&mut self, request: AnalysisRequest) -> Result<RequestToken, AnalyzeError> {
        self.next_token += 1;
        let token = self.next_token;
        self.current = Some(token);
        self.jobs
            .send(Job::Run(token, request))
            .map_err(|_| AnalyzeError::WorkerGone)?;
        Ok(token)
    }

    /// Abandon the outstanding request, if any. The computation keeps
    /// running; its result is discarded on delivery.
    pub fn abandon(&mut self) {
        self.current = None;
    }

    /// Collect the result of the current request, if it has arrived.
    ///
    /// Results from superseded or abandoned requests are silently
    /// dropped. Non-blocking.
    pub fn poll(&mut self) -> Option<Result<MojoFingerprint, AnalyzeError>> {
        while let Ok((token, result)) = self.results.try_recv() {
            if Some(token) == self.current {
                self.current = None;
                return Some(result);
            }
            tracing::debug!(token, "discarding stale analysis result");
        }
        None
    }
}

impl Drop for AnalysisWorker {
    fn drop(&mut self) {
        let _ = self.jobs.send(Job::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
