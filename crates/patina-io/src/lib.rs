//! Audio file I/O for patina.
//!
//! WAV reading and writing on top of `hound`, in the shapes the rest of
//! the workspace consumes: mono mixdowns for the offline analyzer and
//! split stereo buffers for the processing harness. Decode failures are a
//! distinct typed error so callers can abort an analysis atomically.

mod wav;

pub use wav::{
    StereoSamples, WavInfo, WavSpec, read_wav, read_wav_info, read_wav_stereo, write_wav,
    write_wav_stereo,
};

/// Error types for audio I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for audio I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
