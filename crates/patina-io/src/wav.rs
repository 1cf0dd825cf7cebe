//! WAV file reading and writing.

use crate::Result;
use hound::{SampleFormat, WavReader, WavWriter};
use std::path::Path;

/// WAV file specification.
#[derive(Debug, Clone, Copy)]
pub struct WavSpec {
    /// Number of audio channels (1 = mono, 2 = stereo).
    pub channels: u16,
    /// Sample rate in Hz (e.g., 44100, 48000).
    pub sample_rate: u32,
    /// Bit depth per sample (e.g., 16, 24, 32).
    pub bits_per_sample: u16,
}

impl Default for WavSpec {
    fn default() -> Self {
        Self {
            channels: 1,
            sample_rate: 48000,
            bits_per_sample: 32,
        }
    }
}

impl From<hound::WavSpec> for WavSpec {
    fn from(spec: hound::WavSpec) -> Self {
        Self {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
        }
    }
}

impl From<WavSpec> for hound::WavSpec {
    fn from(spec: WavSpec) -> Self {
        hound::WavSpec {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
            sample_format: if spec.bits_per_sample == 32 {
                SampleFormat::Float
            } else {
                SampleFormat::Int
            },
        }
    }
}

/// WAV file metadata extracted without loading sample data.
#[derive(Debug, Clone)]
pub struct WavInfo {
    /// Number of audio channels.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Total number of sample frames (samples per channel).
    pub num_frames: u64,
    /// Duration in seconds.
    pub duration_secs: f64,
}

/// Read WAV metadata without loading sample data.
pub fn read_wav_info<P: AsRef<Path>>(path: P) -> Result<WavInfo> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    let total_samples = u64::from(reader.len());
    let num_frames = total_samples / u64::from(spec.channels);
    Ok(WavInfo {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        num_frames,
        duration_secs: num_frames as f64 / f64::from(spec.sample_rate),
    })
}

/// Decode all samples of a reader to interleaved f32.
fn decode_samples<R: std::io::Read>(reader: WavReader<R>) -> Result<Vec<f32>> {
    let spec = reader.spec();
    let samples = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };
    Ok(samples)
}

/// Read a WAV file and return samples as f32 along with the spec.
///
/// Multi-channel files are mixed down to mono by averaging channels.
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<(Vec<f32>, WavSpec)> {
    let path = path.as_ref();
    let reader = WavReader::open(path)?;
    let spec = WavSpec::from(reader.spec());
    let channels = spec.channels as usize;
    let samples = decode_samples(reader)?;

    let mono = if channels > 1 {
        samples
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    } else {
        samples
    };

    tracing::debug!(
        path = %path.display(),
        frames = mono.len(),
        sample_rate = spec.sample_rate,
        "decoded wav to mono"
    );
    Ok((mono, spec))
}

/// Split stereo sample buffers.
#[derive(Debug, Clone, Default)]
pub struct StereoSamples {
    /// Left channel samples.
    pub left: Vec<f32>,
    /// Right channel samples.
    pub right: Vec<f32>,
}

impl StereoSamples {
    /// Number of frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.left.len().min(self.right.len())
    }

    /// True when no frames are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Read a WAV file as split stereo.
///
/// Mono files are duplicated to both channels; files with more than two
/// channels keep the first two.
pub fn read_wav_stereo<P: AsRef<Path>>(path: P) -> Result<(StereoSamples, WavSpec)> {
    let path = path.as_ref();
    let reader = WavReader::open(path)?;
    let spec = WavSpec::from(reader.spec());
    let channels = spec.channels as usize;
    let samples = decode_samples(reader)?;

    let stereo = match channels {
        1 => StereoSamples {
            left: samples.clone(),
            right: samples,
        },
        _ => {
            let frames = samples.len() / channels;
            let mut left = Vec::with_capacity(frames);
            let mut right = Vec::with_capacity(frames);
            for frame in samples.chunks(channels) {
                left.push(frame[0]);
                right.push(frame[1.min(frame.len() - 1)]);
            }
            StereoSamples { left, right }
        }
    };

    tracing::debug!(
        path = %path.display(),
        frames = stereo.len(),
        channels,
        "decoded wav to stereo"
    );
    Ok((stereo, spec))
}

/// Write mono samples to a WAV file.
pub fn write_wav<P: AsRef<Path>>(path: P, samples: &[f32], spec: WavSpec) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        ..spec
    };
    let mut writer = WavWriter::create(path, hound::WavSpec::from(spec))?;
    write_interleaved(&mut writer, samples, spec.bits_per_sample)?;
    writer.finalize()?;
    Ok(())
}

/// Write split stereo samples to a WAV file.
pub fn write_wav_stereo<P: AsRef<Path>>(
    path: P,
    stereo: &StereoSamples,
    spec: WavSpec,
) -> Result<()> {
    let spec = WavSpec {
        channels: 2,
        ..spec
    };
    let mut writer = WavWriter::create(path, hound::WavSpec::from(spec))?;
    let frames = stereo.len();
    let mut interleaved = Vec::with_capacity(frames * 2);
    for i in 0..frames {
        interleaved.push(stereo.left[i]);
        interleaved.push(stereo.right[i]);
    }
    write_interleaved(&mut writer, &interleaved, spec.bits_per_sample)?;
    writer.finalize()?;
    Ok(())
}

fn write_interleaved<W: std::io::Write + std::io::Seek>(
    writer: &mut WavWriter<W>,
    samples: &[f32],
    bits_per_sample: u16,
) -> Result<()> {
    if bits_per_sample == 32 {
        for &sample in samples {
            writer.write_sample(sample)?;
        }
    } else {
        let max_val = (1i64 << (bits_per_sample - 1)) as f32;
        for &sample in samples {
            let quantized = (sample * max_val).clamp(-max_val, max_val - 1.0) as i32;
            writer.write_sample(quantized)?;
        }
    }
    Ok(())
}
