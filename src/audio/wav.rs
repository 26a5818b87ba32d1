use super::types::{AudioBuffer, AudioError};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::fs;
use std::path::Path;

/// Reads and parses a WAV file, converting samples to normalized f32 values.
///
/// Supported input formats:
/// - 32-bit float
/// - 16-bit integer
/// - 24-bit integer
/// - 32-bit integer
///
/// All integer formats are normalized to the [-1, 1] range.
///
/// # Errors
/// * If the file cannot be read
/// * If the WAV format is unsupported
pub fn read_wav_file(path: &Path) -> Result<AudioBuffer, AudioError> {
    let reader = WavReader::open(path).map_err(|e| AudioError::Load(e.to_string()))?;
    let spec = reader.spec();

    let samples: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => reader
            .into_samples::<f32>()
            .map(|s| s.map_err(|e| AudioError::Load(e.to_string())))
            .collect::<Result<Vec<f32>, AudioError>>()?,
        (SampleFormat::Int, 16) => reader
            .into_samples::<i16>()
            .map(|s| s.map_err(|e| AudioError::Load(e.to_string())))
            .map(|s| Ok(s? as f32 / 32768.0))
            .collect::<Result<Vec<f32>, AudioError>>()?,
        (SampleFormat::Int, 24) => reader
            .into_samples::<i32>()
            .map(|s| s.map_err(|e| AudioError::Load(e.to_string())))
            .map(|s| Ok(s? as f32 / 8388608.0))
            .collect::<Result<Vec<f32>, AudioError>>()?,
        (SampleFormat::Int, 32) => reader
            .into_samples::<i32>()
            .map(|s| s.map_err(|e| AudioError::Load(e.to_string())))
            .map(|s| Ok(s? as f32 / 2147483648.0))
            .collect::<Result<Vec<f32>, AudioError>>()?,
        _ => {
            return Err(AudioError::Load(format!(
                "unsupported WAV sample format: {:?} {}-bit",
                spec.sample_format, spec.bits_per_sample
            )))
        }
    };

    Ok(AudioBuffer::new(samples, spec.sample_rate, spec.channels))
}

/// Loads an audio file through the container contract.
///
/// The engine decodes WAV itself; every other container (FLAC, AIFF, OGG,
/// MP3, ...) is the host shell's codec responsibility and is reported as
/// `UnsupportedFormat` here.
pub fn load(path: &Path) -> Result<AudioBuffer, AudioError> {
    match extension(path).as_deref() {
        Some("wav") => read_wav_file(path),
        Some(ext @ ("flac" | "aiff" | "ogg" | "mp3")) => Err(AudioError::UnsupportedFormat(
            format!("decoding .{ext} is delegated to the host I/O shell"),
        )),
        _ => Err(AudioError::UnsupportedFormat(format!(
            "unrecognized audio container: {}",
            path.display()
        ))),
    }
}

/// Saves a buffer through the container contract (WAV only).
pub fn save(path: &Path, buffer: &AudioBuffer) -> Result<(), AudioError> {
    match extension(path).as_deref() {
        Some("wav") => write_wav_file(path, buffer),
        Some(ext) => Err(AudioError::UnsupportedFormat(format!(
            "saving .{ext} is not supported, use .wav"
        ))),
        None => Err(AudioError::UnsupportedFormat(format!(
            "missing file extension: {}",
            path.display()
        ))),
    }
}

/// Writes a buffer as a 32-bit float WAV file.
///
/// The write is staged: samples go to a temporary sibling file which is
/// renamed over the destination only after a successful flush, so a failed
/// export never leaves a truncated file behind.
pub fn write_wav_file(path: &Path, buffer: &AudioBuffer) -> Result<(), AudioError> {
    let spec = WavSpec {
        channels: buffer.channels,
        sample_rate: buffer.sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    let tmp = staging_path(path);
    let result = (|| -> Result<(), AudioError> {
        let mut writer =
            WavWriter::create(&tmp, spec).map_err(|e| AudioError::Processing(e.to_string()))?;
        for &sample in &buffer.samples {
            writer
                .write_sample(sample.clamp(-1.0, 1.0))
                .map_err(|e| AudioError::Processing(e.to_string()))?;
        }
        writer
            .finalize()
            .map_err(|e| AudioError::Processing(e.to_string()))?;
        Ok(())
    })();

    match result {
        Ok(()) => {
            fs::rename(&tmp, path)?;
            Ok(())
        }
        Err(e) => {
            let _ = fs::remove_file(&tmp);
            Err(e)
        }
    }
}

fn staging_path(path: &Path) -> std::path::PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "export".to_string());
    name.push_str(".tmp");
    path.with_file_name(name)
}

fn extension(path: &Path) -> Option<String> {
    path.extension().map(|e| e.to_string_lossy().to_lowercase())
}
