// SPDX-License-Identifier: LGPL-3.0-or-later

//! WAV container decode and encode.
//!
//! Integer PCM is normalized to `[-1, 1)` by its bit depth; float PCM is
//! taken as-is. Filtered variants are written as 32-bit float WAV so no
//! quantization or clipping is applied to the engine's output.

use std::io::{Cursor, Read};

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::debug;
use wavfilt_dsp_units::signal::SignalBuffer;

use crate::error::{ServiceError, ServiceResult};

/// Decode a complete WAV file held in memory.
pub fn decode(bytes: &[u8]) -> ServiceResult<SignalBuffer> {
    read(Cursor::new(bytes))
}

/// Decode a WAV stream into a [`SignalBuffer`].
pub fn read<R: Read>(reader: R) -> ServiceResult<SignalBuffer> {
    let reader = WavReader::new(reader)?;
    let spec = reader.spec();
    let data: Vec<f64> = match spec.sample_format {
        SampleFormat::Int => {
            let scale = int_scale(spec.bits_per_sample);
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| f64::from(v) / scale))
                .collect::<Result<_, _>>()?
        }
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .map(|s| s.map(f64::from))
            .collect::<Result<_, _>>()?,
    };
    debug!(
        "wav: decoded {} samples, {} ch @ {} Hz, {:?} {} bit",
        data.len(),
        spec.channels,
        spec.sample_rate,
        spec.sample_format,
        spec.bits_per_sample
    );
    Ok(SignalBuffer::from_interleaved(
        spec.sample_rate,
        usize::from(spec.channels),
        &data,
    )?)
}

/// Encode a signal as an interleaved 32-bit float WAV file.
pub fn encode(signal: &SignalBuffer) -> ServiceResult<Vec<u8>> {
    write_float(signal).map_err(ServiceError::Encode)
}

fn write_float(signal: &SignalBuffer) -> hound::Result<Vec<u8>> {
    let spec = WavSpec {
        channels: u16::try_from(signal.channel_count()).map_err(|_| hound::Error::Unsupported)?,
        sample_rate: signal.sample_rate(),
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec)?;
        for x in signal.to_interleaved() {
            writer.write_sample(x as f32)?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

/// Full-scale value of a signed integer sample of `bits` bits.
fn int_scale(bits: u16) -> f64 {
    f64::from(1u32 << (bits.clamp(1, 32) - 1))
}
