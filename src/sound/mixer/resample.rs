// resample.rs - Resampling algorithms

//! Fractional-position sample readers used by the mixer.
//!
//! Each reader returns one channel of one output sample, in i16 units, for a
//! cursor measured in frames. Neighbouring frames past the end wrap around
//! for looping sources and clamp to the last frame otherwise.

use crate::sound::mixer::buffer::MixerBuffer;
use crate::sound::mixer::types::MixerQuality;

/// Read channel `ch` of frame `index`, wrapping or clamping at the edges
pub fn get_frame_sample(buffer: &MixerBuffer, index: isize, ch: usize, looping: bool) -> f32 {
    let frames = buffer.frames() as isize;
    if frames == 0 {
        return 0.0;
    }
    let index = if looping {
        index.rem_euclid(frames)
    } else {
        index.clamp(0, frames - 1)
    };
    let channels = buffer.channels() as usize;
    buffer.samples[index as usize * channels + ch] as f32
}

pub fn resample_nearest(buffer: &MixerBuffer, cursor: f64, ch: usize, looping: bool) -> f32 {
    get_frame_sample(buffer, cursor as isize, ch, looping)
}

pub fn resample_linear(buffer: &MixerBuffer, cursor: f64, ch: usize, looping: bool) -> f32 {
    let base = cursor.floor();
    let t = (cursor - base) as f32;
    let i = base as isize;

    let s0 = get_frame_sample(buffer, i, ch, looping);
    let s1 = get_frame_sample(buffer, i + 1, ch, looping);

    s0 + t * (s1 - s0)
}

pub fn resample_cubic(buffer: &MixerBuffer, cursor: f64, ch: usize, looping: bool) -> f32 {
    let base = cursor.floor();
    let t = (cursor - base) as f32;
    let i = base as isize;

    let s0 = get_frame_sample(buffer, i - 1, ch, looping);
    let s1 = get_frame_sample(buffer, i, ch, looping);
    let s2 = get_frame_sample(buffer, i + 1, ch, looping);
    let s3 = get_frame_sample(buffer, i + 2, ch, looping);

    let t2 = t * t;
    let a = (3.0 * (s1 - s2) - s0 + s3) * 0.5;
    let b = 2.0 * s2 + s0 - ((5.0 * s1 + s3) * 0.5);
    let c = (s2 - s0) * 0.5;

    a * t2 * t + b * t2 + c * t + s1
}

/// Dispatch on mixer quality
pub fn resample(
    quality: MixerQuality,
    buffer: &MixerBuffer,
    cursor: f64,
    ch: usize,
    looping: bool,
) -> f32 {
    match quality {
        MixerQuality::Low => resample_nearest(buffer, cursor, ch, looping),
        MixerQuality::Medium => resample_linear(buffer, cursor, ch, looping),
        MixerQuality::High => resample_cubic(buffer, cursor, ch, looping),
    }
}
