//! Binding-layer integration tests
//!
//! Everything runs against the null device, so no audio hardware is needed.

use std::ptr;

use oal::{
    AlError, BufferFormat, BufferHandle, DeviceKind, HandleKind, InitError, Oal, OalConfig,
    OalError, PcmInfo, PlaybackParams, SetErrorPolicy, SourceHandle, SourceState,
};
use proptest::prelude::*;
use rstest::rstest;

fn null_oal() -> Oal {
    Oal::initialize(&OalConfig::null()).expect("null device should always open")
}

fn strict_oal() -> Oal {
    let config = OalConfig {
        set_error_policy: SetErrorPolicy::Strict,
        ..OalConfig::null()
    };
    Oal::initialize(&config).unwrap()
}

/// Signed 16-bit mono sawtooth, little-endian
fn mono16(frames: usize) -> Vec<u8> {
    (0..frames)
        .flat_map(|i| (((i % 200) as i16 - 100) * 100).to_le_bytes())
        .collect()
}

fn loaded_buffer(oal: &Oal, frames: usize) -> BufferHandle {
    let buffer = oal.create_bufferid().unwrap();
    let data = mono16(frames);
    oal.buffer_bind(&buffer, &PcmInfo::new(BufferFormat::Mono16, &data, 44100))
        .unwrap();
    buffer
}

#[test]
fn test_two_second_clip_plays() {
    let oal = null_oal();
    let buffer = oal.create_bufferid().unwrap();
    let data = mono16(44100 * 2);
    let pcm = PcmInfo::new(BufferFormat::Mono16, &data, 44100);
    assert_eq!(pcm.duration(), Some(std::time::Duration::from_secs(2)));
    oal.buffer_bind(&buffer, &pcm).unwrap();

    let source = oal.create_source().unwrap();
    oal.source_set(&source, &buffer, PlaybackParams::default())
        .unwrap();
    source.play();

    assert_eq!(source.state().unwrap(), SourceState::Playing);
    assert_eq!(oal.context().get_error(), AlError::NoError);
}

#[test]
fn test_set_returns_same_source() {
    let oal = null_oal();
    let buffer = loaded_buffer(&oal, 1000);
    let source = oal.create_source().unwrap();

    let returned = oal
        .source_set(&source, &buffer, PlaybackParams::default())
        .unwrap();
    assert!(ptr::eq(returned, &source));
    assert_eq!(returned, &source);
}

#[test]
fn test_set_while_playing() {
    let oal = strict_oal();
    let first = loaded_buffer(&oal, 44100);
    let second = loaded_buffer(&oal, 22050);
    let source = oal.create_source().unwrap();

    oal.source_set(&source, &first, PlaybackParams::default())
        .unwrap();
    source.play();
    assert_eq!(source.state().unwrap(), SourceState::Playing);

    // Rebinding a playing source must go through the implicit stop
    let params = PlaybackParams {
        looping: true,
        ..PlaybackParams::default()
    };
    assert!(oal.source_set(&source, &second, params).is_ok());
    assert_eq!(source.bound_buffer(), Some(second.id()));
    assert_eq!(source.state().unwrap(), SourceState::Stopped);

    source.play();
    assert_eq!(source.state().unwrap(), SourceState::Playing);
}

#[test]
fn test_clear_without_buffer() {
    let oal = null_oal();
    let source = oal.create_source().unwrap();
    assert_eq!(source.clear(), Ok(()));
    assert_eq!(source.clear(), Ok(()));
    assert_eq!(source.state().unwrap(), SourceState::Stopped);
}

#[test]
fn test_clear_detaches_buffer() {
    let oal = null_oal();
    let buffer = loaded_buffer(&oal, 500);
    let source = oal.create_source().unwrap();
    oal.source_set(&source, &buffer, PlaybackParams::default())
        .unwrap();
    assert_eq!(source.bound_buffer(), Some(buffer.id()));

    source.clear().unwrap();
    assert_eq!(source.bound_buffer(), None);
    assert_eq!(buffer.release(), Ok(()));
}

#[test]
fn test_handle_strings_are_decimal() {
    let oal = null_oal();
    let source = oal.create_source().unwrap();
    let buffer = oal.create_bufferid().unwrap();

    assert_eq!(source.to_string(), source.id().to_string());
    assert_eq!(buffer.to_string().parse::<u32>().unwrap(), buffer.id());
    assert!(source.id() > 0);
    assert!(buffer.id() > 0);
}

#[test]
fn test_released_ids_are_not_reused() {
    let oal = null_oal();
    let first = oal.create_source().unwrap();
    let first_id = first.id();
    first.release().unwrap();
    assert!(!oal.context().is_source(first_id));

    let second = oal.create_source().unwrap();
    assert_ne!(second.id(), first_id);

    let buffer = oal.create_bufferid().unwrap();
    let buffer_id = buffer.id();
    drop(buffer);
    assert!(!oal.context().is_buffer(buffer_id));
    assert_ne!(oal.create_bufferid().unwrap().id(), buffer_id);
}

#[test]
fn test_drop_finalizes_source() {
    let oal = null_oal();
    let source = oal.create_source().unwrap();
    let id = source.id();
    assert_eq!(oal.context().live_sources(), 1);

    drop(source);
    assert_eq!(oal.context().live_sources(), 0);
    assert!(!oal.context().is_source(id));
    assert_eq!(oal.context().get_error(), AlError::NoError);
}

#[test]
fn test_bound_buffer_outlives_caller_handle() {
    let oal = null_oal();
    let buffer = loaded_buffer(&oal, 1000);
    let buffer_id = buffer.id();
    let source = oal.create_source().unwrap();
    oal.source_set(&source, &buffer, PlaybackParams::default())
        .unwrap();

    assert_eq!(
        buffer.release(),
        Err(OalError::BufferInUse { id: buffer_id })
    );
    // The source still holds it
    assert!(oal.context().is_buffer(buffer_id));
    source.play();
    assert_eq!(source.state().unwrap(), SourceState::Playing);

    drop(source);
    assert!(!oal.context().is_buffer(buffer_id));
    assert_eq!(oal.context().live_buffers(), 0);
}

#[cfg(not(feature = "playback"))]
#[test]
fn test_default_device_unavailable() {
    let err = Oal::initialize(&OalConfig::default()).err().unwrap();
    assert!(matches!(err, OalError::Init(InitError::NoDevice(_))));
    assert_eq!(err.status(), -1);
}

#[test]
fn test_source_limit() {
    let config = OalConfig {
        max_sources: 1,
        ..OalConfig::null()
    };
    let oal = Oal::initialize(&config).unwrap();
    let _only = oal.create_source().unwrap();

    assert_eq!(
        oal.create_source().err(),
        Some(OalError::Create {
            kind: HandleKind::Source,
            code: AlError::OutOfMemory,
        })
    );
    // The failed create leaves no sticky error behind for the next call
    assert!(oal.create_bufferid().is_ok());
}

#[test]
fn test_bind_attached_buffer() {
    let oal = null_oal();
    let buffer = loaded_buffer(&oal, 100);
    let source = oal.create_source().unwrap();
    oal.source_set(&source, &buffer, PlaybackParams::default())
        .unwrap();

    let data = mono16(100);
    assert_eq!(
        oal.buffer_bind(&buffer, &PcmInfo::new(BufferFormat::Mono16, &data, 22050)),
        Err(OalError::Bind {
            code: AlError::InvalidOperation
        })
    );
}

#[test]
fn test_bad_params_lenient() {
    let oal = null_oal();
    let buffer = loaded_buffer(&oal, 100);
    let source = oal.create_source().unwrap();

    let params = PlaybackParams {
        pitch: 0.0,
        ..PlaybackParams::default()
    };
    assert!(oal.source_set(&source, &buffer, params).is_ok());
    // Everything after the bad pitch was still applied
    assert_eq!(source.bound_buffer(), Some(buffer.id()));
}

#[test]
fn test_bad_params_strict() {
    let oal = strict_oal();
    let buffer = loaded_buffer(&oal, 100);
    let source = oal.create_source().unwrap();

    let params = PlaybackParams {
        gain: -1.0,
        ..PlaybackParams::default()
    };
    assert_eq!(
        oal.source_set(&source, &buffer, params),
        Err(OalError::Set {
            id: source.id(),
            code: AlError::InvalidValue,
        })
    );
}

#[test]
fn test_set_on_paused_source_strict() {
    let oal = strict_oal();
    let buffer = loaded_buffer(&oal, 44100);
    let source = oal.create_source().unwrap();
    oal.source_set(&source, &buffer, PlaybackParams::default())
        .unwrap();
    source.play();
    source.pause();

    let err = oal
        .source_set(&source, &buffer, PlaybackParams::default())
        .unwrap_err();
    assert_eq!(
        err,
        OalError::Set {
            id: source.id(),
            code: AlError::InvalidOperation,
        }
    );
}

#[test]
fn test_context_lost_after_shutdown() {
    let oal = strict_oal();
    let buffer = loaded_buffer(&oal, 100);
    let source = oal.create_source().unwrap();
    let context = oal.context().clone();
    oal.shutdown();

    assert!(!context.is_current());
    let other = null_oal();
    assert_eq!(
        other.source_set(&source, &buffer, PlaybackParams::default()),
        Err(OalError::ContextLost)
    );
    assert!(source.clear().is_err());
    assert!(source.state().is_err());
    // Transport calls stay silent
    source.play();
    source.stop();
}

#[test]
fn test_non_looping_source_stops_at_end() {
    let oal = null_oal();
    let buffer = loaded_buffer(&oal, 441);
    let source = oal.create_source().unwrap();
    oal.source_set(&source, &buffer, PlaybackParams::default())
        .unwrap();
    source.play();

    let mut out = vec![0.0f32; 256 * 2];
    oal.context().mix_channels(&mut out);
    assert!(out.iter().any(|&s| s != 0.0));
    assert_eq!(source.state().unwrap(), SourceState::Playing);

    oal.context().mix_fake(1024);
    assert_eq!(source.state().unwrap(), SourceState::Stopped);
}

#[test]
fn test_looping_source_keeps_playing() {
    let oal = null_oal();
    let buffer = loaded_buffer(&oal, 441);
    let source = oal.create_source().unwrap();
    let params = PlaybackParams {
        looping: true,
        ..PlaybackParams::default()
    };
    oal.source_set(&source, &buffer, params).unwrap();
    source.play();

    oal.context().mix_fake(44100);
    assert_eq!(source.state().unwrap(), SourceState::Playing);
    source.rewind();
    assert_eq!(source.state().unwrap(), SourceState::Initial);
}

#[test]
fn test_pan_hard_left() {
    let oal = null_oal();
    let buffer = loaded_buffer(&oal, 4410);
    let source = oal.create_source().unwrap();
    let params = PlaybackParams {
        pan: -1.0,
        ..PlaybackParams::default()
    };
    oal.source_set(&source, &buffer, params).unwrap();
    source.play();

    let mut out = vec![0.0f32; 128 * 2];
    oal.context().mix_channels(&mut out);
    let right_peak = out.iter().skip(1).step_by(2).fold(0.0f32, |m, s| m.max(s.abs()));
    let left_peak = out.iter().step_by(2).fold(0.0f32, |m, s| m.max(s.abs()));
    assert_eq!(right_peak, 0.0);
    assert!(left_peak > 0.0);
}

#[rstest]
#[case(BufferFormat::Mono8, 1, 8)]
#[case(BufferFormat::Mono16, 1, 16)]
#[case(BufferFormat::Stereo8, 2, 8)]
#[case(BufferFormat::Stereo16, 2, 16)]
fn test_buffer_formats(#[case] format: BufferFormat, #[case] channels: u32, #[case] bits: u32) {
    let oal = null_oal();
    let buffer = oal.create_bufferid().unwrap();
    let data = vec![0x80u8; format.frame_size() * 100];
    oal.buffer_bind(&buffer, &PcmInfo::new(format, &data, 22050))
        .unwrap();

    assert_eq!(buffer.channels().unwrap(), channels);
    assert_eq!(buffer.bits().unwrap(), bits);
    assert_eq!(buffer.frequency().unwrap(), 22050);
    assert_eq!(buffer.size().unwrap(), data.len());
}

#[rstest]
#[case(0x1101, 44100, 3, AlError::InvalidValue)]
#[case(0x1101, 0, 4, AlError::InvalidValue)]
#[case(0x9999, 44100, 4, AlError::InvalidEnum)]
fn test_bind_rejects(
    #[case] format: u32,
    #[case] frequency: u32,
    #[case] size: usize,
    #[case] code: AlError,
) {
    let oal = null_oal();
    let buffer = oal.create_bufferid().unwrap();
    let data = [0u8; 4];
    let pcm = PcmInfo {
        format,
        data: &data,
        size,
        frequency,
    };
    assert_eq!(oal.buffer_bind(&buffer, &pcm), Err(OalError::Bind { code }));
}

#[test]
fn test_null_config_device() {
    let oal = null_oal();
    assert_eq!(oal.config().device, DeviceKind::Null);
    assert_eq!(oal.device_specifier(), "null");
}

proptest! {
    #[test]
    fn prop_ids_fresh_and_decimal(ops in proptest::collection::vec(any::<bool>(), 1..40)) {
        let oal = null_oal();
        let mut seen = std::collections::HashSet::new();
        let mut live: Vec<SourceHandle> = Vec::new();

        for release in ops {
            let source = oal.create_source().unwrap();
            let text = source.to_string();
            prop_assert!(text.chars().all(|c| c.is_ascii_digit()));
            prop_assert_eq!(text.parse::<u32>().unwrap(), source.id());
            prop_assert!(seen.insert(source.id()));

            if release {
                source.release().unwrap();
            } else {
                live.push(source);
            }
        }
        prop_assert_eq!(oal.context().live_sources(), live.len());
    }
}
