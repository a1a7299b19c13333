//! Output and input stream tests on the dummy backend

use crate::helpers::{dummy_context, wait_until};
use sio::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Writes `max` frames of silence in as many regions as the backend hands out.
fn write_silence(writer: &mut OutStreamWriter<'_>, max: usize, written: &AtomicUsize) {
    let mut left = max;
    while left > 0 {
        let Ok(mut areas) = writer.begin_write(left) else {
            return;
        };
        let frames = areas.frame_count();
        if frames == 0 {
            break;
        }
        for frame in 0..frames {
            for channel in 0..areas.channel_count() {
                areas.write_sample(channel, frame, 0.0f32);
            }
        }
        drop(areas);
        if writer.end_write().is_err() {
            return;
        }
        left -= frames;
        written.fetch_add(frames, Ordering::SeqCst);
    }
}

#[test]
fn test_output_stream_receives_write_callbacks() {
    let Some(ctx) = dummy_context() else { return };
    let index = ctx.default_output_device_index().unwrap();
    let device = ctx.output_device(index).unwrap();

    let mut stream = device.create_outstream().unwrap();
    stream.set_format(Format::FLOAT32NE);
    stream.set_name("sio write test").unwrap();

    let written = Arc::new(AtomicUsize::new(0));
    let counter = written.clone();
    stream.set_write_callback(move |writer, _min, max| {
        write_silence(writer, max, &counter);
    });
    stream.set_underflow_callback(|_| {});

    stream.open().unwrap();
    assert_eq!(stream.format(), Format::FLOAT32NE);
    assert_eq!(stream.bytes_per_sample(), 4);
    assert_eq!(
        stream.bytes_per_frame(),
        4 * stream.layout().channel_count()
    );
    assert!(stream.layout_error().is_none());

    stream.start().unwrap();
    assert!(wait_until(|| written.load(Ordering::SeqCst) > 0));

    let latency = stream.latency().unwrap();
    assert!(latency >= 0.0);
}

#[test]
fn test_output_stream_pause_and_clear() {
    let Some(ctx) = dummy_context() else { return };
    let device = ctx.output_device(0).unwrap();
    let mut stream = device.create_outstream().unwrap();
    stream.set_format(Format::FLOAT32NE);

    let written = Arc::new(AtomicUsize::new(0));
    let counter = written.clone();
    stream.set_write_callback(move |writer, _min, max| write_silence(writer, max, &counter));
    stream.open().unwrap();
    stream.start().unwrap();
    assert!(wait_until(|| written.load(Ordering::SeqCst) > 0));

    stream.pause(true).unwrap();
    stream.clear_buffer().unwrap();
    stream.pause(false).unwrap();

    match stream.set_volume(0.5) {
        Ok(()) | Err(Error::IncompatibleBackend) => {}
        Err(other) => panic!("unexpected set_volume error: {other}"),
    }
}

#[test]
fn test_replacing_write_callback_while_running() {
    let Some(ctx) = dummy_context() else { return };
    let device = ctx.output_device(0).unwrap();
    let mut stream = device.create_outstream().unwrap();
    stream.set_format(Format::FLOAT32NE);

    let first = Arc::new(AtomicUsize::new(0));
    let counter = first.clone();
    stream.set_write_callback(move |writer, _min, max| write_silence(writer, max, &counter));
    stream.open().unwrap();
    stream.start().unwrap();
    assert!(wait_until(|| first.load(Ordering::SeqCst) > 0));

    let second = Arc::new(AtomicUsize::new(0));
    let counter = second.clone();
    stream.set_write_callback(move |writer, _min, max| write_silence(writer, max, &counter));
    assert!(wait_until(|| second.load(Ordering::SeqCst) > 0));
}

#[test]
fn test_input_stream_receives_read_callbacks() {
    let Some(ctx) = dummy_context() else { return };
    let index = ctx.default_input_device_index().unwrap();
    let device = ctx.input_device(index).unwrap();

    let mut stream = device.create_instream().unwrap();
    stream.set_format(Format::FLOAT32NE);

    let read = Arc::new(AtomicUsize::new(0));
    let counter = read.clone();
    stream.set_read_callback(move |reader, _min, max| {
        let mut left = max;
        while left > 0 {
            let Ok(areas) = reader.begin_read(left) else {
                return;
            };
            let frames = areas.frame_count();
            if frames == 0 {
                break;
            }
            if !areas.is_hole() {
                for channel in 0..areas.channel_count() {
                    let _ = areas.read_sample::<f32>(channel, frames - 1);
                }
            }
            drop(areas);
            if reader.end_read().is_err() {
                return;
            }
            left -= frames;
            counter.fetch_add(frames, Ordering::SeqCst);
        }
    });
    stream.set_overflow_callback(|_| {});

    stream.open().unwrap();
    stream.start().unwrap();
    assert!(wait_until(|| read.load(Ordering::SeqCst) > 0));
}

#[test]
fn test_stream_layout_round_trip() {
    let Some(ctx) = dummy_context() else { return };
    let device = ctx.output_device(0).unwrap();
    let mut stream = device.create_outstream().unwrap();

    let mono = ChannelLayout::default_for(1).unwrap().unwrap();
    stream.set_layout(&mono).unwrap();
    assert_eq!(stream.layout(), mono);
    assert_eq!(stream.layout().name(), mono.name());

    let mut custom = ChannelLayout::new("my pair", &[ChannelId::FrontLeft, ChannelId::FrontRight])
        .unwrap();
    stream.set_layout(&custom).unwrap();
    assert_eq!(stream.layout().name(), Some("my pair"));

    custom.clear_name();
    stream.set_layout(&custom).unwrap();
    assert_eq!(stream.layout().name(), None);
    assert_eq!(stream.layout().channel_count(), 2);
}
