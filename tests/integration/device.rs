//! Device capability and reference counting tests

use crate::helpers::dummy_context;
use sio::prelude::*;

#[test]
fn test_clone_and_drop_adjust_ref_count() {
    let Some(ctx) = dummy_context() else { return };
    let device = ctx.output_device(0).unwrap();
    let base = device.ref_count();

    let clones: Vec<_> = (0..3).map(|_| device.clone()).collect();
    assert_eq!(device.ref_count(), base + 3);
    drop(clones);
    assert_eq!(device.ref_count(), base);
}

#[test]
fn test_same_index_devices_are_equal() {
    let Some(ctx) = dummy_context() else { return };
    let a = ctx.output_device(0).unwrap();
    let b = ctx.output_device(0).unwrap();
    assert!(a == b);
    assert_eq!(a.id(), b.id());

    let input = ctx.input_device(0).unwrap();
    assert!(input != a);
}

#[test]
fn test_current_layout_is_supported() {
    let Some(ctx) = dummy_context() else { return };
    let device = ctx.output_device(0).unwrap();
    let current = device.current_layout();
    assert!(current.channel_count() > 0);
    assert!(device.supports_layout(&current));
    assert!(device.layouts().contains(&current));
}

#[test]
fn test_best_matching_layout_from_device() {
    let Some(ctx) = dummy_context() else { return };
    let device = ctx.output_device(0).unwrap();

    let preferred = vec![
        ChannelLayout::new("nothing", &[ChannelId::Aux15, ChannelId::Aux14]).unwrap(),
        device.current_layout(),
    ];
    let best = ChannelLayout::best_matching(&preferred, &device.layouts()).unwrap();
    assert_eq!(best, device.current_layout());
}

#[test]
fn test_nearest_sample_rate_is_supported() {
    let Some(ctx) = dummy_context() else { return };
    let device = ctx.output_device(0).unwrap();
    for wanted in [8000, 44100, 48000, 96000, 384000] {
        let nearest = device.nearest_sample_rate(wanted);
        assert!(device.supports_sample_rate(nearest), "{nearest} for {wanted}");
    }
}
