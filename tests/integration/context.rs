//! Context lifecycle and enumeration tests

use crate::helpers::dummy_context;
use sio::prelude::*;
use std::cell::Cell;
use std::rc::Rc;

#[test]
fn test_connects_to_dummy() {
    let Some(ctx) = dummy_context() else { return };
    assert_eq!(ctx.current_backend(), Backend::Dummy);
    assert_eq!(ctx.app_name().as_deref(), Some("sio-tests"));
}

#[test]
fn test_enumerates_both_directions() {
    let Some(ctx) = dummy_context() else { return };

    let outputs: Vec<_> = ctx.output_devices().collect::<Result<_>>().unwrap();
    let inputs: Vec<_> = ctx.input_devices().collect::<Result<_>>().unwrap();
    assert_eq!(outputs.len(), ctx.output_device_count());
    assert_eq!(inputs.len(), ctx.input_device_count());
    assert!(outputs.iter().all(|d| d.aim() == DeviceAim::Output));
    assert!(inputs.iter().all(|d| d.aim() == DeviceAim::Input));

    let default_out = ctx.default_output_device_index().unwrap();
    assert!(default_out < outputs.len());
}

#[test]
fn test_out_of_range_device_index() {
    let Some(ctx) = dummy_context() else { return };
    let count = ctx.input_device_count();
    assert!(matches!(ctx.input_device(count), Err(Error::NoSuchDevice)));
    assert!(matches!(ctx.output_device(usize::MAX), Err(Error::NoSuchDevice)));
}

#[test]
fn test_devices_change_fires_on_first_flush() {
    if sio::sys::load().is_err() {
        eprintln!("libsoundio not available, skipping");
        return;
    }
    let mut ctx = Context::new().unwrap();
    let changes = Rc::new(Cell::new(0));
    let counter = changes.clone();
    ctx.set_on_devices_change(move |_: &Context| counter.set(counter.get() + 1));
    ctx.connect_backend(Backend::Dummy).unwrap();

    ctx.flush_events();
    assert_eq!(changes.get(), 1);

    let callback = ctx.take_on_devices_change();
    assert!(callback.is_some());
}

#[test]
fn test_devices_change_handler_enumerates_through_context() {
    if sio::sys::load().is_err() {
        eprintln!("libsoundio not available, skipping");
        return;
    }
    let mut ctx = Context::new().unwrap();
    let seen = Rc::new(Cell::new(None::<(usize, bool)>));
    let record = seen.clone();
    ctx.set_on_devices_change(move |ctx: &Context| {
        let device = ctx
            .default_output_device_index()
            .and_then(|index| ctx.output_device(index).ok());
        let opened = device
            .as_ref()
            .is_some_and(|device| device.create_outstream().is_ok());
        record.set(Some((ctx.output_device_count(), opened)));
    });
    ctx.connect_backend(Backend::Dummy).unwrap();

    ctx.flush_events();
    let (count, opened) = seen.get().unwrap();
    assert_eq!(count, ctx.output_device_count());
    assert!(count > 0);
    assert!(opened);
}

#[test]
fn test_reconnect_after_disconnect() {
    let Some(mut ctx) = dummy_context() else { return };
    ctx.disconnect();
    assert_eq!(ctx.current_backend(), Backend::None);

    ctx.connect_backend(Backend::Dummy).unwrap();
    ctx.flush_events();
    assert!(ctx.output_device_count() > 0);
}

#[test]
fn test_context_moves_keep_callbacks() {
    if sio::sys::load().is_err() {
        eprintln!("libsoundio not available, skipping");
        return;
    }
    let changes = Rc::new(Cell::new(0));
    let counter = changes.clone();

    let mut ctx = Context::new().unwrap();
    ctx.set_on_devices_change(move |_: &Context| counter.set(counter.get() + 1));
    let mut moved = Box::new(ctx);
    moved.connect_backend(Backend::Dummy).unwrap();
    moved.flush_events();
    assert_eq!(changes.get(), 1);
}
