//! Lists audio devices and their capabilities.

use std::process::ExitCode;

use clap::Parser;
use sio::{Backend, Context, Device};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sio-list-devices", about = "List audio devices and their capabilities")]
struct Cli {
    /// Connect to this backend only (jack, pulseaudio, alsa, coreaudio, wasapi, dummy).
    #[arg(long, value_parser = parse_backend)]
    backend: Option<Backend>,

    /// Keep running and print the list again whenever devices change.
    #[arg(long)]
    watch: bool,

    /// One line per device.
    #[arg(long)]
    short: bool,
}

fn parse_backend(name: &str) -> Result<Backend, String> {
    Backend::from_name(name).ok_or_else(|| format!("unknown backend: {name}"))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("sio-list-devices: {err}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: &Cli) -> sio::Result<()> {
    let mut ctx = Context::new()?;
    match cli.backend {
        Some(backend) => ctx.connect_backend(backend)?,
        None => ctx.connect()?,
    }
    tracing::info!("backend: {}", ctx.current_backend());

    if !cli.watch {
        ctx.flush_events();
        list_devices(&ctx, cli.short);
        return Ok(());
    }

    let short = cli.short;
    ctx.set_on_devices_change(move |ctx: &Context| list_devices(ctx, short));
    ctx.set_on_backend_disconnect(|_: &Context, err: sio::Error| {
        eprintln!("backend disconnected: {err}");
        std::process::exit(1);
    });
    loop {
        ctx.wait_events();
    }
}

fn list_devices(ctx: &Context, short: bool) {
    let default_input = ctx.default_input_device_index();
    let default_output = ctx.default_output_device_index();

    println!("--------Input Devices--------\n");
    for index in 0..ctx.input_device_count() {
        print_entry(ctx.input_device(index), default_input == Some(index), short);
    }
    println!("\n--------Output Devices--------\n");
    for index in 0..ctx.output_device_count() {
        print_entry(ctx.output_device(index), default_output == Some(index), short);
    }
    println!(
        "\n{} devices found",
        ctx.input_device_count() + ctx.output_device_count()
    );
}

fn print_entry(device: sio::Result<Device<'_>>, is_default: bool, short: bool) {
    match device {
        Ok(device) => print_device(&device, is_default, short),
        Err(err) => println!("  (unavailable: {err})\n"),
    }
}

fn print_device(device: &Device<'_>, is_default: bool, short: bool) {
    let default_str = if is_default { " (default)" } else { "" };
    let raw_str = if device.is_raw() { " (raw)" } else { "" };

    if short {
        println!("{}{}{}", device.name(), default_str, raw_str);
        return;
    }

    println!("{}{}{}", device.name(), default_str, raw_str);
    println!("  id: {}", device.id());

    println!("  channel layouts:");
    for layout in device.layouts() {
        println!("    {layout}");
    }
    if device.current_layout().channel_count() > 0 {
        println!("  current layout: {}", device.current_layout());
    }

    println!("  sample rates:");
    for range in device.sample_rates() {
        println!("    {} - {}", range.min, range.max);
    }
    if device.sample_rate_current() > 0 {
        println!("  current sample rate: {}", device.sample_rate_current());
    }

    let formats: Vec<_> = device.formats().iter().map(|f| f.name()).collect();
    println!("  formats: {}", formats.join(", "));
    if device.current_format() != sio::Format::Invalid {
        println!("  current format: {}", device.current_format());
    }

    println!(
        "  min software latency: {:.8} sec",
        device.software_latency_min()
    );
    println!(
        "  max software latency: {:.8} sec",
        device.software_latency_max()
    );
    if device.software_latency_current() != 0.0 {
        println!(
            "  current software latency: {:.8} sec",
            device.software_latency_current()
        );
    }
    println!();
}
