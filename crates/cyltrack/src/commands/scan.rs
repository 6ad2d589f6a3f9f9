//! Scan handlers: one-shot lookup and scanner listening.

use std::sync::Arc;

use tokio::sync::mpsc;

use cyltrack_core::scanner::{DecodeCallback, ErrorCallback};
use cyltrack_core::{QrLink, ScanDevice, ScanSession, ScannerError};

use super::Context;
use super::util::{self, CylinderView};
use crate::cli::ScanArgs;
use crate::error::CliError;
use crate::output;

enum ScanEvent {
    Decoded(String),
    Failed(ScannerError),
}

pub async fn handle(ctx: &Context, args: ScanArgs) -> Result<(), CliError> {
    let qr_link = ctx.config.qr_link()?;
    if args.listen {
        return listen(ctx, args.device.as_deref(), &qr_link).await;
    }

    let raw = args.id.unwrap_or_default();
    let cylinder = ctx.inventory.scan(&raw)?;
    print_cylinder(ctx, &cylinder, &qr_link);
    Ok(())
}

fn print_cylinder(ctx: &Context, cylinder: &cyltrack_core::Cylinder, qr_link: &QrLink) {
    let color = output::should_color(&ctx.global.color());
    let view = CylinderView::new(&ctx.inventory.snapshot(), cylinder, qr_link);
    let out = output::render_single(
        &ctx.global.output(),
        &view,
        |v| util::cylinder_detail(v, color),
        |v| v.cylinder.id.clone(),
    );
    output::print_output(&out, ctx.global.quiet);
}

/// Resolve every payload a line scanner emits until it closes or Ctrl-C.
/// Misses and malformed payloads are reported and listening continues.
async fn listen(ctx: &Context, device: Option<&str>, qr_link: &QrLink) -> Result<(), CliError> {
    let source = Arc::new(ctx.config.line_scanner(device, Some(ScanDevice::Stdin)));

    let (tx, mut rx) = mpsc::unbounded_channel();
    let decode_tx = tx.clone();
    let on_decode: DecodeCallback = Arc::new(move |payload| {
        let _ = decode_tx.send(ScanEvent::Decoded(payload));
    });
    let on_error: ErrorCallback = Arc::new(move |err| {
        let _ = tx.send(ScanEvent::Failed(err));
    });

    let mut session = ScanSession::start(source, on_decode, on_error)?;
    output::print_status(
        &format!("Listening for scans on the {} device (Ctrl-C to stop)", session.target()),
        ctx.global.quiet,
    );

    let mut resolved = 0usize;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = rx.recv() => match event {
                Some(ScanEvent::Decoded(payload)) => match ctx.inventory.scan(&payload) {
                    Ok(cylinder) => {
                        resolved += 1;
                        print_cylinder(ctx, &cylinder, qr_link);
                    }
                    Err(e) => {
                        let err = CliError::from(e);
                        eprintln!("{:?}", miette::Report::new(err));
                    }
                },
                Some(ScanEvent::Failed(e)) => {
                    session.stop();
                    return Err(e.into());
                }
                None => break,
            },
        }
    }

    session.stop();
    tracing::info!(resolved, "scanner listening ended");
    Ok(())
}
