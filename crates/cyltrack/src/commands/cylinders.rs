//! Cylinder command handlers.

use serde::Serialize;
use tabled::Tabled;

use cyltrack_core::{Command as CoreCommand, CommandResult, CylinderUpdate, MeasurementUnit, qr};

use super::util::{self, CylinderView};
use super::Context;
use crate::cli::{CylindersArgs, CylindersCommand};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct CylinderRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Type")]
    type_name: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Tare")]
    tare: String,
    #[tabled(rename = "Net")]
    net: String,
    #[tabled(rename = "Stock")]
    stock: String,
}

impl CylinderRow {
    fn new(view: &CylinderView, color: bool) -> Self {
        Self {
            id: view.cylinder.id.clone(),
            type_name: view.type_name.clone().unwrap_or_else(|| "?".into()),
            value: view.value_text(),
            tare: view.tare_text(),
            net: view.net_text(),
            stock: output::stock_badge(view.level(), color),
        }
    }
}

#[derive(Debug, Serialize)]
struct QrInfo {
    id: String,
    payload: String,
    url: String,
}

fn qr_detail(info: &QrInfo) -> String {
    [
        format!("Payload: {}", info.payload),
        format!("Image:   {}", info.url),
    ]
    .join("\n")
}

fn check_finite(field: &str, value: f64) -> Result<f64, CliError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CliError::Validation {
            field: field.into(),
            reason: format!("expected a number, got {value}"),
        })
    }
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub fn handle(ctx: &Context, args: CylindersArgs) -> Result<(), CliError> {
    let global = &ctx.global;
    let color = output::should_color(&global.color());
    let qr_link = ctx.config.qr_link()?;

    match args.command {
        CylindersCommand::List { type_id, low } => {
            let snap = ctx.inventory.snapshot();
            if let Some(ref type_id) = type_id {
                util::find_type(&snap, type_id)?;
            }
            let views: Vec<_> = snap
                .cylinders
                .iter()
                .filter(|c| type_id.as_ref().is_none_or(|t| &c.type_id == t))
                .map(|c| CylinderView::new(&snap, c, &qr_link))
                .filter(|v| !low || v.low)
                .collect();
            let out = output::render_list(
                &global.output(),
                &views,
                |v| CylinderRow::new(v, color),
                |v| v.cylinder.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        CylindersCommand::Add { type_id } => {
            util::find_type(&ctx.inventory.snapshot(), &type_id)?;
            let result = ctx.inventory.execute(CoreCommand::AddCylinder {
                type_id: type_id.clone(),
            });
            util::ensure_saved(ctx, &result)?;
            let CommandResult::CylinderAdded(cylinder) = result else {
                return Err(CliError::Conflict {
                    resource_type: "cylinder".into(),
                    reason: "no unused cylinder ID found".into(),
                });
            };
            let view = CylinderView::new(&ctx.inventory.snapshot(), &cylinder, &qr_link);
            let out = output::render_single(
                &global.output(),
                &view,
                |v| util::cylinder_detail(v, color),
                |v| v.cylinder.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        CylindersCommand::Get { id } => {
            let snap = ctx.inventory.snapshot();
            let cylinder = util::find_cylinder(&snap, &id)?;
            let view = CylinderView::new(&snap, cylinder, &qr_link);
            let out = output::render_single(
                &global.output(),
                &view,
                |v| util::cylinder_detail(v, color),
                |v| v.cylinder.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        CylindersCommand::Update { id, value, tare } => {
            let snap = ctx.inventory.snapshot();
            let cylinder = util::find_cylinder(&snap, &id)?;
            let unit = snap.unit_of(cylinder);

            let value = check_finite("value", value)?;
            let update = match tare {
                Some(tare) if unit == Some(MeasurementUnit::Mass) => {
                    CylinderUpdate::with_tare(value, check_finite("tare", tare)?)
                }
                Some(_) => {
                    return Err(CliError::Validation {
                        field: "tare".into(),
                        reason: "only mass cylinders have a tare weight".into(),
                    });
                }
                None => CylinderUpdate::value(value),
            };

            let result = ctx
                .inventory
                .execute(CoreCommand::UpdateCylinder { id: id.clone(), update });
            util::ensure_saved(ctx, &result)?;
            let CommandResult::CylinderUpdated(updated) = result else {
                return Err(CliError::cylinder_not_found(id));
            };
            let view = CylinderView::new(&ctx.inventory.snapshot(), &updated, &qr_link);
            let out = output::render_single(
                &global.output(),
                &view,
                |v| util::cylinder_detail(v, color),
                |v| v.cylinder.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        CylindersCommand::Delete { id } => {
            util::find_cylinder(&ctx.inventory.snapshot(), &id)?;
            let prompt =
                format!("Delete cylinder {id}? This action cannot be undone.");
            if !util::confirm(&prompt, "cylinders delete", global.yes)? {
                return Ok(());
            }
            let result = ctx
                .inventory
                .execute(CoreCommand::DeleteCylinder { id: id.clone() });
            util::ensure_saved(ctx, &result)?;
            if result.is_unchanged() {
                return Err(CliError::cylinder_not_found(id));
            }
            output::print_status(&format!("Deleted cylinder {id}"), global.quiet);
            Ok(())
        }

        CylindersCommand::Qr { id } => {
            let snap = ctx.inventory.snapshot();
            let cylinder = util::find_cylinder(&snap, &id)?;
            let info = QrInfo {
                id: cylinder.id.clone(),
                payload: qr::payload(cylinder).to_owned(),
                url: qr_link.image_url(cylinder).to_string(),
            };
            let out = output::render_single(&global.output(), &info, qr_detail, |i| i.url.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
