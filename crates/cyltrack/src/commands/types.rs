//! Cylinder type command handlers.

use serde::Serialize;
use tabled::Tabled;

use cyltrack_core::ops::validate_type_name;
use cyltrack_core::{Command as CoreCommand, CommandResult, CylinderType, MeasurementUnit, Snapshot};

use super::{Context, util};
use crate::cli::{TypesArgs, TypesCommand, UnitArg};
use crate::error::CliError;
use crate::output;

impl From<UnitArg> for MeasurementUnit {
    fn from(unit: UnitArg) -> Self {
        match unit {
            UnitArg::Mass => Self::Mass,
            UnitArg::Pressure => Self::Pressure,
        }
    }
}

// ── Summary & table row ─────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct TypeSummary {
    #[serde(flatten)]
    ty: CylinderType,
    cylinders: usize,
    low: usize,
}

impl TypeSummary {
    fn new(snap: &Snapshot, ty: &CylinderType) -> Self {
        let cylinders: Vec<_> = snap.cylinders_of(&ty.id).collect();
        let low = cylinders
            .iter()
            .filter(|c| cyltrack_core::is_low(c, ty.unit))
            .count();
        Self {
            ty: ty.clone(),
            cylinders: cylinders.len(),
            low,
        }
    }
}

#[derive(Tabled)]
struct TypeRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Unit")]
    unit: String,
    #[tabled(rename = "Cylinders")]
    cylinders: usize,
    #[tabled(rename = "Low")]
    low: usize,
}

impl From<&TypeSummary> for TypeRow {
    fn from(s: &TypeSummary) -> Self {
        Self {
            id: s.ty.id.clone(),
            name: s.ty.name.clone(),
            unit: format!("{} ({})", s.ty.unit, s.ty.unit.label()),
            cylinders: s.cylinders,
            low: s.low,
        }
    }
}

fn detail(ty: &CylinderType) -> String {
    [
        format!("ID:   {}", ty.id),
        format!("Name: {}", ty.name),
        format!("Unit: {} ({})", ty.unit, ty.unit.label()),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(ctx: &Context, args: TypesArgs) -> Result<(), CliError> {
    let global = &ctx.global;
    match args.command {
        TypesCommand::List => {
            let snap = ctx.inventory.snapshot();
            let summaries: Vec<_> = snap.types.iter().map(|t| TypeSummary::new(&snap, t)).collect();
            if summaries.is_empty() && global.output() == crate::cli::OutputFormat::Table {
                output::print_status(
                    "No cylinder types found. Add one with: cyltrack types add <NAME>",
                    global.quiet,
                );
                return Ok(());
            }
            let out = output::render_list(
                &global.output(),
                &summaries,
                |s| TypeRow::from(s),
                |s| s.ty.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        TypesCommand::Add { name, unit } => {
            let name = validate_type_name(&name)?;
            let result = ctx.inventory.execute(CoreCommand::AddType {
                name,
                unit: unit.into(),
            });
            util::ensure_saved(ctx, &result)?;
            let CommandResult::TypeAdded(ty) = result else {
                return Err(CliError::Validation {
                    field: "name".into(),
                    reason: "type was not added".into(),
                });
            };
            let out = output::render_single(&global.output(), &ty, detail, |t| t.id.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        TypesCommand::Delete { id } => {
            let snap = ctx.inventory.snapshot();
            let count = snap.cylinders_of(&id).count();
            // Cylinders left behind by a missing type can still be purged.
            let name = match util::find_type(&snap, &id) {
                Ok(ty) => ty.name.clone(),
                Err(_) if count > 0 => format!("{id} (unknown)"),
                Err(e) => return Err(e),
            };
            let prompt = format!(
                "Delete cylinder type '{name}' ({count} cylinders)? All associated cylinders \
                 will also be deleted. This action cannot be undone."
            );
            if !util::confirm(&prompt, "types delete", global.yes)? {
                return Ok(());
            }

            let result = ctx.inventory.execute(CoreCommand::DeleteType { id: id.clone() });
            util::ensure_saved(ctx, &result)?;
            match result {
                CommandResult::TypeDeleted {
                    cylinders_removed, ..
                } => {
                    output::print_status(
                        &format!("Deleted type {id} and {cylinders_removed} cylinder(s)"),
                        global.quiet,
                    );
                    Ok(())
                }
                _ => Err(CliError::type_not_found(id)),
            }
        }
    }
}
