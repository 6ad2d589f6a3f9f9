//! Shared helpers for command handlers.

use std::io::IsTerminal;

use serde::Serialize;

use cyltrack_core::{
    CommandResult, Cylinder, CylinderType, MeasurementUnit, QrLink, Snapshot, StockLevel,
};

use super::Context;
use crate::error::CliError;
use crate::output;

// ── Lookups ─────────────────────────────────────────────────────────

pub fn find_type<'a>(snap: &'a Snapshot, id: &str) -> Result<&'a CylinderType, CliError> {
    snap.type_by_id(id).ok_or_else(|| CliError::type_not_found(id))
}

pub fn find_cylinder<'a>(snap: &'a Snapshot, id: &str) -> Result<&'a Cylinder, CliError> {
    snap.cylinder_by_id(id)
        .ok_or_else(|| CliError::cylinder_not_found(id))
}

// ── Confirmation ────────────────────────────────────────────────────

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal on stdin there is nobody to ask, so `--yes` is
/// required.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(std::io::Error::other)?;
    Ok(confirmed)
}

// ── Write-through check ─────────────────────────────────────────────

/// Fail when an accepted mutation did not reach storage.
///
/// A fresh CLI process has no earlier saves, so `last_saved` is set only
/// if this command's write succeeded.
pub fn ensure_saved(ctx: &Context, result: &CommandResult) -> Result<(), CliError> {
    if result.is_unchanged() || ctx.inventory.last_saved().is_some() {
        return Ok(());
    }
    Err(CliError::SaveFailed {
        dir: ctx.data_dir.clone(),
    })
}

// ── Cylinder presentation ───────────────────────────────────────────

/// A cylinder joined with its type, for display and structured output.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CylinderView {
    #[serde(flatten)]
    pub cylinder: Cylinder,
    pub type_name: Option<String>,
    pub unit: Option<MeasurementUnit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net: Option<f64>,
    pub low: bool,
    pub qr_url: String,
}

impl CylinderView {
    pub fn new(snap: &Snapshot, cylinder: &Cylinder, qr: &QrLink) -> Self {
        let ty = snap.type_by_id(&cylinder.type_id);
        let unit = ty.map(|t| t.unit);
        Self {
            cylinder: cylinder.clone(),
            type_name: ty.map(|t| t.name.clone()),
            unit,
            net: unit.and_then(|u| cylinder.net_contents(u)),
            low: unit.is_some_and(|u| StockLevel::of(cylinder, u).is_low()),
            qr_url: qr.image_url(cylinder).to_string(),
        }
    }

    pub fn level(&self) -> StockLevel {
        if self.low { StockLevel::Low } else { StockLevel::Ok }
    }

    pub fn label(&self) -> &'static str {
        self.unit.map_or("", MeasurementUnit::label)
    }

    pub fn value_text(&self) -> String {
        format_amount(self.cylinder.value, self.label())
    }

    pub fn tare_text(&self) -> String {
        self.cylinder
            .tare_weight
            .filter(|_| self.unit.is_some_and(MeasurementUnit::is_mass))
            .map_or_else(|| "-".into(), |t| format_amount(t, self.label()))
    }

    pub fn net_text(&self) -> String {
        self.net
            .map_or_else(|| "-".into(), |n| format_amount(n, self.label()))
    }

    pub fn type_text(&self) -> String {
        match &self.type_name {
            Some(name) => format!("{name} ({})", self.cylinder.type_id),
            None => format!("unknown ({})", self.cylinder.type_id),
        }
    }
}

pub fn format_amount(value: f64, label: &str) -> String {
    if label.is_empty() {
        format!("{value:.1}")
    } else {
        format!("{value:.1} {label}")
    }
}

/// Key/value block for the table output of a single cylinder.
pub fn cylinder_detail(view: &CylinderView, color: bool) -> String {
    let is_mass = view.unit.is_some_and(MeasurementUnit::is_mass);
    let mut lines = vec![
        format!("ID:       {}", view.cylinder.id),
        format!("Type:     {}", view.type_text()),
    ];
    if is_mass {
        lines.push(format!("Total:    {}", view.value_text()));
        lines.push(format!("Tare:     {}", view.tare_text()));
        lines.push(format!("Net:      {}", view.net_text()));
    } else {
        lines.push(format!("Pressure: {}", view.value_text()));
    }
    lines.push(format!(
        "Stock:    {}",
        output::stock_badge(view.level(), color)
    ));
    lines.push(format!("QR:       {}", view.qr_url));
    lines.join("\n")
}
