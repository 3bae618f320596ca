use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::series::StatusKind;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.65, 0.5);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Shift colours: Turno → Color32
// ---------------------------------------------------------------------------

/// Stable colour per shift, shared by every chart.
#[derive(Debug, Clone)]
pub struct ShiftColors {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ShiftColors {
    /// Assign colours over every shift in the dataset, so a shift keeps its
    /// colour when filters hide the others.
    pub fn new(shifts: &BTreeSet<String>) -> Self {
        let palette = generate_palette(shifts.len());
        let mapping = shifts.iter().cloned().zip(palette).collect();

        ShiftColors {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    pub fn color_for(&self, shift: &str) -> Color32 {
        self.mapping
            .get(shift)
            .copied()
            .unwrap_or(self.default_color)
    }
}

// ---------------------------------------------------------------------------
// Status colours and conditional cell styling
// ---------------------------------------------------------------------------

/// Bar colour of an outcome category.
pub fn status_color(status: StatusKind) -> Color32 {
    match status {
        StatusKind::Approved => Color32::from_rgb(0x2c, 0xa0, 0x2c),
        StatusKind::Failed => Color32::from_rgb(0xd6, 0x27, 0x28),
        StatusKind::Withdrawn => Color32::from_rgb(0xff, 0x7f, 0x0e),
    }
}

/// How a table cell should be emphasised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleHint {
    Plain,
    Success,
    Failure,
}

impl StyleHint {
    pub fn background(self) -> Option<Color32> {
        match self {
            StyleHint::Plain => None,
            StyleHint::Success => Some(Color32::from_rgb(0xcc, 0xff, 0xcc)),
            StyleHint::Failure => Some(Color32::from_rgb(0xff, 0xcc, 0xcc)),
        }
    }
}

/// Highlight a non-zero approved or failed count. Withdrawals stay plain.
pub fn severity(status: StatusKind, value: u64) -> StyleHint {
    if value == 0 {
        return StyleHint::Plain;
    }
    match status {
        StatusKind::Approved => StyleHint::Success,
        StatusKind::Failed => StyleHint::Failure,
        StatusKind::Withdrawn => StyleHint::Plain,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size() {
        assert!(generate_palette(0).is_empty());
        let colors = generate_palette(3);
        assert_eq!(colors.len(), 3);
        assert_ne!(colors[0], colors[1]);
    }

    #[test]
    fn unknown_shift_gets_default() {
        let shifts: BTreeSet<String> = ["Diurno".to_string(), "Noturno".to_string()].into();
        let colors = ShiftColors::new(&shifts);
        assert_ne!(colors.color_for("Diurno"), colors.color_for("Noturno"));
        assert_eq!(colors.color_for("Integral"), Color32::GRAY);
    }

    #[test]
    fn severity_only_marks_positive_counts() {
        assert_eq!(severity(StatusKind::Failed, 0), StyleHint::Plain);
        assert_eq!(severity(StatusKind::Failed, 2), StyleHint::Failure);
        assert_eq!(severity(StatusKind::Approved, 1), StyleHint::Success);
        assert_eq!(severity(StatusKind::Withdrawn, 3), StyleHint::Plain);
        assert_eq!(StyleHint::Plain.background(), None);
        assert!(StyleHint::Failure.background().is_some());
    }
}
