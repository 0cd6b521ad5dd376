//! Diagnostic border styling
//!
//! Validation reports problems on document elements asynchronously. The
//! placed item of the element is then outlined in a color keyed by severity.

use crate::render_item::{Border, Color};
use serde::{Deserialize, Serialize};

/// Severity of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Amber outline
    Warning,
    /// Red outline
    Error,
}

/// Border colors used for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticPalette {
    pub warning: Color,
    pub error: Color,
    pub border_width: f64,
}

impl Default for DiagnosticPalette {
    fn default() -> Self {
        Self {
            warning: Color::rgb(255, 170, 0),
            error: Color::rgb(255, 0, 0),
            border_width: 1.0,
        }
    }
}

impl DiagnosticPalette {
    /// Build a palette from `#rrggbb` strings
    pub fn from_hex(warning: &str, error: &str, border_width: f64) -> crate::Result<Self> {
        Ok(Self {
            warning: Color::from_hex(warning)?,
            error: Color::from_hex(error)?,
            border_width,
        })
    }

    /// Get the color for a diagnostic kind
    pub fn color(&self, kind: DiagnosticKind) -> Color {
        match kind {
            DiagnosticKind::Warning => self.warning,
            DiagnosticKind::Error => self.error,
        }
    }

    /// Get the border drawn for a diagnostic kind
    pub fn border(&self, kind: DiagnosticKind) -> Border {
        Border {
            color: self.color(kind),
            width: self.border_width,
        }
    }
}
