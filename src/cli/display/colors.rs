//! Color theme for CLI output

use comfy_table::Color as TableColor;

#[derive(Debug, Clone)]
pub struct ColorTheme {
    pub success: TableColor,
    pub warning: TableColor,
    pub error: TableColor,
    pub info: TableColor,
    pub muted: TableColor,
}

impl Default for ColorTheme {
    fn default() -> Self {
        Self {
            success: TableColor::Green,
            warning: TableColor::Yellow,
            error: TableColor::Red,
            info: TableColor::Cyan,
            muted: TableColor::DarkGrey,
        }
    }
}

impl ColorTheme {
    /// Color for a running/desired count pair.
    pub fn get_count_color(&self, running: u32, desired: u32) -> TableColor {
        if desired == 0 {
            self.muted
        } else if running >= desired {
            self.success
        } else if running > 0 {
            self.warning
        } else {
            self.error
        }
    }

    /// Color for a pod phase as reported by Kubernetes.
    pub fn get_phase_color(&self, phase: &str) -> TableColor {
        match phase {
            "Running" | "Succeeded" => self.success,
            "Pending" => self.warning,
            "Failed" => self.error,
            _ => self.muted,
        }
    }
}
