//! Status icons for CLI output

pub struct StatusIcon;

impl StatusIcon {
    pub const SUCCESS: &'static str = "✓";
    pub const WARNING: &'static str = "⚠";
    pub const ERROR: &'static str = "✗";
    pub const UNKNOWN: &'static str = "?";

    pub fn get_count_icon(running: u32, desired: u32) -> &'static str {
        if desired == 0 {
            Self::UNKNOWN
        } else if running >= desired {
            Self::SUCCESS
        } else if running > 0 {
            Self::WARNING
        } else {
            Self::ERROR
        }
    }

    /// Health summary of a service from its running and desired counts.
    pub fn get_status_text(running: u32, desired: u32) -> &'static str {
        if desired == 0 {
            "Stopped"
        } else if running >= desired {
            "Healthy"
        } else if running > 0 {
            "Degraded"
        } else {
            "Unavailable"
        }
    }

    pub fn get_ready_icon(ready: bool) -> &'static str {
        if ready {
            Self::SUCCESS
        } else {
            Self::ERROR
        }
    }
}
