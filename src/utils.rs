/// Shared helpers used across the conversion pipeline.
use crate::error::{ConvertError, Result};
use indicatif::{ProgressBar, ProgressStyle};

/// Format a byte count as a human-readable size string.
///
/// Buckets are powers of 1024 with the units `Bytes`, `KB`, `MB`, `GB`;
/// values print with up to two decimals, trailing zeros trimmed.
///
/// # Example
/// ```
/// use img_convert::format_file_size;
///
/// assert_eq!(format_file_size(0), "0 Bytes");
/// assert_eq!(format_file_size(1536), "1.5 KB");
/// assert_eq!(format_file_size(1024 * 1024), "1 MB");
/// ```
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["Bytes", "KB", "MB", "GB"];
    const THRESHOLD: f64 = 1024.0;

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= THRESHOLD && unit_index < UNITS.len() - 1 {
        size /= THRESHOLD;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{} {}", trim_decimals(size), UNITS[unit_index])
    }
}

/// Render with two decimals, then drop trailing zeros and a bare point,
/// so 1.50 prints as "1.5" and 1.00 as "1".
fn trim_decimals(value: f64) -> String {
    let formatted = format!("{:.2}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    trimmed.to_string()
}

/// Parse a `#RRGGBB` (or `RRGGBB`) hex string into RGB components.
pub fn parse_hex_color(color: &str) -> Result<[u8; 3]> {
    let hex = color.strip_prefix('#').unwrap_or(color);
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ConvertError::InvalidColor(color.to_string()));
    }

    let channel = |range: std::ops::Range<usize>| -> Result<u8> {
        u8::from_str_radix(&hex[range], 16)
            .map_err(|_| ConvertError::InvalidColor(color.to_string()))
    };

    Ok([channel(0..2)?, channel(2..4)?, channel(4..6)?])
}

/// File name without its last extension. A name with no dot (or only a
/// leading dot) is returned whole.
pub fn base_name(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    }
}

/// Progress spinner with the house styling.
pub fn create_progress_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template(crate::constants::PROGRESS_SPINNER_TEMPLATE)
            .expect("Invalid progress template"),
    );
    pb.set_message(message.to_string());
    pb
}
