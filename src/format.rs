/// Format elapsed milliseconds as zero-padded `HH:MM:SS`. Hours are not
/// wrapped at 24; a 25 hour shift reads "25:00:00".
pub fn format_clock(elapsed_ms: u64) -> String {
    let total_seconds = elapsed_ms / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Format a monetary amount with a fixed number of decimal places.
pub fn format_amount(value: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, value)
}
