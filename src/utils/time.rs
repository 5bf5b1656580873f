use chrono::Duration;

/// Renders elapsed quiz time the way the certified API's save-user-response
/// call expects it, e.g. "4m 32s".
pub fn format_completion_time(elapsed: Duration) -> String {
    let total_secs = elapsed.num_seconds().max(0);
    let minutes = total_secs / 60;
    let seconds = total_secs % 60;
    format!("{}m {}s", minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_completion_time(Duration::seconds(272)), "4m 32s");
        assert_eq!(format_completion_time(Duration::seconds(59)), "0m 59s");
        assert_eq!(format_completion_time(Duration::seconds(600)), "10m 0s");
    }

    #[test]
    fn negative_elapsed_clamps_to_zero() {
        assert_eq!(format_completion_time(Duration::seconds(-5)), "0m 0s");
    }
}
