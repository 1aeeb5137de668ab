/// `MM:SS` countdown display. Minutes are not wrapped into hours.
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Human-readable duration: "45 seconds", "1 minute", "2 hours 30 minutes".
///
/// Below a minute the seconds are shown; above that, leftover seconds are
/// dropped.
pub fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        return plural(seconds, "second");
    }

    let minutes = seconds / 60;
    if minutes < 60 {
        return plural(minutes, "minute");
    }

    let hours = minutes / 60;
    let remaining_mins = minutes % 60;
    if remaining_mins == 0 {
        plural(hours, "hour")
    } else {
        format!("{} {}", plural(hours, "hour"), plural(remaining_mins, "minute"))
    }
}

fn plural(n: u64, unit: &str) -> String {
    if n == 1 {
        format!("{n} {unit}")
    } else {
        format!("{n} {unit}s")
    }
}
