// crates/clipsort-core/src/helpers/time.rs
//
// Time-formatting utilities shared by the monitor readout and the status
// line. Kept in core so they stay testable without a UI.

/// Format a playback position as `MM:SS:FF` (minutes, seconds, frames at
/// 30 fps). Used for the monitor timecode.
///
/// ```
/// use clipsort_core::helpers::time::format_time;
/// assert_eq!(format_time(0.0),  "00:00:00");
/// assert_eq!(format_time(61.5), "01:01:15");
/// ```
pub fn format_time(s: f64) -> String {
    let m  = (s / 60.0) as u32;
    let sc = (s % 60.0) as u32;
    let fr = ((s * 30.0) as u32) % 30;
    format!("{m:02}:{sc:02}:{fr:02}")
}

/// Format a clip duration compactly: `4.2s`, `3:07`, `1:04:35`.
/// Used in the status line next to the loaded file's path.
///
/// ```
/// use clipsort_core::helpers::time::format_duration;
/// assert_eq!(format_duration(4.2),    "4.2s");
/// assert_eq!(format_duration(187.0),  "3:07");
/// assert_eq!(format_duration(3875.0), "1:04:35");
/// ```
pub fn format_duration(secs: f64) -> String {
    if secs >= 3600.0 {
        format!(
            "{}:{:02}:{:02}",
            secs as u64 / 3600,
            (secs as u64 % 3600) / 60,
            secs as u64 % 60,
        )
    } else if secs >= 60.0 {
        format!("{}:{:02}", secs as u64 / 60, secs as u64 % 60)
    } else {
        format!("{secs:.1}s")
    }
}
