// src/display/progress.rs
//
// Track progress math. Elapsed/total arrive as colon-separated time strings
// straight from the info snapshot; the result is a fraction for the bar
// drawer, or None to hide the bar entirely.

use std::collections::HashMap;
use std::sync::Arc;

use crate::display::registry::ProgressCalc;

/// Parse a 1-3 component colon timestamp (H:M:S / M:S / S) as seconds.
/// Components are positional base-60, rightmost is seconds.
fn parse_timestr(s: &str) -> Option<i64> {
    if s.is_empty() {
        return None;
    }
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() > 3 {
        return None;
    }
    let mut total: i64 = 0;
    for part in parts {
        let v: i64 = part.trim().parse().ok()?;
        if v < 0 {
            return None;
        }
        total = total * 60 + v;
    }
    Some(total)
}

/// Fraction of the track played, in [0,1]; None hides the progress bar.
///
/// `offset_secs` is subtracted from both sides before comparison, which
/// absorbs fixed lead-ins such as broadcast-guide padding. Elapsed past the
/// total clamps to a full bar rather than hiding it.
pub fn calc_progress(elapsed: &str, total: &str, offset_secs: i64) -> Option<f64> {
    let elapsed_secs = parse_timestr(elapsed)? - offset_secs;
    let total_secs = parse_timestr(total)? - offset_secs;

    if elapsed_secs < 0 || total_secs <= 0 {
        return None;
    }
    if elapsed_secs >= total_secs {
        return Some(1.0);
    }
    Some(elapsed_secs as f64 / total_secs as f64)
}

/// The stock calculator: `calc_progress` with a per-layout offset table.
/// Deployments swap the whole calculator through the registry instead of
/// patching the renderer.
pub fn default_calculator(offsets: HashMap<String, i64>) -> ProgressCalc {
    Arc::new(move |elapsed: &str, total: &str, layout_name: &str| {
        let offset = offsets.get(layout_name).copied().unwrap_or(0);
        calc_progress(elapsed, total, offset)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn halfway_through_a_track() {
        assert_eq!(calc_progress("01:30", "03:00", 0), Some(0.5));
    }

    #[test]
    fn zero_total_hides_the_bar() {
        assert_eq!(calc_progress("00:00", "00:00", 0), None);
    }

    #[test]
    fn empty_elapsed_hides_the_bar() {
        assert_eq!(calc_progress("", "12:00", 0), None);
    }

    #[test]
    fn elapsed_past_total_clamps_to_full() {
        assert_eq!(calc_progress("05:00", "03:00", 0), Some(1.0));
    }

    #[test]
    fn three_component_times_parse_base_60() {
        assert_eq!(calc_progress("1:00:00", "2:00:00", 0), Some(0.5));
    }

    #[test]
    fn malformed_components_hide_the_bar() {
        assert_eq!(calc_progress("1:xx", "03:00", 0), None);
        assert_eq!(calc_progress("1:2:3:4", "03:00", 0), None);
    }

    #[test]
    fn offset_is_subtracted_from_both_sides() {
        // 90s into 180s with a 60s lead-in: 30/120
        assert_eq!(calc_progress("01:30", "03:00", 60), Some(0.25));
        // still inside the lead-in: hide
        assert_eq!(calc_progress("00:30", "03:00", 60), None);
    }

    #[test]
    fn default_calculator_applies_the_layout_offset() {
        let mut offsets = HashMap::new();
        offsets.insert("video_default".to_string(), 60);
        let calc = default_calculator(offsets);

        assert_eq!(calc("01:30", "03:00", "video_default"), Some(0.25));
        assert_eq!(calc("01:30", "03:00", "audio_default"), Some(0.5));
    }
}
