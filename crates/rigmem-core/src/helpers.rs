//! Formatting and frequency helpers shared by the drivers.

/// Format a frequency in hertz as a human-readable MHz string.
///
/// ```
/// use rigmem_core::format_freq_mhz;
///
/// assert_eq!(format_freq_mhz(14_074_000), "14.074000 MHz");
/// assert_eq!(format_freq_mhz(146_520_000), "146.520000 MHz");
/// ```
pub fn format_freq_mhz(freq_hz: u64) -> String {
    let mhz = freq_hz as f64 / 1_000_000.0;
    format!("{mhz:.6} MHz")
}

/// The coarsest standard tuning step that `freq` falls on, in hertz.
pub fn required_step(freq: u64) -> Option<u32> {
    if freq % 5_000 == 0 {
        Some(5_000)
    } else if freq % 12_500 == 0 {
        Some(12_500)
    } else if freq % 6_250 == 0 {
        Some(6_250)
    } else if freq % 2_500 == 0 {
        Some(2_500)
    } else if matches!(freq % 25_000, 8_330 | 16_670) {
        Some(8_330)
    } else {
        None
    }
}

/// Repair a frequency that a radio stored truncated to whole kilohertz.
///
/// Radios that keep frequencies in kHz drop the trailing 500, 250 or 750 Hz
/// of 12.5 kHz and 6.25 kHz channels. The first correction that lands on a
/// standard step wins; a frequency that matches no step is returned as is.
///
/// ```
/// use rigmem_core::fix_rounded_step;
///
/// assert_eq!(fix_rounded_step(146_520_000), 146_520_000);
/// assert_eq!(fix_rounded_step(145_012_000), 145_012_500);
/// assert_eq!(fix_rounded_step(145_006_000), 145_006_250);
/// ```
pub fn fix_rounded_step(freq: u64) -> u64 {
    if required_step(freq).is_some() {
        return freq;
    }
    [500, 250, 750]
        .into_iter()
        .map(|fix| freq + fix)
        .find(|&f| required_step(f).is_some())
        .unwrap_or(freq)
}
