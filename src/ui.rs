use std::fmt::{self, Write as _};
use std::io::{self, Write};

use alarm_core::{format_hms, AlarmClock, BlinkScheduler, Clock, Instant};
use chrono::{DateTime, TimeZone};

use crate::alerts::AlertConfig;
use crate::controls::ADJUST_STEPS;

pub const APP_NAME: &str = "KClock";
pub const ALERT_TITLE: &str = "** TIME UP **";
const NO_TIME: &str = "--:--:--";

/// Normal title when the blink signal is visible, alert title otherwise.
pub fn title(visible: bool) -> &'static str {
    if visible {
        APP_NAME
    } else {
        ALERT_TITLE
    }
}

/// Time of day of `at` in `tz`, "HH:MM:SS".
pub fn wall_clock<Tz: TimeZone>(at: Instant, tz: &Tz) -> String
where
    Tz::Offset: fmt::Display,
{
    match DateTime::from_timestamp(at.as_secs(), 0) {
        Some(utc) => utc.with_timezone(tz).format("%H:%M:%S").to_string(),
        None => NO_TIME.to_string(),
    }
}

pub fn status_line<C: Clock, Tz: TimeZone>(
    alarm: &AlarmClock<C>,
    now: Instant,
    tz: &Tz,
    blink: &BlinkScheduler,
    config: &AlertConfig,
    previewing: bool,
) -> String
where
    Tz::Offset: fmt::Display,
{
    let remaining = alarm
        .remaining_at(now)
        .map(format_hms)
        .unwrap_or_else(|| NO_TIME.to_string());
    let alarm_at = alarm
        .target()
        .map(|target| wall_clock(target, tz))
        .unwrap_or_else(|| NO_TIME.to_string());

    let mut line = String::new();
    write!(
        line,
        "{:<13}  remaining {}  alarm {}  now {}",
        title(blink.is_visible()),
        remaining,
        alarm_at,
        wall_clock(now, tz),
    )
    .ok();
    if alarm.is_alarming() {
        line.push_str("  ALARM ('c' to dismiss)");
    } else if alarm.is_armed() {
        line.push_str("  armed");
    }
    if !config.audio {
        line.push_str("  [muted]");
    }
    if previewing {
        line.push_str("  [preview]");
    }
    line
}

/// Redraw the single status line in place.
pub fn draw_status(out: &mut dyn Write, line: &str) -> io::Result<()> {
    write!(out, "\r\x1b[2K{}", line)?;
    out.flush()
}

pub fn draw_help(out: &mut dyn Write, config: &AlertConfig) -> io::Result<()> {
    writeln!(out)?;
    out.write_all(help_text(config).as_bytes())?;
    out.flush()
}

pub fn help_text(config: &AlertConfig) -> String {
    let steps: Vec<&str> = ADJUST_STEPS.iter().map(|(label, _)| *label).collect();
    let ring = match config.ring_seconds {
        0 => "until dismissed".to_string(),
        n => format!("for {}s", n),
    };
    format!(
        "{} - countdown alarm\n\
         \x20 {}   move the alarm (or any +N/-N with s, m, h)\n\
         \x20 c        stop the countdown / dismiss the alarm\n\
         \x20 p        preview the alarm sound\n\
         \x20 a        sound on/off (now {})\n\
         \x20 r N      ring for N seconds, 0 = until dismissed (now {})\n\
         \x20 h        this help\n\
         \x20 q        quit\n",
        APP_NAME,
        steps.join(" "),
        if config.audio { "on" } else { "off" },
        ring,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use alarm_core::ManualClock;
    use chrono::{FixedOffset, Utc};

    const T0: Instant = Instant::from_secs(86_400);

    #[test]
    fn test_idle_line() {
        let clock = ManualClock::new(T0);
        let alarm = AlarmClock::new(&clock);
        let line = status_line(&alarm, T0, &Utc, &BlinkScheduler::default(), &AlertConfig::default(), false);
        assert_eq!(line, "KClock         remaining --:--:--  alarm --:--:--  now 00:00:00");
    }

    #[test]
    fn test_armed_line() {
        let clock = ManualClock::new(T0);
        let mut alarm = AlarmClock::new(&clock);
        alarm.adjust(3725);
        let config = AlertConfig { audio: false, ..AlertConfig::default() };
        let line = status_line(&alarm, T0 + 5, &Utc, &BlinkScheduler::default(), &config, true);
        assert_eq!(
            line,
            "KClock         remaining 01:02:00  alarm 01:02:05  now 00:00:05  armed  [muted]  [preview]"
        );
    }

    #[test]
    fn test_alarming_line_follows_blink() {
        let clock = ManualClock::new(T0);
        let mut alarm = AlarmClock::new(&clock);
        alarm.adjust(1);
        alarm.tick(T0 + 1);
        let mut blink = BlinkScheduler::default();
        blink.start();

        let line = status_line(&alarm, T0 + 1, &Utc, &blink, &AlertConfig::default(), false);
        assert!(line.starts_with(APP_NAME));
        assert!(line.contains("remaining --:--:--  alarm 00:00:01  now 00:00:01  ALARM"));

        blink.toggle();
        let line = status_line(&alarm, T0 + 2, &Utc, &blink, &AlertConfig::default(), false);
        assert!(line.starts_with(ALERT_TITLE));
    }

    #[test]
    fn test_wall_clock_uses_zone() {
        // 1970-01-02 23:30:15 UTC
        let at = T0 + (23 * 3600 + 30 * 60 + 15);
        assert_eq!(wall_clock(at, &Utc), "23:30:15");
        let east = FixedOffset::east_opt(8 * 3600).unwrap();
        assert_eq!(wall_clock(at, &east), "07:30:15");
        assert_eq!(wall_clock(Instant::from_secs(i64::MAX), &Utc), NO_TIME);
    }

    #[test]
    fn test_alarm_time_follows_adjustments() {
        let clock = ManualClock::new(T0);
        let mut alarm = AlarmClock::new(&clock);
        alarm.adjust(1800);
        alarm.adjust(-300);
        let line = status_line(&alarm, T0, &Utc, &BlinkScheduler::default(), &AlertConfig::default(), false);
        assert!(line.contains("alarm 00:25:00  now 00:00:00"), "{}", line);
    }

    #[test]
    fn test_draw_status_overwrites_line() {
        let mut out = Vec::new();
        draw_status(&mut out, "hello").unwrap();
        assert_eq!(out, b"\r\x1b[2Khello");
    }

    #[test]
    fn test_help_lists_every_button() {
        let help = help_text(&AlertConfig { ring_seconds: 20, ..AlertConfig::default() });
        for (label, _) in ADJUST_STEPS {
            assert!(help.contains(label), "missing {}", label);
        }
        assert!(help.contains("now for 20s"));
        assert!(help.contains("now on"));
    }
}
