/// The fixed adjustment buttons: label and delta in seconds.
pub const ADJUST_STEPS: [(&str, i64); 8] = [
    ("+1m", 60),
    ("+5m", 300),
    ("+30m", 1800),
    ("-1m", -60),
    ("-5m", -300),
    ("-30m", -1800),
    ("+10s", 10),
    ("-10s", -10),
];

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Control {
    Adjust(i64),
    Cancel,
    Preview,
    ToggleAudio,
    RingSeconds(u64),
    Redraw,
    Help,
    Quit,
}

pub fn parse_control(line: &str) -> Option<Control> {
    let line = line.trim();
    let mut words = line.split_whitespace();
    let control = match words.next() {
        None => Control::Redraw,
        Some("c") | Some("stop") | Some("cancel") => Control::Cancel,
        Some("p") | Some("preview") => Control::Preview,
        Some("a") | Some("audio") => Control::ToggleAudio,
        Some("r") | Some("ring") => Control::RingSeconds(words.next()?.parse().ok()?),
        Some("h") | Some("help") | Some("?") => Control::Help,
        Some("q") | Some("quit") | Some("exit") => Control::Quit,
        Some(token) => Control::Adjust(parse_delta(token)?),
    };
    if words.next().is_some() {
        return None;
    }
    Some(control)
}

/// Parse "+10s", "-5m", "+1h" or a bare signed number of seconds.
pub fn parse_delta(token: &str) -> Option<i64> {
    if let Some((_, delta)) = ADJUST_STEPS.iter().find(|(label, _)| *label == token) {
        return Some(*delta);
    }
    let (sign, rest) = match token.as_bytes().first()? {
        b'+' => (1, &token[1..]),
        b'-' => (-1, &token[1..]),
        _ => return None,
    };
    let (digits, unit) = match rest.char_indices().last()? {
        (i, 's') => (&rest[..i], 1),
        (i, 'm') => (&rest[..i], 60),
        (i, 'h') => (&rest[..i], 3600),
        _ => (rest, 1),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let n: i64 = digits.parse().ok()?;
    n.checked_mul(unit)?.checked_mul(sign)
}
