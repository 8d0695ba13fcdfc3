use crate::model::day_stat::DayStat;
use crate::model::series::Totals;

pub const LEGEND: [(&str, &str); 4] = [
    ("🧪", "tested"),
    ("🦠", "positive test result (infected)"),
    ("👍", "recovered"),
    ("⚰️", "dead"),
];

/// `1234567` -> `1,234,567`.
pub fn format_count(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Total with the change appended when there is one: `1,234 (+12)`.
pub fn format_value(total: i64, new: i64) -> String {
    match new {
        0 => format_count(total),
        n if n > 0 => format!("{} (+{})", format_count(total), n),
        n => format!("{} ({})", format_count(total), n),
    }
}

/// Message announcing a locale's current numbers. `totals` are the recorded
/// totals before `delta` is merged, the shown figures include the delta.
pub fn format_update(flag: &str, name: &str, totals: &Totals, delta: &DayStat) -> String {
    let values = [
        (totals.tested + delta.tested, delta.tested),
        (totals.positive + delta.positive, delta.positive),
        (totals.recovered + delta.recovered, delta.recovered),
        (totals.dead + delta.dead, delta.dead),
    ];

    let mut out = format!("{}{}:\n", flag, name);
    for ((icon, _), (total, new)) in LEGEND.iter().zip(values) {
        out.push_str(&format!("{}  {}\n", icon, format_value(total, new)));
    }
    out
}

pub fn help_text() -> String {
    let mut out = String::from(
        "Shortcuts:\n\
         /help        - this help info\n\
         /update      - last update\n\
         /graph       - daily statistics\n\
         /subscribe   - allow sending updates automatically\n\
         /unsubscribe - unsubscribe from automatic updates\n\
         \n\
         Legend:\n",
    );
    for (icon, meaning) in LEGEND {
        out.push_str(&format!("{}  {}\n", icon, meaning));
    }
    out
}
