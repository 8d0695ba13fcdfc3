use covidstat_core::service::report::format_count;
use covidstat_core::Series;
use tabled::settings::object::Rows;
use tabled::settings::{Color, Modify, Style};
use tabled::{Table, Tabled};

// Helper struct for Table Row
#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Tested")]
    tested: String,
    #[tabled(rename = "Positive")]
    positive: String,
    #[tabled(rename = "Pos %")]
    percent: String,
    #[tabled(rename = "Recovered")]
    recovered: String,
    #[tabled(rename = "Dead")]
    dead: String,
    #[tabled(rename = "Total Positive")]
    total_positive: String,
}

pub fn show_history(flag: &str, locale: &str, series: &Series) {
    if series.is_empty() {
        println!("No history recorded for {}{}.", flag, locale);
        return;
    }

    let mut running_positive = 0;
    let mut rows = Vec::new();
    for day in series.iter() {
        running_positive += day.positive;
        rows.push(HistoryRow {
            date: format!("{} ({})", day.date.format("%Y-%m-%d"), day.date.format("%a")),
            tested: format_count(day.tested),
            positive: format_count(day.positive),
            percent: format!("{:.2}", day.percent()),
            recovered: format_count(day.recovered),
            dead: format_count(day.dead),
            total_positive: format_count(running_positive),
        });
    }

    let totals = series.totals();
    let span = match (series.first_date(), series.last_date()) {
        (Some(first), Some(last)) => format!("{} - {}", first.format("%Y-%m-%d"), last.format("%Y-%m-%d")),
        _ => String::new(),
    };
    println!(
        "\n\x1b[1;36m{}{}\x1b[0m {} ({} days, tested {}, positive {}, recovered {}, dead {})",
        flag,
        locale,
        span,
        series.len(),
        format_count(totals.tested),
        format_count(totals.positive),
        format_count(totals.recovered),
        format_count(totals.dead)
    );

    let mut table = Table::new(rows);
    table
        .with(Style::modern())
        .with(Modify::new(Rows::first()).with(Color::FG_CYAN)); // Header color

    println!("{}", table);
}
