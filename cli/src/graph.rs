use std::{io, time::Duration};
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    symbols::Marker,
    widgets::{Axis, Block, BorderType, Borders, Chart, Dataset, GraphType, Padding, Paragraph},
};
use covidstat_core::service::chart::Chart as ChartData;
use covidstat_core::service::report::format_count;

// --- THEME ---
struct Theme {
    primary: Color,
    muted: Color,
    text: Color,
}

const THEME: Theme = Theme {
    primary: Color::Cyan,
    muted: Color::DarkGray,
    text: Color::White,
};

// One color per line, in selector order
const LINE_COLORS: [Color; 4] = [Color::Blue, Color::Red, Color::Green, Color::Yellow];

pub struct GraphApp {
    pub charts: Vec<ChartData>,
    pub current_index: usize,
}

impl GraphApp {
    pub fn new(charts: Vec<ChartData>) -> Self {
        Self {
            charts,
            current_index: 0,
        }
    }

    pub fn next_chart(&mut self) {
        if !self.charts.is_empty() && self.current_index < self.charts.len() - 1 {
            self.current_index += 1;
        }
    }

    pub fn previous_chart(&mut self) {
        if self.current_index > 0 {
            self.current_index -= 1;
        }
    }

    pub fn current_chart(&self) -> Option<&ChartData> {
        self.charts.get(self.current_index)
    }
}

pub fn run(charts: Vec<ChartData>) -> Result<()> {
    if charts.iter().all(|c| c.dates.is_empty()) {
        println!("No history data available.");
        return Ok(());
    }

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = GraphApp::new(charts);

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut GraphApp) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                        KeyCode::Left | KeyCode::Char('h') => app.previous_chart(),
                        KeyCode::Right | KeyCode::Char('l') => app.next_chart(),
                        _ => {}
                    }
                }
            }
        }
    }
}

fn ui(frame: &mut Frame, app: &GraphApp) {
    let size = frame.area();

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(10),   // Chart + Sidebar
            Constraint::Length(1), // Footer
        ])
        .split(size);

    let Some(chart) = app.current_chart() else {
        frame.render_widget(
            Paragraph::new("No data available").alignment(Alignment::Center),
            main_layout[1],
        );
        return;
    };

    // --- Header ---
    let header_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(20),
            Constraint::Min(1),
            Constraint::Length(50),
        ])
        .split(main_layout[0]);

    let app_title = Paragraph::new(Span::styled("COVIDSTAT", Style::default().fg(THEME.primary).add_modifier(Modifier::BOLD)))
        .block(Block::default().padding(Padding::new(0, 0, 1, 0)));
    frame.render_widget(app_title, header_layout[0]);

    let nav_text = Line::from(vec![
        Span::styled(" < ", Style::default().fg(if app.current_index > 0 { THEME.text } else { THEME.muted })),
        Span::styled(format!(" {} ", chart.title), Style::default().fg(THEME.text).add_modifier(Modifier::BOLD)),
        Span::styled(" > ", Style::default().fg(if app.current_index < app.charts.len() - 1 { THEME.text } else { THEME.muted })),
    ]);
    let nav = Paragraph::new(nav_text).alignment(Alignment::Right).block(Block::default().padding(Padding::new(0, 0, 1, 0)));
    frame.render_widget(nav, header_layout[2]);

    frame.render_widget(
        Block::default().borders(Borders::BOTTOM).border_style(Style::default().fg(THEME.muted)),
        main_layout[0],
    );

    // --- Main Content Split ---
    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(75),
            Constraint::Length(1),
            Constraint::Percentage(25),
        ])
        .split(main_layout[1]);

    draw_chart(frame, chart, content_chunks[0]);
    draw_info_panel(frame, chart, content_chunks[2]);

    // --- Footer ---
    let help = Line::from(vec![
        Span::styled("NAV: ", Style::default().fg(THEME.muted)),
        Span::styled("←/→ ", Style::default().fg(THEME.text)),
        Span::raw("  "),
        Span::styled("QUIT: ", Style::default().fg(THEME.muted)),
        Span::styled("q", Style::default().fg(THEME.text)),
    ]);
    let footer = Paragraph::new(help).alignment(Alignment::Center).style(Style::default().fg(THEME.muted));
    frame.render_widget(footer, main_layout[2]);
}

fn draw_chart(frame: &mut Frame, chart: &ChartData, area: Rect) {
    let points: Vec<Vec<(f64, f64)>> = chart
        .lines
        .iter()
        .map(|line| line.points.iter().enumerate().map(|(i, v)| (i as f64, *v)).collect())
        .collect();

    let datasets: Vec<Dataset> = chart
        .lines
        .iter()
        .zip(points.iter())
        .enumerate()
        .map(|(i, (line, data))| {
            Dataset::default()
                .name(line.label.clone())
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(LINE_COLORS[i % LINE_COLORS.len()]))
                .data(data)
        })
        .collect();

    let x_max = chart.dates.len().saturating_sub(1).max(1) as f64;
    let y_max = chart
        .lines
        .iter()
        .flat_map(|l| l.points.iter().copied())
        .fold(0.0_f64, f64::max)
        * 1.1;
    let y_max = if y_max > 0.0 { y_max } else { 1.0 };
    // a downward revision gives a negative increment
    let y_min = chart
        .lines
        .iter()
        .flat_map(|l| l.points.iter().copied())
        .fold(0.0_f64, f64::min);

    let x_labels: Vec<String> = match (chart.dates.first(), chart.dates.last()) {
        (Some(first), Some(last)) => vec![first.format("%b%d").to_string(), last.format("%b%d").to_string()],
        _ => Vec::new(),
    };
    let y_labels = vec![format!("{:.0}", y_min), format!("{:.0}", (y_min + y_max) / 2.0), format!("{:.0}", y_max)];

    let chart_block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(THEME.muted))
        .title(format!(" {} ", chart.title));

    let widget = Chart::new(datasets)
        .block(chart_block)
        .x_axis(
            Axis::default()
                .title("date")
                .style(Style::default().fg(THEME.muted))
                .bounds([0.0, x_max])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(THEME.muted))
                .bounds([y_min, y_max])
                .labels(y_labels),
        );

    frame.render_widget(widget, area);
}

fn draw_info_panel(frame: &mut Frame, chart: &ChartData, area: Rect) {
    let mut info_text = vec![
        Line::from(vec![Span::styled("Latest", Style::default().add_modifier(Modifier::BOLD))]),
        Line::from(""),
    ];

    if let Some(last) = chart.dates.last() {
        info_text.push(Line::from(vec![
            Span::styled("Date:      ", Style::default().fg(THEME.muted)),
            Span::styled(last.format("%Y-%m-%d").to_string(), Style::default().fg(THEME.text)),
        ]));
    }

    for (i, line) in chart.lines.iter().enumerate() {
        let value = match line.points.last() {
            Some(v) if v.fract() == 0.0 => format_count(*v as i64),
            Some(v) => format!("{:.2}", v),
            None => "-".to_string(),
        };
        info_text.push(Line::from(vec![
            Span::styled(format!("{:<11}", format!("{}:", line.label)), Style::default().fg(THEME.muted)),
            Span::styled(value, Style::default().fg(LINE_COLORS[i % LINE_COLORS.len()]).add_modifier(Modifier::BOLD)),
        ]));
    }

    info_text.push(Line::from(""));
    info_text.push(Line::from(vec![
        Span::styled("Days:      ", Style::default().fg(THEME.muted)),
        Span::styled(chart.dates.len().to_string(), Style::default().fg(THEME.text)),
    ]));

    let info_block = Paragraph::new(info_text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(THEME.muted))
            .title(" Summary "),
    );
    frame.render_widget(info_block, area);
}
