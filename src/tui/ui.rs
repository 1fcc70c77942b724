use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Clear, Paragraph, Row, Table},
    Frame,
};
use crate::analytics::format_duration;
use crate::day;
use crate::storage::KeyValueStore;
use super::app::{App, InputField, InputMode, ViewMode};

pub fn ui<S: KeyValueStore>(f: &mut Frame, app: &mut App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Calendar strip
            Constraint::Min(0),    // Day list or stats
            Constraint::Length(1), // Status
            Constraint::Length(3), // Help
        ])
        .split(f.area());

    render_strip(f, app, chunks[0]);

    match app.view_mode {
        ViewMode::Day => render_day(f, app, chunks[1]),
        ViewMode::Stats => render_stats(f, app, chunks[1]),
    }

    let status = Paragraph::new(app.status.clone().unwrap_or_default())
        .style(Style::default().fg(Color::Magenta));
    f.render_widget(status, chunks[2]);

    let help_text = match app.input_mode {
        InputMode::Normal => match app.view_mode {
            ViewMode::Day => "q: Quit | ←/→: Day | [/]: Week | t: Today | a: Add | Space: Done | e: Details | c: Checklist | d: Del | v: Stats",
            ViewMode::Stats => "q: Quit | v: Back to day view",
        },
        InputMode::Editing => "Enter: Save | Esc: Cancel",
    };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[3]);

    if app.input_mode == InputMode::Editing {
        let area = centered_rect(60, 3, f.area());
        f.render_widget(Clear, area);
        let title = match app.input_field {
            InputField::Title => "Add Task",
            InputField::Details => "Edit Details",
            InputField::ChecklistItem => "Add Checklist Item",
        };
        let input = Paragraph::new(app.input_buffer.as_str())
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(input, area);
    }
}

fn render_strip<S: KeyValueStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let selected = app.board.selected();
    let today = day::today();
    let days = app.board.week_days();

    let mut names = Vec::new();
    let mut numbers = Vec::new();
    for d in &days {
        let style = if *d == selected {
            Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else if *d == today {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        names.push(Span::styled(format!(" {:^5} ", d.format("%a")), style));
        numbers.push(Span::styled(format!(" {:^5} ", d.format("%-d")), style));
    }

    let strip = Paragraph::new(vec![Line::from(names), Line::from(numbers)])
        .block(Block::default().borders(Borders::ALL).title(selected.format(" %B %Y ").to_string()));
    f.render_widget(strip, area);
}

fn render_day<S: KeyValueStore>(f: &mut Frame, app: &mut App<S>, area: Rect) {
    let rows: Vec<Row> = app
        .visible
        .iter()
        .map(|t| {
            let checklist = t
                .checklist_progress()
                .map(|(done, total)| format!("{done}/{total}"))
                .unwrap_or_default();
            let notes = if t.details.is_some() || t.image_uri.is_some() { "✎" } else { "" };
            let style = if t.is_completed {
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(if t.is_completed { "[x]" } else { "[ ]" }),
                Cell::from(t.title.clone()),
                Cell::from(checklist),
                Cell::from(notes),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(4),
        Constraint::Min(20),
        Constraint::Length(9),
        Constraint::Length(2),
    ];

    let done = app.visible.iter().filter(|t| t.is_completed).count();
    let title = format!(" {} - {}/{} done ", app.board.selected().format("%A %-d"), done, app.visible.len());
    let table = Table::new(rows, widths)
        .header(Row::new(vec!["", "Task", "Checklist", ""])
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .bottom_margin(1))
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
        .highlight_symbol(">> ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_stats<S: KeyValueStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let stats = app.stats();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(area);

    let avg = stats.average_completion.map(format_duration).unwrap_or_else(|| "-".into());
    let summary = Paragraph::new(vec![
        Line::from(format!(
            "Total {}   Completed {}   Pending {}   Rate {}%",
            stats.total, stats.completed, stats.pending, stats.completion_rate
        )),
        Line::from(format!("Average time to done: {}", avg)),
    ])
    .block(Block::default().borders(Borders::ALL).title(" Analytics "));
    f.render_widget(summary, chunks[0]);

    let bars: Vec<Bar> = stats
        .daily
        .iter()
        .map(|d| Bar::default().label(Line::from(d.weekday.clone())).value(d.completed as u64))
        .collect();
    let chart = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title(" Completed, last 7 days "))
        .data(BarGroup::default().bars(&bars))
        .bar_width(5)
        .bar_gap(2)
        .max(stats.max_daily() as u64)
        .bar_style(Style::default().fg(Color::Green));
    f.render_widget(chart, chunks[1]);
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(r.height.saturating_sub(height) / 2),
            Constraint::Length(height),
            Constraint::Length(r.height.saturating_sub(height) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
