use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Row, Table, Wrap},
    Frame,
};
use taskdeck_core::{RowMode, TaskStatus};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::tui::app::{App, InputMode};

const TITLE_COLUMN_WIDTH: usize = 48;

pub fn draw(f: &mut Frame, app: &mut App) {
    let size = f.area();

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(1),    // Content
            Constraint::Length(3), // Input
            Constraint::Length(1), // Footer/Help
        ])
        .split(size);

    let header_text = if app.in_flight > 0 {
        format!("TASKDECK · {} ({} syncing)", app.board.user_id(), app.in_flight)
    } else {
        format!("TASKDECK · {}", app.board.user_id())
    };
    let header = Paragraph::new(header_text)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded));
    f.render_widget(header, main_chunks[0]);

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(main_chunks[1]);

    draw_task_list(f, app, content_chunks[0]);
    draw_detail_view(f, app, content_chunks[1]);
    draw_input(f, app, main_chunks[2]);

    let footer = match (&app.input_mode, app.selected_pending_delete()) {
        (InputMode::Adding, _) => "Enter: add (desc: starts description) | Esc: cancel",
        (InputMode::Editing(_), _) => "Enter: save | Esc: cancel",
        (InputMode::Normal, true) => "y: confirm delete | n/Esc: keep",
        (InputMode::Normal, false) => {
            "j/k: Navigate | Space: done/undo | a: add | e: edit | d: delete | r: reload | q: Quit"
        }
    };
    let footer = Paragraph::new(footer)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    f.render_widget(footer, main_chunks[3]);
}

fn draw_task_list(f: &mut Frame, app: &mut App, area: Rect) {
    let rows: Vec<Row> = app
        .board
        .rows()
        .iter()
        .map(|row| {
            let task = &row.task;
            let (status_icon, title_style) = match task.status {
                TaskStatus::Completed => (
                    "✔",
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::CROSSED_OUT),
                ),
                TaskStatus::Pending => ("☐", Style::default().add_modifier(Modifier::BOLD)),
            };

            let (marker, row_style) = match row.mode {
                RowMode::Normal => ("", Style::default()),
                RowMode::Editing => ("✎", Style::default().fg(Color::Yellow)),
                RowMode::PendingDelete => ("✖", Style::default().fg(Color::Red)),
                RowMode::Deleting => ("…", Style::default().fg(Color::DarkGray)),
            };

            let created = task.created_at.format("%m-%d").to_string();

            Row::new(vec![
                Span::raw(status_icon),
                Span::raw(marker),
                Span::raw(created),
                Span::styled(truncate(&task.title, TITLE_COLUMN_WIDTH), title_style),
            ])
            .style(row_style)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(3), // Status
            Constraint::Length(2), // Mode
            Constraint::Length(6), // Created
            Constraint::Min(10),   // Title
        ],
    )
    .header(Row::new(vec!["St", "", "Added", "Task"]).style(Style::default().fg(Color::Yellow)))
    .block(
        Block::default()
            .title(" Tasks ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded),
    )
    .row_highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol(">> ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn draw_detail_view(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Detail ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded);

    let Some(row) = app.selected_row() else {
        f.render_widget(block, area);
        return;
    };
    let task = &row.task;

    let mut detail_text = vec![
        Line::from(vec![
            Span::styled("Title: ", Style::default().fg(Color::Blue)),
            Span::styled(task.title.as_str(), Style::default().add_modifier(Modifier::BOLD)),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("ID: ", Style::default().fg(Color::DarkGray)),
            Span::raw(task.id.to_string()),
        ]),
        Line::from(vec![
            Span::styled("Status: ", Style::default().fg(Color::Blue)),
            Span::raw(task.status.as_str()),
        ]),
        Line::from(vec![
            Span::styled("Created: ", Style::default().fg(Color::Blue)),
            Span::raw(task.created_at.format("%Y-%m-%d %H:%M").to_string()),
        ]),
        Line::from(vec![
            Span::styled("Updated: ", Style::default().fg(Color::Blue)),
            Span::raw(task.updated_at.format("%Y-%m-%d %H:%M").to_string()),
        ]),
        Line::from(""),
    ];

    if let Some(desc) = &task.description {
        detail_text.push(Line::from(Span::styled(
            "Description:",
            Style::default().fg(Color::Blue),
        )));
        detail_text.push(Line::from(desc.as_str()));
    }

    let detail = Paragraph::new(detail_text)
        .block(block)
        .wrap(Wrap { trim: true });
    f.render_widget(detail, area);
}

fn draw_input(f: &mut Frame, app: &App, area: Rect) {
    let (title, style) = match app.input_mode {
        InputMode::Adding => (" New task ", Style::default().fg(Color::Yellow)),
        InputMode::Editing(_) => (" Edit title ", Style::default().fg(Color::Yellow)),
        InputMode::Normal => (" ", Style::default()),
    };

    let content = match (&app.input_mode, app.board.error()) {
        (InputMode::Normal, Some(error)) => {
            Line::from(Span::styled(error, Style::default().fg(Color::Red)))
        }
        (InputMode::Normal, None) => Line::from(""),
        _ => Line::from(app.input.as_str()),
    };

    let input = Paragraph::new(content).style(style).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded),
    );
    f.render_widget(input, area);

    if !matches!(app.input_mode, InputMode::Normal) {
        let before: String = app.input.chars().take(app.cursor_position).collect();
        let offset = u16::try_from(before.width()).unwrap_or(u16::MAX);
        f.set_cursor_position((area.x.saturating_add(1).saturating_add(offset), area.y + 1));
    }
}

/// Cuts `text` to at most `max` terminal columns, marking the cut with `…`.
fn truncate(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}
