use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, Gauge, List, ListItem, ListState, Paragraph, StatefulWidget, Widget, Wrap,
    },
};
use zenfocus::{
    store::RecordStore,
    timer::{TimerMode, TimerPhase},
};

use crate::{
    ui::{render_heading, render_input, ACCENT, CARD, DANGER, TEXT_DIM},
    App, InputMode, View,
};

/// A UI Screen boundary: renders one view into the main area
pub trait Screen<S: RecordStore> {
    fn render(&self, app: &App<S>, area: Rect, buf: &mut Buffer);
}

/// Countdown, mode switcher, and today's session count
pub struct TimerScreen;

impl<S: RecordStore> Screen<S> for TimerScreen {
    fn render(&self, app: &App<S>, area: Rect, buf: &mut Buffer) {
        let timer = app.controller.timer();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(1), // title
                Constraint::Length(1), // stats
                Constraint::Length(1),
                Constraint::Length(7), // card
                Constraint::Length(1),
                Constraint::Length(1), // toggle hint
                Constraint::Length(1), // modes
                Constraint::Min(0),
            ])
            .split(area);

        render_heading("⏱ Focus Timer", chunks[0], buf);

        Paragraph::new(Span::styled(
            format!("Sessions Completed: {}", app.controller.sessions_completed()),
            Style::default().fg(TEXT_DIM),
        ))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

        let card = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(CARD));
        let card_inner = card.inner(chunks[3]);
        card.render(chunks[3], buf);

        let card_rows = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(2)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(card_inner);

        Paragraph::new(Span::styled(timer.mode().to_string(), Style::default().fg(ACCENT)))
            .alignment(Alignment::Center)
            .render(card_rows[0], buf);

        Paragraph::new(Span::styled(
            timer.formatted(),
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center)
        .render(card_rows[2], buf);

        Gauge::default()
            .gauge_style(Style::default().fg(ACCENT).bg(CARD))
            .ratio(timer.progress().clamp(0.0, 1.0))
            .label("")
            .render(card_rows[4], buf);

        let toggle_label = match timer.phase() {
            TimerPhase::Running => "Pause",
            TimerPhase::Paused => "Resume",
            TimerPhase::Idle => "Start Focus",
        };
        Paragraph::new(Line::from(vec![
            Span::styled(
                format!("[space] {toggle_label}"),
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            ),
            Span::raw("    "),
            Span::styled("[r] Reset", Style::default().fg(TEXT_DIM)),
        ]))
        .alignment(Alignment::Center)
        .render(chunks[5], buf);

        let config = app.controller.config();
        let mut spans = Vec::new();
        for (mode, key) in TimerMode::ALL.iter().zip(['f', 's', 'l']) {
            let style = if *mode == timer.mode() {
                Style::default().fg(Color::Black).bg(ACCENT)
            } else {
                Style::default().bg(CARD)
            };
            spans.push(Span::styled(
                format!(" [{key}] {} {}m ", mode, config.minutes_for(*mode)),
                style,
            ));
            spans.push(Span::raw(" "));
        }
        Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .render(chunks[6], buf);
    }
}

/// Task entry box over the checklist
pub struct TasksScreen;

impl<S: RecordStore> Screen<S> for TasksScreen {
    fn render(&self, app: &App<S>, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Min(3),
            ])
            .split(area);

        render_heading("✅ Tasks", chunks[0], buf);
        render_input(
            &app.task_input,
            "Add a new task...",
            app.input_mode == InputMode::EditingTask,
            chunks[1],
            buf,
        );

        let items: Vec<ListItem> = app
            .controller
            .tasks()
            .iter()
            .map(|task| {
                let (mark, style) = if task.completed {
                    (
                        "[x]",
                        Style::default()
                            .fg(TEXT_DIM)
                            .add_modifier(Modifier::CROSSED_OUT),
                    )
                } else {
                    ("[ ]", Style::default())
                };
                ListItem::new(Line::from(vec![
                    Span::styled(format!("{mark} "), Style::default().fg(ACCENT)),
                    Span::styled(task.text.as_str(), style),
                ]))
            })
            .collect();

        render_list(items, "To-Do List", app.selected_task, chunks[2], buf);
    }
}

/// Free text pad
pub struct NotesScreen;

impl<S: RecordStore> Screen<S> for NotesScreen {
    fn render(&self, app: &App<S>, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([Constraint::Length(1), Constraint::Min(3)])
            .split(area);

        render_heading("📝 Quick Notes", chunks[0], buf);

        let editing = app.input_mode == InputMode::EditingNotes;
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(if editing { ACCENT } else { CARD }))
            .title(if editing { "editing" } else { "" });
        let visible_lines = block.inner(chunks[1]).height as usize;

        let text = if editing {
            app.notes_input.with_caret()
        } else {
            app.notes_input.value().to_string()
        };
        // keep the caret line on screen; wrapped lines are not accounted for
        let scroll = app
            .notes_input
            .caret_line()
            .saturating_sub(visible_lines.saturating_sub(1));

        Paragraph::new(text)
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((u16::try_from(scroll).unwrap_or(u16::MAX), 0))
            .render(chunks[1], buf);
    }
}

/// Bookmark form over the bookmark list
pub struct LinksScreen;

impl<S: RecordStore> Screen<S> for LinksScreen {
    fn render(&self, app: &App<S>, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Min(3),
            ])
            .split(area);

        render_heading("🔗 Productive Links", chunks[0], buf);

        let form = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(chunks[1]);
        render_input(
            &app.link_name_input,
            "Name",
            app.input_mode == InputMode::EditingLinkName,
            form[0],
            buf,
        );
        render_input(
            &app.link_url_input,
            "URL",
            app.input_mode == InputMode::EditingLinkUrl,
            form[1],
            buf,
        );

        let items: Vec<ListItem> = app
            .controller
            .links()
            .iter()
            .map(|link| {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        link.name.as_str(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::raw("  "),
                    Span::styled(link.url.as_str(), Style::default().fg(TEXT_DIM)),
                ]))
            })
            .collect();

        render_list(items, "Bookmarks", app.selected_link, chunks[2], buf);
    }
}

fn render_list(items: Vec<ListItem>, title: &str, selected: usize, area: Rect, buf: &mut Buffer) {
    let empty = items.is_empty();
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(CARD))
                .title(title),
        )
        .highlight_style(Style::default().bg(CARD).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    let mut state = ListState::default().with_selected(if empty { None } else { Some(selected) });
    StatefulWidget::render(list, area, buf, &mut state);

    if empty {
        let hint = Rect {
            x: area.x + 2,
            y: area.y + 1,
            width: area.width.saturating_sub(4),
            height: 1u16.min(area.height.saturating_sub(2)),
        };
        Paragraph::new(Span::styled("nothing here yet", Style::default().fg(DANGER)))
            .render(hint, buf);
    }
}

/// Helper to construct the screen for the current view
pub fn current_screen<S: RecordStore>(view: View) -> Box<dyn Screen<S>> {
    match view {
        View::Timer => Box::new(TimerScreen),
        View::Tasks => Box::new(TasksScreen),
        View::Notes => Box::new(NotesScreen),
        View::Links => Box::new(LinksScreen),
    }
}
