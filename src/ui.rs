pub mod screen;
pub mod text_input;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Padding, Paragraph, Widget, Wrap},
};
use zenfocus::store::RecordStore;

use crate::{ui::text_input::TextInput, App, InputMode, Notice, NoticeKind, View};

const SIDEBAR_WIDTH: u16 = 18;

pub const ACCENT: Color = Color::Rgb(122, 160, 149);
pub const TEXT_DIM: Color = Color::Rgb(165, 165, 165);
pub const DANGER: Color = Color::Rgb(229, 115, 115);
pub const CARD: Color = Color::Rgb(51, 51, 51);

impl<S: RecordStore> Widget for &App<S> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(1)])
            .split(area);

        render_sidebar(self.view, columns[0], buf);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(columns[1]);

        screen::current_screen::<S>(self.view).render(self, rows[0], buf);
        render_legend(self, rows[1], buf);

        if let Some(notice) = &self.notice {
            render_notice(notice, area, buf);
        }
    }
}

fn render_sidebar(current: View, area: Rect, buf: &mut Buffer) {
    let block = Block::default()
        .borders(Borders::RIGHT)
        .border_style(Style::default().fg(CARD));
    let inner = block.inner(area);
    block.render(area, buf);

    let mut lines = vec![
        Line::from(Span::styled(
            "ZenFocus",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )),
        Line::default(),
    ];
    for (i, view) in View::ALL.iter().enumerate() {
        let label = format!("{} {}  {}", i + 1, view.icon(), view);
        let style = if *view == current {
            Style::default().fg(Color::Black).bg(ACCENT)
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(label, style)));
    }

    Paragraph::new(lines)
        .alignment(Alignment::Left)
        .block(Block::default().padding(Padding::new(1, 0, 1, 0)))
        .render(inner, buf);
}

fn render_legend<S: RecordStore>(app: &App<S>, area: Rect, buf: &mut Buffer) {
    let text = match (app.input_mode, app.view) {
        (InputMode::EditingTask, _) => "(enter) add / (esc) done",
        (InputMode::EditingNotes, _) => "(esc) stop editing / (F1-F4) switch view",
        (InputMode::EditingLinkName, _) => "(tab) url / (esc) cancel",
        (InputMode::EditingLinkUrl, _) => "(enter) add / (tab) name / (esc) cancel",
        (InputMode::Normal, View::Timer) => {
            "(space) start/pause / (r)eset / (f)ocus (s)hort (l)ong / (tab) view / (q)uit"
        }
        (InputMode::Normal, View::Tasks) => {
            "(a)dd / (space) toggle / (d)elete / (j/k) move / (tab) view / (q)uit"
        }
        (InputMode::Normal, View::Notes) => "(i) edit / (ctrl-s) save / (tab) view / (q)uit",
        (InputMode::Normal, View::Links) => {
            "(a)dd / (o)pen / (d)elete / (j/k) move / (tab) view / (q)uit"
        }
    };

    Paragraph::new(Span::styled(
        text,
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .render(area, buf);
}

fn render_notice(notice: &Notice, area: Rect, buf: &mut Buffer) {
    let (title, color) = match notice.kind {
        NoticeKind::Info => ("ZenFocus", ACCENT),
        NoticeKind::Warning => ("Input Error", DANGER),
    };
    let popup = centered_rect(notice_width(&notice.text), 5, area);

    Clear.render(popup, buf);
    Paragraph::new(vec![
        Line::from(Span::styled(
            notice.text.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from(Span::styled(
            "press any key",
            Style::default().fg(TEXT_DIM).add_modifier(Modifier::ITALIC),
        )),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color))
            .title(title),
    )
    .render(popup, buf);
}

/// A single-line input box; shows the caret when focused, the placeholder when empty
pub(crate) fn render_input(
    input: &TextInput,
    placeholder: &str,
    focused: bool,
    area: Rect,
    buf: &mut Buffer,
) {
    let border = if focused { ACCENT } else { TEXT_DIM };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));
    let inner_width = block.inner(area).width as usize;

    let content = if focused {
        Span::raw(input.visible(inner_width))
    } else if input.is_empty() {
        Span::styled(placeholder, Style::default().fg(TEXT_DIM))
    } else {
        Span::raw(input.value())
    };

    Paragraph::new(content).block(block).render(area, buf);
}

pub(crate) fn render_heading(text: &str, area: Rect, buf: &mut Buffer) {
    Paragraph::new(Span::styled(
        text,
        Style::default().add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
    .render(area, buf);
}

/// Text width plus border and padding, at least 30 columns
fn notice_width(text: &str) -> u16 {
    u16::try_from(text.chars().count())
        .unwrap_or(u16::MAX)
        .saturating_add(8)
        .max(30)
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
