mod theme;

use crate::app::{AppModel, INPUT_PLACEHOLDER, LineEditor};
use crate::domain::{COMMAND_REFERENCE, EntryKind, TranscriptEntry};
use ratatui::prelude::*;
use ratatui::widgets::*;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const WINDOW_TITLE: &str = "orbit-ops@terminal ~ $";
const KEY_HINTS: &str = "Tab complete · PgUp/PgDn scroll · Esc quit";

pub fn render(frame: &mut Frame, model: &AppModel) {
    let full_area = frame.area();
    if full_area.width == 0 || full_area.height == 0 {
        return;
    }

    frame.render_widget(
        Block::default().style(Style::default().bg(theme::BG)),
        full_area,
    );

    let footer_height = if model.notice.is_some() { 2 } else { 1 };
    let [window_area, footer_area] =
        Layout::vertical([Constraint::Min(3), Constraint::Length(footer_height)])
            .areas(full_area);

    render_window(frame, window_area, model);
    render_footer(frame, footer_area, model);
}

fn render_window(frame: &mut Frame, area: Rect, model: &AppModel) {
    let controls = Line::from(vec![
        Span::styled("● ", Style::default().fg(theme::DOT_CLOSE)),
        Span::styled("● ", Style::default().fg(theme::DOT_WAIT)),
        Span::styled("● ", Style::default().fg(theme::PROMPT)),
        Span::styled(WINDOW_TITLE, Style::default().fg(theme::MUTED)),
        Span::raw(" "),
    ]);

    let dot_color = if model.submitting {
        theme::DOT_WAIT
    } else {
        theme::PROMPT
    };
    let status = Line::from(vec![
        Span::styled("● ", Style::default().fg(dot_color)),
        Span::styled(model.status(), Style::default().fg(theme::MUTED)),
        Span::raw(" "),
    ])
    .right_aligned();

    let block = Block::bordered()
        .border_style(Style::default().fg(theme::BORDER))
        .style(Style::default().bg(theme::SURFACE))
        .title_top(controls)
        .title_top(status)
        .padding(Padding::horizontal(1));

    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let [body_area, input_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(inner);
    render_transcript(frame, body_area, model);
    render_input(frame, input_area, model);
}

fn render_transcript(frame: &mut Frame, area: Rect, model: &AppModel) {
    if area.width == 0 || area.height == 0 {
        return;
    }

    let mut lines: Vec<Line> = model
        .transcript
        .entries()
        .iter()
        .map(transcript_line)
        .collect();
    if let Some(prompt) = model.pending_prompt() {
        lines.push(Line::styled(prompt, Style::default().fg(theme::FG)));
    }

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    let offset = scroll_offset(
        paragraph.line_count(area.width),
        area.height as usize,
        model.scroll_back,
    );
    frame.render_widget(paragraph.scroll((offset, 0)), area);
}

/// Top row to show so the newest line sits at the bottom, minus however far
/// the user scrolled back.
fn scroll_offset(total_lines: usize, height: usize, scroll_back: usize) -> u16 {
    let max_scroll = total_lines.saturating_sub(height);
    let offset = max_scroll - scroll_back.min(max_scroll);
    u16::try_from(offset).unwrap_or(u16::MAX)
}

fn transcript_line(entry: &TranscriptEntry) -> Line<'_> {
    match entry.kind {
        EntryKind::UserInput => Line::from(vec![
            Span::styled("> ", Style::default().fg(theme::PROMPT)),
            Span::styled(entry.text.as_str(), Style::default().fg(theme::SECONDARY)),
        ]),
        EntryKind::SystemMessage => {
            let color = if entry.text.starts_with('⚠') {
                theme::DOT_WAIT
            } else if entry.text.starts_with('✓') {
                theme::PROMPT
            } else {
                theme::FG
            };
            Line::styled(entry.text.as_str(), Style::default().fg(color))
        }
    }
}

fn render_input(frame: &mut Frame, area: Rect, model: &AppModel) {
    let prompt = format!("{} ", model.input_prompt());
    let prompt_width = UnicodeWidthStr::width(prompt.as_str()) as u16;
    let field_width = area.width.saturating_sub(prompt_width) as usize;
    let busy = model.is_busy();

    let mut spans = vec![Span::styled(prompt, Style::default().fg(theme::PROMPT))];
    let (visible, cursor_offset) = visible_input(&model.input, field_width);
    // A busy session shows the bare prompt, like a disabled field.
    if !busy {
        if model.input.is_empty() {
            spans.push(Span::styled(
                INPUT_PLACEHOLDER,
                Style::default().fg(theme::DIM),
            ));
        } else {
            spans.push(Span::styled(visible, Style::default().fg(theme::SECONDARY)));
        }
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);

    if !busy && field_width > 0 {
        let x = area
            .x
            .saturating_add(prompt_width)
            .saturating_add(cursor_offset as u16);
        frame.set_cursor_position(Position::new(x, area.y));
    }
}

/// Slice of the input that fits `width` cells with the cursor on screen, and
/// the cursor's cell offset inside that slice.
fn visible_input(editor: &LineEditor, width: usize) -> (String, usize) {
    if width == 0 {
        return (String::new(), 0);
    }

    let chars: Vec<char> = editor.text.chars().collect();
    let cursor = editor.cursor_col.min(chars.len());
    let cells = |slice: &[char]| -> usize {
        slice
            .iter()
            .map(|ch| UnicodeWidthChar::width(*ch).unwrap_or(0))
            .sum()
    };

    let mut start = 0usize;
    while start < cursor && cells(&chars[start..cursor]) >= width {
        start += 1;
    }

    let mut out = String::new();
    let mut used = 0usize;
    for ch in &chars[start..] {
        let w = UnicodeWidthChar::width(*ch).unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        out.push(*ch);
    }
    (out, cells(&chars[start..cursor]))
}

fn render_footer(frame: &mut Frame, area: Rect, model: &AppModel) {
    if area.height == 0 {
        return;
    }

    let mut spans: Vec<Span> = Vec::new();
    for (command, description) in COMMAND_REFERENCE {
        spans.push(Span::styled(
            command,
            Style::default()
                .fg(theme::SECONDARY)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(
            format!(" {description}  "),
            Style::default().fg(theme::MUTED),
        ));
    }
    spans.push(Span::styled(KEY_HINTS, Style::default().fg(theme::DIM)));

    let mut lines = vec![Line::from(spans)];
    if let Some(notice) = &model.notice {
        lines.push(Line::styled(
            notice.as_str(),
            Style::default().fg(theme::ERROR),
        ));
    }

    frame.render_widget(
        Paragraph::new(lines).style(Style::default().bg(theme::BAR_BG)),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{Pacing, SessionSettings};
    use crate::domain::RelayIdentity;
    use ratatui::backend::TestBackend;
    use std::time::Instant;

    fn ready_model() -> AppModel {
        let settings = SessionSettings {
            identity: RelayIdentity::default(),
            to_name: "Orbit-Ops Team".to_string(),
            fallback_email: "orbitopsdev@gmail.com".to_string(),
            pacing: Pacing::instant(),
        };
        let mut model = AppModel::new(settings);
        model.tick(Instant::now());
        model
    }

    fn settle(model: &mut AppModel) {
        let now = Instant::now();
        for _ in 0..16 {
            model.tick(now);
        }
    }

    fn render_to_string(model: &AppModel, width: u16, height: u16) -> String {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).expect("terminal");
        terminal
            .draw(|frame| render(frame, model))
            .expect("draw");
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn idle_window_shows_header_greeting_and_placeholder() {
        let model = ready_model();
        let screen = render_to_string(&model, 100, 12);
        assert!(screen.contains(WINDOW_TITLE));
        assert!(screen.contains("Ready"));
        assert!(screen.contains("Welcome to Orbit-Ops Terminal."));
        assert!(screen.contains("> Type a command..."));
        assert!(screen.contains("contact Start the contact form"));
    }

    #[test]
    fn wizard_shows_pending_prompt_and_question_mark() {
        let mut model = ready_model();
        assert!(model.submit_line("contact"));
        settle(&mut model);
        let screen = render_to_string(&model, 100, 12);
        assert!(screen.contains("> contact"));
        assert!(screen.contains("Please enter your full name:"));
        assert!(screen.contains("? Type a command..."));
    }

    #[test]
    fn busy_window_hides_prompt_and_reports_status() {
        let mut model = ready_model();
        assert!(model.submit_line("help"));
        let screen = render_to_string(&model, 100, 12);
        assert!(screen.contains("Processing..."));
        assert!(!screen.contains("Type a command..."));
    }

    #[test]
    fn notice_is_rendered_in_footer() {
        let model = ready_model().with_notice(Some("Logging disabled: boom".to_string()));
        let screen = render_to_string(&model, 100, 12);
        assert!(screen.contains("Logging disabled: boom"));
    }

    #[test]
    fn scroll_offset_follows_bottom_and_clamps() {
        assert_eq!(scroll_offset(5, 10, 0), 0);
        assert_eq!(scroll_offset(30, 10, 0), 20);
        assert_eq!(scroll_offset(30, 10, 5), 15);
        assert_eq!(scroll_offset(30, 10, 500), 0);
    }

    #[test]
    fn visible_input_keeps_cursor_on_screen() {
        let editor = LineEditor::from_text("abcdefghij");
        let (visible, cursor) = visible_input(&editor, 4);
        assert_eq!(visible, "hij");
        assert_eq!(cursor, 3);

        let mut editor = LineEditor::from_text("abcdefghij");
        editor.move_home();
        let (visible, cursor) = visible_input(&editor, 4);
        assert_eq!(visible, "abcd");
        assert_eq!(cursor, 0);
    }
}
