//! Dialog rendering and input loops.
//!
//! Four primitives cover the whole first-boot flow: an input box, a masked
//! password box, a message box, and a menu. Each draws a centered dialog
//! over the console backdrop and runs its own small event loop. Esc asks
//! for quit confirmation, like the classic first-boot dialogs.

use std::io::Stdout;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Rect};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap};
use ratatui::{Frame, Terminal};

use crate::error::Result;
use crate::theme::Styles;

pub type Term = Terminal<CrosstermBackend<Stdout>>;

/// Maximum dialog width in columns.
const DIALOG_WIDTH: u16 = 60;

/// Outcome of a dialog that can be cancelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogOutcome {
    Submitted(String),
    Cancelled,
}

/// Prompt for a line of input with an editable initial value.
pub fn input_box(term: &mut Term, title: &str, text: &str, init: &str) -> Result<DialogOutcome> {
    prompt_line(term, title, text, init, false)
}

/// Prompt for a password; input is masked.
pub fn password_box(term: &mut Term, title: &str, text: &str) -> Result<DialogOutcome> {
    prompt_line(term, title, text, "", true)
}

fn prompt_line(
    term: &mut Term,
    title: &str,
    text: &str,
    init: &str,
    mask: bool,
) -> Result<DialogOutcome> {
    let mut value = init.to_string();

    loop {
        term.draw(|f| {
            let display = if mask {
                "*".repeat(value.chars().count())
            } else {
                value.clone()
            };
            render_prompt(f, title, text, &display);
        })?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Enter => return Ok(DialogOutcome::Submitted(value)),
                KeyCode::Backspace => {
                    value.pop();
                }
                KeyCode::Esc => {
                    if confirm_quit(term)? {
                        return Ok(DialogOutcome::Cancelled);
                    }
                }
                KeyCode::Char(c) => value.push(c),
                _ => {}
            }
        }
    }
}

/// Show a message until the user presses Enter or Esc.
pub fn message_box(term: &mut Term, title: &str, text: &str) -> Result<()> {
    message_box_styled(term, title, text, false)
}

/// Show an error message until the user presses Enter or Esc.
pub fn error_box(term: &mut Term, text: &str) -> Result<()> {
    message_box_styled(term, "Error", text, true)
}

fn message_box_styled(term: &mut Term, title: &str, text: &str, error: bool) -> Result<()> {
    loop {
        term.draw(|f| render_message(f, title, text, error))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') => return Ok(()),
                _ => {}
            }
        }
    }
}

/// Choose one of `choices` with the arrow keys.
pub fn menu(
    term: &mut Term,
    title: &str,
    text: &str,
    choices: &[&str],
) -> Result<Option<usize>> {
    let mut selected = 0usize;

    loop {
        term.draw(|f| render_menu(f, title, text, choices, selected))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Up | KeyCode::Char('k') => {
                    selected = selected.saturating_sub(1);
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    if selected + 1 < choices.len() {
                        selected += 1;
                    }
                }
                KeyCode::Enter => return Ok(Some(selected)),
                KeyCode::Esc => {
                    if confirm_quit(term)? {
                        return Ok(None);
                    }
                }
                _ => {}
            }
        }
    }
}

/// "Do you really want to quit?" — Esc anywhere lands here first.
fn confirm_quit(term: &mut Term) -> Result<bool> {
    let mut yes = false;

    loop {
        term.draw(|f| render_confirm(f, yes))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Left | KeyCode::Right | KeyCode::Tab => yes = !yes,
                KeyCode::Char('y') | KeyCode::Char('Y') => return Ok(true),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => return Ok(false),
                KeyCode::Enter => return Ok(yes),
                _ => {}
            }
        }
    }
}

// ============================================================================
// Rendering
// ============================================================================

fn dialog_rect(area: Rect, height: u16) -> Rect {
    let width = DIALOG_WIDTH
        .min(area.width.saturating_sub(4))
        .max(20)
        .min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn draw_frame(f: &mut Frame, title: &str, height: u16, error: bool) -> Rect {
    let area = f.area();

    // Console backdrop behind the dialog
    f.render_widget(Block::default().style(Styles::backdrop()), area);

    let rect = dialog_rect(area, height);
    f.render_widget(Clear, rect);

    let title_style = if error {
        Styles::error_title()
    } else {
        Styles::title()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", title))
        .title_style(title_style)
        .style(Styles::dialog());
    let inner = block.inner(rect);
    f.render_widget(block, rect);
    inner
}

fn render_prompt(f: &mut Frame, title: &str, text: &str, display: &str) {
    let inner = draw_frame(f, title, 9, false);
    if inner.height < 4 {
        return;
    }

    let text_area = Rect::new(inner.x, inner.y, inner.width, inner.height - 3);
    let input_area = Rect::new(inner.x, inner.y + inner.height - 3, inner.width, 1);
    let hint_area = Rect::new(inner.x, inner.y + inner.height - 1, inner.width, 1);

    f.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }), text_area);
    f.render_widget(
        Paragraph::new(format!(" {} ", display)).style(Styles::input()),
        input_area,
    );
    f.render_widget(
        Paragraph::new(Line::from("Enter: apply   Esc: quit").style(Styles::hint()))
            .alignment(Alignment::Center),
        hint_area,
    );
}

fn render_message(f: &mut Frame, title: &str, text: &str, error: bool) {
    // Grow with the message like the old dialog height calculation did
    let height = 6 + (text.len() as u16 / DIALOG_WIDTH) + text.matches('\n').count() as u16;
    let inner = draw_frame(f, title, height, error);
    if inner.height < 2 {
        return;
    }

    let text_area = Rect::new(inner.x, inner.y, inner.width, inner.height - 1);
    let hint_area = Rect::new(inner.x, inner.y + inner.height - 1, inner.width, 1);

    f.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }), text_area);
    f.render_widget(
        Paragraph::new(Line::from("Press Enter to continue").style(Styles::hint()))
            .alignment(Alignment::Center),
        hint_area,
    );
}

fn render_menu(f: &mut Frame, title: &str, text: &str, choices: &[&str], selected: usize) {
    let height = 7 + choices.len() as u16;
    let inner = draw_frame(f, title, height, false);
    if inner.height < 4 {
        return;
    }

    let text_area = Rect::new(inner.x, inner.y, inner.width, 2);
    let list_area = Rect::new(
        inner.x,
        inner.y + 2,
        inner.width,
        inner.height.saturating_sub(3),
    );
    let hint_area = Rect::new(inner.x, inner.y + inner.height - 1, inner.width, 1);

    f.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }), text_area);

    let items: Vec<ListItem> = choices
        .iter()
        .enumerate()
        .map(|(i, choice)| {
            let item = ListItem::new(format!("  {}", choice));
            if i == selected {
                item.style(Styles::selected())
            } else {
                item
            }
        })
        .collect();
    f.render_widget(List::new(items), list_area);

    f.render_widget(
        Paragraph::new(Line::from("Up/Down: select   Enter: apply").style(Styles::hint()))
            .alignment(Alignment::Center),
        hint_area,
    );
}

fn render_confirm(f: &mut Frame, yes: bool) {
    let inner = draw_frame(f, "Quit", 7, false);
    if inner.height < 3 {
        return;
    }

    let text_area = Rect::new(inner.x, inner.y, inner.width, 2);
    let buttons_area = Rect::new(inner.x, inner.y + inner.height - 2, inner.width, 1);

    f.render_widget(
        Paragraph::new("Do you really want to quit?").wrap(Wrap { trim: true }),
        text_area,
    );

    let yes_label = if yes { "[ Yes ]" } else { "  Yes  " };
    let no_label = if yes { "  No  " } else { "[ No ]" };
    f.render_widget(
        Paragraph::new(format!("{}    {}", yes_label, no_label))
            .alignment(Alignment::Center),
        buttons_area,
    );
}
