use std::io::Stdout;
use std::sync::LazyLock;

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    queue,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
};
use regex::Regex;
use unicode_width::UnicodeWidthChar;

use crate::core::Slot;
use crate::keybinding::Action;
use crate::state::{Rect, Workspace};

const TAB_WIDTH: usize = 4;

static HIDDEN_ELEMENTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(script|style|head|title)\b.*?</(script|style|head|title)\s*>")
        .expect("Invalid hidden element regex")
});
static BLOCK_BREAKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<(br|/p|/div|/h[1-6]|/li|/tr|/ul|/ol)\b[^>]*>")
        .expect("Invalid block break regex")
});
static TAGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("Invalid tag regex"));

pub fn render(workspace: &Workspace, stdout: &mut Stdout) -> std::io::Result<()> {
    queue!(stdout, Hide)?;

    let layout = workspace.layout();
    render_top_bar(workspace, stdout, layout.top_bar)?;
    render_preview(workspace, stdout, layout.preview)?;
    if let Some(column) = layout.divider {
        render_divider(stdout, column, layout.preview)?;
    }
    if let Some(bar) = layout.settings_bar {
        render_settings_bar(workspace, stdout, bar)?;
    }
    render_editor(workspace, stdout, layout.editor)?;
    render_status(workspace, stdout, layout.status)?;

    if let Some((x, y)) = cursor_cell(workspace, layout.editor) {
        queue!(stdout, MoveTo(x, y), Show)?;
    }

    Ok(())
}

fn render_top_bar(workspace: &Workspace, stdout: &mut Stdout, area: Rect) -> std::io::Result<()> {
    if area.height == 0 {
        return Ok(());
    }
    queue!(
        stdout,
        MoveTo(area.x, area.y),
        SetBackgroundColor(Color::White),
        SetForegroundColor(Color::Black)
    )?;

    let mode = workspace.core().mode();
    let mut used = 0;
    for slot in Slot::ALL {
        let label = format!(" {} ", slot.label());
        if slot == mode {
            queue!(stdout, SetAttribute(Attribute::Reverse))?;
        }
        queue!(stdout, Print(&label))?;
        if slot == mode {
            queue!(stdout, SetAttribute(Attribute::NoReverse))?;
        }
        used += label.chars().count();
    }

    let save_hint = key_hint(workspace, Action::Save, "Save & Remix");
    let width = usize::from(area.width);
    let padding = width.saturating_sub(used + save_hint.chars().count());
    queue!(stdout, Print(" ".repeat(padding)))?;
    queue!(stdout, Print(fit(&save_hint, width.saturating_sub(used))))?;
    queue!(stdout, ResetColor, SetAttribute(Attribute::Reset))?;
    Ok(())
}

fn render_preview(workspace: &Workspace, stdout: &mut Stdout, area: Rect) -> std::io::Result<()> {
    if area.width == 0 || area.height == 0 {
        return Ok(());
    }
    let width = usize::from(area.width);
    let frame = workspace.preview();
    let live = frame.live_markup();

    let header = match (&live, frame.current()) {
        (Some(_), _) => "* live preview (unsaved)".to_string(),
        (None, Some(url)) => url.to_string(),
        (None, None) => String::new(),
    };
    queue!(
        stdout,
        MoveTo(area.x, area.y),
        SetForegroundColor(Color::DarkGrey),
        Print(fit(&header, width)),
        ResetColor
    )?;

    let body = match live {
        Some(markup) => preview_text(&markup),
        None => preview_text(&workspace.core().value_of(Slot::Markup)),
    };
    for row in 1..area.height {
        let line = body.get(usize::from(row - 1)).map_or("", String::as_str);
        queue!(stdout, MoveTo(area.x, area.y + row), Print(fit(line, width)))?;
    }
    Ok(())
}

fn render_divider(stdout: &mut Stdout, column: u16, body: Rect) -> std::io::Result<()> {
    queue!(stdout, SetForegroundColor(Color::DarkGrey))?;
    for row in 0..body.height {
        queue!(stdout, MoveTo(column, body.y + row), Print('│'))?;
    }
    queue!(stdout, ResetColor)?;
    Ok(())
}

fn render_settings_bar(workspace: &Workspace, stdout: &mut Stdout, area: Rect) -> std::io::Result<()> {
    let state = if workspace.settings().as_you_type { "on" } else { "off" };
    let label = key_hint(
        workspace,
        Action::ToggleAsYouType,
        &format!("Reload as you type ({})", state),
    );
    queue!(
        stdout,
        MoveTo(area.x, area.y),
        SetAttribute(Attribute::Bold),
        Print(fit(&label, usize::from(area.width))),
        SetAttribute(Attribute::Reset)
    )?;
    Ok(())
}

fn render_editor(workspace: &Workspace, stdout: &mut Stdout, area: Rect) -> std::io::Result<()> {
    if area.width == 0 || area.height == 0 {
        return Ok(());
    }
    let width = usize::from(area.width);

    let surface = match workspace.core().surface() {
        Some(surface) => surface,
        None => {
            // The core stays unmounted until its backend has booted.
            queue!(
                stdout,
                MoveTo(area.x, area.y),
                SetAttribute(Attribute::Italic),
                Print(fit("Getting your editor ready...", width)),
                SetAttribute(Attribute::Reset)
            )?;
            for row in 1..area.height {
                queue!(stdout, MoveTo(area.x, area.y + row), Print(" ".repeat(width)))?;
            }
            return Ok(());
        }
    };

    let lines = surface.visible_lines();
    for row in 0..area.height {
        queue!(stdout, MoveTo(area.x, area.y + row))?;
        match lines.get(usize::from(row)) {
            Some(line) => queue!(stdout, Print(fit(line, width)))?,
            None => queue!(
                stdout,
                SetForegroundColor(Color::DarkGrey),
                Print(fit("~", width)),
                ResetColor
            )?,
        }
    }
    Ok(())
}

fn render_status(workspace: &Workspace, stdout: &mut Stdout, area: Rect) -> std::io::Result<()> {
    if area.height == 0 {
        return Ok(());
    }
    let width = usize::from(area.width);

    let left = match workspace.status() {
        Some(status) => status.to_string(),
        None => [
            key_hint(workspace, Action::SwitchMode(Slot::Markup), "HTML"),
            key_hint(workspace, Action::SwitchMode(Slot::Script), "JS"),
            key_hint(workspace, Action::RefreshPreview, "Refresh"),
            key_hint(workspace, Action::ToggleSettings, "Settings"),
            key_hint(workspace, Action::Quit, "Quit"),
        ]
        .join("  "),
    };

    let core = workspace.core();
    let position = core
        .surface()
        .map(|surface| surface.cursor_position())
        .unwrap_or_default();
    let dirty = if workspace.has_unsaved_changes() { "**" } else { "--" };
    let right = format!(
        " {} {} L{}:C{} ",
        dirty,
        core.kind(),
        position.line + 1,
        position.column + 1
    );

    let left_width = width.saturating_sub(right.chars().count());
    queue!(
        stdout,
        MoveTo(area.x, area.y),
        SetBackgroundColor(Color::White),
        SetForegroundColor(Color::Black),
        Print(fit(&left, left_width)),
        Print(fit(&right, width - left_width)),
        ResetColor
    )?;
    Ok(())
}

fn key_hint(workspace: &Workspace, action: Action, label: &str) -> String {
    match workspace.keymap().key_for(action) {
        Some(key) => format!("{} {}", key, label),
        None => label.to_string(),
    }
}

fn cursor_cell(workspace: &Workspace, area: Rect) -> Option<(u16, u16)> {
    if area.width == 0 || area.height == 0 {
        return None;
    }
    let surface = workspace.core().surface()?;
    let position = surface.cursor_position();
    let row = position.line.checked_sub(surface.scroll_line())?;
    if row >= usize::from(area.height) {
        return None;
    }
    let lines = surface.visible_lines();
    let prefix: String = lines
        .get(row)
        .map(|line| line.chars().take(position.column).collect())
        .unwrap_or_default();
    let column = display_width(&prefix).min(usize::from(area.width) - 1);
    Some((area.x + column as u16, area.y + row as u16))
}

fn display_width(text: &str) -> usize {
    text.chars()
        .map(|c| match c {
            '\t' => TAB_WIDTH,
            c => c.width().unwrap_or(0),
        })
        .sum()
}

pub(crate) fn fit(text: &str, width: usize) -> String {
    let mut out = String::with_capacity(width);
    let mut used = 0;
    for c in text.chars() {
        let (piece, cells) = match c {
            '\t' => (" ".repeat(TAB_WIDTH), TAB_WIDTH),
            '\n' | '\r' => continue,
            c => (c.to_string(), c.width().unwrap_or(0)),
        };
        if used + cells > width {
            break;
        }
        out.push_str(&piece);
        used += cells;
    }
    out.push_str(&" ".repeat(width - used));
    out
}

pub(crate) fn preview_text(markup: &str) -> Vec<String> {
    let text = HIDDEN_ELEMENTS.replace_all(markup, "");
    let text = BLOCK_BREAKS.replace_all(&text, "\n");
    let text = TAGS.replace_all(&text, "");
    let text = text
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&");

    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::live_document;

    #[test]
    fn test_fit_clips_and_pads() {
        assert_eq!(fit("abc", 5), "abc  ");
        assert_eq!(fit("abcdef", 3), "abc");
        assert_eq!(fit("\tx", 6), "    x ");
        // Wide characters never straddle the edge.
        assert_eq!(fit("日本語", 5), "日本 ");
    }

    #[test]
    fn test_preview_text_of_live_document() {
        let doc = live_document(
            "<h1>Hello &amp; welcome</h1><p>first</p><p>second <b>bold</b></p>",
            "console.log('hidden')",
            "https://cdn/rt.js",
        );
        assert_eq!(
            preview_text(&doc),
            vec!["Hello & welcome", "first", "second bold"]
        );
    }

    #[test]
    fn test_preview_text_plain_markup() {
        assert_eq!(preview_text("just text"), vec!["just text"]);
        assert!(preview_text("<div></div>").is_empty());
    }
}
