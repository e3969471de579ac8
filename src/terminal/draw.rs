use std::{io::Write, time::Instant};

use crossterm::{
    cursor::MoveTo,
    queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};

use crate::board::{Board, Connection};

const GLYPH_ROWS: usize = 5;

// 3x5 block glyphs for the characters a heat/event number can contain.
fn glyph(c: char) -> Option<[&'static str; GLYPH_ROWS]> {
    Some(match c {
        '0' => ["███", "█ █", "█ █", "█ █", "███"],
        '1' => [" █ ", "██ ", " █ ", " █ ", "███"],
        '2' => ["███", "  █", "███", "█  ", "███"],
        '3' => ["███", "  █", "███", "  █", "███"],
        '4' => ["█ █", "█ █", "███", "  █", "  █"],
        '5' => ["███", "█  ", "███", "  █", "███"],
        '6' => ["███", "█  ", "███", "█ █", "███"],
        '7' => ["███", "  █", "  █", "  █", "  █"],
        '8' => ["███", "█ █", "███", "█ █", "███"],
        '9' => ["███", "█ █", "███", "  █", "███"],
        '-' => ["   ", "   ", "███", "   ", "   "],
        ' ' => ["   ", "   ", "   ", "   ", "   "],
        _ => return None,
    })
}

/// Render `text` in block glyphs, each cell repeated `scale` times in both
/// directions. `None` if `text` has a character without a glyph.
pub fn big_text(text: &str, scale: usize) -> Option<Vec<String>> {
    let glyphs = text.chars().map(glyph).collect::<Option<Vec<_>>>()?;
    let scale = scale.max(1);
    let mut lines = Vec::with_capacity(GLYPH_ROWS * scale);
    for row in 0..GLYPH_ROWS {
        let line = glyphs
            .iter()
            .map(|g| {
                g[row]
                    .chars()
                    .flat_map(|c| std::iter::repeat(c).take(scale))
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join(&" ".repeat(scale));
        for _ in 0..scale {
            lines.push(line.clone());
        }
    }
    Some(lines)
}

/// Largest scale at which `text` fits in `cols` x `rows`, at least 1.
pub fn fit_scale(text: &str, cols: u16, rows: u16) -> usize {
    let n = text.chars().count().max(1);
    (1..=4)
        .rev()
        .find(|&s| (n * 3 * s + (n - 1) * s) <= cols as usize && GLYPH_ROWS * s <= rows as usize)
        .unwrap_or(1)
}

pub struct Palette {
    pub background: Color,
    pub foreground: Color,
    pub flash: Color,
    pub muted: Color,
}

pub fn palette(dark: bool) -> Palette {
    if dark {
        Palette {
            background: Color::Black,
            foreground: Color::White,
            flash: Color::Yellow,
            muted: Color::DarkGrey,
        }
    } else {
        Palette {
            background: Color::White,
            foreground: Color::Black,
            flash: Color::DarkBlue,
            muted: Color::DarkGrey,
        }
    }
}

fn badge_color(connection: Connection) -> Color {
    match connection {
        Connection::Connecting => Color::DarkYellow,
        Connection::Connected => Color::DarkGreen,
        Connection::Error => Color::Red,
    }
}

/// Snapshot of everything the frame needs besides the board.
pub struct View<'a> {
    pub board: &'a Board,
    pub now: Instant,
    pub paused: bool,
    pub help: &'a str,
    pub diagnostics: Option<&'a [String]>,
}

fn centered(cols: u16, width: usize) -> u16 {
    (cols as usize).saturating_sub(width) as u16 / 2
}

fn draw_value<W: Write>(
    out: &mut W,
    label: &str,
    value: &str,
    flashing: bool,
    top: u16,
    cols: u16,
    height: u16,
    colors: &Palette,
) -> std::io::Result<()> {
    queue!(
        out,
        SetForegroundColor(colors.muted),
        MoveTo(centered(cols, label.len()), top),
        Print(label),
        SetForegroundColor(if flashing { colors.flash } else { colors.foreground }),
    )?;
    if flashing {
        queue!(out, SetAttribute(Attribute::Bold))?;
    }

    let body_rows = height.saturating_sub(1);
    let scale = fit_scale(value, cols, body_rows);
    match big_text(value, scale).filter(|lines| lines.len() <= body_rows as usize) {
        Some(lines) => {
            for (i, line) in lines.iter().enumerate() {
                let x = centered(cols, line.chars().count());
                queue!(out, MoveTo(x, top + 1 + i as u16), Print(line))?;
            }
        }
        None => {
            let x = centered(cols, value.chars().count());
            queue!(out, MoveTo(x, top + 1 + body_rows / 2), Print(value))?;
        }
    }
    queue!(out, SetAttribute(Attribute::NormalIntensity))?;
    Ok(())
}

/// Queue one full frame. The caller flushes.
pub fn draw<W: Write>(out: &mut W, view: &View, cols: u16, rows: u16) -> std::io::Result<()> {
    let board = view.board;
    let colors = palette(board.theme().is_dark());

    queue!(
        out,
        SetBackgroundColor(colors.background),
        SetForegroundColor(colors.foreground),
        Clear(ClearType::All),
        MoveTo(1, 0),
        SetAttribute(Attribute::Bold),
        Print(board.meet_name()),
        SetAttribute(Attribute::NormalIntensity),
        SetBackgroundColor(colors.background),
    )?;

    let badge = if view.paused {
        "● Paused".to_string()
    } else {
        format!("● {}", board.connection().as_str())
    };
    queue!(
        out,
        SetForegroundColor(badge_color(board.connection())),
        MoveTo((cols as usize).saturating_sub(badge.chars().count() + 1) as u16, 0),
        Print(&badge),
    )?;
    if let Some(detail) = board.connection_detail() {
        let max = (cols as usize).saturating_sub(2);
        let detail: String = detail.chars().take(max).collect();
        queue!(
            out,
            SetForegroundColor(colors.muted),
            MoveTo(centered(cols, detail.chars().count()), 1),
            Print(detail),
        )?;
    }

    // header, footer and one spacer row each side; the rest is split in two
    let body = rows.saturating_sub(4);
    let half = body / 2;
    draw_value(
        out,
        "EVENT",
        board.event(),
        board.event_flashing(view.now),
        2,
        cols,
        half,
        &colors,
    )?;
    draw_value(
        out,
        "HEAT",
        board.heat(),
        board.heat_flashing(view.now),
        2 + half,
        cols,
        half,
        &colors,
    )?;

    let updated = if board.updated().is_empty() {
        String::new()
    } else {
        format!("Last updated: {}", board.updated())
    };
    queue!(
        out,
        SetBackgroundColor(colors.background),
        SetForegroundColor(colors.muted),
        MoveTo(1, rows.saturating_sub(1)),
        Print(&updated),
        MoveTo(
            (cols as usize).saturating_sub(view.help.len() + 1) as u16,
            rows.saturating_sub(1)
        ),
        Print(view.help),
    )?;

    if let Some(lines) = view.diagnostics {
        let top = rows.saturating_sub(lines.len() as u16 + 2);
        queue!(out, SetForegroundColor(colors.foreground))?;
        for (i, line) in lines.iter().enumerate() {
            queue!(out, MoveTo(1, top + i as u16), Print(line))?;
        }
    }

    queue!(out, ResetColor)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        board::{ThemeController, ThemeWindow},
        status::MeetStatus,
    };

    #[test]
    fn big_text_lays_out_glyphs() {
        let lines = big_text("12", 1).expect("digits have glyphs");
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], " █  ███");
        assert_eq!(lines[4], "███ ███");
    }

    #[test]
    fn big_text_scales_both_ways() {
        let lines = big_text("7", 2).expect("digit has glyph");
        assert_eq!(lines.len(), 10);
        assert_eq!(lines[0], "██████");
        assert_eq!(lines[2], "    ██");
    }

    #[test]
    fn letters_fall_back_to_plain_text() {
        assert!(big_text("Finals", 1).is_none());
    }

    #[test]
    fn scale_shrinks_to_fit() {
        assert_eq!(fit_scale("12", 80, 40), 4);
        assert_eq!(fit_scale("12", 20, 40), 2);
        assert_eq!(fit_scale("123", 10, 4), 1);
    }

    #[test]
    fn frame_contains_values_and_badge() -> std::io::Result<()> {
        let mut board = Board::new("County Champs", ThemeController::new(false, ThemeWindow::default()));
        let now = Instant::now();
        board.render(&MeetStatus::new("Finals", "3", "Now"), now);

        let diagnostics = vec!["ticks: 0".to_string()];
        let mut out = Vec::new();
        let view = View {
            board: &board,
            now,
            paused: false,
            help: "q quit",
            diagnostics: Some(diagnostics.as_slice()),
        };
        draw(&mut out, &view, 80, 30)?;
        let frame = String::from_utf8_lossy(&out);
        assert!(frame.contains("County Champs"));
        assert!(frame.contains("● Connecting"));
        assert!(frame.contains("Finals"));
        assert!(frame.contains("Last updated: Now"));
        assert!(frame.contains("ticks: 0"));
        Ok(())
    }
}
