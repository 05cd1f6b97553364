use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

pub struct SearchBarStyle<'a> {
    pub title: &'a str,
    pub placeholder: &'a str,
    pub border_color: Color,
    pub muted_color: Color,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct VisibleSlice {
    start: usize,
    end: usize,
    cursor_col: u16,
}

/// The part of `text` that fits in `max_width` columns with the cursor in
/// view. The last column is kept free for the cursor.
fn visible_slice(text: &str, cursor: usize, max_width: u16) -> VisibleSlice {
    let max_width = usize::from(max_width);
    if max_width == 0 || text.is_empty() {
        return VisibleSlice {
            start: 0,
            end: 0,
            cursor_col: 0,
        };
    }

    let graphemes: Vec<(usize, &str)> = text.grapheme_indices(true).collect();
    let cursor = cursor.min(text.len());
    let at_cursor = graphemes.partition_point(|(i, _)| *i < cursor);

    let budget = max_width - 1;
    let mut start = at_cursor;
    let mut before_cursor = 0;
    while start > 0 {
        let width = graphemes[start - 1].1.width();
        if before_cursor + width > budget {
            break;
        }
        before_cursor += width;
        start -= 1;
    }

    let mut end = start;
    let mut shown = 0;
    while let Some((_, grapheme)) = graphemes.get(end) {
        let width = grapheme.width();
        if shown + width > max_width {
            break;
        }
        shown += width;
        end += 1;
    }

    let byte = |idx: usize| graphemes.get(idx).map_or(text.len(), |(i, _)| *i);
    VisibleSlice {
        start: byte(start),
        end: byte(end),
        cursor_col: u16::try_from(before_cursor).unwrap_or(u16::MAX),
    }
}

/// Render the input line with a terminal cursor
pub fn draw(f: &mut Frame, area: Rect, style: &SearchBarStyle<'_>, text: &str, cursor: usize) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", style.title))
        .border_style(Style::default().fg(style.border_color));
    let inner = block.inner(area);

    let (content, cursor_col) = if text.is_empty() {
        let placeholder = Span::styled(style.placeholder, Style::default().fg(style.muted_color));
        (Line::from(placeholder), 0)
    } else {
        let slice = visible_slice(text, cursor, inner.width);
        (
            Line::from(Span::raw(&text[slice.start..slice.end])),
            slice.cursor_col,
        )
    };
    f.render_widget(Paragraph::new(content).block(block), area);

    if inner.width > 0 && inner.height > 0 {
        f.set_cursor_position((inner.x.saturating_add(cursor_col), inner.y));
    }
}
