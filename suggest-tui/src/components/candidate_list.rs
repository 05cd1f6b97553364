use crate::{
    presenter::{Loading, Screen},
    theme::Theme,
};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use suggest_core::{DisplayRow, ListView};

const NO_MATCHES: &str = "No matches";

/// Label with the matched range emphasized, followed by muted metadata.
pub fn row_line<'a>(row: &'a DisplayRow, theme: &Theme) -> Line<'a> {
    let emphasis = Style::default()
        .fg(theme.emphasis)
        .add_modifier(Modifier::BOLD);
    let muted = Style::default().fg(theme.muted);

    let mut spans = match row.emphasis.clone() {
        Some(range) if row.label.get(range.clone()).is_some() => vec![
            Span::raw(&row.label[..range.start]),
            Span::styled(&row.label[range.clone()], emphasis),
            Span::raw(&row.label[range.end..]),
        ],
        _ => vec![Span::raw(row.label.as_str())],
    };

    if !row.aliases.is_empty() {
        spans.push(Span::styled(format!(" ({})", row.aliases.join(", ")), muted));
    }
    let tags: Vec<&str> = row
        .types
        .iter()
        .chain(&row.domains)
        .chain(&row.properties)
        .map(String::as_str)
        .collect();
    if !tags.is_empty() {
        spans.push(Span::styled(format!("  {}", tags.join(" · ")), muted));
    }
    Line::from(spans)
}

/// Rows as drawn, in order: candidates (or the "no matches" line), then the
/// "create new" affordance.
pub fn list_lines<'a>(view: &'a ListView, theme: &Theme) -> Vec<Line<'a>> {
    let mut lines: Vec<Line> = if view.no_matches {
        vec![Line::from(Span::styled(
            NO_MATCHES,
            Style::default()
                .fg(theme.muted)
                .add_modifier(Modifier::ITALIC),
        ))]
    } else {
        view.rows.iter().map(|row| row_line(row, theme)).collect()
    };
    if let Some(label) = &view.suggest_new {
        lines.push(Line::from(Span::styled(
            format!("+ {label}"),
            Style::default().fg(theme.accent),
        )));
    }
    lines
}

/// Map a list-relative line to what it stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListHit {
    Row(usize),
    CreateNew,
}

pub fn hit_test(view: &ListView, line: usize) -> Option<ListHit> {
    let rows = if view.no_matches { 1 } else { view.rows.len() };
    if line < rows {
        return (!view.no_matches).then_some(ListHit::Row(line));
    }
    (line == rows && view.suggest_new.is_some()).then_some(ListHit::CreateNew)
}

/// Draw the candidate list, the spinner, or the timeout message. Nothing is
/// drawn when the list is hidden.
pub fn draw(
    f: &mut Frame,
    area: Rect,
    screen: &Screen,
    theme: &Theme,
    spinner: &str,
    list_state: &mut ListState,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border));

    match (&screen.loading, &screen.list) {
        (Some(Loading::Message(message)), _) => {
            let text = Paragraph::new(Span::styled(
                message.as_str(),
                Style::default().fg(theme.error),
            ))
            .wrap(Wrap { trim: true })
            .block(block);
            f.render_widget(text, area);
        }
        (Some(Loading::Spinner), None) => {
            let text = Line::from(vec![
                Span::styled(
                    format!("{spinner} "),
                    Style::default()
                        .fg(theme.accent)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled("Searching...", Style::default().fg(theme.muted)),
            ]);
            f.render_widget(Paragraph::new(text).block(block), area);
        }
        (_, Some(view)) => {
            let count = if view.no_matches { 0 } else { view.rows.len() };
            let items: Vec<ListItem> = list_lines(view, theme)
                .into_iter()
                .map(ListItem::new)
                .collect();
            let list = List::new(items)
                .block(block.title(format!(" {count} matches ")))
                .highlight_style(
                    Style::default()
                        .bg(theme.accent)
                        .fg(theme.highlight_fg)
                        .add_modifier(Modifier::BOLD),
                )
                .highlight_symbol("▸ ");

            list_state.select(view.selected);
            if view.selected.is_none()
                && let Some(hint) = view.scroll_hint
            {
                *list_state.offset_mut() = hint;
            }
            f.render_stateful_widget(list, area, list_state);
        }
        (None, None) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::render_to_string;

    fn lincoln() -> DisplayRow {
        DisplayRow {
            label: "Abraham Lincoln".to_string(),
            emphasis: Some(8..11),
            aliases: vec!["Honest Abe".to_string()],
            types: vec!["US President".to_string()],
            ..DisplayRow::default()
        }
    }

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn row_line_emphasizes_match() {
        let theme = Theme::default();
        let row = lincoln();
        let line = row_line(&row, &theme);
        assert_eq!(line.spans[1].content, "Lin");
        assert_eq!(line.spans[1].style.fg, Some(theme.emphasis));
        assert_eq!(
            line_text(&line),
            "Abraham Lincoln (Honest Abe)  US President"
        );
    }

    #[test]
    fn row_line_ignores_out_of_range_emphasis() {
        let row = DisplayRow {
            emphasis: Some(3..40),
            ..DisplayRow::plain("Grant")
        };
        let line = row_line(&row, &Theme::default());
        assert_eq!(line.spans.len(), 1);
        assert_eq!(line_text(&line), "Grant");
    }

    #[test]
    fn no_matches_and_create_new_lines() {
        let view = ListView {
            no_matches: true,
            suggest_new: Some("Create new entry".to_string()),
            ..ListView::default()
        };
        let lines = list_lines(&view, &Theme::default());
        assert_eq!(lines.len(), 2);
        assert_eq!(line_text(&lines[0]), NO_MATCHES);
        assert_eq!(line_text(&lines[1]), "+ Create new entry");
    }

    #[test]
    fn hit_test_maps_lines() {
        let view = ListView {
            rows: vec![DisplayRow::plain("a"), DisplayRow::plain("b")],
            suggest_new: Some("new".to_string()),
            ..ListView::default()
        };
        assert_eq!(hit_test(&view, 1), Some(ListHit::Row(1)));
        assert_eq!(hit_test(&view, 2), Some(ListHit::CreateNew));
        assert_eq!(hit_test(&view, 3), None);

        let empty = ListView {
            no_matches: true,
            ..ListView::default()
        };
        assert_eq!(hit_test(&empty, 0), None);
    }

    #[test]
    fn draws_rows_with_highlight_marker() {
        let screen = Screen {
            list: Some(ListView {
                rows: vec![lincoln(), DisplayRow::plain("Ulysses Grant")],
                selected: Some(1),
                ..ListView::default()
            }),
            ..Screen::default()
        };
        let theme = Theme::default();
        let mut state = ListState::default();
        let output = render_to_string(60, 6, |f| {
            draw(f, f.area(), &screen, &theme, "⠋", &mut state);
        });
        assert!(output.contains("2 matches"));
        assert!(output.contains("Abraham Lincoln"));
        assert!(output.contains("▸ Ulysses Grant"));
    }

    #[test]
    fn draws_timeout_message_over_list() {
        let screen = Screen {
            list: Some(ListView::default()),
            loading: Some(Loading::Message("Search is slow".to_string())),
            ..Screen::default()
        };
        let mut state = ListState::default();
        let output = render_to_string(40, 4, |f| {
            draw(f, f.area(), &screen, &Theme::default(), "⠋", &mut state);
        });
        assert!(output.contains("Search is slow"));
        assert!(!output.contains("matches"));
    }

    #[test]
    fn draws_spinner_while_loading() {
        let screen = Screen {
            loading: Some(Loading::Spinner),
            ..Screen::default()
        };
        let mut state = ListState::default();
        let output = render_to_string(40, 4, |f| {
            draw(f, f.area(), &screen, &Theme::default(), "⠋", &mut state);
        });
        assert!(output.contains("Searching..."));
    }
}
