use crate::theme::Theme;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use suggest_core::DetailView;

fn detail_lines<'a>(view: &'a DetailView, theme: &Theme) -> Vec<Line<'a>> {
    let muted = Style::default().fg(theme.muted);
    let mut lines = Vec::new();

    let tags: Vec<&str> = view
        .types
        .iter()
        .chain(&view.domains)
        .map(String::as_str)
        .collect();
    if !tags.is_empty() {
        lines.push(Line::from(Span::styled(tags.join(" · "), muted)));
        lines.push(Line::default());
    }
    if !view.blurb.is_empty() {
        lines.push(Line::from(view.blurb.as_str()));
        lines.push(Line::default());
    }
    if let Some(image) = &view.image {
        lines.push(Line::from(vec![
            Span::styled("image ", muted),
            Span::raw(image.as_str()),
        ]));
    }
    if let Some(link) = &view.link {
        lines.push(Line::from(Span::styled(
            link.as_str(),
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::UNDERLINED),
        )));
    }
    lines
}

/// Flyout with details of the highlighted candidate.
pub fn draw(f: &mut Frame, area: Rect, view: &DetailView, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", view.label))
        .title_style(Style::default().add_modifier(Modifier::BOLD))
        .border_style(Style::default().fg(theme.accent));
    let paragraph = Paragraph::new(detail_lines(view, theme))
        .wrap(Wrap { trim: true })
        .block(block);
    f.render_widget(Clear, area);
    f.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::render_to_string;

    fn view() -> DetailView {
        DetailView {
            row: 0,
            label: "Abraham Lincoln".to_string(),
            link: Some("https://example.org/view/en/abraham_lincoln".to_string()),
            image: None,
            types: vec!["US President".to_string()],
            domains: vec!["Government".to_string()],
            blurb: "16th president of the United States.".to_string(),
        }
    }

    #[test]
    fn lines_skip_missing_parts() {
        let view = view();
        let lines = detail_lines(&view, &Theme::default());
        let text: Vec<String> = lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect();
        assert_eq!(text[0], "US President · Government");
        assert!(text.iter().any(|l| l.contains("16th president")));
        assert!(!text.iter().any(|l| l.starts_with("image")));
        assert_eq!(
            text.last().map(String::as_str),
            Some("https://example.org/view/en/abraham_lincoln")
        );
    }

    #[test]
    fn draws_title_and_blurb() {
        let view = view();
        let output = render_to_string(60, 10, |f| {
            draw(f, f.area(), &view, &Theme::default());
        });
        assert!(output.contains("Abraham Lincoln"));
        assert!(output.contains("16th president"));
    }
}
