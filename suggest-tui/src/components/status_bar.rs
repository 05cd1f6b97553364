use crate::theme::Theme;
use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};
use suggest_core::State;

const HINTS: &str = "↑↓ move · Tab/Enter pick · Ctrl+D list · Esc close";

fn state_label(state: State) -> &'static str {
    match state {
        State::Start => "idle",
        State::Getting => "searching",
        State::Selecting => "selecting",
    }
}

pub fn draw(f: &mut Frame, area: Rect, state: State, theme: &Theme) {
    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", state_label(state)),
            Style::default().fg(theme.accent),
        ),
        Span::styled(HINTS, Style::default().fg(theme.muted)),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::render_to_string;

    #[test]
    fn shows_state_and_hints() {
        let output = render_to_string(80, 1, |f| {
            draw(f, f.area(), State::Getting, &Theme::default());
        });
        assert!(output.contains("searching"));
        assert!(output.contains("Esc close"));
    }
}
