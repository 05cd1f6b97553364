pub mod candidate_list;
pub mod detail;
pub mod search_bar;
pub mod status_bar;

use std::time::Instant;

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Spinner frame for the time elapsed since `start`, advancing every 80ms.
pub fn spinner_frame(start: Instant) -> &'static str {
    let elapsed = usize::try_from(start.elapsed().as_millis()).unwrap_or(usize::MAX);
    SPINNER_FRAMES[(elapsed / 80) % SPINNER_FRAMES.len()]
}

#[cfg(test)]
pub(crate) fn render_to_string(
    width: u16,
    height: u16,
    render: impl FnOnce(&mut ratatui::Frame),
) -> String {
    use ratatui::{Terminal, backend::TestBackend};

    let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
    terminal.draw(render).unwrap();
    let buffer = terminal.backend().buffer().clone();
    let mut output = String::new();
    for y in 0..buffer.area.height {
        for x in 0..buffer.area.width {
            output.push(buffer[(x, y)].symbol().chars().next().unwrap_or(' '));
        }
        output.push('\n');
    }
    output
}
