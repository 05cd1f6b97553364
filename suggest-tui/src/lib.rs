pub mod app;
pub mod components;
pub mod filter;
pub mod input;
pub mod keymap;
pub mod presenter;
pub mod theme;

pub use app::{PickerOutcome, run};
pub use presenter::TerminalPresenter;
pub use theme::Theme;
