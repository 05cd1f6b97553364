pub mod cache;
pub mod candidate;
pub mod command;
pub mod config;
pub mod controller;
pub mod error;
pub mod flavor;
pub mod flyout;
pub mod options;
pub mod paths;
pub mod present;
pub mod selection;
pub mod source;
pub mod timer;

// Re-export commonly used types at crate root
pub use candidate::{Candidate, DisplayRow};
pub use command::{Command, Disposition, HostEvent, Key};
pub use config::Config;
pub use controller::{Controller, SessionId, State};
pub use error::{Result, SuggestError};
pub use flavor::{Flavor, Select, Suggest};
pub use options::{Options, OptionsOverride, SelectionPolicy};
pub use present::{DetailView, ListView, Presenter};
pub use source::{CandidateSource, Completion, DetailSource, Replier};
