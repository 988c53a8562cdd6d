pub mod event;
pub mod map_view;
pub mod terminal;

pub use map_view::{run_map_view, MapAction, MapView};
pub use terminal::TerminalGuard;
