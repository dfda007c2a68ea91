mod fan_menu;
mod page_view;
mod progress_rail;
mod status_bar;

pub use fan_menu::FanMenuWidget;
pub use page_view::PageWidget;
pub use progress_rail::ProgressRailWidget;
pub use status_bar::StatusBarWidget;
