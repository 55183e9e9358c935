pub mod calendar;
pub mod login;
pub mod nav_menu;
pub mod profile;
pub mod schedule;
pub mod schedule_view;
pub mod search;
pub mod settings;

pub use login::login_screen;
pub use nav_menu::nav_menu;
pub use profile::profile_screen;
pub use schedule::schedule_screen;
pub use schedule_view::schedule_view_screen;
pub use search::search_screen;
pub use settings::settings_screen;
