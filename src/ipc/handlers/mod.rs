pub mod core;
pub mod form;
pub mod lesson;
pub mod presets;
pub mod setup;
