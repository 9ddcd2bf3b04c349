pub mod beep_service;
pub mod config_service;
pub mod player_service;
pub mod ui_manager;
