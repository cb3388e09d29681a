pub mod settings_route;
