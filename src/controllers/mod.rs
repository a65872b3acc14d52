pub mod home_controller;
pub mod invoke_controller;
