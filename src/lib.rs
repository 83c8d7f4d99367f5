pub mod app;
pub mod braille;
pub mod config;
pub mod data;
pub mod features;
pub mod map;
pub mod notice;
pub mod ui;
