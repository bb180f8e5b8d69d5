mod common;
mod loader;
mod service;
