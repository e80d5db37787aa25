mod app;
mod cli;
mod color;
mod config;
mod data;
mod error;
mod pipeline;
mod state;
mod ui;

fn main() {
    cli::run();
}
