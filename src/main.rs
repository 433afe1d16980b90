mod app;
mod collection;
mod config;
mod error;
mod lightbox;

fn main() -> iced::Result {
    env_logger::init();
    app::run()
}
