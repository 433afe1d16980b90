use std::time::Duration;

use iced::keyboard::Key;
use iced::keyboard::key::Named;
use iced::widget::{Space, button, column, container, image, opaque, row, scrollable, stack, text};
use iced::{Background, Border, Color, ContentFit, Element, Length, Subscription, Task, Theme};

use crate::collection::{ImageSource, PhotoCollection, Registry};
use crate::config::{self, Config};
use crate::lightbox::{Lightbox, LightboxState, TimerId};

const TILE_IMAGE_HEIGHT: f32 = 288.0;
const GRID_SPACING: f32 = 32.0;
const GRID_MAX_WIDTH: f32 = 1152.0;
const PROGRESS_WIDTH: f32 = 256.0;
const DOT_SIZE: f32 = 14.0;

fn boot() -> (Gallery, Task<Message>) {
    (Gallery::new(config::load()), Task::none())
}

pub fn run() -> iced::Result {
    iced::application(boot, update, view)
        .title("Living Photo Gallery")
        .theme(theme)
        .subscription(subscription)
        .centered()
        .run()
}

struct Gallery {
    config: Config,
    registry: Registry,
    lightbox: Lightbox,
}

impl Gallery {
    fn new(config: Config) -> Self {
        let registry = Registry::builtin(&config.assets_dir).unwrap_or_else(|e| {
            log::error!("Built-in catalog is invalid: {}", e);
            Registry::default()
        });
        let remote = registry
            .list_collections()
            .iter()
            .flat_map(|c| c.images.iter())
            .filter(|src| src.is_remote())
            .count();
        log::info!(
            "{} collections, images under {} ({} remote shown as placeholders)",
            registry.list_collections().len(),
            config.assets_dir.display(),
            remote
        );
        let lightbox = Lightbox::new(config.open_delay(), config.auto_play_interval());
        Self {
            config,
            registry,
            lightbox,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    OpenCollection(u32),
    OpenDelayElapsed(TimerId),
    CloseGallery,
    NextImage,
    PrevImage,
    JumpTo(usize),
    ToggleAutoPlay,
    AutoPlayTick(TimerId),
}

fn key_message(key: Key) -> Option<Message> {
    match key {
        Key::Named(Named::ArrowLeft) => Some(Message::PrevImage),
        Key::Named(Named::ArrowRight) => Some(Message::NextImage),
        Key::Named(Named::Escape) => Some(Message::CloseGallery),
        Key::Named(Named::Space) => Some(Message::ToggleAutoPlay),
        _ => None,
    }
}

fn subscription(state: &Gallery) -> Subscription<Message> {
    let events = iced::event::listen_with(|event, _status, _window| match event {
        iced::Event::Keyboard(iced::keyboard::Event::KeyPressed { key, .. }) => key_message(key),
        _ => None,
    });

    // Each timer subscription is keyed by its handle: dropping the handle in
    // the lightbox drops the subscription, a new handle starts a new one.
    let mut subscriptions = vec![events];
    if let Some(timer) = state.lightbox.pending_open_timer() {
        subscriptions.push(
            iced::time::every(state.lightbox.open_delay())
                .with(timer)
                .map(|(timer, _)| Message::OpenDelayElapsed(timer)),
        );
    }
    if let Some(timer) = state.lightbox.auto_play_timer() {
        subscriptions.push(
            iced::time::every(state.lightbox.auto_play_interval())
                .with(timer)
                .map(|(timer, _)| Message::AutoPlayTick(timer)),
        );
    }
    Subscription::batch(subscriptions)
}

fn update(state: &mut Gallery, message: Message) -> Task<Message> {
    match message {
        Message::OpenCollection(id) => {
            let Some(collection) = state.registry.get(id) else {
                log::warn!("Tile for unknown collection {}", id);
                return Task::none();
            };
            if let Err(e) = state.lightbox.open_gallery(collection.clone()) {
                log::warn!("Cannot open collection {}: {}", id, e);
            }
        }
        Message::OpenDelayElapsed(timer) => {
            state.lightbox.finish_open(timer);
        }
        Message::CloseGallery => {
            state.lightbox.close_gallery();
        }
        Message::NextImage => {
            state.lightbox.next_image();
        }
        Message::PrevImage => {
            state.lightbox.prev_image();
        }
        Message::JumpTo(index) => {
            if let Err(e) = state.lightbox.jump_to(index) {
                log::warn!("{}", e);
            }
        }
        Message::ToggleAutoPlay => {
            state.lightbox.toggle_auto_play();
        }
        Message::AutoPlayTick(timer) => {
            state.lightbox.auto_play_tick(timer);
        }
    }
    Task::none()
}

fn view(state: &Gallery) -> Element<'_, Message> {
    let lightbox = state.lightbox.state();

    // 1. Fullscreen lightbox
    if lightbox.is_open {
        if let Some(collection) = lightbox.selected.as_ref() {
            return lightbox_view(collection, lightbox, state.lightbox.auto_play_interval());
        }
    }

    // 2. Grid, with the loading overlay on top while a collection opens
    let page = gallery_page(state);
    if lightbox.is_loading {
        stack![page, opaque(loading_overlay())]
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    } else {
        page
    }
}

const LABEL_COLOR: Color = Color::from_rgb(0.6, 0.6, 0.65);

fn gallery_page(state: &Gallery) -> Element<'_, Message> {
    let header = container(
        column![
            text("LIVING PHOTO GALLERY").size(48),
            container(Space::new().width(96).height(4)).style(accent_style),
            text("Classic collections with living effects")
                .size(18)
                .color(LABEL_COLOR),
        ]
        .spacing(12)
        .align_x(iced::Alignment::Center),
    )
    .center_x(Length::Fill)
    .padding([32, 24]);

    let grid = collection_grid(state.registry.list_collections(), state.config.grid_columns());

    column![
        header,
        scrollable(container(grid).center_x(Length::Fill).padding([48, 24])).height(Length::Fill),
    ]
    .into()
}

fn collection_grid(collections: &[PhotoCollection], columns: usize) -> Element<'_, Message> {
    let rows: Vec<Element<'_, Message>> = collections
        .chunks(columns)
        .map(|chunk| {
            let mut items: Vec<Element<'_, Message>> = chunk.iter().map(collection_tile).collect();
            // Pad the last row so its tiles keep the same width as the others.
            for _ in chunk.len()..columns {
                items.push(Space::new().width(Length::FillPortion(1)).into());
            }
            row(items).spacing(GRID_SPACING).into()
        })
        .collect();

    column(rows)
        .spacing(GRID_SPACING)
        .max_width(GRID_MAX_WIDTH)
        .into()
}

fn collection_tile(collection: &PhotoCollection) -> Element<'_, Message> {
    let cover = container(picture(&collection.cover_image, ContentFit::Cover))
        .width(Length::Fill)
        .height(TILE_IMAGE_HEIGHT);

    let badge = container(text(photo_count_label(collection.len())).size(12))
        .padding([4, 12])
        .style(badge_style);

    let details = column![
        row![
            text(&collection.title).size(20),
            Space::new().width(Length::Fill),
            badge,
        ]
        .align_y(iced::Alignment::Center),
        text(&collection.description).size(14).color(LABEL_COLOR),
        text("Open collection \u{2192}").size(14),
    ]
    .spacing(12)
    .padding(24);

    button(
        container(column![cover, details])
            .width(Length::Fill)
            .style(container::bordered_box),
    )
    .on_press(Message::OpenCollection(collection.id))
    .padding(0)
    .style(button::text)
    .width(Length::FillPortion(1))
    .into()
}

fn loading_overlay<'a>() -> Element<'a, Message> {
    container(
        container(text("Loading collection...").size(16))
            .padding(24)
            .style(container::bordered_box),
    )
    .center(Length::Fill)
    .style(scrim_style(0.5))
    .into()
}

fn lightbox_view<'a>(
    collection: &'a PhotoCollection,
    state: &'a LightboxState,
    interval: Duration,
) -> Element<'a, Message> {
    let index = state.current_index;
    let total = collection.len();

    let auto_label = if state.is_auto_playing {
        "\u{23F8} Pause"
    } else {
        "\u{25B6} Auto"
    };
    let auto_button = button(text(auto_label).size(14)).on_press(Message::ToggleAutoPlay);
    let auto_button = if state.is_auto_playing {
        auto_button.style(button::primary)
    } else {
        auto_button.style(button::secondary)
    };

    let toolbar = row![
        auto_button,
        container(text(interval_label(interval)).size(14))
            .padding([6, 12])
            .style(badge_style),
        Space::new().width(Length::Fill),
        button(text("\u{2715}").size(20))
            .on_press(Message::CloseGallery)
            .style(button::secondary),
    ]
    .spacing(12)
    .align_y(iced::Alignment::Center)
    .padding(24);

    let current: Element<'a, Message> = match state.current_image() {
        Some(source) => picture(source, ContentFit::Contain),
        None => Space::new().into(),
    };

    let nav = row![
        nav_button("\u{2039}", Message::PrevImage),
        Space::new().width(Length::Fill),
        nav_button("\u{203A}", Message::NextImage),
    ]
    .align_y(iced::Alignment::Center)
    .height(Length::Fill)
    .padding([0, 16]);

    let stage = stack![container(current).center(Length::Fill).padding(16), nav]
        .width(Length::Fill)
        .height(Length::Fill);

    let dots: Vec<Element<'a, Message>> = (0..total).map(|i| dot(i, i == index)).collect();

    let footer = column![
        row(dots).spacing(12),
        text(&collection.title).size(24),
        text(position_label(index, total)).size(14).color(LABEL_COLOR),
        progress_bar(state.progress()),
    ]
    .spacing(10)
    .align_x(iced::Alignment::Center)
    .padding(24);

    container(column![toolbar, stage, container(footer).center_x(Length::Fill)])
        .width(Length::Fill)
        .height(Length::Fill)
        .style(scrim_style(0.95))
        .into()
}

fn nav_button<'a>(label: &'a str, message: Message) -> Element<'a, Message> {
    button(text(label).size(48))
        .on_press(message)
        .style(button::text)
        .padding([0, 16])
        .into()
}

fn dot<'a>(index: usize, active: bool) -> Element<'a, Message> {
    button(Space::new().width(DOT_SIZE).height(DOT_SIZE))
        .on_press(Message::JumpTo(index))
        .padding(0)
        .style(move |_theme, _status| dot_style(active))
        .into()
}

fn progress_bar<'a>(progress: f32) -> Element<'a, Message> {
    container(
        container(Space::new().height(4))
            .width(PROGRESS_WIDTH * progress.clamp(0.0, 1.0))
            .style(progress_fill_style),
    )
    .width(PROGRESS_WIDTH)
    .style(progress_track_style)
    .into()
}

/// Draw an image source. Remote images are not fetched, so they get a
/// labelled placeholder instead.
fn picture(source: &ImageSource, fit: ContentFit) -> Element<'_, Message> {
    match source {
        ImageSource::Local(path) => image(image::Handle::from_path(path))
            .content_fit(fit)
            .width(Length::Fill)
            .height(Length::Fill)
            .into(),
        ImageSource::Remote(_) => container(
            column![
                text("\u{1F4F7}").size(32),
                text(source.label()).size(11).color(LABEL_COLOR),
            ]
            .spacing(8)
            .align_x(iced::Alignment::Center),
        )
        .center(Length::Fill)
        .padding(12)
        .into(),
    }
}

fn photo_count_label(count: usize) -> String {
    if count == 1 {
        "1 photo".to_string()
    } else {
        format!("{} photos", count)
    }
}

fn position_label(index: usize, total: usize) -> String {
    format!("{} of {}", index + 1, total)
}

fn interval_label(interval: Duration) -> String {
    let ms = interval.as_millis();
    if ms % 1000 == 0 {
        format!("{} sec", ms / 1000)
    } else {
        format!("{:.1} sec", ms as f64 / 1000.0)
    }
}

fn accent_style(theme: &Theme) -> container::Style {
    let palette = theme.palette();
    container::Style {
        background: Some(Background::Color(palette.primary)),
        ..Default::default()
    }
}

fn badge_style(theme: &Theme) -> container::Style {
    let palette = theme.palette();
    container::Style {
        background: Some(Background::Color(Color {
            a: 0.15,
            ..palette.primary
        })),
        border: Border {
            radius: 12.0.into(),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn scrim_style(alpha: f32) -> impl Fn(&Theme) -> container::Style {
    move |_theme| container::Style {
        background: Some(Background::Color(Color::from_rgba(0.0, 0.0, 0.0, alpha))),
        text_color: Some(Color::WHITE),
        ..Default::default()
    }
}

fn progress_track_style(_theme: &Theme) -> container::Style {
    container::Style {
        background: Some(Background::Color(Color::from_rgba(1.0, 1.0, 1.0, 0.2))),
        border: Border {
            radius: 2.0.into(),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn progress_fill_style(_theme: &Theme) -> container::Style {
    container::Style {
        background: Some(Background::Color(Color::WHITE)),
        border: Border {
            radius: 2.0.into(),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn dot_style(active: bool) -> button::Style {
    let alpha = if active { 1.0 } else { 0.5 };
    button::Style {
        background: Some(Background::Color(Color::from_rgba(1.0, 1.0, 1.0, alpha))),
        border: Border {
            radius: (DOT_SIZE / 2.0).into(),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn theme(_state: &Gallery) -> Theme {
    Theme::Dark
}
