use clap::Parser;
use iced::widget::image::Handle;
use iced::{Element, Size, Task, Theme};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::info;

use catalog_editor::config::Settings;
use catalog_editor::grid::Filter;
use catalog_editor::logging;
use catalog_editor::ui::{self, gallery};
use catalog_editor::viewer::{Showcase, ViewerOptions};

/// Command line flags
#[derive(Parser, Debug)]
#[command(name = "catalog-viewer", about = "Browse a saved product catalog")]
struct Args {
    /// Catalog snapshot to display
    #[arg(long)]
    data: Option<PathBuf>,

    /// Keep products in slot order instead of sorting them by name
    #[arg(long)]
    no_sort: bool,

    /// Show every category as a stacked section instead of tabs
    #[arg(long)]
    stacked: bool,
}

/// Read-only catalog window
struct CatalogViewer {
    showcase: Showcase,
    /// Decoded images keyed by product id
    thumbnails: BTreeMap<usize, Handle>,
}

#[derive(Debug, Clone)]
enum Message {
    SelectTab(Filter),
}

impl CatalogViewer {
    fn new(data_file: PathBuf, options: ViewerOptions) -> (Self, Task<Message>) {
        let showcase = Showcase::load(&data_file, options);

        // The first bucket holds every product
        let thumbnails = showcase
            .buckets()
            .first()
            .map(|all| {
                all.products
                    .iter()
                    .filter_map(|product| ui::image_handle(&product.image).map(|h| (product.id, h)))
                    .collect()
            })
            .unwrap_or_default();

        (CatalogViewer { showcase, thumbnails }, Task::none())
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::SelectTab(filter) => self.showcase.select(filter),
        }
        Task::none()
    }

    fn view(&self) -> Element<Message> {
        gallery::view(&self.showcase, &self.thumbnails).map(Message::SelectTab)
    }

    fn theme(&self) -> Theme {
        Theme::Light
    }
}

fn main() -> iced::Result {
    logging::init();

    let args = Args::parse();
    let settings = Settings::load();
    let data_file = args.data.unwrap_or(settings.data_file);
    let options = ViewerOptions {
        sort_by_name: settings.sort_viewer_by_name && !args.no_sort,
        tabbed: !args.stacked,
    };

    info!("Catalog viewer starting ({})", data_file.display());

    iced::application("Product Catalog", CatalogViewer::update, CatalogViewer::view)
        .theme(CatalogViewer::theme)
        .window_size(Size::new(1280.0, 860.0))
        .run_with(move || CatalogViewer::new(data_file, options))
}
