use clap::Parser;
use iced::widget::{button, column, container, row, scrollable, text, Column};
use iced::{Alignment, Element, Length, Size, Subscription, Task, Theme};
use iced_aw::Wrap;
use rfd::{FileDialog, MessageButtons, MessageDialog, MessageLevel};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use catalog_editor::config::{Settings, CATALOG_CAPACITY, SNAPSHOT_FILE_NAME};
use catalog_editor::error::CatalogError;
use catalog_editor::grid::{self, CompressedBatch, Filter, GridCommand};
use catalog_editor::logging;
use catalog_editor::media::{self, CompressedImage};
use catalog_editor::state::{Catalog, PendingEdits, Slot};
use catalog_editor::sync::{local, remote, SaveReport, SqliteRemote};
use catalog_editor::ui::card::{self, CardEvent};
use catalog_editor::ui::ThumbnailCache;

/// Image file extensions offered by the pickers
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "bmp", "gif", "tif", "tiff"];

/// How often pending name edits are checked
const TICK: Duration = Duration::from_millis(100);

/// Command line flags
#[derive(Parser, Debug)]
#[command(name = "catalog-editor", about = "Edit the product catalog")]
struct Args {
    /// Snapshot file loaded at startup and offered when exporting
    #[arg(long)]
    data: Option<PathBuf>,

    /// Directory of the remote catalog store
    #[arg(long)]
    remote: Option<PathBuf>,
}

/// Main application state
struct CatalogEditor {
    /// The products being edited
    catalog: Catalog,
    settings: Settings,
    remote: SqliteRemote,
    /// Typed names not yet committed to the catalog
    pending: PendingEdits,
    filter: Filter,
    /// Card picked up for reordering
    held: Option<usize>,
    thumbnails: ThumbnailCache,
    /// A remote save or load is in flight
    remote_busy: bool,
    /// A bulk upload is being compressed
    bulk_busy: bool,
    /// Status message to display to the user
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// Startup read of the saved snapshot finished
    AutoloadComplete(Result<String, CatalogError>),
    /// User clicked the bulk upload button
    BulkUpload,
    BulkCompressed(CompressedBatch),
    /// Image chosen for a single card finished compressing, with the
    /// catalog layout version at the time it was chosen
    ImageCompressed(usize, u64, Result<CompressedImage, CatalogError>),
    Export,
    Exported(Result<PathBuf, CatalogError>),
    Import,
    Imported(Result<String, CatalogError>),
    RemoteSave,
    RemoteSaved(Result<SaveReport, CatalogError>),
    RemoteLoad,
    RemoteLoaded(Result<Vec<(usize, Slot)>, CatalogError>),
    OpenViewer,
    FilterSelected(Filter),
    Card(usize, CardEvent),
    /// Timer tick that commits quiet name edits
    Tick(Instant),
}

impl CatalogEditor {
    /// Create a new instance of the application
    fn new(settings: Settings) -> (Self, Task<Message>) {
        let catalog = Catalog::new();
        let mut thumbnails = ThumbnailCache::new();
        thumbnails.refresh(catalog.slots());

        let autoload = Task::perform(
            local::read_snapshot(settings.data_file.clone()),
            Message::AutoloadComplete,
        );

        let editor = CatalogEditor {
            catalog,
            remote: SqliteRemote::new(settings.remote_dir.clone()),
            pending: PendingEdits::new(Duration::from_millis(settings.name_debounce_ms)),
            settings,
            filter: Filter::All,
            held: None,
            thumbnails,
            remote_busy: false,
            bulk_busy: false,
            status: "Ready.".to_string(),
        };

        (editor, autoload)
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::AutoloadComplete(result) => {
                match result.and_then(|json| local::import_json(&mut self.catalog, &json)) {
                    Ok(count) => {
                        info!("Loaded saved catalog data ({} slots)", count);
                        self.refresh_thumbnails();
                        self.status = format!(
                            "Loaded {} products from {}",
                            self.catalog.populated_count(),
                            self.settings.data_file.display()
                        );
                    }
                    Err(e) if e.is_not_found() => info!("No saved catalog data"),
                    Err(e) => warn!("Could not load saved catalog data: {}", e),
                }
                Task::none()
            }
            Message::BulkUpload => self.start_bulk_upload(),
            Message::BulkCompressed(batch) => {
                self.bulk_busy = false;
                self.flush_pending();

                let images = batch.images.iter().map(CompressedImage::to_image_ref);
                let report = grid::place_bulk(&mut self.catalog, images, batch.failed);
                self.refresh_thumbnails();

                self.status = format!(
                    "{}개 이미지가 제품 {}번부터 추가되었습니다! (실패 {}, 공간 부족 {})",
                    report.placed,
                    report.start + 1,
                    report.failed,
                    report.dropped
                );
                notify(MessageLevel::Info, "이미지 일괄 업로드", &self.status);
                Task::none()
            }
            Message::ImageCompressed(index, layout, result) => {
                match result {
                    Ok(image) => {
                        let placed = self.dispatch(GridCommand::ReplaceImage {
                            index,
                            layout,
                            image: image.to_image_ref(),
                        });
                        if !placed {
                            self.status = format!(
                                "Image for product {} was discarded because cards were moved",
                                index + 1
                            );
                            notify(
                                MessageLevel::Warning,
                                "이미지 처리",
                                "이미지 처리 중 제품 순서가 바뀌어 이미지를 적용하지 않았습니다. 다시 선택해주세요.",
                            );
                        }
                    }
                    Err(e) => self.fail("이미지 처리", &e),
                }
                Task::none()
            }
            Message::Export => self.export(),
            Message::Exported(result) => {
                match result {
                    Ok(path) => {
                        self.status = format!("Saved to {}", path.display());
                        notify(MessageLevel::Info, "저장", "데이터가 저장되었습니다!");
                    }
                    Err(e) => self.fail("저장", &e),
                }
                Task::none()
            }
            Message::Import => {
                let picked = FileDialog::new()
                    .set_title("Open catalog data")
                    .add_filter("JSON", &["json"])
                    .pick_file();

                match picked {
                    Some(path) => Task::perform(local::read_snapshot(path), Message::Imported),
                    None => Task::none(),
                }
            }
            Message::Imported(result) => {
                self.flush_pending();
                match result.and_then(|json| local::import_json(&mut self.catalog, &json)) {
                    Ok(count) => {
                        self.held = None;
                        self.refresh_thumbnails();
                        self.status = format!("Imported {} slots", count);
                        notify(MessageLevel::Info, "불러오기", "데이터를 불러왔습니다!");
                    }
                    Err(e) => self.fail("불러오기", &e),
                }
                Task::none()
            }
            Message::RemoteSave => {
                if self.remote_busy {
                    return Task::none();
                }
                self.flush_pending();
                self.remote_busy = true;
                self.status = "Saving to remote catalog...".to_string();

                let store = self.remote.clone();
                let slots = self.catalog.slots().to_vec();
                Task::perform(
                    async move { remote::save(&store, slots).await },
                    Message::RemoteSaved,
                )
            }
            Message::RemoteSaved(result) => {
                self.remote_busy = false;
                match result {
                    Ok(report) => {
                        let adopted = report.apply_to(&mut self.catalog);
                        self.refresh_thumbnails();
                        self.status = format!(
                            "Saved {} products to the remote catalog ({} images uploaded)",
                            report.written, adopted
                        );
                        notify(MessageLevel::Info, "원격 저장", "원격 카탈로그에 저장되었습니다!");
                    }
                    Err(e) => self.fail("원격 저장", &e),
                }
                Task::none()
            }
            Message::RemoteLoad => {
                if self.remote_busy {
                    return Task::none();
                }
                self.remote_busy = true;
                self.status = "Loading remote catalog...".to_string();

                let store = self.remote.clone();
                Task::perform(
                    async move { remote::fetch(&store, CATALOG_CAPACITY).await },
                    Message::RemoteLoaded,
                )
            }
            Message::RemoteLoaded(result) => {
                self.remote_busy = false;
                match result {
                    Ok(fetched) if fetched.is_empty() => {
                        self.status = "Remote catalog is empty, nothing to load".to_string();
                    }
                    Ok(fetched) => {
                        self.flush_pending();
                        self.held = None;
                        let count = remote::apply_fetched(&mut self.catalog, fetched);
                        self.refresh_thumbnails();
                        self.status = format!("Loaded {} products from the remote catalog", count);
                    }
                    Err(e) => self.fail("원격 불러오기", &e),
                }
                Task::none()
            }
            Message::OpenViewer => {
                if let Err(e) = spawn_viewer(&self.settings.data_file) {
                    self.fail("카탈로그 보기", &CatalogError::from(e));
                }
                Task::none()
            }
            Message::FilterSelected(filter) => {
                self.filter = filter;
                Task::none()
            }
            Message::Card(index, event) => self.on_card(index, event),
            Message::Tick(now) => {
                for (index, name) in self.pending.take_due(now) {
                    grid::apply(&mut self.catalog, GridCommand::SetName { index, name });
                }
                Task::none()
            }
        }
    }

    fn on_card(&mut self, index: usize, event: CardEvent) -> Task<Message> {
        match event {
            CardEvent::PickImage => {
                let picked = FileDialog::new()
                    .set_title("Select product image")
                    .add_filter("Images", IMAGE_EXTENSIONS)
                    .pick_file();

                if let Some(path) = picked {
                    let layout = self.catalog.layout();
                    return Task::perform(
                        media::compress_file(path, self.settings.max_image_kb, self.settings.max_dimension),
                        move |result| Message::ImageCompressed(index, layout, result),
                    );
                }
            }
            CardEvent::NameInput(value) => self.pending.stage(index, value, Instant::now()),
            CardEvent::CategorySelected(category) => {
                self.dispatch(GridCommand::SetCategory { index, category });
            }
            CardEvent::Rotate => {
                self.dispatch(GridCommand::Rotate { index });
            }
            CardEvent::Delete => {
                self.dispatch(GridCommand::Delete { index });
            }
            CardEvent::Grab => {
                self.held = if self.held == Some(index) { None } else { Some(index) };
            }
            CardEvent::DropHere => {
                if let Some(from) = self.held.take() {
                    self.dispatch(GridCommand::Swap { from, to: index });
                }
            }
        }
        Task::none()
    }

    /// Apply one grid command to the catalog, returning whether it applied
    fn dispatch(&mut self, command: GridCommand) -> bool {
        // Buffered names belong to the positions they were typed into
        if command.is_structural() {
            self.flush_pending();
            self.held = None;
        }
        let moves_images = command.is_structural()
            || matches!(command, GridCommand::SetImage { .. } | GridCommand::ReplaceImage { .. });

        let applied = grid::apply(&mut self.catalog, command);

        if applied && moves_images {
            self.refresh_thumbnails();
        }
        applied
    }

    /// Commit every buffered name edit immediately
    fn flush_pending(&mut self) {
        for (index, name) in self.pending.take_all() {
            grid::apply(&mut self.catalog, GridCommand::SetName { index, name });
        }
    }

    fn refresh_thumbnails(&mut self) {
        self.thumbnails.refresh(self.catalog.slots());
    }

    fn start_bulk_upload(&mut self) -> Task<Message> {
        if self.bulk_busy {
            return Task::none();
        }

        let Some(files) = FileDialog::new()
            .set_title("Select product images")
            .add_filter("Images", IMAGE_EXTENSIONS)
            .pick_files()
        else {
            return Task::none();
        };

        let limit = grid::bulk_capacity(&self.catalog);
        if limit == 0 {
            self.status = "No empty product slots left".to_string();
            notify(MessageLevel::Warning, "이미지 일괄 업로드", "비어있는 제품 칸이 없습니다.");
            return Task::none();
        }

        info!("Bulk upload of {} files ({} free slots)", files.len(), limit);
        self.bulk_busy = true;
        self.status = format!("Compressing {} images...", files.len());

        Task::perform(
            grid::compress_batch(files, limit, self.settings.max_image_kb, self.settings.max_dimension),
            Message::BulkCompressed,
        )
    }

    fn export(&mut self) -> Task<Message> {
        self.flush_pending();

        let json = match local::export_json(&self.catalog) {
            Ok(json) => json,
            Err(e) => {
                self.fail("저장", &e);
                return Task::none();
            }
        };

        let mut dialog = FileDialog::new()
            .set_title("Save catalog data")
            .add_filter("JSON", &["json"])
            .set_file_name(SNAPSHOT_FILE_NAME);
        if let Some(dir) = self.settings.data_file.parent() {
            dialog = dialog.set_directory(dir);
        }

        match dialog.save_file() {
            Some(path) => Task::perform(local::write_snapshot(path, json), Message::Exported),
            None => Task::none(),
        }
    }

    /// Log a failed operation and tell the user about it
    fn fail(&mut self, operation: &str, err: &CatalogError) {
        error!("{} failed: {}", operation, err);
        self.status = grid::describe_failure(operation, err);
        notify(MessageLevel::Error, operation, &self.status);
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let remote_ready = !self.remote_busy;

        let toolbar = row![
            button("📁 이미지 일괄 업로드")
                .on_press_maybe((!self.bulk_busy).then_some(Message::BulkUpload)),
            button("💾 저장").on_press(Message::Export),
            button("📂 불러오기").on_press(Message::Import),
            button(if self.remote_busy { "☁ 처리 중..." } else { "☁ 원격 저장" })
                .on_press_maybe(remote_ready.then_some(Message::RemoteSave)),
            button("☁ 원격 불러오기").on_press_maybe(remote_ready.then_some(Message::RemoteLoad)),
            button("👁 카탈로그 보기").on_press(Message::OpenViewer),
        ]
        .spacing(10);

        let filters = Filter::options().into_iter().fold(row![].spacing(6), |filters, filter| {
            let style: fn(&Theme, button::Status) -> button::Style = if filter == self.filter {
                button::primary
            } else {
                button::secondary
            };
            filters.push(
                button(text(filter.label()).size(13))
                    .style(style)
                    .on_press(Message::FilterSelected(filter)),
            )
        });

        let cards: Vec<Element<Message>> = self
            .filter
            .visible_indices(&self.catalog)
            .into_iter()
            .filter_map(|index| {
                let slot = self.catalog.get(index)?;
                let name = self.pending.get(index).unwrap_or(slot.name.as_str());
                let card = card::view(index, slot, name, self.thumbnails.get(index), self.held);
                Some(card.map(|(index, event)| Message::Card(index, event)))
            })
            .collect();

        let content: Column<Message> = column![
            row![
                text("제품 카탈로그 편집").size(32).width(Length::Fill),
                text(format!(
                    "{} / {} products",
                    self.catalog.populated_count(),
                    CATALOG_CAPACITY
                ))
                .size(16),
            ]
            .align_y(Alignment::Center),
            toolbar,
            filters,
            text(&self.status).size(14),
            scrollable(Wrap::with_elements(cards)).height(Length::Fill),
        ]
        .spacing(14)
        .padding(20);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    /// Commit debounced name edits while any are waiting
    fn subscription(&self) -> Subscription<Message> {
        if self.pending.is_empty() {
            Subscription::none()
        } else {
            iced::time::every(TICK).map(Message::Tick)
        }
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

/// Show a blocking message dialog
fn notify(level: MessageLevel, title: &str, description: &str) {
    let _ = MessageDialog::new()
        .set_level(level)
        .set_title(title)
        .set_description(description)
        .set_buttons(MessageButtons::Ok)
        .show();
}

/// Launch the viewer binary installed next to the editor
fn spawn_viewer(data_file: &Path) -> std::io::Result<()> {
    let viewer = std::env::current_exe()?
        .with_file_name(format!("catalog-viewer{}", std::env::consts::EXE_SUFFIX));

    info!("Opening viewer {} for {}", viewer.display(), data_file.display());
    std::process::Command::new(viewer)
        .arg("--data")
        .arg(data_file)
        .spawn()?;
    Ok(())
}

fn main() -> iced::Result {
    logging::init();

    let args = Args::parse();
    let mut settings = Settings::load();
    if let Some(data) = args.data {
        settings.data_file = data;
    }
    if let Some(remote_dir) = args.remote {
        settings.remote_dir = remote_dir;
    }

    info!(
        "Catalog editor starting (data: {}, remote: {})",
        settings.data_file.display(),
        settings.remote_dir.display()
    );

    iced::application(
        "Product Catalog Editor",
        CatalogEditor::update,
        CatalogEditor::view,
    )
    .subscription(CatalogEditor::subscription)
    .theme(CatalogEditor::theme)
    .window_size(Size::new(1400.0, 900.0))
    .centered()
    .run_with(move || CatalogEditor::new(settings))
}
