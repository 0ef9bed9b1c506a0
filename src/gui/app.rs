use std::path::PathBuf;
use std::sync::Arc;

use iced::widget::{column, image::Handle};
use iced::{Element, Size, Task};
use image::{DynamicImage, ImageReader};
use rfd::{AsyncFileDialog, AsyncMessageDialog, MessageButtons, MessageLevel};
use tracing::{error, info, warn};

use super::state::{AppState, StateError, ViewMode};
use super::widgets::{action_button, button_row, image_panel, report_panel};
use super::Message;
use crate::pipeline::Pipeline;

const WINDOW_TITLE: &str = "Steel Defect Detector";
const WINDOW_SIZE: Size = Size::new(900.0, 700.0);

/// Open the detector window and block until it closes
pub fn run(pipeline: Pipeline) -> iced::Result {
    iced::application(
        move || SteelscanApp::new(pipeline.clone()),
        SteelscanApp::update,
        SteelscanApp::view,
    )
    .title(SteelscanApp::title)
    .window_size(WINDOW_SIZE)
    .resizable(false)
    .run()
}

pub struct SteelscanApp {
    state: AppState,
    pipeline: Pipeline,
    original_handle: Option<Handle>,
    annotated_handle: Option<Handle>,
}

impl SteelscanApp {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            state: AppState::new(),
            pipeline,
            original_handle: None,
            annotated_handle: None,
        }
    }

    /// Window title naming the loaded image and, once processed, the saved result
    pub fn title(&self) -> String {
        let file_name = |path: &std::path::Path| {
            path.file_name()
                .map(|name| name.to_string_lossy().into_owned())
        };

        match (
            self.state.source_path().and_then(file_name),
            self.state.output_path().and_then(file_name),
        ) {
            (Some(source), Some(output)) => {
                format!("{} - {} (saved {})", WINDOW_TITLE, source, output)
            }
            (Some(source), None) => format!("{} - {}", WINDOW_TITLE, source),
            _ => WINDOW_TITLE.to_string(),
        }
    }

    /// Apply a state handler to the owned state
    fn apply(&mut self, handler: impl FnOnce(AppState) -> AppState) {
        let state = std::mem::take(&mut self.state);
        self.state = handler(state);
    }

    fn refresh_handles(&mut self) {
        self.original_handle = self.state.original().map(|loaded| to_handle(&loaded.image));
        self.annotated_handle = self
            .state
            .processed()
            .map(|processed| to_handle(&processed.annotated));
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::LoadImage => Task::perform(
                AsyncFileDialog::new()
                    .set_title("Open Image File")
                    .add_filter("Images", &["png", "jpg", "jpeg"])
                    .pick_file(),
                |handle| Message::ImagePicked(handle.map(|data| data.path().to_path_buf())),
            ),
            Message::ImagePicked(None) => Task::none(),
            Message::ImagePicked(Some(path)) => {
                let task_path = path.clone();
                Task::perform(
                    async move {
                        tokio::task::spawn_blocking(move || decode_image(task_path))
                            .await
                            .map_err(|e| e.to_string())?
                    },
                    move |result| Message::ImageDecoded(path, result),
                )
            }
            Message::ImageDecoded(path, Ok(image)) => {
                info!("Loaded image: {}", path.display());
                self.apply(|state| state.load(path, image));
                self.refresh_handles();
                Task::none()
            }
            Message::ImageDecoded(path, Err(message)) => {
                error!("Failed to load {}: {}", path.display(), message);
                show_dialog(
                    MessageLevel::Error,
                    "Cannot Open Image",
                    format!("{}\n\n{}", path.display(), message),
                )
            }
            Message::Process => {
                let state = std::mem::take(&mut self.state);
                let (state, request) = state.begin_process();
                self.state = state;

                match request {
                    Ok(request) => {
                        let pipeline = self.pipeline.clone();
                        let generation = request.generation;
                        Task::perform(
                            async move {
                                tokio::task::spawn_blocking(move || {
                                    pipeline
                                        .run(&request.path, &request.image)
                                        .map_err(|e| e.to_string())
                                })
                                .await
                                .map_err(|e| e.to_string())?
                            },
                            move |result| Message::Processed(generation, result),
                        )
                    }
                    Err(StateError::NoImageLoaded) => {
                        warn!("Process requested without an image");
                        show_dialog(
                            MessageLevel::Warning,
                            "No Image Loaded",
                            StateError::NoImageLoaded.to_string(),
                        )
                    }
                    Err(StateError::Busy) => Task::none(),
                }
            }
            Message::Processed(generation, Ok(outcome)) => {
                info!(
                    "Report ready: {} line(s), saved to {}",
                    outcome.report.lines.len(),
                    outcome.output_path.display()
                );
                self.apply(|state| state.finish_process(generation, outcome));
                self.refresh_handles();
                Task::none()
            }
            Message::Processed(generation, Err(message)) => {
                error!("Processing failed: {}", message);
                self.apply(|state| state.fail_process(generation));
                show_dialog(MessageLevel::Error, "Processing Failed", message)
            }
            Message::Toggle => {
                self.apply(AppState::toggle);
                Task::none()
            }
            Message::Clear => {
                self.apply(AppState::clear);
                self.refresh_handles();
                Task::none()
            }
            Message::Exit => iced::exit(),
            Message::DialogClosed => Task::none(),
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        let handle = match self.state.view() {
            ViewMode::Annotated => self.annotated_handle.as_ref(),
            ViewMode::Original => self.original_handle.as_ref(),
        };

        let process_label = if self.state.is_processing() {
            "Processing..."
        } else {
            "Process Image"
        };

        let buttons = button_row([
            action_button("Exit", Some(Message::Exit)),
            action_button("Load Image", Some(Message::LoadImage)),
            action_button(
                process_label,
                self.state.can_process().then_some(Message::Process),
            ),
            action_button("Clear Image", Some(Message::Clear)),
            action_button(
                "Return",
                self.state.can_toggle().then_some(Message::Toggle),
            ),
        ]);

        column![
            image_panel(handle),
            report_panel(self.state.report()),
            buttons,
        ]
        .spacing(10)
        .padding(10)
        .into()
    }
}

fn decode_image(path: PathBuf) -> Result<Arc<DynamicImage>, String> {
    let decoded = ImageReader::open(&path)
        .map_err(|e| e.to_string())?
        .with_guessed_format()
        .map_err(|e| e.to_string())?
        .decode()
        .map_err(|e| e.to_string())?;
    Ok(Arc::new(decoded))
}

fn to_handle(image: &DynamicImage) -> Handle {
    let rgba = image.to_rgba8();
    Handle::from_rgba(rgba.width(), rgba.height(), rgba.into_raw())
}

/// Blocking message box; the window waits for it to be dismissed
fn show_dialog(level: MessageLevel, title: &str, description: String) -> Task<Message> {
    Task::perform(
        AsyncMessageDialog::new()
            .set_level(level)
            .set_title(title)
            .set_description(description)
            .set_buttons(MessageButtons::Ok)
            .show(),
        |_| Message::DialogClosed,
    )
}
