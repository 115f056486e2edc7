use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use anyhow::{Context as _, Result};
use eframe::egui::{self, Context, Vec2};
use tracing::{info, warn};

use crate::data::{Dataset, Record, RecordId, load_dataset};
use crate::layout::{CategoryLabel, CategoryLayout, LayoutConfig, category_labels, solve};
use crate::session::Session;

mod canvas;
mod render_utils;
mod search;
mod ui;

/// Startup settings handed over from the command line.
#[derive(Clone, Debug)]
pub struct StartupOptions {
    pub input: Option<PathBuf>,
    pub max_records: usize,
    pub config: LayoutConfig,
}

pub struct SwarmApp {
    options: StartupOptions,
    last_path: Option<PathBuf>,
    state: AppState,
    reload_rx: Option<Receiver<Result<LoadedDataset, String>>>,
}

enum AppState {
    Idle {
        path_input: String,
    },
    Loading {
        rx: Receiver<Result<LoadedDataset, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct LoadedDataset {
    path: PathBuf,
    dataset: Dataset,
    layout: CategoryLayout,
    solved: Vec<Record>,
    config: LayoutConfig,
}

struct LayoutResult {
    config: LayoutConfig,
    layout: CategoryLayout,
    solved: Vec<Record>,
}

struct ViewModel {
    path: PathBuf,
    source: String,
    session: Session,
    categories: Vec<String>,
    truncated_from: Option<usize>,
    defaults: LayoutConfig,
    config: LayoutConfig,
    draft: LayoutConfig,
    labels: Vec<CategoryLabel>,
    pending_layout: Option<Receiver<(u64, Result<LayoutResult, String>)>>,
    layout_error: Option<String>,
    search: String,
    search_match_cache: Option<SearchMatchCache>,
    pan: Vec2,
    zoom: f32,
    fit_requested: bool,
}

struct SearchMatchCache {
    query: String,
    revision: u64,
    matches: Arc<HashSet<RecordId>>,
}

fn load_and_solve(path: PathBuf, max_records: usize, config: LayoutConfig) -> Result<LoadedDataset> {
    let dataset = load_dataset(&path, max_records)
        .with_context(|| format!("failed to ingest {}", path.display()))?;
    let layout = CategoryLayout::for_config(&config, &dataset.categories());
    let solved = solve(&dataset.records, &layout, &config)
        .with_context(|| format!("failed to lay out posts from {}", path.display()))?;

    Ok(LoadedDataset {
        path,
        dataset,
        layout,
        solved,
        config,
    })
}

impl SwarmApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, options: StartupOptions) -> Self {
        let state = match options.input.clone() {
            Some(path) => Self::start_load(path, &options),
            None => AppState::Idle {
                path_input: String::new(),
            },
        };

        Self {
            last_path: options.input.clone(),
            options,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(
        path: PathBuf,
        max_records: usize,
        config: LayoutConfig,
    ) -> Receiver<Result<LoadedDataset, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result =
                load_and_solve(path, max_records, config).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(path: PathBuf, options: &StartupOptions) -> AppState {
        info!(path = %path.display(), "loading posts");
        AppState::Loading {
            rx: Self::spawn_load(path, options.max_records, options.config.clone()),
        }
    }

    fn dropped_file(ctx: &Context) -> Option<PathBuf> {
        ctx.input(|input| {
            input
                .raw
                .dropped_files
                .iter()
                .find_map(|file| file.path.clone())
        })
    }

    fn show_idle(ctx: &Context, path_input: &mut String) -> Option<PathBuf> {
        let mut requested = None;
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(120.0);
                ui.heading("Open a posts JSON file");
                ui.add_space(8.0);
                ui.label("Expected: an array of objects with Month, Sentiment, Subjectivity and RawTweet.");
                ui.add_space(8.0);
                let response = ui.text_edit_singleline(path_input);
                let submitted =
                    response.lost_focus() && ui.input(|input| input.key_pressed(egui::Key::Enter));
                if (ui.button("Load").clicked() || submitted) && !path_input.trim().is_empty() {
                    requested = Some(PathBuf::from(path_input.trim()));
                }
                ui.add_space(6.0);
                ui.small("...or drop a .json file onto this window.");
            });
        });
        requested
    }
}

impl eframe::App for SwarmApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;
        let dropped = Self::dropped_file(ctx);

        match &mut self.state {
            AppState::Idle { path_input } => {
                if let Some(path) = Self::show_idle(ctx, path_input).or(dropped) {
                    self.last_path = Some(path.clone());
                    transition = Some(Self::start_load(path, &self.options));
                }
            }
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(result) => {
                        transition = Some(match result {
                            Ok(loaded) => AppState::Ready(Box::new(ViewModel::new(loaded))),
                            Err(error) => AppState::Error(error),
                        });
                    }
                    Err(TryRecvError::Empty) => ctx.request_repaint(),
                    Err(TryRecvError::Disconnected) => {
                        transition =
                            Some(AppState::Error("Background load worker disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading posts and solving layout...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load posts");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    ui.horizontal(|ui| {
                        if let Some(path) = &self.last_path
                            && ui.button("Retry").clicked()
                        {
                            transition = Some(Self::start_load(path.clone(), &self.options));
                        }
                        if ui.button("Open another file").clicked() {
                            transition = Some(AppState::Idle {
                                path_input: String::new(),
                            });
                        }
                    });
                });

                if transition.is_none()
                    && let Some(path) = dropped
                {
                    self.last_path = Some(path.clone());
                    transition = Some(Self::start_load(path, &self.options));
                }
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &mut reload_requested, is_reloading);

                let next_path = if let Some(path) = dropped {
                    Some(path)
                } else if reload_requested {
                    Some(model.path.clone())
                } else {
                    None
                };

                // A newer request replaces the pending one; its result is never read.
                if let Some(path) = next_path {
                    info!(path = %path.display(), "replacing dataset");
                    self.last_path = Some(path.clone());
                    self.reload_rx = Some(Self::spawn_load(
                        path,
                        self.options.max_records,
                        model.config.clone(),
                    ));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(Ok(loaded)) => model.replace_dataset(loaded),
                        Ok(Err(error)) => transition = Some(AppState::Error(error)),
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition = Some(AppState::Error(
                                "Background load worker disconnected".to_owned(),
                            ));
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}

impl ViewModel {
    fn new(loaded: LoadedDataset) -> Self {
        let LoadedDataset {
            path,
            dataset,
            layout,
            solved,
            config,
        } = loaded;

        let categories = dataset.categories();
        let mut session = Session::new(dataset.records);
        if !session.apply_layout(session.revision(), solved) {
            warn!("initial layout did not match the ingested records");
        }
        let labels = category_labels(&layout, &config, session.records());

        Self {
            path,
            source: dataset.source,
            session,
            categories,
            truncated_from: dataset.truncated_from,
            defaults: config.clone(),
            draft: config.clone(),
            config,
            labels,
            pending_layout: None,
            layout_error: None,
            search: String::new(),
            search_match_cache: None,
            pan: Vec2::ZERO,
            zoom: 1.0,
            fit_requested: true,
        }
    }

    /// Swaps in a freshly loaded dataset. Color mode, layout settings and the view survive; the
    /// selection does not.
    fn replace_dataset(&mut self, loaded: LoadedDataset) {
        let LoadedDataset {
            path,
            dataset,
            layout,
            solved,
            config,
        } = loaded;

        self.categories = dataset.categories();
        self.path = path;
        self.source = dataset.source;
        self.truncated_from = dataset.truncated_from;

        let revision = self.session.ingest(dataset.records);
        if !self.session.apply_layout(revision, solved) {
            warn!("reloaded layout did not match the ingested records");
        }
        self.labels = category_labels(&layout, &config, self.session.records());
        self.config = config;
        self.pending_layout = None;
        self.layout_error = None;
        self.fit_requested = true;
    }

    /// Re-solves the current records with the draft settings in the background.
    fn request_layout(&mut self) {
        let records = self.session.records().to_vec();
        let config = self.draft.clone();
        let categories = self.categories.clone();
        let revision = self.session.revision();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let layout = CategoryLayout::for_config(&config, &categories);
            let result = solve(&records, &layout, &config)
                .map(|solved| LayoutResult {
                    config,
                    layout,
                    solved,
                })
                .map_err(|error| error.to_string());
            let _ = tx.send((revision, result));
        });

        self.pending_layout = Some(rx);
    }

    fn poll_layout(&mut self, ctx: &Context) {
        let Some(rx) = self.pending_layout.take() else {
            return;
        };

        match rx.try_recv() {
            Ok((revision, Ok(result))) => {
                if self.session.apply_layout(revision, result.solved) {
                    self.labels =
                        category_labels(&result.layout, &result.config, self.session.records());
                    if result.config.width != self.config.width
                        || result.config.height != self.config.height
                        || result.config.mode != self.config.mode
                    {
                        self.fit_requested = true;
                    }
                    self.config = result.config;
                    self.layout_error = None;
                }
            }
            Ok((_, Err(error))) => {
                warn!(%error, "layout request failed");
                self.layout_error = Some(error);
            }
            Err(TryRecvError::Empty) => {
                self.pending_layout = Some(rx);
                ctx.request_repaint();
            }
            Err(TryRecvError::Disconnected) => {
                self.layout_error = Some("Layout worker disconnected".to_owned());
            }
        }
    }

    fn is_solving(&self) -> bool {
        self.pending_layout.is_some()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{LoadedDataset, ViewModel};
    use crate::color::ColorMode;
    use crate::data::{Dataset, Record};
    use crate::layout::{CategoryLayout, LayoutConfig, LayoutMode, solve};

    fn loaded(path: &str, count: usize, config: &LayoutConfig) -> LoadedDataset {
        let records = (0..count)
            .map(|id| {
                let month = if id % 2 == 0 { "March" } else { "April" };
                Record::new(id, month, 0.1, 0.6, format!("{path} post {id}"))
            })
            .collect();
        let dataset = Dataset {
            source: path.to_owned(),
            records,
            truncated_from: None,
        };
        let layout = CategoryLayout::for_config(config, &dataset.categories());
        let solved = solve(&dataset.records, &layout, config).expect("solvable");

        LoadedDataset {
            path: PathBuf::from(path),
            dataset,
            layout,
            solved,
            config: config.clone(),
        }
    }

    #[test]
    fn replacing_the_dataset_keeps_user_choices() {
        let mut model = ViewModel::new(loaded("first.json", 4, &LayoutConfig::default()));
        model.session.on_color_mode_change(ColorMode::Subjectivity);
        model.session.on_point_click(1);
        model.draft.repulsion_strength = 30.0;
        model.search = "post".to_owned();

        let applied = LayoutConfig {
            mode: LayoutMode::PerCategory,
            ..LayoutConfig::default()
        };
        model.replace_dataset(loaded("second.json", 6, &applied));

        assert_eq!(model.session.color_mode(), ColorMode::Subjectivity);
        assert!(model.session.selection().is_empty());
        assert_eq!(model.draft.repulsion_strength, 30.0);
        assert_eq!(model.config.mode, LayoutMode::PerCategory);
        assert_eq!(model.search, "post");
        assert_eq!(model.source, "second.json");
        assert_eq!(model.session.records().len(), 6);
        assert!(
            model
                .session
                .records()
                .iter()
                .all(|record| record.position.is_some())
        );
        assert_eq!(model.labels.len(), 2);
    }
}
