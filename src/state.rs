use std::collections::BTreeSet;
use std::path::Path;

use crate::color::{ColorBy, ColorMap};
use crate::config::PipelineConfig;
use crate::data::filter::{FilterState, visible_curves};
use crate::data::model::{CurveType, ScanBatch};
use crate::data::normalise::NormalisationMode;
use crate::pipeline::{self, ProcessedFile};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full viewer state, independent of rendering.
pub struct AppState {
    /// Successfully processed files.
    pub files: Vec<ProcessedFile>,

    /// Normalisation and ordering used for the displayed curves.
    pub config: PipelineConfig,

    /// Curve-type and file visibility.
    pub filters: FilterState,

    /// `(file, curve)` positions passing the current filters (cached).
    pub visible: Vec<(usize, usize)>,

    /// Active colour map.
    pub color_map: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(files: Vec<ProcessedFile>, config: PipelineConfig) -> Self {
        let mut state = Self {
            files,
            config,
            filters: FilterState::default(),
            visible: Vec::new(),
            color_map: ColorMap::new(ColorBy::default(), &BTreeSet::new()),
            status_message: None,
        };
        state.refresh();
        state
    }

    fn batches(&self) -> Vec<&ScanBatch> {
        self.files.iter().map(|f| &f.curves).collect()
    }

    /// Recompute visible curves and colours.
    pub fn refresh(&mut self) {
        self.visible = visible_curves(&self.batches(), &self.filters);
        self.rebuild_color_map(self.color_map.color_by);
    }

    /// Rebuild the colour map over every loaded curve.
    pub fn rebuild_color_map(&mut self, color_by: ColorBy) {
        let keys: BTreeSet<String> = self
            .files
            .iter()
            .enumerate()
            .flat_map(|(i, f)| f.curves.scans.iter().map(move |s| color_by.key(i, s)))
            .collect();
        self.color_map = ColorMap::new(color_by, &keys);
    }

    /// Re-run normalisation and ordering on every file's classified scans.
    ///
    /// All files are recomputed before any is replaced, so a failure leaves
    /// the previous curves on screen.
    pub fn apply_settings(&mut self, mode: NormalisationMode, reorder: bool) {
        let recomputed: Result<Vec<ScanBatch>, String> = self
            .files
            .iter()
            .map(|f| {
                pipeline::prepare(&f.classified, mode, reorder)
                    .map_err(|e| format!("{}: {e}", f.label()))
            })
            .collect();

        match recomputed {
            Ok(batches) => {
                for (file, curves) in self.files.iter_mut().zip(batches) {
                    file.curves = curves;
                }
                self.config.normalisation = mode;
                self.config.reorder = reorder;
                self.status_message = None;
                log::info!("normalisation {mode}, reorder {reorder}");
            }
            Err(msg) => {
                log::error!("cannot apply {mode} normalisation: {msg}");
                self.status_message = Some(format!("Error: {msg}"));
            }
        }
        self.refresh();
    }

    /// Load another `.mcc` file with the current settings. Tables are not
    /// written from the viewer.
    pub fn open_path(&mut self, path: &Path) {
        match pipeline::process_file(path, &self.config, false) {
            Ok(processed) => {
                log::info!("Loaded {} curves from {}", processed.curves.len(), path.display());
                self.files.push(processed);
                self.status_message = None;
                self.refresh();
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    pub fn toggle_curve_type(&mut self, kind: CurveType) {
        self.filters.toggle_curve_type(kind);
        self.refresh();
    }

    pub fn toggle_file(&mut self, file: usize) {
        self.filters.toggle_file(file);
        self.refresh();
    }

    pub fn total_curves(&self) -> usize {
        self.files.iter().map(|f| f.curves.len()).sum()
    }
}
