//! The engine facade: one notebook, one surface, one sink.

use inkleaf_core::viewport::Viewport;
use inkleaf_core::{
    ConfigError, DecodeError, DecodeTarget, DecodeTicket, EngineConfig, EraserMode, ImageDecoder,
    InkColor, Notebook, Page, PaperPattern, Placement, PointerEvent, PointerPhase, Raster,
    Response, Router, Snapshot, SnapshotSink, StaleReason, StorageError, Theme, Tool,
};
use inkleaf_render::{
    Compositor, RenderError, Scene, SelectionStyle, Surface, compose_display, take_snapshot,
};
use kurbo::Point;
use thiserror::Error;

/// Engine errors.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Stateful annotation canvas.
///
/// All mutation happens synchronously inside the calling thread. Image
/// decodes are split into a request (returning a ticket) and a completion,
/// so a host can run the decode however it likes and hand the result back.
pub struct Engine {
    config: EngineConfig,
    viewport: Viewport,
    notebook: Notebook,
    router: Router,
    compositor: Compositor,
    surface: Surface,
    sink: Box<dyn SnapshotSink>,
    /// Top-left of the canvas element on screen, in device pixels.
    layout_origin: Point,
}

impl Engine {
    /// Create an engine with one blank page.
    pub fn new(mut config: EngineConfig, sink: Box<dyn SnapshotSink>) -> Result<Self, EngineError> {
        config.normalize();

        let notebook = Notebook::new(config.page_size);
        let mut viewport = Viewport::new(notebook.current().size());
        viewport.set_zoom(config.zoom);
        let surface = Surface::new(viewport.internal_size())?;

        let mut engine = Self {
            compositor: Compositor::new(SelectionStyle::from_config(&config)),
            config,
            viewport,
            notebook,
            router: Router::new(),
            surface,
            sink,
            layout_origin: Point::ZERO,
        };
        engine.redraw();
        Ok(engine)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Replace the whole configuration.
    pub fn set_config(&mut self, mut config: EngineConfig) {
        config.normalize();
        self.notebook.set_default_size(config.page_size);
        self.compositor
            .set_selection_style(SelectionStyle::from_config(&config));
        let zoom = config.zoom;
        self.config = config;
        self.viewport.set_zoom(zoom);
        self.redraw();
    }

    pub fn set_tool(&mut self, tool: Tool) {
        log::debug!("Tool: {tool:?}");
        self.config.tool = tool;
    }

    pub fn set_eraser_mode(&mut self, mode: EraserMode) {
        self.config.eraser_mode = mode;
    }

    pub fn set_color(&mut self, color: InkColor) {
        self.config.color = color;
    }

    pub fn set_stroke_width(&mut self, width: f64) {
        self.config.stroke_width = width;
        self.config.normalize();
    }

    pub fn set_palm_rejection(&mut self, enabled: bool) {
        self.config.palm_rejection = enabled;
    }

    pub fn set_paper_pattern(&mut self, pattern: PaperPattern) {
        self.config.paper_pattern = pattern;
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.config.set_theme(theme);
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn zoom(&self) -> f64 {
        self.viewport.zoom()
    }

    /// Set the zoom. Returns true if it changed (which triggers a redraw).
    pub fn set_zoom(&mut self, zoom: f64) -> bool {
        let changed = self.viewport.set_zoom(zoom);
        self.after_zoom(changed)
    }

    pub fn zoom_in(&mut self) -> bool {
        let changed = self.viewport.zoom_in();
        self.after_zoom(changed)
    }

    pub fn zoom_out(&mut self) -> bool {
        let changed = self.viewport.zoom_out();
        self.after_zoom(changed)
    }

    fn after_zoom(&mut self, changed: bool) -> bool {
        if changed {
            self.config.zoom = self.viewport.zoom();
            log::debug!("Zoom: {:.2}", self.viewport.zoom());
            self.redraw();
        }
        changed
    }

    /// Where the canvas element sits on screen, in device pixels.
    pub fn set_layout_origin(&mut self, origin: Point) {
        self.layout_origin = origin;
    }

    /// Route one pointer event and apply the result to the surface.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Response {
        let response = match event.phase {
            PointerPhase::Up | PointerPhase::Leave => {
                self.router.pointer_up(self.notebook.current_mut(), &self.config)
            }
            PointerPhase::Down | PointerPhase::Move => {
                let Some(point) = self
                    .viewport
                    .device_to_canvas(event.position, self.layout_origin)
                else {
                    return Response::none();
                };
                if event.phase == PointerPhase::Down {
                    self.router.pointer_down(
                        self.notebook.current_mut(),
                        &self.config,
                        self.viewport.zoom(),
                        point,
                        event.kind,
                    )
                } else {
                    self.router
                        .pointer_move(self.notebook.current_mut(), &self.config, point)
                }
            }
        };
        self.apply(response);
        response
    }

    fn apply(&mut self, response: Response) {
        if response.redraw {
            self.redraw();
        } else if let Some(paint) = response.paint {
            self.compositor.paint(&mut self.surface, &paint);
        }
        if response.save {
            self.save();
        }
    }

    /// Recomposite the current page.
    pub fn redraw(&mut self) {
        let scene = Scene::from_page(self.notebook.current(), self.viewport.zoom());
        self.compositor.render(&mut self.surface, &scene);
    }

    /// Encode the current page.
    pub fn snapshot(&self) -> Result<Snapshot, RenderError> {
        take_snapshot(&self.surface, self.notebook.current_index())
    }

    /// Snapshot the current page and hand it to the sink. Failures are logged.
    pub fn save(&mut self) {
        let snapshot = match self.snapshot() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::warn!("Snapshot failed: {e}");
                return;
            }
        };
        match self.sink.save(&snapshot) {
            Ok(()) => log::info!(
                "Saved page {} ({} bytes)",
                snapshot.page_index,
                snapshot.png.len()
            ),
            Err(e) => log::warn!("Save of page {} failed: {e}", snapshot.page_index),
        }
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// The surface composed over the paper pattern, for display only.
    pub fn display_frame(&self) -> Result<tiny_skia::Pixmap, RenderError> {
        compose_display(
            &self.surface,
            self.config.paper_pattern,
            self.config.theme,
            self.viewport.zoom(),
        )
    }

    // --- Pages ---

    pub fn notebook(&self) -> &Notebook {
        &self.notebook
    }

    pub fn page(&self) -> &Page {
        self.notebook.current()
    }

    pub fn current_page(&self) -> usize {
        self.notebook.current_index()
    }

    pub fn page_count(&self) -> usize {
        self.notebook.page_count()
    }

    /// Advance, creating a blank page past the last one.
    pub fn next_page(&mut self) -> usize {
        self.finish_gesture();
        let index = self.notebook.next_page();
        log::info!("Page {} of {}", index + 1, self.notebook.page_count());
        self.enter_page();
        index
    }

    /// Go back one page. No-op on the first page.
    pub fn prev_page(&mut self) -> bool {
        self.finish_gesture();
        if !self.notebook.prev_page() {
            return false;
        }
        log::info!("Page {} of {}", self.current_page() + 1, self.page_count());
        self.enter_page();
        true
    }

    /// Jump to an existing page.
    pub fn load_page(&mut self, index: usize) -> bool {
        self.finish_gesture();
        if !self.notebook.load_page(index) {
            return false;
        }
        log::info!("Page {} of {}", index + 1, self.page_count());
        self.enter_page();
        true
    }

    /// End any gesture as a pointer-up would, so nothing is lost mid-stroke.
    fn finish_gesture(&mut self) {
        if !self.router.is_idle() {
            let response = self.router.pointer_up(self.notebook.current_mut(), &self.config);
            self.apply(response);
        }
    }

    fn enter_page(&mut self) {
        self.sync_surface();
        self.redraw();
    }

    /// Match the surface and viewport to the current page's resolution.
    fn sync_surface(&mut self) {
        let size = self.notebook.current().size();
        match self.surface.resize(size) {
            Ok(_) => self.viewport.set_internal_size(size),
            Err(e) => log::warn!("Keeping previous surface: {e}"),
        }
    }

    // --- Images ---

    /// Start decoding a background for the current page.
    pub fn request_background(&mut self) -> DecodeTicket {
        self.notebook.request_decode(DecodeTarget::Background)
    }

    /// Start decoding an image to insert on the current page.
    pub fn request_image(&mut self, placement: Placement) -> DecodeTicket {
        self.notebook.request_decode(DecodeTarget::Insert(placement))
    }

    /// Deliver a decode result. Returns true if it was applied.
    ///
    /// Failed decodes, superseded requests and results for a page that is no
    /// longer current are dropped.
    pub fn complete_decode(
        &mut self,
        ticket: &DecodeTicket,
        result: Result<Raster, DecodeError>,
    ) -> bool {
        let target = match self.notebook.resolve_decode(ticket) {
            Ok(target) => target,
            Err(StaleReason::Superseded) => {
                log::debug!("Dropping superseded decode");
                return false;
            }
            Err(StaleReason::PageChanged) => {
                log::debug!("Dropping decode for a page that is no longer current");
                return false;
            }
        };
        let raster = match result {
            Ok(raster) => raster,
            Err(e) => {
                log::warn!("Image decode failed: {e}");
                return false;
            }
        };
        match target {
            DecodeTarget::Background => {
                log::info!("Background {}x{}", raster.width(), raster.height());
                self.notebook.current_mut().set_background(raster);
                self.sync_surface();
                self.redraw();
            }
            DecodeTarget::Insert(placement) => {
                let min = self.config.min_image_size;
                let index = self.notebook.current_mut().images.add(raster, placement, min);
                log::debug!("Inserted image {index}");
                self.redraw();
                self.save();
            }
        }
        true
    }

    /// Decode and insert an image in one call.
    pub async fn insert_image(
        &mut self,
        decoder: &dyn ImageDecoder,
        bytes: Vec<u8>,
        placement: Placement,
    ) -> bool {
        let ticket = self.request_image(placement);
        let result = decoder.decode(bytes).await;
        self.complete_decode(&ticket, result)
    }

    /// Decode and install a page background in one call.
    pub async fn load_background(&mut self, decoder: &dyn ImageDecoder, bytes: Vec<u8>) -> bool {
        let ticket = self.request_background();
        let result = decoder.decode(bytes).await;
        self.complete_decode(&ticket, result)
    }

    /// Reopen the sink's last snapshot of the current page as its background.
    ///
    /// Only a blank page can be reopened: the snapshot already contains the
    /// page's ink and images.
    pub async fn restore_from_sink(&mut self, decoder: &dyn ImageDecoder) -> Result<bool, EngineError> {
        if !self.page().is_blank() {
            log::warn!("Not reopening page {}: it already has content", self.current_page() + 1);
            return Ok(false);
        }
        let bytes = self.sink.load(self.current_page())?;
        Ok(self.load_background(decoder, bytes).await)
    }

    /// Set the selected image's opacity.
    pub fn set_selected_opacity(&mut self, opacity: f64) -> bool {
        let page = self.notebook.current_mut();
        let Some(index) = page.images.selected() else {
            return false;
        };
        if !page.images.set_opacity(index, opacity) {
            return false;
        }
        self.redraw();
        self.save();
        true
    }

    /// Delete the selected image.
    pub fn remove_selected(&mut self) -> bool {
        if self.notebook.current_mut().images.remove_selected().is_none() {
            return false;
        }
        self.redraw();
        self.save();
        true
    }
}
