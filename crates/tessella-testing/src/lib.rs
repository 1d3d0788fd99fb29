//! Deterministic test doubles for Tessella.
//!
//! [`FrameDriver`] owns a runtime on a virtual clock and delivers frames on
//! demand. [`HeadlessViewport`] pairs a resizable viewport with a
//! [`RecordingCanvas`] that captures draw operations for assertions.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tessella_core::{EventHandlerList, Runtime, RuntimeHandle, RuntimeScheduler};
use tessella_graphics::{
    Canvas, DrawError, ImageSource, Rect, Shape, Style, TextMetrics, TextOptions,
};
use tessella_ui::{ResizeEvent, Viewport};

/// Counts frame requests instead of waking a host loop.
#[derive(Default)]
pub struct ManualScheduler {
    requests: AtomicUsize,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl RuntimeScheduler for ManualScheduler {
    fn schedule_frame(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }
}

/// A runtime on a virtual clock, advanced explicitly from tests.
///
/// Each `advance_millis` call delivers exactly one frame at the new
/// virtual time, so tests control both the clock and the frame cadence.
pub struct FrameDriver {
    runtime: Runtime,
    scheduler: Arc<ManualScheduler>,
    now_nanos: Cell<u64>,
}

impl Default for FrameDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDriver {
    pub fn new() -> Self {
        let scheduler = Arc::new(ManualScheduler::new());
        let runtime = Runtime::new(scheduler.clone());
        Self {
            runtime,
            scheduler,
            now_nanos: Cell::new(0),
        }
    }

    pub fn handle(&self) -> RuntimeHandle {
        self.runtime.handle()
    }

    pub fn now_nanos(&self) -> u64 {
        self.now_nanos.get()
    }

    /// Total frame requests the runtime has made, coalesced or not.
    pub fn frame_requests(&self) -> usize {
        self.scheduler.requests()
    }

    pub fn has_pending_callbacks(&self) -> bool {
        self.runtime.handle().has_frame_callbacks()
    }

    /// Advances the virtual clock and delivers one frame.
    pub fn advance_millis(&self, millis: u64) {
        self.now_nanos
            .set(self.now_nanos.get() + millis * 1_000_000);
        self.runtime
            .handle()
            .drain_frame_callbacks(self.now_nanos.get());
    }

    /// Delivers `count` frames `step_millis` apart.
    pub fn run_frames(&self, count: usize, step_millis: u64) {
        for _ in 0..count {
            self.advance_millis(step_millis);
        }
    }
}

/// One recorded canvas operation.
#[derive(Clone, Debug)]
pub enum DrawOp {
    Clear,
    Rect { rect: Rect, styles: Vec<Style> },
    Shape { rect: Rect, styles: Vec<Style> },
    Image { dest: Rect, src: Option<Rect> },
    Text { text: String, x: f64, y: f64 },
    TextBlock { text: String, rect: Rect },
}

/// Canvas that records operations instead of rasterizing.
///
/// Text metrics are synthetic but deterministic: every character is half
/// the font size wide.
pub struct RecordingCanvas {
    width: f64,
    height: f64,
    scale_factor: f64,
    ops: Vec<DrawOp>,
}

impl RecordingCanvas {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            scale_factor: 1.0,
            ops: Vec::new(),
        }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn take_ops(&mut self) -> Vec<DrawOp> {
        std::mem::take(&mut self.ops)
    }

    pub fn clear_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Clear))
            .count()
    }
}

impl Canvas for RecordingCanvas {
    fn width(&self) -> f64 {
        self.width
    }

    fn set_width(&mut self, width: f64) {
        self.width = width;
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn set_height(&mut self, height: f64) {
        self.height = height;
    }

    fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    fn set_scale_factor(&mut self, scale_factor: f64) {
        self.scale_factor = scale_factor;
    }

    fn draw_rect(&mut self, rect: Rect, styles: &[Style]) -> Result<(), DrawError> {
        self.ops.push(DrawOp::Rect {
            rect,
            styles: styles.to_vec(),
        });
        Ok(())
    }

    fn draw_shape(
        &mut self,
        _shape: &dyn Shape,
        rect: Rect,
        styles: &[Style],
    ) -> Result<(), DrawError> {
        self.ops.push(DrawOp::Shape {
            rect,
            styles: styles.to_vec(),
        });
        Ok(())
    }

    fn draw_image(
        &mut self,
        _image: &dyn ImageSource,
        dest: Rect,
        src: Option<Rect>,
    ) -> Result<(), DrawError> {
        self.ops.push(DrawOp::Image { dest, src });
        Ok(())
    }

    fn draw_text(
        &mut self,
        text: &str,
        x: f64,
        y: f64,
        _options: &TextOptions,
        _styles: &[Style],
    ) -> Result<(), DrawError> {
        self.ops.push(DrawOp::Text {
            text: text.to_owned(),
            x,
            y,
        });
        Ok(())
    }

    fn draw_text_block(
        &mut self,
        text: &str,
        rect: Rect,
        _options: &TextOptions,
        _styles: &[Style],
    ) -> Result<(), DrawError> {
        self.ops.push(DrawOp::TextBlock {
            text: text.to_owned(),
            rect,
        });
        Ok(())
    }

    fn measure_text(&mut self, text: &str, options: &TextOptions) -> TextMetrics {
        let width = text.chars().count() as f64 * options.font_size * 0.5;
        let height = options.font_size * options.line_height;
        TextMetrics {
            width,
            height,
            ascent: options.font_size * 0.8,
            descent: options.font_size * 0.2,
        }
    }

    fn clear(&mut self) {
        self.ops.push(DrawOp::Clear);
    }
}

/// In-memory viewport over a [`RecordingCanvas`].
pub struct HeadlessViewport {
    width: Cell<f64>,
    height: Cell<f64>,
    scale_factor: Cell<f64>,
    canvas: Rc<RefCell<RecordingCanvas>>,
    on_resize: EventHandlerList<ResizeEvent>,
}

impl HeadlessViewport {
    pub fn new(width: f64, height: f64) -> Rc<Self> {
        Rc::new(Self {
            width: Cell::new(width),
            height: Cell::new(height),
            scale_factor: Cell::new(1.0),
            canvas: Rc::new(RefCell::new(RecordingCanvas::new(width, height))),
            on_resize: EventHandlerList::new(),
        })
    }

    /// Shared handle to the recording canvas for assertions.
    pub fn recording(&self) -> Rc<RefCell<RecordingCanvas>> {
        Rc::clone(&self.canvas)
    }

    pub fn set_scale_factor(&self, scale_factor: f64) {
        self.scale_factor.set(scale_factor);
    }

    /// Changes the dimensions and fires the resize list.
    pub fn resize(&self, width: f64, height: f64) {
        self.width.set(width);
        self.height.set(height);
        self.on_resize.invoke(&ResizeEvent { width, height });
    }
}

impl Viewport for HeadlessViewport {
    fn width(&self) -> f64 {
        self.width.get()
    }

    fn height(&self) -> f64 {
        self.height.get()
    }

    fn scale_factor(&self) -> f64 {
        self.scale_factor.get()
    }

    fn canvas(&self) -> Rc<RefCell<dyn Canvas>> {
        self.canvas.clone()
    }

    fn on_resize(&self) -> EventHandlerList<ResizeEvent> {
        self.on_resize.clone()
    }
}
