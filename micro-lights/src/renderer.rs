use crate::bar_graph::BarGraph;
use crate::error::RenderError;
use crate::grid_display::GridDisplay;
use crate::pipeline::{BandPipeline, RenderState};
use crate::pixel_sink::PixelSink;
use crate::types::Level;
use crate::waterfall::Waterfall;

/// What a frame did to the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The envelope is not ready yet; the display was blanked.
    Calibrating,
    Rendered,
}

pub trait Renderer {
    /// Consumes one spectrum frame and shows it on `sink`.
    fn render<S: PixelSink>(
        &mut self,
        spectrum: &[f32],
        sink: &mut S,
    ) -> Result<FrameOutcome, RenderError<S::Error>>;

    fn state(&self) -> RenderState;
}

/// Runs one frame through `pipeline`: bin, normalize, `draw`, show, then fold
/// the frame into the envelope. `draw` gets `None` while calibrating and must
/// blank its pixels.
///
/// The envelope is updated even when the sink fails to show the frame.
pub(crate) fn drive_frame<S, F>(
    pipeline: &mut BandPipeline,
    spectrum: &[f32],
    sink: &mut S,
    draw: F,
) -> Result<FrameOutcome, RenderError<S::Error>>
where
    S: PixelSink,
    F: FnOnce(Option<&[Level]>, &mut S),
{
    pipeline.load(spectrum)?;
    let levels = pipeline.normalize();
    let outcome = match levels {
        Some(_) => FrameOutcome::Rendered,
        None => FrameOutcome::Calibrating,
    };
    draw(levels, sink);
    let shown = sink.show();
    pipeline.commit();
    shown.map_err(RenderError::Sink)?;
    Ok(outcome)
}

/// The display modes a device can cycle through.
#[derive(Debug, Clone)]
pub enum DisplayMode {
    Grid(GridDisplay),
    BarGraph(BarGraph),
    Waterfall(Waterfall),
}

impl DisplayMode {
    pub fn name(&self) -> &'static str {
        match self {
            DisplayMode::Grid(_) => "grid",
            DisplayMode::BarGraph(_) => "bar graph",
            DisplayMode::Waterfall(_) => "waterfall",
        }
    }
}

impl Renderer for DisplayMode {
    fn render<S: PixelSink>(
        &mut self,
        spectrum: &[f32],
        sink: &mut S,
    ) -> Result<FrameOutcome, RenderError<S::Error>> {
        match self {
            DisplayMode::Grid(display) => display.render(spectrum, sink),
            DisplayMode::BarGraph(display) => display.render(spectrum, sink),
            DisplayMode::Waterfall(display) => display.render(spectrum, sink),
        }
    }

    fn state(&self) -> RenderState {
        match self {
            DisplayMode::Grid(display) => display.state(),
            DisplayMode::BarGraph(display) => display.state(),
            DisplayMode::Waterfall(display) => display.state(),
        }
    }
}

impl From<GridDisplay> for DisplayMode {
    fn from(display: GridDisplay) -> Self {
        DisplayMode::Grid(display)
    }
}

impl From<BarGraph> for DisplayMode {
    fn from(display: BarGraph) -> Self {
        DisplayMode::BarGraph(display)
    }
}

impl From<Waterfall> for DisplayMode {
    fn from(display: Waterfall) -> Self {
        DisplayMode::Waterfall(display)
    }
}
