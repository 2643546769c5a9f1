use thiserror::Error;

/// Problems with the spectrum frames handed to the band aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpectrumError {
    #[error("spectrum frame is empty")]
    Empty,
    #[error("spectrum length changed: expected {expected} bins, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("band output buffer has {actual} slots, expected {expected}")]
    OutputLengthMismatch { expected: usize, actual: usize },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ColorMapError {
    #[error("color map needs at least one color")]
    Empty,
    #[error("{cutoffs} cutoffs given for {colors} colors")]
    LengthMismatch { cutoffs: usize, colors: usize },
    #[error("cutoff {index} ({value}) is not strictly above the previous cutoff")]
    NotAscending { index: usize, value: f32 },
    #[error("cutoff {index} ({value}) is outside (0, 1]")]
    OutOfRange { index: usize, value: f32 },
    #[error("last cutoff is {0}, expected 1.0")]
    LastCutoffNotOne(f32),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("no display modes configured")]
    NoDisplayModes,
    #[error("grid of {rows}x{cols} has no pixels")]
    EmptyGrid { rows: usize, cols: usize },
    #[error("spectrum length must be greater than 0")]
    EmptySpectrum,
}

/// Failure of a single rendered frame.
#[derive(Debug, Error)]
pub enum RenderError<E> {
    #[error(transparent)]
    Spectrum(#[from] SpectrumError),
    #[error("pixel sink failed to show the frame")]
    Sink(E),
}
