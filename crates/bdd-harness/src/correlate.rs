//! Failure-to-source correlation.
//!
//! Maps each raised failure back onto known application source by scanning
//! its trace frames top to bottom and attaching the first frame whose module
//! path the source registry knows about. At most one frame is correlated per
//! failure, however many frames match.

use crate::failure::StepFailure;
use crate::sources::SourceRegistry;

/// Lines of source context shown before the failing line.
const LINES_BEFORE: u32 = 5;
/// Lines of source context shown after the failing line.
const LINES_AFTER: u32 = 4;

/// One line of source context around a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    /// 1-based line number.
    pub number: u32,
    /// Raw line text, without the trailing newline.
    pub text: String,
    /// Whether this line is the one the failure reported.
    pub in_error: bool,
}

/// One raised failure, optionally correlated to application source.
#[derive(Debug, Clone)]
pub struct ErrorDetail {
    failure: StepFailure,
    source_path: Option<String>,
    error_line: Option<u32>,
    window: Vec<SourceLine>,
}

impl ErrorDetail {
    fn uncorrelated(failure: StepFailure) -> Self {
        Self {
            failure,
            source_path: None,
            error_line: None,
            window: Vec::new(),
        }
    }

    /// The underlying step failure.
    #[must_use]
    pub fn failure(&self) -> &StepFailure {
        &self.failure
    }

    /// Relative path of the correlated source file, when a frame matched.
    #[must_use]
    pub fn source_path(&self) -> Option<&str> {
        self.source_path.as_deref()
    }

    /// Reported line number within the correlated source file.
    #[must_use]
    pub fn error_line(&self) -> Option<u32> {
        self.error_line
    }

    /// Contiguous source window around the failing line, ascending by line
    /// number. Empty when no frame matched or the window was omitted at a
    /// file boundary.
    #[must_use]
    pub fn window(&self) -> &[SourceLine] {
        &self.window
    }
}

/// Extract the source window around a 1-based error line.
///
/// The window spans five lines before the error line through four lines
/// after it, clamped to the end of the file. It is omitted entirely when the
/// error line sits too close to the start of the file for the full backward
/// span to exist, or when the line lies beyond the end of the file.
#[must_use]
pub fn context_window(text: &str, error_line: u32) -> Vec<SourceLine> {
    let Some(start) = error_line.checked_sub(LINES_BEFORE) else {
        return Vec::new();
    };
    if start == 0 {
        return Vec::new();
    }
    let end = error_line.saturating_add(LINES_AFTER);
    let window: Vec<SourceLine> = text
        .lines()
        .enumerate()
        .filter_map(|(index, raw)| {
            let number = u32::try_from(index).ok()?.checked_add(1)?;
            (start..=end).contains(&number).then(|| SourceLine {
                number,
                text: raw.to_owned(),
                in_error: number == error_line,
            })
        })
        .collect();
    if window.iter().any(|line| line.in_error) {
        window
    } else {
        Vec::new()
    }
}

/// Correlate raised failures against the source registry, order-preserving.
///
/// A failure whose trace names no known module yields an [`ErrorDetail`]
/// carrying only the raw failure.
#[must_use]
pub fn build_errors(
    failures: Vec<StepFailure>,
    sources: &dyn SourceRegistry,
) -> Vec<ErrorDetail> {
    failures
        .into_iter()
        .map(|failure| correlate_one(failure, sources))
        .collect()
}

fn correlate_one(failure: StepFailure, sources: &dyn SourceRegistry) -> ErrorDetail {
    for frame in failure.frames() {
        let Some(source) = sources.lookup(&frame.module_path) else {
            continue;
        };
        let window = context_window(source.text(), frame.line);
        return ErrorDetail {
            source_path: Some(source.path().to_owned()),
            error_line: Some(frame.line),
            window,
            failure,
        };
    }
    ErrorDetail::uncorrelated(failure)
}
