//! Interactive four-corner selection.
//!
//! Selection is a request/response exchange: the calibrator presents a
//! frame and receives either four ordered corners or a cancellation.
//! [`PickerSession`] holds the in-progress state shared by all pickers:
//! points beyond the fourth are ignored, a reset clears the selection,
//! and confirmation only succeeds with exactly four points.

use std::io::{BufRead, Write};

use courtside_common::{CalibrationError, CalibrationResult};
use courtside_court_model::Point2D;
use image::RgbImage;

/// Something that can ask an operator for the four court corners.
pub trait CornerPicker {
    /// Block until four corners are confirmed (top-left, top-right,
    /// bottom-right, bottom-left) or selection is cancelled.
    fn present(&mut self, frame: &RgbImage) -> CalibrationResult<[Point2D; 4]>;
}

/// One operator action during selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PickerEvent {
    Point(Point2D),
    Reset,
    Confirm,
    Cancel,
}

/// In-progress corner selection.
#[derive(Debug, Clone, Default)]
pub struct PickerSession {
    points: Vec<Point2D>,
}

impl PickerSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[Point2D] {
        &self.points
    }

    pub fn is_complete(&self) -> bool {
        self.points.len() == 4
    }

    /// Add a point. Returns false (and ignores it) once four are held.
    pub fn add_point(&mut self, point: Point2D) -> bool {
        if self.is_complete() {
            return false;
        }
        self.points.push(point);
        true
    }

    pub fn reset(&mut self) {
        self.points.clear();
    }

    /// The four points, if exactly four are held.
    pub fn confirm(&self) -> Option<[Point2D; 4]> {
        match self.points.as_slice() {
            [a, b, c, d] => Some([*a, *b, *c, *d]),
            _ => None,
        }
    }

    /// Apply an event. Returns the final outcome once selection ends.
    pub fn handle(&mut self, event: PickerEvent) -> Option<CalibrationResult<[Point2D; 4]>> {
        match event {
            PickerEvent::Point(p) => {
                if !self.add_point(p) {
                    tracing::debug!("Ignoring extra corner, four already selected");
                }
                None
            }
            PickerEvent::Reset => {
                self.reset();
                None
            }
            PickerEvent::Confirm => self.confirm().map(Ok),
            PickerEvent::Cancel => Some(Err(CalibrationError::Cancelled)),
        }
    }
}

/// Replays a fixed list of events. Running out of events cancels.
#[derive(Debug, Clone)]
pub struct ScriptedCornerPicker {
    events: Vec<PickerEvent>,
}

impl ScriptedCornerPicker {
    pub fn new(events: Vec<PickerEvent>) -> Self {
        Self { events }
    }

    /// Select four known corners and confirm.
    pub fn fixed(corners: [Point2D; 4]) -> Self {
        let mut events: Vec<PickerEvent> = corners.into_iter().map(PickerEvent::Point).collect();
        events.push(PickerEvent::Confirm);
        Self::new(events)
    }
}

impl CornerPicker for ScriptedCornerPicker {
    fn present(&mut self, _frame: &RgbImage) -> CalibrationResult<[Point2D; 4]> {
        let mut session = PickerSession::new();
        for event in self.events.drain(..) {
            if let Some(outcome) = session.handle(event) {
                return outcome;
            }
        }
        Err(CalibrationError::Cancelled)
    }
}

/// Terminal picker driven by line commands:
///
/// ```text
/// <x> <y>   add a corner
/// r         reset the selection
/// c         confirm (needs four corners)
/// q         cancel
/// ```
///
/// End of input cancels.
pub struct StdinCornerPicker<R, W> {
    input: R,
    output: W,
}

impl StdinCornerPicker<std::io::StdinLock<'static>, std::io::Stderr> {
    /// Read commands from stdin, prompt on stderr.
    pub fn stdin() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stderr())
    }
}

impl<R: BufRead, W: Write> StdinCornerPicker<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn parse(line: &str) -> Option<PickerEvent> {
        match line.trim() {
            "r" => Some(PickerEvent::Reset),
            "c" => Some(PickerEvent::Confirm),
            "q" => Some(PickerEvent::Cancel),
            other => {
                let mut parts = other.split_whitespace();
                let x = parts.next()?.parse::<f64>().ok()?;
                let y = parts.next()?.parse::<f64>().ok()?;
                if parts.next().is_some() || !x.is_finite() || !y.is_finite() {
                    return None;
                }
                Some(PickerEvent::Point(Point2D::new(x, y)))
            }
        }
    }
}

impl<R: BufRead, W: Write> CornerPicker for StdinCornerPicker<R, W> {
    fn present(&mut self, frame: &RgbImage) -> CalibrationResult<[Point2D; 4]> {
        let mut session = PickerSession::new();
        // Prompt output is best effort; a closed stderr must not abort selection.
        let _ = writeln!(
            self.output,
            "Frame is {}x{}. Enter corners as `x y` (top-left, top-right, bottom-right, bottom-left); \
             `r` resets, `c` confirms, `q` cancels.",
            frame.width(),
            frame.height()
        );

        let mut line = String::new();
        loop {
            line.clear();
            match self.input.read_line(&mut line) {
                Ok(0) => return Err(CalibrationError::Cancelled),
                Ok(_) => {}
                Err(e) => {
                    return Err(CalibrationError::PickerInput {
                        message: e.to_string(),
                    });
                }
            }

            let Some(event) = Self::parse(&line) else {
                let _ = writeln!(self.output, "Unrecognised input: {}", line.trim());
                continue;
            };
            if let Some(outcome) = session.handle(event) {
                return outcome;
            }
            match event {
                PickerEvent::Confirm => {
                    let _ = writeln!(
                        self.output,
                        "Need 4 corners to confirm, have {}",
                        session.points().len()
                    );
                }
                PickerEvent::Reset => {
                    let _ = writeln!(self.output, "Selection reset");
                }
                _ => {
                    let _ = writeln!(self.output, "{}/4 corners", session.points().len());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> RgbImage {
        RgbImage::new(8, 8)
    }

    fn corners() -> [Point2D; 4] {
        [(0.0, 0.0), (10.0, 0.0), (10.0, 20.0), (0.0, 20.0)].map(Point2D::from)
    }

    #[test]
    fn test_session_ignores_fifth_point() {
        let mut session = PickerSession::new();
        for p in corners() {
            assert!(session.add_point(p));
        }
        assert!(!session.add_point(Point2D::new(99.0, 99.0)));
        assert_eq!(session.confirm(), Some(corners()));
    }

    #[test]
    fn test_confirm_requires_four() {
        let mut session = PickerSession::new();
        session.add_point(Point2D::new(1.0, 1.0));
        assert_eq!(session.handle(PickerEvent::Confirm), None);
        session.reset();
        assert!(session.points().is_empty());
    }

    #[test]
    fn test_scripted_picker_with_reset() {
        let mut events = vec![
            PickerEvent::Point(Point2D::new(5.0, 5.0)),
            PickerEvent::Reset,
            PickerEvent::Confirm,
        ];
        events.extend(corners().map(PickerEvent::Point));
        events.push(PickerEvent::Confirm);

        let mut picker = ScriptedCornerPicker::new(events);
        assert_eq!(picker.present(&frame()), Ok(corners()));
    }

    #[test]
    fn test_cancel_is_distinct_outcome() {
        let mut picker = ScriptedCornerPicker::new(vec![
            PickerEvent::Point(Point2D::new(5.0, 5.0)),
            PickerEvent::Cancel,
        ]);
        assert_eq!(picker.present(&frame()), Err(CalibrationError::Cancelled));
    }

    #[test]
    fn test_stdin_picker_reads_commands() {
        let input = "1 2\nr\nnonsense\n0 0\n10 0\n10 20\nc\n0 20\n7 7\nc\n";
        let mut output = Vec::new();
        let mut picker = StdinCornerPicker::new(input.as_bytes(), &mut output);
        assert_eq!(picker.present(&frame()), Ok(corners()));

        let printed = String::from_utf8(output).unwrap();
        assert!(printed.contains("Need 4 corners"));
        assert!(printed.contains("Unrecognised input: nonsense"));
    }

    struct BrokenInput;

    impl std::io::Read for BrokenInput {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "terminal closed"))
        }
    }

    #[test]
    fn test_stdin_read_failure_is_not_a_cancel() {
        let input = std::io::BufReader::new(BrokenInput);
        let mut picker = StdinCornerPicker::new(input, std::io::sink());
        let err = picker.present(&frame()).unwrap_err();
        assert_eq!(
            err,
            CalibrationError::PickerInput {
                message: "terminal closed".to_string()
            }
        );
        assert!(!courtside_common::CourtsideError::from(err).is_cancellation());
    }

    #[test]
    fn test_stdin_picker_cancels_at_end_of_input() {
        let mut picker = StdinCornerPicker::new("0 0\n".as_bytes(), std::io::sink());
        assert_eq!(picker.present(&frame()), Err(CalibrationError::Cancelled));
    }
}
