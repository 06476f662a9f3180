//! Terminal overlay sink

use sentinel_api::Overlay;
use sentinel_host_api::{DisplayControl, Frame, OverlaySink};
use std::io::Write;
use std::time::{Duration, Instant};
use tracing::debug;

/// Prints the overlay as a status line.
///
/// A line is printed when its content apart from the frame rate changes, or
/// at most once per `min_interval` while it stays the same. A failed write is
/// retried on the next frame. Quitting is left to the process signal handler.
pub struct ConsoleOverlay {
    out: Box<dyn Write + Send>,
    min_interval: Duration,
    last_print: Option<Instant>,
    last_line: String,
}

impl ConsoleOverlay {
    pub fn new(min_interval: Duration) -> Self {
        Self::with_writer(min_interval, Box::new(std::io::stdout()))
    }

    pub fn with_writer(min_interval: Duration, out: Box<dyn Write + Send>) -> Self {
        Self {
            out,
            min_interval,
            last_print: None,
            last_line: String::new(),
        }
    }

    fn should_print(&self, line: &str) -> bool {
        if line != self.last_line {
            return true;
        }
        self.last_print
            .is_none_or(|at| at.elapsed() >= self.min_interval)
    }
}

impl Default for ConsoleOverlay {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl OverlaySink for ConsoleOverlay {
    fn present(&mut self, frame: &Frame, overlay: &Overlay) -> DisplayControl {
        // Frame rate alone does not count as a change
        let mut steady = overlay.clone();
        steady.fps = None;
        let key = steady.status_line();

        if self.should_print(&key) {
            match writeln!(self.out, "[frame {:>6}] {}", frame.sequence, overlay.status_line()) {
                Ok(()) => {
                    self.last_print = Some(Instant::now());
                    self.last_line = key;
                }
                Err(e) => debug!(error = %e, "Failed to write status line"),
            }
        }

        DisplayControl::Continue
    }

    fn close(&mut self) {
        if let Err(e) = self.out.flush() {
            debug!(error = %e, "Failed to flush console");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn test_repeats_are_throttled_but_changes_print() {
        let captured = Captured::default();
        let mut console =
            ConsoleOverlay::with_writer(Duration::from_secs(60), Box::new(captured.clone()));
        let frame = Frame::default();
        let mut warning = Overlay::new();
        warning.set_warning(Duration::from_secs(2));

        assert!(console.should_print("clear"));
        console.present(&frame, &Overlay::new());
        assert!(!console.should_print("clear"));
        assert!(console.should_print(&warning.status_line()));

        let mut faster = Overlay::new();
        faster.set_fps(59.0);
        console.present(&frame, &faster);
        assert!(!console.should_print("clear"));

        console.present(&frame, &warning);
        assert_eq!(
            captured.text(),
            "[frame      0] clear\n[frame      0] WARNING: 2.0s\n"
        );
    }

    #[test]
    fn test_write_failure_is_retried_next_frame() {
        let mut console = ConsoleOverlay::with_writer(Duration::from_secs(60), Box::new(Broken));

        assert_eq!(
            console.present(&Frame::default(), &Overlay::new()),
            DisplayControl::Continue
        );
        assert!(console.should_print("clear"));
        console.close();
    }

    #[test]
    fn test_never_requests_quit() {
        let mut console = ConsoleOverlay::with_writer(
            Duration::from_secs(1),
            Box::new(Captured::default()),
        );
        assert_eq!(
            console.present(&Frame::default(), &Overlay::new()),
            DisplayControl::Continue
        );
    }
}
