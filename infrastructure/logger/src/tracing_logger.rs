use business::domain::logger::Logger;
use tracing::{debug, error, info, warn};

/// `Logger` adapter that forwards business-layer messages to `tracing`,
/// tagging every event with the component that produced it.
#[derive(Debug, Clone, Copy)]
pub struct TracingLogger {
    component: &'static str,
}

impl TracingLogger {
    pub fn new(component: &'static str) -> Self {
        Self { component }
    }

    pub fn component(&self) -> &'static str {
        self.component
    }
}

impl Default for TracingLogger {
    fn default() -> Self {
        Self::new("receipt_reader")
    }
}

impl Logger for TracingLogger {
    fn info(&self, message: &str) {
        info!(target: "receipt_reader", component = self.component, "{}", message);
    }
    fn warn(&self, message: &str) {
        warn!(target: "receipt_reader", component = self.component, "{}", message);
    }
    fn error(&self, message: &str) {
        error!(target: "receipt_reader", component = self.component, "{}", message);
    }
    fn debug(&self, message: &str) {
        debug!(target: "receipt_reader", component = self.component, "{}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn capture(run: impl FnOnce()) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, run);

        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn should_tag_messages_with_component() {
        let logger = TracingLogger::new("batch");

        let output = capture(|| logger.warn("image 2 failed"));

        assert!(output.contains("WARN"));
        assert!(output.contains("component=\"batch\""));
        assert!(output.contains("image 2 failed"));
    }

    #[test]
    fn should_forward_every_level() {
        let logger = TracingLogger::default();

        let output = capture(|| {
            logger.debug("d");
            logger.info("i");
            logger.error("e");
        });

        assert!(output.contains("DEBUG"));
        assert!(output.contains("INFO"));
        assert!(output.contains("ERROR"));
        assert_eq!(logger.component(), "receipt_reader");
    }
}
