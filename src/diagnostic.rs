//! Diagnostic reporting for the parser, loader and optimizer passes.
//!
//! All user-facing reporting flows through a caller-supplied consumer callback,
//! keeping the core free of global state. The [`DiagnosticSink`] wraps the
//! callback and remembers whether a fatal diagnostic has been reported, which
//! passes use as their cooperative cancellation signal.

use std::fmt;

/// Severity of a reported diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Informational message, e.g. a pass explaining why it declined to run.
    Info,
    /// A condition worth flagging that does not affect the result.
    Warning,
    /// A recoverable error; processing of the current unit stops.
    Error,
    /// An unrecoverable error; the whole operation should be abandoned.
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
            Severity::Fatal => write!(f, "fatal"),
        }
    }
}

/// Location a diagnostic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// No particular location (module-level conditions).
    Module,
    /// A word index into the binary stream.
    Word(usize),
    /// The instruction with the given unique sequence number.
    Instruction(u32),
}

/// Callback receiving diagnostics from the core.
///
/// Implementations must not panic; they are invoked in the middle of parsing
/// and transformation.
pub type MessageConsumer = Box<dyn FnMut(Severity, Position, &str)>;

/// A consumer wrapper that tracks whether a fatal diagnostic was reported.
///
/// Passes check [`has_fatal`](Self::has_fatal) after substantive steps and
/// abandon processing when it is set, implementing the cooperative
/// cancellation model: no timeouts, no cross-thread signals, just a latch.
pub struct DiagnosticSink {
    consumer: Option<MessageConsumer>,
    fatal: bool,
}

impl DiagnosticSink {
    /// Creates a sink that forwards to the given consumer.
    #[must_use]
    pub fn new(consumer: MessageConsumer) -> Self {
        DiagnosticSink {
            consumer: Some(consumer),
            fatal: false,
        }
    }

    /// Creates a sink that drops all diagnostics.
    #[must_use]
    pub fn ignore() -> Self {
        DiagnosticSink {
            consumer: None,
            fatal: false,
        }
    }

    /// Reports a diagnostic to the consumer.
    ///
    /// A [`Severity::Fatal`] report latches the sink; subsequent calls to
    /// [`has_fatal`](Self::has_fatal) return `true` forever after.
    pub fn report(&mut self, severity: Severity, position: Position, message: &str) {
        if severity == Severity::Fatal {
            self.fatal = true;
        }
        if let Some(consumer) = self.consumer.as_mut() {
            consumer(severity, position, message);
        }
    }

    /// Reports an informational diagnostic with no particular location.
    pub fn info(&mut self, message: &str) {
        self.report(Severity::Info, Position::Module, message);
    }

    /// Returns whether a fatal diagnostic has been reported.
    #[must_use]
    pub fn has_fatal(&self) -> bool {
        self.fatal
    }
}

impl Default for DiagnosticSink {
    fn default() -> Self {
        DiagnosticSink::ignore()
    }
}

impl fmt::Debug for DiagnosticSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticSink")
            .field("fatal", &self.fatal)
            .field("consumer", &self.consumer.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_sink_forwards_messages() {
        let seen: Rc<RefCell<Vec<(Severity, String)>>> = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();
        let mut sink = DiagnosticSink::new(Box::new(move |sev, _pos, msg| {
            seen_clone.borrow_mut().push((sev, msg.to_string()));
        }));

        sink.report(Severity::Warning, Position::Word(12), "odd alignment");
        sink.info("pass skipped");

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], (Severity::Warning, "odd alignment".to_string()));
        assert_eq!(seen[1], (Severity::Info, "pass skipped".to_string()));
    }

    #[test]
    fn test_fatal_latches() {
        let mut sink = DiagnosticSink::ignore();
        assert!(!sink.has_fatal());

        sink.report(Severity::Error, Position::Module, "recoverable");
        assert!(!sink.has_fatal());

        sink.report(Severity::Fatal, Position::Module, "unrecoverable");
        assert!(sink.has_fatal());

        sink.report(Severity::Info, Position::Module, "later");
        assert!(sink.has_fatal());
    }
}
