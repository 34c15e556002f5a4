use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::io::BufRead;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranscriptDelivery {
    pub text: String,
    /// Interim hypotheses are still changing and must not reach the cart.
    pub is_final: bool,
    #[serde(default)]
    pub confidence: Option<f32>,
}

impl TranscriptDelivery {
    pub fn finished(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: true,
            confidence: None,
        }
    }

    pub fn interim(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: false,
            confidence: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CaptureEvent {
    Transcript(TranscriptDelivery),
    /// The engine stopped on its own (silence timeout, tab hidden, ...).
    Ended,
    Failed(String),
}

pub trait SpeechCapture {
    fn start(&mut self) -> Result<()>;

    fn stop(&mut self);

    fn next_event(&mut self) -> Option<CaptureEvent>;

    fn label(&self) -> &'static str {
        "unknown"
    }
}

/// Replays a fixed list of events. Start can be made to fail a number of
/// times to exercise restart handling.
#[derive(Debug, Default)]
pub struct ScriptedCapture {
    events: VecDeque<CaptureEvent>,
    failing_starts: u32,
    start_calls: u32,
    running: bool,
}

impl ScriptedCapture {
    pub fn new(events: Vec<CaptureEvent>) -> Self {
        Self {
            events: events.into(),
            ..Self::default()
        }
    }

    pub fn with_failing_starts(mut self, count: u32) -> Self {
        self.failing_starts = count;
        self
    }

    pub fn start_calls(&self) -> u32 {
        self.start_calls
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

impl SpeechCapture for ScriptedCapture {
    fn start(&mut self) -> Result<()> {
        self.start_calls += 1;
        if self.failing_starts > 0 {
            self.failing_starts -= 1;
            return Err(Error::Capture("microphone unavailable".to_string()));
        }
        self.running = true;
        Ok(())
    }

    fn stop(&mut self) {
        self.running = false;
    }

    fn next_event(&mut self) -> Option<CaptureEvent> {
        let event = self.events.pop_front()?;
        if matches!(event, CaptureEvent::Ended | CaptureEvent::Failed(_)) {
            self.running = false;
        }
        Some(event)
    }

    fn label(&self) -> &'static str {
        "scripted"
    }
}

/// Treats each non-empty line of a reader as one finished utterance.
pub struct LineCapture<R: BufRead> {
    reader: R,
    running: bool,
}

impl<R: BufRead> LineCapture<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            running: false,
        }
    }
}

impl<R: BufRead> SpeechCapture for LineCapture<R> {
    fn start(&mut self) -> Result<()> {
        self.running = true;
        Ok(())
    }

    fn stop(&mut self) {
        self.running = false;
    }

    fn next_event(&mut self) -> Option<CaptureEvent> {
        if !self.running {
            return None;
        }
        loop {
            let mut line = String::new();
            match self.reader.read_line(&mut line) {
                Ok(0) => return None,
                Ok(_) => {
                    let text = line.trim();
                    if text.is_empty() {
                        continue;
                    }
                    return Some(CaptureEvent::Transcript(TranscriptDelivery::finished(text)));
                }
                Err(error) => return Some(CaptureEvent::Failed(error.to_string())),
            }
        }
    }

    fn label(&self) -> &'static str {
        "lines"
    }
}
