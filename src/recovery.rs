use crate::capture::{CaptureEvent, SpeechCapture, TranscriptDelivery};
use crate::config::KioskSettings;
use crate::error::{Error, Result};
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_settings(&KioskSettings::default())
    }
}

impl RetryPolicy {
    pub fn from_settings(settings: &KioskSettings) -> Self {
        Self {
            max_retries: settings.capture_max_retries,
            backoff: Duration::from_millis(settings.capture_backoff_ms),
        }
    }
}

pub struct CaptureSupervisor<C, S = fn(Duration)> {
    capture: C,
    policy: RetryPolicy,
    sleep: S,
    wants_listening: bool,
    consecutive_failures: u32,
}

impl<C: SpeechCapture> CaptureSupervisor<C, fn(Duration)> {
    pub fn new(capture: C, policy: RetryPolicy) -> Self {
        Self::with_sleeper(capture, policy, std::thread::sleep)
    }
}

impl<C: SpeechCapture, S: FnMut(Duration)> CaptureSupervisor<C, S> {
    pub fn with_sleeper(capture: C, policy: RetryPolicy, sleep: S) -> Self {
        Self {
            capture,
            policy,
            sleep,
            wants_listening: false,
            consecutive_failures: 0,
        }
    }

    pub fn capture(&self) -> &C {
        &self.capture
    }

    pub fn wants_listening(&self) -> bool {
        self.wants_listening
    }

    pub fn start(&mut self) -> Result<()> {
        self.wants_listening = true;
        self.consecutive_failures = 0;
        match self.capture.start() {
            Ok(()) => {
                info!(capture = self.capture.label(), "speech capture started");
                Ok(())
            }
            Err(error) => self.recover(error.to_string()),
        }
    }

    pub fn stop(&mut self) {
        self.wants_listening = false;
        self.capture.stop();
        info!(capture = self.capture.label(), "speech capture stopped");
    }

    /// Next transcript delivery, restarting capture whenever it ends while
    /// listening is wanted. `Ok(None)` means the source is exhausted or
    /// capture ended after a requested stop.
    pub fn next_delivery(&mut self) -> Result<Option<TranscriptDelivery>> {
        loop {
            match self.capture.next_event() {
                Some(CaptureEvent::Transcript(delivery)) => {
                    self.consecutive_failures = 0;
                    return Ok(Some(delivery));
                }
                Some(CaptureEvent::Ended) => {
                    if !self.wants_listening {
                        return Ok(None);
                    }
                    self.recover("capture ended unexpectedly".to_string())?;
                }
                Some(CaptureEvent::Failed(reason)) => {
                    if !self.wants_listening {
                        return Ok(None);
                    }
                    self.recover(reason)?;
                }
                None => return Ok(None),
            }
        }
    }

    fn recover(&mut self, reason: String) -> Result<()> {
        let mut last_error = reason;
        loop {
            if self.consecutive_failures >= self.policy.max_retries {
                self.wants_listening = false;
                warn!(
                    attempts = self.consecutive_failures,
                    error = %last_error,
                    "giving up on speech capture"
                );
                return Err(Error::RetriesExhausted {
                    attempts: self.consecutive_failures,
                    last_error,
                });
            }

            self.consecutive_failures += 1;
            warn!(
                attempt = self.consecutive_failures,
                max_retries = self.policy.max_retries,
                error = %last_error,
                "restarting speech capture"
            );
            (self.sleep)(self.policy.backoff);

            match self.capture.start() {
                Ok(()) => return Ok(()),
                Err(error) => last_error = error.to_string(),
            }
        }
    }
}
