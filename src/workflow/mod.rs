//! Client-side scan workflow: an explicit state machine for one verification
//! round trip, plus the scoped camera acquisition used by optical scanning.

use sha2::{Digest, Sha256};
use std::time::Duration;
use thiserror::Error;

use crate::db::models::Medicine;
use crate::services::Verification;
use crate::utils::normalize_code;

/// Minimum duration of the "scanning" indicator. The lookup itself is an
/// indexed local query; the delay exists only so the scan feels deliberate.
pub const SCAN_FEEDBACK_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ScanState {
    #[default]
    Idle,
    Scanning { code: String },
    ResultFound { medicine: Medicine },
    ResultNotFound { code: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("Please enter a medicine code")]
    EmptyCode,
    #[error("A scan is already in progress")]
    ScanInProgress,
    #[error("No scan is in progress")]
    NoScanInProgress,
}

/// The single owner of scan-session state. Transitions happen only through
/// [`submit`](Self::submit), [`complete`](Self::complete), and
/// [`reset`](Self::reset).
#[derive(Debug, Default)]
pub struct ScanWorkflow {
    state: ScanState,
}

impl ScanWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    pub fn is_scanning(&self) -> bool {
        matches!(self.state, ScanState::Scanning { .. })
    }

    /// Accepts user input and moves to `Scanning`, returning the normalized
    /// code. Blank input is rejected before any store call; an in-flight scan
    /// cannot be replaced (no cancellation is supported).
    pub fn submit(&mut self, raw_code: &str) -> Result<String, WorkflowError> {
        if self.is_scanning() {
            return Err(WorkflowError::ScanInProgress);
        }
        let code = normalize_code(raw_code);
        if code.is_empty() {
            return Err(WorkflowError::EmptyCode);
        }
        self.state = ScanState::Scanning { code: code.clone() };
        Ok(code)
    }

    /// Records the verification outcome as the terminal render state.
    pub fn complete(&mut self, verification: &Verification) -> Result<(), WorkflowError> {
        if !self.is_scanning() {
            return Err(WorkflowError::NoScanInProgress);
        }
        self.state = match verification {
            Verification::Found { medicine } => ScanState::ResultFound {
                medicine: medicine.clone(),
            },
            Verification::NotFound { code } => ScanState::ResultNotFound { code: code.clone() },
        };
        Ok(())
    }

    /// Any user action on a terminal state returns the workflow to `Idle`.
    pub fn reset(&mut self) {
        self.state = ScanState::Idle;
    }
}

/// Cosmetic SHA-256 hex of the entered code, shown alongside the input field.
/// Pure derived display data: recomputed whenever the code changes, never
/// persisted, and never consulted by the verification logic.
pub fn code_digest(code: &str) -> Option<String> {
    let code = normalize_code(code);
    if code.is_empty() {
        return None;
    }
    let digest = Sha256::digest(code.as_bytes());
    Some(digest.iter().map(|b| format!("{:02x}", b)).collect())
}

#[derive(Error, Debug)]
#[error("Camera unavailable: {0}")]
pub struct CameraError(pub String);

/// Device-facing half of the optical scan flow. The concrete camera library is
/// supplied by the host application.
pub trait OpticalScanner {
    fn start(&mut self) -> Result<(), CameraError>;
    fn stop(&mut self);
}

/// Scoped acquisition of the camera: `stop` runs exactly once whether the
/// session ends in a decode, an explicit cancel, or teardown via `Drop`.
pub struct CameraSession<S: OpticalScanner> {
    scanner: S,
    released: bool,
}

impl<S: OpticalScanner> CameraSession<S> {
    /// Starts an exclusive scan session. On failure the camera was never
    /// acquired and manual code entry remains available.
    pub fn start(mut scanner: S) -> Result<Self, CameraError> {
        scanner.start()?;
        Ok(Self {
            scanner,
            released: false,
        })
    }

    /// Replaces the session in `slot`, stopping any prior session before the
    /// new acquisition. At most one session is ever active.
    pub fn restart(slot: &mut Option<Self>, scanner: S) -> Result<(), CameraError> {
        if let Some(previous) = slot.take() {
            previous.cancel();
        }
        *slot = Some(Self::start(scanner)?);
        Ok(())
    }

    /// Decode succeeded: release the camera and hand back the normalized code.
    pub fn finish(mut self, decoded: &str) -> String {
        self.release();
        normalize_code(decoded)
    }

    /// The user cancelled the scan.
    pub fn cancel(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !self.released {
            self.scanner.stop();
            self.released = true;
        }
    }
}

impl<S: OpticalScanner> Drop for CameraSession<S> {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::seed::sample_medicines;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn blank_input_never_leaves_idle() {
        let mut workflow = ScanWorkflow::new();
        assert_eq!(workflow.submit("   "), Err(WorkflowError::EmptyCode));
        assert_eq!(workflow.state(), &ScanState::Idle);
    }

    #[test]
    fn submit_normalizes_and_starts_scanning() {
        let mut workflow = ScanWorkflow::new();
        let code = workflow.submit(" med001234 ").unwrap();
        assert_eq!(code, "MED001234");
        assert!(workflow.is_scanning());
    }

    #[test]
    fn in_flight_scan_cannot_be_replaced() {
        let mut workflow = ScanWorkflow::new();
        workflow.submit("MED001234").unwrap();
        assert_eq!(
            workflow.submit("MED005678"),
            Err(WorkflowError::ScanInProgress)
        );
    }

    #[test]
    fn complete_requires_a_scan_in_progress() {
        let mut workflow = ScanWorkflow::new();
        let verification = Verification::NotFound {
            code: "ZZZ000000".to_string(),
        };
        assert_eq!(
            workflow.complete(&verification),
            Err(WorkflowError::NoScanInProgress)
        );
    }

    #[test]
    fn full_cycle_returns_to_idle() {
        let medicine = sample_medicines().remove(0);
        let mut workflow = ScanWorkflow::new();
        workflow.submit(&medicine.code).unwrap();
        workflow
            .complete(&Verification::Found {
                medicine: medicine.clone(),
            })
            .unwrap();
        assert_eq!(workflow.state(), &ScanState::ResultFound { medicine });
        workflow.reset();
        assert_eq!(workflow.state(), &ScanState::Idle);
    }

    #[test]
    fn code_digest_matches_known_vector() {
        assert_eq!(
            code_digest("MED001234").unwrap(),
            "bd126fff908ba84304cb0a4d0c54368d2fc7b6913d7aa4ea890a16bfb34e92b9"
        );
        // Normalization happens before hashing, so case and padding are moot.
        assert_eq!(code_digest(" med001234 "), code_digest("MED001234"));
        assert_eq!(code_digest("  "), None);
    }

    struct MockScanner {
        stops: Rc<Cell<usize>>,
        fail_start: bool,
    }

    impl OpticalScanner for MockScanner {
        fn start(&mut self) -> Result<(), CameraError> {
            if self.fail_start {
                return Err(CameraError("permission denied".to_string()));
            }
            Ok(())
        }

        fn stop(&mut self) {
            self.stops.set(self.stops.get() + 1);
        }
    }

    fn mock(stops: &Rc<Cell<usize>>, fail_start: bool) -> MockScanner {
        MockScanner {
            stops: Rc::clone(stops),
            fail_start,
        }
    }

    #[test]
    fn finish_releases_exactly_once() {
        let stops = Rc::new(Cell::new(0));
        let session = CameraSession::start(mock(&stops, false)).unwrap();
        let code = session.finish("med001234");
        assert_eq!(code, "MED001234");
        assert_eq!(stops.get(), 1);
    }

    #[test]
    fn cancel_and_teardown_each_release_once() {
        let stops = Rc::new(Cell::new(0));
        let session = CameraSession::start(mock(&stops, false)).unwrap();
        session.cancel();
        assert_eq!(stops.get(), 1);

        let stops = Rc::new(Cell::new(0));
        {
            let _session = CameraSession::start(mock(&stops, false)).unwrap();
        }
        assert_eq!(stops.get(), 1);
    }

    #[test]
    fn restart_stops_the_prior_session_first() {
        let stops = Rc::new(Cell::new(0));
        let mut slot = None;
        CameraSession::restart(&mut slot, mock(&stops, false)).unwrap();
        CameraSession::restart(&mut slot, mock(&stops, false)).unwrap();
        assert_eq!(stops.get(), 1);
        drop(slot);
        assert_eq!(stops.get(), 2);
    }

    #[test]
    fn start_failure_is_recoverable() {
        let stops = Rc::new(Cell::new(0));
        let result = CameraSession::start(mock(&stops, true));
        assert!(result.is_err());
        // Nothing was acquired, so nothing is released.
        assert_eq!(stops.get(), 0);
    }
}
