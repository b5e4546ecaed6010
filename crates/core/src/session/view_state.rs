/// The three flags that gate what the UI shows.
///
/// Only the transition methods below mutate it. Each returns whether the
/// call changed anything, so callers can publish a new snapshot only when
/// needed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewState {
    pub fetching: bool,
    pub streaming: bool,
    pub detected: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            fetching: true,
            streaming: false,
            detected: false,
        }
    }
}

/// Which UI elements are on screen for a given [`ViewState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Visibility {
    pub start_button: bool,
    /// "We are trying to detect your face".
    pub loader: bool,
    pub video_blurred: bool,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Camera access was refused or no device exists.
    pub fn permission_denied(&mut self) -> bool {
        let changed = !self.fetching;
        self.fetching = true;
        changed
    }

    /// The stream reported its metadata. Only the first call has an effect.
    pub fn metadata_loaded(&mut self) -> bool {
        if self.streaming {
            return false;
        }
        self.fetching = false;
        self.streaming = true;
        true
    }

    /// A face was accepted. Only the first call has an effect; `detected`
    /// is never reset afterwards.
    ///
    /// `fetching` goes back to true here, which hides the loader once a face
    /// has been found.
    pub fn face_detected(&mut self) -> bool {
        if self.detected {
            return false;
        }
        self.detected = true;
        self.fetching = true;
        true
    }

    pub fn visibility(&self) -> Visibility {
        Visibility {
            start_button: !self.streaming,
            loader: !self.fetching,
            video_blurred: !self.detected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(fetching: bool, streaming: bool, detected: bool) -> ViewState {
        ViewState {
            fetching,
            streaming,
            detected,
        }
    }

    #[test]
    fn test_initial_state() {
        assert_eq!(ViewState::new(), state(true, false, false));
    }

    #[test]
    fn test_permission_denied_keeps_fetching() {
        let mut s = ViewState::new();
        assert!(!s.permission_denied());
        assert_eq!(s, state(true, false, false));
    }

    #[test]
    fn test_metadata_loaded_exactly_once() {
        let mut s = ViewState::new();
        assert!(s.metadata_loaded());
        assert_eq!(s, state(false, true, false));
        assert!(!s.metadata_loaded());
        assert_eq!(s, state(false, true, false));
    }

    #[test]
    fn test_first_detection_sets_detected_and_fetching() {
        let mut s = ViewState::new();
        s.metadata_loaded();
        assert!(s.face_detected());
        assert_eq!(s, state(true, true, true));
    }

    #[test]
    fn test_detected_is_idempotent() {
        let mut s = ViewState::new();
        s.metadata_loaded();
        s.face_detected();
        assert!(!s.face_detected());
        assert!(!s.face_detected());
        assert!(s.detected);
    }

    #[test]
    fn test_visibility_before_start() {
        let v = ViewState::new().visibility();
        assert!(v.start_button);
        assert!(!v.loader);
        assert!(v.video_blurred);
    }

    #[test]
    fn test_visibility_while_searching_for_face() {
        let mut s = ViewState::new();
        s.metadata_loaded();
        let v = s.visibility();
        assert!(!v.start_button);
        assert!(v.loader);
        assert!(v.video_blurred);
    }

    #[test]
    fn test_visibility_after_detection() {
        let mut s = ViewState::new();
        s.metadata_loaded();
        s.face_detected();
        let v = s.visibility();
        assert!(!v.start_button);
        assert!(!v.loader);
        assert!(!v.video_blurred);
    }
}
