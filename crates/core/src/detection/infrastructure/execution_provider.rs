use std::path::Path;

use ort::session::Session;

use super::model_resolver::ModelLoadError;

/// Build an inference session for `model_path` on the preferred execution
/// provider for the current platform.
///
/// ONNX Runtime falls back to CPU when the platform provider cannot be
/// registered.
pub fn load_session(model_path: &Path) -> Result<Session, ModelLoadError> {
    let session_err = |message: String| ModelLoadError::Session {
        path: model_path.to_path_buf(),
        message,
    };

    Session::builder()
        .map_err(|e| session_err(e.to_string()))?
        .with_execution_providers(preferred_execution_providers())
        .map_err(|e| session_err(e.to_string()))?
        .commit_from_file(model_path)
        .map_err(|e| session_err(e.to_string()))
}

fn preferred_execution_providers() -> Vec<ort::execution_providers::ExecutionProviderDispatch> {
    #[cfg(target_os = "macos")]
    {
        vec![ort::execution_providers::CoreMLExecutionProvider::default().build()]
    }
    #[cfg(target_os = "windows")]
    {
        vec![ort::execution_providers::DirectMLExecutionProvider::default().build()]
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        vec![]
    }
}
