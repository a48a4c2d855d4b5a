use crate::emitter::Emitter;
use crate::layer::EmitterLayer;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Error returned when installing the global subscriber.
#[derive(thiserror::Error, Debug)]
pub enum InitError {
    #[error("a global tracing subscriber is already installed")]
    AlreadyInstalled(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Install a [`Registry`] with an [`EmitterLayer`] as the global default
/// `tracing` subscriber, so every `tracing` event in the process is printed
/// through `emitter`.
///
/// **Returns**
/// - `Ok(())` once the subscriber is installed.
/// - `Err(InitError::AlreadyInstalled)` if another global subscriber was
///   set first.
pub fn init_tracing(emitter: Arc<Emitter>) -> Result<(), InitError> {
    let subscriber = Registry::default().with(EmitterLayer::new(emitter));
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
