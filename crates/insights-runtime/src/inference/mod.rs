//! External inference backend
//!
//! The pipeline only sees [`InferenceBackend`]: a prompt goes in, an
//! [`Envelope`] or a classified [`InferenceError`] comes out. Retrying is the
//! caller's job, driven by [`RetryPolicy`].

mod command;
mod envelope;
mod error;
mod retry;

pub use command::{CommandBackend, STDERR_EXCERPT_CHARS, resolve_program};
pub use envelope::Envelope;
pub use error::InferenceError;
pub use retry::RetryPolicy;

/// Something that can answer a prompt
pub trait InferenceBackend {
    /// Model selector, used to locate per-model statistics in the envelope
    fn model(&self) -> &str;

    fn invoke(&self, prompt: &str) -> Result<Envelope, InferenceError>;
}

impl<T: InferenceBackend + ?Sized> InferenceBackend for &T {
    fn model(&self) -> &str {
        (**self).model()
    }

    fn invoke(&self, prompt: &str) -> Result<Envelope, InferenceError> {
        (**self).invoke(prompt)
    }
}
