//! Audio alert seam.
//!
//! The session calls the notifier for warning and completion signals when
//! sound is enabled. Failures never reach the timer: they are logged and
//! dropped.

/// Receives alert signals. Implementations produce the actual sound.
pub trait Notifier {
    /// One beep.
    fn warning(&self) -> std::io::Result<()>;

    /// Two beeps.
    fn completion(&self) -> std::io::Result<()>;
}

/// Notifier that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn warning(&self) -> std::io::Result<()> {
        Ok(())
    }

    fn completion(&self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn warning(&self) -> std::io::Result<()> {
        (**self).warning()
    }

    fn completion(&self) -> std::io::Result<()> {
        (**self).completion()
    }
}
