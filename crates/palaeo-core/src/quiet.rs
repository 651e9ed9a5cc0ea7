//! Scoped suppression of the process's standard output.
//!
//! Backends tend to print long parameter dumps while they build a pipeline.
//! [`SuppressStdout`] points file descriptor 1 at the null device for as long
//! as a guard lives and puts the original descriptor back when the last
//! guard drops, whether the scope ends normally, through `?`, or by unwinding.
//!
//! Descriptor 1 is process-wide, so guards are reference counted: overlapping
//! guards on different threads share one redirection. The redirection also
//! swallows anything other threads write to stdout while any guard is held.

use std::cell::Cell;
use std::marker::PhantomData;
use std::sync::Mutex;

#[cfg(unix)]
type SavedFd = libc::c_int;
#[cfg(not(unix))]
type SavedFd = ();

struct Redirect {
    depth: usize,
    saved: Option<SavedFd>,
}

static REDIRECT: Mutex<Redirect> = Mutex::new(Redirect {
    depth: 0,
    saved: None,
});

thread_local! {
    static HELD_HERE: Cell<usize> = const { Cell::new(0) };
}

/// Guard that keeps stdout pointed at the null device.
///
/// Output printed by any thread while a guard is alive is lost, not just
/// output from the thread holding it. Anything meant for the user during
/// pipeline construction belongs on stderr.
#[must_use = "stdout is restored as soon as the guard is dropped"]
pub struct SuppressStdout {
    active: bool,
    // released on the thread that acquired it
    _not_send: PhantomData<*const ()>,
}

impl SuppressStdout {
    /// Redirect stdout. If the redirection cannot be set up the guard is
    /// inert and output goes through.
    pub fn acquire() -> Self {
        let mut state = REDIRECT.lock().unwrap_or_else(|e| e.into_inner());
        if state.depth == 0 {
            flush_stdout();
            state.saved = redirect_to_null();
        }
        state.depth += 1;
        HELD_HERE.with(|held| held.set(held.get() + 1));
        Self {
            active: state.saved.is_some(),
            _not_send: PhantomData,
        }
    }

    /// Whether output is actually being discarded.
    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl Drop for SuppressStdout {
    fn drop(&mut self) {
        HELD_HERE.with(|held| held.set(held.get().saturating_sub(1)));
        let mut state = REDIRECT.lock().unwrap_or_else(|e| e.into_inner());
        state.depth = state.depth.saturating_sub(1);
        if state.depth == 0 {
            flush_stdout();
            if let Some(saved) = state.saved.take() {
                restore(saved);
            }
        }
    }
}

/// Whether the calling thread holds a guard and stdout is actually redirected.
pub fn is_suppressed() -> bool {
    if HELD_HERE.with(Cell::get) == 0 {
        return false;
    }
    REDIRECT
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .saved
        .is_some()
}

fn flush_stdout() {
    use std::io::Write;
    let _ = std::io::stdout().flush();
}

#[cfg(unix)]
fn redirect_to_null() -> Option<SavedFd> {
    use std::os::unix::io::AsRawFd;
    use tracing::warn;

    let devnull = match std::fs::OpenOptions::new().write(true).open("/dev/null") {
        Ok(f) => f,
        Err(e) => {
            warn!("Cannot open /dev/null, stdout stays attached: {}", e);
            return None;
        }
    };

    // SAFETY: descriptor juggling on fd 1, which the process always has, and
    // on descriptors created here; every failure path closes what it duplicated.
    unsafe {
        // close-on-exec so workers spawned under the guard do not hold the real stdout open
        let saved = libc::fcntl(libc::STDOUT_FILENO, libc::F_DUPFD_CLOEXEC, 0);
        if saved < 0 {
            warn!("duplicating stdout failed, stdout stays attached");
            return None;
        }
        if libc::dup2(devnull.as_raw_fd(), libc::STDOUT_FILENO) < 0 {
            warn!("dup2 onto stdout failed, stdout stays attached");
            libc::close(saved);
            return None;
        }
        Some(saved)
    }
}

#[cfg(unix)]
fn restore(saved: SavedFd) {
    // SAFETY: `saved` was duplicated in `redirect_to_null` and is closed exactly once.
    unsafe {
        if libc::dup2(saved, libc::STDOUT_FILENO) < 0 {
            tracing::warn!("Failed to restore stdout");
        }
        libc::close(saved);
    }
}

#[cfg(not(unix))]
fn redirect_to_null() -> Option<SavedFd> {
    None
}

#[cfg(not(unix))]
fn restore(_saved: SavedFd) {}
