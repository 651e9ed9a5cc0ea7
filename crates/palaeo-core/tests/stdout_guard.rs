//! Descriptor-level checks for `SuppressStdout`. These live in their own test
//! binary so no other test is redirecting stdout at the same time.
#![cfg(unix)]

use std::sync::Mutex;

use palaeo_core::quiet::is_suppressed;
use palaeo_core::SuppressStdout;

static SERIAL: Mutex<()> = Mutex::new(());

fn identity(fd: libc::c_int) -> (u64, u64) {
    // SAFETY: fstat into a zeroed buffer on a descriptor the test owns or fd 1.
    unsafe {
        let mut st: libc::stat = std::mem::zeroed();
        assert_eq!(libc::fstat(fd, &mut st), 0);
        (st.st_dev as u64, st.st_ino as u64)
    }
}

fn stdout_identity() -> (u64, u64) {
    identity(libc::STDOUT_FILENO)
}

fn devnull_identity() -> (u64, u64) {
    use std::os::unix::io::AsRawFd;
    let file = std::fs::File::open("/dev/null").unwrap();
    identity(file.as_raw_fd())
}

#[test]
fn redirects_then_restores() {
    let _serial = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    let before = stdout_identity();
    {
        let guard = SuppressStdout::acquire();
        assert!(guard.is_active());
        assert_eq!(stdout_identity(), devnull_identity());
        println!("discarded");
    }
    assert_eq!(stdout_identity(), before);
}

#[test]
fn restores_on_error_return() {
    fn build() -> Result<(), String> {
        let _quiet = SuppressStdout::acquire();
        Err("pipeline construction failed".to_string())
    }

    let _serial = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    let before = stdout_identity();
    assert!(build().is_err());
    assert_eq!(stdout_identity(), before);
}

#[test]
fn restores_after_panic() {
    let _serial = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    let before = stdout_identity();
    let result = std::panic::catch_unwind(|| {
        let _quiet = SuppressStdout::acquire();
        panic!("backend blew up");
    });
    assert!(result.is_err());
    assert_eq!(stdout_identity(), before);
}

#[test]
fn overlapping_guards_restore_once_all_are_gone() {
    let _serial = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    let before = stdout_identity();

    let outer = SuppressStdout::acquire();
    let inner = SuppressStdout::acquire();
    drop(outer);
    assert_eq!(stdout_identity(), devnull_identity());
    drop(inner);

    assert_eq!(stdout_identity(), before);
}

/// Descriptors above stderr that refer to `target` and survive `exec`.
fn inheritable_copies_of(target: (u64, u64)) -> Vec<libc::c_int> {
    (3..1024)
        .filter(|&fd| {
            // SAFETY: F_GETFD only queries flags; closed descriptors return -1.
            let flags = unsafe { libc::fcntl(fd, libc::F_GETFD) };
            flags >= 0 && flags & libc::FD_CLOEXEC == 0 && identity(fd) == target
        })
        .collect()
}

#[test]
fn saved_stdout_is_not_inherited_by_children() {
    let _serial = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    let before = stdout_identity();
    let baseline = inheritable_copies_of(before);

    let guard = SuppressStdout::acquire();
    assert!(guard.is_active());
    assert_eq!(inheritable_copies_of(before), baseline);
    drop(guard);

    assert_eq!(stdout_identity(), before);
}

#[test]
fn suppression_is_reported_to_the_holding_thread() {
    let _serial = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    assert!(!is_suppressed());
    {
        let _quiet = SuppressStdout::acquire();
        assert!(is_suppressed());
        let elsewhere = std::thread::spawn(is_suppressed).join().unwrap();
        assert!(!elsewhere);
    }
    assert!(!is_suppressed());
}
