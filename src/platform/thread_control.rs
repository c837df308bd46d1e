//! Suspend and resume on Windows, which has no stop/continue signals.
//!
//! A process is suspended by suspending every thread it owns, found with a
//! toolhelp thread snapshot. Resuming decrements each thread's suspend count,
//! so resuming a running process is a no-op.

use std::mem;
use winapi::shared::minwindef::FALSE;
use winapi::shared::winerror::{ERROR_ACCESS_DENIED, ERROR_INVALID_PARAMETER};
use winapi::um::errhandlingapi::GetLastError;
use winapi::um::handleapi::{CloseHandle, INVALID_HANDLE_VALUE};
use winapi::um::processthreadsapi::{OpenThread, ResumeThread, SuspendThread};
use winapi::um::tlhelp32::{
    CreateToolhelp32Snapshot, Thread32First, Thread32Next, TH32CS_SNAPTHREAD, THREADENTRY32,
};
use winapi::um::winnt::THREAD_SUSPEND_RESUME;

use crate::core::process_monitor::ProbeError;

/// Returned by `SuspendThread`/`ResumeThread` on failure
const THREAD_CALL_FAILED: u32 = u32::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ThreadAction {
    Suspend,
    Resume,
}

pub fn suspend_process(pid: u32) -> Result<(), ProbeError> {
    for_each_thread(pid, ThreadAction::Suspend)
}

pub fn resume_process(pid: u32) -> Result<(), ProbeError> {
    for_each_thread(pid, ThreadAction::Resume)
}

fn map_error(code: u32) -> ProbeError {
    match code {
        ERROR_ACCESS_DENIED => ProbeError::AccessDenied,
        ERROR_INVALID_PARAMETER => ProbeError::NoSuchProcess,
        other => {
            log::debug!("Thread control failed with Win32 error {}", other);
            ProbeError::AccessDenied
        }
    }
}

fn for_each_thread(pid: u32, action: ThreadAction) -> Result<(), ProbeError> {
    unsafe {
        let snapshot = CreateToolhelp32Snapshot(TH32CS_SNAPTHREAD, 0);
        if snapshot == INVALID_HANDLE_VALUE {
            return Err(map_error(GetLastError()));
        }

        let mut entry: THREADENTRY32 = mem::zeroed();
        entry.dwSize = mem::size_of::<THREADENTRY32>() as u32;

        let mut touched = 0usize;
        let mut result = Ok(());

        if Thread32First(snapshot, &mut entry) != 0 {
            loop {
                if entry.th32OwnerProcessID == pid {
                    match apply(entry.th32ThreadID, action) {
                        Ok(()) => touched += 1,
                        // Thread exited after the snapshot was taken
                        Err(ProbeError::NoSuchProcess) => {}
                        Err(e) => {
                            result = Err(e);
                            break;
                        }
                    }
                }

                if Thread32Next(snapshot, &mut entry) == 0 {
                    break;
                }
            }
        }

        CloseHandle(snapshot);
        result?;

        if touched == 0 {
            return Err(ProbeError::NoSuchProcess);
        }
        Ok(())
    }
}

unsafe fn apply(thread_id: u32, action: ThreadAction) -> Result<(), ProbeError> {
    let thread = OpenThread(THREAD_SUSPEND_RESUME, FALSE, thread_id);
    if thread.is_null() {
        return Err(map_error(GetLastError()));
    }

    let previous = match action {
        ThreadAction::Suspend => SuspendThread(thread),
        ThreadAction::Resume => ResumeThread(thread),
    };
    let error = if previous == THREAD_CALL_FAILED {
        Some(GetLastError())
    } else {
        None
    };
    CloseHandle(thread);

    match error {
        Some(code) => Err(map_error(code)),
        None => Ok(()),
    }
}
