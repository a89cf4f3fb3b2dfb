//! setrlimit-based resource limits (no privileges needed)

use nix::sys::resource::{setrlimit, Resource};
use std::io;

/// Per-child resource ceilings. `None` leaves the inherited limit in place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceLimits {
    /// Maximum address space size in bytes (RLIMIT_AS)
    pub max_memory: Option<u64>,
    /// Maximum CPU time in seconds (RLIMIT_CPU)
    pub max_cpu_seconds: Option<u64>,
    /// Maximum file size in bytes (RLIMIT_FSIZE)
    pub max_file_size: Option<u64>,
    /// Maximum number of open files (RLIMIT_NOFILE)
    pub max_open_files: Option<u64>,
}

impl ResourceLimits {
    pub fn is_empty(&self) -> bool {
        *self == ResourceLimits::default()
    }

    /// Apply limits to the current process.
    ///
    /// Runs in the forked child before exec, so it must not allocate: errors
    /// are raw OS errors only.
    pub fn apply(&self) -> io::Result<()> {
        let limits = [
            (Resource::RLIMIT_AS, self.max_memory),
            (Resource::RLIMIT_CPU, self.max_cpu_seconds),
            (Resource::RLIMIT_FSIZE, self.max_file_size),
            (Resource::RLIMIT_NOFILE, self.max_open_files),
        ];

        for (resource, limit) in limits {
            if let Some(limit) = limit {
                setrlimit(resource, limit, limit)
                    .map_err(|errno| io::Error::from_raw_os_error(errno as i32))?;
            }
        }
        Ok(())
    }
}
