//! Linux permission for the AMX tile-data state component.
//!
//! Since Linux 5.16 a process must ask for XTILEDATA with
//! `arch_prctl(ARCH_REQ_XCOMP_PERM, XFEATURE_XTILEDATA)` before its first
//! tile instruction. The grant is process-wide and lasts until exit. Other
//! targets need no request, so both calls succeed there.

use crate::error::Result;

#[cfg(all(target_os = "linux", target_arch = "x86_64"))]
const ARCH_GET_XCOMP_PERM: libc::c_long = 0x1022;
#[cfg(all(target_os = "linux", target_arch = "x86_64"))]
const ARCH_REQ_XCOMP_PERM: libc::c_long = 0x1023;
#[cfg(all(target_os = "linux", target_arch = "x86_64"))]
const XFEATURE_XTILEDATA: libc::c_long = 18;

/// Ask the kernel for permission to use tile data.
///
/// Returns [`TileError::PermissionDenied`](crate::error::TileError::PermissionDenied)
/// with the errno when the kernel refuses (old kernel, CPU without AMX, or
/// a seccomp policy).
#[cfg(all(target_os = "linux", target_arch = "x86_64"))]
pub fn request_tile_data() -> Result<()> {
    // SAFETY: ARCH_REQ_XCOMP_PERM takes a feature number and touches no memory
    let ret = unsafe { libc::syscall(libc::SYS_arch_prctl, ARCH_REQ_XCOMP_PERM, XFEATURE_XTILEDATA) };
    if ret != 0 {
        let errno = std::io::Error::last_os_error().raw_os_error().unwrap_or(0);
        tracing::warn!("ARCH_REQ_XCOMP_PERM refused, errno {}", errno);
        return Err(crate::error::TileError::PermissionDenied { errno });
    }
    tracing::debug!("XTILEDATA permission granted");
    Ok(())
}

#[cfg(not(all(target_os = "linux", target_arch = "x86_64")))]
pub fn request_tile_data() -> Result<()> {
    Ok(())
}

/// Whether the process already holds tile-data permission.
#[cfg(all(target_os = "linux", target_arch = "x86_64"))]
pub fn tile_data_permitted() -> Result<bool> {
    let mut mask: u64 = 0;
    // SAFETY: ARCH_GET_XCOMP_PERM writes one u64 through the pointer
    let ret = unsafe {
        libc::syscall(
            libc::SYS_arch_prctl,
            ARCH_GET_XCOMP_PERM,
            &mut mask as *mut u64,
        )
    };
    if ret != 0 {
        return Err(std::io::Error::last_os_error().into());
    }
    Ok(mask & (1 << XFEATURE_XTILEDATA) != 0)
}

#[cfg(not(all(target_os = "linux", target_arch = "x86_64")))]
pub fn tile_data_permitted() -> Result<bool> {
    Ok(true)
}
