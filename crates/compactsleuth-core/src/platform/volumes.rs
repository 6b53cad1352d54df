/// Mounted volume enumeration.
///
/// `VolumeSource` is how the browse layer learns about top-level roots.
/// `SystemVolumes` asks the OS: `GetLogicalDriveStringsW` on Windows,
/// `sysinfo` everywhere else.
use crate::error::{Result, ScanError};
use serde::Serialize;
use std::path::PathBuf;

/// A single mounted volume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VolumeInfo {
    /// Mount point path, e.g. "C:\" or "/mnt/data".
    pub mount_point: PathBuf,
    /// Volume label, empty when the OS reports none.
    pub label: String,
}

impl VolumeInfo {
    pub fn new(mount_point: impl Into<PathBuf>, label: impl Into<String>) -> Self {
        Self {
            mount_point: mount_point.into(),
            label: label.into(),
        }
    }
}

pub trait VolumeSource: Send + Sync {
    /// Mounted volumes, in the order the OS reports them.
    fn volumes(&self) -> Result<Vec<VolumeInfo>>;
}

/// The operating system's own volume list.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemVolumes;

impl VolumeSource for SystemVolumes {
    fn volumes(&self) -> Result<Vec<VolumeInfo>> {
        enumerate_volumes()
    }
}

/// Enumerate local fixed, removable and optical drives.
///
/// Network drives are left out: an unresponsive share would hang the scan.
#[cfg(windows)]
pub fn enumerate_volumes() -> Result<Vec<VolumeInfo>> {
    use std::ffi::OsString;
    use std::os::windows::ffi::OsStringExt;
    use windows::Win32::Storage::FileSystem::{
        GetDriveTypeW, GetLogicalDriveStringsW, GetVolumeInformationW,
    };

    const DRIVE_REMOTE_VAL: u32 = 4;

    // Null-separated list of drive roots ("C:\\\0D:\\\0\0").
    let mut buffer = [0u16; 256];
    let len = unsafe { GetLogicalDriveStringsW(Some(&mut buffer)) };
    if len == 0 {
        return Err(ScanError::VolumeEnumeration(
            "GetLogicalDriveStringsW returned 0".to_string(),
        ));
    }

    let full = OsString::from_wide(&buffer[..len as usize]);
    let full_str = full.to_string_lossy();

    let mut volumes = Vec::new();
    for root in full_str.split('\0').filter(|s| !s.is_empty()) {
        let root_wide: Vec<u16> = root.encode_utf16().chain(std::iter::once(0)).collect();
        let root_pcwstr = windows::core::PCWSTR(root_wide.as_ptr());

        if unsafe { GetDriveTypeW(root_pcwstr) } == DRIVE_REMOTE_VAL {
            continue;
        }

        let mut label_buf = [0u16; 256];
        let has_label = unsafe {
            GetVolumeInformationW(root_pcwstr, Some(&mut label_buf), None, None, None, None)
                .is_ok()
        };
        let label = if has_label {
            let end = label_buf.iter().position(|&c| c == 0).unwrap_or(0);
            String::from_utf16_lossy(&label_buf[..end])
        } else {
            String::new()
        };

        volumes.push(VolumeInfo::new(root, label));
    }

    Ok(volumes)
}

/// Enumerate mounted disks through `sysinfo`.
///
/// Duplicate mount points (bind mounts reported twice) are collapsed.
#[cfg(not(windows))]
pub fn enumerate_volumes() -> Result<Vec<VolumeInfo>> {
    let disks = sysinfo::Disks::new_with_refreshed_list();

    let mut volumes: Vec<VolumeInfo> = Vec::new();
    for disk in disks.list() {
        let mount_point = disk.mount_point().to_path_buf();
        if volumes.iter().any(|v| v.mount_point == mount_point) {
            continue;
        }
        volumes.push(VolumeInfo::new(
            mount_point,
            disk.name().to_string_lossy().into_owned(),
        ));
    }

    if volumes.is_empty() {
        return Err(ScanError::VolumeEnumeration(
            "no mounted disks reported".to_string(),
        ));
    }
    Ok(volumes)
}
