//! File version resources

use super::to_wide;
use std::path::Path;
use std::ptr;
use winapi::ctypes::c_void;
use winapi::um::winver::{
    GetFileVersionInfoSizeW, GetFileVersionInfoW, VerQueryValueW, VS_FIXEDFILEINFO,
};

/// en-US / Unicode and en-US / Western European, tried when the
/// translation table is missing
const FALLBACK_TRANSLATIONS: [(u16, u16); 2] = [(0x0409, 0x04B0), (0x0409, 0x04E4)];

/// `FileVersion` string of a binary's version resource.
///
/// Falls back to the fixed file version when no string table carries one.
pub fn file_version(path: &Path) -> Option<String> {
    let block = read_block(path)?;
    string_version(&block).or_else(|| fixed_version(&block))
}

fn read_block(path: &Path) -> Option<Vec<u8>> {
    let wide = to_wide(&path.to_string_lossy());
    let mut handle = 0u32;
    let size = unsafe { GetFileVersionInfoSizeW(wide.as_ptr(), &mut handle) };
    if size == 0 {
        return None;
    }

    let mut block = vec![0u8; size as usize];
    let ok = unsafe {
        GetFileVersionInfoW(wide.as_ptr(), 0, size, block.as_mut_ptr() as *mut c_void)
    };
    (ok != 0).then_some(block)
}

/// Pointer and length of a sub-block; the pointer lives inside `block`
fn query(block: &[u8], sub_block: &str) -> Option<(*const c_void, u32)> {
    let wide = to_wide(sub_block);
    let mut buffer: *mut c_void = ptr::null_mut();
    let mut len = 0u32;
    let ok = unsafe {
        VerQueryValueW(
            block.as_ptr() as *const c_void,
            wide.as_ptr(),
            &mut buffer,
            &mut len,
        )
    };
    (ok != 0 && !buffer.is_null() && len > 0).then_some((buffer as *const c_void, len))
}

fn translations(block: &[u8]) -> Vec<(u16, u16)> {
    let mut found = Vec::new();
    if let Some((ptr, len)) = query(block, "\\VarFileInfo\\Translation") {
        let count = len as usize / 4;
        let pairs = unsafe { std::slice::from_raw_parts(ptr as *const u16, count * 2) };
        found.extend(pairs.chunks_exact(2).map(|pair| (pair[0], pair[1])));
    }
    found.extend(FALLBACK_TRANSLATIONS);
    found
}

fn string_version(block: &[u8]) -> Option<String> {
    translations(block).into_iter().find_map(|(lang, codepage)| {
        let key = format!("\\StringFileInfo\\{lang:04x}{codepage:04x}\\FileVersion");
        let (ptr, len) = query(block, &key)?;
        let chars = unsafe { std::slice::from_raw_parts(ptr as *const u16, len as usize) };
        let end = chars.iter().position(|c| *c == 0).unwrap_or(chars.len());
        let version = String::from_utf16_lossy(&chars[..end]);
        let version = version.trim();
        (!version.is_empty()).then(|| version.to_string())
    })
}

fn fixed_version(block: &[u8]) -> Option<String> {
    let (ptr, len) = query(block, "\\")?;
    if (len as usize) < std::mem::size_of::<VS_FIXEDFILEINFO>() {
        return None;
    }
    let info = unsafe { &*(ptr as *const VS_FIXEDFILEINFO) };
    Some(format!(
        "{}.{}.{}.{}",
        info.dwFileVersionMS >> 16,
        info.dwFileVersionMS & 0xFFFF,
        info.dwFileVersionLS >> 16,
        info.dwFileVersionLS & 0xFFFF,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_has_no_version() {
        assert_eq!(file_version(Path::new("C:\\does\\not\\exist.sys")), None);
    }

    #[test]
    fn test_system_binary_has_version() {
        let kernel32 = crate::windows::system_directory()
            .unwrap()
            .join("kernel32.dll");
        let version = file_version(&kernel32).unwrap();
        assert!(version.chars().next().unwrap().is_ascii_digit());
    }
}
