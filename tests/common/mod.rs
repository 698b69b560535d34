#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

pub const FIXED_FILE_INFO_SIGNATURE: u32 = 0xFEEF_04BD;

const RESOURCE_SECTION_RVA: u32 = 0x1000;
const RESOURCE_SECTION_OFFSET: usize = 0x200;

/// Optional header flavour of a generated image.
#[derive(Debug, Clone, Copy)]
pub enum ImageKind {
    Pe32,
    Pe32Plus,
}

impl ImageKind {
    fn magic(self) -> u16 {
        match self {
            ImageKind::Pe32 => 0x10B,
            ImageKind::Pe32Plus => 0x20B,
        }
    }

    fn data_directory_offset(self) -> usize {
        match self {
            ImageKind::Pe32 => 96,
            ImageKind::Pe32Plus => 112,
        }
    }

    // 16 data directories of 8 bytes each
    fn optional_header_size(self) -> u16 {
        (self.data_directory_offset() + 16 * 8) as u16
    }

    fn machine(self) -> u16 {
        match self {
            ImageKind::Pe32 => 0x014C,
            ImageKind::Pe32Plus => 0x8664,
        }
    }
}

fn put_u16(buf: &mut [u8], offset: usize, value: u16) {
    buf[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

fn put_u32(buf: &mut [u8], offset: usize, value: u32) {
    buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

/// `VS_FIXEDFILEINFO` with the given signature and file version words.
pub fn fixed_file_info(signature: u32, ms: u32, ls: u32) -> Vec<u8> {
    [signature, 0x0001_0000, ms, ls, ms, ls, 0x3F, 0, 0x0004_0004, 1, 0, 0, 0]
        .iter()
        .flat_map(|word| word.to_le_bytes())
        .collect()
}

/// Root `VS_VERSION_INFO` block carrying `value`.
pub fn version_block(value: &[u8]) -> Vec<u8> {
    let mut block = vec![0u8; 6];
    for unit in "VS_VERSION_INFO".encode_utf16().chain(Some(0)) {
        block.extend_from_slice(&unit.to_le_bytes());
    }
    while block.len() % 4 != 0 {
        block.push(0);
    }
    block.extend_from_slice(value);
    let length = block.len() as u16;
    put_u16(&mut block, 0, length);
    put_u16(&mut block, 2, value.len() as u16);
    block
}

/// Resource tree `RT_VERSION / 1 / 0x409` pointing at `block`, or an empty
/// root directory when `block` is `None`. `declared_size` overrides the data
/// entry's size.
fn resource_section(block: Option<&[u8]>, declared_size: Option<u32>) -> Vec<u8> {
    let Some(block) = block else {
        return vec![0u8; 16];
    };

    let mut rsrc = vec![0u8; 88];
    // root directory: one id entry, RT_VERSION -> names at 24
    put_u16(&mut rsrc, 14, 1);
    put_u32(&mut rsrc, 16, 16);
    put_u32(&mut rsrc, 20, 0x8000_0000 | 24);
    // names: id 1 -> languages at 48
    put_u16(&mut rsrc, 38, 1);
    put_u32(&mut rsrc, 40, 1);
    put_u32(&mut rsrc, 44, 0x8000_0000 | 48);
    // languages: 0x409 -> data entry at 72
    put_u16(&mut rsrc, 62, 1);
    put_u32(&mut rsrc, 64, 0x409);
    put_u32(&mut rsrc, 68, 72);
    // data entry
    put_u32(&mut rsrc, 72, RESOURCE_SECTION_RVA + 88);
    put_u32(&mut rsrc, 76, declared_size.unwrap_or(block.len() as u32));

    rsrc.extend_from_slice(block);
    rsrc
}

/// Minimal image of the given kind with a single `.rsrc` section.
pub fn image_of_kind(kind: ImageKind, block: Option<&[u8]>, declared_size: Option<u32>) -> Vec<u8> {
    let rsrc = resource_section(block, declared_size);
    let mut image = vec![0u8; RESOURCE_SECTION_OFFSET];

    image[0..2].copy_from_slice(b"MZ");
    put_u32(&mut image, 0x3C, 0x40);
    image[0x40..0x44].copy_from_slice(b"PE\0\0");

    // COFF header
    put_u16(&mut image, 0x44, kind.machine());
    put_u16(&mut image, 0x46, 1);
    put_u16(&mut image, 0x54, kind.optional_header_size());
    put_u16(&mut image, 0x56, 0x0022);

    // optional header
    let optional = 0x58;
    let directories = optional + kind.data_directory_offset();
    put_u16(&mut image, optional, kind.magic());
    put_u32(&mut image, directories - 4, 16);
    put_u32(&mut image, directories + 2 * 8, RESOURCE_SECTION_RVA);
    put_u32(&mut image, directories + 2 * 8 + 4, rsrc.len() as u32);

    // section table
    let section = optional + kind.optional_header_size() as usize;
    image[section..section + 8].copy_from_slice(b".rsrc\0\0\0");
    put_u32(&mut image, section + 8, rsrc.len() as u32);
    put_u32(&mut image, section + 12, RESOURCE_SECTION_RVA);
    put_u32(&mut image, section + 16, rsrc.len() as u32);
    put_u32(&mut image, section + 20, RESOURCE_SECTION_OFFSET as u32);

    image.extend_from_slice(&rsrc);
    image
}

pub fn pe_image_with(block: Option<&[u8]>, declared_size: Option<u32>) -> Vec<u8> {
    image_of_kind(ImageKind::Pe32, block, declared_size)
}

pub fn pe_image(ms: u32, ls: u32) -> Vec<u8> {
    let block = version_block(&fixed_file_info(FIXED_FILE_INFO_SIGNATURE, ms, ls));
    pe_image_with(Some(&block), None)
}

pub fn write_exe(dir: &Path, image: &[u8]) -> PathBuf {
    let path = dir.join("Hearthstone.exe");
    fs::write(&path, image).unwrap();
    path
}

pub fn write_bundle(dir: &Path, version: &str) -> PathBuf {
    let bundle = dir.join("Hearthstone.app");
    fs::create_dir_all(bundle.join("Contents")).unwrap();
    let plist = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>CFBundleIdentifier</key>
    <string>unity.Blizzard Entertainment.Hearthstone</string>
    <key>BlizzardFileVersion</key>
    <string>{version}</string>
</dict>
</plist>
"#
    );
    fs::write(bundle.join("Contents").join("Info.plist"), plist).unwrap();
    bundle
}
