use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::LocateError;
use crate::version::Version;
use crate::version_extractor::PlatformVersionReader;

// PE file structure constants
const IMAGE_DOS_SIGNATURE: u16 = 0x5A4D; // "MZ"
const PE_SIGNATURE: u32 = 0x00004550; // "PE\0\0"
const PE32_MAGIC: u16 = 0x10b;
const PE32_PLUS_MAGIC: u16 = 0x20b;
const IMAGE_DIRECTORY_ENTRY_RESOURCE: u32 = 2;

const RT_VERSION: u32 = 16;

const RESOURCE_DIRECTORY_SIZE: u32 = 16;
const RESOURCE_ENTRY_SIZE: u32 = 8;
const SECTION_HEADER_SIZE: i64 = 40;
const HIGH_BIT: u32 = 0x8000_0000;

pub const VS_FIXEDFILEINFO_SIGNATURE: u32 = 0xFEEF_04BD;
const VS_FIXEDFILEINFO_SIZE: usize = 52;
const VS_VERSION_INFO_KEY: &str = "VS_VERSION_INFO";

#[derive(Debug, Clone, Copy)]
struct Section {
    virtual_address: u32,
    virtual_size: u32,
    size_of_raw_data: u32,
    pointer_to_raw_data: u32,
}

impl Section {
    fn contains(&self, rva: u32) -> bool {
        let span = self.virtual_size.max(self.size_of_raw_data);
        rva >= self.virtual_address && rva - self.virtual_address < span
    }
}

#[derive(Debug)]
struct ResourceDirectory {
    number_of_name_entries: u16,
    number_of_id_entries: u16,
}

impl ResourceDirectory {
    fn entry_count(&self) -> u32 {
        self.number_of_name_entries as u32 + self.number_of_id_entries as u32
    }
}

#[derive(Debug, Clone, Copy)]
struct ResourceDirectoryEntry {
    name_or_id: u32,
    offset_to_data_or_subdirectory: u32,
}

impl ResourceDirectoryEntry {
    fn id(&self) -> Option<u32> {
        (self.name_or_id & HIGH_BIT == 0).then_some(self.name_or_id)
    }

    fn subdirectory(&self) -> Option<u32> {
        (self.offset_to_data_or_subdirectory & HIGH_BIT != 0)
            .then_some(self.offset_to_data_or_subdirectory & !HIGH_BIT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceDataEntry {
    pub offset_to_data: u32,
    pub size: u32,
}

/// Read-only view of a PE image, positioned on its resource directory.
pub struct PeImage {
    file: File,
    sections: Vec<Section>,
    // file offset of the root resource directory, if the image has one
    resource_root: Option<u64>,
}

impl PeImage {
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let mut file = File::open(&path)?;

        let mut dos_signature = [0u8; 2];
        file.read_exact(&mut dos_signature)?;
        if u16::from_le_bytes(dos_signature) != IMAGE_DOS_SIGNATURE {
            return Err(invalid("not a PE image (invalid DOS signature)"));
        }

        file.seek(SeekFrom::Start(0x3C))?;
        let pe_offset = read_u32(&mut file)?;

        file.seek(SeekFrom::Start(pe_offset as u64))?;
        if read_u32(&mut file)? != PE_SIGNATURE {
            return Err(invalid("invalid PE signature"));
        }

        // COFF header
        let _machine = read_u16(&mut file)?;
        let number_of_sections = read_u16(&mut file)?;
        file.seek(SeekFrom::Current(12))?;
        let optional_header_size = read_u16(&mut file)?;
        let _characteristics = read_u16(&mut file)?;
        let optional_header_start = file.stream_position()?;

        let magic = read_u16(&mut file)?;
        let data_directory_offset: u64 = match magic {
            PE32_MAGIC => 96,
            PE32_PLUS_MAGIC => 112,
            _ => return Err(invalid(format!("unknown optional header magic 0x{magic:04X}"))),
        };

        // NumberOfRvaAndSizes sits right before the data directories
        file.seek(SeekFrom::Start(optional_header_start + data_directory_offset - 4))?;
        let number_of_directories = read_u32(&mut file)?;

        let mut resource_rva = 0;
        if number_of_directories > IMAGE_DIRECTORY_ENTRY_RESOURCE {
            file.seek(SeekFrom::Start(
                optional_header_start + data_directory_offset + IMAGE_DIRECTORY_ENTRY_RESOURCE as u64 * 8,
            ))?;
            let rva = read_u32(&mut file)?;
            let size = read_u32(&mut file)?;
            if size != 0 {
                resource_rva = rva;
            }
        }

        file.seek(SeekFrom::Start(optional_header_start + optional_header_size as u64))?;
        let mut sections = Vec::with_capacity(number_of_sections as usize);
        for _ in 0..number_of_sections {
            file.seek(SeekFrom::Current(8))?; // name
            let virtual_size = read_u32(&mut file)?;
            let virtual_address = read_u32(&mut file)?;
            let size_of_raw_data = read_u32(&mut file)?;
            let pointer_to_raw_data = read_u32(&mut file)?;
            file.seek(SeekFrom::Current(SECTION_HEADER_SIZE - 24))?;

            sections.push(Section {
                virtual_address,
                virtual_size,
                size_of_raw_data,
                pointer_to_raw_data,
            });
        }

        let mut image = PeImage {
            file,
            sections,
            resource_root: None,
        };
        if resource_rva != 0 {
            image.resource_root = Some(image.rva_to_offset(resource_rva)?);
        }
        Ok(image)
    }

    fn rva_to_offset(&self, rva: u32) -> io::Result<u64> {
        self.sections
            .iter()
            .find(|section| section.contains(rva))
            .map(|section| (rva - section.virtual_address) as u64 + section.pointer_to_raw_data as u64)
            .ok_or_else(|| invalid(format!("no section contains RVA 0x{rva:08X}")))
    }

    fn read_directory(&mut self, root: u64, offset: u32) -> io::Result<ResourceDirectory> {
        self.file.seek(SeekFrom::Start(root + offset as u64 + 12))?;
        Ok(ResourceDirectory {
            number_of_name_entries: read_u16(&mut self.file)?,
            number_of_id_entries: read_u16(&mut self.file)?,
        })
    }

    fn read_directory_entry(&mut self, root: u64, offset: u32) -> io::Result<ResourceDirectoryEntry> {
        self.file.seek(SeekFrom::Start(root + offset as u64))?;
        Ok(ResourceDirectoryEntry {
            name_or_id: read_u32(&mut self.file)?,
            offset_to_data_or_subdirectory: read_u32(&mut self.file)?,
        })
    }

    /// First entry of the directory at `offset`, or the first one with `id` when given.
    fn find_entry(&mut self, root: u64, offset: u32, id: Option<u32>) -> io::Result<Option<ResourceDirectoryEntry>> {
        let directory = self.read_directory(root, offset)?;
        let mut entry_offset = offset + RESOURCE_DIRECTORY_SIZE;

        for _ in 0..directory.entry_count() {
            let entry = self.read_directory_entry(root, entry_offset)?;
            if id.is_none() || entry.id() == id {
                return Ok(Some(entry));
            }
            entry_offset += RESOURCE_ENTRY_SIZE;
        }
        Ok(None)
    }

    /// Walks type `RT_VERSION`, then the first name and the first language.
    /// `Ok(None)` means the image carries no version resource.
    pub fn find_version_resource(&mut self) -> io::Result<Option<ResourceDataEntry>> {
        let Some(root) = self.resource_root else {
            return Ok(None);
        };

        let Some(by_type) = self.find_entry(root, 0, Some(RT_VERSION))? else {
            return Ok(None);
        };
        let names = by_type
            .subdirectory()
            .ok_or_else(|| invalid("RT_VERSION entry is not a directory"))?;

        let Some(by_name) = self.find_entry(root, names, None)? else {
            return Ok(None);
        };
        let languages = by_name
            .subdirectory()
            .ok_or_else(|| invalid("version name entry is not a directory"))?;

        let Some(by_language) = self.find_entry(root, languages, None)? else {
            return Ok(None);
        };
        if by_language.subdirectory().is_some() {
            return Err(invalid("version language entry is not a data entry"));
        }

        self.file
            .seek(SeekFrom::Start(root + by_language.offset_to_data_or_subdirectory as u64))?;
        Ok(Some(ResourceDataEntry {
            offset_to_data: read_u32(&mut self.file)?,
            size: read_u32(&mut self.file)?,
        }))
    }

    pub fn read_resource(&mut self, entry: &ResourceDataEntry) -> io::Result<Vec<u8>> {
        let offset = self.rva_to_offset(entry.offset_to_data)?;
        self.file.seek(SeekFrom::Start(offset))?;
        // the declared size may exceed the file; read at most that much
        let mut data = Vec::new();
        (&mut self.file).take(entry.size as u64).read_to_end(&mut data)?;
        if data.len() != entry.size as usize {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("version resource truncated: {} of {} bytes", data.len(), entry.size),
            ));
        }
        Ok(data)
    }
}

/// Value of the root `VS_VERSION_INFO` block, i.e. what a `"\"` query returns.
/// `None` when the buffer does not hold a well-formed root block.
pub fn root_block_value(data: &[u8]) -> Option<&[u8]> {
    let length = u16_at(data, 0)? as usize;
    let value_length = u16_at(data, 2)? as usize;
    let block = data.get(..length)?;

    let mut offset = 6;
    let mut key = Vec::with_capacity(VS_VERSION_INFO_KEY.len());
    loop {
        let unit = u16_at(block, offset)?;
        offset += 2;
        if unit == 0 {
            break;
        }
        key.push(unit);
    }
    if String::from_utf16(&key).ok()? != VS_VERSION_INFO_KEY {
        return None;
    }

    let value_start = (offset + 3) & !3;
    block.get(value_start..value_start + value_length)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedFileInfo {
    pub signature: u32,
    pub struc_version: u32,
    pub file_version_ms: u32,
    pub file_version_ls: u32,
    pub product_version_ms: u32,
    pub product_version_ls: u32,
}

impl FixedFileInfo {
    pub fn parse(value: &[u8]) -> Option<Self> {
        if value.len() < VS_FIXEDFILEINFO_SIZE {
            return None;
        }
        Some(FixedFileInfo {
            signature: u32_at(value, 0)?,
            struc_version: u32_at(value, 4)?,
            file_version_ms: u32_at(value, 8)?,
            file_version_ls: u32_at(value, 12)?,
            product_version_ms: u32_at(value, 16)?,
            product_version_ls: u32_at(value, 20)?,
        })
    }

    pub fn file_version(&self) -> Version {
        Version::from_words(self.file_version_ms, self.file_version_ls)
    }
}

/// Reads the file version out of `Hearthstone.exe`'s version resource.
#[derive(Debug, Clone)]
pub struct PeVersionReader {
    file_name: &'static str,
}

impl PeVersionReader {
    pub fn new(file_name: &'static str) -> Self {
        PeVersionReader { file_name }
    }
}

impl Default for PeVersionReader {
    fn default() -> Self {
        PeVersionReader::new(crate::paths::GAME_EXECUTABLE)
    }
}

impl PlatformVersionReader for PeVersionReader {
    fn target_path(&self, install_dir: &Path) -> PathBuf {
        install_dir.join(self.file_name)
    }

    fn read_version(&self, target: &Path) -> Result<Version, LocateError> {
        let mut image = PeImage::open(target).map_err(|e| LocateError::unavailable("open image", target, e))?;

        let entry = image
            .find_version_resource()
            .map_err(|e| LocateError::unavailable("find version resource", target, e))?
            .filter(|entry| entry.size != 0)
            .ok_or_else(|| LocateError::unavailable("find version resource", target, "no version resource"))?;
        debug!(
            "{}: version resource at RVA 0x{:08X}, {} bytes",
            target.display(),
            entry.offset_to_data,
            entry.size
        );

        let data = image
            .read_resource(&entry)
            .map_err(|e| LocateError::unavailable("read version resource", target, e))?;

        let value = root_block_value(&data)
            .ok_or_else(|| LocateError::unavailable("query root block", target, "malformed VS_VERSION_INFO"))?;
        if value.is_empty() {
            return Err(LocateError::NoVersionInfo {
                path: target.to_path_buf(),
            });
        }

        let info = FixedFileInfo::parse(value)
            .ok_or_else(|| LocateError::malformed(target, format!("truncated fixed file info ({} bytes)", value.len())))?;
        if info.signature != VS_FIXEDFILEINFO_SIGNATURE {
            return Err(LocateError::malformed(
                target,
                format!("bad version signature 0x{:08X}", info.signature),
            ));
        }

        Ok(info.file_version())
    }
}

fn invalid(message: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message.into())
}

fn read_u16(reader: &mut impl Read) -> io::Result<u16> {
    let mut bytes = [0u8; 2];
    reader.read_exact(&mut bytes)?;
    Ok(u16::from_le_bytes(bytes))
}

fn read_u32(reader: &mut impl Read) -> io::Result<u32> {
    let mut bytes = [0u8; 4];
    reader.read_exact(&mut bytes)?;
    Ok(u32::from_le_bytes(bytes))
}

fn u16_at(data: &[u8], offset: usize) -> Option<u16> {
    let bytes = data.get(offset..offset + 2)?;
    Some(u16::from_le_bytes([bytes[0], bytes[1]]))
}

fn u32_at(data: &[u8], offset: usize) -> Option<u32> {
    let bytes = data.get(offset..offset + 4)?;
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}
