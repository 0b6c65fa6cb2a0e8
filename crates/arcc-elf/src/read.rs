//! Validating reader for relocatable AArch64 ELF64 files.

use crate::constants::*;
use crate::{ElfError, Result};

fn read_le16(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

fn read_le32(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

fn read_le64(data: &[u8], offset: usize) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&data[offset..offset + 8]);
    u64::from_le_bytes(raw)
}

/// A parsed section header.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct SectionHeader {
    name: u32,
    kind: u32,
    flags: u64,
    addr: u64,
    offset: u64,
    size: u64,
    link: u32,
    info: u32,
    alignment: u64,
    entry_size: u64,
}

fn parse_section_header(data: &[u8], offset: usize) -> Result<SectionHeader> {
    if offset + SHDR_SIZE > data.len() {
        return Err(ElfError::SectionOutOfBounds);
    }
    Ok(SectionHeader {
        name: read_le32(data, offset),
        kind: read_le32(data, offset + 4),
        flags: read_le64(data, offset + 8),
        addr: read_le64(data, offset + 16),
        offset: read_le64(data, offset + 24),
        size: read_le64(data, offset + 32),
        link: read_le32(data, offset + 40),
        info: read_le32(data, offset + 44),
        alignment: read_le64(data, offset + 48),
        entry_size: read_le64(data, offset + 56),
    })
}

/// Reads a NUL-terminated name out of the string table.
fn section_name(data: &[u8], strtab: &SectionHeader, name: u32) -> String {
    let start = (strtab.offset + u64::from(name)) as usize;
    let mut result = String::new();
    for &byte in data.iter().skip(start) {
        if byte == 0 {
            break;
        }
        result.push(char::from(byte));
    }
    result
}

/// Validates a relocatable AArch64 ELF64 image.
///
/// Checks the identification fields, the section-header table bounds,
/// the reserved first header, string-table framing, symbol and
/// relocation section shapes, and the type/flag pairings of well-known
/// section names.
pub fn validate(data: &[u8]) -> Result<()> {
    if data.len() < EHDR_SIZE + SHDR_SIZE {
        return Err(ElfError::TooSmall);
    }

    if read_le32(data, 0) != ELF_MAGIC {
        return Err(ElfError::InvalidMagic);
    }
    if data[4] != ELF_CLASS_64 {
        return Err(ElfError::UnsupportedClass(data[4]));
    }
    if data[5] != ELF_DATA_LSB {
        return Err(ElfError::NotLittleEndian);
    }
    if data[6] != ELF_VERSION_CURRENT || read_le32(data, 20) != u32::from(ELF_VERSION_CURRENT) {
        return Err(ElfError::BadVersion);
    }
    if read_le16(data, 16) != ELF_TYPE_REL {
        return Err(ElfError::NotRelocatable);
    }
    if read_le16(data, 18) != ELF_MACHINE_AARCH64 {
        return Err(ElfError::WrongMachine);
    }

    let section_offset = read_le64(data, 40) as usize;
    if section_offset < EHDR_SIZE || section_offset > data.len() - SHDR_SIZE {
        return Err(ElfError::SectionOutOfBounds);
    }
    if usize::from(read_le16(data, 52)) != EHDR_SIZE
        || usize::from(read_le16(data, 58)) != SHDR_SIZE
    {
        return Err(ElfError::HeaderMismatch);
    }

    let header_count = read_le16(data, 60);
    let names_index = read_le16(data, 62);
    if header_count >= SHN_LORESERVE || names_index >= SHN_LORESERVE {
        return Err(ElfError::HeaderMismatch);
    }

    let first = parse_section_header(data, section_offset)?;

    // With the extension scheme, the real count lives in the first
    // (otherwise reserved) section header.
    let section_count = if header_count == 0 {
        first.size
    } else {
        u64::from(header_count)
    };
    if section_count == 0
        || section_count > ((data.len() - section_offset) / SHDR_SIZE) as u64
    {
        return Err(ElfError::SectionOutOfBounds);
    }

    let names_index = u64::from(names_index);
    if names_index >= section_count {
        return Err(ElfError::BadStringTable);
    }

    // The first header must be zero apart from the extension slot for
    // the section count.
    let expected_first = SectionHeader {
        size: if header_count == 0 { section_count } else { 0 },
        ..SectionHeader::default()
    };
    if first != expected_first {
        return Err(ElfError::BadFirstSection);
    }

    let mut sections = Vec::with_capacity(section_count as usize);
    for index in 0..section_count {
        sections.push(parse_section_header(
            data,
            section_offset + (index as usize) * SHDR_SIZE,
        )?);
    }

    let strtab = &sections[names_index as usize];
    if names_index != u64::from(SHN_UNDEF) {
        if strtab.kind != SHT_STRTAB || strtab.flags != 0 {
            return Err(ElfError::BadStringTable);
        }
        if strtab.size > data.len() as u64 || strtab.offset > data.len() as u64 - strtab.size {
            return Err(ElfError::BadStringTable);
        }
        if strtab.size == 0
            || data[strtab.offset as usize] != 0
            || data[(strtab.offset + strtab.size - 1) as usize] != 0
        {
            return Err(ElfError::BadStringTable);
        }
        if section_name(data, strtab, strtab.name) != ".shstrtab" {
            return Err(ElfError::BadStringTable);
        }
    }

    let mut has_symbol_table = false;
    for (index, section) in sections.iter().enumerate() {
        if section.kind != SHT_NOBITS
            && (section.size > data.len() as u64
                || section.offset > data.len() as u64 - section.size)
        {
            return Err(ElfError::SectionOutOfBounds);
        }

        if section.kind == SHT_NULL && index != usize::from(SHN_UNDEF) {
            return Err(ElfError::BadSectionTable);
        }

        if section.kind == SHT_STRTAB
            && (section.size == 0
                || data[section.offset as usize] != 0
                || data[(section.offset + section.size - 1) as usize] != 0)
        {
            return Err(ElfError::BadStringTable);
        }

        if section.kind == SHT_SYMTAB {
            if has_symbol_table {
                return Err(ElfError::MultipleSymbolTables);
            }
            has_symbol_table = true;

            if section.entry_size != SYM_SIZE
                || section.size % section.entry_size != 0
                || section.size == 0
                || u64::from(section.link) >= section_count
                || sections[section.link as usize].kind != SHT_STRTAB
            {
                return Err(ElfError::BadSymbolTable);
            }
            let start = section.offset as usize;
            if data[start..start + SYM_SIZE as usize].iter().any(|&byte| byte != 0) {
                return Err(ElfError::BadSymbolTable);
            }
        }

        if section.kind == SHT_RELA || section.kind == SHT_REL {
            let entry_size = if section.kind == SHT_RELA {
                RELA_SIZE
            } else {
                REL_SIZE
            };
            if section.entry_size != entry_size
                || section.size % section.entry_size != 0
                || u64::from(section.link) >= section_count
                || sections[section.link as usize].kind != SHT_SYMTAB
                || section.info == u32::from(SHN_UNDEF)
                || u64::from(section.info) >= section_count
                || sections[section.info as usize].size == 0
            {
                return Err(ElfError::BadRelocationSection);
            }
        }

        let name = section_name(data, strtab, section.name);
        let expected = match name.as_str() {
            ".bss" => Some((SHT_NOBITS, SHF_WRITE | SHF_ALLOC)),
            ".data" => Some((SHT_PROGBITS, SHF_WRITE | SHF_ALLOC)),
            ".rodata" => Some((SHT_PROGBITS, SHF_ALLOC)),
            ".strtab" => Some((SHT_STRTAB, 0)),
            ".symtab" => Some((SHT_SYMTAB, 0)),
            ".text" => Some((SHT_PROGBITS, SHF_ALLOC | SHF_EXECINSTR)),
            _ => None,
        };
        if let Some((kind, flags)) = expected {
            if section.kind != kind || section.flags != flags {
                return Err(ElfError::SectionTypeMismatch(name));
            }
        }
    }

    Ok(())
}
