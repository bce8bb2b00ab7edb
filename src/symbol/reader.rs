// Fri Oct 16 2026 - Alex

use crate::symbol::SymbolError;
use goblin::elf::Elf;
use goblin::mach::{Mach, MachO};
use goblin::pe::PE;
use goblin::Object;
use indexmap::IndexSet;
use memmap2::Mmap;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Conventional code-section names, Mach-O first, then ELF/PE.
pub const DEFAULT_CODE_SECTIONS: [&str; 2] = ["__text", ".text"];

/// Code-section symbol names exported by one artifact.
#[derive(Debug, Clone, Default)]
pub struct ArtifactSymbols {
    pub path: PathBuf,
    /// The section convention that produced `names`, if any did.
    pub section: Option<String>,
    pub names: Vec<String>,
}

impl ArtifactSymbols {
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Read the symbols defined in the artifact's code section. Each name in
/// `sections` is tried in turn and the first one yielding symbols wins.
pub fn read_exported_symbols<P: AsRef<Path>>(
    path: P,
    sections: &[String],
) -> Result<ArtifactSymbols, SymbolError> {
    let path = path.as_ref();
    let io_error = |source| SymbolError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(io_error)?;
    let mmap = unsafe { Mmap::map(&file) }.map_err(io_error)?;

    let object = Object::parse(&mmap).map_err(|e| SymbolError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    for section in sections {
        let names = match &object {
            Object::Elf(elf) => elf_symbols(elf, section),
            Object::PE(pe) => pe_symbols(pe, section),
            Object::Mach(Mach::Binary(macho)) => macho_symbols(macho, section),
            Object::Mach(Mach::Fat(_)) => {
                return Err(SymbolError::UnsupportedFormat {
                    path: path.to_path_buf(),
                    format: "fat Mach-O".to_string(),
                })
            }
            Object::Archive(_) => {
                return Err(SymbolError::UnsupportedFormat {
                    path: path.to_path_buf(),
                    format: "archive".to_string(),
                })
            }
            _ => {
                return Err(SymbolError::UnsupportedFormat {
                    path: path.to_path_buf(),
                    format: "unknown".to_string(),
                })
            }
        };

        if !names.is_empty() {
            log::debug!("Found {} symbols in {} of {}", names.len(), section, path.display());
            return Ok(ArtifactSymbols {
                path: path.to_path_buf(),
                section: Some(section.clone()),
                names,
            });
        }
    }

    log::debug!(
        "No symbols found in {} under any of [{}]",
        path.display(),
        sections.join(", ")
    );

    Ok(ArtifactSymbols {
        path: path.to_path_buf(),
        section: None,
        names: Vec::new(),
    })
}

fn elf_symbols(elf: &Elf, section: &str) -> Vec<String> {
    let index = elf
        .section_headers
        .iter()
        .position(|sh| elf.shdr_strtab.get_at(sh.sh_name) == Some(section));
    let index = match index {
        Some(i) => i,
        None => return Vec::new(),
    };

    let mut names = IndexSet::new();
    for sym in elf.syms.iter().filter(|s| s.st_shndx == index) {
        if let Some(name) = elf.strtab.get_at(sym.st_name) {
            if !name.is_empty() {
                names.insert(name.to_string());
            }
        }
    }
    for sym in elf.dynsyms.iter().filter(|s| s.st_shndx == index) {
        if let Some(name) = elf.dynstrtab.get_at(sym.st_name) {
            if !name.is_empty() {
                names.insert(name.to_string());
            }
        }
    }

    names.into_iter().collect()
}

fn macho_symbols(macho: &MachO, section: &str) -> Vec<String> {
    // nlist section numbers are 1-based, counted across all segments in order.
    let mut section_names = Vec::new();
    for segment in macho.segments.iter() {
        for section_result in segment.into_iter() {
            let name = match section_result {
                Ok((sect, _data)) => std::str::from_utf8(&sect.sectname)
                    .unwrap_or("")
                    .trim_end_matches('\0')
                    .to_string(),
                Err(_) => String::new(),
            };
            section_names.push(name);
        }
    }

    let mut names = IndexSet::new();
    for entry in macho.symbols() {
        let (name, nlist) = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::debug!("Skipping unreadable nlist entry: {}", e);
                continue;
            }
        };
        if nlist.is_stab() || nlist.n_sect == 0 {
            continue;
        }
        let in_section = section_names
            .get(nlist.n_sect - 1)
            .map(|s| s == section)
            .unwrap_or(false);
        if in_section {
            // Mach-O prefixes C symbol names with an underscore; dlsym does not.
            let name = name.strip_prefix('_').unwrap_or(name);
            if !name.is_empty() {
                names.insert(name.to_string());
            }
        }
    }

    names.into_iter().collect()
}

fn pe_symbols(pe: &PE, section: &str) -> Vec<String> {
    let text = pe
        .sections
        .iter()
        .find(|s| s.name().map(|n| n == section).unwrap_or(false));
    let text = match text {
        Some(t) => t,
        None => return Vec::new(),
    };

    let start = text.virtual_address as usize;
    let end = start + text.virtual_size.max(text.size_of_raw_data) as usize;

    let names: IndexSet<String> = pe
        .exports
        .iter()
        .filter(|e| e.rva >= start && e.rva < end)
        .filter_map(|e| e.name)
        .map(str::to_string)
        .collect();
    names.into_iter().collect()
}
