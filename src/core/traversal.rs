use std::fs::{self, File};
use std::io::{BufReader, Cursor, Read, Seek};
use std::ops::AddAssign;
use std::path::Path;
use zip::read::ZipFile;
use zip::result::ZipResult;
use zip::ZipArchive;

use super::container::{ContainerType, Nesting};
use super::descriptor::TypeDescriptor;
use crate::error::ClassmapError;
use crate::logging::LogContext;

/// Nested containers deeper than this are skipped.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Receives every compiled type discovered during a traversal, together with
/// the raw bytes it was extracted from.
pub trait TypeSink {
    fn accept(&mut self, descriptor: TypeDescriptor, bytes: &[u8]);
}

/// Counters describing what a traversal saw.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TraversalStats {
    pub containers: usize,
    pub types: usize,
    pub skipped_entries: usize,
    pub failed_entries: usize,
    pub failed_containers: usize,
}

impl AddAssign for TraversalStats {
    fn add_assign(&mut self, other: Self) {
        self.containers += other.containers;
        self.types += other.types;
        self.skipped_entries += other.skipped_entries;
        self.failed_entries += other.failed_entries;
        self.failed_containers += other.failed_containers;
    }
}

/// Depth-first walker over nested zip-family containers.
///
/// A single recursive routine handles every container family; what it reads
/// and recurses into is decided by [`ContainerType::members`].
pub struct ArchiveWalker {
    log: LogContext,
    max_depth: usize,
}

impl ArchiveWalker {
    pub fn new(log: LogContext) -> Self {
        Self {
            log,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Traverses one top-level input. Missing or empty inputs produce a
    /// warning and no types.
    pub fn walk_path(&self, path: &Path, sink: &mut dyn TypeSink) -> TraversalStats {
        let mut stats = TraversalStats::default();

        let is_usable = fs::metadata(path)
            .map(|meta| meta.is_file() && meta.len() > 0)
            .unwrap_or(false);
        if !is_usable {
            let err = ClassmapError::InputMissingOrEmpty {
                path: path.to_path_buf(),
            };
            self.log.warn(format_args!("{}", err));
            return stats;
        }

        let label = path.display().to_string();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| label.clone());
        let container_type = ContainerType::classify(&file_name);
        self.log.info(format_args!("Processing {}", label));

        match container_type {
            ContainerType::Class => match fs::read(path) {
                Ok(bytes) => self.extract(&label, &bytes, sink, &mut stats),
                Err(source) => {
                    let err = ClassmapError::EntryRead {
                        container: label.clone(),
                        entry: file_name,
                        source,
                    };
                    self.log.error(format_args!("{}", err));
                    stats.failed_entries += 1;
                }
            },
            ContainerType::Unknown => {
                self.log
                    .warn(format_args!("Skipping {}: not a recognised container", label));
            }
            _ => match File::open(path) {
                Ok(file) => self.walk_container(
                    &label,
                    container_type,
                    Nesting::TopLevel,
                    BufReader::new(file),
                    0,
                    sink,
                    &mut stats,
                ),
                Err(source) => {
                    let err = ClassmapError::ContainerOpen {
                        container: label,
                        source: source.into(),
                    };
                    self.log.error(format_args!("{}", err));
                    stats.failed_containers += 1;
                }
            },
        }

        stats
    }

    /// Traverses a container already held in memory or another seekable
    /// stream, treating it as a top-level input of the given type.
    pub fn walk_reader<R: Read + Seek>(
        &self,
        label: &str,
        container_type: ContainerType,
        reader: R,
        sink: &mut dyn TypeSink,
    ) -> TraversalStats {
        let mut stats = TraversalStats::default();
        self.walk_container(
            label,
            container_type,
            Nesting::TopLevel,
            reader,
            0,
            sink,
            &mut stats,
        );
        stats
    }

    #[allow(clippy::too_many_arguments)]
    fn walk_container<R: Read + Seek>(
        &self,
        label: &str,
        container_type: ContainerType,
        nesting: Nesting,
        reader: R,
        depth: usize,
        sink: &mut dyn TypeSink,
        stats: &mut TraversalStats,
    ) {
        let mut archive = match ZipArchive::new(reader) {
            Ok(archive) => archive,
            Err(source) => {
                let err = ClassmapError::ContainerOpen {
                    container: label.to_string(),
                    source,
                };
                self.log.error(format_args!("{}", err));
                stats.failed_containers += 1;
                return;
            }
        };
        stats.containers += 1;

        let mut entries = Entries::new(&mut archive);
        loop {
            let index = entries.upcoming();
            let Some(entry) = entries.next_entry() else {
                break;
            };
            let mut entry = match entry {
                Ok(entry) => entry,
                Err(source) => {
                    let err = ClassmapError::EntryRead {
                        container: label.to_string(),
                        entry: format!("#{}", index),
                        source: source.into(),
                    };
                    self.log.error(format_args!("{}", err));
                    stats.failed_entries += 1;
                    continue;
                }
            };

            if entry.is_dir() {
                continue;
            }

            let name = entry.name().to_string();
            let entry_type = ContainerType::classify(&name);
            if !container_type.admits(nesting, entry_type) {
                self.log.trace(format_args!("Skipping {}!/{}", label, name));
                stats.skipped_entries += 1;
                continue;
            }
            if entry.size() == 0 {
                self.log.trace(format_args!("Skipping empty {}!/{}", label, name));
                stats.skipped_entries += 1;
                continue;
            }

            let location = format!("{}!/{}", label, name);
            if entry_type != ContainerType::Class && depth + 1 > self.max_depth {
                self.log.warn(format_args!(
                    "Skipping {}: nested deeper than {} containers",
                    location, self.max_depth
                ));
                stats.skipped_entries += 1;
                continue;
            }

            let mut bytes = Vec::new();
            if let Err(source) = entry.read_to_end(&mut bytes) {
                let err = ClassmapError::EntryRead {
                    container: label.to_string(),
                    entry: name,
                    source,
                };
                self.log.error(format_args!("{}", err));
                stats.failed_entries += 1;
                continue;
            }
            drop(entry);
            self.log.trace(format_args!("Read {} ({} bytes)", location, bytes.len()));

            if entry_type == ContainerType::Class {
                self.extract(&location, &bytes, sink, stats);
            } else {
                self.walk_container(
                    &location,
                    entry_type,
                    Nesting::Nested,
                    Cursor::new(bytes),
                    depth + 1,
                    sink,
                    stats,
                );
            }
        }
    }

    fn extract(
        &self,
        location: &str,
        bytes: &[u8],
        sink: &mut dyn TypeSink,
        stats: &mut TraversalStats,
    ) {
        match TypeDescriptor::from_bytes(bytes) {
            Ok(descriptor) => {
                stats.types += 1;
                sink.accept(descriptor, bytes);
            }
            Err(source) => {
                let err = ClassmapError::MalformedType {
                    entry: location.to_string(),
                    source,
                };
                self.log.error(format_args!("{}", err));
                stats.failed_entries += 1;
            }
        }
    }
}

/// Lazy cursor over the entries of an open container, in the order the
/// container lists them. Only one entry is open at a time.
struct Entries<'z, R: Read + Seek> {
    archive: &'z mut ZipArchive<R>,
    next: usize,
}

impl<'z, R: Read + Seek> Entries<'z, R> {
    fn new(archive: &'z mut ZipArchive<R>) -> Self {
        Self { archive, next: 0 }
    }

    fn upcoming(&self) -> usize {
        self.next
    }

    fn next_entry(&mut self) -> Option<ZipResult<ZipFile<'_>>> {
        if self.next >= self.archive.len() {
            return None;
        }
        let index = self.next;
        self.next += 1;
        Some(self.archive.by_index(index))
    }
}
