/// Kind of file an archive entry or input path holds, decided by name suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerType {
    Jar,
    War,
    Ear,
    Rar,
    Zip,
    Eba,
    Cba,
    Class,
    Unknown,
}

/// Whether a container was supplied directly or found inside another one.
/// The same archive family admits different members at each level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Nesting {
    TopLevel,
    Nested,
}

use ContainerType::*;

// Suffix checks run in this order; the first match wins.
const CLASSIFICATION_ORDER: [ContainerType; 8] = [Jar, War, Ear, Rar, Zip, Eba, Cba, Class];

const TOP_LEVEL_ARCHIVE_MEMBERS: &[ContainerType] = &[Class, War, Jar, Cba, Rar];
const TOP_LEVEL_ZIP_MEMBERS: &[ContainerType] = &[Class, War, Jar, Ear, Eba, Rar];
const NESTED_JAR_MEMBERS: &[ContainerType] = &[Class, Jar];
const NESTED_EAR_MEMBERS: &[ContainerType] = &[War, Jar, Class];
const NESTED_EBA_MEMBERS: &[ContainerType] = &[War, Cba, Jar];
const NESTED_CBA_MEMBERS: &[ContainerType] = &[Jar];
const NO_MEMBERS: &[ContainerType] = &[];

impl ContainerType {
    /// Classifies a file or entry name. Matching ignores ASCII case.
    pub fn classify(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        CLASSIFICATION_ORDER
            .into_iter()
            .find(|ty| ty.extension().is_some_and(|ext| lower.ends_with(ext)))
            .unwrap_or(Unknown)
    }

    pub fn extension(self) -> Option<&'static str> {
        match self {
            Jar => Some(".jar"),
            War => Some(".war"),
            Ear => Some(".ear"),
            Rar => Some(".rar"),
            Zip => Some(".zip"),
            Eba => Some(".eba"),
            Cba => Some(".cba"),
            Class => Some(".class"),
            Unknown => None,
        }
    }

    /// Entry kinds that are read and recursed into when found inside a
    /// container of this type at the given nesting level.
    pub fn members(self, nesting: Nesting) -> &'static [ContainerType] {
        match (nesting, self) {
            (Nesting::TopLevel, Zip) => TOP_LEVEL_ZIP_MEMBERS,
            (Nesting::TopLevel, Jar | War | Ear | Rar | Eba | Cba) => TOP_LEVEL_ARCHIVE_MEMBERS,
            (Nesting::Nested, Jar | War | Rar) => NESTED_JAR_MEMBERS,
            (Nesting::Nested, Ear) => NESTED_EAR_MEMBERS,
            (Nesting::Nested, Eba) => NESTED_EBA_MEMBERS,
            (Nesting::Nested, Cba) => NESTED_CBA_MEMBERS,
            (_, Zip | Class | Unknown) => NO_MEMBERS,
        }
    }

    /// Whether an entry of type `entry` inside a container of this type is processed.
    pub fn admits(self, nesting: Nesting, entry: ContainerType) -> bool {
        self.members(nesting).contains(&entry)
    }
}

impl std::fmt::Display for ContainerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension().unwrap_or("unknown"))
    }
}
