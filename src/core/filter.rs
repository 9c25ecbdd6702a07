use clap::ValueEnum;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

use super::descriptor::TypeDescriptor;
use crate::logging::LogContext;

/// Token naming the unnamed (default) package in a package list.
pub const DEFAULT_PACKAGE_MARKER: &str = "<default>";

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum FilterMode {
    /// Only types in the listed packages are accepted.
    #[default]
    Include,
    /// Types in the listed packages are rejected.
    Exclude,
}

/// Package restriction list with include/exclude polarity.
///
/// The default package is stored as `None` so that it can never be confused
/// with a package literally spelled like the marker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageFilter {
    packages: HashSet<Option<String>>,
    mode: FilterMode,
}

impl PackageFilter {
    pub fn new(packages: HashSet<Option<String>>, mode: FilterMode) -> Self {
        Self { packages, mode }
    }

    pub fn include<I, S>(packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(collect_packages(packages), FilterMode::Include)
    }

    pub fn exclude<I, S>(packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(collect_packages(packages), FilterMode::Exclude)
    }

    /// Builds a filter from user-supplied package tokens. Tokens that do not
    /// look like package names are kept but reported.
    pub fn from_tokens<I, S>(tokens: I, mode: FilterMode, log: &LogContext) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut packages = HashSet::new();
        for token in tokens {
            let token = token.as_ref().trim();
            if token.is_empty() {
                continue;
            }
            if token != DEFAULT_PACKAGE_MARKER && !is_package_name(token) {
                log.warn(format_args!("'{}' is not a valid package name", token));
            }
            packages.insert(package_key(token));
        }
        Self::new(packages, mode)
    }

    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    pub fn packages(&self) -> &HashSet<Option<String>> {
        &self.packages
    }

    /// Whether the package is covered by the list, ignoring polarity. A
    /// listed package covers itself and every package below it.
    pub fn matches(&self, package: Option<&str>) -> bool {
        match package {
            None => self.packages.contains(&None),
            Some(package) => self.packages.iter().flatten().any(|listed| {
                package == listed
                    || package
                        .strip_prefix(listed.as_str())
                        .is_some_and(|rest| rest.starts_with('.'))
            }),
        }
    }

    pub fn accepts(&self, package: Option<&str>) -> bool {
        match self.mode {
            FilterMode::Include => self.matches(package),
            FilterMode::Exclude => !self.matches(package),
        }
    }
}

/// Decides which extracted types are indexed.
#[derive(Debug, Clone, Default)]
pub struct TypeFilter {
    packages: Option<PackageFilter>,
    allow_any_legal_types: bool,
}

impl TypeFilter {
    pub fn new(packages: Option<PackageFilter>, allow_any_legal_types: bool) -> Self {
        Self {
            packages,
            allow_any_legal_types,
        }
    }

    pub fn accepts(&self, descriptor: &TypeDescriptor) -> bool {
        if !descriptor.is_standard_named_type(self.allow_any_legal_types) {
            return false;
        }
        self.packages
            .as_ref()
            .map_or(true, |filter| filter.accepts(descriptor.package_name()))
    }
}

fn collect_packages<I, S>(packages: I) -> HashSet<Option<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    packages
        .into_iter()
        .map(|package| package_key(package.as_ref().trim()))
        .collect()
}

fn package_key(token: &str) -> Option<String> {
    (token != DEFAULT_PACKAGE_MARKER).then(|| token.to_string())
}

fn is_package_name(token: &str) -> bool {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(r"^[\p{L}_$][\p{L}\p{N}_$]*(\.[\p{L}_$][\p{L}\p{N}_$]*)*$").ok()
        })
        .as_ref()
        .map_or(true, |pattern| pattern.is_match(token))
}
