mod common;

use classmap::core::descriptor::TypeDescriptor;
use classmap::core::filter::{FilterMode, PackageFilter, TypeFilter};
use classmap::LogContext;
use common::*;
use log::LevelFilter;

#[test]
fn include_list_covers_subpackages_only() {
    let filter = PackageFilter::include(["com.acme"]);

    assert!(filter.accepts(Some("com.acme")));
    assert!(filter.accepts(Some("com.acme.util")));
    assert!(!filter.accepts(Some("com.acme2")));
    assert!(!filter.accepts(Some("com")));
    assert!(!filter.accepts(None));
}

#[test]
fn default_package_marker_matches_the_unnamed_package() {
    let log = LogContext::new(LevelFilter::Off);
    let filter = PackageFilter::from_tokens([" com.acme ", "<default>", ""], FilterMode::Include, &log);

    assert!(filter.accepts(None));
    assert!(filter.accepts(Some("com.acme")));
    assert_eq!(filter.packages().len(), 2);
    assert_eq!(log.warnings(), 0);
}

#[test]
fn exclude_list_inverts_polarity() {
    let filter = PackageFilter::exclude(["org.thirdparty"]);

    assert!(filter.accepts(Some("com.acme")));
    assert!(filter.accepts(None));
    assert!(!filter.accepts(Some("org.thirdparty.internal")));
}

#[test]
fn invalid_tokens_are_kept_but_reported() {
    let log = LogContext::new(LevelFilter::Off);
    let filter = PackageFilter::from_tokens(["com..broken", "9lives"], FilterMode::Exclude, &log);

    assert_eq!(log.warnings(), 2);
    assert!(!filter.accepts(Some("com..broken")));
}

#[test]
fn type_filter_combines_kind_and_package() {
    let filter = TypeFilter::new(Some(PackageFilter::include(["com.acme"])), false);

    let accepted = TypeDescriptor::from_bytes(&simple_class("com/acme/Service")).unwrap();
    let outside = TypeDescriptor::from_bytes(&simple_class("org/other/Service")).unwrap();
    let anonymous = TypeDescriptor::from_bytes(&simple_class("com/acme/Service$1")).unwrap();

    assert!(filter.accepts(&accepted));
    assert!(!filter.accepts(&outside));
    assert!(!filter.accepts(&anonymous));

    let permissive = TypeFilter::new(None, true);
    assert!(permissive.accepts(&anonymous));
    assert!(permissive.accepts(&outside));
}
