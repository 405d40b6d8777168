//! Property-based tests for core domain types and the option model.
//!
//! These tests use proptest to verify invariants hold across
//! randomly generated inputs.

use proptest::prelude::*;

use cvsclient::core::metadata::ResourceSyncInfo;
use cvsclient::core::types::{ResourcePath, Tag};
use cvsclient::engine::options::{collect_option_arguments, find_option, CommandOption, LocalOption};
use cvsclient::engine::progress::{ProgressTuning, ResponseProgress};

const FLAGS: [&str; 4] = ["-r", "-D", "-l", "-m"];

/// Strategy for a local option drawn from a small flag set, with or without an argument.
fn local_option() -> impl Strategy<Value = LocalOption> {
    (0..FLAGS.len(), prop::option::of("[a-z0-9]{1,8}")).prop_map(|(i, argument)| match argument {
        Some(argument) => LocalOption::with_argument(FLAGS[i], argument),
        None => LocalOption::new(FLAGS[i]),
    })
}

/// Strategy for a valid path component.
fn component() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_][A-Za-z0-9_.-]{0,11}".prop_filter("not a dot component", |c| c != "." && c != "..")
}

/// Strategy for a valid relative path.
fn resource_path() -> impl Strategy<Value = String> {
    prop::collection::vec(component(), 1..5).prop_map(|parts| parts.join("/"))
}

proptest! {
    #[test]
    fn is_element_of_ignores_arguments(
        options in prop::collection::vec(local_option(), 0..10),
        i in 0..FLAGS.len(),
        argument in "[a-z]{0,5}",
    ) {
        let probe = LocalOption::with_argument(FLAGS[i], argument);
        let expected = options.iter().any(|o| o.flag() == FLAGS[i]);
        prop_assert_eq!(probe.is_element_of(&options), expected);
        prop_assert_eq!(LocalOption::new(FLAGS[i]).is_element_of(&options), expected);
        prop_assert_eq!(find_option(&options, FLAGS[i]).is_some(), expected);
    }

    #[test]
    fn collected_arguments_keep_order_and_skip_bare_flags(
        options in prop::collection::vec(local_option(), 0..10),
        i in 0..FLAGS.len(),
    ) {
        let expected: Vec<&str> = options
            .iter()
            .filter(|o| o.flag() == FLAGS[i])
            .filter_map(|o| o.argument())
            .collect();
        prop_assert_eq!(collect_option_arguments(&options, FLAGS[i]), expected);
    }

    #[test]
    fn valid_paths_are_accepted_and_stable(path in resource_path()) {
        let parsed = ResourcePath::new(path.as_str()).unwrap();
        prop_assert_eq!(parsed.as_str(), path.as_str());

        let slashed = ResourcePath::new(format!("./{}/", path)).unwrap();
        prop_assert_eq!(&slashed, &parsed);

        let parent = parsed.parent().unwrap();
        prop_assert_eq!(parent.join(parsed.name()).unwrap(), parsed);
    }

    #[test]
    fn escaping_paths_are_rejected(path in resource_path()) {
        let up = format!("{}/../x", path);
        let absolute = format!("/{}", path);
        prop_assert!(ResourcePath::new(up).is_err());
        prop_assert!(ResourcePath::new(absolute).is_err());
    }

    #[test]
    fn response_progress_never_reaches_total(
        total in 2u32..1000,
        increment in 1u32..16,
        lines in 0usize..20_000,
    ) {
        let mut progress = ResponseProgress::new(ProgressTuning { total_work: total, initial_increment: increment });
        let mut reported = 0u32;
        for _ in 0..lines {
            reported += progress.tick();
        }
        prop_assert_eq!(reported, progress.worked());
        prop_assert!(reported < total);
    }

    #[test]
    fn entry_lines_parse_their_rendering(
        name in component(),
        revision in "(0|-?[1-9][0-9]{0,2}(\\.[1-9][0-9]{0,2}){1,3})",
        keyword_mode in "(|-kb|-ko)",
        tag in prop::option::of("[A-Za-z][A-Za-z0-9_-]{0,10}"),
    ) {
        let mut info = ResourceSyncInfo::new(name.as_str(), revision.as_str());
        info.keyword_mode = keyword_mode;
        info.tag = tag.map(|t| Tag::branch(t).unwrap());

        let line = info.to_entry_line();
        prop_assert_eq!(ResourceSyncInfo::parse(&line).unwrap(), info);
    }
}
