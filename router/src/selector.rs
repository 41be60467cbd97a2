//! Deterministic experiment selection.
//!
//! A visitor's fingerprint is hashed and reduced onto an index into the
//! ordered experiment set. No randomness and no stored state: the same
//! fingerprint against the same listing always lands on the same experiment.

use crate::errors::RouterError;
use crate::experiments::ExperimentSet;
use crate::fingerprint::Fingerprint;
use sha1::{Digest, Sha1};

/// Map a fingerprint onto one experiment of a non-empty set.
///
/// Errors on an empty set; selection cannot index into nothing, and
/// defaulting silently would hide a misconfigured bucket.
pub fn select_experiment<'a>(
    fingerprint: &Fingerprint,
    experiments: &'a ExperimentSet,
) -> Result<&'a str, RouterError> {
    if experiments.is_empty() {
        return Err(RouterError::EmptyExperimentSet);
    }

    let canonical = fingerprint.canonical_json()?;
    let index = digest_index(&canonical, experiments.len());

    // Index is always in range: digest_index reduces modulo len.
    experiments
        .get(index)
        .ok_or(RouterError::EmptyExperimentSet)
}

/// Reduce the SHA-1 of `canonical` to an index in `0..len`.
///
/// The assignment scheme: each digest byte is rendered as its base-10 value,
/// the renderings are concatenated without separators, and that digit string
/// is read as a base-16 number, reduced modulo `len`. Mixing the radices
/// this way skews the distribution slightly, but changing the scheme would
/// reshuffle every visitor's assignment, so it stays. The reduction is an
/// exact modular fold; decimal digits are all valid hex digits, so every
/// character contributes `(acc * 16 + digit) mod len`.
fn digest_index(canonical: &str, len: usize) -> usize {
    let digest = Sha1::digest(canonical.as_bytes());
    let digits: String = digest.iter().map(|byte| byte.to_string()).collect();

    digits
        .bytes()
        .fold(0usize, |acc, b| (acc * 16 + usize::from(b - b'0')) % len)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn experiments(names: &[&str]) -> ExperimentSet {
        ExperimentSet::from_keys(names.iter().map(|n| format!("{n}/index.html")))
    }

    fn fp(ip: Option<&str>, region: Option<&str>) -> Fingerprint {
        Fingerprint::new(ip.map(String::from), region.map(String::from))
    }

    #[test]
    fn known_assignments_over_three_experiments() {
        let set = experiments(&["control_site", "banner_site", "footer_site"]);

        assert_eq!(
            select_experiment(&fp(Some("203.0.113.7"), Some("94107")), &set).unwrap(),
            "banner_site"
        );
        assert_eq!(
            select_experiment(&fp(None, None), &set).unwrap(),
            "control_site"
        );
        assert_eq!(
            select_experiment(&fp(Some("203.0.113.7"), None), &set).unwrap(),
            "footer_site"
        );
        assert_eq!(
            select_experiment(&fp(Some("198.51.100.23"), Some("10115")), &set).unwrap(),
            "footer_site"
        );
        assert_eq!(
            select_experiment(&fp(Some("2001:db8::1"), Some("SW1A")), &set).unwrap(),
            "banner_site"
        );
    }

    #[test]
    fn known_assignments_over_two_experiments() {
        let set = experiments(&["control_site", "banner_site"]);

        assert_eq!(
            select_experiment(&fp(Some("203.0.113.7"), Some("94107")), &set).unwrap(),
            "control_site"
        );
        assert_eq!(
            select_experiment(&fp(None, None), &set).unwrap(),
            "banner_site"
        );
        assert_eq!(
            select_experiment(&fp(Some("198.51.100.23"), Some("10115")), &set).unwrap(),
            "banner_site"
        );
    }

    #[test]
    fn selection_is_deterministic() {
        let set = experiments(&["control_site", "banner_site", "footer_site"]);
        let fingerprint = fp(Some("198.51.100.23"), Some("10115"));

        let first = select_experiment(&fingerprint, &set).unwrap();
        for _ in 0..100 {
            assert_eq!(select_experiment(&fingerprint, &set).unwrap(), first);
        }
    }

    #[test]
    fn single_experiment_always_selected() {
        let set = experiments(&["control_site"]);
        for ip in ["203.0.113.7", "198.51.100.23", "2001:db8::1"] {
            assert_eq!(
                select_experiment(&fp(Some(ip), None), &set).unwrap(),
                "control_site"
            );
        }
        assert_eq!(select_experiment(&fp(None, None), &set).unwrap(), "control_site");
    }

    #[test]
    fn empty_set_is_an_error() {
        let set = ExperimentSet::default();
        let result = select_experiment(&fp(Some("203.0.113.7"), None), &set);
        assert!(matches!(
            result.unwrap_err(),
            RouterError::EmptyExperimentSet
        ));
    }

    /// Varying the client address across many visitors should spread
    /// assignments roughly evenly. The hash is fixed, so the counts are
    /// stable; the bounds leave room for the scheme's bias.
    #[test]
    fn assignments_spread_across_experiments() {
        let set = experiments(&[
            "control_site",
            "banner_site",
            "footer_site",
            "banner_footer_site",
        ]);

        let mut counts = [0usize; 4];
        for i in 0..300 {
            let ip = format!("203.0.113.{i}");
            let fingerprint = fp(Some(ip.as_str()), None);
            let selected = select_experiment(&fingerprint, &set).unwrap();
            let index = set.iter().position(|name| name == selected).unwrap();
            counts[index] += 1;
        }

        // Uniform would be 75 each; accept anything within a loose band.
        for count in counts {
            assert!((30..=150).contains(&count), "skewed distribution: {counts:?}");
        }
    }
}
