use std::collections::BTreeSet;

use sparhund_config::PhishingDomainsConfig;
use sparhund_core::Packet;
use tracing::debug;

use super::Detector;
use crate::finding::{Finding, FindingDetails, PhishingIndicator, SuspiciousDomain};

const PUNYCODE_PREFIX: &str = "xn--";

/// Flags queried names that hide characters, leave ASCII, use punycode or
/// imitate one of the trusted domains.
pub struct PhishingDomainDetector {
    config: PhishingDomainsConfig,
}

impl PhishingDomainDetector {
    pub fn new(config: PhishingDomainsConfig) -> Self {
        Self { config }
    }

    fn indicators(&self, name: &str) -> Vec<PhishingIndicator> {
        let mut indicators = Vec::new();
        if name.chars().any(is_hidden) {
            indicators.push(PhishingIndicator::HiddenCharacters);
        }
        if !name.is_ascii() {
            indicators.push(PhishingIndicator::NonAscii);
        }
        let labels: Vec<&str> = name.split('.').collect();
        if labels.iter().any(|l| l.starts_with(PUNYCODE_PREFIX)) {
            indicators.push(PhishingIndicator::Punycode);
        }

        let trusted = &self.config.trusted_domains;
        if trusted.iter().any(|t| tail(&labels, t) == t.as_str()) {
            return indicators;
        }

        for domain in trusted {
            let candidate = tail(&labels, domain);
            if confusable_skeleton(&candidate) == confusable_skeleton(domain) {
                indicators.push(PhishingIndicator::Confusable {
                    imitates: domain.clone(),
                });
            } else {
                let distance = edit_distance(&candidate, domain);
                if distance <= self.config.max_edit_distance {
                    indicators.push(PhishingIndicator::Lookalike {
                        imitates: domain.clone(),
                        distance,
                    });
                }
            }

            let prefix_len = labels.len().saturating_sub(domain.split('.').count());
            if let Some(brand) = domain.split('.').next() {
                let in_prefix = labels[..prefix_len]
                    .iter()
                    .any(|label| label.split('-').any(|part| part == brand));
                if in_prefix {
                    indicators.push(PhishingIndicator::BrandInSubdomain {
                        imitates: domain.clone(),
                    });
                }
            }
        }
        indicators
    }
}

/// The last labels of `labels`, as many as `domain` has.
fn tail(labels: &[&str], domain: &str) -> String {
    let count = domain.split('.').count();
    labels[labels.len().saturating_sub(count)..].join(".")
}

fn is_hidden(c: char) -> bool {
    c.is_control()
        || c.is_whitespace()
        || matches!(
            c,
            '\u{00ad}'
                | '\u{034f}'
                | '\u{180e}'
                | '\u{200b}'..='\u{200f}'
                | '\u{202a}'..='\u{202e}'
                | '\u{2060}'..='\u{2064}'
                | '\u{2066}'..='\u{2069}'
                | '\u{feff}'
        )
}

/// Folds look-alike ASCII spellings onto one form (`paypa1` -> `paypal`,
/// `rnicrosoft` -> `microsoft`).
fn confusable_skeleton(name: &str) -> String {
    let folded: String = name
        .chars()
        .map(|c| match c {
            '0' => 'o',
            '1' | 'i' => 'l',
            '3' => 'e',
            '4' => 'a',
            '5' => 's',
            '7' => 't',
            '8' => 'b',
            other => other,
        })
        .collect();
    folded.replace("rn", "m").replace("vv", "w")
}

/// Levenshtein distance over characters.
fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];
    for (i, ca) in a.chars().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != *cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

/// Lower-cased question name without the root dot. Invalid UTF-8 becomes
/// U+FFFD, which the non-ASCII check then reports.
fn normalized_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw)
        .trim_end_matches('.')
        .to_lowercase()
}

impl Detector for PhishingDomainDetector {
    fn name(&self) -> &'static str {
        "phishing_domains"
    }

    fn detect(&self, packets: &[Packet]) -> Finding {
        let names: BTreeSet<String> = packets
            .iter()
            .filter_map(|p| p.dns().ok())
            .flat_map(|dns| dns.questions.iter())
            .map(|q| normalized_name(&q.name))
            .filter(|name| !name.is_empty())
            .collect();

        let domains: Vec<SuspiciousDomain> = names
            .into_iter()
            .filter_map(|name| {
                let indicators = self.indicators(&name);
                if indicators.is_empty() {
                    return None;
                }
                debug!(domain = %name.escape_debug(), ?indicators, "Suspicious domain");
                Some(SuspiciousDomain { name, indicators })
            })
            .collect();

        Finding::new(
            self.name(),
            domains.len(),
            FindingDetails::PhishingDomains { domains },
        )
    }
}
