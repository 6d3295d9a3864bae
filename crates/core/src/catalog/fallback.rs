//! Embedded static catalog used when the remote catalog is unreachable.
//!
//! These lists are resynchronized against the remote repository offline.
//! They carry filenames only; entries built from them have no hash.

use chrono::Utc;

use super::{CatalogEntry, DiscoveryResult, DiscoverySource, Domain};

/// Version of the embedded lists, bumped on every resync.
pub const FALLBACK_VERSION: &str = "2026-09-30";

pub const MITIGATIONS: &[&str] = &[
    "mi-1_ai-data-leakage-prevention-and-detection.md",
    "mi-2_data-filtering-from-external-knowledge-bases.md",
    "mi-3_user-app-model-firewalling-filtering.md",
    "mi-4_ai-system-observability.md",
    "mi-5_system-acceptance-testing.md",
    "mi-6_data-quality-classification-sensitivity.md",
    "mi-7_legal-and-contractual-frameworks-for-ai-systems.md",
    "mi-8_quality-of-service-qos-and-ddos-prevention-for-ai-systems.md",
    "mi-9_ai-system-alerting-and-denial-of-wallet-dow-spend-monitoring.md",
    "mi-10_ai-model-version-pinning.md",
    "mi-11_human-feedback-loop-for-ai-systems.md",
    "mi-12_role-based-access-control-for-ai-data.md",
    "mi-13_providing-citations-and-source-traceability-for-ai-generated-information.md",
    "mi-14_encryption-of-ai-data-at-rest.md",
    "mi-15_using-large-language-models-for-automated-evaluation-llm-as-a-judge.md",
    "mi-16_preserving-source-data-access-controls-in-ai-systems.md",
    "mi-17_ai-firewall-implementation-and-management.md",
];

pub const RISKS: &[&str] = &[
    "ri-1_information-leaked-to-hosted-model.md",
    "ri-2_insufficient-access-control-with-vector-store.md",
    "ri-4_hallucination-and-inaccurate-outputs.md",
    "ri-5_foundation-model-versioning.md",
    "ri-6_non-deterministic-behaviour.md",
    "ri-7_availability-of-foundational-model.md",
    "ri-8_tampering-with-the-foundational-model.md",
    "ri-9_data-poisoning.md",
    "ri-10_prompt-injection.md",
    "ri-11_lack-of-foundation-model-transparency.md",
    "ri-12_bias-and-discrimination.md",
    "ri-13_lack-of-explainability.md",
    "ri-14_model-overreach-expanded-use.md",
    "ri-15_data-quality-and-drift.md",
    "ri-16_reputational-risk.md",
    "ri-17_regulatory-compliance-and-oversight.md",
    "ri-18_intellectual-property-and-copyright.md",
];

pub const FRAMEWORKS: &[&str] = &[
    "eu-ai-act.md",
    "ffiec-itbooklets.md",
    "iso-42001.md",
    "nist-800-53.md",
    "nist-ai-600-1.md",
    "owasp-llm.md",
    "owasp-ml.md",
];

/// Embedded filenames for `domain`.
pub fn filenames(domain: Domain) -> &'static [&'static str] {
    match domain {
        Domain::Mitigations => MITIGATIONS,
        Domain::Risks => RISKS,
        Domain::Frameworks => FRAMEWORKS,
    }
}

/// Build a fallback discovery result with download URLs under `raw_repo_url`.
///
/// `cache_expires` is now, so the next cycle retries the remote catalog.
pub fn static_result(raw_repo_url: &str) -> DiscoveryResult {
    let build = |domain: Domain| -> Vec<CatalogEntry> {
        filenames(domain).iter().map(|name| CatalogEntry::from_fallback(domain, name, raw_repo_url)).collect()
    };
    DiscoveryResult {
        source: DiscoverySource::StaticFallback,
        mitigations: build(Domain::Mitigations),
        risks: build(Domain::Risks),
        frameworks: build(Domain::Frameworks),
        cache_expires: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_lists_non_empty_and_unique() {
        for domain in Domain::ALL {
            let names = filenames(domain);
            assert!(!names.is_empty());
            let unique: HashSet<_> = names.iter().collect();
            assert_eq!(unique.len(), names.len(), "duplicate filename in {domain}");
        }
    }

    #[test]
    fn test_filenames_carry_domain_prefix() {
        for domain in Domain::ALL {
            if let Some(prefix) = domain.prefix() {
                assert!(filenames(domain).iter().all(|n| n.starts_with(prefix)));
            }
            assert!(filenames(domain).iter().all(|n| n.ends_with(".md")));
        }
    }

    #[test]
    fn test_static_result_matches_lists() {
        let result = static_result("https://raw.example.com/o/r/main");
        assert_eq!(result.source, DiscoverySource::StaticFallback);
        for domain in Domain::ALL {
            let names: Vec<&str> = result.entries(domain).iter().map(|e| e.filename.as_str()).collect();
            assert_eq!(names, filenames(domain));
            assert!(result.entries(domain).iter().all(|e| e.content_hash.is_none()));
        }
    }
}
