use crate::abi::PreSaleTokenConfig;
use crate::alert::RouteTemplate;
use alloy_primitives::U256;

pub const BANKR_CAST_HASH: &str = "bankr deployment";
pub const DEFAULT_WATCH_FID: u64 = 1668;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteKind {
    CastHashMatch,
    FidMatch,
}

impl RouteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteKind::CastHashMatch => "cast_hash",
            RouteKind::FidMatch => "fid",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `castHash` equals the tag, ignoring ASCII case.
    CastHashEquals(String),
    /// `fid` equals the watched identity.
    FidEquals(U256),
}

impl Predicate {
    pub fn matches(&self, config: &PreSaleTokenConfig) -> bool {
        match self {
            Predicate::CastHashEquals(tag) => config.castHash.eq_ignore_ascii_case(tag),
            Predicate::FidEquals(fid) => config.fid == *fid,
        }
    }
}

/// A notification destination and the condition that selects it.
#[derive(Debug, Clone)]
pub struct Route {
    pub kind: RouteKind,
    pub predicate: Predicate,
    pub channel: String,
    pub template: RouteTemplate,
}

impl Route {
    pub fn cast_hash(tag: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            kind: RouteKind::CastHashMatch,
            predicate: Predicate::CastHashEquals(tag.into()),
            channel: channel.into(),
            template: RouteTemplate::new("[BANKR DEPLOYMENT]"),
        }
    }

    pub fn fid(fid: U256, channel: impl Into<String>) -> Self {
        Self {
            kind: RouteKind::FidMatch,
            predicate: Predicate::FidEquals(fid),
            channel: channel.into(),
            template: RouteTemplate::new(format!("[FID {fid} DEPLOYMENT]")).with_identity(),
        }
    }

    pub fn with_template(mut self, template: RouteTemplate) -> Self {
        self.template = template;
        self
    }
}

/// Evaluates every configured route against a decoded deployment.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    routes: Vec<Route>,
}

impl Classifier {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Routes whose predicate holds, in configuration order.
    pub fn classify(&self, config: &PreSaleTokenConfig) -> Vec<&Route> {
        self.routes
            .iter()
            .filter(|route| route.predicate.matches(config))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::tests::sample_config;

    fn dual_channel() -> Classifier {
        Classifier::new(vec![
            Route::cast_hash(BANKR_CAST_HASH, "-100cast"),
            Route::fid(U256::from(DEFAULT_WATCH_FID), "-100fid"),
        ])
    }

    fn kinds(routes: &[&Route]) -> Vec<RouteKind> {
        routes.iter().map(|route| route.kind).collect()
    }

    #[test]
    fn test_cast_hash_match_ignores_case() {
        let classifier = dual_channel();
        let config = sample_config("Bankr Deployment", 7);
        assert_eq!(
            kinds(&classifier.classify(&config)),
            vec![RouteKind::CastHashMatch]
        );
    }

    #[test]
    fn test_cast_hash_requires_exact_text() {
        let classifier = dual_channel();
        for cast_hash in ["bankr deployment ", "bankr", "", "0xabc"] {
            let config = sample_config(cast_hash, 7);
            assert!(classifier.classify(&config).is_empty(), "{cast_hash:?}");
        }
    }

    #[test]
    fn test_fid_match() {
        let classifier = dual_channel();
        let config = sample_config("", 1668);
        let matched = classifier.classify(&config);
        assert_eq!(kinds(&matched), vec![RouteKind::FidMatch]);
        assert_eq!(matched[0].channel, "-100fid");
    }

    #[test]
    fn test_both_routes_match_independently() {
        let classifier = dual_channel();
        let config = sample_config("BANKR DEPLOYMENT", 1668);
        assert_eq!(
            kinds(&classifier.classify(&config)),
            vec![RouteKind::CastHashMatch, RouteKind::FidMatch]
        );

        let reversed = Classifier::new(classifier.routes().iter().rev().cloned().collect());
        let mut reversed_kinds = kinds(&reversed.classify(&config));
        reversed_kinds.reverse();
        assert_eq!(reversed_kinds, kinds(&classifier.classify(&config)));
    }

    #[test]
    fn test_single_channel_policy_ignores_fid() {
        let classifier = Classifier::new(vec![Route::cast_hash(BANKR_CAST_HASH, "-100cast")]);
        assert!(classifier.classify(&sample_config("", 1668)).is_empty());
    }

    #[test]
    fn test_fid_route_title() {
        let route = Route::fid(U256::from(1668u64), "-100fid");
        assert_eq!(route.template.title, "[FID 1668 DEPLOYMENT]");
        assert!(route.template.show_identity);
    }
}
