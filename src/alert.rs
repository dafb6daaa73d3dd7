use crate::abi::PreSaleTokenConfig;
use alloy_primitives::Address;
use std::fmt::Write;

const MISSING: &str = "N/A";

/// How a route renders its message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTemplate {
    pub title: String,
    pub include_links: bool,
    /// Adds fid and deployer lines.
    pub show_identity: bool,
}

impl RouteTemplate {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            include_links: true,
            show_identity: false,
        }
    }

    pub fn with_identity(mut self) -> Self {
        self.show_identity = true;
        self
    }

    pub fn without_links(mut self) -> Self {
        self.include_links = false;
        self
    }
}

/// Everything known about a matched deployment once enrichment is done.
#[derive(Debug)]
pub struct Alert<'a> {
    pub tx_hash: &'a str,
    pub config: &'a PreSaleTokenConfig,
    pub token: Option<Address>,
    pub token_name: Option<&'a str>,
}

impl Alert<'_> {
    /// Renders the Telegram HTML body for `template`.
    pub fn render(&self, template: &RouteTemplate, explorer_web_url: &str) -> String {
        let base = explorer_web_url.trim_end_matches('/');
        let mut text = String::new();

        let _ = writeln!(text, "<b>{}</b>", escape_html(&template.title));

        if template.include_links {
            let _ = writeln!(
                text,
                "Tx hash: <a href=\"{base}/tx/{hash}\">{hash}</a>",
                hash = escape_html(self.tx_hash)
            );
        } else {
            let _ = writeln!(text, "Tx hash: {}", escape_html(self.tx_hash));
        }

        match self.token {
            Some(token) if template.include_links => {
                let _ = writeln!(
                    text,
                    "ERC20 Contract: <a href=\"{base}/token/{token}\">{token}</a>"
                );
            }
            Some(token) => {
                let _ = writeln!(text, "ERC20 Contract: {token}");
            }
            None => {
                let _ = writeln!(text, "ERC20 Contract: {MISSING}");
            }
        }

        let _ = writeln!(
            text,
            "Ticket: {}",
            self.token_name.map(escape_html).unwrap_or_else(|| MISSING.to_string())
        );
        let _ = writeln!(text, "Symbol: {}", escape_html(&self.config.symbol));

        if template.show_identity {
            let _ = writeln!(text, "fid: {}", self.config.fid);
            let _ = writeln!(text, "Deployer: {}", self.config.deployer);
        }

        let _ = write!(text, "castHash: {}", escape_html(&self.config.castHash));
        text
    }
}

/// Escapes the characters Telegram's HTML parse mode reserves.
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::tests::sample_config;
    use alloy_primitives::address;

    const WEB: &str = "https://basescan.org/";

    #[test]
    fn test_render_with_links() {
        let config = sample_config("bankr deployment", 7);
        let token = address!("0x2222222222222222222222222222222222222222");
        let alert = Alert {
            tx_hash: "0xabc",
            config: &config,
            token: Some(token),
            token_name: Some("TestCoin"),
        };

        let text = alert.render(&RouteTemplate::new("[BANKR DEPLOYMENT]"), WEB);
        assert!(text.starts_with("<b>[BANKR DEPLOYMENT]</b>\n"));
        assert!(text.contains("<a href=\"https://basescan.org/tx/0xabc\">0xabc</a>"));
        assert!(text.contains(&format!(
            "<a href=\"https://basescan.org/token/{token}\">{token}</a>"
        )));
        assert!(text.contains("Ticket: TestCoin"));
        assert!(text.ends_with("castHash: bankr deployment"));
        assert!(!text.contains("fid:"));
    }

    #[test]
    fn test_render_missing_enrichment() {
        let config = sample_config("bankr deployment", 7);
        let alert = Alert {
            tx_hash: "0xabc",
            config: &config,
            token: None,
            token_name: None,
        };

        let text = alert.render(&RouteTemplate::new("[BANKR DEPLOYMENT]").without_links(), WEB);
        assert!(text.contains("Tx hash: 0xabc\n"));
        assert!(text.contains("ERC20 Contract: N/A\n"));
        assert!(text.contains("Ticket: N/A\n"));
    }

    #[test]
    fn test_render_identity_lines() {
        let config = sample_config("", 1668);
        let alert = Alert {
            tx_hash: "0xabc",
            config: &config,
            token: None,
            token_name: None,
        };

        let text = alert.render(&RouteTemplate::new("[FID 1668 DEPLOYMENT]").with_identity(), WEB);
        assert!(text.contains("fid: 1668\n"));
        assert!(text.contains(&format!("Deployer: {}\n", config.deployer)));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a<b>&\"c\""), "a&lt;b&gt;&amp;&quot;c&quot;");
        assert_eq!(escape_html("plain"), "plain");
    }
}
