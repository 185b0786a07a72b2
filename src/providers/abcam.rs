use std::collections::HashSet;
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::domain::{Record, TriState};
use crate::error::AbSearchError;
use crate::providers::AntibodyProvider;
use crate::taxonomy::normalize_applications;

const PROVIDER: &str = "abcam";
const ABCAM_HOST: &str = "https://www.abcam.com";
const PRIMARY_LISTING_URLS: [&str; 2] = [
    "https://www.abcam.com/primary-antibodies",
    "https://www.abcam.com/products/primary-antibodies",
];
const QUERY_KEYS: [&str; 3] = ["keywords", "q", "Keywords"];
const REACTIVITY_SPECIES: [&str; 8] = [
    "Human",
    "Mouse",
    "Rat",
    "Monkey",
    "Zebrafish",
    "Chicken",
    "Pig",
    "Dog",
];
const MAX_NAME_CHARS: usize = 200;

#[derive(Clone)]
pub struct AbcamProvider {
    client: Client,
}

impl AbcamProvider {
    pub fn new() -> Result<Self, AbSearchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("absearch/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| http_error(err.to_string()))?,
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(20))
            .build()
            .map_err(|err| http_error(err.to_string()))?;
        Ok(Self { client })
    }

    pub fn candidate_urls(target: &str) -> Vec<Url> {
        PRIMARY_LISTING_URLS
            .iter()
            .flat_map(|base| {
                QUERY_KEYS
                    .iter()
                    .filter_map(move |key| Url::parse_with_params(base, &[(*key, target)]).ok())
            })
            .collect()
    }

    fn fetch_listing_html(&self, url: &Url) -> Result<String, AbSearchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|err| http_error(err.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "Abcam request failed".to_string());
            return Err(AbSearchError::ProviderStatus {
                provider: PROVIDER.to_string(),
                status,
                message,
            });
        }
        response.text().map_err(|err| http_error(err.to_string()))
    }
}

impl AntibodyProvider for AbcamProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    /// Listing pages that fail to load are skipped; the search only ever
    /// returns what could be read.
    fn search(&self, target: &str) -> Result<Vec<Record>, AbSearchError> {
        let mut seen = HashSet::new();
        let mut collected = Vec::new();
        for url in Self::candidate_urls(target) {
            let html = match self.fetch_listing_html(&url) {
                Ok(html) => html,
                Err(err) => {
                    warn!(%url, error = %err, "skipping listing page");
                    continue;
                }
            };
            let records = parse_listings(&html, target);
            debug!(%url, count = records.len(), "parsed listing page");
            for record in records {
                if seen.insert(record.catalog_number.to_lowercase()) {
                    collected.push(record);
                }
            }
        }
        Ok(collected)
    }
}

fn http_error(message: String) -> AbSearchError {
    AbSearchError::ProviderHttp {
        provider: PROVIDER.to_string(),
        message,
    }
}

fn catalog_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bab\d{3,6}\b").unwrap())
}

fn clone_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[\s*([A-Za-z0-9\-]+)\s*\]").unwrap())
}

fn formulation_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(pbs|tris|glycine|azide|glycerol|gelatin|bsa)[^|,;]*").unwrap())
}

fn species_res() -> &'static [(&'static str, Regex)] {
    static RES: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    RES.get_or_init(|| {
        REACTIVITY_SPECIES
            .iter()
            .map(|species| {
                let re = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(species))).unwrap();
                (*species, re)
            })
            .collect()
    })
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static CSS selector")
}

/// Extract listing cards from an Abcam search results page.
///
/// Both anchors and `div` cards are considered. A card without its own href
/// borrows the first link inside it, and a `div` wrapping links to several
/// different products is a result container rather than a card. Application
/// labels come from the card text plus its badge-like children.
pub fn parse_listings(html: &str, target: &str) -> Vec<Record> {
    let document = Html::parse_document(html);
    let cards = selector("a, div");
    let links = selector("a[href]");
    let badges = selector("small, span, .badge, .chip");

    let mut seen = HashSet::new();
    let mut results = Vec::new();
    for card in document.select(&cards) {
        let text = element_text(card);
        if text.is_empty() {
            continue;
        }
        if card.value().name() == "div" && linked_catalogs(card, &links).len() > 1 {
            continue;
        }
        let Some(href) = card.value().attr("href").or_else(|| {
            card.select(&links)
                .next()
                .and_then(|link| link.value().attr("href"))
        }) else {
            continue;
        };
        if !href.contains("/products/") && !href.to_lowercase().contains("/ab") {
            continue;
        }
        let Some(catalog_number) = extract_catalog(&text, href) else {
            continue;
        };
        if !seen.insert(catalog_number.to_lowercase()) {
            continue;
        }

        let url = if href.starts_with('/') {
            format!("{ABCAM_HOST}{href}")
        } else {
            href.to_string()
        };
        let clonality = parse_clonality(&text);
        let clone = if clonality.as_deref() == Some("Monoclonal") {
            parse_clone(&text)
        } else {
            None
        };
        let formulation = parse_formulation(&text);
        let labels: Vec<String> = std::iter::once(text.clone())
            .chain(card.select(&badges).map(element_text))
            .collect();

        results.push(Record {
            vendor: "Abcam".to_string(),
            catalog_number,
            name: text
                .split('|')
                .next()
                .unwrap_or_default()
                .trim()
                .chars()
                .take(MAX_NAME_CHARS)
                .collect(),
            target: target.to_string(),
            url: Some(url),
            validated_reactivity: parse_reactivity(&text),
            clonality,
            clone,
            applications: normalize_applications(&labels)
                .into_iter()
                .map(|code| code.to_string())
                .collect(),
            formulation: formulation.text,
            is_bsa_free: formulation.bsa_free,
            is_gelatin_free: formulation.gelatin_free,
            is_ascites_free: formulation.ascites_free,
            ..Default::default()
        });
    }
    results
}

/// Decoded text of an element, whitespace collapsed.
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn linked_catalogs(card: ElementRef<'_>, links: &Selector) -> HashSet<String> {
    card.select(links)
        .filter_map(|link| {
            let href = link.value().attr("href")?;
            extract_catalog(&element_text(link), href)
        })
        .map(|catalog| catalog.to_lowercase())
        .collect()
}

pub fn extract_catalog(text: &str, href: &str) -> Option<String> {
    catalog_re()
        .find(text)
        .or_else(|| catalog_re().find(href))
        .map(|found| found.as_str().to_string())
}

pub fn parse_reactivity(text: &str) -> Vec<String> {
    species_res()
        .iter()
        .filter(|(_, re)| re.is_match(text))
        .map(|(species, _)| species.to_string())
        .collect()
}

pub fn parse_clonality(text: &str) -> Option<String> {
    let lower = text.to_lowercase();
    let has = |prefix: &str| {
        lower
            .split(|ch: char| !ch.is_alphanumeric())
            .any(|word| word.starts_with(prefix) && word.ends_with("clonal"))
    };
    if has("mono") {
        Some("Monoclonal".to_string())
    } else if has("poly") {
        Some("Polyclonal".to_string())
    } else {
        None
    }
}

pub fn parse_clone(text: &str) -> Option<String> {
    clone_re().captures(text).map(|caps| caps[1].to_string())
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Formulation {
    pub text: Option<String>,
    pub bsa_free: TriState,
    pub gelatin_free: TriState,
    pub ascites_free: TriState,
}

/// Purity flags from free text: an explicit "X-free"/"without X" is `Yes`,
/// a bare mention of X is `No`, silence is `Unknown`.
pub fn parse_formulation(text: &str) -> Formulation {
    let lower = text.to_lowercase();
    let flag = |ingredient: &str| {
        let free = [
            format!("{ingredient}-free"),
            format!("{ingredient} free"),
            format!("without {ingredient}"),
        ];
        if free.iter().any(|phrase| lower.contains(phrase)) {
            TriState::Yes
        } else if lower.contains(ingredient) {
            TriState::No
        } else {
            TriState::Unknown
        }
    };
    Formulation {
        text: formulation_re()
            .find(&lower)
            .map(|found| found.as_str().trim().to_string()),
        bsa_free: flag("bsa"),
        gelatin_free: flag("gelatin"),
        ascites_free: flag("ascites"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
        <html><body>
          <div class="card">
            <a href="/products/primary-antibodies/p53-antibody-ab1101">
              Anti-p53 antibody [DO-1] | Rabbit monoclonal | ab1101
              <span class="badge">WB</span><span class="badge">IHC-P</span>
              <small>Reacts with: Human, Monkey</small>
              <small>BSA-free, PBS 0.02% sodium azide</small>
            </a>
          </div>
          <a href="/ab7951">Anti-p53 antibody | Rabbit polyclonal | Flow Cytometry (Intracellular) | Human, Mouse | PBS with 0.1% gelatin</a>
          <a href="/about-us">About us</a>
          <a href="/products/primary-antibodies">Browse antibodies</a>
          <a href="/products/ab1101"></a>
        </body></html>
    "#;

    #[test]
    fn parses_product_cards() {
        let records = parse_listings(LISTING, "TP53");
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.vendor, "Abcam");
        assert_eq!(first.catalog_number, "ab1101");
        assert_eq!(first.name, "Anti-p53 antibody [DO-1]");
        assert_eq!(first.target, "TP53");
        assert_eq!(
            first.url.as_deref(),
            Some("https://www.abcam.com/products/primary-antibodies/p53-antibody-ab1101")
        );
        assert_eq!(first.clonality.as_deref(), Some("Monoclonal"));
        assert_eq!(first.clone.as_deref(), Some("DO-1"));
        assert_eq!(first.validated_reactivity, vec!["Human", "Monkey"]);
        assert_eq!(first.applications, vec!["IHC", "WB"]);
        assert_eq!(first.is_bsa_free, TriState::Yes);
        assert_eq!(first.is_gelatin_free, TriState::Unknown);

        let second = &records[1];
        assert_eq!(second.catalog_number, "ab7951");
        assert_eq!(second.clonality.as_deref(), Some("Polyclonal"));
        assert_eq!(second.clone, None);
        assert_eq!(second.applications, vec!["ICFC"]);
        assert_eq!(second.is_gelatin_free, TriState::No);
        assert_eq!(second.formulation.as_deref(), Some("pbs with 0.1% gelatin"));
    }

    const DIV_CARDS: &str = r#"
        <html><body>
          <div class="results">
            <div class="card">
              <h3>Anti-p53 antibody [DO-1] | Rabbit monoclonal</h3>
              <a href="/products/ab1101">ab1101</a>
              <p>Reacts with: Human</p>
              <span class="chip">WB</span>
            </div>
            <div class="card">
              <h3>Anti-CD3 &#39;clone&#39; ab2222 | Mouse monoclonal</h3>
              <a href="/products/ab2222">View</a>
              <span class="badge">Flow Cyt (Intra)</span>
              <small>Gelatin&nbsp;free</small>
            </div>
          </div>
        </body></html>
    "#;

    #[test]
    fn parses_div_cards_with_inner_links() {
        let records = parse_listings(DIV_CARDS, "TP53");
        let catalogs: Vec<&str> = records
            .iter()
            .map(|record| record.catalog_number.as_str())
            .collect();
        assert_eq!(catalogs, vec!["ab1101", "ab2222"]);

        let first = &records[0];
        assert_eq!(first.name, "Anti-p53 antibody [DO-1]");
        assert_eq!(
            first.url.as_deref(),
            Some("https://www.abcam.com/products/ab1101")
        );
        assert_eq!(first.clonality.as_deref(), Some("Monoclonal"));
        assert_eq!(first.clone.as_deref(), Some("DO-1"));
        assert_eq!(first.validated_reactivity, vec!["Human"]);
        assert_eq!(first.applications, vec!["WB"]);

        let second = &records[1];
        assert_eq!(second.name, "Anti-CD3 'clone' ab2222");
        assert_eq!(second.applications, vec!["ICFC"]);
        assert_eq!(second.is_gelatin_free, TriState::Yes);
    }

    #[test]
    fn reactivity_from_fixed_species_list() {
        assert_eq!(
            parse_reactivity("Reacts with: human, RAT and zebrafish; not Mousetrap"),
            vec!["Human", "Rat", "Zebrafish"]
        );
    }

    #[test]
    fn candidate_urls_cover_bases_and_keys() {
        let urls = AbcamProvider::candidate_urls("p53 alpha");
        assert_eq!(urls.len(), 6);
        assert!(urls[0].as_str().ends_with("primary-antibodies?keywords=p53+alpha"));
    }

    #[test]
    fn formulation_tristates() {
        let parsed = parse_formulation("Without ascites; contains gelatin");
        assert_eq!(parsed.ascites_free, TriState::Yes);
        assert_eq!(parsed.gelatin_free, TriState::No);
        assert_eq!(parsed.bsa_free, TriState::Unknown);
    }

    #[test]
    fn catalog_falls_back_to_href() {
        assert_eq!(
            extract_catalog("Anti-CD3 antibody", "/products/ab5690"),
            Some("ab5690".to_string())
        );
        assert_eq!(extract_catalog("Anti-CD3", "/products/cd3"), None);
    }
}
