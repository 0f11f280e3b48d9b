//! Synthetic AI answers for demo mode and upstream outages
//!
//! Produces answers with the same structure a real assistant returns for a
//! recommendation query: an intro line, a numbered markdown list of brands,
//! a summary section and a sources section. Content is pseudo-random; the
//! random source is seedable so tests can pin structure.

use super::matcher::is_match;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Probability that the tracked brand appears in a synthetic answer
pub const USER_BRAND_PROBABILITY: f64 = 0.7;

const COMPETITORS: &[(&str, &[&str])] = &[
    ("crm", &["Salesforce", "HubSpot", "Zoho", "Pipedrive", "Monday.com"]),
    ("marketing", &["Marketo", "Mailchimp", "ActiveCampaign", "Semrush", "Ahrefs"]),
    ("productivity", &["Notion", "Asana", "ClickUp", "Trello", "Slack"]),
    ("ai", &["Jasper", "Copy.ai", "ChatGPT", "Claude", "Writesonic", "Midjourney"]),
    ("finance", &["QuickBooks", "Xero", "FreshBooks", "Wave", "NetSuite"]),
    ("ecommerce", &["Shopify", "WooCommerce", "BigCommerce", "Magento", "Wix"]),
    ("design", &["Canva", "Figma", "Adobe XD", "Sketch", "InVision"]),
];

const DEFAULT_COMPETITORS: &[&str] = &[
    "Competitor A",
    "Competitor B",
    "Big Corp",
    "Industry Leader",
    "Startup X",
];

const DESCRIPTIONS: &[&str] = &[
    "is a powerhouse in this space, offering comprehensive features for scaling teams.",
    "stands out for its ease of use and intuitive interface, making it great for beginners.",
    "provides excellent value for money with its robust free tier and affordable plans.",
    "is known for its advanced AI capabilities and automation features.",
    "is a reliable choice with a strong community and extensive integration options.",
    "has recently gained popularity due to its innovative approach to workflow management.",
];

/// Competitor table for a free-text category; first key contained in the
/// lower-cased category wins.
pub fn competitors_for(category: &str) -> &'static [&'static str] {
    let lowered = category.to_lowercase();
    COMPETITORS
        .iter()
        .find(|(key, _)| lowered.contains(key))
        .map(|(_, list)| *list)
        .unwrap_or(DEFAULT_COMPETITORS)
}

/// Fallback queries used when query generation cannot reach the model
pub fn template_queries(brand_name: &str, category: &str) -> Vec<String> {
    let c = display_category(category);
    vec![
        format!("What is the best {} for small businesses in 2024?", c),
        format!("Top rated {} tools with AI features", c),
        format!("Compare {} vs competitors for {}", brand_name, c),
        format!("Free {} alternatives for startups", c),
        format!("Who are the market leaders in {}?", c),
    ]
}

fn display_category(category: &str) -> &str {
    let trimmed = category.trim();
    if trimmed.is_empty() {
        "software"
    } else {
        trimmed
    }
}

fn slug(category: &str) -> String {
    display_category(category)
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// Seedable generator of recommendation-style answers
pub struct SyntheticResponder {
    rng: StdRng,
}

impl SyntheticResponder {
    /// Deterministic generator for tests and reproducible demos
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generator seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Seeded when `seed` is set, random otherwise
    pub fn new(seed: Option<u64>) -> Self {
        seed.map(Self::seeded).unwrap_or_else(Self::from_entropy)
    }

    /// Pick the brands listed in one answer, in rank order
    pub fn pick_brands(&mut self, brand_name: &str, category: &str) -> Vec<String> {
        let mut competitors: Vec<&str> = competitors_for(category)
            .iter()
            .copied()
            .filter(|c| !is_match(c, brand_name))
            .collect();
        competitors.shuffle(&mut self.rng);

        let take = self.rng.gen_range(3..=4).min(competitors.len());
        let mut brands: Vec<String> = competitors[..take].iter().map(|c| c.to_string()).collect();

        if !brand_name.trim().is_empty() && self.rng.gen_bool(USER_BRAND_PROBABILITY) {
            brands.push(brand_name.trim().to_string());
        }

        brands.shuffle(&mut self.rng);
        brands
    }

    /// Generate a full answer for a query about `category`
    pub fn answer(&mut self, brand_name: &str, category: &str) -> String {
        let c = display_category(category);
        let brands = self.pick_brands(brand_name, category);

        let intros = [
            format!(
                "When looking for the best {} solutions, several top contenders stand out based on features, pricing, and user reviews.",
                c
            ),
            format!("Here is a breakdown of the leading {} tools available in 2024.", c),
            format!(
                "Based on current market analysis and user feedback, these are the most recommended {} platforms.",
                c
            ),
        ];
        let intro = &intros[self.rng.gen_range(0..intros.len())];

        let mut text = format!("{}\n\n", intro);

        for (index, brand) in brands.iter().enumerate() {
            let desc = DESCRIPTIONS[index % DESCRIPTIONS.len()];
            text.push_str(&format!("{}. **{}**: {} {}\n\n", index + 1, brand, brand, desc));
        }

        if let [first, second, ..] = brands.as_slice() {
            text.push_str(&format!(
                "### Summary\nFor most users, **{}** is the top recommendation due to its balance of features and price. However, if you need specific integrations, **{}** is also a strong contender.\n\n",
                first, second
            ));
        }

        let slug = slug(category);
        text.push_str("### Sources\n");
        text.push_str(&format!("- [G2 {} Reviews](https://www.g2.com/categories/{})\n", c, slug));
        text.push_str(&format!(
            "- [Capterra Best {} Software](https://www.capterra.com/{})\n",
            c, slug
        ));
        text.push_str(&format!("- [TechRadar Top Picks](https://www.techradar.com/best/{})", slug));

        text
    }
}
