//! Landing page funnel models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;
use uuid::Uuid;

/// Starter layout a funnel is created from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum FunnelTemplate {
    #[default]
    Blank,
    Business,
    Ecommerce,
}

impl FunnelTemplate {
    pub fn as_str(&self) -> &'static str {
        match self {
            FunnelTemplate::Blank => "blank",
            FunnelTemplate::Business => "business",
            FunnelTemplate::Ecommerce => "ecommerce",
        }
    }

    /// Lenient lookup. Unknown names fall back to the blank template.
    pub fn from_name(name: &str) -> Self {
        match name {
            "business" => FunnelTemplate::Business,
            "ecommerce" => FunnelTemplate::Ecommerce,
            _ => FunnelTemplate::Blank,
        }
    }

    /// Starter markup for the page editor.
    pub fn starter(&self) -> TemplateMarkup {
        let (html, css) = match self {
            FunnelTemplate::Blank => (
                r#"<div id="wrapper"><div id="content">Start building your landing page...</div></div>"#,
                "body { font-family: Arial, sans-serif; margin: 0; padding: 20px; } #wrapper { max-width: 1200px; margin: 0 auto; } #content { padding: 40px; text-align: center; }",
            ),
            FunnelTemplate::Business => (
                concat!(
                    r#"<div id="wrapper"><header class="hero"><h1>Transform Your Business</h1>"#,
                    r#"<p>Professional solutions for modern companies</p><button class="cta-button">Get Started</button></header>"#,
                    r#"<section class="features"><div class="feature"><h3>Feature 1</h3><p>Description of your first feature</p></div>"#,
                    r#"<div class="feature"><h3>Feature 2</h3><p>Description of your second feature</p></div>"#,
                    r#"<div class="feature"><h3>Feature 3</h3><p>Description of your third feature</p></div></section></div>"#,
                ),
                "body { font-family: Arial, sans-serif; margin: 0; } .hero { background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; padding: 80px 20px; text-align: center; } .cta-button { background: #ff6b6b; color: white; padding: 15px 30px; border: none; border-radius: 5px; } .features { display: flex; padding: 60px 20px; max-width: 1200px; margin: 0 auto; } .feature { flex: 1; padding: 20px; text-align: center; }",
            ),
            FunnelTemplate::Ecommerce => (
                concat!(
                    r#"<div id="wrapper"><header class="hero"><h1>Amazing Product</h1>"#,
                    r#"<p>The best solution you've been waiting for</p><div class="price">$99 <span class="old-price">$149</span></div>"#,
                    r#"<button class="cta-button">Buy Now</button></header><section class="benefits"><h2>Why Choose Us?</h2><ul>"#,
                    r#"<li>30-day money-back guarantee</li><li>Free shipping worldwide</li><li>24/7 customer support</li></ul></section></div>"#,
                ),
                "body { font-family: Arial, sans-serif; margin: 0; } .hero { background: linear-gradient(135deg, #ff9a9e 0%, #fecfef 100%); padding: 80px 20px; text-align: center; } .price { font-size: 3em; font-weight: bold; color: #e74c3c; } .old-price { text-decoration: line-through; color: #95a5a6; font-size: 0.6em; } .cta-button { background: #27ae60; color: white; padding: 20px 40px; border: none; border-radius: 5px; } .benefits { padding: 60px 20px; max-width: 800px; margin: 0 auto; }",
            ),
        };

        TemplateMarkup {
            html: html.to_string(),
            css: css.to_string(),
        }
    }
}

impl fmt::Display for FunnelTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Editor markup stored with a funnel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TemplateMarkup {
    pub html: String,
    pub css: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum FunnelStatus {
    #[default]
    Draft,
    Published,
}

/// Stored traffic counters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
pub struct FunnelAnalytics {
    pub views: u64,
    pub conversions: u64,
    #[serde(rename = "conversionRate")]
    pub conversion_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
pub struct FunnelSeo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub keywords: String,
}

/// Partial SEO update, merged over the stored values.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
pub struct FunnelSeoPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<String>,
}

impl FunnelSeo {
    pub fn merge(&mut self, patch: FunnelSeoPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(keywords) = patch.keywords {
            self.keywords = keywords;
        }
    }
}

/// A landing page funnel row.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Funnel {
    pub funnel_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub template: FunnelTemplate,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub status: FunnelStatus,
    pub grapes_js_data: serde_json::Value,
    #[serde(default)]
    pub html_content: String,
    #[serde(default)]
    pub css_styles: String,
    #[serde(default)]
    pub published_url: Option<String>,
    #[serde(default)]
    pub subdomain: Option<String>,
    #[serde(default)]
    pub custom_domain: Option<String>,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub analytics: FunnelAnalytics,
    #[serde(default)]
    pub seo: FunnelSeo,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

fn default_category() -> String {
    "general".to_string()
}

impl Funnel {
    /// Create a draft funnel from a template.
    pub fn new(
        name: &str,
        description: Option<&str>,
        template: FunnelTemplate,
        category: Option<&str>,
    ) -> Self {
        let now = Utc::now();
        let name = name.trim().to_string();
        let description = description.map(str::trim).unwrap_or_default().to_string();
        let seo = FunnelSeo {
            title: name.clone(),
            description: if description.is_empty() {
                format!("{} - Landing Page", name)
            } else {
                description.clone()
            },
            keywords: String::new(),
        };

        Self {
            funnel_id: Uuid::new_v4().to_string(),
            name,
            description,
            template,
            category: category.map(str::to_string).unwrap_or_else(default_category),
            status: FunnelStatus::Draft,
            grapes_js_data: serde_json::to_value(template.starter()).unwrap_or_default(),
            html_content: String::new(),
            css_styles: String::new(),
            published_url: None,
            subdomain: None,
            custom_domain: None,
            is_published: false,
            analytics: FunnelAnalytics::default(),
            seo,
            created_at: now,
            updated_at: now,
            published_at: None,
        }
    }

    /// Unpublished copy with a fresh id and zeroed counters.
    pub fn duplicate(&self) -> Self {
        let now = Utc::now();
        Self {
            funnel_id: Uuid::new_v4().to_string(),
            name: format!("{} (Copy)", self.name),
            status: FunnelStatus::Draft,
            published_url: None,
            subdomain: None,
            custom_domain: None,
            is_published: false,
            analytics: FunnelAnalytics::default(),
            created_at: now,
            updated_at: now,
            published_at: None,
            ..self.clone()
        }
    }

    /// Public address of a published funnel.
    ///
    /// With a subdomain the funnel lives at `https://<sub>.<host>`, otherwise
    /// under `<base>/f/<id>`.
    pub fn publish_url(&self, base: &Url, subdomain: Option<&str>) -> String {
        match (subdomain, base.host_str()) {
            (Some(sub), Some(host)) => match base.port() {
                Some(port) => format!("https://{}.{}:{}", sub, host, port),
                None => format!("https://{}.{}", sub, host),
            },
            _ => format!(
                "{}/f/{}",
                base.as_str().trim_end_matches('/'),
                self.funnel_id
            ),
        }
    }
}

/// Partial update of a funnel row. `None` leaves a column untouched;
/// `Some(None)` on a nullable column clears it.
#[derive(Debug, Clone, Serialize, Default)]
pub struct FunnelUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grapes_js_data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub css_styles: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seo: Option<FunnelSeo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<FunnelStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_url: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subdomain: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_domain: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl FunnelUpdate {
    /// Publication columns for a funnel going live.
    pub fn publish(url: String, subdomain: Option<String>, custom_domain: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            status: Some(FunnelStatus::Published),
            is_published: Some(true),
            published_url: Some(Some(url)),
            subdomain: Some(subdomain),
            custom_domain: Some(custom_domain),
            published_at: Some(now),
            updated_at: Some(now),
            ..Self::default()
        }
    }

    /// Publication columns for taking a funnel offline.
    pub fn unpublish() -> Self {
        Self {
            status: Some(FunnelStatus::Draft),
            is_published: Some(false),
            published_url: Some(None),
            updated_at: Some(Utc::now()),
            ..Self::default()
        }
    }

    /// Apply this update to an in-memory row.
    pub fn apply_to(&self, funnel: &mut Funnel) {
        if let Some(name) = &self.name {
            funnel.name = name.clone();
        }
        if let Some(description) = &self.description {
            funnel.description = description.clone();
        }
        if let Some(data) = &self.grapes_js_data {
            funnel.grapes_js_data = data.clone();
        }
        if let Some(html) = &self.html_content {
            funnel.html_content = html.clone();
        }
        if let Some(css) = &self.css_styles {
            funnel.css_styles = css.clone();
        }
        if let Some(seo) = &self.seo {
            funnel.seo = seo.clone();
        }
        if let Some(status) = self.status {
            funnel.status = status;
        }
        if let Some(published) = self.is_published {
            funnel.is_published = published;
        }
        if let Some(url) = &self.published_url {
            funnel.published_url = url.clone();
        }
        if let Some(subdomain) = &self.subdomain {
            funnel.subdomain = subdomain.clone();
        }
        if let Some(domain) = &self.custom_domain {
            funnel.custom_domain = domain.clone();
        }
        if let Some(at) = self.published_at {
            funnel.published_at = Some(at);
        }
        funnel.updated_at = self.updated_at.unwrap_or_else(Utc::now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_funnel_defaults() {
        let funnel = Funnel::new("  Launch  ", None, FunnelTemplate::Business, None);
        assert_eq!(funnel.name, "Launch");
        assert_eq!(funnel.category, "general");
        assert_eq!(funnel.status, FunnelStatus::Draft);
        assert!(!funnel.is_published);
        assert_eq!(funnel.seo.description, "Launch - Landing Page");
        assert!(funnel.grapes_js_data["html"]
            .as_str()
            .unwrap()
            .contains("Transform Your Business"));
    }

    #[test]
    fn test_duplicate_resets_publication() {
        let mut funnel = Funnel::new("Shop", Some("Sale"), FunnelTemplate::Ecommerce, None);
        funnel.is_published = true;
        funnel.subdomain = Some("shop".into());
        funnel.analytics.views = 40;

        let copy = funnel.duplicate();
        assert_ne!(copy.funnel_id, funnel.funnel_id);
        assert_eq!(copy.name, "Shop (Copy)");
        assert!(!copy.is_published);
        assert!(copy.subdomain.is_none());
        assert_eq!(copy.analytics.views, 0);
        assert_eq!(copy.description, "Sale");
    }

    #[test]
    fn test_publish_url() {
        let funnel = Funnel::new("Shop", None, FunnelTemplate::Blank, None);
        let base = Url::parse("https://pages.example.com").unwrap();

        assert_eq!(
            funnel.publish_url(&base, Some("shop")),
            "https://shop.pages.example.com"
        );
        assert_eq!(
            funnel.publish_url(&base, None),
            format!("https://pages.example.com/f/{}", funnel.funnel_id)
        );
    }

    #[test]
    fn test_unpublish_clears_url() {
        let mut funnel = Funnel::new("Shop", None, FunnelTemplate::Blank, None);
        FunnelUpdate::publish("https://x.example.com".into(), Some("x".into()), None)
            .apply_to(&mut funnel);
        assert!(funnel.is_published);
        assert_eq!(funnel.status, FunnelStatus::Published);

        let update = FunnelUpdate::unpublish();
        let json = serde_json::to_value(&update).unwrap();
        assert!(json["published_url"].is_null());
        assert!(json.get("subdomain").is_none());

        update.apply_to(&mut funnel);
        assert!(!funnel.is_published);
        assert!(funnel.published_url.is_none());
        assert_eq!(funnel.subdomain.as_deref(), Some("x"));
    }

    #[test]
    fn test_unknown_template_falls_back_to_blank() {
        assert_eq!(FunnelTemplate::from_name("landing"), FunnelTemplate::Blank);
        assert_eq!(FunnelTemplate::from_name("business"), FunnelTemplate::Business);
    }
}
