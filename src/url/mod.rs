//! Page URL construction
//!
//! A catalog is addressed by a root URL for its first page and a template for
//! every later page (`https://shop.example.com/page{}`).

use crate::config::SiteConfig;
use crate::ConfigError;
use std::fmt;
use url::Url;

const PAGE_PLACEHOLDER: &str = "{}";

/// Root URL plus page template for one catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteUrls {
    root: Url,
    page_template: String,
}

impl SiteUrls {
    /// Builds the URL set, checking both halves up front
    ///
    /// # Example
    ///
    /// ```
    /// use catalog_harvest::url::SiteUrls;
    ///
    /// let site = SiteUrls::new("https://shop.example.com/", "https://shop.example.com/page{}").unwrap();
    /// assert_eq!(site.page_url(1).as_str(), "https://shop.example.com/");
    /// assert_eq!(site.page_url(7).as_str(), "https://shop.example.com/page7");
    /// ```
    pub fn new(root: &str, page_template: &str) -> Result<Self, ConfigError> {
        let root = Url::parse(root)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid root URL '{}': {}", root, e)))?;

        if !page_template.contains(PAGE_PLACEHOLDER) {
            return Err(ConfigError::Validation(format!(
                "Page template '{}' has no '{{}}' placeholder",
                page_template
            )));
        }

        let sample = page_template.replace(PAGE_PLACEHOLDER, "2");
        Url::parse(&sample).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid page template '{}': {}", page_template, e))
        })?;

        Ok(Self {
            root,
            page_template: page_template.to_string(),
        })
    }

    pub fn from_config(config: &SiteConfig) -> Result<Self, ConfigError> {
        Self::new(&config.root_url, &config.page_template)
    }

    pub fn root(&self) -> &Url {
        &self.root
    }

    pub fn page_template(&self) -> &str {
        &self.page_template
    }

    /// URL of the given page; page 1 is always the root
    pub fn page_url(&self, page_number: u32) -> Url {
        if page_number <= 1 {
            return self.root.clone();
        }

        let formatted = self
            .page_template
            .replace(PAGE_PLACEHOLDER, &page_number.to_string());

        // The template was proven parseable with a numeric page in `new`
        Url::parse(&formatted).unwrap_or_else(|_| self.root.clone())
    }

    pub fn request(&self, page_number: u32) -> PageRequest {
        PageRequest {
            page_number,
            url: self.page_url(page_number),
        }
    }
}

/// A single page to fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number
    pub page_number: u32,
    pub url: Url,
}

impl fmt::Display for PageRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page {} ({})", self.page_number, self.url)
    }
}
