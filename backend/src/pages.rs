//! HTML pages for the public item link

use chrono::DateTime;
use findmystuff_storage::item::Item;
use serde::Serialize;
use tera::{Context, Tera};

const BASE_TEMPLATE: &str = include_str!("../templates/base.html");
const VIEW_ITEM_TEMPLATE: &str = include_str!("../templates/view_item.html");
const NOT_FOUND_TEMPLATE: &str = include_str!("../templates/notfound.html");
const ERROR_TEMPLATE: &str = include_str!("../templates/error.html");

/// Served when a template itself fails to render
pub const FALLBACK_ERROR_PAGE: &str = "<!doctype html><html lang=\"en\"><head><meta charset=\"utf-8\"><title>Error - FindMyStuff</title></head><body><h1>Something went wrong</h1></body></html>";

#[derive(Serialize)]
struct ItemView<'a> {
    name: &'a str,
    description: &'a str,
    image_url: &'a str,
    unique_id: &'a str,
    uploaded_at: String,
}

impl<'a> From<&'a Item> for ItemView<'a> {
    fn from(item: &'a Item) -> Self {
        let uploaded_at = DateTime::from_timestamp(item.uploaded_at, 0).map_or_else(
            || item.uploaded_at.to_string(),
            |at| at.format("%d %b %Y, %H:%M UTC").to_string(),
        );

        Self {
            name: &item.name,
            description: &item.description,
            image_url: &item.image_url,
            unique_id: &item.unique_id,
            uploaded_at,
        }
    }
}

/// Compiled templates for the item, not-found and error pages
pub struct ItemPages {
    tera: Tera,
}

impl ItemPages {
    /// Compiles the embedded templates
    ///
    /// # Errors
    ///
    /// Returns an error if a template does not parse
    pub fn new() -> tera::Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("base.html", BASE_TEMPLATE),
            ("view_item.html", VIEW_ITEM_TEMPLATE),
            ("notfound.html", NOT_FOUND_TEMPLATE),
            ("error.html", ERROR_TEMPLATE),
        ])?;

        Ok(Self { tera })
    }

    /// Renders the detail page of an item
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails
    pub fn item(&self, item: &Item) -> tera::Result<String> {
        let mut context = Context::new();
        context.insert("item", &ItemView::from(item));
        self.tera.render("view_item.html", &context)
    }

    /// Renders the page shown for an unknown item code
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails
    pub fn not_found(&self, message: &str) -> tera::Result<String> {
        self.render_message("notfound.html", message)
    }

    /// Renders the page shown when the catalog could not be queried
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails
    pub fn error(&self, message: &str) -> tera::Result<String> {
        self.render_message("error.html", message)
    }

    fn render_message(&self, template: &str, message: &str) -> tera::Result<String> {
        let mut context = Context::new();
        context.insert("message", message);
        self.tera.render(template, &context)
    }
}
