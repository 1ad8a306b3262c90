//! Extraction of model records from the library page HTML. The page marks
//! each model item and its fields with `x-test-*` attributes, which makes
//! the selectors stable across cosmetic redesigns.

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::parse;
use crate::record::ModelRecord;

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector")
}

/// Extract one record per model item from the library page HTML.
/// Items without a resolvable model name are skipped.
pub fn extract_records(html: &str) -> Vec<ModelRecord> {
    let doc = Html::parse_document(html);
    let item_sel = selector("li[x-test-model]");
    let link_sel = selector("a");
    let title_sel = selector("h2 span.group-hover\\:underline");
    let desc_sel = selector("div.flex.flex-col[title] + p");
    let capability_sel = selector("span[x-test-capability]");
    let size_sel = selector("span[x-test-size]");
    let pulls_sel = selector("span[x-test-pull-count]");
    let updated_sel = selector("span[x-test-updated]");
    let tag_count_sel = selector("span[x-test-tag-count]");

    let mut records = Vec::new();
    for item in doc.select(&item_sel) {
        let Some(model) = model_name(&item, &link_sel) else {
            debug!("skipping model item without a model link");
            continue;
        };
        let mut record = ModelRecord::new(model);

        record.title = item.select(&title_sel).next().map(|e| text_of(&e));
        record.short_desc = item.select(&desc_sel).next().map(|e| text_of(&e));
        record.capabilities = distinct_texts(&item, &capability_sel);
        record.sizes = distinct_texts(&item, &size_sel);
        record.pull_count = item.select(&pulls_sel).next().map(|e| text_of(&e));
        record.tag_count = item.select(&tag_count_sel).next().map(|e| text_of(&e));

        if let Some(updated) = item.select(&updated_sel).next() {
            record.updated_relative = Some(text_of(&updated));
            if let Some(raw) = timestamp_title(&updated) {
                // Canonicalize when the raw form parses; keep it verbatim
                // otherwise so nothing is lost.
                record.updated = match parse::parse_catalog_timestamp(&raw) {
                    Some(dt) => Some(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
                    None => {
                        debug!(model = %record.model, raw = %raw, "unparseable raw timestamp");
                        Some(raw.clone())
                    }
                };
                record.updated_raw = Some(raw);
            }
        }

        records.push(record);
    }
    records
}

/// The model name is the last segment of the item's link href.
fn model_name(item: &ElementRef<'_>, link_sel: &Selector) -> Option<String> {
    let href = item.select(link_sel).next()?.value().attr("href")?;
    let name = href.rsplit('/').next()?;
    if name.is_empty() {
        return None;
    }
    Some(name.to_string())
}

/// The raw timestamp lives in the `title` attribute of the nearest
/// enclosing span.
fn timestamp_title(updated: &ElementRef<'_>) -> Option<String> {
    updated.ancestors().find_map(|node| {
        let el = ElementRef::wrap(node)?;
        if el.value().name() == "span" {
            el.value().attr("title").map(String::from)
        } else {
            None
        }
    })
}

fn text_of(el: &ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn distinct_texts(item: &ElementRef<'_>, sel: &Selector) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for el in item.select(sel) {
        let text = text_of(&el);
        if !text.is_empty() && !out.contains(&text) {
            out.push(text);
        }
    }
    out
}
