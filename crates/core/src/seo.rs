//! Search-engine documents: sitemap, robots.txt and JSON-LD structured data.

use serde_json::{json, Value};

use crate::types::{Date, DbId};

/// Static pages listed in the sitemap: `(path, changefreq, priority)`.
const STATIC_PAGES: &[(&str, &str, &str)] = &[
    ("/", "daily", "1.0"),
    ("/vestidos/", "weekly", "0.9"),
    ("/cita/", "monthly", "0.8"),
    ("/testimonios/", "weekly", "0.7"),
];

/// Maximum number of items embedded in a structured-data list.
pub const MAX_STRUCTURED_ITEMS: usize = 10;

/// Pages that have structured data.
pub const STRUCTURED_DATA_PAGES: &[&str] = &["home", "dresses", "testimonials", "appointments"];

/// Dress fields used by the sitemap and product listings.
#[derive(Debug, Clone)]
pub struct DressEntry {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub updated_on: Option<Date>,
}

/// Testimonial fields used by review listings.
#[derive(Debug, Clone)]
pub struct ReviewEntry {
    pub bride_name: String,
    pub testimonial: String,
    pub wedding_date: Option<Date>,
}

fn trim_site(site_url: &str) -> &str {
    site_url.trim_end_matches('/')
}

fn url_entry(out: &mut String, loc: &str, lastmod: Date, changefreq: &str, priority: &str) {
    out.push_str("  <url>\n");
    out.push_str(&format!("    <loc>{loc}</loc>\n"));
    out.push_str(&format!("    <lastmod>{}</lastmod>\n", lastmod.format("%Y-%m-%d")));
    out.push_str(&format!("    <changefreq>{changefreq}</changefreq>\n"));
    out.push_str(&format!("    <priority>{priority}</priority>\n"));
    out.push_str("  </url>\n");
}

/// Build `sitemap.xml` for the public site and every available dress.
pub fn sitemap_xml(site_url: &str, today: Date, dresses: &[DressEntry]) -> String {
    let base = trim_site(site_url);
    let mut out = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for (path, changefreq, priority) in STATIC_PAGES {
        url_entry(&mut out, &format!("{base}{path}"), today, changefreq, priority);
    }
    for dress in dresses {
        url_entry(
            &mut out,
            &format!("{base}/vestidos/{}/", dress.id),
            dress.updated_on.unwrap_or(today),
            "monthly",
            "0.6",
        );
    }
    out.push_str("</urlset>\n");
    out
}

/// Build `robots.txt`.
pub fn robots_txt(site_url: &str, today: Date) -> String {
    let base = trim_site(site_url);
    format!(
        "# Robots.txt para Orta Novias\n\
         # Generado automáticamente el {date}\n\
         \n\
         User-agent: *\n\
         Allow: /\n\
         Allow: /vestidos/\n\
         Allow: /cita/\n\
         Allow: /testimonios/\n\
         \n\
         Disallow: /admin/\n\
         Disallow: /api/\n\
         Disallow: /*.json$\n\
         Disallow: /*.xml$\n\
         Disallow: /static/admin/\n\
         \n\
         Sitemap: {base}/sitemap.xml\n\
         \n\
         Crawl-delay: 1\n",
        date = today.format("%Y-%m-%d"),
    )
}

fn business_entry(base: &str) -> Value {
    json!({
        "@context": "https://schema.org",
        "@type": "BridalShop",
        "name": "Orta Novias",
        "description": "Tienda de vestidos de novia con atención personalizada",
        "url": base,
        "logo": format!("{base}/static/img/logo.png"),
        "image": format!("{base}/static/img/tienda.jpg"),
        "address": {
            "@type": "PostalAddress",
            "addressCountry": "ES"
        },
        "openingHoursSpecification": [
            {
                "@type": "OpeningHoursSpecification",
                "dayOfWeek": ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"],
                "opens": "09:00",
                "closes": "13:30"
            },
            {
                "@type": "OpeningHoursSpecification",
                "dayOfWeek": ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"],
                "opens": "17:00",
                "closes": "20:30"
            }
        ],
        "priceRange": "€€"
    })
}

fn website_entry(base: &str) -> Value {
    json!({
        "@context": "https://schema.org",
        "@type": "WebSite",
        "name": "Orta Novias",
        "url": base,
        "potentialAction": {
            "@type": "SearchAction",
            "target": format!("{base}/vestidos/?q={{search_term_string}}"),
            "query-input": "required name=search_term_string"
        }
    })
}

fn product_list(base: &str, dresses: &[DressEntry]) -> Value {
    let items: Vec<Value> = dresses
        .iter()
        .take(MAX_STRUCTURED_ITEMS)
        .enumerate()
        .map(|(i, dress)| {
            json!({
                "@type": "ListItem",
                "position": i + 1,
                "item": {
                    "@type": "Product",
                    "name": dress.name,
                    "description": dress.description.as_deref().unwrap_or(""),
                    "image": dress.image_url.as_deref().unwrap_or(""),
                    "url": format!("{base}/vestidos/{}/", dress.id),
                    "brand": { "@type": "Brand", "name": "Orta Novias" }
                }
            })
        })
        .collect();
    json!({
        "@context": "https://schema.org",
        "@type": "ItemList",
        "name": "Vestidos de novia",
        "itemListElement": items
    })
}

fn review_entry(review: &ReviewEntry) -> Value {
    json!({
        "@context": "https://schema.org",
        "@type": "Review",
        "author": { "@type": "Person", "name": review.bride_name },
        "reviewBody": review.testimonial,
        "datePublished": review.wedding_date.map(|d| d.format("%Y-%m-%d").to_string()),
        "reviewRating": { "@type": "Rating", "ratingValue": 5, "bestRating": 5 },
        "itemReviewed": { "@type": "BridalShop", "name": "Orta Novias" }
    })
}

/// JSON-LD documents for a page, or `None` when the page is unknown.
///
/// The business entry is always first; page-specific entries follow.
pub fn structured_data(
    page: &str,
    site_url: &str,
    dresses: &[DressEntry],
    reviews: &[ReviewEntry],
) -> Option<Vec<Value>> {
    let base = trim_site(site_url);
    let mut docs = vec![business_entry(base)];
    match page {
        "home" => docs.push(website_entry(base)),
        "dresses" => docs.push(product_list(base, dresses)),
        "testimonials" => docs.extend(
            reviews
                .iter()
                .take(MAX_STRUCTURED_ITEMS)
                .map(review_entry),
        ),
        "appointments" => {}
        _ => return None,
    }
    Some(docs)
}
