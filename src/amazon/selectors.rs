//! CSS selectors for reading prices off Amazon product pages.
//!
//! When Amazon moves the price block, capture the page, update the list
//! here and add the sample to the parser tests.

use scraper::Selector;
use std::sync::LazyLock;

/// Current price on a product detail page, most specific first.
///
/// Each entry is tried in order; the first one that matches wins. A single
/// comma-joined selector would instead return whichever node comes first in
/// document order, which is often a strikethrough or per-unit price.
pub static PRICE: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [
        "#corePriceDisplay_desktop_feature_div .priceToPay .a-offscreen",
        "#corePrice_feature_div .a-price:not([data-a-strike]) .a-offscreen",
        "#priceblock_dealprice",
        "#priceblock_ourprice",
        "span.a-offscreen",
    ]
    .iter()
    .filter_map(|s| Selector::parse(s).ok())
    .collect()
});

/// Selectors for detecting error/captcha pages.
pub mod errors {
    use super::*;

    /// CAPTCHA form.
    pub static CAPTCHA: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            "form[action*='validateCaptcha'], \
             img[src*='captcha']",
        )
        .unwrap()
    });

    /// Dog page (Amazon's 503 error page).
    ///
    /// Matches only the error page's own markers; product images of dog
    /// food or leashes also carry "dog" in their alt text.
    pub static DOG_PAGE: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            "img[alt*='Dogs of Amazon'], \
             img[alt^='Sorry'][alt*='dog'], \
             a[href='/ref=cs_503_link']",
        )
        .unwrap()
    });
}
