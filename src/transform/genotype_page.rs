use crate::entities::snp_info::SnpLookup;
use crate::utils::html;

const NO_ARTICLE_CLASS: &str = "noarticletext";

/// Reads magnitude and repute from a genotype article's infobox.
///
/// A "no article" page, or one with neither field, is [`SnpLookup::Unmeasured`].
/// When only one field is present the other takes its unmeasured default.
pub fn from_genotype_page(page: &str) -> SnpLookup {
    if html::has_div_with_class(page, NO_ARTICLE_CLASS) {
        return SnpLookup::Unmeasured;
    }

    let magnitude = html::cell_after_anchor_titled(page, "Magnitude");
    let reputation = html::cell_after_anchor_titled(page, "Repute");
    if magnitude.is_none() && reputation.is_none() {
        return SnpLookup::Unmeasured;
    }

    SnpLookup::measured(magnitude, reputation)
}
