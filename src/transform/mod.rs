//! Transform adapters from catalog markup into annotation records.

pub(crate) mod annotation;
pub(crate) mod genotype_page;
